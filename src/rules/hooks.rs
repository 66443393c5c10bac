//! The seam between the card-play machine and the turn orchestrator.
//!
//! The interpreter never decides when a player may act or when a game ends.
//! It asks the orchestrator through [`TurnHooks`]:
//! - may this player play cards right now
//! - recompute derived state after a play
//! - has anyone won

use tracing::{debug, info};

use crate::cards::CardRegistry;
use crate::core::{GameState, Phase, PlayerId};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Several players crossed the lore threshold at once.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// Callbacks into the turn orchestrator.
///
/// ## Implementation Notes
///
/// - `can_play_cards`: the phase guard checked before any play path
/// - `recalculate_effects`: runs after every completed play
/// - `check_win_condition`: return `None` while the game continues
pub trait TurnHooks {
    /// May `player` play cards right now?
    fn can_play_cards(&self, state: &GameState, player: PlayerId) -> bool {
        state.phase == Phase::Main && state.active_player == player
    }

    /// Recompute derived state after a play changed the board.
    fn recalculate_effects(&mut self, state: &mut GameState, cards: &CardRegistry);

    /// Check whether `player` (or anyone) has won.
    fn check_win_condition(&mut self, state: &GameState, player: PlayerId) -> Option<GameResult>;
}

/// Orchestrator defaults: main-phase plays by the active player, lapsed
/// effects pruned after each play, and a lore threshold from the config.
#[derive(Clone, Debug, Default)]
pub struct DefaultHooks {
    /// First result seen by `check_win_condition`.
    pub result: Option<GameResult>,
}

impl DefaultHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TurnHooks for DefaultHooks {
    fn recalculate_effects(&mut self, state: &mut GameState, _cards: &CardRegistry) {
        let pruned = state.prune_lapsed_effects();
        if pruned > 0 {
            debug!(pruned, "lapsed continuous effects removed");
        }
    }

    fn check_win_condition(&mut self, state: &GameState, player: PlayerId) -> Option<GameResult> {
        if self.result.is_some() {
            return self.result.clone();
        }
        let threshold = state.config.lore_to_win;
        let winners: Vec<PlayerId> = state.player_ids().filter(|&p| state.lore(p) >= threshold).collect();
        let result = match winners.as_slice() {
            [] => return None,
            [single] => GameResult::Winner(*single),
            _ => GameResult::Winners(winners),
        };
        info!(checked_for = %player, ?result, "game over");
        self.result = Some(result.clone());
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::new(1));
        assert!(!result.is_winner(PlayerId::new(0)));
        assert!(result.is_winner(PlayerId::new(1)));

        let draw = GameResult::Draw;
        assert!(!draw.is_winner(PlayerId::new(0)));

        let shared = GameResult::Winners(vec![PlayerId::new(0), PlayerId::new(2)]);
        assert!(shared.is_winner(PlayerId::new(0)));
        assert!(!shared.is_winner(PlayerId::new(1)));
        assert!(shared.is_winner(PlayerId::new(2)));
    }

    #[test]
    fn test_default_hooks_phase_guard() {
        let mut state = GameState::new(GameConfig::default());
        let hooks = DefaultHooks::new();
        assert!(hooks.can_play_cards(&state, PlayerId::new(0)));
        assert!(!hooks.can_play_cards(&state, PlayerId::new(1)));

        state.phase = Phase::End;
        assert!(!hooks.can_play_cards(&state, PlayerId::new(0)));
    }

    #[test]
    fn test_lore_threshold_wins() {
        let mut state = GameState::new(GameConfig::default().with_lore_to_win(5));
        let mut hooks = DefaultHooks::new();
        assert_eq!(hooks.check_win_condition(&state, PlayerId::new(0)), None);

        state.gain_lore(PlayerId::new(1), 5);
        assert_eq!(
            hooks.check_win_condition(&state, PlayerId::new(0)),
            Some(GameResult::Winner(PlayerId::new(1)))
        );
        assert!(hooks.result.is_some());
    }
}
