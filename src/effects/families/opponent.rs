//! Effects aimed at every opponent of the acting player.

use tracing::{debug, info};

use crate::core::{EntityId, ZoneKind};
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::filter;
use crate::effects::interpreter::{Interpreter, Outcome};

use super::FamilyHandler;

/// Player meta key: the hand is revealed to this player index.
pub const HAND_REVEALED_TO: &str = "hand_revealed_to";

pub struct OpponentFamily;

impl FamilyHandler for OpponentFamily {
    fn name(&self) -> &'static str {
        "opponent"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let opponents = interp.state.opponents(ctx.player);
        match &node.kind {
            EffectKind::OpponentLosesLore { amount } => {
                let amount = interp.amount(amount, ctx);
                let lost: i64 = opponents.iter().map(|&p| interp.state.lose_lore(p, amount)).sum();
                Ok(if lost > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::OpponentDiscardsRandom { amount } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let mut discarded = 0;
                for opponent in opponents {
                    let picked = interp.random_from_hand(opponent, amount);
                    discarded += interp.discard_cards(opponent, &picked);
                }
                Ok(if discarded > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::OpponentRevealsHand => {
                for opponent in opponents {
                    let hand = interp.names(interp.state.cards_in(opponent, ZoneKind::Hand));
                    info!(%opponent, viewer = %ctx.player, hand = %hand, "hand revealed");
                    if let Some(meta) = interp.state.players.try_get_mut(opponent) {
                        meta.set_state(HAND_REVEALED_TO, ctx.player.index() as i64);
                    }
                }
                Ok(Outcome::Executed)
            }

            EffectKind::StealLore { amount } => {
                let amount = interp.amount(amount, ctx);
                let mut stolen = 0;
                for opponent in opponents {
                    stolen += interp.state.lose_lore(opponent, amount);
                }
                if stolen == 0 {
                    return Ok(Outcome::NotApplicable);
                }
                interp.state.gain_lore(ctx.player, stolen);
                debug!(player = %ctx.player, stolen, "lore stolen");
                Ok(Outcome::Executed)
            }

            EffectKind::EachOpponentExerts { filter } => {
                let mut exerted = 0;
                for opponent in opponents {
                    let pool: Vec<EntityId> = {
                        let view = interp.view(ctx);
                        interp
                            .ready_characters(opponent)
                            .into_iter()
                            .filter(|&id| filter::passes(filter.as_ref(), id, &view))
                            .collect()
                    };
                    let picked = interp.request_target_choice(
                        opponent,
                        "Choose a character to exert",
                        "friendly_character",
                        &pool,
                        1,
                        1,
                        false,
                    );
                    exerted += picked.into_iter().filter(|&id| interp.exert_card(id)).count();
                }
                Ok(if exerted > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            other => self.misrouted(other),
        }
    }

    /// Unknown opponent tags. `opponent_draws`-style tags make each opponent
    /// draw `amount`; `opponent_*lore*` tags cost each opponent lore.
    fn execute_unmapped(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let EffectKind::Unmapped { tag, amount, .. } = &node.kind else {
            return self.misrouted(&node.kind);
        };
        let amount = amount.as_ref().map_or(1, |a| interp.amount(a, ctx));
        let opponents = interp.state.opponents(ctx.player);
        let tag = tag.to_ascii_lowercase();
        if tag.contains("draw") {
            for opponent in opponents {
                interp.draw_cards(opponent, amount.max(0) as usize)?;
            }
            Ok(Outcome::Executed)
        } else if tag.contains("lore") {
            for opponent in opponents {
                interp.state.lose_lore(opponent, amount);
            }
            Ok(Outcome::Executed)
        } else {
            debug!(tag = %tag, "no opponent fallback for tag");
            Ok(Outcome::Unhandled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use super::HAND_REVEALED_TO;
    use crate::core::ZoneKind;
    use crate::effects::{GameContext, Outcome};

    #[test]
    fn test_opponent_loses_lore_floors_at_zero() {
        let mut table = Table::new();
        table.state.set_lore(P1, 1);
        table.run(r#"{"type": "opponent_loses_lore", "amount": 3}"#, &GameContext::new(P0));
        assert_eq!(table.state.lore(P1), 0);
    }

    #[test]
    fn test_steal_lore_moves_only_what_was_lost() {
        let mut table = Table::new();
        table.state.set_lore(P1, 1);
        table.run(r#"{"type": "steal_lore", "amount": 2}"#, &GameContext::new(P0));
        assert_eq!(table.state.lore(P0), 1);
        assert_eq!(table.state.lore(P1), 0);
    }

    #[test]
    fn test_random_discard_is_seeded() {
        let run = || {
            let mut table = Table::new();
            let hand = table.fill(P1, ZoneKind::Hand, 5);
            table.run(r#"{"type": "opponent_discards_random", "amount": 2}"#, &GameContext::new(P0));
            hand.iter()
                .map(|&id| table.state.in_zone(id, ZoneKind::Discard))
                .collect::<Vec<_>>()
        };
        let first = run();
        assert_eq!(first.iter().filter(|d| **d).count(), 2);
        assert_eq!(first, run());
    }

    #[test]
    fn test_reveals_hand() {
        let mut table = Table::new();
        table.fill(P1, ZoneKind::Hand, 2);
        table.run(r#"{"type": "opponent_reveals_hand"}"#, &GameContext::new(P0));
        assert_eq!(table.state.players[P1].get_state(HAND_REVEALED_TO, -1), 0);
    }

    #[test]
    fn test_each_opponent_exerts_ready_only() {
        let mut table = Table::new();
        let theirs = table.fill(P1, ZoneKind::Play, 2);
        table.state.card_mut(theirs[0]).unwrap().ready = false;

        assert_eq!(table.run(r#"{"type": "each_opponent_exerts"}"#, &GameContext::new(P0)), Outcome::Executed);
        assert!(!table.ready(theirs[1]));
    }

    #[test]
    fn test_unmapped_opponent_draws() {
        let mut table = Table::new();
        table.fill(P1, ZoneKind::Deck, 3);
        let outcome = table.run(r#"{"type": "unmapped", "tag": "opponent_draws", "amount": 2}"#, &GameContext::new(P0));
        assert_eq!(outcome, Outcome::Executed);
        assert_eq!(table.state.hand_size(P1), 2);
    }
}
