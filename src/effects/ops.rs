//! Mutation helpers shared by the inline leaves and the family handlers.
//!
//! Each helper leaves the state consistent on every return path: damage is
//! followed by the banishment check, a banished card's reactions are
//! collected before it leaves play, and a continuous effect is only added
//! with its source, targets and duration filled in.

use tracing::{debug, info};

use crate::cards::CardType;
use crate::core::{EntityId, PlayerId, ZoneKind};
use crate::error::Result;
use crate::triggers::{EventKind, GameEvent, TriggerContext, TriggerId, TriggeredEffect};
use crate::zones::ZonePosition;

use super::ast::{Amount, EffectKind};
use super::context::GameContext;
use super::continuous::{self, ActiveEffect, ContinuousKind, Duration, EffectId, HookKind, Restriction};
use super::interpreter::{Interpreter, Outcome};

impl<'a> Interpreter<'a> {
    /// Evaluate an amount in `ctx`.
    #[must_use]
    pub fn amount(&self, amount: &Amount, ctx: &GameContext) -> i64 {
        amount.evaluate(&self.view(ctx))
    }

    /// Explicit duration, else `WhileSourceInPlay` inside a static ability
    /// and `ThisTurn` everywhere else.
    #[must_use]
    pub fn default_duration(ctx: &GameContext, explicit: Option<Duration>) -> Duration {
        match explicit {
            Some(duration) => duration,
            None if ctx.static_ability && ctx.source.is_some() => Duration::WhileSourceInPlay,
            None => Duration::ThisTurn,
        }
    }

    /// Append a ledger record sourced from `ctx`. `None` if there is
    /// nothing to apply it to.
    pub fn add_effect(
        &mut self,
        ctx: &GameContext,
        targets: impl IntoIterator<Item = EntityId>,
        duration: Duration,
        kind: ContinuousKind,
    ) -> Option<EffectId> {
        let record = ActiveEffect::new(ctx.source, ctx.player, targets, duration, kind);
        if record.targets.is_empty() {
            debug!(kind = ?record.kind, "continuous effect with no targets skipped");
            return None;
        }
        Some(self.state.add_active_effect(record))
    }

    /// Restriction on each target.
    pub fn restrict(
        &mut self,
        ctx: &GameContext,
        targets: Vec<EntityId>,
        restriction: Restriction,
        duration: Duration,
    ) -> Outcome {
        match self.add_effect(ctx, targets, duration, ContinuousKind::Restriction { restriction }) {
            Some(_) => Outcome::Executed,
            None => Outcome::NotApplicable,
        }
    }

    // === Damage and banishment ===

    /// Deal damage through Resist and shields, fire "damaged" reactions,
    /// then banish whatever has lethal damage. Returns damage dealt.
    pub fn deal_damage(&mut self, target: EntityId, amount: i64, source: Option<EntityId>) -> Result<i64> {
        let dealt = self.state.apply_damage(self.cards, target, amount, source);
        if dealt > 0 {
            let mut event = GameEvent::damage(source, target, dealt);
            event.player = self.state.owner_of(target);
            self.emit(&event)?;
        }
        self.settle_banishment()?;
        Ok(dealt)
    }

    /// Banish every card whose damage meets its willpower.
    pub fn settle_banishment(&mut self) -> Result<()> {
        for id in self.state.banish_candidates(self.cards) {
            self.banish_card(id, None)?;
        }
        Ok(())
    }

    /// Banish a card in play, running its "banished" reactions and hooks.
    pub fn banish_card(&mut self, id: EntityId, cause: Option<EntityId>) -> Result<bool> {
        if !self.state.in_zone(id, ZoneKind::Play) {
            return Ok(false);
        }
        let mut event = GameEvent::new(EventKind::Banished).with_target(id);
        event.player = self.state.owner_of(id);
        event.source = cause;

        // The card's own triggers and hooks go away when it leaves play.
        let reactions = self.collect_reactions(&event);
        let hooks = continuous::hooks_on(self.state, id, HookKind::OnBanish);

        self.state.banish(id);
        self.run_reactions(reactions)?;
        self.run_hook_records(hooks, id, &event)?;
        Ok(true)
    }

    // === Events ===

    /// Fire registered triggers and granted triggered abilities for an
    /// event.
    pub fn emit(&mut self, event: &GameEvent) -> Result<()> {
        let reactions = self.collect_reactions(event);
        self.run_reactions(reactions)
    }

    /// Registry triggers (registration order) followed by
    /// triggered abilities granted to cards in play (seat, then zone order).
    #[must_use]
    pub fn collect_reactions(&self, event: &GameEvent) -> Vec<TriggeredEffect> {
        let mut reactions = self.state.triggers.find_triggers(event, self.state, self.cards);

        for card in self.state.all_in_play() {
            let Some(controller) = self.state.owner_of(card) else {
                continue;
            };
            for ability in continuous::granted_abilities(self.state, card) {
                let EffectKind::Triggered { on, .. } = &ability.kind else {
                    continue;
                };
                let Some((kind, condition)) = on.registration() else {
                    continue;
                };
                let fires = kind == event.kind
                    && condition.evaluate(&TriggerContext {
                        event,
                        source: Some(card),
                        controller,
                        state: self.state,
                        cards: self.cards,
                    });
                if fires {
                    reactions.push(TriggeredEffect {
                        trigger_id: TriggerId::new(0),
                        controller,
                        source: Some(card),
                        effect: ability.clone(),
                        event: event.clone(),
                    });
                }
            }
        }
        reactions
    }

    /// Resolve reactions in order, each in its own context.
    pub fn run_reactions(&mut self, reactions: Vec<TriggeredEffect>) -> Result<()> {
        for reaction in reactions {
            let mut ctx = GameContext::new(reaction.controller).with_event(&reaction.event);
            ctx.source = reaction.source;
            debug!(
                trigger = %reaction.trigger_id,
                source = ?reaction.source,
                event = ?reaction.event.kind,
                "reaction fired"
            );
            self.run_nested(&reaction.effect, &ctx)?;
        }
        Ok(())
    }

    /// Run the live hooks of one kind attached to `card`. One-use hooks are
    /// consumed.
    pub fn run_hooks(&mut self, hook: HookKind, card: EntityId, event: &GameEvent) -> Result<usize> {
        let hooks = continuous::hooks_on(self.state, card, hook);
        let count = hooks.len();
        self.run_hook_records(hooks, card, event)?;
        Ok(count)
    }

    fn run_hook_records(&mut self, hooks: Vec<ActiveEffect>, card: EntityId, event: &GameEvent) -> Result<()> {
        for record in hooks {
            if record.duration == Duration::OneUse {
                self.state.remove_active_effect(record.id);
            }
            let ContinuousKind::Hook { effect, .. } = record.kind else {
                continue;
            };
            let ctx = GameContext::new(record.source_player)
                .with_event(event)
                .with_source(card);
            self.run_nested(&effect, &ctx)?;
        }
        Ok(())
    }

    /// Register the standing triggers printed on a card. Returns how many.
    pub fn register_triggers(&mut self, card: EntityId) -> usize {
        let Some(instance) = self.state.card(card) else {
            return 0;
        };
        let owner = instance.owner;
        let Some(def) = self.cards.get(instance.card_id) else {
            return 0;
        };

        let mut registered = 0;
        for ability in &def.abilities {
            let EffectKind::Triggered { on, .. } = &ability.kind else {
                continue;
            };
            let Some((kind, condition)) = on.registration() else {
                continue;
            };
            let trigger = crate::triggers::Trigger::new(def.full_name(), owner, kind, ability.clone())
                .with_source(card)
                .with_condition(condition);
            self.state.triggers.register(trigger);
            registered += 1;
        }
        if registered > 0 {
            debug!(%card, registered, "triggers registered");
        }
        registered
    }

    // === Cards and players ===

    /// Draw and announce it. Returns cards drawn.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> Result<usize> {
        let drawn = self.state.draw(player, count).len();
        if drawn > 0 {
            info!(%player, drawn, "cards drawn");
            let event = GameEvent::for_player(EventKind::CardDrawn, player).with_amount(drawn as i64);
            self.emit(&event)?;
        }
        Ok(drawn)
    }

    /// Discard the given cards from `player`'s hand unless the player is
    /// protected from discarding. Returns how many were discarded.
    pub fn discard_cards(&mut self, player: PlayerId, ids: &[EntityId]) -> usize {
        if continuous::player_has_restriction(self.state, player, Restriction::CantDiscard) {
            debug!(%player, "discard prevented");
            return 0;
        }
        let mut discarded = 0;
        for &id in ids {
            if self.state.owner_of(id) == Some(player) && self.state.in_zone(id, ZoneKind::Hand) {
                self.state.move_card(id, ZoneKind::Discard, ZonePosition::Top);
                discarded += 1;
            }
        }
        if discarded > 0 {
            info!(%player, discarded, "cards discarded");
        }
        discarded
    }

    /// `player` picks `count` cards from their own hand.
    pub fn choose_from_hand(&mut self, player: PlayerId, count: usize, prompt: impl Into<String>) -> Vec<EntityId> {
        let pool = self.state.cards_in(player, ZoneKind::Hand).to_vec();
        let count = count.min(pool.len());
        self.request_target_choice(player, prompt, "card_in_hand", &pool, count, count, false)
    }

    /// Up to `count` distinct cards from `player`'s hand, picked by the
    /// game RNG.
    pub fn random_from_hand(&mut self, player: PlayerId, count: usize) -> Vec<EntityId> {
        let mut pool = self.state.cards_in(player, ZoneKind::Hand).to_vec();
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count {
            let Some(index) = self.state.rng.gen_index(pool.len()) else {
                break;
            };
            picked.push(pool.swap_remove(index));
        }
        picked
    }

    /// Exert a card unless something keeps it ready. Returns whether it
    /// changed.
    pub fn exert_card(&mut self, id: EntityId) -> bool {
        if continuous::has_restriction(self.state, id, Restriction::Unexertable) {
            debug!(card = %id, "card cannot be exerted");
            return false;
        }
        match self.state.card_mut(id) {
            Some(card) if card.ready => {
                card.ready = false;
                true
            }
            _ => false,
        }
    }

    /// Ready a card unless it is prevented from readying.
    pub fn ready_card(&mut self, id: EntityId) -> bool {
        if continuous::has_restriction(self.state, id, Restriction::CantReady) {
            debug!(card = %id, "card cannot ready");
            return false;
        }
        match self.state.card_mut(id) {
            Some(card) if !card.ready => {
                card.ready = true;
                true
            }
            _ => false,
        }
    }

    /// Move a card, logging where it went.
    pub fn move_to(&mut self, id: EntityId, kind: ZoneKind, position: ZonePosition) -> bool {
        let moved = self.state.move_card(id, kind, position).is_some();
        if moved {
            info!(card = %id, to = ?kind, "card moved");
        }
        moved
    }

    #[must_use]
    pub fn is_character(&self, id: EntityId) -> bool {
        self.state
            .card(id)
            .and_then(|c| self.cards.get(c.card_id))
            .is_some_and(|d| d.card_type == CardType::Character)
    }

    /// A player's ready characters in play.
    #[must_use]
    pub fn ready_characters(&self, player: PlayerId) -> Vec<EntityId> {
        self.state
            .cards_in(player, ZoneKind::Play)
            .iter()
            .copied()
            .filter(|&id| self.is_character(id) && self.state.card(id).is_some_and(|c| c.ready))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardRegistry};
    use crate::core::{GameConfig, GameState};
    use crate::effects::EffectNode;
    use crate::triggers::TriggerEvent;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn registry() -> CardRegistry {
        let mut cards = CardRegistry::new();
        cards.register(
            CardDefinition::new(CardId::new(1), "Gaston", CardType::Character).with_stats(4, 2, 1),
        );
        let on_banished = EffectNode::new(EffectKind::Triggered {
            on: TriggerEvent::OnBanished,
            effects: vec![EffectNode::new(EffectKind::Draw {
                amount: Amount::Fixed(1),
                target: None,
            })],
        });
        cards.register(
            CardDefinition::new(CardId::new(2), "Cheshire Cat", CardType::Character)
                .with_stats(2, 2, 1)
                .with_ability(on_banished),
        );
        cards
    }

    #[test]
    fn test_lethal_damage_banishes() {
        let cards = registry();
        let mut state = GameState::new(GameConfig::default());
        let gaston = state.create_card(CardId::new(1), P1, ZoneKind::Play);
        let mut interp = Interpreter::new(&mut state, &cards);

        assert_eq!(interp.deal_damage(gaston, 2, None).unwrap(), 2);
        assert!(state.in_zone(gaston, ZoneKind::Discard));
    }

    #[test]
    fn test_banished_trigger_fires_after_leaving_play() {
        let cards = registry();
        let mut state = GameState::new(GameConfig::default());
        let cat = state.create_card(CardId::new(2), P0, ZoneKind::Play);
        state.create_card(CardId::new(1), P0, ZoneKind::Deck);
        let mut interp = Interpreter::new(&mut state, &cards);
        assert_eq!(interp.register_triggers(cat), 1);

        assert!(interp.banish_card(cat, None).unwrap());
        assert_eq!(state.hand_size(P0), 1);
        assert!(state.triggers.is_empty());
    }

    #[test]
    fn test_default_duration() {
        let ctx = GameContext::new(P0).with_source(EntityId(5));
        assert_eq!(Interpreter::default_duration(&ctx, None), Duration::ThisTurn);
        assert_eq!(Interpreter::default_duration(&ctx.in_static(), None), Duration::WhileSourceInPlay);
        assert_eq!(
            Interpreter::default_duration(&ctx, Some(Duration::Permanent)),
            Duration::Permanent
        );
    }

    #[test]
    fn test_discard_prevented() {
        let cards = registry();
        let mut state = GameState::new(GameConfig::default());
        let card = state.create_card(CardId::new(1), P0, ZoneKind::Hand);
        let mut interp = Interpreter::new(&mut state, &cards);
        let ctx = GameContext::new(P0);
        interp.restrict(&ctx, vec![EntityId::player(P0)], Restriction::CantDiscard, Duration::ThisTurn);

        assert_eq!(interp.discard_cards(P0, &[card]), 0);
        assert!(state.in_zone(card, ZoneKind::Hand));
    }

    #[test]
    fn test_random_from_hand_distinct() {
        let cards = registry();
        let mut state = GameState::new(GameConfig::default().with_seed(7));
        for _ in 0..5 {
            state.create_card(CardId::new(1), P0, ZoneKind::Hand);
        }
        let mut interp = Interpreter::new(&mut state, &cards);
        let mut picked = interp.random_from_hand(P0, 3);
        picked.sort();
        picked.dedup();
        assert_eq!(picked.len(), 3);
        assert_eq!(interp.random_from_hand(P1, 2), Vec::<EntityId>::new());
    }
}
