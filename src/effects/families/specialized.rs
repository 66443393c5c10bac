//! Mechanics that fit no other family: optional ink payments, Boost, and
//! hooks attached to a card's next challenge, quest or banishment.

use tracing::{debug, info};

use crate::cards::KeywordKind;
use crate::core::{EntityId, ZoneId, ZoneKind};
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::continuous::{self, ContinuousKind, Duration, HookKind};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;
use crate::zones::ZonePosition;

use super::FamilyHandler;

pub struct SpecializedFamily;

/// Turn-flag key marking that `card` used Boost this turn.
#[must_use]
pub fn boost_flag(card: EntityId) -> String {
    format!("boost:{}", card.raw())
}

impl FamilyHandler for SpecializedFamily {
    fn name(&self) -> &'static str {
        "specialized"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::LookTopOneToHand { amount } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let deck = ZoneId::new(ctx.player, ZoneKind::Deck);
                let looked = interp.state.zones.top_cards(deck, amount);
                if looked.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                if !interp.may(node, ctx, format!("Look at the top {amount} cards?")) {
                    return Ok(Outcome::Declined);
                }
                let picked = interp.request_target_choice(
                    ctx.player,
                    "Choose a card to put into your hand",
                    "card",
                    &looked,
                    1,
                    1,
                    false,
                );
                for &id in &picked {
                    interp.move_to(id, ZoneKind::Hand, ZonePosition::Top);
                }
                for id in looked.into_iter().filter(|id| !picked.contains(id)) {
                    interp.move_to(id, ZoneKind::Deck, ZonePosition::Bottom);
                }
                Ok(Outcome::Executed)
            }

            EffectKind::PayInkThen { amount, effect } => {
                if interp.state.ready_ink(ctx.player) < (*amount).max(0) as usize {
                    debug!(player = %ctx.player, amount, "not enough ink for optional payment");
                    return Ok(Outcome::NotApplicable);
                }
                if !interp.confirm(ctx.player, format!("Pay {amount} ink to {}?", effect.describe())) {
                    return Ok(Outcome::Declined);
                }
                if !interp.state.pay_ink(ctx.player, *amount) {
                    return Ok(Outcome::NotApplicable);
                }
                let inner = interp.dispatch(effect, ctx)?;
                Ok(Outcome::Executed.combine(inner))
            }

            EffectKind::Boost { amount, target } => {
                let Some(&card) = interp.card_targets(target.as_ref(), TargetSpec::Self_, ctx).first() else {
                    return Ok(Outcome::NotApplicable);
                };
                boost(interp, ctx, card, *amount)
            }

            EffectKind::OnChallengeHook { effect, target, duration } => {
                Ok(attach_hook(interp, ctx, HookKind::OnChallenge, effect, target.as_ref(), *duration))
            }
            EffectKind::OnQuestHook { effect, target, duration } => {
                Ok(attach_hook(interp, ctx, HookKind::OnQuest, effect, target.as_ref(), *duration))
            }
            EffectKind::OnBanishHook { effect, target, duration } => {
                Ok(attach_hook(interp, ctx, HookKind::OnBanish, effect, target.as_ref(), *duration))
            }

            other => self.misrouted(other),
        }
    }
}

/// Pay the Boost cost and put the top card of the deck under `card`, at most
/// once per card per turn.
fn boost(interp: &mut Interpreter<'_>, ctx: &GameContext, card: EntityId, amount: Option<i64>) -> Result<Outcome> {
    let flag = boost_flag(card);
    if interp.state.turn_flag(&flag) != 0 {
        debug!(%card, "boost already used this turn");
        return Ok(Outcome::NotApplicable);
    }
    let cost = match amount {
        Some(cost) => cost,
        None => match continuous::keyword_total(interp.state, interp.cards, card, KeywordKind::Boost) {
            Some(cost) => cost,
            None => {
                debug!(%card, "card has no Boost");
                return Ok(Outcome::NotApplicable);
            }
        },
    };
    let deck = ZoneId::new(ctx.player, ZoneKind::Deck);
    let Some(top) = interp.state.zones.top_card(deck) else {
        return Ok(Outcome::NotApplicable);
    };
    if !interp.state.pay_ink(ctx.player, cost) {
        debug!(player = %ctx.player, cost, "cannot pay boost");
        return Ok(Outcome::NotApplicable);
    }
    interp.state.put_under(top, card, true);
    interp.state.set_turn_flag(flag, 1);
    info!(%card, cost, "boosted");
    Ok(Outcome::Executed)
}

fn attach_hook(
    interp: &mut Interpreter<'_>,
    ctx: &GameContext,
    hook: HookKind,
    effect: &EffectNode,
    target: Option<&TargetSpec>,
    duration: Option<Duration>,
) -> Outcome {
    let targets = interp.card_targets(target, TargetSpec::Self_, ctx);
    let duration = Interpreter::default_duration(ctx, duration);
    let kind = ContinuousKind::Hook { hook, effect: Box::new(effect.clone()) };
    match interp.add_effect(ctx, targets, duration, kind) {
        Some(_) => Outcome::Executed,
        None => Outcome::NotApplicable,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use super::boost_flag;
    use crate::cards::{CardDefinition, CardType, Keyword};
    use crate::core::{ZoneId, ZoneKind};
    use crate::effects::continuous::{self, HookKind};
    use crate::effects::{ChoiceResponse, GameContext, Outcome, ScriptedProvider};

    #[test]
    fn test_look_top_one_to_hand() {
        let mut table = Table::new();
        let deck = table.fill(P0, ZoneKind::Deck, 4);

        table.run(r#"{"type": "look_top_one_to_hand", "amount": 2}"#, &GameContext::new(P0));
        assert!(table.state.in_zone(deck[3], ZoneKind::Hand));
        assert_eq!(table.state.zones.cards_in_zone(ZoneId::new(P0, ZoneKind::Deck))[0], deck[2]);
    }

    #[test]
    fn test_pay_ink_then() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Inkwell, 2);
        let json = r#"{"type": "pay_ink_then", "amount": 2, "effect": {"type": "gain_lore", "amount": 3}}"#;

        let mut decline = ScriptedProvider::new().with_response(ChoiceResponse::no());
        assert_eq!(table.run_with(json, &GameContext::new(P0), &mut decline), Outcome::Declined);
        assert_eq!(table.state.ready_ink(P0), 2);

        let mut accept = ScriptedProvider::new().with_response(ChoiceResponse::yes());
        assert_eq!(table.run_with(json, &GameContext::new(P0), &mut accept), Outcome::Executed);
        assert_eq!(table.state.lore(P0), 3);
        assert_eq!(table.state.ready_ink(P0), 0);

        assert_eq!(table.run(json, &GameContext::new(P0)), Outcome::NotApplicable);
    }

    #[test]
    fn test_optional_pay_ink_then_asks_once() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Inkwell, 1);
        let json = r#"{"type": "pay_ink_then", "amount": 1, "effect": {"type": "gain_lore", "amount": 2}, "optional": true}"#;

        let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::yes());
        assert_eq!(table.run_with(json, &GameContext::new(P0), &mut provider), Outcome::Executed);
        assert_eq!(provider.requests.len(), 1);
        assert!(provider.requests[0].prompt.starts_with("Pay 1 ink"));
        assert_eq!(table.state.lore(P0), 2);
    }

    #[test]
    fn test_boost_once_per_turn() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Inkwell, 4);
        table.fill(P0, ZoneKind::Deck, 3);
        let def = table.define(|id| {
            CardDefinition::new(id, "Flynn Rider", CardType::Character)
                .with_stats(2, 3, 1)
                .with_keyword(Keyword::Boost(1))
        });
        let flynn = table.put(def, P0, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_source(flynn);

        assert_eq!(table.run(r#"{"type": "boost"}"#, &ctx), Outcome::Executed);
        assert_eq!(table.state.card(flynn).unwrap().under.len(), 1);
        assert_eq!(table.state.turn_flag(&boost_flag(flynn)), 1);
        assert_eq!(table.run(r#"{"type": "boost"}"#, &ctx), Outcome::NotApplicable);
        assert_eq!(table.state.ready_ink(P0), 3);

        table.state.expire_end_of_turn();
        assert_eq!(table.run(r#"{"type": "boost"}"#, &ctx), Outcome::Executed);
    }

    #[test]
    fn test_banish_hook_fires() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Deck, 2);
        let def = table.character("Rapunzel", 1, 2, 1);
        let rapunzel = table.put(def, P0, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_source(rapunzel);

        table.run(r#"{"type": "on_banish_hook", "effect": {"type": "draw", "amount": 2}}"#, &ctx);
        assert_eq!(continuous::hooks_on(&table.state, rapunzel, HookKind::OnBanish).len(), 1);

        let hit = GameContext::new(P1).with_targets(vec![rapunzel]);
        table.run(r#"{"type": "damage", "amount": 2}"#, &hit);
        assert!(table.state.in_zone(rapunzel, ZoneKind::Discard));
        assert_eq!(table.state.hand_size(P0), 2);
    }
}
