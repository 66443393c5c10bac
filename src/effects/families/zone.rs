//! Moves between zones: banish, bounce, recursion, inkwell, deck, exile.

use tracing::{debug, info};

use crate::core::{EntityId, ZoneKind};
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::{Selection, TargetSpec};
use crate::zones::ZonePosition;

use super::FamilyHandler;

pub struct ZoneFamily;

impl FamilyHandler for ZoneFamily {
    fn name(&self) -> &'static str {
        "zone"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::Banish { target } => {
                let targets = interp.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                let names = interp.names(&targets);
                if !interp.may(node, ctx, format!("Banish {names}?")) {
                    return Ok(Outcome::Declined);
                }
                let mut banished = 0;
                for id in targets {
                    if interp.banish_card(id, ctx.source)? {
                        banished += 1;
                    }
                }
                Ok(moved(banished))
            }

            EffectKind::ReturnToHand { target } => {
                let targets = interp.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                Ok(move_all(interp, &targets, ZoneKind::Hand, ZonePosition::Top))
            }

            EffectKind::ReturnFromDiscard { target } => {
                let default = TargetSpec::ChosenCardInDiscard(Selection::default());
                let targets = in_zone(interp, target.as_ref(), default, ctx, ZoneKind::Discard);
                Ok(move_all(interp, &targets, ZoneKind::Hand, ZonePosition::Top))
            }

            EffectKind::PutIntoInkwell { target, exerted } => {
                let default = TargetSpec::TopOfDeck { count: 1 };
                let targets: Vec<EntityId> = interp
                    .resolve_or(target.as_ref(), default, ctx)
                    .into_iter()
                    .filter(|&id| interp.state.card(id).is_some())
                    .collect();
                let mut inked = 0;
                for id in targets {
                    if interp.move_to(id, ZoneKind::Inkwell, ZonePosition::Top) {
                        if let Some(card) = interp.state.card_mut(id) {
                            card.ready = !*exerted;
                        }
                        inked += 1;
                    }
                }
                Ok(moved(inked))
            }

            EffectKind::ShuffleIntoDeck { target } => {
                let targets: Vec<EntityId> = interp
                    .resolve_or(target.as_ref(), TargetSpec::chosen_character(), ctx)
                    .into_iter()
                    .filter(|&id| interp.state.card(id).is_some())
                    .collect();
                let mut owners = Vec::new();
                for &id in &targets {
                    if interp.move_to(id, ZoneKind::Deck, ZonePosition::Top) {
                        if let Some(owner) = interp.state.owner_of(id) {
                            if !owners.contains(&owner) {
                                owners.push(owner);
                            }
                        }
                    }
                }
                for &owner in &owners {
                    interp.state.shuffle_deck(owner);
                    debug!(player = %owner, "deck shuffled");
                }
                Ok(if owners.is_empty() { Outcome::NotApplicable } else { Outcome::Executed })
            }

            EffectKind::PutOnBottom { target } => {
                let targets: Vec<EntityId> = interp
                    .resolve_or(target.as_ref(), TargetSpec::chosen_character(), ctx)
                    .into_iter()
                    .filter(|&id| interp.state.card(id).is_some())
                    .collect();
                Ok(move_all(interp, &targets, ZoneKind::Deck, ZonePosition::Bottom))
            }

            EffectKind::Exile { target } => {
                let targets = interp.resolve_or(target.as_ref(), TargetSpec::chosen_character(), ctx);
                let mut exiled = 0;
                for id in targets {
                    if interp.state.exile(id) {
                        exiled += 1;
                    }
                }
                Ok(moved(exiled))
            }

            EffectKind::BounceAll { target } => {
                let targets = interp.card_targets(Some(target), TargetSpec::SameTarget, ctx);
                info!(count = targets.len(), "returning cards to hand");
                Ok(move_all(interp, &targets, ZoneKind::Hand, ZonePosition::Top))
            }

            other => self.misrouted(other),
        }
    }
}

fn moved(count: usize) -> Outcome {
    if count > 0 {
        Outcome::Executed
    } else {
        Outcome::NotApplicable
    }
}

fn move_all(interp: &mut Interpreter<'_>, targets: &[EntityId], kind: ZoneKind, position: ZonePosition) -> Outcome {
    let count = targets
        .iter()
        .filter(|&&id| interp.move_to(id, kind, position))
        .count();
    moved(count)
}

/// Resolve and keep only cards sitting in `kind`.
fn in_zone(
    interp: &mut Interpreter<'_>,
    spec: Option<&TargetSpec>,
    default: TargetSpec,
    ctx: &GameContext,
    kind: ZoneKind,
) -> Vec<EntityId> {
    interp
        .resolve_or(spec, default, ctx)
        .into_iter()
        .filter(|&id| interp.state.in_zone(id, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use crate::core::ZoneKind;
    use crate::effects::{ChoiceResponse, GameContext, Outcome, ScriptedProvider};

    #[test]
    fn test_banish_declined() {
        let mut table = Table::new();
        let def = table.character("Jafar", 3, 3, 1);
        let target = table.put(def, P1, ZoneKind::Play);
        let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::no());
        let ctx = GameContext::new(P0).with_targets(vec![target]);

        let outcome = table.run_with(r#"{"type": "banish", "optional": true}"#, &ctx, &mut provider);
        assert_eq!(outcome, Outcome::Declined);
        assert!(table.state.in_zone(target, ZoneKind::Play));
    }

    #[test]
    fn test_return_to_hand() {
        let mut table = Table::new();
        let def = table.character("Genie", 2, 4, 2);
        let target = table.put(def, P1, ZoneKind::Play);
        table.state.put_damage(target, 2);
        let ctx = GameContext::new(P0).with_targets(vec![target]);

        assert_eq!(table.run(r#"{"type": "return_to_hand"}"#, &ctx), Outcome::Executed);
        assert!(table.state.in_zone(target, ZoneKind::Hand));
        assert_eq!(table.damage(target), 0);
    }

    #[test]
    fn test_return_from_discard_picks_own_discard() {
        let mut table = Table::new();
        let discarded = table.fill(P0, ZoneKind::Discard, 2);

        assert_eq!(table.run(r#"{"type": "return_from_discard"}"#, &GameContext::new(P0)), Outcome::Executed);
        assert_eq!(table.state.hand_size(P0), 1);
        assert!(table.state.in_zone(discarded[0], ZoneKind::Hand));
    }

    #[test]
    fn test_put_into_inkwell_exerted() {
        let mut table = Table::new();
        let def = table.character("Fidget", 1, 1, 1);
        let target = table.put(def, P1, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![target]);

        table.run(r#"{"type": "put_into_inkwell", "exerted": true}"#, &ctx);
        assert!(table.state.in_zone(target, ZoneKind::Inkwell));
        assert_eq!(table.state.total_ink(P1), 1);
        assert_eq!(table.state.ready_ink(P1), 0);
    }

    #[test]
    fn test_shuffle_into_deck() {
        let mut table = Table::new();
        table.fill(P1, ZoneKind::Deck, 5);
        let def = table.character("Ursula", 3, 5, 1);
        let target = table.put(def, P1, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![target]);

        table.run(r#"{"type": "shuffle_into_deck"}"#, &ctx);
        assert_eq!(table.state.deck_size(P1), 6);
        assert!(table.state.in_zone(target, ZoneKind::Deck));
    }

    #[test]
    fn test_bounce_all_filtered() {
        let mut table = Table::new();
        let mine = table.fill(P0, ZoneKind::Play, 2);
        let theirs = table.fill(P1, ZoneKind::Play, 3);

        table.run(
            r#"{"type": "bounce_all", "target": {"type": "each_opposing_character"}}"#,
            &GameContext::new(P0),
        );
        assert_eq!(table.state.hand_size(P1), theirs.len());
        assert!(mine.iter().all(|&id| table.state.in_zone(id, ZoneKind::Play)));
    }

    #[test]
    fn test_exile_leaves_every_zone() {
        let mut table = Table::new();
        let def = table.character("Magica", 2, 2, 1);
        let target = table.put(def, P1, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![target]);

        table.run(r#"{"type": "exile"}"#, &ctx);
        assert!(table.state.zone_of(target).is_none());
    }
}
