//! Locations: moving characters to them and the costs involved.

use tracing::{debug, info};

use crate::cards::{CardType, Stat};
use crate::core::ZoneKind;
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::continuous::{self, ContinuousKind};
use crate::effects::filter::{CardFilter, Filter, Side};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::{Selection, TargetSpec};

use super::FamilyHandler;

pub struct LocationFamily;

fn own_locations() -> Filter {
    Filter::card(CardFilter::new().with_owner(Side::Self_))
}

impl FamilyHandler for LocationFamily {
    fn name(&self) -> &'static str {
        "location"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::MoveToLocation { character, location, free } => {
                let friendly = TargetSpec::ChosenFriendlyCharacter(Selection::default());
                let Some(&mover) = interp.card_targets(character.as_ref(), friendly, ctx).first() else {
                    return Ok(Outcome::NotApplicable);
                };
                let destination = TargetSpec::ChosenLocation(Selection::default().with_filter(own_locations()));
                let Some(&site) = interp.card_targets(location.as_ref(), destination, ctx).first() else {
                    return Ok(Outcome::NotApplicable);
                };
                let is_location = interp
                    .state
                    .card(site)
                    .and_then(|c| interp.cards.get(c.card_id))
                    .is_some_and(|d| d.card_type == CardType::Location);
                if !is_location || !interp.is_character(mover) {
                    debug!(%mover, %site, "not a character and a location");
                    return Ok(Outcome::NotApplicable);
                }
                if interp.state.card(mover).and_then(|c| c.location) == Some(site) {
                    return Ok(Outcome::NotApplicable);
                }

                let cost = continuous::effective_stat(interp.state, interp.cards, site, Stat::MoveCost);
                if !*free && !interp.state.pay_ink(ctx.player, cost) {
                    debug!(player = %ctx.player, cost, "cannot pay move cost");
                    return Ok(Outcome::NotApplicable);
                }
                if let Some(card) = interp.state.card_mut(mover) {
                    card.location = Some(site);
                }
                info!(character = %mover, location = %site, cost = if *free { 0 } else { cost }, "moved to location");
                Ok(Outcome::Executed)
            }

            EffectKind::ReduceMoveCost { amount, target, duration } => {
                let amount = interp.amount(amount, ctx);
                let default = TargetSpec::AllLocations { filter: Some(own_locations()) };
                let targets = interp.card_targets(target.as_ref(), default, ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                let kind = ContinuousKind::StatModifier { stat: Stat::MoveCost, delta: -amount };
                Ok(match interp.add_effect(ctx, targets, duration, kind) {
                    Some(_) => Outcome::Executed,
                    None => Outcome::NotApplicable,
                })
            }

            EffectKind::GainLorePerLocation { per } => {
                let per = interp.amount(per, ctx);
                let locations = interp
                    .state
                    .cards_in(ctx.player, ZoneKind::Play)
                    .iter()
                    .filter(|&&id| {
                        interp
                            .state
                            .card(id)
                            .and_then(|c| interp.cards.get(c.card_id))
                            .is_some_and(|d| d.card_type == CardType::Location)
                    })
                    .count() as i64;
                if locations == 0 {
                    return Ok(Outcome::NotApplicable);
                }
                interp.state.gain_lore(ctx.player, per.saturating_mul(locations));
                Ok(Outcome::Executed)
            }

            other => self.misrouted(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use crate::cards::{CardDefinition, CardType};
    use crate::core::ZoneKind;
    use crate::effects::{GameContext, Outcome};

    fn location(table: &mut Table, move_cost: i64) -> crate::cards::CardId {
        table.define(|id| {
            CardDefinition::new(id, "Pride Lands", CardType::Location)
                .with_stats(0, 7, 1)
                .with_move_cost(move_cost)
        })
    }

    #[test]
    fn test_move_pays_cost() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Inkwell, 2);
        let def = table.character("Nala", 2, 3, 1);
        let nala = table.put(def, P0, ZoneKind::Play);
        let site_def = location(&mut table, 2);
        let site = table.put(site_def, P0, ZoneKind::Play);

        assert_eq!(table.run(r#"{"type": "move_to_location"}"#, &GameContext::new(P0)), Outcome::Executed);
        assert_eq!(table.state.card(nala).unwrap().location, Some(site));
        assert_eq!(table.state.ready_ink(P0), 0);
    }

    #[test]
    fn test_move_without_ink_fails() {
        let mut table = Table::new();
        let def = table.character("Simba", 3, 3, 1);
        let simba = table.put(def, P0, ZoneKind::Play);
        let site_def = location(&mut table, 1);
        table.put(site_def, P0, ZoneKind::Play);

        assert_eq!(table.run(r#"{"type": "move_to_location"}"#, &GameContext::new(P0)), Outcome::NotApplicable);
        assert_eq!(table.state.card(simba).unwrap().location, None);

        table.run(r#"{"type": "move_to_location", "free": true}"#, &GameContext::new(P0));
        assert!(table.state.card(simba).unwrap().location.is_some());
    }

    #[test]
    fn test_reduced_move_cost() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Inkwell, 1);
        let def = table.character("Timon", 1, 2, 1);
        let timon = table.put(def, P0, ZoneKind::Play);
        let site_def = location(&mut table, 2);
        let site = table.put(site_def, P0, ZoneKind::Play);

        table.run(r#"{"type": "reduce_move_cost", "amount": 1}"#, &GameContext::new(P0));
        table.run(r#"{"type": "move_to_location"}"#, &GameContext::new(P0));
        assert_eq!(table.state.card(timon).unwrap().location, Some(site));
    }

    #[test]
    fn test_gain_lore_per_location() {
        let mut table = Table::new();
        let site_def = location(&mut table, 1);
        table.put(site_def, P0, ZoneKind::Play);
        table.put(site_def, P0, ZoneKind::Play);
        table.put(site_def, P1, ZoneKind::Play);

        table.run(r#"{"type": "gain_lore_per_location", "per": 2}"#, &GameContext::new(P0));
        assert_eq!(table.state.lore(P0), 4);
    }
}
