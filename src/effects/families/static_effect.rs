//! Continuous grants: keywords, abilities, cost reductions.
//!
//! Inside a `static` wrapper these default to lasting while the source is in
//! play; anywhere else they last the turn.

use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::continuous::{ContinuousKind, Restriction};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;
use crate::core::EntityId;

use super::FamilyHandler;

pub struct StaticEffectFamily;

impl FamilyHandler for StaticEffectFamily {
    fn name(&self) -> &'static str {
        "static_effect"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::GrantKeyword { keyword, target, duration } => {
                let targets = interp.card_targets(target.as_ref(), TargetSpec::Self_, ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                let kind = ContinuousKind::GrantKeyword { keyword: *keyword };
                Ok(recorded(interp.add_effect(ctx, targets, duration, kind).is_some()))
            }

            EffectKind::CostReduction { amount, filter, duration, target } => {
                let amount = interp.amount(amount, ctx);
                let players: Vec<EntityId> = interp
                    .resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx)
                    .into_iter()
                    .map(EntityId::player)
                    .collect();
                let duration = Interpreter::default_duration(ctx, *duration);
                let kind = ContinuousKind::CostReduction { amount, filter: filter.clone() };
                Ok(recorded(interp.add_effect(ctx, players, duration, kind).is_some()))
            }

            EffectKind::GrantAbility { ability, target, duration } => {
                let targets = interp.card_targets(target.as_ref(), TargetSpec::Self_, ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                let kind = ContinuousKind::GrantAbility { ability: ability.clone() };
                Ok(recorded(interp.add_effect(ctx, targets, duration, kind).is_some()))
            }

            // Without a target this only describes the card itself; the play
            // machine reads it from the definition.
            EffectKind::EntersExerted { target: None } => Ok(Outcome::NotApplicable),
            EffectKind::EntersExerted { target: Some(target) } => {
                let players: Vec<EntityId> = interp
                    .resolve_player_targets(target, ctx)
                    .into_iter()
                    .map(EntityId::player)
                    .collect();
                let duration = Interpreter::default_duration(ctx, None);
                Ok(interp.restrict(ctx, players, Restriction::EntersExerted, duration))
            }

            other => self.misrouted(other),
        }
    }
}

fn recorded(added: bool) -> Outcome {
    if added {
        Outcome::Executed
    } else {
        Outcome::NotApplicable
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use crate::cards::KeywordKind;
    use crate::core::{EntityId, ZoneKind};
    use crate::effects::continuous::{self, ContinuousKind, Duration, Restriction};
    use crate::effects::{GameContext, Outcome};

    #[test]
    fn test_static_grant_lasts_while_source_in_play() {
        let mut table = Table::new();
        let def = table.character("Maui", 4, 5, 2);
        let maui = table.put(def, P0, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_source(maui);

        table.run(
            r#"{"type": "static", "effects": [{"type": "grant_keyword", "keyword": "evasive"}]}"#,
            &ctx,
        );
        assert_eq!(table.state.active_effects[0].duration, Duration::WhileSourceInPlay);
        assert!(continuous::has_keyword(&table.state, &table.cards, maui, KeywordKind::Evasive));
    }

    #[test]
    fn test_cost_reduction_on_player() {
        let mut table = Table::new();
        table.run(r#"{"type": "cost_reduction", "amount": 2, "duration": "one_use"}"#, &GameContext::new(P0));

        let record = &table.state.active_effects[0];
        assert!(record.applies_to(EntityId::player(P0)));
        assert_eq!(record.kind, ContinuousKind::CostReduction { amount: 2, filter: None });
    }

    #[test]
    fn test_grant_ability() {
        let mut table = Table::new();
        let def = table.character("Moana", 1, 3, 2);
        let moana = table.put(def, P0, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![moana]);

        let json = r#"{
            "type": "grant_ability",
            "target": {"type": "chosen_friendly_character"},
            "ability": {"type": "triggered", "on": "on_quest", "effects": [{"type": "draw"}]}
        }"#;
        assert_eq!(table.run(json, &ctx), Outcome::Executed);
        assert_eq!(continuous::granted_abilities(&table.state, moana).len(), 1);
    }

    #[test]
    fn test_enters_exerted() {
        let mut table = Table::new();
        assert_eq!(table.run(r#"{"type": "enters_exerted"}"#, &GameContext::new(P0)), Outcome::NotApplicable);

        table.run(r#"{"type": "enters_exerted", "target": {"type": "all_opponents"}}"#, &GameContext::new(P0));
        assert!(continuous::player_has_restriction(&table.state, P1, Restriction::EntersExerted));
    }
}
