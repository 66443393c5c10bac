//! Damage-shaped effects beyond the plain inline `damage`.

use tracing::{debug, info};

use crate::core::ZoneKind;
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::filter::Side;
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;

use super::FamilyHandler;

pub struct DamageFamily;

impl FamilyHandler for DamageFamily {
    fn name(&self) -> &'static str {
        "damage"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::PutDamage { amount, target } => {
                let amount = interp.amount(amount, ctx);
                let targets = interp.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                if targets.is_empty() || amount <= 0 {
                    return Ok(Outcome::NotApplicable);
                }
                for id in targets {
                    let placed = interp.state.put_damage(id, amount);
                    info!(card = %id, placed, "damage counters placed");
                }
                interp.settle_banishment()?;
                Ok(Outcome::Executed)
            }

            EffectKind::MoveDamage { amount, from, to } => {
                let amount = interp.amount(amount, ctx);
                let Some(&origin) = interp.card_targets(Some(from), TargetSpec::Self_, ctx).first() else {
                    return Ok(Outcome::NotApplicable);
                };
                let Some(&destination) = interp.card_targets(Some(to), TargetSpec::Self_, ctx).first() else {
                    return Ok(Outcome::NotApplicable);
                };
                if origin == destination {
                    return Ok(Outcome::NotApplicable);
                }
                let moved = interp.state.heal(origin, amount);
                if moved == 0 {
                    debug!(card = %origin, "no damage to move");
                    return Ok(Outcome::NotApplicable);
                }
                interp.state.put_damage(destination, moved);
                info!(from = %origin, to = %destination, moved, "damage moved");
                interp.settle_banishment()?;
                Ok(Outcome::Executed)
            }

            EffectKind::ReflectDamage { amount } => {
                let Some(target) = ctx.event.source.filter(|&id| interp.state.in_zone(id, ZoneKind::Play)) else {
                    debug!("no event source to reflect damage to");
                    return Ok(Outcome::NotApplicable);
                };
                let amount = match amount {
                    Some(amount) => interp.amount(amount, ctx),
                    None => ctx.event.amount,
                };
                if amount <= 0 {
                    return Ok(Outcome::NotApplicable);
                }
                interp.deal_damage(target, amount, ctx.source)?;
                Ok(Outcome::Executed)
            }

            EffectKind::DamagePerExerted { per, target, side } => {
                let per = interp.amount(per, ctx);
                let exerted = exerted_characters(interp, ctx, *side);
                let total = per.saturating_mul(exerted as i64);
                if total <= 0 {
                    return Ok(Outcome::NotApplicable);
                }
                let targets = interp.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                for id in targets {
                    interp.deal_damage(id, total, ctx.source)?;
                }
                Ok(Outcome::Executed)
            }

            EffectKind::DamageFromTrigger { target } => {
                let amount = ctx.event.amount;
                if amount <= 0 {
                    return Ok(Outcome::NotApplicable);
                }
                let targets = interp.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                for id in targets {
                    interp.deal_damage(id, amount, ctx.source)?;
                }
                Ok(Outcome::Executed)
            }

            other => self.misrouted(other),
        }
    }
}

fn exerted_characters(interp: &Interpreter<'_>, ctx: &GameContext, side: Side) -> usize {
    interp
        .state
        .all_in_play()
        .into_iter()
        .filter(|&id| {
            let owner = interp.state.owner_of(id);
            match side {
                Side::Self_ => owner == Some(ctx.player),
                Side::Opponent => owner.is_some_and(|o| o != ctx.player),
                Side::Any => true,
            }
        })
        .filter(|&id| interp.is_character(id) && interp.state.card(id).is_some_and(|c| !c.ready))
        .count()
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use crate::core::ZoneKind;
    use crate::effects::{GameContext, Outcome};
    use crate::triggers::GameEvent;

    #[test]
    fn test_put_damage_ignores_resist() {
        let mut table = Table::new();
        let tough = table.define(|id| {
            crate::cards::CardDefinition::new(id, "Hercules", crate::cards::CardType::Character)
                .with_stats(3, 5, 1)
                .with_keyword(crate::cards::Keyword::Resist(2))
        });
        let herc = table.put(tough, P1, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![herc]);

        table.run(r#"{"type": "put_damage", "amount": 2}"#, &ctx);
        assert_eq!(table.damage(herc), 2);
        table.run(r#"{"type": "damage", "amount": 2}"#, &ctx);
        assert_eq!(table.damage(herc), 2);
    }

    #[test]
    fn test_move_damage() {
        let mut table = Table::new();
        let def = table.character("Pumbaa", 2, 5, 1);
        let mine = table.put(def, P0, ZoneKind::Play);
        let theirs = table.put(def, P1, ZoneKind::Play);
        table.state.put_damage(mine, 3);
        let ctx = GameContext::new(P0).with_source(mine);

        let outcome = table.run(
            r#"{"type": "move_damage", "amount": 2, "from": {"type": "self"}, "to": {"type": "chosen_opposing_character"}}"#,
            &ctx,
        );
        assert_eq!(outcome, Outcome::Executed);
        assert_eq!(table.damage(mine), 1);
        assert_eq!(table.damage(theirs), 2);
    }

    #[test]
    fn test_reflect_damage_uses_event() {
        let mut table = Table::new();
        let def = table.character("Beast", 4, 4, 2);
        let attacker = table.put(def, P1, ZoneKind::Play);
        let defender = table.put(def, P0, ZoneKind::Play);
        let event = GameEvent::damage(Some(attacker), defender, 3);
        let ctx = GameContext::new(P0).with_source(defender).with_event(&event);

        assert_eq!(table.run(r#"{"type": "reflect_damage"}"#, &ctx), Outcome::Executed);
        assert_eq!(table.damage(attacker), 3);
    }

    #[test]
    fn test_damage_per_exerted() {
        let mut table = Table::new();
        let def = table.character("Scar", 3, 9, 1);
        let target = table.put(def, P1, ZoneKind::Play);
        for _ in 0..2 {
            let id = table.put(def, P0, ZoneKind::Play);
            table.state.card_mut(id).unwrap().ready = false;
        }
        let ctx = GameContext::new(P0).with_targets(vec![target]);

        table.run(r#"{"type": "damage_per_exerted", "per": 2}"#, &ctx);
        assert_eq!(table.damage(target), 4);
    }

    #[test]
    fn test_damage_from_trigger_without_amount() {
        let mut table = Table::new();
        table.fill(P1, ZoneKind::Play, 1);
        let outcome = table.run(r#"{"type": "damage_from_trigger"}"#, &GameContext::new(P0));
        assert_eq!(outcome, Outcome::NotApplicable);
    }
}
