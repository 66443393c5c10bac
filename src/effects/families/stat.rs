//! Strength, willpower and lore modifiers.

use crate::cards::Stat;
use crate::core::EntityId;
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::continuous::{ContinuousKind, Duration};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;

use super::FamilyHandler;

pub struct StatFamily;

impl FamilyHandler for StatFamily {
    fn name(&self) -> &'static str {
        "stat"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::ModifyStrength { amount, target, duration } => {
                let delta = interp.amount(amount, ctx);
                let targets = stat_targets(interp, target.as_ref(), ctx);
                Ok(modify(interp, ctx, targets, &[(Stat::Strength, delta)], *duration))
            }
            EffectKind::ModifyWillpower { amount, target, duration } => {
                let delta = interp.amount(amount, ctx);
                let targets = stat_targets(interp, target.as_ref(), ctx);
                let outcome = modify(interp, ctx, targets, &[(Stat::Willpower, delta)], *duration);
                // A willpower drop can make existing damage lethal.
                interp.settle_banishment()?;
                Ok(outcome)
            }
            EffectKind::ModifyLore { amount, target, duration } => {
                let delta = interp.amount(amount, ctx);
                let targets = stat_targets(interp, target.as_ref(), ctx);
                Ok(modify(interp, ctx, targets, &[(Stat::Lore, delta)], *duration))
            }
            EffectKind::ModifyStats { strength, willpower, lore, target, duration } => {
                let targets = stat_targets(interp, target.as_ref(), ctx);
                let deltas = [(Stat::Strength, *strength), (Stat::Willpower, *willpower), (Stat::Lore, *lore)];
                let outcome = modify(interp, ctx, targets, &deltas, *duration);
                interp.settle_banishment()?;
                Ok(outcome)
            }
            EffectKind::StrengthPerCount { query, per, target, duration } => {
                let count = query.count(&interp.view(ctx));
                let targets = stat_targets(interp, target.as_ref(), ctx);
                Ok(modify(interp, ctx, targets, &[(Stat::Strength, per.saturating_mul(count))], *duration))
            }
            other => self.misrouted(other),
        }
    }
}

/// Static abilities buff their own card; one-shot effects pick a character.
fn stat_targets(interp: &mut Interpreter<'_>, target: Option<&TargetSpec>, ctx: &GameContext) -> Vec<EntityId> {
    let default = if ctx.static_ability && ctx.source.is_some() {
        TargetSpec::Self_
    } else {
        TargetSpec::chosen_character()
    };
    interp.card_targets(target, default, ctx)
}

/// One modifier record per non-zero delta.
fn modify(
    interp: &mut Interpreter<'_>,
    ctx: &GameContext,
    targets: Vec<EntityId>,
    deltas: &[(Stat, i64)],
    duration: Option<Duration>,
) -> Outcome {
    if targets.is_empty() {
        return Outcome::NotApplicable;
    }
    let duration = Interpreter::default_duration(ctx, duration);
    let mut added = false;
    for &(stat, delta) in deltas.iter().filter(|(_, d)| *d != 0) {
        let kind = ContinuousKind::StatModifier { stat, delta };
        added |= interp.add_effect(ctx, targets.iter().copied(), duration, kind).is_some();
    }
    if added {
        Outcome::Executed
    } else {
        Outcome::NotApplicable
    }
}
