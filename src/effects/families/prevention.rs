//! Restrictions and protection.
//!
//! Each kind becomes one ledger record. Card-scoped restrictions default to
//! a chosen character (an opposing one for the "can't" family, a friendly
//! one for protection); player-scoped ones record the player entities.

use crate::core::EntityId;
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode, RestrictionSpec};
use crate::effects::context::GameContext;
use crate::effects::continuous::{ContinuousKind, Restriction};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::{Selection, TargetSpec};

use super::FamilyHandler;

pub struct PreventionFamily;

/// Whom a restriction lands on when the node does not say.
#[derive(Clone, Copy)]
enum Scope {
    Opposing,
    Friendly,
    Opponents,
    Controller,
}

impl FamilyHandler for PreventionFamily {
    fn name(&self) -> &'static str {
        "prevention"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let (spec, restriction, scope) = match &node.kind {
            EffectKind::CantQuest(spec) => (spec, Restriction::CantQuest, Scope::Opposing),
            EffectKind::CantChallenge(spec) => (spec, Restriction::CantChallenge, Scope::Opposing),
            EffectKind::CantBeChallenged(spec) => (spec, Restriction::CantBeChallenged, Scope::Friendly),
            EffectKind::MustChallenge(spec) => (spec, Restriction::MustChallenge, Scope::Opposing),
            EffectKind::ForceQuest(spec) => (spec, Restriction::MustQuest, Scope::Opposing),
            EffectKind::CantReady(spec) => (spec, Restriction::CantReady, Scope::Opposing),
            EffectKind::CantPlayActions(spec) => (spec, Restriction::CantPlayActions, Scope::Opponents),
            EffectKind::CantUseAbilities(spec) => (spec, Restriction::CantUseAbilities, Scope::Opposing),
            EffectKind::PreventDiscard(spec) => (spec, Restriction::CantDiscard, Scope::Controller),
            EffectKind::GrantHexproof(spec) => (spec, Restriction::CantBeChosen, Scope::Friendly),
            EffectKind::GrantUnexertable(spec) => (spec, Restriction::Unexertable, Scope::Friendly),
            EffectKind::DamageShield { amount, target, duration } => {
                let targets = interp.card_targets(target.as_ref(), friendly(), ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                let kind = ContinuousKind::DamageShield { amount: *amount };
                return Ok(match interp.add_effect(ctx, targets, duration, kind) {
                    Some(_) => Outcome::Executed,
                    None => Outcome::NotApplicable,
                });
            }
            other => return self.misrouted(other),
        };

        let targets = restriction_targets(interp, spec, scope, ctx);
        let duration = Interpreter::default_duration(ctx, spec.duration);
        Ok(interp.restrict(ctx, targets, restriction, duration))
    }
}

fn friendly() -> TargetSpec {
    TargetSpec::ChosenFriendlyCharacter(Selection::default())
}

fn restriction_targets(
    interp: &mut Interpreter<'_>,
    spec: &RestrictionSpec,
    scope: Scope,
    ctx: &GameContext,
) -> Vec<EntityId> {
    match scope {
        Scope::Opponents | Scope::Controller => {
            let default = match scope {
                Scope::Opponents => TargetSpec::AllOpponents,
                _ => TargetSpec::Self_,
            };
            let players = match &spec.target {
                Some(target) => interp.resolve_player_targets(target, ctx),
                None => interp.resolve_player_targets(&default, ctx),
            };
            players.into_iter().map(EntityId::player).collect()
        }
        Scope::Opposing => {
            let default = TargetSpec::ChosenOpposingCharacter(Selection::default());
            interp.card_targets(spec.target.as_ref(), default, ctx)
        }
        Scope::Friendly => interp.card_targets(spec.target.as_ref(), friendly(), ctx),
    }
}
