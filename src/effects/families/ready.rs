//! Exerting and readying cards and ink.

use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::continuous::Restriction;
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::{Selection, TargetSpec};

use super::FamilyHandler;

pub struct ReadyFamily;

impl FamilyHandler for ReadyFamily {
    fn name(&self) -> &'static str {
        "ready"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::Exert { target } => {
                let default = TargetSpec::ChosenOpposingCharacter(Selection::default());
                let targets = interp.card_targets(target.as_ref(), default, ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                let names = interp.names(&targets);
                if !interp.may(node, ctx, format!("Exert {names}?")) {
                    return Ok(Outcome::Declined);
                }
                let exerted = targets.into_iter().filter(|&id| interp.exert_card(id)).count();
                Ok(changed(exerted))
            }

            EffectKind::Ready { target } => {
                let default = TargetSpec::ChosenFriendlyCharacter(Selection::default());
                let targets = interp.card_targets(target.as_ref(), default, ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                let names = interp.names(&targets);
                if !interp.may(node, ctx, format!("Ready {names}?")) {
                    return Ok(Outcome::Declined);
                }
                let readied = targets.into_iter().filter(|&id| interp.ready_card(id)).count();
                Ok(changed(readied))
            }

            EffectKind::ReadyCantQuest { target } => {
                let default = TargetSpec::ChosenFriendlyCharacter(Selection::default());
                let targets = interp.card_targets(target.as_ref(), default, ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                for &id in &targets {
                    interp.ready_card(id);
                }
                Ok(interp.restrict(ctx, targets, Restriction::CantQuest, Interpreter::default_duration(ctx, None)))
            }

            EffectKind::ReadyInk { amount, target } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let mut readied = 0;
                for player in interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    readied += interp.state.ready_ink_cards(player, amount);
                }
                Ok(changed(readied))
            }

            EffectKind::ExertInk { amount, target } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let mut exerted = 0;
                for player in interp.resolve_players_or(target.as_ref(), TargetSpec::Opponent, ctx) {
                    exerted += interp.state.exert_ink_cards(player, amount);
                }
                Ok(changed(exerted))
            }

            other => self.misrouted(other),
        }
    }
}

fn changed(count: usize) -> Outcome {
    if count > 0 {
        Outcome::Executed
    } else {
        Outcome::NotApplicable
    }
}
