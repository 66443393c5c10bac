//! Challenge modifiers.

use tracing::debug;

use crate::cards::Keyword;
use crate::core::ZoneKind;
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::continuous::{ContinuousKind, EffectId, Restriction};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::{Selection, TargetSpec};

use super::FamilyHandler;

pub struct ChallengeFamily;

impl FamilyHandler for ChallengeFamily {
    fn name(&self) -> &'static str {
        "challenge"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let friendly = TargetSpec::ChosenFriendlyCharacter(Selection::default());
        match &node.kind {
            EffectKind::GrantChallenger { amount, target, duration } => {
                let keyword = Keyword::Challenger(interp.amount(amount, ctx));
                let targets = interp.card_targets(target.as_ref(), friendly, ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                Ok(recorded(interp.add_effect(ctx, targets, duration, ContinuousKind::GrantKeyword { keyword })))
            }

            EffectKind::GrantResist { amount, target, duration } => {
                let keyword = Keyword::Resist(interp.amount(amount, ctx));
                let targets = interp.card_targets(target.as_ref(), friendly, ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                Ok(recorded(interp.add_effect(ctx, targets, duration, ContinuousKind::GrantKeyword { keyword })))
            }

            EffectKind::CanChallengeReady { target, duration } => {
                let targets = interp.card_targets(target.as_ref(), friendly, ctx);
                let duration = Interpreter::default_duration(ctx, *duration);
                Ok(interp.restrict(ctx, targets, Restriction::CanChallengeReady, duration))
            }

            EffectKind::BanishChallenger => {
                let Some(challenger) = ctx.event.source.filter(|&id| interp.state.in_zone(id, ZoneKind::Play)) else {
                    debug!("no challenger to banish");
                    return Ok(Outcome::NotApplicable);
                };
                Ok(if interp.banish_card(challenger, ctx.source)? {
                    Outcome::Executed
                } else {
                    Outcome::NotApplicable
                })
            }

            other => self.misrouted(other),
        }
    }
}

fn recorded(id: Option<EffectId>) -> Outcome {
    match id {
        Some(_) => Outcome::Executed,
        None => Outcome::NotApplicable,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use crate::cards::KeywordKind;
    use crate::core::ZoneKind;
    use crate::effects::continuous::{self, Restriction};
    use crate::effects::{GameContext, Outcome};
    use crate::triggers::{EventKind, GameEvent};

    #[test]
    fn test_grant_challenger_stacks_with_printed() {
        let mut table = Table::new();
        let def = table.define(|id| {
            crate::cards::CardDefinition::new(id, "Shang", crate::cards::CardType::Character)
                .with_stats(2, 4, 1)
                .with_keyword(crate::cards::Keyword::Challenger(1))
        });
        let shang = table.put(def, P0, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![shang]);

        table.run(r#"{"type": "grant_challenger", "amount": 2}"#, &ctx);
        let total = continuous::keyword_total(&table.state, &table.cards, shang, KeywordKind::Challenger);
        assert_eq!(total, Some(3));
    }

    #[test]
    fn test_grant_resist_expires() {
        let mut table = Table::new();
        let def = table.character("Hades", 4, 6, 1);
        let hades = table.put(def, P0, ZoneKind::Play);
        let ctx = GameContext::new(P0).with_targets(vec![hades]);

        table.run(r#"{"type": "grant_resist", "amount": 1}"#, &ctx);
        assert!(continuous::has_keyword(&table.state, &table.cards, hades, KeywordKind::Resist));
        table.state.expire_end_of_turn();
        assert!(!continuous::has_keyword(&table.state, &table.cards, hades, KeywordKind::Resist));
    }

    #[test]
    fn test_can_challenge_ready() {
        let mut table = Table::new();
        let mine = table.fill(P0, ZoneKind::Play, 1)[0];
        table.run(r#"{"type": "can_challenge_ready"}"#, &GameContext::new(P0));
        assert!(continuous::has_restriction(&table.state, mine, Restriction::CanChallengeReady));
    }

    #[test]
    fn test_banish_challenger() {
        let mut table = Table::new();
        let def = table.character("Kida", 2, 3, 1);
        let challenger = table.put(def, P1, ZoneKind::Play);
        let defender = table.put(def, P0, ZoneKind::Play);
        let event = GameEvent::new(EventKind::Challenged)
            .with_source(challenger)
            .with_target(defender);
        let ctx = GameContext::new(P0).with_source(defender).with_event(&event);

        assert_eq!(table.run(r#"{"type": "banish_challenger"}"#, &ctx), Outcome::Executed);
        assert!(table.state.in_zone(challenger, ZoneKind::Discard));
    }
}
