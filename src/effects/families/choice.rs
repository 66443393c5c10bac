//! Effects built around a player's pick: discards, looks, distributed
//! damage and named cards.

use tracing::{debug, info};

use crate::core::{EntityId, PlayerId, ZoneId, ZoneKind};
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode, RestDestination};
use crate::effects::context::{Binding, GameContext};
use crate::effects::filter::{self, Filter};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::{self, TargetSpec};
use crate::zones::ZonePosition;

use super::FamilyHandler;

pub struct ChoiceFamily;

impl FamilyHandler for ChoiceFamily {
    fn name(&self) -> &'static str {
        "choice"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::OpponentChoosesDiscard { amount } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let mut discarded = 0;
                for opponent in interp.state.opponents(ctx.player) {
                    let picked =
                        interp.choose_from_hand(opponent, amount, format!("Choose {amount} to discard"));
                    discarded += interp.discard_cards(opponent, &picked);
                }
                Ok(if discarded > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::ChooseAndDiscard { amount, then } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let picked = interp.choose_from_hand(ctx.player, amount, format!("Choose {amount} to discard"));
                let discarded = interp.discard_cards(ctx.player, &picked);
                if discarded == 0 {
                    return Ok(Outcome::NotApplicable);
                }
                match then {
                    Some(then) => {
                        let scope = ctx.bind("discarded", Binding::Number(discarded as i64));
                        let followup = interp.dispatch(then, &scope)?;
                        Ok(Outcome::Executed.combine(followup))
                    }
                    None => Ok(Outcome::Executed),
                }
            }

            EffectKind::LookAndChoose { amount, choose, filter, rest } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                look_and_choose(interp, node, ctx, amount, *choose, filter.as_ref(), *rest)
            }

            EffectKind::DistributeDamage { amount, target } => {
                let amount = interp.amount(amount, ctx);
                let spec = target.clone().unwrap_or_else(TargetSpec::chosen_character);
                let mut dealt_any = false;
                for _ in 0..amount.max(0) {
                    let pool = targeting::candidates(&spec, &interp.view(ctx));
                    let pool: Vec<EntityId> = interp
                        .choosable(pool, ctx.player)
                        .into_iter()
                        .filter(|&id| interp.state.in_zone(id, ZoneKind::Play))
                        .collect();
                    let picked = interp.request_target_choice(
                        ctx.player,
                        "Choose a character to deal 1 damage to",
                        spec.target_type(),
                        &pool,
                        1,
                        1,
                        false,
                    );
                    let Some(&id) = picked.first() else {
                        break;
                    };
                    interp.deal_damage(id, 1, ctx.source)?;
                    dealt_any = true;
                }
                Ok(if dealt_any { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::OpponentChoosesBanish { filter } => {
                let mut banished = 0;
                for opponent in interp.state.opponents(ctx.player) {
                    let pool: Vec<EntityId> = {
                        let view = interp.view(ctx);
                        interp
                            .state
                            .cards_in(opponent, ZoneKind::Play)
                            .iter()
                            .copied()
                            .filter(|&id| interp.is_character(id))
                            .filter(|&id| filter::passes(filter.as_ref(), id, &view))
                            .collect()
                    };
                    let picked = interp.request_target_choice(
                        opponent,
                        "Choose a character to banish",
                        "friendly_character",
                        &pool,
                        1,
                        1,
                        false,
                    );
                    for id in picked {
                        if interp.banish_card(id, ctx.source)? {
                            banished += 1;
                        }
                    }
                }
                Ok(if banished > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::NameAndReveal { then } => {
                let names = interp.cards.names();
                let Some(index) = interp.choose_option(ctx.player, "Name a card", &names, false) else {
                    return Ok(Outcome::NotApplicable);
                };
                let Some(named) = names.get(index) else {
                    return Ok(Outcome::NotApplicable);
                };
                let deck = ZoneId::new(ctx.player, ZoneKind::Deck);
                let Some(top) = interp.state.zones.top_card(deck) else {
                    debug!(player = %ctx.player, "nothing to reveal");
                    return Ok(Outcome::NotApplicable);
                };
                let hit = interp
                    .state
                    .card(top)
                    .and_then(|c| interp.cards.get(c.card_id))
                    .is_some_and(|def| &def.name == named);
                info!(player = %ctx.player, named = %named, revealed = %interp.display_name(top), hit, "card revealed");
                if !hit {
                    return Ok(Outcome::Executed);
                }
                interp.move_to(top, ZoneKind::Hand, ZonePosition::Top);
                match then {
                    Some(then) => {
                        let followup = interp.dispatch(then, ctx)?;
                        Ok(Outcome::Executed.combine(followup))
                    }
                    None => Ok(Outcome::Executed),
                }
            }

            other => self.misrouted(other),
        }
    }

    /// Unknown discard-ish tags: the acting player discards `amount`.
    fn execute_unmapped(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let EffectKind::Unmapped { amount, target, .. } = &node.kind else {
            return self.misrouted(&node.kind);
        };
        let amount = amount.as_ref().map_or(1, |a| interp.amount(a, ctx)).max(0) as usize;
        let players = interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx);
        let mut discarded = 0;
        for player in players {
            let picked = interp.choose_from_hand(player, amount, format!("Choose {amount} to discard"));
            discarded += interp.discard_cards(player, &picked);
        }
        Ok(if discarded > 0 { Outcome::Executed } else { Outcome::NotApplicable })
    }
}

fn look_and_choose(
    interp: &mut Interpreter<'_>,
    node: &EffectNode,
    ctx: &GameContext,
    amount: usize,
    choose: usize,
    filter: Option<&Filter>,
    rest: RestDestination,
) -> Result<Outcome> {
    let player: PlayerId = ctx.player;
    let looked = interp.state.zones.top_cards(ZoneId::new(player, ZoneKind::Deck), amount);
    if looked.is_empty() {
        return Ok(Outcome::NotApplicable);
    }
    let matching: Vec<EntityId> = {
        let view = interp.view(ctx);
        looked
            .iter()
            .copied()
            .filter(|&id| filter::passes(filter, id, &view))
            .collect()
    };

    let max = choose.min(matching.len());
    let min = if node.optional { 0 } else { max };
    let prompt = format!("Choose up to {choose} to put into your hand");
    let chosen = interp.request_target_choice(player, prompt, "card", &matching, min, max, node.optional);
    for &id in &chosen {
        interp.move_to(id, ZoneKind::Hand, ZonePosition::Top);
    }

    for id in looked.into_iter().filter(|id| !chosen.contains(id)) {
        match rest {
            RestDestination::Bottom => {
                interp.move_to(id, ZoneKind::Deck, ZonePosition::Bottom);
            }
            RestDestination::Discard => {
                interp.move_to(id, ZoneKind::Discard, ZonePosition::Top);
            }
            RestDestination::Top => {}
        }
    }
    debug!(%player, looked = amount, taken = chosen.len(), "look and choose");
    Ok(Outcome::Executed)
}
