//! Deck manipulation: looking, scrying, milling, searching, shuffling.

use tracing::{debug, info};

use crate::core::{EntityId, PlayerId, ZoneId, ZoneKind};
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode, SearchDestination};
use crate::effects::context::GameContext;
use crate::effects::filter::{self, Filter};
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;
use crate::zones::ZonePosition;

use super::FamilyHandler;

/// Meta key recording who last looked at a card.
pub const REVEALED_TO: &str = "revealed_to";

pub struct DeckFamily;

impl FamilyHandler for DeckFamily {
    fn name(&self) -> &'static str {
        "deck"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::LookAtTop { amount, target } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let owners = interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx);
                if !interp.may(node, ctx, format!("Look at the top {amount} cards?")) {
                    return Ok(Outcome::Declined);
                }
                let mut seen = 0;
                for owner in owners {
                    seen += look_at_top(interp, owner, ctx.player, amount).len();
                }
                Ok(if seen > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::Scry { amount } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let looked = look_at_top(interp, ctx.player, ctx.player, amount);
                if looked.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                let bottom = interp.request_target_choice(
                    ctx.player,
                    "Choose any number to put on the bottom of your deck",
                    "card",
                    &looked,
                    0,
                    looked.len(),
                    true,
                );
                for id in &bottom {
                    interp.move_to(*id, ZoneKind::Deck, ZonePosition::Bottom);
                }
                debug!(player = %ctx.player, looked = looked.len(), bottomed = bottom.len(), "scry");
                Ok(Outcome::Executed)
            }

            EffectKind::Mill { amount, target } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let mut milled = 0;
                for player in interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    milled += mill(interp, player, amount);
                }
                Ok(if milled > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::SearchDeck { filter, destination } => {
                if !interp.may(node, ctx, "Search your deck?") {
                    return Ok(Outcome::Declined);
                }
                let Some(found) = search(interp, ctx, filter.as_ref()) else {
                    interp.state.shuffle_deck(ctx.player);
                    return Ok(Outcome::NotApplicable);
                };
                match destination {
                    SearchDestination::Hand => {
                        interp.move_to(found, ZoneKind::Hand, ZonePosition::Top);
                        interp.state.shuffle_deck(ctx.player);
                    }
                    SearchDestination::Play => {
                        interp.move_to(found, ZoneKind::Play, ZonePosition::Top);
                        interp.register_triggers(found);
                        interp.state.shuffle_deck(ctx.player);
                    }
                    SearchDestination::Top => {
                        interp.state.shuffle_deck(ctx.player);
                        interp.move_to(found, ZoneKind::Deck, ZonePosition::Top);
                    }
                }
                Ok(Outcome::Executed)
            }

            EffectKind::ShuffleDeck { target } => {
                for player in interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    interp.state.shuffle_deck(player);
                    debug!(%player, "deck shuffled");
                }
                Ok(Outcome::Executed)
            }

            EffectKind::RevealTop { filter } => {
                let deck = ZoneId::new(ctx.player, ZoneKind::Deck);
                let Some(top) = interp.state.zones.top_card(deck) else {
                    return Ok(Outcome::NotApplicable);
                };
                let hit = filter::passes(filter.as_ref(), top, &interp.view(ctx));
                info!(player = %ctx.player, card = %interp.display_name(top), hit, "top card revealed");
                let position = if hit { ZoneKind::Hand } else { ZoneKind::Deck };
                let place = if hit { ZonePosition::Top } else { ZonePosition::Bottom };
                interp.move_to(top, position, place);
                Ok(Outcome::Executed)
            }

            EffectKind::DrawUntil { amount, target } => {
                let size = interp.amount(amount, ctx).max(0) as usize;
                let mut drawn = 0;
                for player in interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    let missing = size.saturating_sub(interp.state.hand_size(player));
                    if missing > 0 {
                        drawn += interp.draw_cards(player, missing)?;
                    }
                }
                Ok(if drawn > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            other => self.misrouted(other),
        }
    }

    /// Unknown deck or look tags: the acting player looks at the top
    /// `amount` of their deck.
    fn execute_unmapped(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let EffectKind::Unmapped { amount, .. } = &node.kind else {
            return self.misrouted(&node.kind);
        };
        let amount = amount.as_ref().map_or(1, |a| interp.amount(a, ctx)).max(0) as usize;
        let looked = look_at_top(interp, ctx.player, ctx.player, amount);
        Ok(if looked.is_empty() { Outcome::NotApplicable } else { Outcome::Executed })
    }
}

/// Mark the top `amount` of `owner`'s deck as seen by `viewer`.
fn look_at_top(interp: &mut Interpreter<'_>, owner: PlayerId, viewer: PlayerId, amount: usize) -> Vec<EntityId> {
    let top = interp.state.zones.top_cards(ZoneId::new(owner, ZoneKind::Deck), amount);
    for &id in &top {
        if let Some(card) = interp.state.card_mut(id) {
            card.set_state(REVEALED_TO, viewer.index() as i64);
        }
    }
    debug!(%owner, %viewer, count = top.len(), "looked at top of deck");
    top
}

fn mill(interp: &mut Interpreter<'_>, player: PlayerId, amount: usize) -> usize {
    let top = interp.state.zones.top_cards(ZoneId::new(player, ZoneKind::Deck), amount);
    let milled = top
        .iter()
        .filter(|&&id| interp.move_to(id, ZoneKind::Discard, ZonePosition::Top))
        .count();
    info!(%player, milled, "cards milled");
    milled
}

/// Pick one matching card from the acting player's deck.
fn search(interp: &mut Interpreter<'_>, ctx: &GameContext, filter: Option<&Filter>) -> Option<EntityId> {
    let pool: Vec<EntityId> = {
        let view = interp.view(ctx);
        interp
            .state
            .cards_in(ctx.player, ZoneKind::Deck)
            .iter()
            .rev()
            .copied()
            .filter(|&id| filter::passes(filter, id, &view))
            .collect()
    };
    interp
        .request_target_choice(ctx.player, "Choose a card from your deck", "card", &pool, 1, 1, false)
        .first()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use super::REVEALED_TO;
    use crate::cards::{CardDefinition, CardType};
    use crate::core::{ZoneId, ZoneKind};
    use crate::effects::{ChoiceResponse, GameContext, Outcome, ScriptedProvider};

    #[test]
    fn test_look_at_top_marks_cards() {
        let mut table = Table::new();
        let deck = table.fill(P1, ZoneKind::Deck, 3);

        table.run(r#"{"type": "look_at_top", "amount": 2, "target": {"type": "opponent"}}"#, &GameContext::new(P0));
        assert_eq!(table.state.card(deck[2]).unwrap().get_state(REVEALED_TO, -1), 0);
        assert_eq!(table.state.card(deck[1]).unwrap().get_state(REVEALED_TO, -1), 0);
        assert_eq!(table.state.card(deck[0]).unwrap().get_state(REVEALED_TO, -1), -1);
    }

    #[test]
    fn test_scry_to_bottom() {
        let mut table = Table::new();
        let deck = table.fill(P0, ZoneKind::Deck, 4);
        let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::entities([deck[3]]));

        table.run_with(r#"{"type": "scry", "amount": 2}"#, &GameContext::new(P0), &mut provider);
        let contents = table.state.zones.cards_in_zone(ZoneId::new(P0, ZoneKind::Deck));
        assert_eq!(contents[0], deck[3]);
        assert_eq!(*contents.last().unwrap(), deck[2]);
    }

    #[test]
    fn test_mill() {
        let mut table = Table::new();
        table.fill(P1, ZoneKind::Deck, 3);
        table.run(r#"{"type": "mill", "amount": 2, "target": {"type": "opponent"}}"#, &GameContext::new(P0));
        assert_eq!(table.state.deck_size(P1), 1);
        assert_eq!(table.state.cards_in(P1, ZoneKind::Discard).len(), 2);
    }

    #[test]
    fn test_search_deck_with_filter() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Deck, 3);
        let item = table.define(|id| CardDefinition::new(id, "Dinglehopper", CardType::Item));
        let wanted = table.put(item, P0, ZoneKind::Deck);
        table.fill(P0, ZoneKind::Deck, 2);

        let json = r#"{"type": "search_deck", "filter": {"type": "card", "card_type": "item"}}"#;
        assert_eq!(table.run(json, &GameContext::new(P0)), Outcome::Executed);
        assert!(table.state.in_zone(wanted, ZoneKind::Hand));
        assert_eq!(table.state.deck_size(P0), 5);
    }

    #[test]
    fn test_reveal_top_miss_goes_to_bottom() {
        let mut table = Table::new();
        let deck = table.fill(P0, ZoneKind::Deck, 3);

        let json = r#"{"type": "reveal_top", "filter": {"type": "card", "card_type": "item"}}"#;
        table.run(json, &GameContext::new(P0));
        let contents = table.state.zones.cards_in_zone(ZoneId::new(P0, ZoneKind::Deck));
        assert_eq!(contents[0], deck[2]);
        assert_eq!(table.state.hand_size(P0), 0);
    }

    #[test]
    fn test_draw_until() {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Deck, 10);
        table.fill(P0, ZoneKind::Hand, 1);

        table.run(r#"{"type": "draw_until", "amount": 4}"#, &GameContext::new(P0));
        assert_eq!(table.state.hand_size(P0), 4);
        assert_eq!(
            table.run(r#"{"type": "draw_until", "amount": 4}"#, &GameContext::new(P0)),
            Outcome::NotApplicable
        );
    }
}
