//! Target resolution tests.
//!
//! Covers the order in which a `chosen_*` spec looks for its answer
//! (payload, event preset, pending choices, then the player), Ward
//! screening, filters and player-valued specs.

mod common;

use common::{Table, P0, P1};
use ink_engine::cards::{CardDefinition, CardType, Keyword};
use ink_engine::core::{EntityId, ZoneKind};
use ink_engine::effects::{ChoiceKind, ChoiceResponse, GameContext, Interpreter, ScriptedProvider, TargetSpec};

fn spec(json: &str) -> TargetSpec {
    serde_json::from_str(json).expect("target spec should parse")
}

/// Two characters per side, one of the opposing pair with Ward.
struct Board {
    table: Table,
    mine: EntityId,
    theirs: EntityId,
    warded: EntityId,
    villain: EntityId,
}

fn board() -> Board {
    let mut table = Table::new();
    let hero = table.character("Aladdin", 2, 2, 3, 1);
    let ward = table.define(|id| {
        CardDefinition::new(id, "Jasmine", CardType::Character)
            .with_stats(2, 3, 1)
            .with_keyword(Keyword::Ward)
    });
    let jafar = table.define(|id| {
        CardDefinition::new(id, "Jafar", CardType::Character)
            .with_stats(3, 4, 2)
            .with_subtype("Villain")
    });

    let mine = table.put(hero, P0, ZoneKind::Play);
    let theirs = table.put(hero, P1, ZoneKind::Play);
    let warded = table.put(ward, P1, ZoneKind::Play);
    let villain = table.put(jafar, P1, ZoneKind::Play);
    Board { table, mine, theirs, warded, villain }
}

fn offered(provider: &ScriptedProvider) -> Vec<u32> {
    provider.requests[0].options.iter().map(|o| o.id).collect()
}

/// Payload targets win over every other source of an answer.
#[test]
fn test_payload_targets_take_precedence() {
    let Board { mut table, mine, theirs, .. } = board();
    let ctx = GameContext::new(P0)
        .with_targets(vec![mine])
        .with_target_card(theirs)
        .with_pending_choices(vec![theirs]);

    let mut provider = ScriptedProvider::new();
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&TargetSpec::chosen_character(), &ctx);
    assert_eq!(targets, vec![mine]);
    assert!(provider.requests.is_empty(), "no question should be asked");
}

/// An event preset is used unless it is the source card itself.
#[test]
fn test_event_preset_ignored_when_it_is_the_source() {
    let Board { mut table, mine, theirs, .. } = board();
    let chosen = TargetSpec::chosen_character();

    let preset = GameContext::new(P0).with_target_card(theirs);
    let targets = Interpreter::new(&mut table.state, &table.cards).resolve_targets(&chosen, &preset);
    assert_eq!(targets, vec![theirs]);

    let own = GameContext::new(P0).with_source(mine).with_target_card(mine);
    let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::entities([theirs]));
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&chosen, &own);
    assert_eq!(targets, vec![theirs]);
    assert_eq!(provider.requests.len(), 1);
}

/// Pending choices are honored only when they are legal candidates.
#[test]
fn test_pending_choices_filtered_by_pool() {
    let Board { mut table, mine, theirs, .. } = board();
    let opposing = spec(r#"{"type": "chosen_opposing_character"}"#);

    let ctx = GameContext::new(P0).with_pending_choices(vec![mine, theirs]);
    let targets = Interpreter::new(&mut table.state, &table.cards).resolve_targets(&opposing, &ctx);
    assert_eq!(targets, vec![theirs]);
}

/// An opponent's Ward card is never offered; the owner may still pick it.
#[test]
fn test_ward_screens_opposing_choices() {
    let Board { mut table, mine, theirs, warded, villain } = board();
    let any = TargetSpec::chosen_character();

    let mut provider = ScriptedProvider::new();
    Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&any, &GameContext::new(P0));
    let ids = offered(&provider);
    assert!(ids.contains(&mine.raw()) && ids.contains(&theirs.raw()) && ids.contains(&villain.raw()));
    assert!(!ids.contains(&warded.raw()), "Ward card offered to an opponent");
    assert_eq!(provider.requests[0].kind, ChoiceKind::Character);

    let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::entities([warded]));
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&any, &GameContext::new(P1));
    assert_eq!(targets, vec![warded]);
}

/// Ward does not stop "each" effects.
#[test]
fn test_ward_does_not_block_mass_targets() {
    let Board { mut table, theirs, warded, villain, .. } = board();
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .resolve_targets(&spec(r#"{"type": "each_opposing_character"}"#), &GameContext::new(P0));
    assert_eq!(targets, vec![theirs, warded, villain]);
}

/// Filters narrow the pool before the player is asked.
#[test]
fn test_filter_narrows_choices() {
    let Board { mut table, villain, .. } = board();
    let villains = spec(
        r#"{"type": "chosen_character", "filter": {"type": "card", "subtypes": ["Villain"]}}"#,
    );
    let mut provider = ScriptedProvider::new();
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&villains, &GameContext::new(P0));
    assert_eq!(targets, vec![villain]);
    assert_eq!(offered(&provider), vec![villain.raw()]);
}

/// A negated filter excludes the matching cards.
#[test]
fn test_not_filter_on_mass_target() {
    let Board { mut table, theirs, warded, .. } = board();
    let heroes = spec(
        r#"{"type": "each_opposing_character",
            "filter": {"type": "not", "filter": {"type": "card", "subtypes": ["Villain"]}}}"#,
    );
    let targets = Interpreter::new(&mut table.state, &table.cards).resolve_targets(&heroes, &GameContext::new(P0));
    assert_eq!(targets, vec![theirs, warded]);
}

/// "Up to" choices may come back empty; mandatory ones are topped up.
#[test]
fn test_up_to_may_pick_nothing() {
    let Board { mut table, theirs, .. } = board();
    let up_to = spec(r#"{"type": "chosen_opposing_character", "count": 2, "up_to": true}"#);
    let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::declined());
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&up_to, &GameContext::new(P0));
    assert!(targets.is_empty());
    assert!(provider.requests[0].optional);

    let exact = spec(r#"{"type": "chosen_opposing_character"}"#);
    let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::select(Vec::new()));
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&exact, &GameContext::new(P0));
    assert_eq!(targets, vec![theirs], "an empty answer to a mandatory choice is topped up");
}

/// An opponent-chosen spec asks the opponent.
#[test]
fn test_opponent_chooses() {
    let Board { mut table, mine, .. } = board();
    let chosen_by_them = spec(r#"{"type": "chosen_friendly_character", "chooser": "opponent"}"#);
    let mut provider = ScriptedProvider::new();
    let targets = Interpreter::new(&mut table.state, &table.cards)
        .with_decisions(&mut provider)
        .resolve_targets(&chosen_by_them, &GameContext::new(P0));
    assert_eq!(targets, vec![mine]);
    assert_eq!(provider.requests[0].player, P1);
}

/// Player specs resolve to players; card results map to their owners.
#[test]
fn test_player_targets() {
    let Board { mut table, theirs, .. } = board();
    let mut interp = Interpreter::new(&mut table.state, &table.cards);
    let ctx = GameContext::new(P0);

    assert_eq!(interp.resolve_player_targets(&TargetSpec::Self_, &ctx), vec![P0]);
    assert_eq!(interp.resolve_player_targets(&TargetSpec::Opponent, &ctx), vec![P1]);
    assert_eq!(interp.resolve_player_targets(&TargetSpec::EachPlayer, &ctx), vec![P0, P1]);
    assert_eq!(interp.resolve_player_targets(&TargetSpec::AllOpponents, &ctx), vec![P1]);

    let picked = ctx.clone().with_targets(vec![theirs]);
    interp.resolve_targets(&TargetSpec::chosen_character(), &picked);
    assert_eq!(interp.resolve_player_targets(&TargetSpec::OwnerOfChosen, &ctx), vec![P1]);
}

/// Players are valid entities in the unified id space.
#[test]
fn test_player_entities_round_trip() {
    let table = Table::new();
    let count = table.state.player_count();
    assert_eq!(EntityId::player(P1).as_player(count), Some(P1));
    assert_eq!(EntityId::player(P0).as_player(count), Some(P0));
}

/// "Its owner draws": card targets become their owner for player effects.
#[test]
fn test_owner_of_chosen_draws() {
    let Board { mut table, theirs, .. } = board();
    table.fill(P1, ZoneKind::Deck, 3);
    let json = r#"{"type": "sequence", "effects": [
        {"type": "return_to_hand", "target": {"type": "chosen_opposing_character"}},
        {"type": "draw", "amount": 1, "target": {"type": "owner_of_chosen"}}
    ]}"#;
    table.run(json, &GameContext::new(P0).with_targets(vec![theirs]));
    assert!(table.state.in_zone(theirs, ZoneKind::Hand));
    assert_eq!(table.state.hand_size(P1), 2);
}
