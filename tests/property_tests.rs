//! Property tests for the arithmetic floors, filter algebra and the choice
//! sanitizer.

mod common;

use common::{Table, P0, P1};
use ink_engine::cards::{CardDefinition, CardType, Keyword};
use ink_engine::core::ZoneKind;
use ink_engine::effects::{
    CardFilter, ChoiceKind, ChoiceOption, ChoiceRequest, ChoiceResponse, Comparison, ConditionContext, Filter,
    GameContext, Outcome, ScriptedProvider,
};
use proptest::prelude::*;

const SUBTYPES: [&str; 4] = ["Hero", "Villain", "Princess", "Pirate"];

fn subtype_filter() -> impl Strategy<Value = Filter> {
    prop::sample::select(SUBTYPES.to_vec()).prop_map(|s| Filter::card(CardFilter::new().with_subtype(s)))
}

fn filter_tree() -> impl Strategy<Value = Filter> {
    subtype_filter().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(Filter::and),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Filter::or),
            inner.prop_map(Filter::not),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Healing never leaves negative damage.
    #[test]
    fn heal_floors_at_zero(damage in 0i64..10, heal in 0i64..20) {
        let mut table = Table::new();
        let def = table.character("Rafiki", 2, 1, 20, 1);
        let rafiki = table.put(def, P0, ZoneKind::Play);
        table.state.put_damage(rafiki, damage);

        let json = format!(r#"{{"type": "heal", "amount": {heal}}}"#);
        table.run(&json, &GameContext::new(P0).with_targets(vec![rafiki]));
        prop_assert_eq!(table.state.card(rafiki).unwrap().damage, (damage - heal).max(0));
    }

    // Lore never goes below zero.
    #[test]
    fn lore_floors_at_zero(lore in 0i64..20, lost in 0i64..30) {
        let mut table = Table::new();
        table.state.set_lore(P1, lore);
        let json = format!(r#"{{"type": "lose_lore", "amount": {lost}, "target": {{"type": "opponent"}}}}"#);
        table.run(&json, &GameContext::new(P0));
        prop_assert_eq!(table.state.lore(P1), (lore - lost).max(0));
    }

    // Drawing past the end of the deck draws what is there and stops.
    #[test]
    fn draw_stops_at_empty_deck(deck in 0usize..6, count in 0i64..10) {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Deck, deck);
        let json = format!(r#"{{"type": "draw", "amount": {count}}}"#);
        table.run(&json, &GameContext::new(P0));

        let drawn = deck.min(count as usize);
        prop_assert_eq!(table.state.hand_size(P0), drawn);
        prop_assert_eq!(table.state.deck_size(P0), deck - drawn);
    }

    // Resist reduces each hit, never below zero.
    #[test]
    fn resist_reduces_damage(resist in 0i64..4, amount in 1i64..6) {
        let mut table = Table::new();
        let def = table.define(|id| {
            CardDefinition::new(id, "Hercules", CardType::Character)
                .with_stats(3, 20, 1)
                .with_keyword(Keyword::Resist(resist))
        });
        let hercules = table.put(def, P1, ZoneKind::Play);
        let json = format!(r#"{{"type": "damage", "amount": {amount}}}"#);
        table.run(&json, &GameContext::new(P0).with_targets(vec![hercules]));
        prop_assert_eq!(table.state.card(hercules).unwrap().damage, (amount - resist).max(0));
    }

    // A declined "may" changes nothing, whatever the amount.
    #[test]
    fn declined_optional_is_inert(amount in 1i64..5, tag in prop::sample::select(vec!["draw", "gain_lore", "lose_lore", "mill"])) {
        let mut table = Table::new();
        table.fill(P0, ZoneKind::Deck, 5);
        table.state.set_lore(P0, 3);
        let before = table.state.snapshot_bytes().unwrap();

        let json = format!(r#"{{"type": "{tag}", "amount": {amount}, "optional": true}}"#);
        let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::no());
        let outcome = table.run_with(&json, &GameContext::new(P0), &mut provider);
        prop_assert_eq!(outcome, Outcome::Declined);
        prop_assert_eq!(table.state.snapshot_bytes().unwrap(), before);
    }

    // not(not(f)) == f, and(f) == f, or(f, not f) always holds.
    #[test]
    fn filter_algebra(filter in filter_tree(), subtype in prop::sample::select(SUBTYPES.to_vec())) {
        let mut table = Table::new();
        let def = table.define(|id| {
            CardDefinition::new(id, "Subject", CardType::Character).with_subtype(subtype)
        });
        let card = table.put(def, P0, ZoneKind::Play);
        let game = GameContext::new(P0);
        let ctx = ConditionContext::new(&table.state, &table.cards, &game);

        let direct = filter.matches(card, &ctx);
        prop_assert_eq!(Filter::not(Filter::not(filter.clone())).matches(card, &ctx), direct);
        prop_assert_eq!(Filter::and(vec![filter.clone()]).matches(card, &ctx), direct);
        prop_assert!(Filter::or(vec![filter.clone(), Filter::not(filter.clone())]).matches(card, &ctx));
        prop_assert!(!Filter::and(vec![filter.clone(), Filter::not(filter)]).matches(card, &ctx));
    }

    // `gte` and `lt` are complements; so are `eq` and `ne`.
    #[test]
    fn comparison_complements(lhs in -10i64..10, rhs in -10i64..10) {
        prop_assert_ne!(Comparison::Gte.compare(lhs, rhs), Comparison::Lt.compare(lhs, rhs));
        prop_assert_ne!(Comparison::Lte.compare(lhs, rhs), Comparison::Gt.compare(lhs, rhs));
        prop_assert_ne!(Comparison::Eq.compare(lhs, rhs), Comparison::Ne.compare(lhs, rhs));
    }

    // Whatever comes back, a sanitized answer stays within the request.
    #[test]
    fn sanitized_response_within_bounds(
        valid in prop::collection::vec(any::<bool>(), 1..6),
        min in 0usize..3,
        extra in 0usize..3,
        picks in prop::collection::vec(0u32..10, 0..8),
        optional in any::<bool>(),
        declined in any::<bool>(),
    ) {
        let options: Vec<ChoiceOption> = valid
            .iter()
            .enumerate()
            .map(|(i, &ok)| ChoiceOption { id: i as u32, display: format!("option {i}"), valid: ok })
            .collect();
        let request = ChoiceRequest {
            id: 1,
            player: P0,
            prompt: "Choose".into(),
            kind: ChoiceKind::Card,
            options,
            min,
            max: min + extra,
            optional,
        };
        let raw = if declined { ChoiceResponse::declined() } else { ChoiceResponse::select(picks) };
        let response = request.sanitize(raw);

        if response.declined {
            prop_assert!(optional);
            prop_assert!(response.selected.is_empty());
        } else {
            let valid_ids = request.valid_ids();
            prop_assert!(response.selected.len() <= request.max);
            prop_assert!(response.selected.iter().all(|id| valid_ids.contains(id)));
            prop_assert!(response.selected.len() >= request.min.min(valid_ids.len()));
        }
    }
}
