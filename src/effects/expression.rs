//! Numeric expressions.
//!
//! Expressions are pure: they read state through a [`ConditionContext`] and
//! never write it. Missing data evaluates to 0.

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Stat};
use crate::core::ZoneKind;

use super::condition::ConditionContext;
use super::context::Binding;
use super::continuous;
use super::targeting::{self, TargetSpec};

/// Semantic counts over live state, from the acting player's side.
///
/// Serialized externally tagged: `"cards_in_hand"` or
/// `{"matching": {"type": "each_opposing_character"}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountQuery {
    DamagedOpposingCharacters,
    FriendlyCharacters,
    /// The acting player's exerted characters.
    ExertedCharacters,
    CardsInHand,
    CardsInDiscard,
    /// The acting player's locations.
    LocationsInPlay,
    /// Size of a deterministic target set (or a chosen spec's candidate pool).
    Matching(TargetSpec),
}

impl CountQuery {
    #[must_use]
    pub fn count(&self, ctx: &ConditionContext<'_>) -> i64 {
        let player = ctx.game.player;
        let in_play_of = |owner_side: bool, card_type: CardType| {
            ctx.state
                .all_in_play()
                .into_iter()
                .filter(move |&id| {
                    ctx.state.owner_of(id).is_some_and(|o| (o == player) == owner_side)
                        && ctx.card_type(id) == Some(card_type)
                })
        };

        let n = match self {
            CountQuery::DamagedOpposingCharacters => in_play_of(false, CardType::Character)
                .filter(|&id| ctx.state.card(id).is_some_and(|c| c.is_damaged()))
                .count(),
            CountQuery::FriendlyCharacters => in_play_of(true, CardType::Character).count(),
            CountQuery::ExertedCharacters => in_play_of(true, CardType::Character)
                .filter(|&id| ctx.state.card(id).is_some_and(|c| c.is_exerted()))
                .count(),
            CountQuery::CardsInHand => ctx.state.hand_size(player),
            CountQuery::CardsInDiscard => ctx.state.cards_in(player, ZoneKind::Discard).len(),
            CountQuery::LocationsInPlay => in_play_of(true, CardType::Location).count(),
            CountQuery::Matching(spec) => targeting::candidates(spec, ctx).len(),
        };
        n as i64
    }
}

/// A numeric value.
///
/// ```
/// use ink_engine::effects::Expression;
///
/// let expr: Expression = serde_json::from_str(
///     r#"{"type": "multiply", "value": {"type": "count", "query": "cards_in_hand"}, "factor": 2}"#,
/// ).unwrap();
/// assert!(matches!(expr, Expression::Multiply { factor: 2, .. }));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    Constant { value: i64 },
    /// Effective stat of the source card.
    SourceStat { stat: Stat },
    /// A bound variable. Entity bindings have no numeric value.
    Variable { name: String },
    /// Effective stat of the card bound to `name`.
    VariableStat { name: String, stat: Stat },
    Count { query: CountQuery },
    /// The triggering event's amount (damage dealt, cards drawn).
    EventAmount,
    Sum { terms: Vec<Expression> },
    Multiply { value: Box<Expression>, factor: i64 },
}

impl Expression {
    #[must_use]
    pub fn constant(value: i64) -> Self {
        Expression::Constant { value }
    }

    #[must_use]
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> i64 {
        self.evaluate_at(ctx, 0)
    }

    // `depth` counts variable indirections; a bound expression is
    // re-evaluated once, deeper chains read as 0.
    fn evaluate_at(&self, ctx: &ConditionContext<'_>, depth: u8) -> i64 {
        match self {
            Expression::Constant { value } => *value,
            Expression::SourceStat { stat } => ctx.game.source.map_or(0, |source| {
                continuous::effective_stat(ctx.state, ctx.cards, source, *stat)
            }),
            Expression::Variable { name } => match ctx.game.variable(name) {
                Some(Binding::Number(n)) => *n,
                Some(Binding::Expression(inner)) if depth == 0 => inner.evaluate_at(ctx, depth + 1),
                _ => 0,
            },
            Expression::VariableStat { name, stat } => ctx
                .game
                .entity(name)
                .map_or(0, |id| continuous::effective_stat(ctx.state, ctx.cards, id, *stat)),
            Expression::Count { query } => query.count(ctx),
            Expression::EventAmount => ctx.game.event.amount,
            Expression::Sum { terms } => terms
                .iter()
                .fold(0, |total: i64, t| total.saturating_add(t.evaluate_at(ctx, depth))),
            Expression::Multiply { value, factor } => value.evaluate_at(ctx, depth).saturating_mul(*factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardRegistry};
    use crate::core::{EntityId, GameConfig, GameState, PlayerId};
    use crate::effects::GameContext;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn setup() -> (GameState, CardRegistry, EntityId) {
        let mut cards = CardRegistry::new();
        cards.register(
            CardDefinition::new(CardId::new(1), "Maui", CardType::Character).with_stats(5, 5, 2),
        );
        cards.register(CardDefinition::new(CardId::new(2), "Motunui", CardType::Location));
        let mut state = GameState::new(GameConfig::default());
        let maui = state.create_card(CardId::new(1), P0, ZoneKind::Play);
        state.create_card(CardId::new(2), P0, ZoneKind::Play);
        let hurt = state.create_card(CardId::new(1), P1, ZoneKind::Play);
        state.create_card(CardId::new(1), P1, ZoneKind::Play);
        state.put_damage(hurt, 1);
        for _ in 0..3 {
            state.create_card(CardId::new(1), P0, ZoneKind::Hand);
        }
        (state, cards, maui)
    }

    fn eval(state: &GameState, cards: &CardRegistry, game: &GameContext, expr: &Expression) -> i64 {
        expr.evaluate(&ConditionContext::new(state, cards, game))
    }

    #[test]
    fn test_counts() {
        let (state, cards, _) = setup();
        let game = GameContext::new(P0);
        let count = |query| eval(&state, &cards, &game, &Expression::Count { query });

        assert_eq!(count(CountQuery::DamagedOpposingCharacters), 1);
        assert_eq!(count(CountQuery::FriendlyCharacters), 1);
        assert_eq!(count(CountQuery::CardsInHand), 3);
        assert_eq!(count(CountQuery::LocationsInPlay), 1);
        assert_eq!(count(CountQuery::ExertedCharacters), 0);
        assert_eq!(count(CountQuery::Matching(TargetSpec::EachOpposingCharacter { filter: None })), 2);
    }

    #[test]
    fn test_source_stat_and_arithmetic() {
        let (state, cards, maui) = setup();
        let game = GameContext::new(P0).with_source(maui);
        let expr = Expression::Sum {
            terms: vec![
                Expression::SourceStat { stat: Stat::Lore },
                Expression::Multiply { value: Box::new(Expression::constant(3)), factor: 2 },
            ],
        };
        assert_eq!(eval(&state, &cards, &game, &expr), 8);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let (state, cards, _) = setup();
        let game = GameContext::new(P0);
        let huge = || Box::new(Expression::constant(i64::MAX));

        let doubled = Expression::Multiply { value: huge(), factor: 2 };
        assert_eq!(eval(&state, &cards, &game, &doubled), i64::MAX);
        let negated = Expression::Multiply { value: huge(), factor: -2 };
        assert_eq!(eval(&state, &cards, &game, &negated), i64::MIN);
        let summed = Expression::Sum { terms: vec![*huge(), Expression::constant(1)] };
        assert_eq!(eval(&state, &cards, &game, &summed), i64::MAX);
    }

    #[test]
    fn test_variable_reevaluates_one_level() {
        let (state, cards, _) = setup();
        let hand = Expression::Count { query: CountQuery::CardsInHand };
        let game = GameContext::new(P0)
            .bind("x", Binding::Expression(hand))
            .bind("y", Binding::Expression(Expression::Variable { name: "x".into() }));

        assert_eq!(eval(&state, &cards, &game, &Expression::Variable { name: "x".into() }), 3);
        assert_eq!(eval(&state, &cards, &game, &Expression::Variable { name: "y".into() }), 0);
        assert_eq!(eval(&state, &cards, &game, &Expression::Variable { name: "missing".into() }), 0);
    }

    #[test]
    fn test_variable_stat() {
        let (state, cards, maui) = setup();
        let game = GameContext::new(P0).bind("it", Binding::Entity(maui));
        let expr = Expression::VariableStat { name: "it".into(), stat: Stat::Strength };
        assert_eq!(eval(&state, &cards, &game, &expr), 5);
    }
}
