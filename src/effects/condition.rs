//! Condition evaluation.
//!
//! [`ConditionEvaluator`] answers `ConditionNode`s and [`Expression`]s
//! against a read-only view of the game. Evaluation never fails: a missing
//! card, a missing source or an unknown condition tag reads as `false`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::cards::{CardDefinition, CardInstance, CardRegistry, CardType, Stat};
use crate::core::{EntityId, GameState, PlayerId, ZoneKind};

use super::context::GameContext;
use super::continuous;
use super::expression::{CountQuery, Expression};
use super::filter::{Comparison, Filter};
use super::targeting::{self, TargetSpec};

/// Read-only view used by conditions, expressions and filters.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    pub state: &'a GameState,
    pub cards: &'a CardRegistry,
    pub game: &'a GameContext,
}

impl<'a> ConditionContext<'a> {
    #[must_use]
    pub fn new(state: &'a GameState, cards: &'a CardRegistry, game: &'a GameContext) -> Self {
        Self { state, cards, game }
    }

    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.game.player
    }

    #[must_use]
    pub fn instance(&self, id: EntityId) -> Option<&'a CardInstance> {
        self.state.card(id)
    }

    #[must_use]
    pub fn definition(&self, id: EntityId) -> Option<&'a CardDefinition> {
        self.state.card(id).and_then(|c| self.cards.get(c.card_id))
    }

    #[must_use]
    pub fn card_type(&self, id: EntityId) -> Option<CardType> {
        self.definition(id).map(|d| d.card_type)
    }

    fn source_instance(&self) -> Option<&'a CardInstance> {
        self.game.source.and_then(|s| self.state.card(s))
    }

    fn friendly_characters(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.state
            .cards_in(self.player(), ZoneKind::Play)
            .iter()
            .copied()
            .filter(move |&id| self.card_type(id) == Some(CardType::Character))
    }
}

fn one() -> i64 {
    1
}

/// Boolean predicates over the game.
///
/// Comparison conditions take `amount` and an optional `comparison`
/// (`gte` when omitted). A `type` no variant accepts parses as
/// [`ConditionNode::Unmapped`], which evaluates to `false`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "type", rename_all = "snake_case")]
pub enum ConditionNode {
    And {
        conditions: Vec<ConditionNode>,
    },
    Or {
        conditions: Vec<ConditionNode>,
    },
    Not {
        condition: Box<ConditionNode>,
    },
    Always,

    // === Player state ===
    HasCardsInHand {
        #[serde(default = "one")]
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },
    HandEmpty,
    /// Cards in the acting player's inkwell.
    InkCount {
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },
    CountCheck {
        query: CountQuery,
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },
    LoreCheck {
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },
    /// Holds if any opponent's lore satisfies the comparison.
    OpponentLoreCheck {
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },
    DeckSizeCheck {
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },

    // === Source card state ===
    SelfStatCheck {
        stat: Stat,
        amount: i64,
        #[serde(default, alias = "operator")]
        comparison: Comparison,
    },
    SelfExerted,
    SelfReady,
    SelfDamaged,
    SelfAtLocation,

    // === Board presence ===
    HasCharacterNamed {
        name: String,
    },
    HasCharacterWithSubtype {
        subtype: String,
    },
    /// The target set (or a chosen spec's candidate pool) is non-empty.
    Presence {
        target: TargetSpec,
    },
    Absence {
        target: TargetSpec,
    },

    // === Event / turn ===
    EventCardMatches {
        filter: Filter,
    },
    IsMyTurn,
    IsOpponentTurn,
    /// A per-turn flag is set (non-zero).
    TurnFlag {
        flag: String,
    },

    /// A condition the parser could not map.
    Unmapped {
        tag: String,
    },
}

impl Serialize for ConditionNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConditionNode::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for ConditionNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match ConditionNode::deserialize(&value) {
            Ok(node) => Ok(node),
            Err(err) => match value.get("type").and_then(Value::as_str) {
                Some(tag) => {
                    warn!(tag, error = %err, "condition not recognized, kept as unmapped");
                    Ok(ConditionNode::Unmapped { tag: tag.to_string() })
                }
                None => Err(de::Error::custom(err)),
            },
        }
    }
}

/// Stateless evaluator.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate a condition. Unknown data reads as `false`.
    #[must_use]
    pub fn evaluate(condition: &ConditionNode, ctx: &ConditionContext<'_>) -> bool {
        let player = ctx.player();
        match condition {
            ConditionNode::And { conditions } => conditions.iter().all(|c| Self::evaluate(c, ctx)),
            ConditionNode::Or { conditions } => conditions.iter().any(|c| Self::evaluate(c, ctx)),
            ConditionNode::Not { condition } => !Self::evaluate(condition, ctx),
            ConditionNode::Always => true,

            ConditionNode::HasCardsInHand { amount, comparison } => {
                comparison.compare(ctx.state.hand_size(player) as i64, *amount)
            }
            ConditionNode::HandEmpty => ctx.state.hand_size(player) == 0,
            ConditionNode::InkCount { amount, comparison } => {
                comparison.compare(ctx.state.total_ink(player) as i64, *amount)
            }
            ConditionNode::CountCheck { query, amount, comparison } => {
                comparison.compare(query.count(ctx), *amount)
            }
            ConditionNode::LoreCheck { amount, comparison } => {
                comparison.compare(ctx.state.lore(player), *amount)
            }
            ConditionNode::OpponentLoreCheck { amount, comparison } => ctx
                .state
                .opponents(player)
                .into_iter()
                .any(|opponent| comparison.compare(ctx.state.lore(opponent), *amount)),
            ConditionNode::DeckSizeCheck { amount, comparison } => {
                comparison.compare(ctx.state.deck_size(player) as i64, *amount)
            }

            ConditionNode::SelfStatCheck { stat, amount, comparison } => {
                ctx.game.source.is_some_and(|source| {
                    let value = continuous::effective_stat(ctx.state, ctx.cards, source, *stat);
                    comparison.compare(value, *amount)
                })
            }
            ConditionNode::SelfExerted => ctx.source_instance().is_some_and(CardInstance::is_exerted),
            ConditionNode::SelfReady => ctx.source_instance().is_some_and(|c| c.ready),
            ConditionNode::SelfDamaged => ctx.source_instance().is_some_and(CardInstance::is_damaged),
            ConditionNode::SelfAtLocation => ctx.source_instance().is_some_and(|c| c.location.is_some()),

            ConditionNode::HasCharacterNamed { name } => ctx
                .friendly_characters()
                .any(|id| ctx.definition(id).is_some_and(|d| d.name.eq_ignore_ascii_case(name))),
            ConditionNode::HasCharacterWithSubtype { subtype } => ctx
                .friendly_characters()
                .any(|id| ctx.definition(id).is_some_and(|d| d.has_subtype(subtype))),
            ConditionNode::Presence { target } => !targeting::candidates(target, ctx).is_empty(),
            ConditionNode::Absence { target } => targeting::candidates(target, ctx).is_empty(),

            ConditionNode::EventCardMatches { filter } => ctx
                .game
                .event
                .target_card
                .or(ctx.game.event.source)
                .is_some_and(|card| filter.matches(card, ctx)),
            ConditionNode::IsMyTurn => ctx.state.active_player == player,
            ConditionNode::IsOpponentTurn => ctx.state.active_player != player,
            ConditionNode::TurnFlag { flag } => ctx.state.turn_flag(flag) != 0,

            ConditionNode::Unmapped { tag } => {
                warn!(tag = %tag, "unmapped condition evaluated as false");
                false
            }
        }
    }

    /// Evaluate a numeric expression. Unknown data reads as 0.
    #[must_use]
    pub fn evaluate_expression(expression: &Expression, ctx: &ConditionContext<'_>) -> i64 {
        expression.evaluate(ctx)
    }
}
