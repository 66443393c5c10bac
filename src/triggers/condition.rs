//! Trigger conditions.
//!
//! Conditions decide whether a registered trigger fires for an event, given
//! the trigger's own source card and controller.

use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use crate::cards::{CardRegistry, CardType};
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::{ConditionContext, Filter, GameContext};

/// A condition that must hold for a trigger to fire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TriggerCondition {
    Always,
    Never,

    // === Relation to the trigger's source ===
    /// The event's source is this trigger's card.
    SourceIsSelf,
    /// The event's source is some other card.
    SourceIsOther,
    /// The event's target is this trigger's card.
    TargetIsSelf,

    // === Event source filters ===
    SourceIsCharacter,
    SourceControlledByController,
    SourceControlledByOpponent,
    /// The event's source card passes a filter, evaluated from the trigger
    /// controller's point of view.
    SourceMatches(Filter),

    // === Player / value filters ===
    /// The event belongs to the trigger's controller.
    ForController,
    AmountAtLeast(i64),

    // === Combinators ===
    All(Vec<TriggerCondition>),
    Any(Vec<TriggerCondition>),
    Not(Box<TriggerCondition>),
}

impl TriggerCondition {
    /// Combine with AND.
    #[must_use]
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::Always => other,
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Combine with OR.
    #[must_use]
    pub fn or(self, other: TriggerCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against an event.
    #[must_use]
    pub fn evaluate(&self, ctx: &TriggerContext<'_>) -> bool {
        let event = ctx.event;
        match self {
            Self::Always => true,
            Self::Never => false,

            Self::SourceIsSelf => event.source.is_some() && event.source == ctx.source,
            Self::SourceIsOther => event.source.is_some() && event.source != ctx.source,
            Self::TargetIsSelf => event.target.is_some() && event.target == ctx.source,

            Self::SourceIsCharacter => event
                .source
                .and_then(|id| ctx.state.card(id))
                .and_then(|card| ctx.cards.get(card.card_id))
                .is_some_and(|def| def.card_type == CardType::Character),
            Self::SourceControlledByController => event
                .source
                .and_then(|id| ctx.state.owner_of(id))
                .is_some_and(|owner| owner == ctx.controller),
            Self::SourceControlledByOpponent => event
                .source
                .and_then(|id| ctx.state.owner_of(id))
                .is_some_and(|owner| owner != ctx.controller),
            Self::SourceMatches(filter) => event.source.is_some_and(|id| {
                let mut game = GameContext::new(ctx.controller);
                game.source = ctx.source;
                filter.matches(id, &ConditionContext::new(ctx.state, ctx.cards, &game))
            }),

            Self::ForController => event.player == Some(ctx.controller),
            Self::AmountAtLeast(min) => event.amount >= *min,

            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),
            Self::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

/// What a trigger condition can see.
pub struct TriggerContext<'a> {
    pub event: &'a GameEvent,
    /// The trigger's source card.
    pub source: Option<EntityId>,
    pub controller: PlayerId,
    pub state: &'a GameState,
    pub cards: &'a CardRegistry,
}
