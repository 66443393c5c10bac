//! Engine error type.
//!
//! Only structural defects surface as errors: a modal index the ability does
//! not declare, an id that names no card, runaway recursion. Game-state
//! conditions (no legal target, not enough ink, an empty deck, a declined
//! "may") are reported through [`Outcome`](crate::effects::Outcome) or a
//! `false` return instead.

use thiserror::Error;

use crate::cards::CardId;
use crate::core::{EntityId, PlayerId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("modal choice index {index} out of bounds for {len} options")]
    InvalidModalIndex { index: usize, len: usize },

    #[error("no card instance with id {0}")]
    UnknownCard(EntityId),

    #[error("no card definition registered for {0}")]
    UnknownDefinition(CardId),

    #[error("effect nesting exceeded the limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("{0} is not seated in this game")]
    InvalidPlayer(PlayerId),

    #[error("failed to encode state snapshot: {0}")]
    Snapshot(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
