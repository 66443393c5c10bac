//! # ink-engine
//!
//! Rules-execution core for an ink-and-lore trading card game: given a
//! card's abilities as effect trees, it resolves targets, evaluates
//! conditions, mutates game state and asks a decision provider whenever a
//! player has to choose.
//!
//! ## Design Principles
//!
//! 1. **Data-driven abilities**: abilities are [`EffectNode`] trees
//!    deserialized from JSON. The engine never special-cases a card by name.
//!
//! 2. **One decision seam**: every choice goes through a
//!    [`DecisionProvider`]. Tests script it, an AI or a UI implements it, and
//!    without one the engine picks deterministically.
//!
//! 3. **Errors are structural**: no target, no ink or a declined "may" are
//!    [`Outcome`]s, never errors. Only malformed data surfaces as
//!    [`EngineError`].
//!
//! ## Modules
//!
//! - `core`: entity ids, players, configuration, RNG and `GameState`
//! - `zones`: ordered and unordered per-player zones
//! - `cards`: card definitions, keywords and instances
//! - `triggers`: events and the standing-trigger registry
//! - `effects`: the effect interpreter and its family handlers
//! - `rules`: the card-play state machine and orchestrator hooks

pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod rules;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{EntityId, GameConfig, GameRng, GameState, Phase, PlayerId, PlayerMap, ZoneId, ZoneKind};

pub use crate::zones::{ZoneManager, ZonePosition};

pub use crate::cards::{CardDefinition, CardId, CardInstance, CardRegistry, CardType, Keyword, KeywordKind, Stat};

pub use crate::effects::{
    ActiveEffect, AutoSelect, ChoiceRequest, ChoiceResponse, ConditionNode, DecisionProvider, EffectKind, EffectNode,
    GameContext, Interpreter, Outcome, ScriptedProvider, TargetSpec,
};

pub use crate::triggers::{EventKind, GameEvent, Trigger, TriggerEvent, TriggerRegistry};

pub use crate::rules::{execute_play_card, DefaultHooks, GameResult, PlayOptions, PlayRequest, TurnHooks};

pub use crate::error::{EngineError, Result};
