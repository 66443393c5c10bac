//! Trigger system for "whenever ..." abilities.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: something that happened, with its source, target and player
//! - [`TriggerEvent`]: the parsed "whenever" clause of a triggered ability
//! - [`TriggerCondition`]: rules for when a trigger fires
//! - [`Trigger`]: a registered standing ability
//! - [`TriggerRegistry`]: storage and lookup for triggers
//!
//! ## Example Usage
//!
//! ```
//! use ink_engine::cards::CardRegistry;
//! use ink_engine::core::{EntityId, GameConfig, GameState, PlayerId};
//! use ink_engine::effects::{EffectKind, EffectNode};
//! use ink_engine::triggers::{EventKind, GameEvent, Trigger, TriggerCondition, TriggerRegistry};
//!
//! let mut registry = TriggerRegistry::new();
//!
//! // "Whenever this character quests, ..."
//! let on_quest = Trigger::new("Mulan", PlayerId::new(0), EventKind::Quested, EffectNode::new(EffectKind::NoOp))
//!     .with_source(EntityId(10))
//!     .with_condition(TriggerCondition::SourceIsSelf);
//! registry.register(on_quest);
//!
//! let state = GameState::new(GameConfig::default());
//! let event = GameEvent::for_card(EventKind::Quested, EntityId(10), PlayerId::new(0));
//! let fired = registry.find_triggers(&event, &state, &CardRegistry::new());
//! assert_eq!(fired.len(), 1);
//! ```

mod condition;
mod event;
mod registry;

pub use condition::{TriggerCondition, TriggerContext};
pub use event::{EventKind, GameEvent, TriggerEvent};
pub use registry::{Trigger, TriggerId, TriggerRegistry, TriggeredEffect};
