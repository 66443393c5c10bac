//! The effect interpreter.
//!
//! Card abilities arrive as JSON trees of [`EffectNode`]s. The
//! [`Interpreter`] walks a tree against live state:
//!
//! - wrappers (`optional`, `conditional`, `static`, `activated`, ...) adjust
//!   the context or gate their children
//! - composites (`sequence`, `choice`, `for_each`, ...) combine children
//! - the common leaves (`draw`, `damage`, `gain_lore`, ...) run inline
//! - every other leaf belongs to one [`Family`] handler
//!
//! Targets come from a [`TargetSpec`], conditions from a [`ConditionNode`],
//! and any decision a player makes goes through a [`DecisionProvider`].
//! Effects that outlast their resolution land in the ledger as
//! [`ActiveEffect`]s.
//!
//! ```
//! use ink_engine::cards::CardRegistry;
//! use ink_engine::core::{GameConfig, GameState, PlayerId};
//! use ink_engine::effects::{EffectNode, GameContext, Interpreter, Outcome};
//!
//! let mut state = GameState::new(GameConfig::default());
//! let cards = CardRegistry::new();
//! let node: EffectNode = serde_json::from_str(r#"{"type": "gain_lore", "amount": 2}"#).unwrap();
//!
//! let ctx = GameContext::new(PlayerId::new(0));
//! let outcome = Interpreter::new(&mut state, &cards).execute(&node, &ctx).unwrap();
//! assert_eq!(outcome, Outcome::Executed);
//! assert_eq!(state.lore(PlayerId::new(0)), 2);
//! ```

mod ast;
mod choice;
mod condition;
mod context;
pub mod continuous;
mod expression;
pub mod families;
mod filter;
mod interpreter;
mod ops;
mod targeting;

pub use ast::{Amount, EffectKind, EffectNode, RestDestination, RestrictionSpec, Route, SearchDestination};
pub use choice::{
    AutoSelect, ChoiceKind, ChoiceOption, ChoiceRequest, ChoiceResponse, DecisionProvider, ScriptedProvider, NO, YES,
};
pub use condition::{ConditionContext, ConditionEvaluator, ConditionNode};
pub use context::{Binding, EventContext, GameContext, Payload};
pub use continuous::{ActiveEffect, ContinuousKind, Duration, EffectId, HookKind, Restriction};
pub use expression::{CountQuery, Expression};
pub use families::{Family, FamilyHandler};
pub use filter::{CardFilter, Comparison, Filter, Side, StatComparison, TypeFilter};
pub use interpreter::{Interpreter, Outcome};
pub use targeting::{candidates, Selection, TargetSpec};
