//! Card play and the orchestrator seam.
//!
//! - [`execute_play_card`]: the Normal / Shift / Sing state machine
//! - [`TurnHooks`]: what the machine asks of the turn orchestrator
//!
//! Turn structure itself (ready, set, draw, questing, challenges) belongs to
//! the orchestrator; this module only covers a card leaving the hand.

pub mod hooks;
pub mod play;

pub use hooks::{DefaultHooks, GameResult, TurnHooks};
pub use play::{execute_play_card, PlayOptions, PlayPath, PlayRequest};
