//! Core engine types: entities, players, state, RNG, configuration.

pub mod config;
pub mod entity;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{GameConfig, Phase, ZoneId, ZoneKind};
pub use entity::EntityId;
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{CardSnapshot, GameState, LedgerSnapshot, PlayerSnapshot, PlayerState, StateSnapshot};
