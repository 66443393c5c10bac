//! Zone system for card locations.
//!
//! Each player owns a deck, hand, play area, discard and inkwell. Zone ids
//! come from `core::config`; the `ZoneManager` tracks which zone every card
//! instance is in and the order of ordered zones.

pub mod manager;

pub use manager::{ZoneManager, ZonePosition};

pub use crate::core::config::{ZoneId, ZoneKind};
