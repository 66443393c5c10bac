//! Entity identification.
//!
//! Players and card instances share one id space so that a resolved target
//! list can hold either kind without a wrapper enum.
//!
//! ## ID Layout
//!
//! - `0..player_count`: players
//! - `player_count..`: card instances, allocated by `GameState`
//!
//! ```
//! use ink_engine::core::{EntityId, PlayerId};
//!
//! let p1 = EntityId::player(PlayerId::new(1));
//! assert!(p1.is_player(2));
//! assert_eq!(p1.as_player(2), Some(PlayerId::new(1)));
//!
//! let card = EntityId(7);
//! assert!(!card.is_player(2));
//! ```

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Identifier for a player or a card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Entity id of a player.
    #[must_use]
    pub const fn player(id: PlayerId) -> Self {
        Self(id.0 as u32)
    }

    /// First id available for card instances.
    #[must_use]
    pub const fn first_non_player(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Does this id name a player in a game of `player_count` players?
    #[must_use]
    pub const fn is_player(self, player_count: usize) -> bool {
        self.0 < player_count as u32
    }

    /// The player this id names, if any.
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<PlayerId> {
        if self.is_player(player_count) {
            Some(PlayerId::new(self.0 as u8))
        } else {
            None
        }
    }

    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
