//! Game configuration and zone layout.
//!
//! Every player owns the same five zones. Zone ids are derived from the
//! owning player and the zone kind, so no lookup table is needed to answer
//! "whose discard is this?".

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// The kinds of zone a player owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Deck,
    Hand,
    Play,
    Discard,
    Inkwell,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 5] = [
        ZoneKind::Deck,
        ZoneKind::Hand,
        ZoneKind::Play,
        ZoneKind::Discard,
        ZoneKind::Inkwell,
    ];

    const fn offset(self) -> u16 {
        match self {
            ZoneKind::Deck => 0,
            ZoneKind::Hand => 1,
            ZoneKind::Play => 2,
            ZoneKind::Discard => 3,
            ZoneKind::Inkwell => 4,
        }
    }

    /// Is card order significant in this zone?
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, ZoneKind::Deck | ZoneKind::Discard | ZoneKind::Inkwell)
    }
}

/// Zone identifier: `owner * 5 + kind offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u16);

impl ZoneId {
    #[must_use]
    pub const fn new(owner: PlayerId, kind: ZoneKind) -> Self {
        Self(owner.0 as u16 * 5 + kind.offset())
    }

    #[must_use]
    pub const fn owner(self) -> PlayerId {
        PlayerId::new((self.0 / 5) as u8)
    }

    #[must_use]
    pub fn kind(self) -> ZoneKind {
        ZoneKind::ALL[(self.0 % 5) as usize]
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self.kind(), self.owner().0)
    }
}

/// Turn phases. Only `Main` allows playing cards by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ready,
    Set,
    Draw,
    #[default]
    Main,
    End,
}

/// Engine configuration.
///
/// ```
/// use ink_engine::core::GameConfig;
///
/// let config = GameConfig::default().with_players(3).with_lore_to_win(25);
/// assert_eq!(config.player_count, 3);
/// assert_eq!(config.lore_to_win, 25);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Lore needed to win.
    pub lore_to_win: i64,

    /// Maximum nesting of dispatcher calls before an ability is aborted.
    pub max_effect_depth: usize,

    /// Opening hand size (used by setup helpers, not by the interpreter).
    pub starting_hand_size: usize,

    /// RNG seed.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            lore_to_win: 20,
            max_effect_depth: 64,
            starting_hand_size: 7,
            seed: 0,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn with_players(mut self, player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");
        self.player_count = player_count;
        self
    }

    #[must_use]
    pub fn with_lore_to_win(mut self, lore: i64) -> Self {
        self.lore_to_win = lore;
        self
    }

    #[must_use]
    pub fn with_max_effect_depth(mut self, depth: usize) -> Self {
        self.max_effect_depth = depth;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
