//! Card instances - runtime card state.
//!
//! `CardInstance` is one physical copy of a card in a game. Its zone is
//! tracked by the `ZoneManager`; everything else that changes during play
//! lives here.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::CardId;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

/// A card instance in a game.
///
/// ## Meta bag
///
/// `state` is a `FxHashMap<String, i64>` for ad hoc values the interpreter
/// attaches (revealed markers, per-turn counters). Booleans use 0/1 and
/// entity references use `EntityId.0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub entity_id: EntityId,
    pub card_id: CardId,
    /// Owner and controller; control never changes hands in this game.
    pub owner: PlayerId,
    /// `false` once exerted.
    pub ready: bool,
    pub damage: i64,
    /// Turn this card entered play. Carried over by shift.
    pub turn_played: Option<u32>,
    /// Location this character is at.
    pub location: Option<EntityId>,
    /// Cards placed facedown under this one (boost, shift), oldest first.
    pub under: Vec<EntityId>,
    pub face_down: bool,
    #[serde(default)]
    pub state: FxHashMap<String, i64>,
}

impl CardInstance {
    #[must_use]
    pub fn new(entity_id: EntityId, card_id: CardId, owner: PlayerId) -> Self {
        Self {
            entity_id,
            card_id,
            owner,
            ready: true,
            damage: 0,
            turn_played: None,
            location: None,
            under: Vec::new(),
            face_down: false,
            state: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn is_exerted(&self) -> bool {
        !self.ready
    }

    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.damage > 0
    }

    #[must_use]
    pub fn get_state(&self, key: &str, default: i64) -> i64 {
        self.state.get(key).copied().unwrap_or(default)
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: i64) {
        self.state.insert(key.into(), value);
    }

    pub fn modify_state(&mut self, key: &str, delta: i64) {
        let current = self.get_state(key, 0);
        self.state.insert(key.to_string(), current + delta);
    }

    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.get_state(key, 0) != 0
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set_state(key, i64::from(value));
    }

    /// Reset battlefield state when the card leaves play.
    pub fn reset_play_state(&mut self) {
        self.ready = true;
        self.damage = 0;
        self.turn_played = None;
        self.location = None;
        self.state.clear();
    }

    /// Meta bag entries sorted by key, for snapshots.
    #[must_use]
    pub fn sorted_state(&self) -> Vec<(String, i64)> {
        let mut entries: Vec<_> = self.state.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort();
        entries
    }
}
