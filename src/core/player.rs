//! Player identification and per-player storage.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Player identifier. Index 0 is the first player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// 0-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All players of a game, in seat order.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// Every other player, in seat order starting after `self`.
    ///
    /// ```
    /// use ink_engine::core::PlayerId;
    ///
    /// let others: Vec<_> = PlayerId::new(1).opponents(3).collect();
    /// assert_eq!(others, vec![PlayerId::new(2), PlayerId::new(0)]);
    /// ```
    pub fn opponents(self, player_count: usize) -> impl Iterator<Item = PlayerId> {
        let start = self.0 as usize;
        (1..player_count).map(move |offset| PlayerId(((start + offset) % player_count) as u8))
    }

    /// The next player in seat order.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.0 as usize + 1) % player_count.max(1)) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data with O(1) access by `PlayerId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build one entry per player from a factory.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            data: (0..player_count as u8).map(|i| factory(PlayerId(i))).collect(),
        }
    }

    /// All entries default-initialized.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Entry for a player, or `None` for an out-of-range id.
    #[must_use]
    pub fn try_get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Mutable entry for a player, or `None` for an out-of-range id.
    pub fn try_get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponents_two_players() {
        let opp: Vec<_> = PlayerId::new(0).opponents(2).collect();
        assert_eq!(opp, vec![PlayerId::new(1)]);
    }

    #[test]
    fn test_opponents_wrap_around() {
        let opp: Vec<_> = PlayerId::new(2).opponents(4).collect();
        assert_eq!(opp, vec![PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
    }

    #[test]
    fn test_next_player() {
        assert_eq!(PlayerId::new(0).next(2), PlayerId::new(1));
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
    }

    #[test]
    fn test_player_map_index() {
        let mut map: PlayerMap<i64> = PlayerMap::new(2, |p| p.index() as i64 * 10);
        assert_eq!(map[PlayerId::new(1)], 10);
        map[PlayerId::new(0)] = 5;
        assert_eq!(map[PlayerId::new(0)], 5);
    }

    #[test]
    fn test_try_get_out_of_range() {
        let map: PlayerMap<i64> = PlayerMap::with_default(2);
        assert!(map.try_get(PlayerId::new(2)).is_none());
        assert!(map.try_get(PlayerId::new(1)).is_some());
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<i64> = PlayerMap::with_default(0);
    }
}
