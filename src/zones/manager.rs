//! Zone manager for card locations and movement.
//!
//! Every zone keeps its cards in a `Vec`. For ordered zones (deck, discard,
//! inkwell) the end of the vec is the top and `ZonePosition` controls where
//! a card lands. Unordered zones (hand, play) always append, which keeps
//! iteration deterministic without giving position any game meaning.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ZoneId;
use crate::core::entity::EntityId;
use crate::core::rng::GameRng;

/// Position for inserting a card into an ordered zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Top of the zone (end of the vec).
    #[default]
    Top,
    /// Bottom of the zone.
    Bottom,
    /// Specific index (0 = bottom).
    Index(usize),
}

/// Tracks which zone every card is in.
///
/// ```
/// use ink_engine::core::{EntityId, PlayerId, ZoneId, ZoneKind};
/// use ink_engine::zones::{ZoneManager, ZonePosition};
///
/// let deck = ZoneId::new(PlayerId::new(0), ZoneKind::Deck);
/// let mut zones = ZoneManager::new();
/// zones.add_to_zone(EntityId(10), deck, ZonePosition::Top);
/// zones.add_to_zone(EntityId(11), deck, ZonePosition::Bottom);
///
/// assert_eq!(zones.top_card(deck), Some(EntityId(10)));
/// assert_eq!(zones.cards_in_zone(deck), &[EntityId(11), EntityId(10)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    locations: FxHashMap<EntityId, ZoneId>,
    contents: FxHashMap<ZoneId, Vec<EntityId>>,
}

impl ZoneManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        let cards = self.contents.entry(zone).or_default();
        if !zone.kind().is_ordered() {
            cards.push(entity);
            return;
        }
        match position {
            ZonePosition::Top => cards.push(entity),
            ZonePosition::Bottom => cards.insert(0, entity),
            ZonePosition::Index(i) => {
                let idx = i.min(cards.len());
                cards.insert(idx, entity);
            }
        }
    }

    /// Add a card that is not yet tracked.
    ///
    /// Panics if the entity is already in the manager.
    pub fn add_to_zone(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        if self.locations.contains_key(&entity) {
            panic!("Entity {:?} already exists in zone manager", entity);
        }
        self.locations.insert(entity, zone);
        self.insert(entity, zone, position);
    }

    /// Move a tracked card. Returns the zone it left, or `None` if the card
    /// is not tracked. Moving a card to the zone it is already in re-inserts
    /// it at `position`.
    pub fn move_to_zone(
        &mut self,
        entity: EntityId,
        new_zone: ZoneId,
        position: ZonePosition,
    ) -> Option<ZoneId> {
        let old_zone = self.locations.get(&entity).copied()?;

        if let Some(cards) = self.contents.get_mut(&old_zone) {
            cards.retain(|&e| e != entity);
        }
        self.locations.insert(entity, new_zone);
        self.insert(entity, new_zone, position);

        Some(old_zone)
    }

    /// Stop tracking a card (exiled, or placed under another card).
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneId> {
        let zone = self.locations.remove(&entity)?;
        if let Some(cards) = self.contents.get_mut(&zone) {
            cards.retain(|&e| e != entity);
        }
        Some(zone)
    }

    #[must_use]
    pub fn get_zone(&self, entity: EntityId) -> Option<ZoneId> {
        self.locations.get(&entity).copied()
    }

    /// Cards in a zone, bottom first.
    #[must_use]
    pub fn cards_in_zone(&self, zone: ZoneId) -> &[EntityId] {
        self.contents.get(&zone).map_or(&[], |v| v.as_slice())
    }

    #[must_use]
    pub fn zone_size(&self, zone: ZoneId) -> usize {
        self.cards_in_zone(zone).len()
    }

    #[must_use]
    pub fn top_card(&self, zone: ZoneId) -> Option<EntityId> {
        self.contents.get(&zone)?.last().copied()
    }

    /// The top `n` cards, topmost first.
    #[must_use]
    pub fn top_cards(&self, zone: ZoneId, n: usize) -> Vec<EntityId> {
        self.cards_in_zone(zone).iter().rev().take(n).copied().collect()
    }

    /// Remove and return the top card.
    pub fn pop_top(&mut self, zone: ZoneId) -> Option<EntityId> {
        let cards = self.contents.get_mut(&zone)?;
        let entity = cards.pop()?;
        self.locations.remove(&entity);
        Some(entity)
    }

    pub fn shuffle_zone(&mut self, zone: ZoneId, rng: &mut GameRng) {
        if let Some(cards) = self.contents.get_mut(&zone) {
            rng.shuffle(cards);
        }
    }

    /// Every zone with its contents, sorted by zone id.
    #[must_use]
    pub fn sorted_contents(&self) -> Vec<(ZoneId, Vec<EntityId>)> {
        let mut zones: Vec<_> = self
            .contents
            .iter()
            .filter(|(_, cards)| !cards.is_empty())
            .map(|(&zone, cards)| (zone, cards.clone()))
            .collect();
        zones.sort_by_key(|(zone, _)| *zone);
        zones
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerId, ZoneKind};

    fn zone(kind: ZoneKind) -> ZoneId {
        ZoneId::new(PlayerId::new(0), kind)
    }

    #[test]
    fn test_add_and_get() {
        let mut manager = ZoneManager::new();
        let hand = zone(ZoneKind::Hand);

        manager.add_to_zone(EntityId(10), hand, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), hand, ZonePosition::Top);

        assert_eq!(manager.get_zone(EntityId(10)), Some(hand));
        assert_eq!(manager.get_zone(EntityId(99)), None);
        assert_eq!(manager.get_zone(EntityId(11)), Some(hand));
    }

    #[test]
    fn test_ordered_zone_positions() {
        let mut manager = ZoneManager::new();
        let deck = zone(ZoneKind::Deck);

        manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), deck, ZonePosition::Bottom);
        manager.add_to_zone(EntityId(12), deck, ZonePosition::Top);

        assert_eq!(
            manager.cards_in_zone(deck),
            &[EntityId(11), EntityId(10), EntityId(12)]
        );
        assert_eq!(manager.top_card(deck), Some(EntityId(12)));
        assert_eq!(manager.top_cards(deck, 2), vec![EntityId(12), EntityId(10)]);
    }

    #[test]
    fn test_unordered_zone_ignores_position() {
        let mut manager = ZoneManager::new();
        let play = zone(ZoneKind::Play);

        manager.add_to_zone(EntityId(10), play, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), play, ZonePosition::Bottom);

        assert_eq!(manager.cards_in_zone(play), &[EntityId(10), EntityId(11)]);
    }

    #[test]
    fn test_move_between_zones() {
        let mut manager = ZoneManager::new();
        let deck = zone(ZoneKind::Deck);
        let hand = zone(ZoneKind::Hand);

        manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
        let old = manager.move_to_zone(EntityId(10), hand, ZonePosition::Top);

        assert_eq!(old, Some(deck));
        assert_eq!(manager.zone_size(deck), 0);
        assert_eq!(manager.zone_size(hand), 1);
    }

    #[test]
    fn test_move_within_zone_to_bottom() {
        let mut manager = ZoneManager::new();
        let deck = zone(ZoneKind::Deck);
        manager.add_to_zone(EntityId(1), deck, ZonePosition::Top);
        manager.add_to_zone(EntityId(2), deck, ZonePosition::Top);

        manager.move_to_zone(EntityId(2), deck, ZonePosition::Bottom);
        assert_eq!(manager.cards_in_zone(deck), &[EntityId(2), EntityId(1)]);
    }

    #[test]
    fn test_pop_top() {
        let mut manager = ZoneManager::new();
        let deck = zone(ZoneKind::Deck);
        manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), deck, ZonePosition::Top);

        assert_eq!(manager.pop_top(deck), Some(EntityId(11)));
        assert!(!manager.contains(EntityId(11)));
        assert_eq!(manager.pop_top(deck), Some(EntityId(10)));
        assert_eq!(manager.pop_top(deck), None);
    }

    #[test]
    fn test_remove() {
        let mut manager = ZoneManager::new();
        let play = zone(ZoneKind::Play);
        manager.add_to_zone(EntityId(10), play, ZonePosition::Top);

        assert_eq!(manager.remove(EntityId(10)), Some(play));
        assert!(!manager.contains(EntityId(10)));
        assert_eq!(manager.zone_size(play), 0);
    }

    #[test]
    fn test_shuffle() {
        let mut manager = ZoneManager::new();
        let deck = zone(ZoneKind::Deck);
        for i in 0..20 {
            manager.add_to_zone(EntityId(i), deck, ZonePosition::Top);
        }
        let before = manager.cards_in_zone(deck).to_vec();

        manager.shuffle_zone(deck, &mut GameRng::new(42));

        let after = manager.cards_in_zone(deck).to_vec();
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }

    #[test]
    #[should_panic(expected = "Entity")]
    fn test_duplicate_entity_panics() {
        let mut manager = ZoneManager::new();
        let hand = zone(ZoneKind::Hand);
        manager.add_to_zone(EntityId(10), hand, ZonePosition::Top);
        manager.add_to_zone(EntityId(10), hand, ZonePosition::Top);
    }
}
