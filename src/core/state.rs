//! Game state: the authoritative store the interpreter mutates.
//!
//! ## GameState
//!
//! - Players (lore plus a meta bag)
//! - Card instances and the zones they are in
//! - The active-effect ledger (`im::Vector`, append-only for handlers)
//! - Standing triggers
//! - Turn, phase and active player
//! - Deterministic RNG
//!
//! Mutation primitives (`move_card`, `draw`, `apply_damage`, `banish`,
//! `pay_ink`, `add_active_effect`, ...) leave the state self-consistent after
//! every call, since nothing above them is transactional.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{GameConfig, Phase, ZoneId, ZoneKind};
use super::entity::EntityId;
use super::player::{PlayerId, PlayerMap};
use super::rng::{GameRng, GameRngState};
use crate::cards::{CardId, CardInstance, CardRegistry, CardType, KeywordKind, Stat};
use crate::effects::continuous::{self, ActiveEffect, ContinuousKind, Duration, EffectId};
use crate::error::{EngineError, Result};
use crate::triggers::TriggerRegistry;
use crate::zones::{ZoneManager, ZonePosition};

/// Per-player state.
///
/// `state` is a meta bag in the same `FxHashMap<String, i64>` encoding as
/// card instances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub lore: i64,
    #[serde(default)]
    pub state: FxHashMap<String, i64>,
}

impl PlayerState {
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
}

/// Full game state.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub players: PlayerMap<PlayerState>,
    pub zones: ZoneManager,
    cards: FxHashMap<EntityId, CardInstance>,
    /// Continuous-effect ledger, in creation order.
    pub active_effects: Vector<ActiveEffect>,
    pub triggers: TriggerRegistry,
    pub turn_number: u32,
    pub active_player: PlayerId,
    pub phase: Phase,
    /// Per-turn flags, cleared by `expire_end_of_turn`.
    pub turn_state: FxHashMap<String, i64>,
    pub rng: GameRng,
    next_entity_id: u32,
    next_effect_id: u32,
}

impl GameState {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let player_count = config.player_count;
        Self {
            players: PlayerMap::with_default(player_count),
            zones: ZoneManager::new(),
            cards: FxHashMap::default(),
            active_effects: Vector::new(),
            triggers: TriggerRegistry::new(),
            turn_number: 1,
            active_player: PlayerId::new(0),
            phase: Phase::Main,
            turn_state: FxHashMap::default(),
            rng: GameRng::new(config.seed),
            next_entity_id: EntityId::first_non_player(player_count),
            next_effect_id: 1,
            config,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.player_count
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count())
    }

    /// Error unless `player` is seated.
    pub fn check_player(&self, player: PlayerId) -> Result<()> {
        if player.index() < self.player_count() {
            Ok(())
        } else {
            Err(EngineError::InvalidPlayer(player))
        }
    }

    // === Players ===

    /// The first opponent in seat order.
    #[must_use]
    pub fn opponent(&self, player: PlayerId) -> PlayerId {
        player.next(self.player_count())
    }

    #[must_use]
    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        player.opponents(self.player_count()).collect()
    }

    #[must_use]
    pub fn lore(&self, player: PlayerId) -> i64 {
        self.players.try_get(player).map_or(0, |p| p.lore)
    }

    /// Add lore. Returns the new total.
    pub fn gain_lore(&mut self, player: PlayerId, amount: i64) -> i64 {
        let Some(p) = self.players.try_get_mut(player) else {
            return 0;
        };
        p.lore = p.lore.saturating_add(amount.max(0));
        info!(%player, amount, total = p.lore, "lore gained");
        p.lore
    }

    /// Remove lore, never going below 0. Returns the amount actually lost.
    pub fn lose_lore(&mut self, player: PlayerId, amount: i64) -> i64 {
        let Some(p) = self.players.try_get_mut(player) else {
            return 0;
        };
        let lost = amount.max(0).min(p.lore);
        p.lore -= lost;
        info!(%player, lost, total = p.lore, "lore lost");
        lost
    }

    pub fn set_lore(&mut self, player: PlayerId, lore: i64) {
        if let Some(p) = self.players.try_get_mut(player) {
            p.lore = lore.max(0);
        }
    }

    // === Cards ===

    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Create a new instance on top of one of `owner`'s zones.
    pub fn create_card(&mut self, card_id: CardId, owner: PlayerId, kind: ZoneKind) -> EntityId {
        let id = self.alloc_entity();
        self.cards.insert(id, CardInstance::new(id, card_id, owner));
        self.zones
            .add_to_zone(id, ZoneId::new(owner, kind), ZonePosition::Top);
        id
    }

    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&id)
    }

    /// Instance or [`EngineError::UnknownCard`].
    pub fn require_card(&self, id: EntityId) -> Result<&CardInstance> {
        self.cards.get(&id).ok_or(EngineError::UnknownCard(id))
    }

    #[must_use]
    pub fn owner_of(&self, id: EntityId) -> Option<PlayerId> {
        self.cards.get(&id).map(|c| c.owner)
    }

    #[must_use]
    pub fn zone_of(&self, id: EntityId) -> Option<ZoneId> {
        self.zones.get_zone(id)
    }

    #[must_use]
    pub fn in_zone(&self, id: EntityId, kind: ZoneKind) -> bool {
        self.zones.get_zone(id).is_some_and(|z| z.kind() == kind)
    }

    /// A player's cards in one zone, bottom first.
    #[must_use]
    pub fn cards_in(&self, player: PlayerId, kind: ZoneKind) -> &[EntityId] {
        self.zones.cards_in_zone(ZoneId::new(player, kind))
    }

    /// Every card in play, players in seat order.
    #[must_use]
    pub fn all_in_play(&self) -> Vec<EntityId> {
        self.player_ids()
            .flat_map(|p| self.cards_in(p, ZoneKind::Play).iter().copied())
            .collect()
    }

    #[must_use]
    pub fn hand_size(&self, player: PlayerId) -> usize {
        self.cards_in(player, ZoneKind::Hand).len()
    }

    #[must_use]
    pub fn deck_size(&self, player: PlayerId) -> usize {
        self.cards_in(player, ZoneKind::Deck).len()
    }

    /// Move a card to one of its owner's zones.
    ///
    /// Leaving play resets battlefield state, drops the card's standing
    /// triggers, sends its under-pile to the discard and unlinks characters
    /// at it if it is a location. Returns the zone it left.
    pub fn move_card(&mut self, id: EntityId, kind: ZoneKind, position: ZonePosition) -> Option<ZoneId> {
        let owner = self.owner_of(id)?;
        let destination = ZoneId::new(owner, kind);
        let from = self.zones.move_to_zone(id, destination, position)?;

        if from.kind() == ZoneKind::Play && kind != ZoneKind::Play {
            self.leave_play(id);
        }
        if let Some(card) = self.cards.get_mut(&id) {
            card.face_down = false;
        }
        debug!(card = %id, %from, to = %destination, "card moved");
        Some(from)
    }

    fn leave_play(&mut self, id: EntityId) {
        self.triggers.remove_for_source(id);
        let under = match self.cards.get_mut(&id) {
            Some(card) => {
                card.reset_play_state();
                std::mem::take(&mut card.under)
            }
            None => Vec::new(),
        };
        for buried in under {
            if let Some(owner) = self.owner_of(buried) {
                self.zones
                    .add_to_zone(buried, ZoneId::new(owner, ZoneKind::Discard), ZonePosition::Top);
            }
            if let Some(card) = self.cards.get_mut(&buried) {
                card.face_down = false;
            }
        }
        for card in self.cards.values_mut() {
            if card.location == Some(id) {
                card.location = None;
            }
        }
    }

    /// Take a card out of every zone and put it under `host`.
    pub fn put_under(&mut self, id: EntityId, host: EntityId, face_down: bool) -> bool {
        if !self.cards.contains_key(&host) {
            return false;
        }
        if self.zones.get_zone(id).is_some() {
            self.zones.remove(id);
        }
        if let Some(card) = self.cards.get_mut(&id) {
            card.face_down = face_down;
        }
        if let Some(host_card) = self.cards.get_mut(&host) {
            host_card.under.push(id);
        }
        true
    }

    /// Put `new` into play in place of `old`. `new` takes over readiness,
    /// damage, the turn `old` entered play, its location and its under-pile;
    /// `old` goes under `new` and its standing triggers are dropped.
    pub fn shift_onto(&mut self, new: EntityId, old: EntityId) -> bool {
        if !self.in_zone(old, ZoneKind::Play) || !self.cards.contains_key(&new) || new == old {
            return false;
        }
        if self.move_card(new, ZoneKind::Play, ZonePosition::Top).is_none() {
            return false;
        }
        self.triggers.remove_for_source(old);
        self.zones.remove(old);

        let Some(base) = self.cards.get_mut(&old) else {
            return false;
        };
        let (ready, damage, turn_played, location) = (base.ready, base.damage, base.turn_played, base.location);
        let mut under = std::mem::take(&mut base.under);
        base.reset_play_state();
        under.push(old);

        if let Some(card) = self.cards.get_mut(&new) {
            card.ready = ready;
            card.damage = damage;
            card.turn_played = turn_played;
            card.location = location;
            card.under = under;
        }
        for card in self.cards.values_mut() {
            if card.location == Some(old) {
                card.location = Some(new);
            }
        }
        info!(%new, %old, "shifted");
        true
    }

    /// Remove a card from the game entirely.
    pub fn exile(&mut self, id: EntityId) -> bool {
        let Some(from) = self.zones.get_zone(id) else {
            return false;
        };
        if from.kind() == ZoneKind::Play {
            self.leave_play(id);
        }
        self.zones.remove(id);
        info!(card = %id, "card exiled");
        true
    }

    /// Draw up to `count` cards. Drawing from an empty deck draws nothing.
    pub fn draw(&mut self, player: PlayerId, count: usize) -> Vec<EntityId> {
        let deck = ZoneId::new(player, ZoneKind::Deck);
        let hand = ZoneId::new(player, ZoneKind::Hand);
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(card) = self.zones.top_card(deck) else {
                break;
            };
            self.zones.move_to_zone(card, hand, ZonePosition::Top);
            drawn.push(card);
        }
        if drawn.len() < count {
            debug!(%player, requested = count, drawn = drawn.len(), "deck ran out while drawing");
        }
        drawn
    }

    pub fn shuffle_deck(&mut self, player: PlayerId) {
        let deck = ZoneId::new(player, ZoneKind::Deck);
        self.zones.shuffle_zone(deck, &mut self.rng);
    }

    // === Damage ===

    /// Deal damage after Resist and damage shields. Returns damage dealt.
    pub fn apply_damage(
        &mut self,
        cards: &CardRegistry,
        target: EntityId,
        amount: i64,
        source: Option<EntityId>,
    ) -> i64 {
        if amount <= 0 || !self.in_zone(target, ZoneKind::Play) {
            return 0;
        }
        let resist = continuous::keyword_total(self, cards, target, KeywordKind::Resist).unwrap_or(0);
        let mut dealt = (amount - resist).max(0);

        let shield = continuous::effects_on(self, target)
            .find(|e| matches!(e.kind, ContinuousKind::DamageShield { .. }))
            .map(|e| (e.id, e.duration, e.kind.clone()));
        if let Some((id, duration, ContinuousKind::DamageShield { amount: cap })) = shield {
            if dealt > 0 {
                dealt = cap.map_or(0, |cap| (dealt - cap).max(0));
                if duration == Duration::OneUse {
                    self.remove_active_effect(id);
                }
            }
        }

        self.put_damage(target, dealt);
        info!(%target, amount, dealt, source = ?source, "damage dealt");
        dealt
    }

    /// Place damage counters directly, ignoring Resist and shields.
    pub fn put_damage(&mut self, target: EntityId, amount: i64) -> i64 {
        match self.cards.get_mut(&target) {
            Some(card) if amount > 0 => {
                card.damage = card.damage.saturating_add(amount);
                amount
            }
            _ => 0,
        }
    }

    /// Remove up to `amount` damage. Returns damage removed.
    pub fn heal(&mut self, target: EntityId, amount: i64) -> i64 {
        let Some(card) = self.cards.get_mut(&target) else {
            return 0;
        };
        let healed = amount.max(0).min(card.damage);
        card.damage -= healed;
        healed
    }

    /// Characters and locations in play whose damage meets their willpower.
    #[must_use]
    pub fn banish_candidates(&self, cards: &CardRegistry) -> Vec<EntityId> {
        self.all_in_play()
            .into_iter()
            .filter(|&id| {
                let Some(instance) = self.card(id) else {
                    return false;
                };
                let Some(def) = cards.get(instance.card_id) else {
                    return false;
                };
                if !matches!(def.card_type, CardType::Character | CardType::Location) {
                    return false;
                }
                let willpower = continuous::effective_stat(self, cards, id, Stat::Willpower);
                instance.damage > 0 && instance.damage >= willpower
            })
            .collect()
    }

    /// Put a card into its owner's discard.
    pub fn banish(&mut self, id: EntityId) -> bool {
        let banished = self
            .move_card(id, ZoneKind::Discard, ZonePosition::Top)
            .is_some();
        if banished {
            info!(card = %id, "card banished");
        }
        banished
    }

    // === Ink ===

    #[must_use]
    pub fn total_ink(&self, player: PlayerId) -> usize {
        self.cards_in(player, ZoneKind::Inkwell).len()
    }

    #[must_use]
    pub fn ready_ink(&self, player: PlayerId) -> usize {
        self.cards_in(player, ZoneKind::Inkwell)
            .iter()
            .filter(|id| self.card(**id).is_some_and(|c| c.ready))
            .count()
    }

    fn set_ink_ready(&mut self, player: PlayerId, count: usize, ready: bool) -> usize {
        let targets: Vec<EntityId> = self
            .cards_in(player, ZoneKind::Inkwell)
            .iter()
            .rev()
            .copied()
            .filter(|id| self.card(*id).is_some_and(|c| c.ready != ready))
            .take(count)
            .collect();
        for id in &targets {
            if let Some(card) = self.cards.get_mut(id) {
                card.ready = ready;
            }
        }
        targets.len()
    }

    /// Exert `amount` ready ink. Pays nothing and returns `false` if there is
    /// not enough.
    pub fn pay_ink(&mut self, player: PlayerId, amount: i64) -> bool {
        if amount <= 0 {
            return true;
        }
        let needed = amount as usize;
        if self.ready_ink(player) < needed {
            return false;
        }
        self.set_ink_ready(player, needed, false);
        debug!(%player, amount, "ink paid");
        true
    }

    /// Ready up to `count` exerted ink. Returns how many were readied.
    pub fn ready_ink_cards(&mut self, player: PlayerId, count: usize) -> usize {
        self.set_ink_ready(player, count, true)
    }

    /// Exert up to `count` ready ink. Returns how many were exerted.
    pub fn exert_ink_cards(&mut self, player: PlayerId, count: usize) -> usize {
        self.set_ink_ready(player, count, false)
    }

    // === Active effects ===

    /// Append to the ledger, assigning the record's id and creation turn.
    pub fn add_active_effect(&mut self, mut effect: ActiveEffect) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id += 1;
        effect.id = id;
        effect.created_turn = self.turn_number;
        debug!(effect = %id, kind = ?effect.kind, duration = ?effect.duration, "continuous effect added");
        self.active_effects.push_back(effect);
        id
    }

    pub fn remove_active_effect(&mut self, id: EffectId) -> Option<ActiveEffect> {
        let index = self.active_effects.iter().position(|e| e.id == id)?;
        Some(self.active_effects.remove(index))
    }

    /// End-of-turn cleanup: drops `ThisTurn` records and clears turn flags.
    pub fn expire_end_of_turn(&mut self) {
        self.active_effects.retain(|e| e.duration != Duration::ThisTurn);
        self.turn_state.clear();
    }

    /// Start-of-turn cleanup for `player`: drops their
    /// `UntilStartOfNextTurn` records.
    pub fn expire_start_of_turn(&mut self, player: PlayerId) {
        self.active_effects.retain(|e| {
            !(e.duration == Duration::UntilStartOfNextTurn && e.source_player == player)
        });
    }

    /// Drop records whose source has left play. Returns how many went.
    pub fn prune_lapsed_effects(&mut self) -> usize {
        let lapsed: Vec<EffectId> = self
            .active_effects
            .iter()
            .filter(|e| !e.is_live(self))
            .map(|e| e.id)
            .collect();
        for id in &lapsed {
            self.remove_active_effect(*id);
        }
        lapsed.len()
    }

    // === Turn flags ===

    #[must_use]
    pub fn turn_flag(&self, key: &str) -> i64 {
        self.turn_state.get(key).copied().unwrap_or(0)
    }

    pub fn set_turn_flag(&mut self, key: impl Into<String>, value: i64) {
        self.turn_state.insert(key.into(), value);
    }

    // === Snapshots ===

    /// Canonical, order-independent view of the state.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let mut cards: Vec<CardSnapshot> = self
            .cards
            .values()
            .map(|c| CardSnapshot {
                entity_id: c.entity_id,
                card_id: c.card_id,
                owner: c.owner,
                ready: c.ready,
                damage: c.damage,
                turn_played: c.turn_played,
                location: c.location,
                under: c.under.clone(),
                face_down: c.face_down,
                state: c.sorted_state(),
            })
            .collect();
        cards.sort_by_key(|c| c.entity_id);

        let players = self
            .players
            .iter()
            .map(|(_, p)| {
                let mut state: Vec<_> = p.state.iter().map(|(k, v)| (k.clone(), *v)).collect();
                state.sort();
                PlayerSnapshot { lore: p.lore, state }
            })
            .collect();

        let mut turn_state: Vec<_> = self.turn_state.iter().map(|(k, v)| (k.clone(), *v)).collect();
        turn_state.sort();

        StateSnapshot {
            turn_number: self.turn_number,
            active_player: self.active_player,
            phase: self.phase,
            players,
            cards,
            zones: self.zones.sorted_contents(),
            active_effects: self.active_effects.iter().map(LedgerSnapshot::from).collect(),
            triggers: self.triggers.sorted_ids(),
            turn_state,
            rng: self.rng.state(),
        }
    }

    /// `bincode` encoding of [`GameState::snapshot`].
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.snapshot())?)
    }
}

/// Serializable per-player part of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub lore: i64,
    pub state: Vec<(String, i64)>,
}

/// Card instance with its meta bag in sorted order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub entity_id: EntityId,
    pub card_id: CardId,
    pub owner: PlayerId,
    pub ready: bool,
    pub damage: i64,
    pub turn_played: Option<u32>,
    pub location: Option<EntityId>,
    pub under: Vec<EntityId>,
    pub face_down: bool,
    pub state: Vec<(String, i64)>,
}

/// Ledger record with its kind flattened to text. Effect trees nested in
/// grants and hooks do not survive a non-self-describing format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub id: EffectId,
    pub source_card: Option<EntityId>,
    pub source_player: PlayerId,
    pub targets: Vec<EntityId>,
    pub duration: Duration,
    pub kind: String,
    pub created_turn: u32,
}

impl From<&ActiveEffect> for LedgerSnapshot {
    fn from(effect: &ActiveEffect) -> Self {
        Self {
            id: effect.id,
            source_card: effect.source_card,
            source_player: effect.source_player,
            targets: effect.targets.to_vec(),
            duration: effect.duration,
            kind: format!("{:?}", effect.kind),
            created_turn: effect.created_turn,
        }
    }
}

/// Canonical state snapshot, comparable with `==` and stable under bincode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub turn_number: u32,
    pub active_player: PlayerId,
    pub phase: Phase,
    pub players: Vec<PlayerSnapshot>,
    pub cards: Vec<CardSnapshot>,
    pub zones: Vec<(ZoneId, Vec<EntityId>)>,
    pub active_effects: Vec<LedgerSnapshot>,
    pub triggers: Vec<u32>,
    pub turn_state: Vec<(String, i64)>,
    pub rng: GameRngState,
}
