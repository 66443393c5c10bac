//! Trigger registry.
//!
//! Standing triggered abilities are registered when their card enters play
//! and dropped when it leaves. The registry indexes them by event kind and
//! returns the ones that fire for an event in a deterministic order.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::CardRegistry;
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::EffectNode;

use super::condition::{TriggerCondition, TriggerContext};
use super::event::{EventKind, GameEvent};

/// Unique identifier for a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// A standing triggered ability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trigger {
    /// Assigned by the registry; 0 until registered.
    pub id: TriggerId,

    /// Card name, for logs.
    pub name: String,

    /// The card this ability is printed on or granted to.
    pub source: Option<EntityId>,

    /// Who makes choices when it resolves.
    pub controller: PlayerId,

    pub event_kind: EventKind,

    pub condition: TriggerCondition,

    /// Body executed when the trigger fires.
    pub effect: EffectNode,
}

impl Trigger {
    pub fn new(
        name: impl Into<String>,
        controller: PlayerId,
        event_kind: EventKind,
        effect: EffectNode,
    ) -> Self {
        Self {
            id: TriggerId::new(0),
            name: name.into(),
            source: None,
            controller,
            event_kind,
            condition: TriggerCondition::Always,
            effect,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }
}

/// A trigger that fired, ready for the interpreter.
#[derive(Clone, Debug)]
pub struct TriggeredEffect {
    pub trigger_id: TriggerId,
    pub controller: PlayerId,
    pub source: Option<EntityId>,
    pub effect: EffectNode,
    pub event: GameEvent,
}

/// Registry of standing triggers, indexed by event kind.
#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    triggers: FxHashMap<TriggerId, Trigger>,
    by_event_kind: FxHashMap<EventKind, Vec<TriggerId>>,
    next_id: u32,
}

impl TriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Register a trigger, returning its id.
    pub fn register(&mut self, mut trigger: Trigger) -> TriggerId {
        if trigger.id.0 == 0 {
            trigger.id = TriggerId::new(self.next_id.max(1));
            self.next_id = trigger.id.0 + 1;
        } else if trigger.id.0 >= self.next_id {
            self.next_id = trigger.id.0 + 1;
        }

        let id = trigger.id;
        self.by_event_kind.entry(trigger.event_kind).or_default().push(id);
        self.triggers.insert(id, trigger);
        id
    }

    pub fn unregister(&mut self, id: TriggerId) -> Option<Trigger> {
        let trigger = self.triggers.remove(&id)?;
        let kind = trigger.event_kind;
        if let Some(list) = self.by_event_kind.get_mut(&kind) {
            list.retain(|&tid| tid != id);
            if list.is_empty() {
                self.by_event_kind.remove(&kind);
            }
        }
        Some(trigger)
    }

    /// Triggers that fire for `event`, in registration order.
    #[must_use]
    pub fn find_triggers(
        &self,
        event: &GameEvent,
        state: &GameState,
        cards: &CardRegistry,
    ) -> Vec<TriggeredEffect> {
        let Some(ids) = self.by_event_kind.get(&event.kind) else {
            return Vec::new();
        };

        let mut fired: Vec<&Trigger> = ids
            .iter()
            .filter_map(|id| self.triggers.get(id))
            .filter(|t| {
                t.condition.evaluate(&TriggerContext {
                    event,
                    source: t.source,
                    controller: t.controller,
                    state,
                    cards,
                })
            })
            .collect();
        fired.sort_by_key(|t| t.id);

        fired
            .into_iter()
            .map(|t| TriggeredEffect {
                trigger_id: t.id,
                controller: t.controller,
                source: t.source,
                effect: t.effect.clone(),
                event: event.clone(),
            })
            .collect()
    }

    /// Triggers owned by a card, in id order.
    #[must_use]
    pub fn triggers_for_source(&self, source: EntityId) -> Vec<&Trigger> {
        let mut owned: Vec<&Trigger> = self
            .triggers
            .values()
            .filter(|t| t.source == Some(source))
            .collect();
        owned.sort_by_key(|t| t.id);
        owned
    }

    /// Drop every trigger owned by a card. Returns how many were removed.
    pub fn remove_for_source(&mut self, source: EntityId) -> usize {
        let to_remove: Vec<TriggerId> = self
            .triggers
            .iter()
            .filter(|(_, t)| t.source == Some(source))
            .map(|(&id, _)| id)
            .collect();
        for id in &to_remove {
            self.unregister(*id);
        }
        to_remove.len()
    }

    /// Registered ids in ascending order, for snapshots.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.triggers.keys().map(|id| id.0).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::effects::{EffectKind, EffectNode};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn noop() -> EffectNode {
        EffectNode::new(EffectKind::NoOp)
    }

    fn setup() -> (GameState, CardRegistry) {
        (GameState::new(GameConfig::default()), CardRegistry::new())
    }

    #[test]
    fn test_trigger_builder() {
        let trigger = Trigger::new("Mulan", P0, EventKind::Quested, noop())
            .with_source(EntityId(10))
            .with_condition(TriggerCondition::SourceIsSelf);

        assert_eq!(trigger.source, Some(EntityId(10)));
        assert_eq!(trigger.event_kind, EventKind::Quested);
        assert_eq!(trigger.condition, TriggerCondition::SourceIsSelf);
    }

    #[test]
    fn test_register_assigns_ids() {
        let mut registry = TriggerRegistry::new();
        let a = registry.register(Trigger::new("A", P0, EventKind::CardPlayed, noop()));
        let b = registry.register(Trigger::new("B", P0, EventKind::CardPlayed, noop()));
        assert_eq!(a, TriggerId::new(1));
        assert_eq!(b, TriggerId::new(2));
        assert_eq!(registry.sorted_ids(), vec![1, 2]);
    }

    #[test]
    fn test_unregister() {
        let mut registry = TriggerRegistry::new();
        let id = registry.register(Trigger::new("A", P0, EventKind::CardPlayed, noop()));
        assert!(registry.unregister(id).is_some());
        assert!(registry.is_empty());
        assert!(registry.unregister(id).is_none());
    }

    #[test]
    fn test_find_triggers_order() {
        let (state, cards) = setup();
        let mut registry = TriggerRegistry::new();
        let first = registry.register(Trigger::new("First", P1, EventKind::TurnStarted, noop()));
        let second = registry.register(Trigger::new("Second", P0, EventKind::TurnStarted, noop()));
        registry.register(Trigger::new("Other", P0, EventKind::CardDrawn, noop()));

        let event = GameEvent::for_player(EventKind::TurnStarted, P0);
        let order: Vec<TriggerId> = registry
            .find_triggers(&event, &state, &cards)
            .iter()
            .map(|t| t.trigger_id)
            .collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn test_find_triggers_checks_condition() {
        let (state, cards) = setup();
        let mut registry = TriggerRegistry::new();
        for player in [P0, P1] {
            registry.register(
                Trigger::new("Turn", player, EventKind::TurnStarted, noop())
                    .with_condition(TriggerCondition::ForController),
            );
        }

        let event = GameEvent::for_player(EventKind::TurnStarted, P1);
        let fired = registry.find_triggers(&event, &state, &cards);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].controller, P1);
    }

    #[test]
    fn test_remove_for_source() {
        let mut registry = TriggerRegistry::new();
        registry.register(
            Trigger::new("A", P0, EventKind::Quested, noop()).with_source(EntityId(10)),
        );
        registry.register(
            Trigger::new("A2", P0, EventKind::Banished, noop()).with_source(EntityId(10)),
        );
        registry.register(
            Trigger::new("B", P0, EventKind::Quested, noop()).with_source(EntityId(20)),
        );

        assert_eq!(registry.triggers_for_source(EntityId(10)).len(), 2);
        assert_eq!(registry.remove_for_source(EntityId(10)), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.triggers_for_source(EntityId(10)).is_empty());
    }
}
