//! Call-scoped execution environment.
//!
//! A [`GameContext`] is built once per top-level resolution and never
//! mutated afterwards. Loops and bindings derive child contexts with
//! [`GameContext::bind`]; the variable map is an `im::HashMap`, so a child
//! shares structure with its parent and a binding can never leak into a
//! sibling branch.

use im::HashMap;

use crate::core::{EntityId, PlayerId};
use crate::triggers::{EventKind, GameEvent};

use super::expression::Expression;

/// What caused this resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventContext {
    pub kind: Option<EventKind>,
    pub source: Option<EntityId>,
    /// Target already chosen by the triggering event (the card a play
    /// targeted, the damaged character).
    pub target_card: Option<EntityId>,
    pub player: Option<PlayerId>,
    pub amount: i64,
}

impl From<&GameEvent> for EventContext {
    fn from(event: &GameEvent) -> Self {
        Self {
            kind: Some(event.kind),
            source: event.source,
            target_card: event.target,
            player: event.player,
            amount: event.amount,
        }
    }
}

/// A scoped variable value.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Entity(EntityId),
    Number(i64),
    /// Re-evaluated on lookup.
    Expression(Expression),
}

/// Pre-supplied answers for automation and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    /// Answers every `chosen_*` target without asking.
    pub targets: Option<Vec<EntityId>>,
    /// Preferred picks, used when still valid.
    pub pending_choices: Vec<EntityId>,
}

/// The interpreter's environment for one resolution.
#[derive(Clone, Debug)]
pub struct GameContext {
    /// Acting player: makes choices, "you" in rules text.
    pub player: PlayerId,
    /// Card the ability belongs to, if any.
    pub source: Option<EntityId>,
    pub event: EventContext,
    /// Pre-decided `modal` option.
    pub modal_choice: Option<usize>,
    pub variables: HashMap<String, Binding>,
    pub payload: Payload,
    /// Set while resolving a `static` wrapper; changes default durations.
    pub static_ability: bool,
}

impl GameContext {
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            source: None,
            event: EventContext::default(),
            modal_choice: None,
            variables: HashMap::new(),
            payload: Payload::default(),
            static_ability: false,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: &GameEvent) -> Self {
        self.event = EventContext::from(event);
        self
    }

    /// Preset the event target, as a play with a declared target does.
    #[must_use]
    pub fn with_target_card(mut self, target: EntityId) -> Self {
        self.event.target_card = Some(target);
        self
    }

    #[must_use]
    pub fn with_modal_choice(mut self, index: usize) -> Self {
        self.modal_choice = Some(index);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<EntityId>) -> Self {
        self.payload.targets = Some(targets);
        self
    }

    #[must_use]
    pub fn with_pending_choices(mut self, pending: Vec<EntityId>) -> Self {
        self.payload.pending_choices = pending;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Child context with one more binding.
    #[must_use]
    pub fn bind(&self, name: impl Into<String>, value: Binding) -> Self {
        let mut child = self.clone();
        child.variables.insert(name.into(), value);
        child
    }

    /// Child context for the body of a `static` wrapper.
    #[must_use]
    pub fn in_static(&self) -> Self {
        let mut child = self.clone();
        child.static_ability = true;
        child
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Binding> {
        self.variables.get(name)
    }

    /// The entity bound to `name`, if it is one.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        match self.variables.get(name) {
            Some(Binding::Entity(id)) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_does_not_touch_parent() {
        let parent = GameContext::new(PlayerId::new(0));
        let child = parent.bind("it", Binding::Entity(EntityId(9)));

        assert_eq!(child.entity("it"), Some(EntityId(9)));
        assert!(parent.variable("it").is_none());
    }

    #[test]
    fn test_sibling_bindings_are_independent() {
        let parent = GameContext::new(PlayerId::new(0)).bind("n", Binding::Number(1));
        let a = parent.bind("it", Binding::Entity(EntityId(3)));
        let b = parent.bind("it", Binding::Entity(EntityId(4)));

        assert_eq!(a.entity("it"), Some(EntityId(3)));
        assert_eq!(b.entity("it"), Some(EntityId(4)));
        assert_eq!(b.variable("n"), Some(&Binding::Number(1)));
    }

    #[test]
    fn test_event_context_from_event() {
        let event = GameEvent::damage(Some(EntityId(5)), EntityId(6), 2);
        let ctx = GameContext::new(PlayerId::new(1)).with_event(&event);
        assert_eq!(ctx.event.kind, Some(EventKind::DamageDealt));
        assert_eq!(ctx.event.target_card, Some(EntityId(6)));
        assert_eq!(ctx.event.amount, 2);
    }
}
