//! Game events and what standing abilities listen for.
//!
//! A [`GameEvent`] is something that happened (a card was played, a
//! character was banished). A [`TriggerEvent`] is the parsed "whenever ..."
//! clause of a triggered ability; it turns into an event kind plus a
//! [`TriggerCondition`] when the card's triggers are registered.

use serde::{Deserialize, Serialize};

use super::condition::TriggerCondition;
use crate::core::{EntityId, PlayerId};
use crate::effects::Filter;

/// Kinds of game events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CardPlayed,
    SongPlayed,
    CardTargeted,
    Quested,
    Challenged,
    Banished,
    DamageDealt,
    CardDrawn,
    TurnStarted,
    TurnEnded,
}

/// A game event with contextual data.
///
/// - `source`: the card that caused the event (the played card, the quester)
/// - `target`: the card affected (the chosen target, the banished card)
/// - `player`: the player the event belongs to
/// - `amount`: damage dealt, cards drawn, ...
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    pub source: Option<EntityId>,
    pub target: Option<EntityId>,
    pub player: Option<PlayerId>,
    pub amount: i64,
}

impl GameEvent {
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            player: None,
            amount: 0,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    /// A card-centric event such as "card played".
    #[must_use]
    pub fn for_card(kind: EventKind, card: EntityId, controller: PlayerId) -> Self {
        Self::new(kind).with_source(card).with_player(controller)
    }

    /// A player-centric event such as "turn started".
    #[must_use]
    pub fn for_player(kind: EventKind, player: PlayerId) -> Self {
        Self::new(kind).with_player(player)
    }

    /// Damage dealt by `source` to `target`.
    #[must_use]
    pub fn damage(source: Option<EntityId>, target: EntityId, amount: i64) -> Self {
        let event = Self::new(EventKind::DamageDealt)
            .with_target(target)
            .with_amount(amount);
        match source {
            Some(source) => event.with_source(source),
            None => event,
        }
    }
}

/// The "whenever ..." clause of a triggered ability.
///
/// Serialized externally tagged: `"on_play"` or
/// `{"on_another_card_played": {"filter": ...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// When this card is played. Run directly by the play machine, never
    /// registered.
    OnPlay,
    OnAnotherCardPlayed {
        #[serde(default)]
        filter: Option<Filter>,
    },
    OnAnotherCharacterPlayed {
        #[serde(default)]
        filter: Option<Filter>,
    },
    OnSongPlayed {
        #[serde(default)]
        filter: Option<Filter>,
    },
    /// When this card is chosen as the target of a play.
    OnTargeted,
    OnQuest,
    OnChallenge,
    OnChallenged,
    OnBanished,
    OnDamaged,
    OnTurnStart,
    OnTurnEnd,
}

impl TriggerEvent {
    /// Event kind and condition to register, or `None` for `OnPlay`.
    #[must_use]
    pub fn registration(&self) -> Option<(EventKind, TriggerCondition)> {
        use TriggerCondition as C;

        let with_filter = |base: C, filter: &Option<Filter>| match filter {
            Some(f) => base.and(C::SourceMatches(f.clone())),
            None => base,
        };

        let registration = match self {
            TriggerEvent::OnPlay => return None,
            TriggerEvent::OnAnotherCardPlayed { filter } => {
                (EventKind::CardPlayed, with_filter(C::SourceIsOther, filter))
            }
            TriggerEvent::OnAnotherCharacterPlayed { filter } => (
                EventKind::CardPlayed,
                with_filter(C::SourceIsOther.and(C::SourceIsCharacter), filter),
            ),
            TriggerEvent::OnSongPlayed { filter } => {
                (EventKind::SongPlayed, with_filter(C::Always, filter))
            }
            TriggerEvent::OnTargeted => (EventKind::CardTargeted, C::TargetIsSelf),
            TriggerEvent::OnQuest => (EventKind::Quested, C::SourceIsSelf),
            TriggerEvent::OnChallenge => (EventKind::Challenged, C::SourceIsSelf),
            TriggerEvent::OnChallenged => (EventKind::Challenged, C::TargetIsSelf),
            TriggerEvent::OnBanished => (EventKind::Banished, C::TargetIsSelf),
            TriggerEvent::OnDamaged => (EventKind::DamageDealt, C::TargetIsSelf),
            TriggerEvent::OnTurnStart => (EventKind::TurnStarted, C::ForController),
            TriggerEvent::OnTurnEnd => (EventKind::TurnEnded, C::ForController),
        };
        Some(registration)
    }
}
