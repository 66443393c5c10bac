//! Continuous (duration-scoped) effects and the values derived from them.
//!
//! Handlers append [`ActiveEffect`] records to the state's ledger. Nothing
//! here mutates the ledger: effective stats and keywords are recomputed from
//! the printed definition, the instance and every live record on each read.
//! Expiry at phase boundaries belongs to the turn orchestrator
//! (`GameState::expire_end_of_turn` / `expire_start_of_turn`).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardRegistry, Keyword, KeywordKind, Stat};
use crate::core::{EntityId, GameState, PlayerId, ZoneKind};

use super::ast::EffectNode;
use super::condition::ConditionContext;
use super::filter::{self, Filter};

/// Ledger record identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// How long a continuous effect lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    #[default]
    #[serde(alias = "until_end_of_turn")]
    ThisTurn,
    #[serde(alias = "next_turn_start")]
    UntilStartOfNextTurn,
    Permanent,
    /// Consumed the first time it applies.
    #[serde(alias = "one_shot")]
    OneUse,
    /// Live only while the source card is in play.
    WhileSourceInPlay,
}

/// Rule modifiers carried by a card or a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    CantQuest,
    CantChallenge,
    CantBeChallenged,
    MustChallenge,
    MustQuest,
    CantReady,
    /// Player-scoped.
    CantPlayActions,
    CantUseAbilities,
    /// Player-scoped.
    CantDiscard,
    CantBeChosen,
    Unexertable,
    /// Player-scoped: the player's permanents enter play exerted.
    EntersExerted,
    /// Permission rather than a restriction: may challenge ready characters.
    CanChallengeReady,
}

/// Reaction hooks the orchestrator runs via `Interpreter::run_hooks`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    OnChallenge,
    OnQuest,
    OnBanish,
}

/// What a continuous effect does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContinuousKind {
    StatModifier { stat: Stat, delta: i64 },
    GrantKeyword { keyword: Keyword },
    Restriction { restriction: Restriction },
    /// Reduces the cost of cards the target player plays.
    CostReduction {
        amount: i64,
        #[serde(default)]
        filter: Option<Filter>,
    },
    /// Prevents up to `amount` damage per hit; `None` prevents all of it.
    DamageShield {
        #[serde(default)]
        amount: Option<i64>,
    },
    GrantAbility { ability: Box<EffectNode> },
    Hook { hook: HookKind, effect: Box<EffectNode> },
}

/// A record in the active-effect ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: EffectId,
    pub source_card: Option<EntityId>,
    pub source_player: PlayerId,
    /// Cards or players (by their player entity id) the effect applies to.
    pub targets: SmallVec<[EntityId; 4]>,
    pub duration: Duration,
    pub kind: ContinuousKind,
    pub created_turn: u32,
}

impl ActiveEffect {
    /// Build a record; the ledger assigns `id` and `created_turn`.
    #[must_use]
    pub fn new(
        source_card: Option<EntityId>,
        source_player: PlayerId,
        targets: impl IntoIterator<Item = EntityId>,
        duration: Duration,
        kind: ContinuousKind,
    ) -> Self {
        Self {
            id: EffectId(0),
            source_card,
            source_player,
            targets: targets.into_iter().collect(),
            duration,
            kind,
            created_turn: 0,
        }
    }

    #[must_use]
    pub fn applies_to(&self, entity: EntityId) -> bool {
        self.targets.contains(&entity)
    }

    /// `WhileSourceInPlay` records lapse as soon as the source leaves play;
    /// every other duration is live until the orchestrator prunes it.
    #[must_use]
    pub fn is_live(&self, state: &GameState) -> bool {
        match self.duration {
            Duration::WhileSourceInPlay => self
                .source_card
                .is_some_and(|source| state.in_zone(source, ZoneKind::Play)),
            _ => true,
        }
    }
}

/// Live ledger records applying to `entity`.
pub fn effects_on(state: &GameState, entity: EntityId) -> impl Iterator<Item = &ActiveEffect> {
    state
        .active_effects
        .iter()
        .filter(move |e| e.applies_to(entity) && e.is_live(state))
}

/// Stat after modifiers, floored at 0. `Damage` reads the instance.
#[must_use]
pub fn effective_stat(state: &GameState, cards: &CardRegistry, card: EntityId, stat: Stat) -> i64 {
    let Some(instance) = state.card(card) else {
        return 0;
    };
    if stat == Stat::Damage {
        return instance.damage;
    }
    let base = cards
        .get(instance.card_id)
        .map_or(0, |def| def.base_stat(stat));
    let delta: i64 = effects_on(state, card)
        .filter_map(|e| match &e.kind {
            ContinuousKind::StatModifier { stat: s, delta } if *s == stat => Some(*delta),
            _ => None,
        })
        .fold(0, i64::saturating_add);
    base.saturating_add(delta).max(0)
}

/// Printed keywords followed by granted ones.
#[must_use]
pub fn effective_keywords(state: &GameState, cards: &CardRegistry, card: EntityId) -> Vec<Keyword> {
    let Some(instance) = state.card(card) else {
        return Vec::new();
    };
    let mut keywords: Vec<Keyword> = cards
        .get(instance.card_id)
        .map(|def| def.keywords.clone())
        .unwrap_or_default();
    keywords.extend(effects_on(state, card).filter_map(|e| match &e.kind {
        ContinuousKind::GrantKeyword { keyword } => Some(*keyword),
        _ => None,
    }));
    keywords
}

#[must_use]
pub fn has_keyword(state: &GameState, cards: &CardRegistry, card: EntityId, kind: KeywordKind) -> bool {
    effective_keywords(state, cards, card)
        .iter()
        .any(|k| k.kind() == kind)
}

/// Sum of every instance of a numeric keyword (Resist +1 and a granted
/// Resist +2 stack to 3). `None` if the card lacks the keyword.
#[must_use]
pub fn keyword_total(
    state: &GameState,
    cards: &CardRegistry,
    card: EntityId,
    kind: KeywordKind,
) -> Option<i64> {
    let matching: Vec<i64> = effective_keywords(state, cards, card)
        .into_iter()
        .filter(|k| k.kind() == kind)
        .map(Keyword::value)
        .collect();
    if matching.is_empty() {
        None
    } else {
        Some(matching.iter().sum())
    }
}

/// Does a live restriction apply to this card or player entity?
#[must_use]
pub fn has_restriction(state: &GameState, entity: EntityId, restriction: Restriction) -> bool {
    effects_on(state, entity).any(|e| {
        matches!(&e.kind, ContinuousKind::Restriction { restriction: r } if *r == restriction)
    })
}

#[must_use]
pub fn player_has_restriction(state: &GameState, player: PlayerId, restriction: Restriction) -> bool {
    has_restriction(state, EntityId::player(player), restriction)
}

/// Abilities granted to a card by live effects.
#[must_use]
pub fn granted_abilities(state: &GameState, card: EntityId) -> Vec<&EffectNode> {
    effects_on(state, card)
        .filter_map(|e| match &e.kind {
            ContinuousKind::GrantAbility { ability } => Some(ability.as_ref()),
            _ => None,
        })
        .collect()
}

/// Live hooks of one kind attached to a card.
#[must_use]
pub fn hooks_on(state: &GameState, card: EntityId, hook: HookKind) -> Vec<ActiveEffect> {
    effects_on(state, card)
        .filter(|e| matches!(&e.kind, ContinuousKind::Hook { hook: h, .. } if *h == hook))
        .cloned()
        .collect()
}

/// Cost reductions the acting player holds for `card`: the total of those
/// whose filter matches, and every one-use record, which a play consumes
/// whether or not it matched.
#[must_use]
pub fn cost_reductions(ctx: &ConditionContext<'_>, card: EntityId) -> (i64, Vec<EffectId>) {
    let mut total: i64 = 0;
    let mut one_use = Vec::new();
    for effect in effects_on(ctx.state, EntityId::player(ctx.player())) {
        let ContinuousKind::CostReduction { amount, filter: card_filter } = &effect.kind else {
            continue;
        };
        if filter::passes(card_filter.as_ref(), card, ctx) {
            total = total.saturating_add(*amount);
        }
        if effect.duration == Duration::OneUse {
            one_use.push(effect.id);
        }
    }
    (total, one_use)
}
