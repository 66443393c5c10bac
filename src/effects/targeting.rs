//! Target selection.
//!
//! A [`TargetSpec`] names a rule for picking targets. Deterministic specs
//! ("each opposing character") are plain set computations over live state;
//! `chosen_*` specs resolve through, in order of precedence:
//!
//! 1. `payload.targets` on the context (automation override)
//! 2. the triggering event's preset target, unless it is the source itself
//! 3. `payload.pending_choices` that are still valid
//! 4. a live choice over the valid pool
//!
//! Every resolution is cached on the interpreter, so a later `same_target`
//! in the same call chain reuses it without asking again.
//!
//! Card lists come back in seat order, then zone order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::{CardType, KeywordKind};
use crate::core::{EntityId, PlayerId, ZoneKind};

use super::condition::ConditionContext;
use super::context::GameContext;
use super::continuous::{self, Restriction};
use super::filter::{self, Filter, Side};
use super::interpreter::Interpreter;

fn one() -> usize {
    1
}

/// Parameters of a `chosen_*` spec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub filter: Option<Filter>,
    #[serde(default = "one")]
    pub count: usize,
    /// "Up to `count`": the chooser may pick fewer, even none.
    pub up_to: bool,
    /// Who makes the choice, relative to the acting player.
    pub chooser: Side,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            filter: None,
            count: 1,
            up_to: false,
            chooser: Side::Self_,
        }
    }
}

impl Selection {
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn up_to(mut self, count: usize) -> Self {
        self.count = count;
        self.up_to = true;
        self
    }

    #[must_use]
    pub fn chosen_by(mut self, chooser: Side) -> Self {
        self.chooser = chooser;
        self
    }
}

/// A rule for selecting targets.
///
/// ```
/// use ink_engine::effects::TargetSpec;
///
/// let spec: TargetSpec = serde_json::from_str(r#"{"type": "chosen_opposing_character", "count": 2, "up_to": true}"#).unwrap();
/// assert!(spec.is_chosen());
/// let spec: TargetSpec = serde_json::from_str(r#"{"type": "self"}"#).unwrap();
/// assert_eq!(spec, TargetSpec::Self_);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetSpec {
    /// The source card, or the acting player when there is none.
    #[serde(rename = "self")]
    Self_,
    Opponent,
    #[serde(alias = "all_players")]
    EachPlayer,
    AllOpponents,
    /// Owners of the last resolved cards.
    OwnerOfChosen,
    /// Whatever the previous resolution in this call chain produced.
    SameTarget,
    Variable {
        name: String,
    },
    /// The event's target card.
    EventCard,
    /// The event's source card.
    EventSource,
    TopOfDeck {
        #[serde(default = "one")]
        count: usize,
    },

    ChosenCharacter(Selection),
    ChosenOpposingCharacter(Selection),
    ChosenFriendlyCharacter(Selection),
    ChosenItem(Selection),
    ChosenLocation(Selection),
    ChosenPermanent(Selection),
    ChosenCardInDiscard(Selection),
    ChosenCardInHand(Selection),

    AllCharacters {
        #[serde(default)]
        filter: Option<Filter>,
    },
    EachOpposingCharacter {
        #[serde(default)]
        filter: Option<Filter>,
    },
    EachFriendlyCharacter {
        #[serde(default)]
        filter: Option<Filter>,
    },
    AllItems {
        #[serde(default)]
        filter: Option<Filter>,
    },
    AllLocations {
        #[serde(default)]
        filter: Option<Filter>,
    },
}

impl TargetSpec {
    /// `chosen_character` with default selection.
    #[must_use]
    pub fn chosen_character() -> Self {
        TargetSpec::ChosenCharacter(Selection::default())
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            TargetSpec::ChosenCharacter(s)
            | TargetSpec::ChosenOpposingCharacter(s)
            | TargetSpec::ChosenFriendlyCharacter(s)
            | TargetSpec::ChosenItem(s)
            | TargetSpec::ChosenLocation(s)
            | TargetSpec::ChosenPermanent(s)
            | TargetSpec::ChosenCardInDiscard(s)
            | TargetSpec::ChosenCardInHand(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_chosen(&self) -> bool {
        self.selection().is_some()
    }

    /// Semantic target type for choice prompts.
    #[must_use]
    pub fn target_type(&self) -> &'static str {
        match self {
            TargetSpec::ChosenCharacter(_) => "character",
            TargetSpec::ChosenOpposingCharacter(_) => "opposing_character",
            TargetSpec::ChosenFriendlyCharacter(_) => "friendly_character",
            TargetSpec::ChosenItem(_) => "item",
            TargetSpec::ChosenLocation(_) => "location",
            TargetSpec::ChosenPermanent(_) => "permanent",
            TargetSpec::ChosenCardInDiscard(_) => "card_in_discard",
            TargetSpec::ChosenCardInHand(_) => "card_in_hand",
            _ => "card",
        }
    }
}

/// In-play cards of one type, optionally restricted to one side.
fn in_play(ctx: &ConditionContext<'_>, card_type: Option<CardType>, side: Side) -> Vec<EntityId> {
    let player = ctx.player();
    ctx.state
        .all_in_play()
        .into_iter()
        .filter(|&id| match side {
            Side::Self_ => ctx.state.owner_of(id) == Some(player),
            Side::Opponent => ctx.state.owner_of(id).is_some_and(|o| o != player),
            Side::Any => true,
        })
        .filter(|&id| card_type.map_or(true, |t| ctx.card_type(id) == Some(t)))
        .collect()
}

fn filtered(ids: Vec<EntityId>, filter: Option<&Filter>, ctx: &ConditionContext<'_>) -> Vec<EntityId> {
    ids.into_iter()
        .filter(|&id| filter::passes(filter, id, ctx))
        .collect()
}

/// Pure resolution: the deterministic target set, or for `chosen_*` specs
/// the candidate pool before Ward/hexproof screening. `same_target` and
/// `owner_of_chosen` need the interpreter's cache and read as empty here.
#[must_use]
pub fn candidates(spec: &TargetSpec, ctx: &ConditionContext<'_>) -> Vec<EntityId> {
    let player = ctx.player();
    let players = |ids: Vec<PlayerId>| ids.into_iter().map(EntityId::player).collect();

    match spec {
        TargetSpec::Self_ => vec![ctx.game.source.unwrap_or(EntityId::player(player))],
        TargetSpec::Opponent => vec![EntityId::player(ctx.state.opponent(player))],
        TargetSpec::EachPlayer => players(ctx.state.player_ids().collect()),
        TargetSpec::AllOpponents => players(ctx.state.opponents(player)),
        TargetSpec::OwnerOfChosen | TargetSpec::SameTarget => Vec::new(),
        TargetSpec::Variable { name } => ctx.game.entity(name).into_iter().collect(),
        TargetSpec::EventCard => ctx.game.event.target_card.into_iter().collect(),
        TargetSpec::EventSource => ctx.game.event.source.into_iter().collect(),
        TargetSpec::TopOfDeck { count } => {
            let deck = crate::core::ZoneId::new(player, ZoneKind::Deck);
            ctx.state.zones.top_cards(deck, *count)
        }

        TargetSpec::ChosenCharacter(s) => filtered(
            in_play(ctx, Some(CardType::Character), Side::Any),
            s.filter.as_ref(),
            ctx,
        ),
        TargetSpec::ChosenOpposingCharacter(s) => filtered(
            in_play(ctx, Some(CardType::Character), Side::Opponent),
            s.filter.as_ref(),
            ctx,
        ),
        TargetSpec::ChosenFriendlyCharacter(s) => filtered(
            in_play(ctx, Some(CardType::Character), Side::Self_),
            s.filter.as_ref(),
            ctx,
        ),
        TargetSpec::ChosenItem(s) => {
            filtered(in_play(ctx, Some(CardType::Item), Side::Any), s.filter.as_ref(), ctx)
        }
        TargetSpec::ChosenLocation(s) => {
            filtered(in_play(ctx, Some(CardType::Location), Side::Any), s.filter.as_ref(), ctx)
        }
        TargetSpec::ChosenPermanent(s) => {
            filtered(in_play(ctx, None, Side::Any), s.filter.as_ref(), ctx)
        }
        TargetSpec::ChosenCardInDiscard(s) => filtered(
            ctx.state.cards_in(player, ZoneKind::Discard).to_vec(),
            s.filter.as_ref(),
            ctx,
        ),
        TargetSpec::ChosenCardInHand(s) => filtered(
            ctx.state.cards_in(player, ZoneKind::Hand).to_vec(),
            s.filter.as_ref(),
            ctx,
        ),

        TargetSpec::AllCharacters { filter } => {
            filtered(in_play(ctx, Some(CardType::Character), Side::Any), filter.as_ref(), ctx)
        }
        TargetSpec::EachOpposingCharacter { filter } => filtered(
            in_play(ctx, Some(CardType::Character), Side::Opponent),
            filter.as_ref(),
            ctx,
        ),
        TargetSpec::EachFriendlyCharacter { filter } => filtered(
            in_play(ctx, Some(CardType::Character), Side::Self_),
            filter.as_ref(),
            ctx,
        ),
        TargetSpec::AllItems { filter } => {
            filtered(in_play(ctx, Some(CardType::Item), Side::Any), filter.as_ref(), ctx)
        }
        TargetSpec::AllLocations { filter } => {
            filtered(in_play(ctx, Some(CardType::Location), Side::Any), filter.as_ref(), ctx)
        }
    }
}

impl<'a> Interpreter<'a> {
    /// Resolve a spec to concrete entities and cache the result for
    /// `same_target`.
    pub fn resolve_targets(&mut self, spec: &TargetSpec, ctx: &GameContext) -> Vec<EntityId> {
        let resolved = match spec {
            TargetSpec::SameTarget => return self.last_resolved.clone(),
            TargetSpec::OwnerOfChosen => self
                .owners_of_last()
                .into_iter()
                .map(EntityId::player)
                .collect(),
            _ => match spec.selection() {
                Some(selection) => self.resolve_chosen(spec, selection, ctx),
                None => candidates(spec, &ConditionContext::new(self.state, self.cards, ctx)),
            },
        };
        debug!(spec = ?spec, targets = ?resolved, "targets resolved");
        self.last_resolved.clone_from(&resolved);
        resolved
    }

    /// `resolve_targets` with a fallback spec when the node names none.
    pub fn resolve_or(
        &mut self,
        spec: Option<&TargetSpec>,
        default: TargetSpec,
        ctx: &GameContext,
    ) -> Vec<EntityId> {
        match spec {
            Some(spec) => self.resolve_targets(spec, ctx),
            None => self.resolve_targets(&default, ctx),
        }
    }

    /// Resolve to players. Card results map to their owners.
    pub fn resolve_player_targets(&mut self, spec: &TargetSpec, ctx: &GameContext) -> Vec<PlayerId> {
        let player_count = self.state.player_count();
        let mut players: Vec<PlayerId> = match spec {
            TargetSpec::Self_ => vec![ctx.player],
            TargetSpec::Opponent => vec![self.state.opponent(ctx.player)],
            TargetSpec::EachPlayer => self.state.player_ids().collect(),
            TargetSpec::AllOpponents => self.state.opponents(ctx.player),
            TargetSpec::OwnerOfChosen => self.owners_of_last(),
            _ => self
                .resolve_targets(spec, ctx)
                .into_iter()
                .filter_map(|id| id.as_player(player_count).or_else(|| self.state.owner_of(id)))
                .collect(),
        };
        let mut seen = Vec::with_capacity(players.len());
        players.retain(|p| {
            if seen.contains(p) {
                false
            } else {
                seen.push(*p);
                true
            }
        });
        players
    }

    /// `resolve_player_targets` with a fallback spec.
    pub fn resolve_players_or(
        &mut self,
        spec: Option<&TargetSpec>,
        default: TargetSpec,
        ctx: &GameContext,
    ) -> Vec<PlayerId> {
        match spec {
            Some(spec) => self.resolve_player_targets(spec, ctx),
            None => self.resolve_player_targets(&default, ctx),
        }
    }

    /// Entities the last resolution produced.
    #[must_use]
    pub fn last_resolved(&self) -> &[EntityId] {
        &self.last_resolved
    }

    fn owners_of_last(&self) -> Vec<PlayerId> {
        let mut owners = Vec::new();
        for &id in &self.last_resolved {
            if let Some(owner) = self.state.owner_of(id) {
                if !owners.contains(&owner) {
                    owners.push(owner);
                }
            }
        }
        owners
    }

    /// Candidates a chooser may legally pick: Ward and "can't be chosen"
    /// cards are screened out when the chooser is not their owner.
    #[must_use]
    pub fn choosable(&self, pool: Vec<EntityId>, chooser: PlayerId) -> Vec<EntityId> {
        pool.into_iter()
            .filter(|&id| {
                let Some(owner) = self.state.owner_of(id) else {
                    return false;
                };
                if owner == chooser || !self.state.in_zone(id, ZoneKind::Play) {
                    return true;
                }
                !continuous::has_keyword(self.state, self.cards, id, KeywordKind::Ward)
                    && !continuous::has_restriction(self.state, id, Restriction::CantBeChosen)
            })
            .collect()
    }

    fn resolve_chosen(
        &mut self,
        spec: &TargetSpec,
        selection: &Selection,
        ctx: &GameContext,
    ) -> Vec<EntityId> {
        if let Some(targets) = &ctx.payload.targets {
            return targets.clone();
        }
        if let Some(preset) = ctx.event.target_card {
            if ctx.source != Some(preset) && self.state.card(preset).is_some() {
                return vec![preset];
            }
        }

        let chooser = match selection.chooser {
            Side::Opponent => self.state.opponent(ctx.player),
            Side::Self_ | Side::Any => ctx.player,
        };
        let pool = candidates(spec, &ConditionContext::new(self.state, self.cards, ctx));
        let pool = self.choosable(pool, chooser);
        if pool.is_empty() {
            debug!(spec = ?spec, "no valid targets");
            return Vec::new();
        }

        let max = selection.count.min(pool.len());
        let min = if selection.up_to { 0 } else { max };

        let pending: Vec<EntityId> = ctx
            .payload
            .pending_choices
            .iter()
            .copied()
            .filter(|id| pool.contains(id))
            .take(max)
            .collect();
        if !pending.is_empty() {
            return pending;
        }

        let prompt = if selection.up_to {
            format!("Choose up to {} {}", selection.count, spec.target_type())
        } else {
            format!("Choose {} {}", max, spec.target_type())
        };
        self.request_target_choice(chooser, prompt, spec.target_type(), &pool, min, max, selection.up_to)
    }
}
