//! The card-play state machine.
//!
//! A card leaves its owner's hand along one of three paths:
//!
//! - **Normal**: pay the (modified) cost in ink. Actions resolve and go to
//!   the discard; characters, items and locations enter play.
//! - **Shift**: pay the shift cost and put the card into play on top of a
//!   same-named character, taking over its battlefield state.
//! - **Sing**: exert ready characters whose combined singing value covers a
//!   song's cost instead of paying ink.
//!
//! Every path ends with the played card's own "on play" abilities, the
//! reactions of other cards, and a call back into the orchestrator.
//!
//! ```
//! use ink_engine::cards::{CardDefinition, CardId, CardRegistry, CardType};
//! use ink_engine::core::{GameConfig, GameState, PlayerId, ZoneKind};
//! use ink_engine::effects::Interpreter;
//! use ink_engine::rules::{execute_play_card, DefaultHooks, PlayRequest};
//!
//! let mut cards = CardRegistry::new();
//! cards.register(CardDefinition::new(CardId::new(1), "Stitch", CardType::Character).with_cost(1));
//!
//! let mut state = GameState::new(GameConfig::default());
//! let p0 = PlayerId::new(0);
//! let stitch = state.create_card(CardId::new(1), p0, ZoneKind::Hand);
//! state.create_card(CardId::new(1), p0, ZoneKind::Inkwell);
//!
//! let mut hooks = DefaultHooks::new();
//! let mut interp = Interpreter::new(&mut state, &cards);
//! let played = execute_play_card(&mut hooks, &mut interp, p0, stitch, &PlayRequest::default()).unwrap();
//! assert!(played);
//! assert!(state.in_zone(stitch, ZoneKind::Play));
//! assert_eq!(state.ready_ink(p0), 0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{CardDefinition, CardType, KeywordKind, Stat};
use crate::core::{EntityId, PlayerId, ZoneId, ZoneKind};
use crate::effects::continuous::{self, EffectId, Restriction};
use crate::effects::{EffectKind, EffectNode, GameContext, Interpreter, Payload};
use crate::error::{EngineError, Result};
use crate::triggers::{EventKind, GameEvent, TriggerEvent};
use crate::zones::ZonePosition;

use super::hooks::TurnHooks;

/// Adjustments from effects that play a card ("play for free", "play for
/// 2 less").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayOptions {
    /// Pay nothing. Cost reductions are left unconsumed.
    pub free: bool,
    /// Added to the cost after reductions; negative plays for less.
    pub cost_delta: i64,
    /// Force a permanent to enter play exerted.
    pub enter_exerted: bool,
}

/// What the player declared along with the play.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayRequest {
    /// Characters exerted to sing a song.
    pub singers: Vec<EntityId>,
    /// Same-named character to shift onto.
    pub shift_target: Option<EntityId>,
    /// Target declared for the card's effects.
    pub target: Option<EntityId>,
    pub payload: Option<Payload>,
    pub options: PlayOptions,
}

impl PlayRequest {
    #[must_use]
    pub fn with_singers(mut self, singers: Vec<EntityId>) -> Self {
        self.singers = singers;
        self
    }

    #[must_use]
    pub fn with_shift_target(mut self, base: EntityId) -> Self {
        self.shift_target = Some(base);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: PlayOptions) -> Self {
        self.options = options;
        self
    }

    /// Shift wins over singing; anything else is a normal play.
    #[must_use]
    pub fn path(&self) -> PlayPath {
        if self.shift_target.is_some() {
            PlayPath::Shift
        } else if !self.singers.is_empty() {
            PlayPath::Sing
        } else {
            PlayPath::Normal
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayPath {
    Normal,
    Shift,
    Sing,
}

/// Play `card` from `player`'s hand.
///
/// Returns `Ok(false)`, with nothing paid and nothing moved, when the play
/// is not legal: wrong phase, not in hand, actions forbidden, not enough
/// ink, an invalid shift base or singers that cannot cover the cost.
/// Errors are structural only (unknown card or definition, a bad modal
/// index inside an ability).
pub fn execute_play_card(
    hooks: &mut dyn TurnHooks,
    interp: &mut Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    request: &PlayRequest,
) -> Result<bool> {
    interp.state.check_player(player)?;
    let card_id = interp.state.require_card(card)?.card_id;
    let cards = interp.cards;
    let def = cards.get(card_id).ok_or(EngineError::UnknownDefinition(card_id))?;

    if !hooks.can_play_cards(interp.state, player) {
        debug!(%player, card = %def.name, phase = ?interp.state.phase, "cannot play cards now");
        return Ok(false);
    }
    if interp.state.owner_of(card) != Some(player) || !interp.state.in_zone(card, ZoneKind::Hand) {
        debug!(%player, %card, "card is not in the player's hand");
        return Ok(false);
    }
    if def.card_type == CardType::Action
        && continuous::player_has_restriction(interp.state, player, Restriction::CantPlayActions)
    {
        debug!(%player, card = %def.name, "actions cannot be played");
        return Ok(false);
    }

    let path = request.path();
    let played = match (path, request.shift_target) {
        (PlayPath::Shift, Some(base)) => play_shift(interp, player, card, def, base, request.options),
        (PlayPath::Sing, _) => play_song(interp, player, card, def, &request.singers, request.options),
        _ => play_normal(interp, player, card, def, request.options),
    };
    if !played {
        return Ok(false);
    }
    info!(%player, card = %def.full_name(), ?path, "card played");

    resolve_play(interp, player, card, def, request)?;

    hooks.recalculate_effects(interp.state, interp.cards);
    hooks.check_win_condition(interp.state, player);
    Ok(true)
}

// === Paths ===

fn play_normal(
    interp: &mut Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    def: &CardDefinition,
    options: PlayOptions,
) -> bool {
    let base = continuous::effective_stat(interp.state, interp.cards, card, Stat::Cost);
    let (cost, consumed) = play_cost(interp, player, card, base, options);
    if !pay(interp, player, def, cost, &consumed) {
        return false;
    }

    if def.card_type == CardType::Action {
        // Off every zone while it resolves; `resolve_play` discards it.
        interp.state.zones.remove(card);
        return true;
    }

    interp.move_to(card, ZoneKind::Play, ZonePosition::Top);
    let turn = interp.state.turn_number;
    if let Some(instance) = interp.state.card_mut(card) {
        instance.turn_played = Some(turn);
    }
    if enters_exerted(interp, player, card, def, options) {
        if let Some(instance) = interp.state.card_mut(card) {
            instance.ready = false;
        }
    }
    interp.register_triggers(card);
    true
}

fn play_shift(
    interp: &mut Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    def: &CardDefinition,
    base: EntityId,
    options: PlayOptions,
) -> bool {
    let Some(shift_cost) = def.shift_cost() else {
        debug!(card = %def.name, "card has no Shift");
        return false;
    };
    let base_name = interp
        .state
        .card(base)
        .and_then(|c| interp.cards.get(c.card_id))
        .map(|d| d.name.as_str());
    let valid_base = interp.state.in_zone(base, ZoneKind::Play)
        && interp.state.owner_of(base) == Some(player)
        && interp.is_character(base)
        && base_name == Some(def.name.as_str());
    if !valid_base {
        debug!(card = %def.name, %base, "invalid shift base");
        return false;
    }

    let (cost, consumed) = play_cost(interp, player, card, shift_cost, options);
    if !pay(interp, player, def, cost, &consumed) {
        return false;
    }
    if !interp.state.shift_onto(card, base) {
        return false;
    }
    interp.register_triggers(card);
    true
}

fn play_song(
    interp: &mut Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    def: &CardDefinition,
    singers: &[EntityId],
    options: PlayOptions,
) -> bool {
    if !def.is_song() {
        debug!(card = %def.name, "only songs can be sung");
        return false;
    }
    let mut total: i64 = 0;
    for (i, &singer) in singers.iter().enumerate() {
        if singers[..i].contains(&singer) || !can_sing(interp, player, singer) {
            debug!(%singer, "singer cannot sing");
            return false;
        }
        total = total.saturating_add(singing_value(interp, singer));
    }

    let base = continuous::effective_stat(interp.state, interp.cards, card, Stat::Cost);
    let (cost, consumed) = play_cost(interp, player, card, base, options);
    if total < cost {
        debug!(card = %def.name, total, cost, "singers fall short");
        return false;
    }
    for &singer in singers {
        interp.exert_card(singer);
    }
    consume(interp, &consumed);
    interp.state.zones.remove(card);
    true
}

// === Resolution ===

/// Run the card's own play abilities, then fire the events other cards
/// react to. Actions land in the discard once their effects are done.
fn resolve_play(
    interp: &mut Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    def: &CardDefinition,
    request: &PlayRequest,
) -> Result<()> {
    let mut ctx = GameContext::new(player).with_source(card);
    if let Some(target) = request.target {
        ctx = ctx.with_target_card(target);
    }
    if let Some(payload) = &request.payload {
        ctx = ctx.with_payload(payload.clone());
    }

    let is_action = def.card_type == CardType::Action;
    let resolved = def
        .abilities
        .iter()
        .filter(|a| runs_on_play(a, is_action))
        .try_for_each(|ability| interp.execute(ability, &ctx).map(drop));

    // A failed resolution still leaves the action in the discard.
    if is_action && interp.state.zone_of(card).is_none() {
        interp
            .state
            .zones
            .add_to_zone(card, ZoneId::new(player, ZoneKind::Discard), ZonePosition::Top);
    }
    resolved?;

    if let Some(target) = request.target {
        let event = GameEvent::for_card(EventKind::CardTargeted, card, player).with_target(target);
        interp.emit(&event)?;
    }
    interp.emit(&GameEvent::for_card(EventKind::CardPlayed, card, player))?;
    if def.is_song() {
        interp.emit(&GameEvent::for_card(EventKind::SongPlayed, card, player))?;
    }
    Ok(())
}

/// Permanents run their "on play" triggers; actions run everything that is
/// not a standing ability.
fn runs_on_play(ability: &EffectNode, is_action: bool) -> bool {
    match &ability.kind {
        EffectKind::Triggered { on, .. } => *on == TriggerEvent::OnPlay,
        EffectKind::Static { .. } | EffectKind::Activated { .. } => false,
        _ => is_action,
    }
}

// === Costs ===

/// Cost after reductions and options, plus the one-use reductions the play
/// consumes.
fn play_cost(
    interp: &Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    base: i64,
    options: PlayOptions,
) -> (i64, Vec<EffectId>) {
    if options.free {
        return (0, Vec::new());
    }
    let ctx = GameContext::new(player);
    let (reduction, one_use) = continuous::cost_reductions(&interp.view(&ctx), card);
    (base.saturating_sub(reduction).saturating_add(options.cost_delta).max(0), one_use)
}

fn pay(interp: &mut Interpreter<'_>, player: PlayerId, def: &CardDefinition, cost: i64, consumed: &[EffectId]) -> bool {
    if !interp.state.pay_ink(player, cost) {
        debug!(%player, card = %def.name, cost, ready = interp.state.ready_ink(player), "not enough ink");
        return false;
    }
    consume(interp, consumed);
    true
}

fn consume(interp: &mut Interpreter<'_>, consumed: &[EffectId]) {
    for &id in consumed {
        interp.state.remove_active_effect(id);
    }
}

// === Helpers ===

/// Forced by options, a printed "enters play exerted", or a restriction on
/// the player; a Bodyguard may choose to.
fn enters_exerted(
    interp: &mut Interpreter<'_>,
    player: PlayerId,
    card: EntityId,
    def: &CardDefinition,
    options: PlayOptions,
) -> bool {
    if options.enter_exerted || def.abilities.iter().any(printed_enters_exerted) {
        return true;
    }
    if def.card_type == CardType::Character
        && continuous::player_has_restriction(interp.state, player, Restriction::EntersExerted)
    {
        return true;
    }
    continuous::has_keyword(interp.state, interp.cards, card, KeywordKind::Bodyguard)
        && interp.confirm(player, format!("Play {} exerted?", def.name))
}

fn printed_enters_exerted(ability: &EffectNode) -> bool {
    match &ability.kind {
        EffectKind::EntersExerted { target: None } => true,
        EffectKind::Static { effects } => effects.iter().any(printed_enters_exerted),
        _ => false,
    }
}

/// Ready, dry, friendly characters that can be exerted.
fn can_sing(interp: &Interpreter<'_>, player: PlayerId, singer: EntityId) -> bool {
    let Some(instance) = interp.state.card(singer) else {
        return false;
    };
    instance.ready
        && instance.owner == player
        && instance.turn_played != Some(interp.state.turn_number)
        && interp.state.in_zone(singer, ZoneKind::Play)
        && interp.is_character(singer)
        && !continuous::has_restriction(interp.state, singer, Restriction::Unexertable)
}

/// Singer value if the character has one, its cost otherwise.
fn singing_value(interp: &Interpreter<'_>, singer: EntityId) -> i64 {
    continuous::keyword_total(interp.state, interp.cards, singer, KeywordKind::Singer)
        .unwrap_or_else(|| continuous::effective_stat(interp.state, interp.cards, singer, Stat::Cost))
}
