//! The effect dispatcher.
//!
//! [`Interpreter::execute`] is the single recursive entry point. Each node
//! goes through:
//!
//! 1. The nesting guard (`GameConfig::max_effect_depth`).
//! 2. The "may" policy: an `optional` node asks a yes/no question before
//!    anything changes, unless its kind asks its own (see
//!    [`EffectKind::has_own_may_prompt`]).
//! 3. Routing: wrappers and composites recurse here, inline leaves run here,
//!    everything else goes to the owning [`Family`] handler, and unmapped
//!    tags go through a substring heuristic before being reported as
//!    [`Outcome::Unhandled`].
//!
//! Only structural defects are errors. A declined prompt, a spec with no
//! legal target or an empty deck are ordinary outcomes.

use tracing::{debug, warn};

use crate::cards::CardRegistry;
use crate::core::{EntityId, GameState, ZoneKind};
use crate::error::{EngineError, Result};

use super::ast::{EffectKind, EffectNode, Route};
use super::choice::DecisionProvider;
use super::condition::{ConditionContext, ConditionEvaluator};
use super::context::{Binding, GameContext};
use super::continuous::{self, Restriction};
use super::families::Family;
use super::targeting::TargetSpec;

/// What happened to one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// State may have changed.
    Executed,
    /// The acting player declined a "may" before anything changed.
    Declined,
    /// Nothing to do: no legal target, false condition, nothing to pay with.
    NotApplicable,
    /// No handler claims this tag. Logged, otherwise ignored.
    Unhandled,
}

impl Outcome {
    #[must_use]
    pub fn is_executed(self) -> bool {
        self == Outcome::Executed
    }

    #[must_use]
    pub fn is_declined(self) -> bool {
        self == Outcome::Declined
    }

    /// Outcome of a group of nodes: executed if any executed.
    #[must_use]
    pub fn combine(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Executed, _) | (_, Outcome::Executed) => Outcome::Executed,
            (Outcome::Declined, _) | (_, Outcome::Declined) => Outcome::Declined,
            (Outcome::NotApplicable, _) | (_, Outcome::NotApplicable) => Outcome::NotApplicable,
            _ => Outcome::Unhandled,
        }
    }
}

/// Executes effect trees against a game state.
///
/// ```
/// use ink_engine::cards::CardRegistry;
/// use ink_engine::core::{GameConfig, GameState, PlayerId};
/// use ink_engine::effects::{EffectNode, GameContext, Interpreter, Outcome};
///
/// let mut state = GameState::new(GameConfig::default());
/// let cards = CardRegistry::new();
/// let node: EffectNode = serde_json::from_str(r#"{"type": "gain_lore", "amount": 2}"#).unwrap();
///
/// let mut interp = Interpreter::new(&mut state, &cards);
/// let outcome = interp.execute(&node, &GameContext::new(PlayerId::new(0))).unwrap();
/// assert_eq!(outcome, Outcome::Executed);
/// assert_eq!(state.lore(PlayerId::new(0)), 2);
/// ```
pub struct Interpreter<'a> {
    pub state: &'a mut GameState,
    pub cards: &'a CardRegistry,
    pub(crate) decisions: Option<&'a mut (dyn DecisionProvider + 'a)>,
    /// Targets of the most recent resolution, for `same_target`.
    pub(crate) last_resolved: Vec<EntityId>,
    pub(crate) next_choice_id: u32,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    /// An interpreter with no decision provider: every choice falls back to
    /// [`AutoSelect`](super::AutoSelect).
    pub fn new(state: &'a mut GameState, cards: &'a CardRegistry) -> Self {
        Self {
            state,
            cards,
            decisions: None,
            last_resolved: Vec::new(),
            next_choice_id: 0,
            depth: 0,
        }
    }

    #[must_use]
    pub fn with_decisions(mut self, provider: &'a mut (dyn DecisionProvider + 'a)) -> Self {
        self.decisions = Some(provider);
        self
    }

    /// Current nesting depth; 0 between top-level calls.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Read-only view for conditions and expressions.
    #[must_use]
    pub fn view<'b>(&'b self, ctx: &'b GameContext) -> ConditionContext<'b> {
        ConditionContext::new(self.state, self.cards, ctx)
    }

    /// Top-level entry. Starts a fresh `same_target` chain unless called
    /// from inside another resolution.
    pub fn execute(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        if self.depth == 0 {
            self.last_resolved.clear();
        }
        self.dispatch(node, ctx)
    }

    /// Resolve a standalone ability (a reaction, a hook) without disturbing
    /// the current `same_target` chain.
    pub fn run_nested(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let saved = std::mem::take(&mut self.last_resolved);
        let result = self.dispatch(node, ctx);
        self.last_resolved = saved;
        result
    }

    /// Evaluate a condition in `ctx`.
    #[must_use]
    pub fn evaluate_condition(&self, condition: &super::ConditionNode, ctx: &GameContext) -> bool {
        ConditionEvaluator::evaluate(condition, &self.view(ctx))
    }

    pub(crate) fn dispatch(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let limit = self.state.config.max_effect_depth;
        if self.depth >= limit {
            warn!(tag = node.tag(), limit, "effect nesting limit reached");
            return Err(EngineError::DepthExceeded { limit });
        }
        self.depth += 1;
        let result = self.dispatch_node(node, ctx);
        self.depth -= 1;
        result
    }

    fn dispatch_node(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        if node.optional && !node.kind.has_own_may_prompt() {
            let prompt = format!("Do you want to {}?", node.describe());
            if !self.confirm(ctx.player, prompt) {
                debug!(tag = node.tag(), player = %ctx.player, "optional effect declined");
                return Ok(Outcome::Declined);
            }
        }

        let route = node.kind.route();
        debug!(tag = node.tag(), route = ?route, depth = self.depth, "dispatch");
        match route {
            Route::Wrapper => self.run_wrapper(node, ctx),
            Route::Composite => self.run_composite(node, ctx),
            Route::Inline => self.run_inline(node, ctx),
            Route::Family(family) => family.handler().execute(self, node, ctx),
            Route::Unmapped => self.run_unmapped(node, ctx),
        }
    }

    /// The "may" question for kinds that ask it themselves.
    pub(crate) fn may(&mut self, node: &EffectNode, ctx: &GameContext, prompt: impl Into<String>) -> bool {
        if !node.optional {
            return true;
        }
        let accepted = self.confirm(ctx.player, prompt);
        if !accepted {
            debug!(tag = node.tag(), player = %ctx.player, "optional effect declined");
        }
        accepted
    }

    /// Run nodes in order. A child that declines its own "may" (or a
    /// declined leaf) ends the list; declines deeper down do not.
    pub fn run_sequence(&mut self, effects: &[EffectNode], ctx: &GameContext) -> Result<Outcome> {
        let mut outcome: Option<Outcome> = None;
        for child in effects {
            let result = self.dispatch(child, ctx)?;
            if result.is_declined() && (child.optional || is_leaf(&child.kind)) {
                debug!(tag = child.tag(), "sequence stopped at declined effect");
                return Ok(match outcome {
                    Some(Outcome::Executed) => Outcome::Executed,
                    _ => Outcome::Declined,
                });
            }
            outcome = Some(outcome.map_or(result, |o| o.combine(result)));
        }
        Ok(outcome.unwrap_or(Outcome::NotApplicable))
    }

    fn run_wrapper(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::Activated { exert, ink, effects } => {
                if !self.pay_activation(ctx, *exert, *ink) {
                    return Ok(Outcome::NotApplicable);
                }
                self.run_sequence(effects, ctx)
            }
            EffectKind::Static { effects } => self.run_sequence(effects, &ctx.in_static()),
            kind => self.run_sequence(kind.children(), ctx),
        }
    }

    /// Pay an activated ability's costs. Nothing is paid unless all of it
    /// can be.
    fn pay_activation(&mut self, ctx: &GameContext, exert: bool, ink: i64) -> bool {
        if let Some(source) = ctx.source {
            if continuous::has_restriction(self.state, source, Restriction::CantUseAbilities) {
                debug!(card = %source, "abilities cannot be used");
                return false;
            }
        }
        let source_ready = ctx
            .source
            .and_then(|s| self.state.card(s))
            .is_some_and(|c| c.ready);
        if exert && !source_ready {
            debug!(source = ?ctx.source, "activation needs a ready source");
            return false;
        }
        if ink > 0 && self.state.ready_ink(ctx.player) < ink as usize {
            debug!(player = %ctx.player, ink, "not enough ink to activate");
            return false;
        }
        if exert {
            if let Some(card) = ctx.source.and_then(|s| self.state.card_mut(s)) {
                card.ready = false;
            }
        }
        self.state.pay_ink(ctx.player, ink)
    }

    fn run_composite(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::Sequence { effects } | EffectKind::Cascade { effects } => {
                self.run_sequence(effects, ctx)
            }
            EffectKind::Conditional { condition, effect, otherwise } => {
                if self.evaluate_condition(condition, ctx) {
                    self.dispatch(effect, ctx)
                } else if let Some(otherwise) = otherwise {
                    self.dispatch(otherwise, ctx)
                } else {
                    debug!("condition false, no else branch");
                    Ok(Outcome::NotApplicable)
                }
            }
            EffectKind::ConditionalAction { condition, base_action, replacement_action } => {
                if self.evaluate_condition(condition, ctx) {
                    self.dispatch(replacement_action, ctx)
                } else {
                    self.dispatch(base_action, ctx)
                }
            }
            EffectKind::Modal { options } => {
                let index = ctx.modal_choice.unwrap_or(0);
                let chosen = options.get(index).ok_or(EngineError::InvalidModalIndex {
                    index,
                    len: options.len(),
                })?;
                self.run_sequence(chosen, ctx)
            }
            EffectKind::ModalChoice { options, labels } => {
                let labels: Vec<String> = if labels.len() == options.len() {
                    labels.clone()
                } else {
                    options.iter().map(EffectNode::describe).collect()
                };
                match self.choose_option(ctx.player, "Choose one", &labels, false) {
                    Some(index) => {
                        let chosen = options.get(index).ok_or(EngineError::InvalidModalIndex {
                            index,
                            len: options.len(),
                        })?;
                        self.dispatch(chosen, ctx)
                    }
                    None => Ok(Outcome::NotApplicable),
                }
            }
            EffectKind::ForEach { target, variable, effect } => {
                let targets = self.resolve_targets(target, ctx);
                if targets.is_empty() {
                    debug!(target = ?target, "for_each over an empty set");
                    return Ok(Outcome::NotApplicable);
                }
                let mut outcome = Outcome::NotApplicable;
                for id in targets {
                    let scope = ctx.bind(variable.as_str(), Binding::Entity(id));
                    outcome = outcome.combine(self.dispatch(effect, &scope)?);
                }
                Ok(outcome)
            }
            EffectKind::Bind { name, value, effect } => {
                let n = ConditionEvaluator::evaluate_expression(value, &self.view(ctx));
                let scope = ctx.bind(name.as_str(), Binding::Number(n));
                self.dispatch(effect, &scope)
            }
            other => {
                warn!(tag = other.tag(), "not a composite");
                Ok(Outcome::Unhandled)
            }
        }
    }

    fn run_inline(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::Damage { amount, target } => {
                let amount = self.amount(amount, ctx);
                let targets = self.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                if targets.is_empty() || amount <= 0 {
                    debug!("damage: nothing to damage");
                    return Ok(Outcome::NotApplicable);
                }
                let names = self.names(&targets);
                if !self.may(node, ctx, format!("Deal {amount} damage to {names}?")) {
                    return Ok(Outcome::Declined);
                }
                for id in targets {
                    self.deal_damage(id, amount, ctx.source)?;
                }
                Ok(Outcome::Executed)
            }
            EffectKind::Heal { amount, target } => {
                let amount = self.amount(amount, ctx);
                let targets = self.card_targets(target.as_ref(), TargetSpec::chosen_character(), ctx);
                if targets.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                for id in targets {
                    let healed = self.state.heal(id, amount);
                    debug!(card = %id, healed, "damage removed");
                }
                Ok(Outcome::Executed)
            }
            EffectKind::Draw { amount, target } => {
                let amount = self.amount(amount, ctx).max(0) as usize;
                let players = self.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx);
                if amount == 0 || players.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                if !self.may(node, ctx, format!("Draw {amount}?")) {
                    return Ok(Outcome::Declined);
                }
                for player in players {
                    self.draw_cards(player, amount)?;
                }
                Ok(Outcome::Executed)
            }
            EffectKind::GainLore { amount, target } => {
                let amount = self.amount(amount, ctx);
                for player in self.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    self.state.gain_lore(player, amount);
                }
                Ok(Outcome::Executed)
            }
            EffectKind::LoseLore { amount, target } => {
                let amount = self.amount(amount, ctx);
                for player in self.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    self.state.lose_lore(player, amount);
                }
                Ok(Outcome::Executed)
            }
            EffectKind::Discard { amount, target, random } => {
                let amount = self.amount(amount, ctx).max(0) as usize;
                let players = self.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx);
                let mut discarded = 0;
                for player in players {
                    let chosen = if *random {
                        self.random_from_hand(player, amount)
                    } else {
                        self.choose_from_hand(player, amount, format!("Choose {amount} to discard"))
                    };
                    discarded += self.discard_cards(player, &chosen);
                }
                Ok(if discarded > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }
            other => {
                warn!(tag = other.tag(), "not an inline effect");
                Ok(Outcome::Unhandled)
            }
        }
    }

    /// Substring heuristic for tags with no variant of their own.
    fn run_unmapped(&mut self, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let tag = node.tag().to_ascii_lowercase();
        match unmapped_family(&tag) {
            Some(family) => {
                debug!(tag = %tag, family = ?family, "unmapped effect routed by name");
                family.handler().execute_unmapped(self, node, ctx)
            }
            None => {
                warn!(tag = %tag, "unhandled effect type ignored");
                Ok(Outcome::Unhandled)
            }
        }
    }

    /// Resolve to cards, dropping players and cards that left play.
    pub(crate) fn card_targets(
        &mut self,
        spec: Option<&TargetSpec>,
        default: TargetSpec,
        ctx: &GameContext,
    ) -> Vec<EntityId> {
        let resolved = self.resolve_or(spec, default, ctx);
        resolved
            .into_iter()
            .filter(|&id| self.state.in_zone(id, ZoneKind::Play))
            .collect()
    }

    pub(crate) fn names(&self, ids: &[EntityId]) -> String {
        ids.iter()
            .map(|&id| self.display_name(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Leaves decline for themselves; wrappers and composites only pass a
/// nested decline along.
fn is_leaf(kind: &EffectKind) -> bool {
    !matches!(kind.route(), Route::Wrapper | Route::Composite)
}

/// Order matters: `opponent_draws` belongs to the opponent family, not to
/// draw.
fn unmapped_family(tag: &str) -> Option<Family> {
    const RULES: [(&str, Family); 6] = [
        ("opponent", Family::Opponent),
        ("draw", Family::DrawLore),
        ("lore", Family::DrawLore),
        ("discard", Family::Choice),
        ("deck", Family::Deck),
        ("look", Family::Deck),
    ];
    RULES
        .iter()
        .find(|(needle, _)| tag.contains(needle))
        .map(|(_, family)| *family)
}
