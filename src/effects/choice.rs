//! The choice protocol.
//!
//! Resolution suspends at exactly one kind of point: a [`ChoiceRequest`]
//! handed to the injected [`DecisionProvider`]. Nothing else observes a
//! player's intent. Without a provider the interpreter falls back to
//! [`AutoSelect`], which declines optional prompts and otherwise takes the
//! minimum number of options, first valid ones first.
//!
//! Responses are sanitized before use: unknown or invalid ids are dropped,
//! the selection is capped at `max`, and a mandatory request answered with
//! too few picks is topped up from the valid options in order. An optional
//! request left with no valid pick counts as declined.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{EntityId, GameState, PlayerId};

use super::interpreter::Interpreter;

/// Presentation category of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    YesNo,
    Character,
    Item,
    Location,
    Card,
    Player,
    /// One of several labelled options (modal abilities, named cards).
    Option,
}

impl ChoiceKind {
    /// Category for a semantic target type ("opposing_character", "item", ...).
    #[must_use]
    pub fn for_target_type(target_type: &str) -> Self {
        if target_type.contains("character") {
            ChoiceKind::Character
        } else if target_type.contains("item") {
            ChoiceKind::Item
        } else if target_type.contains("location") {
            ChoiceKind::Location
        } else if target_type.contains("player") {
            ChoiceKind::Player
        } else {
            ChoiceKind::Card
        }
    }
}

/// One selectable option. Entity choices use the raw entity id as `id`;
/// labelled choices use the option index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: u32,
    pub display: String,
    pub valid: bool,
}

impl ChoiceOption {
    #[must_use]
    pub fn new(id: u32, display: impl Into<String>) -> Self {
        Self {
            id,
            display: display.into(),
            valid: true,
        }
    }
}

/// A question for a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub id: u32,
    pub player: PlayerId,
    pub prompt: String,
    pub kind: ChoiceKind,
    pub options: Vec<ChoiceOption>,
    pub min: usize,
    pub max: usize,
    /// May the player decline outright?
    pub optional: bool,
}

/// Option id meaning "yes" in a [`ChoiceKind::YesNo`] request.
pub const YES: u32 = 1;
/// Option id meaning "no".
pub const NO: u32 = 0;

impl ChoiceRequest {
    /// A "may" prompt.
    #[must_use]
    pub fn yes_no(player: PlayerId, prompt: impl Into<String>) -> Self {
        Self {
            id: 0,
            player,
            prompt: prompt.into(),
            kind: ChoiceKind::YesNo,
            options: vec![ChoiceOption::new(YES, "Yes"), ChoiceOption::new(NO, "No")],
            min: 1,
            max: 1,
            optional: true,
        }
    }

    /// Ids of the valid options, in order.
    #[must_use]
    pub fn valid_ids(&self) -> Vec<u32> {
        self.options.iter().filter(|o| o.valid).map(|o| o.id).collect()
    }

    /// Clamp a raw response to what this request allows.
    ///
    /// An optional request with no valid pick left is a decline; a mandatory
    /// one is topped up to `min`.
    #[must_use]
    pub fn sanitize(&self, response: ChoiceResponse) -> ChoiceResponse {
        if response.declined && self.optional {
            return ChoiceResponse::declined();
        }
        let valid = self.valid_ids();
        let mut selected: Vec<u32> = Vec::with_capacity(self.max);
        for id in response.selected {
            if valid.contains(&id) && !selected.contains(&id) && selected.len() < self.max {
                selected.push(id);
            }
        }
        if selected.is_empty() && self.optional {
            return ChoiceResponse::declined();
        }
        if selected.len() < self.min {
            for id in valid {
                if selected.len() >= self.min {
                    break;
                }
                if !selected.contains(&id) {
                    selected.push(id);
                }
            }
        }
        ChoiceResponse {
            selected,
            declined: false,
        }
    }
}

/// A player's answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResponse {
    pub selected: Vec<u32>,
    pub declined: bool,
}

impl ChoiceResponse {
    #[must_use]
    pub fn yes() -> Self {
        Self::select([YES])
    }

    #[must_use]
    pub fn no() -> Self {
        Self::select([NO])
    }

    #[must_use]
    pub fn declined() -> Self {
        Self {
            selected: Vec::new(),
            declined: true,
        }
    }

    #[must_use]
    pub fn select(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            selected: ids.into_iter().collect(),
            declined: false,
        }
    }

    /// Select entities by id.
    #[must_use]
    pub fn entities(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::select(ids.into_iter().map(EntityId::raw))
    }

    /// Did a yes/no request get a yes?
    #[must_use]
    pub fn accepted(&self) -> bool {
        !self.declined && self.selected.contains(&YES)
    }
}

/// Source of player decisions: a human front end, an AI, or a test script.
pub trait DecisionProvider {
    fn request_choice(&mut self, state: &GameState, request: &ChoiceRequest) -> ChoiceResponse;
}

impl<F> DecisionProvider for F
where
    F: FnMut(&GameState, &ChoiceRequest) -> ChoiceResponse,
{
    fn request_choice(&mut self, state: &GameState, request: &ChoiceRequest) -> ChoiceResponse {
        self(state, request)
    }
}

/// Deterministic fallback: declines what may be declined, otherwise picks
/// the first `min` valid options.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoSelect;

impl DecisionProvider for AutoSelect {
    fn request_choice(&mut self, _state: &GameState, request: &ChoiceRequest) -> ChoiceResponse {
        if request.optional {
            return ChoiceResponse::declined();
        }
        ChoiceResponse::select(request.valid_ids().into_iter().take(request.min))
    }
}

/// Replays queued responses and records every request it sees. Falls back
/// to [`AutoSelect`] once the queue runs dry.
#[derive(Clone, Debug, Default)]
pub struct ScriptedProvider {
    responses: VecDeque<ChoiceResponse>,
    pub requests: Vec<ChoiceRequest>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(mut self, response: ChoiceResponse) -> Self {
        self.responses.push_back(response);
        self
    }

    pub fn push(&mut self, response: ChoiceResponse) {
        self.responses.push_back(response);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl DecisionProvider for ScriptedProvider {
    fn request_choice(&mut self, state: &GameState, request: &ChoiceRequest) -> ChoiceResponse {
        self.requests.push(request.clone());
        match self.responses.pop_front() {
            Some(response) => response,
            None => AutoSelect.request_choice(state, request),
        }
    }
}

impl<'a> Interpreter<'a> {
    /// Ask the provider (or [`AutoSelect`]) and sanitize the answer.
    pub fn request_choice(&mut self, mut request: ChoiceRequest) -> ChoiceResponse {
        self.next_choice_id += 1;
        request.id = self.next_choice_id;

        let raw = match self.decisions.as_mut() {
            Some(provider) => provider.request_choice(&*self.state, &request),
            None => AutoSelect.request_choice(&*self.state, &request),
        };
        let response = request.sanitize(raw);
        debug!(
            choice = request.id,
            player = %request.player,
            prompt = %request.prompt,
            selected = ?response.selected,
            declined = response.declined,
            "choice resolved"
        );
        response
    }

    /// Yes/no "may" prompt.
    pub fn confirm(&mut self, player: PlayerId, prompt: impl Into<String>) -> bool {
        self.request_choice(ChoiceRequest::yes_no(player, prompt)).accepted()
    }

    /// Pick cards or players from `pool`. Returns them in pool order.
    #[allow(clippy::too_many_arguments)]
    pub fn request_target_choice(
        &mut self,
        chooser: PlayerId,
        prompt: impl Into<String>,
        target_type: &str,
        pool: &[EntityId],
        min: usize,
        max: usize,
        optional: bool,
    ) -> Vec<EntityId> {
        if pool.is_empty() || max == 0 {
            return Vec::new();
        }
        let options = pool
            .iter()
            .map(|&id| ChoiceOption::new(id.raw(), self.display_name(id)))
            .collect();
        let request = ChoiceRequest {
            id: 0,
            player: chooser,
            prompt: prompt.into(),
            kind: ChoiceKind::for_target_type(target_type),
            options,
            min: min.min(pool.len()),
            max: max.min(pool.len()),
            optional,
        };
        let response = self.request_choice(request);
        pool.iter()
            .copied()
            .filter(|id| response.selected.contains(&id.raw()))
            .collect()
    }

    /// Pick one labelled option. `None` if declined or empty.
    pub fn choose_option(
        &mut self,
        player: PlayerId,
        prompt: impl Into<String>,
        labels: &[String],
        optional: bool,
    ) -> Option<usize> {
        if labels.is_empty() {
            return None;
        }
        let options = labels
            .iter()
            .enumerate()
            .map(|(i, label)| ChoiceOption::new(i as u32, label.clone()))
            .collect();
        let request = ChoiceRequest {
            id: 0,
            player,
            prompt: prompt.into(),
            kind: ChoiceKind::Option,
            options,
            min: 1,
            max: 1,
            optional,
        };
        self.request_choice(request)
            .selected
            .first()
            .map(|&i| i as usize)
    }

    /// "Name - Version" for cards, "Player n" for players.
    #[must_use]
    pub fn display_name(&self, id: EntityId) -> String {
        if let Some(player) = id.as_player(self.state.player_count()) {
            return player.to_string();
        }
        self.state
            .card(id)
            .and_then(|c| self.cards.get(c.card_id))
            .map_or_else(|| id.to_string(), |def| def.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;

    fn request(min: usize, max: usize, optional: bool) -> ChoiceRequest {
        ChoiceRequest {
            id: 1,
            player: PlayerId::new(0),
            prompt: "Choose".into(),
            kind: ChoiceKind::Character,
            options: vec![
                ChoiceOption::new(10, "A"),
                ChoiceOption { id: 11, display: "B".into(), valid: false },
                ChoiceOption::new(12, "C"),
            ],
            min,
            max,
            optional,
        }
    }

    #[test]
    fn test_auto_select_takes_minimum() {
        let state = GameState::new(GameConfig::default());
        let response = AutoSelect.request_choice(&state, &request(1, 2, false));
        assert_eq!(response.selected, vec![10]);
    }

    #[test]
    fn test_auto_select_declines_optional() {
        let state = GameState::new(GameConfig::default());
        let response = AutoSelect.request_choice(&state, &request(1, 1, true));
        assert!(response.declined);
        assert!(!response.accepted());
    }

    #[test]
    fn test_sanitize_drops_invalid_and_caps() {
        let req = request(1, 1, false);
        let response = req.sanitize(ChoiceResponse::select([11, 99, 12, 10]));
        assert_eq!(response.selected, vec![12]);
    }

    #[test]
    fn test_sanitize_fills_mandatory() {
        let req = request(2, 2, false);
        let response = req.sanitize(ChoiceResponse::declined());
        assert!(!response.declined);
        assert_eq!(response.selected, vec![10, 12]);
    }

    #[test]
    fn test_sanitize_empty_optional_is_declined() {
        let yes_no = ChoiceRequest::yes_no(PlayerId::new(0), "Gain lore?");
        assert!(yes_no.sanitize(ChoiceResponse::default()).declined);
        assert!(yes_no.sanitize(ChoiceResponse::select([42])).declined);
        assert!(yes_no.sanitize(ChoiceResponse::yes()).accepted());

        let up_to = request(1, 2, true);
        assert!(up_to.sanitize(ChoiceResponse::select([11])).declined);
    }

    #[test]
    fn test_scripted_provider_records_and_falls_back() {
        let state = GameState::new(GameConfig::default());
        let mut provider = ScriptedProvider::new().with_response(ChoiceResponse::select([12]));
        let req = request(1, 1, false);

        assert_eq!(provider.request_choice(&state, &req).selected, vec![12]);
        assert_eq!(provider.request_choice(&state, &req).selected, vec![10]);
        assert_eq!(provider.requests.len(), 2);
        assert_eq!(provider.remaining(), 0);
    }

    #[test]
    fn test_closure_provider() {
        let state = GameState::new(GameConfig::default());
        let mut always_yes = |_: &GameState, _: &ChoiceRequest| ChoiceResponse::yes();
        let yes_no = ChoiceRequest::yes_no(PlayerId::new(0), "Draw a card?");
        assert!(always_yes.request_choice(&state, &yes_no).accepted());
    }

    #[test]
    fn test_kind_for_target_type() {
        assert_eq!(ChoiceKind::for_target_type("opposing_character"), ChoiceKind::Character);
        assert_eq!(ChoiceKind::for_target_type("item"), ChoiceKind::Item);
        assert_eq!(ChoiceKind::for_target_type("card_in_discard"), ChoiceKind::Card);
    }
}
