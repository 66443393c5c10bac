//! Shared table setup for the integration tests.

#![allow(dead_code)]

use ink_engine::cards::{CardDefinition, CardId, CardRegistry, CardType};
use ink_engine::core::{EntityId, GameConfig, GameState, PlayerId, ZoneKind};
use ink_engine::effects::{EffectNode, GameContext, Interpreter, Outcome, ScriptedProvider};
use ink_engine::rules::{execute_play_card, DefaultHooks, PlayRequest};

pub const P0: PlayerId = PlayerId::new(0);
pub const P1: PlayerId = PlayerId::new(1);

pub fn node(json: &str) -> EffectNode {
    serde_json::from_str(json).expect("effect tree should parse")
}

/// A game state plus the definitions its cards point at.
pub struct Table {
    pub state: GameState,
    pub cards: CardRegistry,
    pub hooks: DefaultHooks,
    next_card: u32,
}

impl Table {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self {
            state: GameState::new(config),
            cards: CardRegistry::new(),
            hooks: DefaultHooks::new(),
            next_card: 1,
        }
    }

    pub fn define(&mut self, build: impl FnOnce(CardId) -> CardDefinition) -> CardId {
        let id = CardId::new(self.next_card);
        self.next_card += 1;
        self.cards.register(build(id));
        id
    }

    pub fn character(&mut self, name: &str, cost: i64, strength: i64, willpower: i64, lore: i64) -> CardId {
        self.define(|id| {
            CardDefinition::new(id, name, CardType::Character)
                .with_cost(cost)
                .with_stats(strength, willpower, lore)
        })
    }

    pub fn put(&mut self, card: CardId, owner: PlayerId, zone: ZoneKind) -> EntityId {
        self.state.create_card(card, owner, zone)
    }

    /// `count` vanilla cards in a zone, bottom to top.
    pub fn fill(&mut self, owner: PlayerId, zone: ZoneKind, count: usize) -> Vec<EntityId> {
        let filler = self.character("Filler", 1, 1, 1, 1);
        (0..count).map(|_| self.put(filler, owner, zone)).collect()
    }

    pub fn run(&mut self, json: &str, ctx: &GameContext) -> Outcome {
        Interpreter::new(&mut self.state, &self.cards)
            .execute(&node(json), ctx)
            .expect("effect should resolve")
    }

    pub fn run_with(&mut self, json: &str, ctx: &GameContext, provider: &mut ScriptedProvider) -> Outcome {
        Interpreter::new(&mut self.state, &self.cards)
            .with_decisions(provider)
            .execute(&node(json), ctx)
            .expect("effect should resolve")
    }

    pub fn play(&mut self, player: PlayerId, card: EntityId, request: &PlayRequest) -> bool {
        let mut interp = Interpreter::new(&mut self.state, &self.cards);
        execute_play_card(&mut self.hooks, &mut interp, player, card, request).expect("play should not error")
    }

    pub fn play_with(
        &mut self,
        player: PlayerId,
        card: EntityId,
        request: &PlayRequest,
        provider: &mut ScriptedProvider,
    ) -> bool {
        let mut interp = Interpreter::new(&mut self.state, &self.cards).with_decisions(provider);
        execute_play_card(&mut self.hooks, &mut interp, player, card, request).expect("play should not error")
    }
}
