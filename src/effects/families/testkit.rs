//! Table setup shared by the family handler tests.

use crate::cards::{CardDefinition, CardId, CardRegistry, CardType};
use crate::core::{EntityId, GameConfig, GameState, PlayerId, ZoneKind};
use crate::effects::{EffectNode, GameContext, Interpreter, Outcome, ScriptedProvider};

pub const P0: PlayerId = PlayerId::new(0);
pub const P1: PlayerId = PlayerId::new(1);

pub fn node(json: &str) -> EffectNode {
    serde_json::from_str(json).unwrap()
}

pub struct Table {
    pub state: GameState,
    pub cards: CardRegistry,
    next_card: u32,
}

impl Table {
    pub fn new() -> Self {
        Self {
            state: GameState::new(GameConfig::default()),
            cards: CardRegistry::new(),
            next_card: 1,
        }
    }

    /// Register a definition built from a fresh id.
    pub fn define(&mut self, build: impl FnOnce(CardId) -> CardDefinition) -> CardId {
        let id = CardId::new(self.next_card);
        self.next_card += 1;
        self.cards.register(build(id));
        id
    }

    pub fn character(&mut self, name: &str, strength: i64, willpower: i64, lore: i64) -> CardId {
        self.define(|id| {
            CardDefinition::new(id, name, CardType::Character).with_stats(strength, willpower, lore)
        })
    }

    pub fn put(&mut self, card: CardId, owner: PlayerId, zone: ZoneKind) -> EntityId {
        self.state.create_card(card, owner, zone)
    }

    /// `count` copies of a vanilla card in a zone.
    pub fn fill(&mut self, owner: PlayerId, zone: ZoneKind, count: usize) -> Vec<EntityId> {
        let filler = self.character("Filler", 1, 1, 1);
        (0..count).map(|_| self.put(filler, owner, zone)).collect()
    }

    pub fn run(&mut self, json: &str, ctx: &GameContext) -> Outcome {
        Interpreter::new(&mut self.state, &self.cards)
            .execute(&node(json), ctx)
            .unwrap()
    }

    pub fn run_with(&mut self, json: &str, ctx: &GameContext, provider: &mut ScriptedProvider) -> Outcome {
        Interpreter::new(&mut self.state, &self.cards)
            .with_decisions(provider)
            .execute(&node(json), ctx)
            .unwrap()
    }

    pub fn damage(&self, id: EntityId) -> i64 {
        self.state.card(id).map_or(0, |c| c.damage)
    }

    pub fn ready(&self, id: EntityId) -> bool {
        self.state.card(id).is_some_and(|c| c.ready)
    }
}
