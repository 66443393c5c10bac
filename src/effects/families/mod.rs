//! Family handlers.
//!
//! Every leaf kind that is not handled inline belongs to exactly one
//! family (see [`EffectKind::route`](crate::effects::EffectKind::route)).
//! A family owns a cluster of kinds that resolve the same way: all the
//! damage-shaped effects, all the zone transfers, all the restrictions.
//!
//! Handlers are stateless unit structs; everything they touch goes through
//! the [`Interpreter`].

mod challenge;
mod choice;
mod damage;
mod deck;
mod draw_lore;
mod location;
mod opponent;
mod prevention;
mod ready;
mod specialized;
mod stat;
mod static_effect;
mod utility;
mod zone;

#[cfg(test)]
mod testkit;

use tracing::warn;

use crate::error::Result;

use super::ast::{EffectKind, EffectNode};
use super::context::GameContext;
use super::interpreter::{Interpreter, Outcome};

pub use challenge::ChallengeFamily;
pub use choice::ChoiceFamily;
pub use damage::DamageFamily;
pub use deck::DeckFamily;
pub use draw_lore::DrawLoreFamily;
pub use location::LocationFamily;
pub use opponent::OpponentFamily;
pub use prevention::PreventionFamily;
pub use ready::ReadyFamily;
pub use specialized::SpecializedFamily;
pub use stat::StatFamily;
pub use static_effect::StaticEffectFamily;
pub use utility::UtilityFamily;
pub use zone::ZoneFamily;

/// The handler families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Damage,
    Zone,
    Prevention,
    Choice,
    Ready,
    Deck,
    Opponent,
    Location,
    Challenge,
    DrawLore,
    StaticEffect,
    Utility,
    Specialized,
    Stat,
}

impl Family {
    pub const ALL: [Family; 14] = [
        Family::Damage,
        Family::Zone,
        Family::Prevention,
        Family::Choice,
        Family::Ready,
        Family::Deck,
        Family::Opponent,
        Family::Location,
        Family::Challenge,
        Family::DrawLore,
        Family::StaticEffect,
        Family::Utility,
        Family::Specialized,
        Family::Stat,
    ];

    #[must_use]
    pub fn handler(self) -> &'static dyn FamilyHandler {
        match self {
            Family::Damage => &DamageFamily,
            Family::Zone => &ZoneFamily,
            Family::Prevention => &PreventionFamily,
            Family::Choice => &ChoiceFamily,
            Family::Ready => &ReadyFamily,
            Family::Deck => &DeckFamily,
            Family::Opponent => &OpponentFamily,
            Family::Location => &LocationFamily,
            Family::Challenge => &ChallengeFamily,
            Family::DrawLore => &DrawLoreFamily,
            Family::StaticEffect => &StaticEffectFamily,
            Family::Utility => &UtilityFamily,
            Family::Specialized => &SpecializedFamily,
            Family::Stat => &StatFamily,
        }
    }
}

/// One family's executor.
pub trait FamilyHandler: Sync {
    fn name(&self) -> &'static str;

    /// Execute a node this family owns.
    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome>;

    /// Best effort for an unmapped tag the name heuristic sent here.
    fn execute_unmapped(
        &self,
        _interp: &mut Interpreter<'_>,
        node: &EffectNode,
        _ctx: &GameContext,
    ) -> Result<Outcome> {
        warn!(family = self.name(), tag = node.tag(), "no fallback for unmapped effect");
        Ok(Outcome::Unhandled)
    }

    /// A kind routed here that this family does not own.
    fn misrouted(&self, kind: &EffectKind) -> Result<Outcome> {
        warn!(family = self.name(), tag = kind.tag(), "effect routed to the wrong family");
        Ok(Outcome::Unhandled)
    }
}
