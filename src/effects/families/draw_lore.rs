//! Card draw and lore beyond the inline `draw`/`gain_lore`/`lose_lore`.

use tracing::debug;

use crate::core::ZoneKind;
use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;

use super::FamilyHandler;

pub struct DrawLoreFamily;

impl FamilyHandler for DrawLoreFamily {
    fn name(&self) -> &'static str {
        "draw_lore"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::DrawThenDiscard { draw, discard } => {
                let draw = interp.amount(draw, ctx).max(0) as usize;
                let discard = interp.amount(discard, ctx).max(0) as usize;
                let drawn = interp.draw_cards(ctx.player, draw)?;
                let picked = interp.choose_from_hand(ctx.player, discard, format!("Choose {discard} to discard"));
                let discarded = interp.discard_cards(ctx.player, &picked);
                debug!(player = %ctx.player, drawn, discarded, "draw then discard");
                Ok(if drawn + discarded > 0 { Outcome::Executed } else { Outcome::NotApplicable })
            }

            EffectKind::DiscardHandThenDraw { amount, target } => {
                let fixed = amount.as_ref().map(|a| interp.amount(a, ctx).max(0) as usize);
                let players = interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx);
                for player in players {
                    let hand = interp.state.cards_in(player, ZoneKind::Hand).to_vec();
                    let discarded = interp.discard_cards(player, &hand);
                    interp.draw_cards(player, fixed.unwrap_or(discarded))?;
                }
                Ok(Outcome::Executed)
            }

            EffectKind::EachPlayerDraws { amount } => {
                let amount = interp.amount(amount, ctx).max(0) as usize;
                let players: Vec<_> = interp.state.player_ids().collect();
                for player in players {
                    interp.draw_cards(player, amount)?;
                }
                Ok(Outcome::Executed)
            }

            EffectKind::SetLore { amount, target } => {
                let lore = interp.amount(amount, ctx).max(0);
                for player in interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx) {
                    interp.state.set_lore(player, lore);
                }
                Ok(Outcome::Executed)
            }

            other => self.misrouted(other),
        }
    }

    /// Unknown draw tags draw; unknown lore tags gain lore, or lose it when
    /// the tag says so.
    fn execute_unmapped(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        let EffectKind::Unmapped { tag, amount, target } = &node.kind else {
            return self.misrouted(&node.kind);
        };
        let amount = amount.as_ref().map_or(1, |a| interp.amount(a, ctx));
        let players = interp.resolve_players_or(target.as_ref(), TargetSpec::Self_, ctx);
        let tag = tag.to_ascii_lowercase();
        for player in players {
            if tag.contains("draw") {
                interp.draw_cards(player, amount.max(0) as usize)?;
            } else if tag.contains("lose") {
                interp.state.lose_lore(player, amount);
            } else {
                interp.state.gain_lore(player, amount);
            }
        }
        Ok(Outcome::Executed)
    }
}
