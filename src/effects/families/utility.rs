//! Effects with no game-state change.

use tracing::info;

use crate::error::Result;
use crate::effects::ast::{EffectKind, EffectNode};
use crate::effects::context::GameContext;
use crate::effects::interpreter::{Interpreter, Outcome};
use crate::effects::targeting::TargetSpec;

use super::FamilyHandler;

pub struct UtilityFamily;

impl FamilyHandler for UtilityFamily {
    fn name(&self) -> &'static str {
        "utility"
    }

    fn execute(&self, interp: &mut Interpreter<'_>, node: &EffectNode, ctx: &GameContext) -> Result<Outcome> {
        match &node.kind {
            EffectKind::LogMessage { message } => {
                info!(player = %ctx.player, source = ?ctx.source, "{message}");
                Ok(Outcome::Executed)
            }
            EffectKind::NoOp => Ok(Outcome::Executed),
            EffectKind::RevealCard { target } => {
                let revealed = interp.resolve_or(target.as_ref(), TargetSpec::Self_, ctx);
                if revealed.is_empty() {
                    return Ok(Outcome::NotApplicable);
                }
                info!(player = %ctx.player, cards = %interp.names(&revealed), "revealed");
                Ok(Outcome::Executed)
            }
            other => self.misrouted(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use crate::effects::{GameContext, Outcome};

    #[test]
    fn test_no_state_change() {
        let mut table = Table::new();
        let before = table.state.snapshot();
        let ctx = GameContext::new(P0);

        assert_eq!(table.run(r#"{"type": "log_message", "message": "hello"}"#, &ctx), Outcome::Executed);
        assert_eq!(table.run(r#"{"type": "no_op"}"#, &ctx), Outcome::Executed);
        assert_eq!(table.run(r#"{"type": "reveal_card"}"#, &ctx), Outcome::Executed);
        assert_eq!(table.state.snapshot(), before);
    }
}
