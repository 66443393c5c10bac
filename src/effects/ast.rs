//! The effect tree.
//!
//! An ability is one [`EffectNode`] wrapper (`triggered`, `activated`,
//! `static`, `resolution`) around nested nodes. Every node carries an
//! `optional` flag on top of its [`EffectKind`]; in JSON the two share one
//! object:
//!
//! ```
//! use ink_engine::effects::{EffectKind, EffectNode};
//!
//! let node: EffectNode = serde_json::from_str(
//!     r#"{"type": "damage", "amount": 2, "target": {"type": "chosen_character"}, "optional": true}"#,
//! ).unwrap();
//! assert!(node.optional);
//! assert!(matches!(node.kind, EffectKind::Damage { .. }));
//! ```
//!
//! Tree nodes are immutable once built. Tags no variant accepts, whether
//! written as `{"type": "unmapped", "tag": ...}` or left as the raw tag,
//! arrive as [`EffectKind::Unmapped`] and go through the dispatcher's
//! fallback heuristic.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::cards::Keyword;
use crate::triggers::TriggerEvent;

use super::condition::{ConditionContext, ConditionNode};
use super::continuous::Duration;
use super::expression::{CountQuery, Expression};
use super::families::Family;
use super::filter::{Filter, Side};
use super::targeting::TargetSpec;

/// A number that is either printed on the card or computed at resolution.
///
/// Untagged: `2` or `{"type": "count", "query": "cards_in_hand"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Fixed(i64),
    Computed(Expression),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Fixed(1)
    }
}

impl From<i64> for Amount {
    fn from(n: i64) -> Self {
        Amount::Fixed(n)
    }
}

impl Amount {
    #[must_use]
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> i64 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::Computed(expr) => expr.evaluate(ctx),
        }
    }
}

/// Target and lifetime of a restriction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictionSpec {
    pub target: Option<TargetSpec>,
    pub duration: Option<Duration>,
}

impl RestrictionSpec {
    #[must_use]
    pub fn on(target: TargetSpec) -> Self {
        Self {
            target: Some(target),
            duration: None,
        }
    }

    #[must_use]
    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Where the cards not taken by `look_and_choose` go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestDestination {
    #[default]
    Bottom,
    Top,
    Discard,
}

/// Where a card found by `search_deck` goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDestination {
    #[default]
    Hand,
    Play,
    Top,
}

fn default_variable() -> String {
    "it".to_string()
}

fn one() -> usize {
    1
}

/// One node of an effect tree.
///
/// A node whose `type` no variant accepts still parses, as
/// [`EffectKind::Unmapped`], so one unknown leaf never costs its siblings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct EffectNode {
    #[serde(flatten)]
    pub kind: EffectKind,
    /// "May": the acting player can decline before anything changes.
    #[serde(default)]
    pub optional: bool,
}

impl EffectNode {
    #[must_use]
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Snake-case tag of the node's kind.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.kind.tag()
    }

    /// Label offered when this node is an option of a `modal_choice`.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.kind {
            EffectKind::LogMessage { message } => message.clone(),
            EffectKind::Sequence { effects } | EffectKind::Cascade { effects } => effects
                .iter()
                .map(EffectNode::describe)
                .collect::<Vec<_>>()
                .join(", then "),
            kind => kind.tag().replace('_', " "),
        }
    }
}

impl Serialize for EffectNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EffectNode::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for EffectNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match EffectNode::deserialize(&value) {
            Ok(node) => Ok(node),
            Err(err) => {
                let Some(tag) = value.get("type").and_then(Value::as_str) else {
                    return Err(de::Error::custom(err));
                };
                warn!(tag, error = %err, "effect not recognized, kept as unmapped");
                Ok(EffectNode {
                    kind: EffectKind::Unmapped {
                        tag: tag.to_string(),
                        amount: value.get("amount").and_then(|v| Amount::deserialize(v).ok()),
                        target: value.get("target").and_then(|v| TargetSpec::deserialize(v).ok()),
                    },
                    optional: value.get("optional").and_then(Value::as_bool).unwrap_or(false),
                })
            }
        }
    }
}

impl From<EffectKind> for EffectNode {
    fn from(kind: EffectKind) -> Self {
        EffectNode::new(kind)
    }
}

/// Every effect the interpreter knows, grouped by how the dispatcher routes
/// it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    // === Wrappers ===
    Triggered {
        on: TriggerEvent,
        effects: Vec<EffectNode>,
    },
    Activated {
        #[serde(default)]
        exert: bool,
        #[serde(default)]
        ink: i64,
        effects: Vec<EffectNode>,
    },
    Static {
        effects: Vec<EffectNode>,
    },
    Resolution {
        effects: Vec<EffectNode>,
    },

    // === Composites ===
    Sequence {
        effects: Vec<EffectNode>,
    },
    /// Same as `sequence`; older trees use it.
    Cascade {
        effects: Vec<EffectNode>,
    },
    Conditional {
        condition: ConditionNode,
        effect: Box<EffectNode>,
        #[serde(default, rename = "else")]
        otherwise: Option<Box<EffectNode>>,
    },
    ConditionalAction {
        condition: ConditionNode,
        base_action: Box<EffectNode>,
        replacement_action: Box<EffectNode>,
    },
    /// Pre-decided option (`GameContext::modal_choice`, default 0).
    Modal {
        options: Vec<Vec<EffectNode>>,
    },
    /// Option picked by the acting player.
    ModalChoice {
        options: Vec<EffectNode>,
        #[serde(default)]
        labels: Vec<String>,
    },
    ForEach {
        target: TargetSpec,
        #[serde(default = "default_variable")]
        variable: String,
        effect: Box<EffectNode>,
    },
    /// Evaluate once, bind as a number for the body.
    Bind {
        name: String,
        value: Expression,
        effect: Box<EffectNode>,
    },

    // === Inline leaves ===
    Damage {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    Heal {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    Draw {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    GainLore {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    LoseLore {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    Discard {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        random: bool,
    },

    // === Damage family ===
    /// Damage counters placed directly: no Resist, no shields.
    PutDamage {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    MoveDamage {
        #[serde(default)]
        amount: Amount,
        from: TargetSpec,
        to: TargetSpec,
    },
    /// Damage to the event's source; `amount` defaults to the event amount.
    ReflectDamage {
        #[serde(default)]
        amount: Option<Amount>,
    },
    /// `per` damage for each exerted character on `side`.
    DamagePerExerted {
        #[serde(default)]
        per: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        side: Side,
    },
    DamageFromTrigger {
        #[serde(default)]
        target: Option<TargetSpec>,
    },

    // === Zone family ===
    Banish {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    ReturnToHand {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    ReturnFromDiscard {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    PutIntoInkwell {
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        exerted: bool,
    },
    ShuffleIntoDeck {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    PutOnBottom {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    Exile {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    BounceAll {
        target: TargetSpec,
    },

    // === Prevention family ===
    CantQuest(RestrictionSpec),
    CantChallenge(RestrictionSpec),
    CantBeChallenged(RestrictionSpec),
    MustChallenge(RestrictionSpec),
    ForceQuest(RestrictionSpec),
    CantReady(RestrictionSpec),
    /// Player-scoped; defaults to the opponents.
    CantPlayActions(RestrictionSpec),
    CantUseAbilities(RestrictionSpec),
    /// Player-scoped; defaults to the acting player.
    PreventDiscard(RestrictionSpec),
    GrantHexproof(RestrictionSpec),
    GrantUnexertable(RestrictionSpec),
    DamageShield {
        #[serde(default)]
        amount: Option<i64>,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },

    // === Choice family ===
    OpponentChoosesDiscard {
        #[serde(default)]
        amount: Amount,
    },
    ChooseAndDiscard {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        then: Option<Box<EffectNode>>,
    },
    LookAndChoose {
        #[serde(default)]
        amount: Amount,
        #[serde(default = "one")]
        choose: usize,
        #[serde(default)]
        filter: Option<Filter>,
        #[serde(default)]
        rest: RestDestination,
    },
    /// Deal `amount` damage one point at a time, choosing each recipient.
    DistributeDamage {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    OpponentChoosesBanish {
        #[serde(default)]
        filter: Option<Filter>,
    },
    NameAndReveal {
        #[serde(default)]
        then: Option<Box<EffectNode>>,
    },

    // === Ready/exert family ===
    Exert {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    Ready {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    ReadyCantQuest {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    ReadyInk {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    ExertInk {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },

    // === Deck family ===
    LookAtTop {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    /// Look at the top cards, put any number on the bottom.
    Scry {
        #[serde(default)]
        amount: Amount,
    },
    Mill {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    SearchDeck {
        #[serde(default)]
        filter: Option<Filter>,
        #[serde(default)]
        destination: SearchDestination,
    },
    ShuffleDeck {
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    /// Reveal the top card: into hand if it matches, else to the bottom.
    RevealTop {
        #[serde(default)]
        filter: Option<Filter>,
    },
    /// Draw until the hand holds `amount` cards.
    DrawUntil {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },

    // === Opponent family ===
    OpponentLosesLore {
        #[serde(default)]
        amount: Amount,
    },
    OpponentDiscardsRandom {
        #[serde(default)]
        amount: Amount,
    },
    OpponentRevealsHand,
    StealLore {
        #[serde(default)]
        amount: Amount,
    },
    /// Each opponent exerts one of their ready characters.
    EachOpponentExerts {
        #[serde(default)]
        filter: Option<Filter>,
    },

    // === Location family ===
    MoveToLocation {
        #[serde(default)]
        character: Option<TargetSpec>,
        #[serde(default)]
        location: Option<TargetSpec>,
        #[serde(default)]
        free: bool,
    },
    ReduceMoveCost {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    GainLorePerLocation {
        #[serde(default)]
        per: Amount,
    },

    // === Challenge family ===
    GrantChallenger {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    GrantResist {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    CanChallengeReady {
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    BanishChallenger,

    // === Draw/lore family ===
    DrawThenDiscard {
        #[serde(default)]
        draw: Amount,
        #[serde(default)]
        discard: Amount,
    },
    /// Discard the hand, then draw `amount` (or as many as were discarded).
    DiscardHandThenDraw {
        #[serde(default)]
        amount: Option<Amount>,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    EachPlayerDraws {
        #[serde(default)]
        amount: Amount,
    },
    SetLore {
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
    },

    // === Static-effect family ===
    GrantKeyword {
        keyword: Keyword,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    CostReduction {
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        filter: Option<Filter>,
        #[serde(default)]
        duration: Option<Duration>,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    GrantAbility {
        ability: Box<EffectNode>,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    /// Without a target: this card enters play exerted (read by the play
    /// machine). With one: the targeted players' permanents do.
    EntersExerted {
        #[serde(default)]
        target: Option<TargetSpec>,
    },

    // === Utility family ===
    LogMessage {
        message: String,
    },
    NoOp,
    RevealCard {
        #[serde(default)]
        target: Option<TargetSpec>,
    },

    // === Specialized family ===
    /// Look at the top `amount`, one into hand, the rest on the bottom.
    LookTopOneToHand {
        #[serde(default)]
        amount: Amount,
    },
    PayInkThen {
        amount: i64,
        effect: Box<EffectNode>,
    },
    Boost {
        #[serde(default)]
        amount: Option<i64>,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
    OnChallengeHook {
        effect: Box<EffectNode>,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    OnQuestHook {
        effect: Box<EffectNode>,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    OnBanishHook {
        effect: Box<EffectNode>,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },

    // === Stat family ===
    ModifyStrength {
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    ModifyWillpower {
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    ModifyLore {
        amount: Amount,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    ModifyStats {
        #[serde(default)]
        strength: i64,
        #[serde(default)]
        willpower: i64,
        #[serde(default)]
        lore: i64,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },
    /// +`per` strength for each unit of `query`.
    StrengthPerCount {
        query: CountQuery,
        #[serde(default = "default_per")]
        per: i64,
        #[serde(default)]
        target: Option<TargetSpec>,
        #[serde(default)]
        duration: Option<Duration>,
    },

    // === Fallback ===
    /// A tag with no variant of its own.
    Unmapped {
        tag: String,
        #[serde(default)]
        amount: Option<Amount>,
        #[serde(default)]
        target: Option<TargetSpec>,
    },
}

fn default_per() -> i64 {
    1
}

/// How the dispatcher handles a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Wrapper,
    Composite,
    Inline,
    Family(Family),
    Unmapped,
}

impl EffectKind {
    /// Static routing table.
    #[must_use]
    pub fn route(&self) -> Route {
        use EffectKind as K;

        match self {
            K::Triggered { .. } | K::Activated { .. } | K::Static { .. } | K::Resolution { .. } => {
                Route::Wrapper
            }

            K::Sequence { .. }
            | K::Cascade { .. }
            | K::Conditional { .. }
            | K::ConditionalAction { .. }
            | K::Modal { .. }
            | K::ModalChoice { .. }
            | K::ForEach { .. }
            | K::Bind { .. } => Route::Composite,

            K::Damage { .. }
            | K::Heal { .. }
            | K::Draw { .. }
            | K::GainLore { .. }
            | K::LoseLore { .. }
            | K::Discard { .. } => Route::Inline,

            K::PutDamage { .. }
            | K::MoveDamage { .. }
            | K::ReflectDamage { .. }
            | K::DamagePerExerted { .. }
            | K::DamageFromTrigger { .. } => Route::Family(Family::Damage),

            K::Banish { .. }
            | K::ReturnToHand { .. }
            | K::ReturnFromDiscard { .. }
            | K::PutIntoInkwell { .. }
            | K::ShuffleIntoDeck { .. }
            | K::PutOnBottom { .. }
            | K::Exile { .. }
            | K::BounceAll { .. } => Route::Family(Family::Zone),

            K::CantQuest(_)
            | K::CantChallenge(_)
            | K::CantBeChallenged(_)
            | K::MustChallenge(_)
            | K::ForceQuest(_)
            | K::CantReady(_)
            | K::CantPlayActions(_)
            | K::CantUseAbilities(_)
            | K::PreventDiscard(_)
            | K::GrantHexproof(_)
            | K::GrantUnexertable(_)
            | K::DamageShield { .. } => Route::Family(Family::Prevention),

            K::OpponentChoosesDiscard { .. }
            | K::ChooseAndDiscard { .. }
            | K::LookAndChoose { .. }
            | K::DistributeDamage { .. }
            | K::OpponentChoosesBanish { .. }
            | K::NameAndReveal { .. } => Route::Family(Family::Choice),

            K::Exert { .. }
            | K::Ready { .. }
            | K::ReadyCantQuest { .. }
            | K::ReadyInk { .. }
            | K::ExertInk { .. } => Route::Family(Family::Ready),

            K::LookAtTop { .. }
            | K::Scry { .. }
            | K::Mill { .. }
            | K::SearchDeck { .. }
            | K::ShuffleDeck { .. }
            | K::RevealTop { .. }
            | K::DrawUntil { .. } => Route::Family(Family::Deck),

            K::OpponentLosesLore { .. }
            | K::OpponentDiscardsRandom { .. }
            | K::OpponentRevealsHand
            | K::StealLore { .. }
            | K::EachOpponentExerts { .. } => Route::Family(Family::Opponent),

            K::MoveToLocation { .. } | K::ReduceMoveCost { .. } | K::GainLorePerLocation { .. } => {
                Route::Family(Family::Location)
            }

            K::GrantChallenger { .. }
            | K::GrantResist { .. }
            | K::CanChallengeReady { .. }
            | K::BanishChallenger => Route::Family(Family::Challenge),

            K::DrawThenDiscard { .. }
            | K::DiscardHandThenDraw { .. }
            | K::EachPlayerDraws { .. }
            | K::SetLore { .. } => Route::Family(Family::DrawLore),

            K::GrantKeyword { .. }
            | K::CostReduction { .. }
            | K::GrantAbility { .. }
            | K::EntersExerted { .. } => Route::Family(Family::StaticEffect),

            K::LogMessage { .. } | K::NoOp | K::RevealCard { .. } => Route::Family(Family::Utility),

            K::LookTopOneToHand { .. }
            | K::PayInkThen { .. }
            | K::Boost { .. }
            | K::OnChallengeHook { .. }
            | K::OnQuestHook { .. }
            | K::OnBanishHook { .. } => Route::Family(Family::Specialized),

            K::ModifyStrength { .. }
            | K::ModifyWillpower { .. }
            | K::ModifyLore { .. }
            | K::ModifyStats { .. }
            | K::StrengthPerCount { .. } => Route::Family(Family::Stat),

            K::Unmapped { .. } => Route::Unmapped,
        }
    }

    /// Kinds that ask their own "may" question once they know what they
    /// would do, so the dispatcher does not prompt for them up front.
    #[must_use]
    pub fn has_own_may_prompt(&self) -> bool {
        matches!(
            self,
            EffectKind::Draw { .. }
                | EffectKind::Damage { .. }
                | EffectKind::Banish { .. }
                | EffectKind::Exert { .. }
                | EffectKind::Ready { .. }
                | EffectKind::LookAndChoose { .. }
                | EffectKind::LookAtTop { .. }
                | EffectKind::LookTopOneToHand { .. }
                | EffectKind::SearchDeck { .. }
                | EffectKind::PayInkThen { .. }
        )
    }

    /// Snake-case tag, as in the serialized form.
    #[must_use]
    pub fn tag(&self) -> &str {
        use EffectKind as K;

        match self {
            K::Triggered { .. } => "triggered",
            K::Activated { .. } => "activated",
            K::Static { .. } => "static",
            K::Resolution { .. } => "resolution",
            K::Sequence { .. } => "sequence",
            K::Cascade { .. } => "cascade",
            K::Conditional { .. } => "conditional",
            K::ConditionalAction { .. } => "conditional_action",
            K::Modal { .. } => "modal",
            K::ModalChoice { .. } => "modal_choice",
            K::ForEach { .. } => "for_each",
            K::Bind { .. } => "bind",
            K::Damage { .. } => "damage",
            K::Heal { .. } => "heal",
            K::Draw { .. } => "draw",
            K::GainLore { .. } => "gain_lore",
            K::LoseLore { .. } => "lose_lore",
            K::Discard { .. } => "discard",
            K::PutDamage { .. } => "put_damage",
            K::MoveDamage { .. } => "move_damage",
            K::ReflectDamage { .. } => "reflect_damage",
            K::DamagePerExerted { .. } => "damage_per_exerted",
            K::DamageFromTrigger { .. } => "damage_from_trigger",
            K::Banish { .. } => "banish",
            K::ReturnToHand { .. } => "return_to_hand",
            K::ReturnFromDiscard { .. } => "return_from_discard",
            K::PutIntoInkwell { .. } => "put_into_inkwell",
            K::ShuffleIntoDeck { .. } => "shuffle_into_deck",
            K::PutOnBottom { .. } => "put_on_bottom",
            K::Exile { .. } => "exile",
            K::BounceAll { .. } => "bounce_all",
            K::CantQuest(_) => "cant_quest",
            K::CantChallenge(_) => "cant_challenge",
            K::CantBeChallenged(_) => "cant_be_challenged",
            K::MustChallenge(_) => "must_challenge",
            K::ForceQuest(_) => "force_quest",
            K::CantReady(_) => "cant_ready",
            K::CantPlayActions(_) => "cant_play_actions",
            K::CantUseAbilities(_) => "cant_use_abilities",
            K::PreventDiscard(_) => "prevent_discard",
            K::GrantHexproof(_) => "grant_hexproof",
            K::GrantUnexertable(_) => "grant_unexertable",
            K::DamageShield { .. } => "damage_shield",
            K::OpponentChoosesDiscard { .. } => "opponent_chooses_discard",
            K::ChooseAndDiscard { .. } => "choose_and_discard",
            K::LookAndChoose { .. } => "look_and_choose",
            K::DistributeDamage { .. } => "distribute_damage",
            K::OpponentChoosesBanish { .. } => "opponent_chooses_banish",
            K::NameAndReveal { .. } => "name_and_reveal",
            K::Exert { .. } => "exert",
            K::Ready { .. } => "ready",
            K::ReadyCantQuest { .. } => "ready_cant_quest",
            K::ReadyInk { .. } => "ready_ink",
            K::ExertInk { .. } => "exert_ink",
            K::LookAtTop { .. } => "look_at_top",
            K::Scry { .. } => "scry",
            K::Mill { .. } => "mill",
            K::SearchDeck { .. } => "search_deck",
            K::ShuffleDeck { .. } => "shuffle_deck",
            K::RevealTop { .. } => "reveal_top",
            K::DrawUntil { .. } => "draw_until",
            K::OpponentLosesLore { .. } => "opponent_loses_lore",
            K::OpponentDiscardsRandom { .. } => "opponent_discards_random",
            K::OpponentRevealsHand => "opponent_reveals_hand",
            K::StealLore { .. } => "steal_lore",
            K::EachOpponentExerts { .. } => "each_opponent_exerts",
            K::MoveToLocation { .. } => "move_to_location",
            K::ReduceMoveCost { .. } => "reduce_move_cost",
            K::GainLorePerLocation { .. } => "gain_lore_per_location",
            K::GrantChallenger { .. } => "grant_challenger",
            K::GrantResist { .. } => "grant_resist",
            K::CanChallengeReady { .. } => "can_challenge_ready",
            K::BanishChallenger => "banish_challenger",
            K::DrawThenDiscard { .. } => "draw_then_discard",
            K::DiscardHandThenDraw { .. } => "discard_hand_then_draw",
            K::EachPlayerDraws { .. } => "each_player_draws",
            K::SetLore { .. } => "set_lore",
            K::GrantKeyword { .. } => "grant_keyword",
            K::CostReduction { .. } => "cost_reduction",
            K::GrantAbility { .. } => "grant_ability",
            K::EntersExerted { .. } => "enters_exerted",
            K::LogMessage { .. } => "log_message",
            K::NoOp => "no_op",
            K::RevealCard { .. } => "reveal_card",
            K::LookTopOneToHand { .. } => "look_top_one_to_hand",
            K::PayInkThen { .. } => "pay_ink_then",
            K::Boost { .. } => "boost",
            K::OnChallengeHook { .. } => "on_challenge_hook",
            K::OnQuestHook { .. } => "on_quest_hook",
            K::OnBanishHook { .. } => "on_banish_hook",
            K::ModifyStrength { .. } => "modify_strength",
            K::ModifyWillpower { .. } => "modify_willpower",
            K::ModifyLore { .. } => "modify_lore",
            K::ModifyStats { .. } => "modify_stats",
            K::StrengthPerCount { .. } => "strength_per_count",
            K::Unmapped { tag, .. } => tag,
        }
    }

    /// Effects nested directly under a wrapper, sequence or cascade.
    #[must_use]
    pub fn children(&self) -> &[EffectNode] {
        match self {
            EffectKind::Triggered { effects, .. }
            | EffectKind::Activated { effects, .. }
            | EffectKind::Static { effects }
            | EffectKind::Resolution { effects }
            | EffectKind::Sequence { effects }
            | EffectKind::Cascade { effects } => effects,
            _ => &[],
        }
    }
}
