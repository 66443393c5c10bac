//! Card filters.
//!
//! A [`Filter`] is a predicate tree over card instances. Leaves are
//! [`CardFilter`]s whose set fields must all hold; `and`/`or`/`not` compose
//! them. Filters are evaluated from the point of view of the acting player in
//! a [`ConditionContext`], so `owner: self` means "controlled by the player
//! resolving the effect".

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, KeywordKind, Stat};
use crate::core::EntityId;

use super::condition::ConditionContext;
use super::continuous;

/// Which side of the table, relative to the acting player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    #[serde(rename = "self", alias = "friendly", alias = "mine")]
    Self_,
    #[serde(alias = "opposing")]
    Opponent,
    Any,
}

/// Comparison operator, `gte` when omitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    #[serde(alias = ">=")]
    Gte,
    #[serde(alias = "<=")]
    Lte,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "=", alias = "==")]
    Eq,
    #[serde(alias = "!=")]
    Ne,
}

impl Comparison {
    #[must_use]
    pub fn compare(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Gte => lhs >= rhs,
            Comparison::Lte => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }
}

/// Card type as a filter sees it. `Song` is not a printed card type: it
/// matches actions carrying the Song subtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    Character,
    Action,
    Item,
    Location,
    Song,
}

/// `stat op value`, compared against the effective stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatComparison {
    pub stat: Stat,
    #[serde(default, alias = "operator")]
    pub op: Comparison,
    pub value: i64,
}

/// Leaf predicate. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFilter {
    #[serde(alias = "type_filter")]
    pub card_type: Option<TypeFilter>,
    pub owner: Option<Side>,
    /// Excludes the effect's own source card.
    pub exclude_source: bool,
    pub exclude_ids: Vec<EntityId>,
    pub keyword: Option<KeywordKind>,
    /// Matches if the card has any of these subtypes.
    pub subtypes: Vec<String>,
    /// A subtype optionally prefixed by `ready`, `exerted` or `damaged`,
    /// e.g. "exerted Princess".
    pub qualified_subtype: Option<String>,
    pub stat: Option<StatComparison>,
    pub damaged: Option<bool>,
    pub exerted: Option<bool>,
    pub name: Option<String>,
}

impl CardFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, card_type: TypeFilter) -> Self {
        self.card_type = Some(card_type);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: Side) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: KeywordKind) -> Self {
        self.keyword = Some(keyword);
        self
    }

    #[must_use]
    pub fn with_stat(mut self, stat: Stat, op: Comparison, value: i64) -> Self {
        self.stat = Some(StatComparison { stat, op, value });
        self
    }

    #[must_use]
    pub fn excluding_source(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    fn matches(&self, entity: EntityId, ctx: &ConditionContext<'_>) -> bool {
        let Some(instance) = ctx.state.card(entity) else {
            return false;
        };
        let Some(def) = ctx.cards.get(instance.card_id) else {
            return false;
        };

        if let Some(card_type) = self.card_type {
            let type_ok = match card_type {
                TypeFilter::Song => def.is_song(),
                TypeFilter::Character => def.card_type == CardType::Character,
                TypeFilter::Action => def.card_type == CardType::Action,
                TypeFilter::Item => def.card_type == CardType::Item,
                TypeFilter::Location => def.card_type == CardType::Location,
            };
            if !type_ok {
                return false;
            }
        }

        match self.owner {
            Some(Side::Self_) if instance.owner != ctx.game.player => return false,
            Some(Side::Opponent) if instance.owner == ctx.game.player => return false,
            _ => {}
        }

        if self.exclude_source && ctx.game.source == Some(entity) {
            return false;
        }
        if self.exclude_ids.contains(&entity) {
            return false;
        }

        if let Some(keyword) = self.keyword {
            if !continuous::has_keyword(ctx.state, ctx.cards, entity, keyword) {
                return false;
            }
        }

        if !self.subtypes.is_empty() && !self.subtypes.iter().any(|s| def.has_subtype(s)) {
            return false;
        }

        if let Some(qualified) = &self.qualified_subtype {
            let (qualifier, subtype) = match qualified.split_once(' ') {
                Some((q, rest)) if matches!(q, "ready" | "exerted" | "damaged") => (Some(q), rest),
                _ => (None, qualified.as_str()),
            };
            let state_ok = match qualifier {
                Some("ready") => instance.ready,
                Some("exerted") => instance.is_exerted(),
                Some("damaged") => instance.is_damaged(),
                _ => true,
            };
            if !state_ok || !def.has_subtype(subtype) {
                return false;
            }
        }

        if let Some(cmp) = self.stat {
            let value = continuous::effective_stat(ctx.state, ctx.cards, entity, cmp.stat);
            if !cmp.op.compare(value, cmp.value) {
                return false;
            }
        }

        if self.damaged.is_some_and(|d| d != instance.is_damaged()) {
            return false;
        }
        if self.exerted.is_some_and(|e| e != instance.is_exerted()) {
            return false;
        }
        if let Some(name) = &self.name {
            if !def.name.eq_ignore_ascii_case(name) {
                return false;
            }
        }
        true
    }
}

/// Composable card predicate.
///
/// ```
/// use ink_engine::effects::{CardFilter, Filter, TypeFilter};
///
/// let json = r#"{"type": "and", "filters": [
///     {"type": "card", "card_type": "character"},
///     {"type": "not", "filter": {"type": "card", "subtypes": ["Villain"]}}
/// ]}"#;
/// let parsed: Filter = serde_json::from_str(json).unwrap();
///
/// let built = Filter::and(vec![
///     Filter::card(CardFilter::new().with_type(TypeFilter::Character)),
///     Filter::not(Filter::card(CardFilter::new().with_subtype("Villain"))),
/// ]);
/// assert_eq!(parsed, built);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    And { filters: Vec<Filter> },
    Or { filters: Vec<Filter> },
    Not { filter: Box<Filter> },
    Card(CardFilter),
}

impl Filter {
    #[must_use]
    pub fn card(filter: CardFilter) -> Self {
        Filter::Card(filter)
    }

    #[must_use]
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And { filters }
    }

    #[must_use]
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or { filters }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not { filter: Box::new(filter) }
    }

    /// Does the card pass? Unknown cards never do.
    #[must_use]
    pub fn matches(&self, entity: EntityId, ctx: &ConditionContext<'_>) -> bool {
        match self {
            Filter::And { filters } => filters.iter().all(|f| f.matches(entity, ctx)),
            Filter::Or { filters } => filters.iter().any(|f| f.matches(entity, ctx)),
            Filter::Not { filter } => !filter.matches(entity, ctx),
            Filter::Card(leaf) => leaf.matches(entity, ctx),
        }
    }
}

/// `None` matches everything.
#[must_use]
pub fn passes(filter: Option<&Filter>, entity: EntityId, ctx: &ConditionContext<'_>) -> bool {
    filter.map_or(true, |f| f.matches(entity, ctx))
}
