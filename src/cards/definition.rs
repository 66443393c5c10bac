//! Card definitions - static printed card data.
//!
//! `CardDefinition` holds what is printed on a card: name, cost, stats,
//! subtypes, keywords and the parsed abilities. Instance-specific data
//! (damage, exerted state, zone) lives in `CardInstance`.

use serde::{Deserialize, Serialize};

use super::keywords::{Keyword, KeywordKind};
use crate::effects::EffectNode;

/// Identifier for a card definition (the printed card, not a copy of it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The four card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Character,
    Action,
    Item,
    Location,
}

/// Numeric card attributes that effects read or modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Willpower,
    Lore,
    Cost,
    Damage,
    MoveCost,
}

/// Static card definition.
///
/// ```
/// use ink_engine::cards::{CardDefinition, CardId, CardType, Keyword};
///
/// let ariel = CardDefinition::new(CardId::new(1), "Ariel", CardType::Character)
///     .with_version("Spectacular Singer")
///     .with_cost(3)
///     .with_stats(2, 3, 1)
///     .with_subtype("Princess")
///     .with_keyword(Keyword::Singer(5));
///
/// assert_eq!(ariel.singing_value(), 5);
/// assert!(ariel.has_subtype("princess"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub card_type: CardType,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub inkable: bool,
    #[serde(default)]
    pub strength: i64,
    #[serde(default)]
    pub willpower: i64,
    #[serde(default)]
    pub lore: i64,
    /// Ink a character pays to move here (locations only).
    #[serde(default)]
    pub move_cost: i64,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    /// Parsed abilities; each is one top-level wrapper node.
    #[serde(default)]
    pub abilities: Vec<EffectNode>,
}

impl CardDefinition {
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            version: None,
            card_type,
            cost: 0,
            inkable: false,
            strength: 0,
            willpower: 0,
            lore: 0,
            move_cost: 0,
            subtypes: Vec::new(),
            keywords: Vec::new(),
            abilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn inkable(mut self) -> Self {
        self.inkable = true;
        self
    }

    /// Strength, willpower and lore in one call.
    #[must_use]
    pub fn with_stats(mut self, strength: i64, willpower: i64, lore: i64) -> Self {
        self.strength = strength;
        self.willpower = willpower;
        self.lore = lore;
        self
    }

    #[must_use]
    pub fn with_move_cost(mut self, move_cost: i64) -> Self {
        self.move_cost = move_cost;
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: EffectNode) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Subtype membership, case-insensitive.
    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s.eq_ignore_ascii_case(subtype))
    }

    /// Songs are actions carrying the Song subtype.
    #[must_use]
    pub fn is_song(&self) -> bool {
        self.card_type == CardType::Action && self.has_subtype("Song")
    }

    #[must_use]
    pub fn printed_keyword(&self, kind: KeywordKind) -> Option<Keyword> {
        self.keywords.iter().copied().find(|k| k.kind() == kind)
    }

    /// Printed shift cost, if the card can shift.
    #[must_use]
    pub fn shift_cost(&self) -> Option<i64> {
        self.printed_keyword(KeywordKind::Shift).map(Keyword::value)
    }

    /// Value this character contributes when singing: its Singer number, or
    /// its cost otherwise.
    #[must_use]
    pub fn singing_value(&self) -> i64 {
        self.printed_keyword(KeywordKind::Singer)
            .map_or(self.cost, Keyword::value)
    }

    /// Printed value of a stat. `Damage` is never printed.
    #[must_use]
    pub fn base_stat(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Willpower => self.willpower,
            Stat::Lore => self.lore,
            Stat::Cost => self.cost,
            Stat::MoveCost => self.move_cost,
            Stat::Damage => 0,
        }
    }

    /// "Name - Version" for prompts and logs.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{} - {}", self.name, version),
            None => self.name.clone(),
        }
    }
}
