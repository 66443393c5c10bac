//! Printed keywords.
//!
//! Numeric keywords (`Challenger +2`, `Resist +1`, `Shift 5`, `Singer 4`,
//! `Boost 2`) carry their value. Filters and restrictions match on
//! [`KeywordKind`], which ignores the value.

use serde::{Deserialize, Serialize};

/// A keyword with its value, as printed or granted.
///
/// Serialized externally tagged: `"ward"` or `{"resist": 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Bodyguard,
    Challenger(i64),
    Evasive,
    Reckless,
    Resist(i64),
    Rush,
    Shift(i64),
    Singer(i64),
    Support,
    Ward,
    Boost(i64),
}

/// Keyword identity without its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Bodyguard,
    Challenger,
    Evasive,
    Reckless,
    Resist,
    Rush,
    Shift,
    Singer,
    Support,
    Ward,
    Boost,
}

impl Keyword {
    #[must_use]
    pub const fn kind(self) -> KeywordKind {
        match self {
            Keyword::Bodyguard => KeywordKind::Bodyguard,
            Keyword::Challenger(_) => KeywordKind::Challenger,
            Keyword::Evasive => KeywordKind::Evasive,
            Keyword::Reckless => KeywordKind::Reckless,
            Keyword::Resist(_) => KeywordKind::Resist,
            Keyword::Rush => KeywordKind::Rush,
            Keyword::Shift(_) => KeywordKind::Shift,
            Keyword::Singer(_) => KeywordKind::Singer,
            Keyword::Support => KeywordKind::Support,
            Keyword::Ward => KeywordKind::Ward,
            Keyword::Boost(_) => KeywordKind::Boost,
        }
    }

    /// The keyword's number, 0 for keywords without one.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Keyword::Challenger(n)
            | Keyword::Resist(n)
            | Keyword::Shift(n)
            | Keyword::Singer(n)
            | Keyword::Boost(n) => n,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::Challenger(n) => write!(f, "Challenger +{n}"),
            Keyword::Resist(n) => write!(f, "Resist +{n}"),
            Keyword::Shift(n) => write!(f, "Shift {n}"),
            Keyword::Singer(n) => write!(f, "Singer {n}"),
            Keyword::Boost(n) => write!(f, "Boost {n}"),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ignores_value() {
        assert_eq!(Keyword::Resist(1).kind(), Keyword::Resist(3).kind());
        assert_ne!(Keyword::Resist(1).kind(), KeywordKind::Challenger);
    }

    #[test]
    fn test_value() {
        assert_eq!(Keyword::Singer(5).value(), 5);
        assert_eq!(Keyword::Ward.value(), 0);
    }

    #[test]
    fn test_serde_shapes() {
        let ward: Keyword = serde_json::from_str(r#""ward""#).unwrap();
        assert_eq!(ward, Keyword::Ward);
        let resist: Keyword = serde_json::from_str(r#"{"resist": 2}"#).unwrap();
        assert_eq!(resist, Keyword::Resist(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Keyword::Challenger(2).to_string(), "Challenger +2");
        assert_eq!(Keyword::Evasive.to_string(), "Evasive");
    }
}
