//! Card system: definitions, instances, keywords and the registry.
//!
//! ## Key Types
//!
//! - `CardId`: identifier for a printed card
//! - `CardDefinition`: printed data plus parsed abilities
//! - `CardInstance`: one copy of a card during a game
//! - `Keyword`: printed or granted keywords
//! - `CardRegistry`: definition lookup

pub mod definition;
pub mod instance;
pub mod keywords;
pub mod registry;

pub use definition::{CardDefinition, CardId, CardType, Stat};
pub use instance::CardInstance;
pub use keywords::{Keyword, KeywordKind};
pub use registry::CardRegistry;
