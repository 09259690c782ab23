//! Milestone events
//!
//! - `catalog` - every known event in gameplay order
//! - `matcher` - the predicate each event kind is checked with
//! - `legacy` - identifiers written by older settings files

pub mod catalog;
pub mod legacy;
mod matcher;

pub use catalog::{catalog, CatalogEvent, EventKind};
pub use legacy::resolve_identifier;
pub use matcher::MatchContext;
