//! Domain types for parsed logs.
//!
//! This module contains the core data structures:
//! - Category: The tag that selects a line's sub-grammar
//! - Player: An actor or target participant
//! - Entry: One parsed log line

pub mod category;
pub mod entry;
pub mod player;

// Re-export commonly used types
pub use category::{Category, SiliconKind, SourceKind};
pub use entry::{Entry, Location};
pub use player::{normalize_ckey, Player, NO_KEY};
