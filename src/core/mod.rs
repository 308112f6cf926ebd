//! Log parsing and filtering core.
//!
//! This module contains:
//! - Parser: The line grammar turning raw lines into entries
//! - Continuation: Pre-pass joining multi-line records
//! - Collection: Time-ordered entry sets with an active view
//! - Filter: Operations narrowing the active view
//! - Audibility: Who could have perceived an entry

pub mod audibility;
pub mod collection;
pub mod continuation;
pub mod filter;
pub mod location;
pub mod parser;

// Re-export commonly used types
pub use audibility::{audible_to, HearingRange, HEARING_RANGE, WALKING_ERROR};
pub use collection::{BatchOptions, CollectionError, LogCollection};
pub use location::extract_location;
pub use parser::{parse_line, parse_timestamp, ParseError};
