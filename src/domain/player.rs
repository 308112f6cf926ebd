//! Participants named in log lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel the server writes when a mob has no player attached
pub const NO_KEY: &str = "*no key*";

/// Marker appended to a ckey while the player is disconnected
pub(crate) const RECONNECT_MARKER: &str = "[DC]";

/// A participant: optional account key plus the mob's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Account identity key, `None` for the no-key sentinel
    pub ckey: Option<String>,

    /// Display name of the mob
    pub name: String,
}

impl Player {
    pub fn new(ckey: Option<&str>, name: impl Into<String>) -> Self {
        let ckey = ckey.filter(|k| *k != NO_KEY).map(str::to_string);
        Self {
            ckey,
            name: name.into(),
        }
    }

    /// Parse `ckey/(name)`; the parentheses are optional.
    ///
    /// Returns `None` when the token has no `/` separator.
    pub fn parse(token: &str) -> Option<Self> {
        let (ckey, name) = token.trim().split_once('/')?;
        let name = name.trim_matches(|c: char| c == '(' || c == ')');
        Some(Self::new(Some(ckey), name))
    }

    /// The ckey with the reconnect marker removed
    pub fn normalized_ckey(&self) -> Option<String> {
        self.ckey.as_deref().map(normalize_ckey)
    }

    /// Case-insensitive key comparison ignoring the reconnect marker
    pub fn has_ckey(&self, ckey: &str) -> bool {
        self.normalized_ckey()
            .is_some_and(|own| own.eq_ignore_ascii_case(&normalize_ckey(ckey)))
    }
}

/// Strip the reconnect marker from a ckey
pub fn normalize_ckey(ckey: &str) -> String {
    ckey.replace(RECONNECT_MARKER, "")
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/({})",
            self.ckey.as_deref().unwrap_or(NO_KEY),
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_parentheses() {
        let player = Player::parse("ckey/(John Smith").unwrap();
        assert_eq!(player.ckey.as_deref(), Some("ckey"));
        assert_eq!(player.name, "John Smith");
    }

    #[test]
    fn test_parse_no_key_sentinel() {
        let player = Player::parse("*no key*/(Ian)").unwrap();
        assert!(player.ckey.is_none());
        assert_eq!(player.name, "Ian");
        assert_eq!(player.to_string(), "*no key*/(Ian)");
    }

    #[test]
    fn test_parse_without_separator() {
        assert!(Player::parse("Just A Name").is_none());
    }

    #[test]
    fn test_reconnect_marker_is_ignored() {
        let player = Player::new(Some("SomeKey[DC]"), "Bob");
        assert_eq!(player.normalized_ckey().as_deref(), Some("SomeKey"));
        assert!(player.has_ckey("somekey"));
        assert!(!player.has_ckey("other"));
    }
}
