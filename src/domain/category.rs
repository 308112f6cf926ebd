//! Category enumerations for log lines and log files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of a single log line, taken from the `CATEGORY:` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Unrecognized token; the payload is kept verbatim
    Unknown,
    Access,
    Game,
    Admin,
    Ooc,
    Say,
    Whisper,
    Emote,
    RadioEmote,
    Attack,
    Vote,
    Silicon,
    Pda,
    /// Telecomms broadcast, heard across the map
    Tcomms,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 14] = [
        Category::Unknown,
        Category::Access,
        Category::Game,
        Category::Admin,
        Category::Ooc,
        Category::Say,
        Category::Whisper,
        Category::Emote,
        Category::RadioEmote,
        Category::Attack,
        Category::Vote,
        Category::Silicon,
        Category::Pda,
        Category::Tcomms,
    ];

    /// Match a category token case-insensitively. Never fails.
    pub fn from_token(token: &str) -> Self {
        let upper = token.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.token() == upper)
            .unwrap_or(Category::Unknown)
    }

    /// The token as it appears in log files
    pub fn token(&self) -> &'static str {
        match self {
            Category::Unknown => "UNKNOWN",
            Category::Access => "ACCESS",
            Category::Game => "GAME",
            Category::Admin => "ADMIN",
            Category::Ooc => "OOC",
            Category::Say => "SAY",
            Category::Whisper => "WHISPER",
            Category::Emote => "EMOTE",
            Category::RadioEmote => "RADIOEMOTE",
            Category::Attack => "ATTACK",
            Category::Vote => "VOTE",
            Category::Silicon => "SILICON",
            Category::Pda => "PDA",
            Category::Tcomms => "TCOMMS",
        }
    }

    /// Speech categories carry a quoted utterance and a dead flag
    pub fn is_speech(&self) -> bool {
        matches!(self, Category::Say | Category::Whisper | Category::Ooc)
    }

    /// Broadcast categories are perceivable regardless of distance
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Category::Tcomms)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}

/// Sub-category of a `SILICON:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiliconKind {
    Misc,
    Cyborg,
    Law,
}

/// Kind of log file a batch was read from.
///
/// Informational only: the per-line category still drives parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Unknown,
    /// Result of merging several batches
    Collated,
    Game,
    Attack,
    Pda,
    Silicon,
    Mecha,
    Virus,
    Telecomms,
    Uplink,
    Shuttle,
    Tgui,
}

impl SourceKind {
    /// Derive the kind from a file name such as `attack.txt`
    pub fn from_file_name(name: &str) -> Self {
        let stem = name.split('.').next().unwrap_or_default();
        match stem.to_ascii_lowercase().as_str() {
            "game" => SourceKind::Game,
            "attack" => SourceKind::Attack,
            "pda" => SourceKind::Pda,
            "silicon" => SourceKind::Silicon,
            "mecha" => SourceKind::Mecha,
            "virus" => SourceKind::Virus,
            "telecomms" => SourceKind::Telecomms,
            "uplink" => SourceKind::Uplink,
            "shuttle" => SourceKind::Shuttle,
            "tgui" => SourceKind::Tgui,
            _ => SourceKind::Unknown,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_is_case_insensitive() {
        assert_eq!(Category::from_token("say"), Category::Say);
        assert_eq!(Category::from_token("RadioEmote"), Category::RadioEmote);
        assert_eq!(Category::from_token("PDA"), Category::Pda);
    }

    #[test]
    fn test_unrecognized_token_is_unknown() {
        assert_eq!(Category::from_token("MECHA"), Category::Unknown);
        assert_eq!(Category::from_token(""), Category::Unknown);
    }

    #[test]
    fn test_source_kind_from_file_name() {
        assert_eq!(SourceKind::from_file_name("attack.txt"), SourceKind::Attack);
        assert_eq!(SourceKind::from_file_name("GAME.log.txt"), SourceKind::Game);
        assert_eq!(SourceKind::from_file_name("notes"), SourceKind::Unknown);
    }
}
