//! Field delimiter of a tabular contract file

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported field separators
///
/// The declaration order is the detection order: when two candidates score
/// equally, the one listed first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
    Semicolon,
    Pipe,
    Colon,
}

impl Delimiter {
    /// All candidates in detection order
    pub const ALL: [Self; 5] = [
        Self::Comma,
        Self::Tab,
        Self::Semicolon,
        Self::Pipe,
        Self::Colon,
    ];

    /// Separator character
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
            Self::Semicolon => ';',
            Self::Pipe => '|',
            Self::Colon => ':',
        }
    }

    /// Separator as a single byte, as expected by byte-oriented readers
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comma => write!(f, "comma"),
            Self::Tab => write!(f, "tab"),
            Self::Semicolon => write!(f, "semicolon"),
            Self::Pipe => write!(f, "pipe"),
            Self::Colon => write!(f, "colon"),
        }
    }
}
