use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
}

impl Rarity {
    /// Parse the value of a `Rarity: ` line; the tool writes it upper-case.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Some(Self::Normal),
            "MAGIC" => Some(Self::Magic),
            "RARE" => Some(Self::Rare),
            "UNIQUE" => Some(Self::Unique),
            _ => None,
        }
    }

    pub fn raw(&self) -> &'static str {
        match *self {
            Self::Normal => "NORMAL",
            Self::Magic => "MAGIC",
            Self::Rare => "RARE",
            Self::Unique => "UNIQUE",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Normal => "Normal",
            Self::Magic => "Magic",
            Self::Rare => "Rare",
            Self::Unique => "Unique",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
