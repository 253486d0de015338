use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output profile controlling which steps are narrated and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain-language phrasing; housekeeping and inactive steps are omitted.
    Business,
    /// Full detail including SQL and script previews.
    #[default]
    Technical,
}

impl Mode {
    pub fn is_business(self) -> bool {
        self == Mode::Business
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Mode::Business),
            "technical" | "" => Ok(Mode::Technical),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Business => write!(f, "business"),
            Mode::Technical => write!(f, "technical"),
        }
    }
}
