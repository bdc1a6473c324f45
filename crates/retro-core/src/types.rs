use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SentimentColor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentColor {
    Green,
    Yellow,
    Red,
}

impl SentimentColor {
    pub fn all() -> &'static [SentimentColor] {
        &[
            SentimentColor::Green,
            SentimentColor::Yellow,
            SentimentColor::Red,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentColor::Green => "green",
            SentimentColor::Yellow => "yellow",
            SentimentColor::Red => "red",
        }
    }

    /// Human-readable label shown next to the color on the board.
    pub fn label(self) -> &'static str {
        match self {
            SentimentColor::Green => "Keep Doing",
            SentimentColor::Yellow => "Pay Attention",
            SentimentColor::Red => "Change This",
        }
    }

    /// A red note demands a concrete follow-up; the other colors don't.
    pub fn requires_action_items(self) -> bool {
        matches!(self, SentimentColor::Red)
    }
}

impl fmt::Display for SentimentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentColor {
    type Err = crate::error::RetroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(SentimentColor::Green),
            "yellow" => Ok(SentimentColor::Yellow),
            "red" => Ok(SentimentColor::Red),
            _ => Err(crate::error::RetroError::InvalidColor(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_roundtrip() {
        use std::str::FromStr;
        for color in SentimentColor::all() {
            let parsed = SentimentColor::from_str(color.as_str()).unwrap();
            assert_eq!(*color, parsed);
        }
    }

    #[test]
    fn color_rejects_unknown() {
        use std::str::FromStr;
        assert!(SentimentColor::from_str("purple").is_err());
        assert!(SentimentColor::from_str("").is_err());
    }

    #[test]
    fn only_red_requires_action_items() {
        assert!(SentimentColor::Red.requires_action_items());
        assert!(!SentimentColor::Green.requires_action_items());
        assert!(!SentimentColor::Yellow.requires_action_items());
    }

    #[test]
    fn labels() {
        assert_eq!(SentimentColor::Green.label(), "Keep Doing");
        assert_eq!(SentimentColor::Yellow.label(), "Pay Attention");
        assert_eq!(SentimentColor::Red.label(), "Change This");
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&SentimentColor::Yellow).unwrap();
        assert_eq!(json, "\"yellow\"");
        let back: SentimentColor = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(back, SentimentColor::Red);
    }
}
