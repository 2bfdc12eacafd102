use serde::{Deserialize, Serialize};

/// How a voter appears on the voter wall.
///
/// Tagged so presence and rendering code can match exhaustively instead of
/// probing fields at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Avatar {
    /// A single emoji grapheme picked from the selector.
    Emoji(String),
    /// Storage reference to a captured selfie image.
    Selfie(String),
}

impl Avatar {
    /// An avatar with no usable value is rejected at submission time.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Emoji(value) | Self::Selfie(value) => value.trim().is_empty(),
        }
    }
}
