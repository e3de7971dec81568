use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::errors::ParseError;

/// Versioned payload schemas understood by workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PayloadFormat {
    /// Comma separated lines: a parameter line followed by one line per asset.
    #[default]
    #[serde(rename = "lines/v1")]
    LinesV1,
    #[serde(rename = "json/v1")]
    JsonV1,
}

impl PayloadFormat {
    /// Task option key carrying the format tag next to a payload.
    pub const OPTION_KEY: &'static str = "payload_format";

    pub fn tag(&self) -> &'static str {
        match self {
            PayloadFormat::LinesV1 => "lines/v1",
            PayloadFormat::JsonV1 => "json/v1",
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PayloadFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lines/v1" => Ok(PayloadFormat::LinesV1),
            "json/v1" => Ok(PayloadFormat::JsonV1),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}
