use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The remote feeds a content source can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    New,
    Random,
    Developer,
    Search,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::New => "new",
            FeedKind::Random => "random",
            FeedKind::Developer => "developer",
            FeedKind::Search => "search",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(FeedKind::New),
            "random" => Ok(FeedKind::Random),
            "developer" => Ok(FeedKind::Developer),
            "search" => Ok(FeedKind::Search),
            other => Err(format!("Unknown feed kind: {}", other)),
        }
    }
}
