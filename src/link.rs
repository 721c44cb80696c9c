//! Association types - explicit join entities
//!
//! Every many-to-many relationship is a row of two foreign keys:
//! - `Follows`: user → bar (`user_bars`)
//! - `Shows`: bar → sport (`bar_sports`)
//! - `Streams`: bar → streaming service (`bar_streaming`)

use serde::{Deserialize, Serialize};

/// The three association kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A user follows a bar
    Follows,
    /// A bar shows a sport
    Shows,
    /// A bar carries a streaming service
    Streams,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Follows => "follows",
            LinkKind::Shows => "shows",
            LinkKind::Streams => "streams",
        }
    }

    /// Backing association table
    pub fn table(&self) -> &'static str {
        match self {
            LinkKind::Follows => "user_bars",
            LinkKind::Shows => "bar_sports",
            LinkKind::Streams => "bar_streaming",
        }
    }

    /// Key columns, owning side first
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            LinkKind::Follows => ("user_id", "bar_id"),
            LinkKind::Shows => ("bar_id", "sport_id"),
            LinkKind::Streams => ("bar_id", "streaming_service_id"),
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row in one of the association tables.
pub trait Link {
    const KIND: LinkKind;

    /// Key values in the order of [`LinkKind::columns`]
    fn keys(&self) -> (i64, i64);
}

/// `user_bars` row: the user follows the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserBar {
    pub user_id: i64,
    pub bar_id: i64,
}

/// `bar_sports` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarSport {
    pub bar_id: i64,
    pub sport_id: i64,
}

/// `bar_streaming` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarStreaming {
    pub bar_id: i64,
    pub streaming_service_id: i64,
}

impl Link for UserBar {
    const KIND: LinkKind = LinkKind::Follows;

    fn keys(&self) -> (i64, i64) {
        (self.user_id, self.bar_id)
    }
}

impl Link for BarSport {
    const KIND: LinkKind = LinkKind::Shows;

    fn keys(&self) -> (i64, i64) {
        (self.bar_id, self.sport_id)
    }
}

impl Link for BarStreaming {
    const KIND: LinkKind = LinkKind::Streams;

    fn keys(&self) -> (i64, i64) {
        (self.bar_id, self.streaming_service_id)
    }
}
