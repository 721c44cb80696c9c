//! # Barfinder - where to watch the game
//!
//! Relational catalogue of users, bars, sports and streaming services.
//!
//! Barfinder provides:
//! - The SQLite schema: four entity tables and three association tables
//! - `init_db`, which creates whatever part of the schema is missing
//! - Typed insert/query access, including reverse-direction lookups
//! - A hosting shell with cross-origin access enabled

pub mod config;
pub mod link;
pub mod model;
pub mod server;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use link::{BarSport, BarStreaming, Link, LinkKind, UserBar};
pub use model::{Bar, BarDetails, NewBar, NewUser, Sport, StreamingService, User};
pub use storage::Database;

/// Result type alias for Barfinder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Barfinder operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Which schema constraint a write violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    PrimaryKey,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

impl Error {
    /// Classify a constraint violation raised by the storage engine.
    /// Returns `None` for every other error.
    pub fn constraint(&self) -> Option<ConstraintKind> {
        use rusqlite::ffi;

        let Error::Storage(rusqlite::Error::SqliteFailure(err, _)) = self else {
            return None;
        };
        if err.code != rusqlite::ErrorCode::ConstraintViolation {
            return None;
        }
        Some(match err.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => ConstraintKind::Unique,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
            ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
            ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
            _ => ConstraintKind::Other,
        })
    }
}
