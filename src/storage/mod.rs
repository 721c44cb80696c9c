//! Storage Layer - SQLite-backed persistence
//!
//! Entity tables:
//! - user(id, username, email, password_hash, created_at)
//! - bar(id, name, address, latitude, longitude, created_at)
//! - sport(id, name)
//! - streaming_service(id, name)
//!
//! Association tables:
//! - user_bars(user_id, bar_id)
//! - bar_sports(bar_id, sport_id)
//! - bar_streaming(bar_id, streaming_service_id)

pub mod schema;
pub mod sqlite;

pub use sqlite::{ColumnInfo, Database, DbStats, ForeignKeyInfo};
