//! Entity types
//!
//! Four entities make up the catalogue:
//! - `User`: an account that follows bars
//! - `Bar`: a venue with a location
//! - `Sport`: a lookup entry a bar can show
//! - `StreamingService`: a lookup entry a bar subscribes to
//!
//! Each entity has a `New*` counterpart used for inserts; the store assigns
//! `id` and `created_at`.

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX: usize = 80;
pub const EMAIL_MAX: usize = 120;
pub const PASSWORD_HASH_MAX: usize = 200;
pub const BAR_NAME_MAX: usize = 100;
pub const ADDRESS_MAX: usize = 200;
pub const LOOKUP_NAME_MAX: usize = 50;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Already-hashed credential. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Nullable column; rows written outside this crate may leave it empty
    pub created_at: Option<NaiveDateTime>,
}

/// Insert form of [`User`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Check required fields against the declared column widths
    pub fn validate(&self) -> Result<()> {
        check_text("username", &self.username, USERNAME_MAX)?;
        check_text("email", &self.email, EMAIL_MAX)?;
        check_text("password_hash", &self.password_hash, PASSWORD_HASH_MAX)
    }
}

/// A venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: Option<NaiveDateTime>,
}

/// Insert form of [`Bar`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewBar {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewBar {
    pub fn new(name: impl Into<String>, address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_text("name", &self.name, BAR_NAME_MAX)?;
        check_text("address", &self.address, ADDRESS_MAX)?;
        check_coordinate("latitude", self.latitude, 90.0)?;
        check_coordinate("longitude", self.longitude, 180.0)
    }
}

/// A sport a bar can show.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sport {
    pub id: i64,
    pub name: String,
}

/// A streaming service a bar can carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamingService {
    pub id: i64,
    pub name: String,
}

/// A bar together with both of its association sets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDetails {
    #[serde(flatten)]
    pub bar: Bar,
    pub sports: Vec<Sport>,
    pub streaming_services: Vec<StreamingService>,
}

/// Validate the name of a lookup entry (sport or streaming service)
pub fn validate_lookup_name(name: &str) -> Result<()> {
    check_text("name", name, LOOKUP_NAME_MAX)
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    let len = value.chars().count();
    if len > max {
        return Err(Error::InvalidField {
            field,
            reason: format!("{len} characters exceeds the limit of {max}"),
        });
    }
    Ok(())
}

fn check_coordinate(field: &'static str, value: f64, bound: f64) -> Result<()> {
    if !value.is_finite() || value.abs() > bound {
        return Err(Error::InvalidField {
            field,
            reason: format!("{value} is outside ±{bound}"),
        });
    }
    Ok(())
}
