//! Staff identity — roles, user records, and the in-memory session.
//!
//! A [`Session`] is owned exclusively by the session manager in
//! `wardbook-client`; everything else sees read-only borrows of it.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─── Role ────────────────────────────────────────────────────────────────────

/// The closed set of staff roles. An unknown role string on the wire is a
/// decode error, never a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
  Admin,
  Doctor,
  Nurse,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::Admin, Role::Doctor, Role::Nurse];

  /// The wire string for this role; matches the serde representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Admin => "Admin",
      Role::Doctor => "Doctor",
      Role::Nurse => "Nurse",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Admin" => Ok(Role::Admin),
      "Doctor" => Ok(Role::Doctor),
      "Nurse" => Ok(Role::Nurse),
      other => Err(Error::UnknownRole(other.to_string())),
    }
  }
}

// ─── Staff user ──────────────────────────────────────────────────────────────

/// A staff member as returned by the authentication endpoint.
///
/// `id` is opaque to the client; it comes from the auth system and is only
/// ever echoed back, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUser {
  pub id:        String,
  pub username:  String,
  /// Empty when the session was restored from a stored token — the token
  /// carries no full name, only a fresh login does.
  pub full_name: String,
  pub email:     String,
  pub role:      Role,
}

/// Login request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The currently authenticated staff member plus their token expiry.
///
/// A live session's `expires_at` was in the future at the moment it was
/// created or restored; the session manager destroys the session rather
/// than let an expired one be observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub user:       StaffUser,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at <= now
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_round_trips_through_wire_string() {
    for role in Role::ALL {
      assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
  }

  #[test]
  fn unknown_role_is_an_error() {
    let err = "Janitor".parse::<Role>().unwrap_err();
    assert_eq!(err, Error::UnknownRole("Janitor".to_string()));
  }

  #[test]
  fn role_deserializes_from_json_string() {
    let role: Role = serde_json::from_str("\"Doctor\"").unwrap();
    assert_eq!(role, Role::Doctor);
    assert!(serde_json::from_str::<Role>("\"Surgeon\"").is_err());
  }
}
