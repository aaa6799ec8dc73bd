//! Error types for `wardbook-core`.

use thiserror::Error;

use crate::patient::{PatientStatus, StatusAction};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("required field missing: {0}")]
  MissingField(&'static str),

  #[error("{field} is not a valid date: {value:?}")]
  InvalidDate {
    field: &'static str,
    value: String,
  },

  #[error("date of birth cannot be in the future")]
  FutureDateOfBirth,

  #[error("next of kin phone is required when a next of kin name is given")]
  NextOfKinPhoneRequired,

  #[error("no {action} transition from status {from}")]
  InvalidTransition {
    from:   PatientStatus,
    action: StatusAction,
  },

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
