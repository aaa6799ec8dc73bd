//! Core types and pure logic for the wardbook hospital client.
//!
//! This crate is deliberately free of HTTP and terminal dependencies.
//! It holds the domain model (staff, sessions, patients), the patient
//! status state machine, the access-control decision function, the
//! search/filter state, and the registration wizard rules. All I/O lives
//! in `wardbook-client`.

pub mod access;
pub mod error;
pub mod patient;
pub mod registration;
pub mod search;
pub mod staff;

pub use error::{Error, Result};
