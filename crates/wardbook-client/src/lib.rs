//! I/O layer of the wardbook hospital client.
//!
//! Holds everything that talks to the outside world: durable token
//! storage, the authenticated HTTP client, the session manager, and the
//! patient directory query engine. Higher layers (the terminal UI) drive
//! these through the [`api::AuthApi`] / [`api::PatientApi`] traits, which
//! is also how the tests swap in in-memory fakes.

// We intentionally use native `async fn` in traits; the session manager
// and directory engine are generic over the API traits and run on a
// single-threaded driver, so `Send` bounds on the futures are not needed.
#![allow(async_fn_in_trait)]

pub mod api;
pub mod directory;
pub mod error;
pub mod session;
pub mod token;

#[cfg(test)]
mod tests;

pub use error::ApiError;
