//! Session layer for the Parley order-chat client.
//!
//! Everything here follows the Sans-IO, action-based pattern: state machines
//! take events plus the current time and return actions for a driver to
//! execute. No sockets, no timers, no global state. Time and randomness come
//! from the [`env::Environment`] trait so every machine runs deterministically
//! under test.
//!
//! # Components
//!
//! - [`Session`]: connection lifecycle (connect, disconnect, heartbeat,
//!   reconnect scheduling)
//! - [`Backoff`]: explicit exponential-backoff state machine with an attempt
//!   ceiling
//! - [`env::Environment`]: time and randomness abstraction with a production
//!   [`env::SystemEnv`] and a test-only `MockEnv`

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backoff;
pub mod env;
mod error;
mod session;

pub use backoff::{Backoff, BackoffConfig};
pub use error::SessionError;
pub use session::{Session, SessionAction, SessionConfig, SessionState};
