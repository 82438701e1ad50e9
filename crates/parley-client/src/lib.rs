//! Client
//!
//! Action-based client state machine for marketplace order chat. Manages the
//! broker session, the single active room, transcript reconciliation under
//! optimistic send, and typing indicators.
//!
//! # Architecture
//!
//! The client follows the same Sans-IO and Action-Based patterns as
//! [`parley_core`]. It receives events ([`ClientEvent`]), processes them
//! through pure state machine logic, and returns actions ([`ClientAction`])
//! for the caller to execute.
//!
//! # Components
//!
//! - [`Client`]: Top-level state machine tying session and room together
//! - [`RoomController`]: Single active-room slot with atomic switching
//! - [`Transcript`]: Append-only message list with pending reconciliation
//! - [`TypingTracker`] / [`TypingDebounce`]: Remote and local typing state
//! - [`ClientEvent`]: Events fed into the client
//! - [`ClientAction`]: Actions produced by the client
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::BrokerConnection`]: Client with WebSocket transport
//! - [`transport::connect`]: Connect to a broker

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod rooms;
mod transcript;
mod typing;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::{Client, ClientConfig, ClientIdentity};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, RestOutcome};
pub use parley_core::{SessionState, env::Environment};
pub use rooms::{ActiveRoom, RoomController, RoomSettings};
pub use transcript::{Delivery, Entry, Ingest, Transcript, TranscriptConfig};
pub use typing::{TypingDebounce, TypingTracker};
