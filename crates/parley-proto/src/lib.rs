//! Wire types for the Parley order-chat protocol.
//!
//! The broker speaks JSON over a persistent duplex connection. Every event is
//! an internally-tagged object (`"type"` discriminant), so both directions are
//! modeled as serde enums: [`ClientCommand`] for client-to-broker traffic and
//! [`ServerEvent`] for broker-to-client traffic.
//!
//! The REST fallback API shares its identifier types with the broker and
//! wraps every response in the uniform [`rest::Envelope`].
//!
//! No binary framing exists at this layer; message bodies are opaque text
//! bounded by [`MAX_MESSAGE_LEN`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod events;
mod ids;
mod message;
pub mod rest;

pub use events::{ClientCommand, ServerEvent, WireError};
pub use ids::{CorrelationId, MessageId, RoomId, UserId};
pub use message::{MAX_MESSAGE_LEN, WireMessage};
