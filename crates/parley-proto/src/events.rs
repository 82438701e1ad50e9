//! Broker event types for both directions of the duplex connection.
//!
//! Events are internally tagged JSON objects. [`ClientCommand`] covers
//! everything the client emits; [`ServerEvent`] covers everything the broker
//! fans out. Encoding helpers keep serde_json usage in one place so callers
//! deal in typed values only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ids::{CorrelationId, RoomId, UserId},
    message::WireMessage,
};

/// Wire encoding/decoding failure.
#[derive(Debug, Error)]
pub enum WireError {
    /// The text frame was not a valid event of the expected shape.
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Commands the client sends to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Authenticate the freshly-opened connection.
    Authenticate {
        /// Bearer token from the auth collaborator.
        token: String,
    },

    /// Join a room; the broker replies with [`ServerEvent::RoomJoined`].
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
    },

    /// Leave a room.
    LeaveRoom {
        /// Room to leave.
        room_id: RoomId,
    },

    /// Send a chat message to the active room.
    SendMessage {
        /// Target room.
        room_id: RoomId,
        /// Client correlation id for echo reconciliation.
        correlation_id: CorrelationId,
        /// Message body.
        body: String,
    },

    /// Announce that the local user started typing.
    TypingStart {
        /// Room the signal applies to.
        room_id: RoomId,
    },

    /// Announce that the local user stopped typing.
    TypingStop {
        /// Room the signal applies to.
        room_id: RoomId,
    },

    /// Keepalive ping to defeat idle-connection timeouts.
    Ping,
}

impl ClientCommand {
    /// Encode as a JSON text frame.
    pub fn encode(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events the broker fans out to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Connection authenticated and ready.
    ConnectAck {
        /// The authenticated user's id.
        user_id: UserId,
    },

    /// Successful room join with the authoritative history snapshot.
    RoomJoined {
        /// Joined room.
        room_id: RoomId,
        /// Current participants.
        members: Vec<UserId>,
        /// Transcript snapshot; replaces any stale local state.
        history: Vec<WireMessage>,
    },

    /// A new message in a joined room (including echoes of our own sends).
    NewMessage {
        /// The message.
        message: WireMessage,
    },

    /// Another participant started typing.
    TypingStarted {
        /// Room the signal applies to.
        room_id: RoomId,
        /// Typing participant.
        user_id: UserId,
    },

    /// Another participant stopped typing.
    TypingStopped {
        /// Room the signal applies to.
        room_id: RoomId,
        /// Participant that stopped.
        user_id: UserId,
    },

    /// A participant joined the room.
    MemberJoined {
        /// Room the member joined.
        room_id: RoomId,
        /// New participant.
        user_id: UserId,
    },

    /// A participant left the room.
    MemberLeft {
        /// Room the member left.
        room_id: RoomId,
        /// Departed participant.
        user_id: UserId,
    },

    /// Order lifecycle notification (payment confirmed, shipped, ...).
    OrderStatus {
        /// Room tied to the order.
        room_id: RoomId,
        /// Human-readable status text.
        status: String,
    },

    /// Broker-side error report. Informational; the connection stays up.
    Error {
        /// Error description.
        message: String,
    },

    /// Keepalive reply. Absence of pongs is not treated as failure.
    Pong,
}

impl ServerEvent {
    /// Decode from a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(text)?)
    }
}
