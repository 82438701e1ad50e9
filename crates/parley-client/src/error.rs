//! Client error types.

use parley_proto::MAX_MESSAGE_LEN;
use thiserror::Error;

/// Errors from the client state machine.
///
/// These are caller mistakes, not transport conditions: connection loss and
/// send failures are absorbed by the reconnect/fallback machinery and never
/// surface as `Err`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A room-scoped operation was requested with no active room.
    #[error("no active room")]
    NoActiveRoom,

    /// An empty message body was submitted.
    #[error("message body is empty")]
    EmptyMessage,

    /// The message body exceeds the platform bound.
    #[error("message body is {len} chars, limit is {MAX_MESSAGE_LEN}")]
    MessageTooLong {
        /// Actual body length in characters.
        len: usize,
    },

    /// The driver violated the session protocol.
    #[error(transparent)]
    Session(#[from] parley_core::SessionError),
}
