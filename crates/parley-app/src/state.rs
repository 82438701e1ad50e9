//! Observable application state types.
//!
//! These structures serve as the "View Model" for the application. They
//! contain the subset of client state necessary for rendering the UI without
//! exposing reconciliation internals.

use parley_proto::RoomId;

/// Summary line for a room in the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    /// Conversation id, keyed by order.
    pub room_id: RoomId,
    /// Room has activity the user has not seen.
    pub unread: bool,
}

impl RoomSummary {
    /// Create a summary with no unread activity.
    pub fn new(room_id: RoomId) -> Self {
        Self { room_id, unread: false }
    }
}
