//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - Protocol notifications translated from the underlying client by the
//!   [`crate::Bridge`].
//! - Driver-side results (room listing) and periodic ticks.

use parley_client::Entry;
use parley_core::SessionState;
use parley_proto::{RoomId, UserId};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Connection state changed.
    ConnectionChanged {
        /// New session state.
        state: SessionState,
    },

    /// The visible transcript of a room changed.
    TranscriptChanged {
        /// Room the transcript belongs to.
        room_id: RoomId,
        /// Full snapshot of the visible entries.
        entries: Vec<Entry>,
    },

    /// The member roster of a room changed.
    MembersChanged {
        /// Room the roster belongs to.
        room_id: RoomId,
        /// Known participants, sorted.
        members: Vec<UserId>,
    },

    /// The set of typing users in a room changed.
    TypingChanged {
        /// Room the signal belongs to.
        room_id: RoomId,
        /// Users currently typing, sorted.
        typists: Vec<UserId>,
    },

    /// Conversation list fetched from the REST API.
    RoomsListed {
        /// Known conversation ids.
        room_ids: Vec<RoomId>,
    },

    /// Transient user-facing notice.
    Notice {
        /// Notice text.
        message: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
