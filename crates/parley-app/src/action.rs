//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute,
//! usually by feeding them through the [`crate::Bridge`].

use parley_proto::RoomId;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to the chat broker.
    Connect {
        /// Bearer token for the broker handshake.
        token: String,
    },

    /// Disconnect from the chat broker.
    Disconnect,

    /// Open a conversation, leaving the current one.
    OpenRoom {
        /// Conversation to open.
        room_id: RoomId,
    },

    /// Close the open conversation.
    CloseRoom,

    /// Delete a conversation.
    DeleteRoom {
        /// Conversation to delete.
        room_id: RoomId,
    },

    /// Send a message to the open conversation.
    SendMessage {
        /// Message text.
        body: String,
    },

    /// The user typed in the composer.
    Keystroke,
}
