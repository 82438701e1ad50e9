//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the chat panel completely decoupled from I/O and
//! protocol mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mirrors the visible transcript and typing line of the open conversation.
//! - Tracks the conversation list with unread badges.
//! - Tracks high-level connection state for the persistent status indicator.

use parley_client::Entry;
use parley_core::SessionState;
use parley_proto::{RoomId, UserId};

use crate::{AppAction, AppEvent, RoomSummary};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies, fully testable without a terminal.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state mirrored from the session.
    connection: SessionState,
    /// Conversation list with unread badges.
    rooms: Vec<RoomSummary>,
    /// Currently open conversation. `None` if the panel is closed.
    active_room: Option<RoomId>,
    /// Visible transcript snapshot of the open conversation.
    entries: Vec<Entry>,
    /// Participants of the open conversation, sorted.
    members: Vec<UserId>,
    /// Users currently typing in the open conversation, sorted.
    typists: Vec<UserId>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App with no connection and no open conversation.
    pub fn new() -> Self {
        Self {
            connection: SessionState::Disconnected,
            rooms: Vec::new(),
            active_room: None,
            entries: Vec::new(),
            members: Vec::new(),
            typists: Vec::new(),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::ConnectionChanged { state } => {
                self.connection = state;
                vec![AppAction::Render]
            },
            AppEvent::TranscriptChanged { room_id, entries } => {
                if self.active_room.as_ref() == Some(&room_id) {
                    self.entries = entries;
                } else if let Some(room) =
                    self.rooms.iter_mut().find(|r| r.room_id == room_id)
                {
                    room.unread = true;
                }
                vec![AppAction::Render]
            },
            AppEvent::MembersChanged { room_id, members } => {
                if self.active_room.as_ref() == Some(&room_id) {
                    self.members = members;
                }
                vec![AppAction::Render]
            },
            AppEvent::TypingChanged { room_id, typists } => {
                if self.active_room.as_ref() == Some(&room_id) {
                    self.typists = typists;
                }
                vec![AppAction::Render]
            },
            AppEvent::RoomsListed { room_ids } => {
                // Merge, preserving unread flags for rooms already known
                self.rooms = room_ids
                    .into_iter()
                    .map(|room_id| {
                        self.rooms
                            .iter()
                            .find(|r| r.room_id == room_id)
                            .cloned()
                            .unwrap_or_else(|| RoomSummary::new(room_id))
                    })
                    .collect();
                vec![AppAction::Render]
            },
            AppEvent::Notice { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Initiate connection to the broker.
    pub fn connect(&self, token: impl Into<String>) -> Vec<AppAction> {
        vec![AppAction::Connect { token: token.into() }, AppAction::Render]
    }

    /// Disconnect from the broker.
    pub fn disconnect(&self) -> Vec<AppAction> {
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Open a conversation, closing the current one.
    pub fn open_room(&mut self, room_id: RoomId) -> Vec<AppAction> {
        self.entries.clear();
        self.members.clear();
        self.typists.clear();
        self.active_room = Some(room_id.clone());
        if let Some(room) = self.rooms.iter_mut().find(|r| r.room_id == room_id) {
            room.unread = false;
        }
        vec![AppAction::OpenRoom { room_id }, AppAction::Render]
    }

    /// Close the open conversation.
    pub fn close_room(&mut self) -> Vec<AppAction> {
        self.active_room = None;
        self.entries.clear();
        self.members.clear();
        self.typists.clear();
        vec![AppAction::CloseRoom, AppAction::Render]
    }

    /// Delete a conversation, closing it first if it is the open one.
    pub fn delete_room(&mut self, room_id: RoomId) -> Vec<AppAction> {
        if self.active_room.as_ref() == Some(&room_id) {
            self.active_room = None;
            self.entries.clear();
            self.members.clear();
            self.typists.clear();
        }
        self.rooms.retain(|r| r.room_id != room_id);
        vec![AppAction::DeleteRoom { room_id }, AppAction::Render]
    }

    /// Send a message to the open conversation.
    pub fn send_message(&self, body: impl Into<String>) -> Vec<AppAction> {
        vec![AppAction::SendMessage { body: body.into() }, AppAction::Render]
    }

    /// Register a keystroke in the composer.
    pub fn keystroke(&self) -> Vec<AppAction> {
        vec![AppAction::Keystroke]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Current connection state.
    pub fn connection_state(&self) -> SessionState {
        self.connection
    }

    /// Text for the persistent connection indicator.
    pub fn status_line(&self) -> &'static str {
        match self.connection {
            SessionState::Disconnected => "Offline",
            SessionState::Connecting => "Connecting...",
            SessionState::Connected => "Online",
            SessionState::Reconnecting => "Reconnecting...",
        }
    }

    /// Text for the typing line under the composer. `None` when nobody types.
    pub fn typing_line(&self) -> Option<String> {
        match self.typists.as_slice() {
            [] => None,
            [user] => Some(format!("user {user} is typing...")),
            many => Some(format!("{} people are typing...", many.len())),
        }
    }

    /// Conversation list with unread badges.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Currently open conversation. `None` if the panel is closed.
    pub fn active_room(&self) -> Option<&RoomId> {
        self.active_room.as_ref()
    }

    /// Visible transcript snapshot of the open conversation.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Participants of the open conversation, sorted.
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Text for the conversation header. `None` when the roster is unknown.
    pub fn member_line(&self) -> Option<String> {
        match self.members.len() {
            0 => None,
            1 => Some("1 participant".to_string()),
            n => Some(format!("{n} participants")),
        }
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
