//! Client events and actions.

use parley_core::SessionState;
use parley_proto::{
    ClientCommand, CorrelationId, RoomId, ServerEvent, UserId, WireMessage, rest::RestRequest,
};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Driving the transport and reporting open/close
/// - Decoding broker frames into [`ServerEvent`]s
/// - Executing REST fallback requests and reporting their outcomes
/// - Sending ticks periodically for timeout processing
///
/// Generic over `I` (the instant type) to support both production time and a
/// virtual clock in tests.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// The user signed in; open the broker connection with this token.
    Connect {
        /// Bearer token from the auth collaborator.
        token: String,
    },

    /// The user signed out or closed chat.
    Disconnect,

    /// The driver opened the transport.
    TransportOpened,

    /// The transport closed or a connect attempt failed.
    TransportClosed {
        /// Driver-supplied close reason, if any.
        reason: Option<String>,
    },

    /// A decoded broker event arrived.
    Broker(ServerEvent),

    /// The user opened a conversation.
    JoinRoom {
        /// Room to activate.
        room_id: RoomId,
    },

    /// The user closed the active conversation.
    LeaveRoom,

    /// The user deleted a conversation.
    DeleteRoom {
        /// Room to delete.
        room_id: RoomId,
    },

    /// The user submitted a message in the active room.
    SendMessage {
        /// Message body.
        body: String,
    },

    /// The user typed in the active room's input.
    Keystroke,

    /// A REST fallback request finished.
    Rest(RestOutcome),

    /// Time tick for timeout processing.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Outcomes of driver-executed REST fallback requests.
#[derive(Debug, Clone)]
pub enum RestOutcome {
    /// The fallback `POST` succeeded; the confirmed message came back.
    MessageSent {
        /// Confirmed message from the envelope.
        message: WireMessage,
    },

    /// The fallback `POST` failed too.
    MessageFailed {
        /// Correlation id of the affected pending entry.
        correlation_id: CorrelationId,
        /// Failure description for logging.
        reason: String,
    },

    /// A history page fetched while offline.
    HistoryFetched {
        /// Room the page belongs to.
        room_id: RoomId,
        /// Messages, oldest first.
        messages: Vec<WireMessage>,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Open the transport authenticated with this token.
    Open {
        /// Bearer token for the broker handshake.
        token: String,
    },

    /// Tear down the transport.
    CloseTransport,

    /// Emit a command on the live transport.
    Emit(ClientCommand),

    /// Perform a REST call and report the outcome as a [`RestOutcome`].
    Rest(RestRequest),

    /// Connection status changed; update the persistent indicator.
    ConnectionChanged {
        /// New state.
        state: SessionState,
    },

    /// The active room's transcript changed; re-render it.
    TranscriptUpdated {
        /// Room whose transcript changed.
        room_id: RoomId,
    },

    /// The active room's member roster changed.
    MembersChanged {
        /// Room whose roster changed.
        room_id: RoomId,
        /// Known participants, sorted.
        members: Vec<UserId>,
    },

    /// The active room's typing indicator set changed.
    TypingChanged {
        /// Room whose indicators changed.
        room_id: RoomId,
        /// Users currently typing, sorted.
        typists: Vec<UserId>,
    },

    /// Show a transient, non-blocking notice to the user.
    Notify {
        /// Notice text.
        message: String,
    },

    /// Diagnostic log line.
    Log {
        /// Log text.
        message: String,
    },
}
