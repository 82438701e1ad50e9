//! Error types for the session layer.
//!
//! Transport failures are not errors at this layer: the session absorbs them
//! into its reconnect policy. `SessionError` only covers driver protocol
//! violations, i.e. feeding the state machine an event that cannot occur for
//! its current state.

use thiserror::Error;

use crate::session::SessionState;

/// Errors from the session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The driver reported a transport event that is impossible in the
    /// current state (e.g. "opened" while disconnected).
    #[error("invalid transition: cannot {operation} while {state:?}")]
    InvalidTransition {
        /// State when the event arrived.
        state: SessionState,
        /// The event that was reported.
        operation: &'static str,
    },
}
