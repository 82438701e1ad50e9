//! Connection session state machine.
//!
//! Owns the lifecycle of the single duplex broker connection: connect,
//! disconnect, heartbeat, and reconnect scheduling with exponential backoff.
//! Pure state machine in the action pattern: methods take the current time
//! and return [`SessionAction`]s for the driver to execute against the real
//! transport.
//!
//! # State machine
//!
//! ```text
//! ┌──────────────┐ connect  ┌────────────┐  opened   ┌───────────┐
//! │ Disconnected │─────────>│ Connecting │──────────>│ Connected │
//! └──────────────┘          └────────────┘           └───────────┘
//!        ▲                     ▲      │ closed             │ closed
//!        │ ceiling reached     │ tick ↓                    ↓
//!        └─────────────────┌──────────────┐<───────────────┘
//!                          │ Reconnecting │
//!                          └──────────────┘
//! ```
//!
//! Transport failures are never surfaced as errors; they feed the backoff
//! policy and show up only as state transitions the caller can observe.

use std::{
    ops::{Add, Sub},
    time::{Duration, Instant},
};

use crate::{
    backoff::{Backoff, BackoffConfig},
    error::SessionError,
};

/// Interval between keepalive pings while connected.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Connection state visible to the caller and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection and no retry scheduled.
    Disconnected,
    /// Transport open in flight.
    Connecting,
    /// Live, authenticated connection.
    Connected,
    /// Connection lost; a retry is scheduled.
    Reconnecting,
}

/// Actions produced by the session for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open a transport connection authenticated with this token.
    Open {
        /// Bearer token for the broker handshake.
        token: String,
    },

    /// Tear down the live transport.
    Close,

    /// Emit a keepalive ping on the live transport.
    SendPing,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between keepalive pings.
    pub heartbeat_interval: Duration,
    /// Reconnect backoff policy.
    pub backoff: BackoffConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL, backoff: BackoffConfig::default() }
    }
}

/// Connection session state machine.
///
/// Generic over `Instant` to support both real time and virtual time in
/// deterministic tests.
#[derive(Debug, Clone)]
pub struct Session<I = Instant>
where
    I: Copy + Ord + Send + Sync + Add<Duration, Output = I> + Sub<Output = Duration>,
{
    state: SessionState,
    config: SessionConfig,
    /// Bearer token for reconnects. `None` after logout or before login.
    token: Option<String>,
    backoff: Backoff,
    /// When the next reconnect attempt fires. `None` if no retry scheduled.
    retry_at: Option<I>,
    /// When the last ping was sent. `None` until connected.
    last_ping: Option<I>,
}

impl<I> Session<I>
where
    I: Copy + Ord + Send + Sync + Add<Duration, Output = I> + Sub<Output = Duration>,
{
    /// Create a session in [`SessionState::Disconnected`].
    pub fn new(config: SessionConfig) -> Self {
        let backoff = Backoff::new(config.backoff.clone());
        Self { state: SessionState::Disconnected, config, token: None, backoff, retry_at: None, last_ping: None }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether emits are currently possible.
    ///
    /// Callers that get `false` are responsible for the REST fallback path.
    pub fn can_emit(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Reconnect attempts consumed since the last successful connection.
    pub fn attempt(&self) -> u32 {
        self.backoff.attempt()
    }

    /// Scheduled retry time, if a reconnect is pending.
    pub fn retry_at(&self) -> Option<I> {
        self.retry_at
    }

    /// Bearer token for the current login, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Begin connecting with the given bearer token.
    ///
    /// Never fails: an absent token degrades to staying disconnected, and an
    /// explicit connect supersedes any scheduled retry (resetting the backoff
    /// ceiling). A no-op while already connecting or connected.
    pub fn connect(&mut self, token: &str, _now: I) -> Vec<SessionAction> {
        if token.is_empty() {
            // Unauthenticated: park disconnected rather than loop on a
            // token the broker will reject.
            self.token = None;
            self.retry_at = None;
            self.state = SessionState::Disconnected;
            return vec![];
        }

        if matches!(self.state, SessionState::Connecting | SessionState::Connected) {
            return vec![];
        }

        self.token = Some(token.to_string());
        self.backoff.reset();
        self.retry_at = None;
        self.state = SessionState::Connecting;

        vec![SessionAction::Open { token: token.to_string() }]
    }

    /// Tear down the connection and cancel any pending retry. Idempotent.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        let had_transport =
            matches!(self.state, SessionState::Connecting | SessionState::Connected);

        self.state = SessionState::Disconnected;
        self.token = None;
        self.retry_at = None;
        self.last_ping = None;
        self.backoff.reset();

        if had_transport { vec![SessionAction::Close] } else { vec![] }
    }

    /// The driver opened the transport.
    pub fn handle_opened(&mut self, now: I) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != SessionState::Connecting {
            return Err(SessionError::InvalidTransition {
                state: self.state,
                operation: "handle_opened",
            });
        }

        self.state = SessionState::Connected;
        self.backoff.reset();
        self.retry_at = None;
        self.last_ping = Some(now);

        Ok(vec![])
    }

    /// The transport closed or a connect attempt failed.
    ///
    /// Schedules a reconnect with exponential backoff, or parks disconnected
    /// once the attempt ceiling is exhausted (until an explicit `connect`).
    pub fn handle_closed(&mut self, now: I) -> Vec<SessionAction> {
        if self.state == SessionState::Disconnected {
            return vec![];
        }

        self.last_ping = None;

        if self.token.is_none() {
            self.state = SessionState::Disconnected;
            self.retry_at = None;
            return vec![];
        }

        match self.backoff.next_delay() {
            Some(delay) => {
                self.state = SessionState::Reconnecting;
                self.retry_at = Some(now + delay);
            },
            None => {
                self.state = SessionState::Disconnected;
                self.retry_at = None;
            },
        }

        vec![]
    }

    /// Periodic maintenance: fire due reconnects and heartbeats.
    pub fn tick(&mut self, now: I) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        if self.state == SessionState::Reconnecting
            && self.retry_at.is_some_and(|at| now >= at)
        {
            self.retry_at = None;
            if let Some(token) = self.token.clone() {
                self.state = SessionState::Connecting;
                actions.push(SessionAction::Open { token });
            } else {
                self.state = SessionState::Disconnected;
            }
        }

        if self.state == SessionState::Connected {
            let due = match self.last_ping {
                None => true,
                Some(last) => now - last >= self.config.heartbeat_interval,
            };
            if due {
                self.last_ping = Some(now);
                actions.push(SessionAction::SendPing);
            }
        }

        actions
    }
}
