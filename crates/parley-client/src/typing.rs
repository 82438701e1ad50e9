//! Presence and typing indicators.
//!
//! Two small state machines: [`TypingTracker`] consumes remote typing
//! signals and self-expires stale indicators, and [`TypingDebounce`] turns
//! the local keystroke stream into at most one start signal per
//! idle-then-typing transition plus a stop after an idle period.

use std::{collections::HashMap, ops::Sub, time::Duration};

use parley_proto::UserId;

/// Default lifetime of a remote typing indicator without a refresh.
pub const DEFAULT_TYPING_EXPIRY: Duration = Duration::from_secs(3);

/// Default idle period after which the local user stops "typing".
pub const DEFAULT_TYPING_IDLE: Duration = Duration::from_secs(2);

/// Active-typists set for one room, with automatic expiry.
///
/// An explicit stop signal is not required; indicators expire on their own
/// which bounds staleness when a stop is lost.
#[derive(Debug, Clone)]
pub struct TypingTracker<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    active: HashMap<UserId, I>,
    expiry: Duration,
}

impl<I> TypingTracker<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an empty tracker.
    pub fn new(expiry: Duration) -> Self {
        Self { active: HashMap::new(), expiry }
    }

    /// Record a typing signal. Returns `true` if the user was newly added
    /// (refreshes return `false` and the visible set is unchanged).
    pub fn observe(&mut self, user: UserId, now: I) -> bool {
        self.active.insert(user, now).is_none()
    }

    /// Remove a user after an explicit stop signal or a message from them.
    /// Returns `true` if the user was present.
    pub fn stop(&mut self, user: UserId) -> bool {
        self.active.remove(&user).is_some()
    }

    /// Drop indicators past their expiry. Returns the removed users.
    pub fn expire_stale(&mut self, now: I) -> Vec<UserId> {
        let expired: Vec<UserId> = self
            .active
            .iter()
            .filter(|(_, last)| now - **last >= self.expiry)
            .map(|(user, _)| *user)
            .collect();

        for user in &expired {
            self.active.remove(user);
        }

        expired
    }

    /// Currently typing users, sorted for stable display.
    pub fn typists(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.active.keys().copied().collect();
        users.sort_unstable();
        users
    }

    /// Drop all indicators (room left or connection lost).
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// Local keystroke debouncer.
///
/// Emits one start per idle-then-typing transition so repeated keystrokes do
/// not flood the broker, and one stop once the user goes idle or sends.
#[derive(Debug, Clone)]
pub struct TypingDebounce<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    last_keystroke: Option<I>,
    idle: Duration,
}

impl<I> TypingDebounce<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an idle debouncer.
    pub fn new(idle: Duration) -> Self {
        Self { last_keystroke: None, idle }
    }

    /// Record a keystroke. Returns `true` when a typing-start should be
    /// emitted (first keystroke after idle).
    pub fn keystroke(&mut self, now: I) -> bool {
        let start = self.last_keystroke.is_none();
        self.last_keystroke = Some(now);
        start
    }

    /// Check for the idle transition. Returns `true` when a typing-stop
    /// should be emitted.
    pub fn tick(&mut self, now: I) -> bool {
        match self.last_keystroke {
            Some(last) if now - last >= self.idle => {
                self.last_keystroke = None;
                true
            },
            _ => false,
        }
    }

    /// The user sent a message. Returns `true` when a typing-stop should be
    /// emitted.
    pub fn message_sent(&mut self) -> bool {
        self.last_keystroke.take().is_some()
    }
}
