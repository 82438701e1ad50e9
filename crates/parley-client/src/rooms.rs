//! Active-room controller.
//!
//! A client views at most one room at a time. Activating a new room
//! atomically swaps out the previous one: from the caller's perspective there
//! is never a moment with two active rooms, and state for the departed room
//! (transcript, typing indicators) is dropped on the spot.

use std::{collections::HashSet, ops::Sub, time::Duration};

use parley_proto::{RoomId, UserId};

use crate::{
    transcript::{Transcript, TranscriptConfig},
    typing::{TypingDebounce, TypingTracker},
};

/// Per-room client state while the room is active.
#[derive(Debug, Clone)]
pub struct ActiveRoom<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Room identifier.
    pub room_id: RoomId,
    /// Known participants.
    pub members: HashSet<UserId>,
    /// Visible transcript with reconciliation state.
    pub transcript: Transcript<I>,
    /// Remote typing indicators.
    pub typing: TypingTracker<I>,
    /// Local keystroke debouncer.
    pub debounce: TypingDebounce<I>,
}

/// Settings an [`ActiveRoom`] is created with.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Transcript reconciliation configuration.
    pub transcript: TranscriptConfig,
    /// Remote typing indicator lifetime.
    pub typing_expiry: Duration,
    /// Local typing idle period.
    pub typing_idle: Duration,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            transcript: TranscriptConfig::default(),
            typing_expiry: crate::typing::DEFAULT_TYPING_EXPIRY,
            typing_idle: crate::typing::DEFAULT_TYPING_IDLE,
        }
    }
}

impl<I> ActiveRoom<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn new(room_id: RoomId, settings: &RoomSettings) -> Self {
        Self {
            room_id,
            members: HashSet::new(),
            transcript: Transcript::new(settings.transcript.clone()),
            typing: TypingTracker::new(settings.typing_expiry),
            debounce: TypingDebounce::new(settings.typing_idle),
        }
    }

    /// Known participants, sorted.
    pub fn member_list(&self) -> Vec<UserId> {
        let mut members: Vec<UserId> = self.members.iter().copied().collect();
        members.sort_unstable();
        members
    }
}

/// Owner of the single active-room slot.
#[derive(Debug, Clone)]
pub struct RoomController<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    active: Option<ActiveRoom<I>>,
    settings: RoomSettings,
}

impl<I> RoomController<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a controller with no active room.
    pub fn new(settings: RoomSettings) -> Self {
        Self { active: None, settings }
    }

    /// Activate a room, returning the id of the room that was left.
    ///
    /// The previous room's local state is discarded here; the caller is
    /// responsible for emitting the leave for it.
    pub fn activate(&mut self, room_id: RoomId) -> Option<RoomId> {
        let previous = self.active.take().map(|room| room.room_id);
        self.active = Some(ActiveRoom::new(room_id, &self.settings));
        previous
    }

    /// Deactivate the current room, returning its id.
    pub fn deactivate(&mut self) -> Option<RoomId> {
        self.active.take().map(|room| room.room_id)
    }

    /// Currently active room id.
    pub fn active_id(&self) -> Option<&RoomId> {
        self.active.as_ref().map(|room| &room.room_id)
    }

    /// Whether the given room is the active one.
    pub fn is_active(&self, room_id: &RoomId) -> bool {
        self.active_id() == Some(room_id)
    }

    /// Active room state.
    pub fn active(&self) -> Option<&ActiveRoom<I>> {
        self.active.as_ref()
    }

    /// Mutable active room state.
    pub fn active_mut(&mut self) -> Option<&mut ActiveRoom<I>> {
        self.active.as_mut()
    }

    /// Mutable active room state, only if it matches `room_id`.
    pub fn active_mut_for(&mut self, room_id: &RoomId) -> Option<&mut ActiveRoom<I>> {
        self.active.as_mut().filter(|room| &room.room_id == room_id)
    }
}
