//! Transcript reconciliation.
//!
//! Keeps the visible message list correct and duplicate-free under optimistic
//! send. A locally-sent message is appended immediately as `Pending`; when the
//! broker echoes it back, the echo is reconciled into the same entry instead
//! of producing a second one.
//!
//! Per-message state machine: `Pending -> Confirmed` (normal path) or
//! `Pending -> Unconfirmed` (eviction path, no echo within the timeout).
//! Unconfirmed entries stay visible forever; eviction only clears the
//! pending-tracking state so the "sending" indicator stops.
//!
//! Ordering is append-only by local receipt time. Out-of-order server
//! timestamps are NOT re-sorted; a stable, non-jumping transcript wins over
//! strict chronology.

use std::{
    collections::{HashMap, HashSet},
    ops::Sub,
    time::Duration,
};

use parley_proto::{CorrelationId, MessageId, UserId, WireMessage};

/// Default time a pending entry waits for its echo before eviction.
pub const DEFAULT_PENDING_TIMEOUT: Duration = Duration::from_secs(30);

/// Default window for the content/author fallback match.
pub const DEFAULT_ECHO_WINDOW: Duration = Duration::from_secs(5);

/// Delivery state of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Locally created, awaiting the broker echo.
    Pending,
    /// Server-confirmed with this id.
    Confirmed(MessageId),
    /// Never confirmed; kept visible but no longer tracked.
    Unconfirmed,
    /// System notice, not subject to delivery tracking.
    Notice,
}

/// One visible transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Author. `None` for system entries (order-status notifications).
    pub author: Option<UserId>,
    /// Message text.
    pub body: String,
    /// Correlation id, present on locally-originated entries.
    pub correlation_id: Option<CorrelationId>,
    /// Delivery state.
    pub delivery: Delivery,
}

impl Entry {
    /// Whether the entry is still awaiting confirmation.
    pub fn is_pending(&self) -> bool {
        self.delivery == Delivery::Pending
    }
}

/// Outcome of ingesting a broker message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// A pending entry was confirmed in place at this index.
    Replaced(usize),
    /// The message was appended as a new entry at this index.
    Appended(usize),
    /// The server id was already present; dropped.
    Duplicate,
}

/// Transcript configuration.
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// How long a pending entry waits for its echo.
    pub pending_timeout: Duration,
    /// Recency window for the content/author fallback match.
    pub echo_window: Duration,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self { pending_timeout: DEFAULT_PENDING_TIMEOUT, echo_window: DEFAULT_ECHO_WINDOW }
    }
}

#[derive(Debug, Clone)]
struct PendingSlot<I> {
    index: usize,
    since: I,
}

/// Append-only transcript with pending-message reconciliation.
///
/// Entries are never removed, so indices are stable and replacement preserves
/// transcript position.
#[derive(Debug, Clone)]
pub struct Transcript<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    entries: Vec<Entry>,
    pending: HashMap<CorrelationId, PendingSlot<I>>,
    confirmed_ids: HashSet<MessageId>,
    confirmed_corrs: HashSet<CorrelationId>,
    config: TranscriptConfig,
}

impl<I> Transcript<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an empty transcript.
    pub fn new(config: TranscriptConfig) -> Self {
        Self {
            entries: Vec::new(),
            pending: HashMap::new(),
            confirmed_ids: HashSet::new(),
            confirmed_corrs: HashSet::new(),
            config,
        }
    }

    /// Visible entries in display order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries still awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Append an optimistic local entry.
    ///
    /// Returns the entry index, or `None` if the echo for this correlation id
    /// already arrived (the confirmed entry is already in place).
    pub fn push_local(
        &mut self,
        correlation_id: CorrelationId,
        author: UserId,
        body: String,
        now: I,
    ) -> Option<usize> {
        if self.confirmed_corrs.contains(&correlation_id) {
            return None;
        }

        let index = self.entries.len();
        self.entries.push(Entry {
            author: Some(author),
            body,
            correlation_id: Some(correlation_id),
            delivery: Delivery::Pending,
        });
        self.pending.insert(correlation_id, PendingSlot { index, since: now });

        Some(index)
    }

    /// Append a system entry (order-status notification).
    pub fn push_system(&mut self, text: String) -> usize {
        let index = self.entries.len();
        self.entries.push(Entry {
            author: None,
            body: text,
            correlation_id: None,
            delivery: Delivery::Notice,
        });
        index
    }

    /// Reconcile a server-confirmed message into the transcript.
    ///
    /// For messages authored by `local_user`, the echo is matched against a
    /// pending entry: first by correlation id, then by identical body within
    /// the recency window. Anything unmatched is appended; over-display beats
    /// silent loss.
    pub fn ingest(&mut self, message: &WireMessage, local_user: UserId, now: I) -> Ingest {
        if self.confirmed_ids.contains(&message.id) {
            return Ingest::Duplicate;
        }

        if message.author_id == local_user {
            if let Some(correlation_id) = self.match_pending(message, now) {
                if let Some(slot) = self.pending.remove(&correlation_id) {
                    let entry = &mut self.entries[slot.index];
                    entry.delivery = Delivery::Confirmed(message.id.clone());
                    self.confirmed_ids.insert(message.id.clone());
                    self.confirmed_corrs.insert(correlation_id);
                    return Ingest::Replaced(slot.index);
                }
            }
        }

        let index = self.entries.len();
        self.entries.push(Entry {
            author: Some(message.author_id),
            body: message.body.clone(),
            correlation_id: message.correlation_id,
            delivery: Delivery::Confirmed(message.id.clone()),
        });
        self.confirmed_ids.insert(message.id.clone());
        if let Some(correlation_id) = message.correlation_id {
            // Guards against a late optimistic append duplicating this echo
            self.confirmed_corrs.insert(correlation_id);
        }

        Ingest::Appended(index)
    }

    /// Find the pending entry this echo belongs to.
    fn match_pending(&self, message: &WireMessage, now: I) -> Option<CorrelationId> {
        // Exact correlation id match
        if let Some(correlation_id) = message.correlation_id {
            if self.pending.contains_key(&correlation_id) {
                return Some(correlation_id);
            }
        }

        // Fallback: same author, identical body, sent recently. Oldest first
        // so two rapid identical sends resolve in order.
        self.pending
            .iter()
            .filter(|(_, slot)| {
                let entry = &self.entries[slot.index];
                entry.body == message.body && now - slot.since <= self.config.echo_window
            })
            .min_by_key(|(_, slot)| slot.since)
            .map(|(correlation_id, _)| *correlation_id)
    }

    /// Evict pending entries past the confirmation timeout.
    ///
    /// Evicted entries become `Unconfirmed` and stay visible; only the
    /// pending-tracking state is dropped. Returns the affected correlation
    /// ids.
    pub fn evict_stale(&mut self, now: I) -> Vec<CorrelationId> {
        let stale: Vec<CorrelationId> = self
            .pending
            .iter()
            .filter(|(_, slot)| now - slot.since >= self.config.pending_timeout)
            .map(|(correlation_id, _)| *correlation_id)
            .collect();

        for correlation_id in &stale {
            if let Some(slot) = self.pending.remove(correlation_id) {
                self.entries[slot.index].delivery = Delivery::Unconfirmed;
            }
        }

        stale
    }

    /// Stop tracking a pending entry after a failed fallback send.
    ///
    /// The entry stays visible, marked unconfirmed. Returns whether the
    /// correlation id was being tracked.
    pub fn mark_unconfirmed(&mut self, correlation_id: CorrelationId) -> bool {
        match self.pending.remove(&correlation_id) {
            Some(slot) => {
                self.entries[slot.index].delivery = Delivery::Unconfirmed;
                true
            },
            None => false,
        }
    }

    /// Replace all local state with an authoritative history snapshot.
    ///
    /// Used on room join; stale local state for the room is discarded, not
    /// merged.
    pub fn replace_history(&mut self, history: Vec<WireMessage>) {
        self.entries.clear();
        self.pending.clear();
        self.confirmed_ids.clear();
        self.confirmed_corrs.clear();

        for message in history {
            self.confirmed_ids.insert(message.id.clone());
            if let Some(correlation_id) = message.correlation_id {
                self.confirmed_corrs.insert(correlation_id);
            }
            self.entries.push(Entry {
                author: Some(message.author_id),
                body: message.body,
                correlation_id: message.correlation_id,
                delivery: Delivery::Confirmed(message.id),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use parley_proto::RoomId;

    use super::*;

    const LOCAL: UserId = 42;
    const PEER: UserId = 7;

    fn transcript() -> Transcript<Instant> {
        Transcript::new(TranscriptConfig::default())
    }

    fn wire(id: &str, correlation_id: Option<u128>, author: UserId, body: &str) -> WireMessage {
        WireMessage {
            id: MessageId::new(id),
            correlation_id: correlation_id.map(CorrelationId::new),
            room_id: RoomId::from("order-1"),
            author_id: author,
            body: body.to_string(),
            sent_at_ms: 0,
        }
    }

    #[test]
    fn echo_with_correlation_id_replaces_in_place() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "hello".into(), now).unwrap();
        assert_eq!(t.pending_count(), 1);

        let outcome = t.ingest(&wire("m1", Some(0xc1), LOCAL, "hello"), LOCAL, now);
        assert_eq!(outcome, Ingest::Replaced(0));
        assert_eq!(t.len(), 1);
        assert_eq!(t.pending_count(), 0);
        assert_eq!(t.entries()[0].delivery, Delivery::Confirmed(MessageId::new("m1")));
    }

    #[test]
    fn echo_position_is_preserved() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "first".into(), now).unwrap();
        t.ingest(&wire("m5", None, PEER, "from peer"), LOCAL, now);

        // Echo arrives after the peer message; the entry stays at index 0
        let outcome = t.ingest(&wire("m6", Some(0xc1), LOCAL, "first"), LOCAL, now);
        assert_eq!(outcome, Ingest::Replaced(0));
        assert_eq!(t.entries()[0].body, "first");
        assert_eq!(t.entries()[1].body, "from peer");
    }

    #[test]
    fn echo_before_optimistic_append_yields_one_entry() {
        let now = Instant::now();
        let mut t = transcript();

        // Echo lands first (e.g. handler ordering during a burst)
        t.ingest(&wire("m1", Some(0xc1), LOCAL, "hello"), LOCAL, now);
        assert_eq!(t.len(), 1);

        // The delayed optimistic append is suppressed
        assert_eq!(t.push_local(CorrelationId::new(0xc1), LOCAL, "hello".into(), now), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn fallback_matches_identical_body_within_window() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "hello".into(), now).unwrap();

        // Broker dropped the correlation id
        let outcome = t.ingest(
            &wire("m1", None, LOCAL, "hello"),
            LOCAL,
            now + Duration::from_secs(2),
        );
        assert_eq!(outcome, Ingest::Replaced(0));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn fallback_prefers_oldest_pending() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "hi".into(), now).unwrap();
        t.push_local(CorrelationId::new(0xc2), LOCAL, "hi".into(), now + Duration::from_secs(1))
            .unwrap();

        let outcome = t.ingest(&wire("m1", None, LOCAL, "hi"), LOCAL, now + Duration::from_secs(2));
        assert_eq!(outcome, Ingest::Replaced(0));
        assert!(t.entries()[1].is_pending());
    }

    #[test]
    fn fallback_ignores_stale_pending() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "hello".into(), now).unwrap();

        // Outside the recency window: appended as new, pending untouched
        let outcome = t.ingest(
            &wire("m1", None, LOCAL, "hello"),
            LOCAL,
            now + Duration::from_secs(60),
        );
        assert_eq!(outcome, Ingest::Appended(1));
        assert_eq!(t.pending_count(), 1);
    }

    #[test]
    fn unmatched_own_message_is_appended_not_lost() {
        let now = Instant::now();
        let mut t = transcript();

        // Own message from another device: no pending state at all
        let outcome = t.ingest(&wire("m1", None, LOCAL, "from my phone"), LOCAL, now);
        assert_eq!(outcome, Ingest::Appended(0));
    }

    #[test]
    fn peer_messages_append_directly() {
        let now = Instant::now();
        let mut t = transcript();

        let outcome = t.ingest(&wire("m1", None, PEER, "hi"), LOCAL, now);
        assert_eq!(outcome, Ingest::Appended(0));
        assert_eq!(t.pending_count(), 0);
    }

    #[test]
    fn duplicate_server_id_is_dropped() {
        let now = Instant::now();
        let mut t = transcript();

        t.ingest(&wire("m1", None, PEER, "hi"), LOCAL, now);
        let outcome = t.ingest(&wire("m1", None, PEER, "hi"), LOCAL, now);
        assert_eq!(outcome, Ingest::Duplicate);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn eviction_keeps_content_visible() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "hi".into(), now).unwrap();

        let evicted = t.evict_stale(now + DEFAULT_PENDING_TIMEOUT);
        assert_eq!(evicted, vec![CorrelationId::new(0xc1)]);
        assert_eq!(t.pending_count(), 0);

        // Still visible, marked unconfirmed
        assert_eq!(t.len(), 1);
        assert_eq!(t.entries()[0].delivery, Delivery::Unconfirmed);
    }

    #[test]
    fn eviction_spares_fresh_pending() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "old".into(), now).unwrap();
        t.push_local(
            CorrelationId::new(0xc2),
            LOCAL,
            "new".into(),
            now + Duration::from_secs(25),
        )
        .unwrap();

        let evicted = t.evict_stale(now + DEFAULT_PENDING_TIMEOUT);
        assert_eq!(evicted, vec![CorrelationId::new(0xc1)]);
        assert_eq!(t.pending_count(), 1);
    }

    #[test]
    fn replace_history_discards_stale_state() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "stale".into(), now).unwrap();
        t.replace_history(vec![
            wire("m1", None, PEER, "fresh history"),
            wire("m2", None, LOCAL, "my old message"),
        ]);

        assert_eq!(t.len(), 2);
        assert_eq!(t.pending_count(), 0);
        assert_eq!(t.entries()[0].body, "fresh history");
    }

    #[test]
    fn mark_unconfirmed_clears_tracking_only() {
        let now = Instant::now();
        let mut t = transcript();

        t.push_local(CorrelationId::new(0xc1), LOCAL, "hi".into(), now).unwrap();
        assert!(t.mark_unconfirmed(CorrelationId::new(0xc1)));
        assert!(!t.mark_unconfirmed(CorrelationId::new(0xc1)));

        assert_eq!(t.len(), 1);
        assert_eq!(t.entries()[0].delivery, Delivery::Unconfirmed);
    }
}
