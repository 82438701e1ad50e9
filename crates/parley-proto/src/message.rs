//! Chat message wire form.

use serde::{Deserialize, Serialize};

use crate::ids::{CorrelationId, MessageId, RoomId, UserId};

/// Maximum length of a message body in characters.
///
/// The backend enforces the same bound; rejecting locally keeps an oversized
/// body from ever occupying a pending transcript slot.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// A server-confirmed chat message as it appears on the wire.
///
/// Carried inside room-join history snapshots, broker echoes of our own
/// sends, and other members' new-message events. The `correlation_id` is
/// only present when the broker echoes a message that originally carried
/// one; history snapshots typically omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Server-assigned message identifier.
    pub id: MessageId,

    /// Client correlation id from the original send, if the broker echoed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,

    /// Room this message belongs to.
    pub room_id: RoomId,

    /// Author of the message.
    pub author_id: UserId,

    /// Opaque text body, at most [`MAX_MESSAGE_LEN`] characters.
    pub body: String,

    /// Server receive timestamp, milliseconds since the Unix epoch.
    pub sent_at_ms: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_is_omitted_when_absent() {
        let msg = WireMessage {
            id: MessageId::new("m1"),
            correlation_id: None,
            room_id: RoomId::from("order-1"),
            author_id: 7,
            body: "hello".into(),
            sent_at_ms: 1_700_000_000_000,
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("correlation_id"));
    }

    #[test]
    fn history_message_without_correlation_id_decodes() {
        let json = r#"{
            "id": "m9",
            "room_id": "order-2",
            "author_id": 3,
            "body": "shipped yet?",
            "sent_at_ms": 1700000000000
        }"#;

        let msg: WireMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.correlation_id, None);
        assert_eq!(msg.author_id, 3);
    }
}
