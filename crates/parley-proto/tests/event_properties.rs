//! Property-based tests for the wire types
//!
//! These tests verify the fundamental invariants of the wire layer:
//!
//! 1. **Round-trip**: decode(encode(event)) == event for all commands
//! 2. **Correlation ids**: the hand-written hex encoding survives serde in
//!    both directions for the full u128 range
//! 3. **Robustness**: decoding arbitrary text never panics

use parley_proto::{ClientCommand, CorrelationId, RoomId, ServerEvent};
use proptest::prelude::*;

fn command_strategy() -> impl Strategy<Value = ClientCommand> {
    prop_oneof![
        "[a-z0-9 ]{0,64}".prop_map(|token| ClientCommand::Authenticate { token }),
        "[a-z0-9-]{1,32}".prop_map(|id| ClientCommand::JoinRoom { room_id: RoomId::from(id.as_str()) }),
        "[a-z0-9-]{1,32}".prop_map(|id| ClientCommand::LeaveRoom { room_id: RoomId::from(id.as_str()) }),
        ("[a-z0-9-]{1,32}", any::<u128>(), ".{0,200}").prop_map(|(id, corr, body)| {
            ClientCommand::SendMessage {
                room_id: RoomId::from(id.as_str()),
                correlation_id: CorrelationId::new(corr),
                body,
            }
        }),
        "[a-z0-9-]{1,32}".prop_map(|id| ClientCommand::TypingStart { room_id: RoomId::from(id.as_str()) }),
        "[a-z0-9-]{1,32}".prop_map(|id| ClientCommand::TypingStop { room_id: RoomId::from(id.as_str()) }),
        Just(ClientCommand::Ping),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_command_roundtrip(command in command_strategy()) {
        let json = command.encode().expect("encode");
        let back: ClientCommand = serde_json::from_str(&json).expect("decode");
        prop_assert_eq!(back, command);
    }

    #[test]
    fn prop_correlation_id_roundtrip(value in any::<u128>()) {
        let corr = CorrelationId::new(value);
        let json = serde_json::to_string(&corr).expect("serialize");
        // Always the fixed-width hex form
        prop_assert_eq!(json.len(), 34);

        let back: CorrelationId = serde_json::from_str(&json).expect("deserialize");
        prop_assert_eq!(back, corr);
    }

    #[test]
    fn prop_decode_never_panics(text in ".{0,256}") {
        let _ = ServerEvent::decode(&text);
    }
}
