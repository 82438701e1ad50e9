//! Fuzz target for the Client state machine
//!
//! Drive the client with arbitrary interleavings of lifecycle events, broker
//! events, and user operations (HIGH priority)
//!
//! # Strategy
//!
//! - Lifecycle: connect/disconnect/opened/closed in any order
//! - Broker events: joins, echoes with colliding ids, typing storms
//! - User ops: sends, room switches, keystrokes, clock advances
//!
//! # Invariants
//!
//! - The client never panics and never returns anything but a typed error
//! - The visible transcript of the active room only grows between switches
//! - A confirmed server id never appears twice in the transcript

#![no_main]

use std::collections::HashSet;
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_client::{Client, ClientConfig, ClientEvent, ClientIdentity, Delivery};
use parley_core::env::{test_utils::MockEnv, Environment};
use parley_proto::{CorrelationId, MessageId, RoomId, ServerEvent, WireMessage};

const LOCAL: u64 = 1;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Connect { empty_token: bool },
    Disconnect,
    TransportOpened,
    TransportClosed,
    JoinRoom { room: u8 },
    LeaveRoom,
    Send { body: u8 },
    Keystroke,
    Advance { seconds: u8 },
    RoomJoined { room: u8, history_len: u8 },
    Echo { room: u8, id: u8, corr: Option<u8>, local_author: bool, body: u8 },
    TypingStarted { room: u8, user: u8 },
    TypingStopped { room: u8, user: u8 },
    MemberJoined { room: u8, user: u8 },
    MemberLeft { room: u8, user: u8 },
    OrderStatus { room: u8 },
    BrokerError,
    Pong,
}

fn room_id(index: u8) -> RoomId {
    RoomId::from(format!("order-{}", index % 4).as_str())
}

fn message(room: u8, id: u8, corr: Option<u8>, local_author: bool, body: u8) -> WireMessage {
    WireMessage {
        id: MessageId::from(format!("srv-{id}").as_str()),
        correlation_id: corr.map(|c| CorrelationId::new(u128::from(c))),
        room_id: room_id(room),
        author_id: if local_author { LOCAL } else { u64::from(id) + 2 },
        body: format!("body-{body}"),
        sent_at_ms: 0,
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let env = MockEnv::new();
    let mut client = Client::new(env.clone(), ClientIdentity::new(LOCAL), ClientConfig::default());

    let mut room_floor = 0usize;

    for op in ops {
        let event = match op {
            Op::Connect { empty_token } => ClientEvent::Connect {
                token: if empty_token { String::new() } else { "token".to_string() },
            },
            Op::Disconnect => ClientEvent::Disconnect,
            Op::TransportOpened => ClientEvent::TransportOpened,
            Op::TransportClosed => ClientEvent::TransportClosed { reason: None },
            Op::JoinRoom { room } => {
                room_floor = 0;
                ClientEvent::JoinRoom { room_id: room_id(room) }
            },
            Op::LeaveRoom => {
                room_floor = 0;
                ClientEvent::LeaveRoom
            },
            Op::Send { body } => ClientEvent::SendMessage { body: format!("body-{body}") },
            Op::Keystroke => ClientEvent::Keystroke,
            Op::Advance { seconds } => {
                env.advance(Duration::from_secs(u64::from(seconds)));
                ClientEvent::Tick { now: env.now() }
            },
            Op::RoomJoined { room, history_len } => {
                room_floor = 0;
                ClientEvent::Broker(ServerEvent::RoomJoined {
                    room_id: room_id(room),
                    members: vec![LOCAL],
                    history: (0..history_len % 8)
                        .map(|i| message(room, i, None, false, i))
                        .collect(),
                })
            },
            Op::Echo { room, id, corr, local_author, body } => {
                ClientEvent::Broker(ServerEvent::NewMessage {
                    message: message(room, id, corr, local_author, body),
                })
            },
            Op::TypingStarted { room, user } => ClientEvent::Broker(ServerEvent::TypingStarted {
                room_id: room_id(room),
                user_id: u64::from(user),
            }),
            Op::TypingStopped { room, user } => ClientEvent::Broker(ServerEvent::TypingStopped {
                room_id: room_id(room),
                user_id: u64::from(user),
            }),
            Op::MemberJoined { room, user } => ClientEvent::Broker(ServerEvent::MemberJoined {
                room_id: room_id(room),
                user_id: u64::from(user),
            }),
            Op::MemberLeft { room, user } => ClientEvent::Broker(ServerEvent::MemberLeft {
                room_id: room_id(room),
                user_id: u64::from(user),
            }),
            Op::OrderStatus { room } => ClientEvent::Broker(ServerEvent::OrderStatus {
                room_id: room_id(room),
                status: "shipped".to_string(),
            }),
            Op::BrokerError => {
                ClientEvent::Broker(ServerEvent::Error { message: "nope".to_string() })
            },
            Op::Pong => ClientEvent::Broker(ServerEvent::Pong),
        };

        // Errors are fine; panics are not
        let _ = client.handle(event);

        // Transcript only grows between room switches and replacements
        let len = client.transcript().len();
        assert!(len >= room_floor || len == 0, "transcript shrank: {len} < {room_floor}");
        room_floor = len;

        // No confirmed server id appears twice
        let mut seen = HashSet::new();
        for entry in client.transcript() {
            if let Delivery::Confirmed(id) = &entry.delivery {
                assert!(seen.insert(id.clone()), "duplicate confirmed id {id}");
            }
        }
    }
});
