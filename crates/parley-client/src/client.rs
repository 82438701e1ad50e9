//! Client state machine.
//!
//! The `Client` is the top-level state machine tying the session layer to the
//! active-room controller, the transcript reconciliation layer, and the
//! typing machinery. It consumes [`ClientEvent`]s and returns
//! [`ClientAction`]s for the driver to execute; all I/O (transport, REST,
//! rendering) happens outside.

use parley_core::{Session, SessionAction, SessionConfig, env::Environment};
use parley_proto::{ClientCommand, CorrelationId, MAX_MESSAGE_LEN, RoomId, ServerEvent, UserId, WireMessage, rest::RestRequest};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent, RestOutcome},
    rooms::{ActiveRoom, RoomController, RoomSettings},
    transcript::Ingest,
};

/// Client identity.
///
/// The authenticated user's id, known from login before the broker
/// connection exists. Echo reconciliation keys off it.
#[derive(Debug, Clone, Copy)]
pub struct ClientIdentity {
    /// Backend-assigned user id.
    pub user_id: UserId,
}

impl ClientIdentity {
    /// Create an identity for the given user id.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Session layer configuration (heartbeat, backoff).
    pub session: SessionConfig,
    /// Per-room configuration (reconciliation windows, typing timers).
    pub rooms: RoomSettings,
}

/// Top-level chat client state machine.
pub struct Client<E: Environment> {
    /// Environment for time and randomness.
    env: E,

    /// Local user identity.
    identity: ClientIdentity,

    /// Broker connection lifecycle.
    session: Session<E::Instant>,

    /// Single active-room slot.
    rooms: RoomController<E::Instant>,
}

impl<E: Environment> Client<E> {
    /// Create a new client for the given identity.
    pub fn new(env: E, identity: ClientIdentity, config: ClientConfig) -> Self {
        Self {
            env,
            identity,
            session: Session::new(config.session),
            rooms: RoomController::new(config.rooms),
        }
    }

    /// Local user id.
    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    /// Current connection state, for the persistent UI indicator.
    pub fn connection_state(&self) -> parley_core::SessionState {
        self.session.state()
    }

    /// Currently active room id. `None` if no conversation is open.
    pub fn active_room(&self) -> Option<&RoomId> {
        self.rooms.active_id()
    }

    /// Visible transcript of the active room.
    pub fn transcript(&self) -> &[crate::transcript::Entry] {
        self.rooms.active().map_or(&[], |room| room.transcript.entries())
    }

    /// Users currently typing in the active room, sorted.
    pub fn typists(&self) -> Vec<UserId> {
        self.rooms.active().map_or_else(Vec::new, |room| room.typing.typists())
    }

    /// Known participants of the active room, sorted.
    pub fn members(&self) -> Vec<UserId> {
        self.rooms.active().map_or_else(Vec::new, ActiveRoom::member_list)
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let before = self.session.state();

        let mut actions = match event {
            ClientEvent::Connect { token } => self.handle_connect(&token),
            ClientEvent::Disconnect => self.handle_disconnect(),
            ClientEvent::TransportOpened => self.handle_transport_opened()?,
            ClientEvent::TransportClosed { reason } => self.handle_transport_closed(reason),
            ClientEvent::Broker(event) => self.handle_broker(event),
            ClientEvent::JoinRoom { room_id } => self.handle_join_room(room_id),
            ClientEvent::LeaveRoom => self.handle_leave_room()?,
            ClientEvent::DeleteRoom { room_id } => self.handle_delete_room(room_id),
            ClientEvent::SendMessage { body } => self.handle_send_message(body)?,
            ClientEvent::Keystroke => self.handle_keystroke()?,
            ClientEvent::Rest(outcome) => self.handle_rest_outcome(outcome),
            ClientEvent::Tick { now } => self.handle_tick(now),
        };

        let after = self.session.state();
        if before != after {
            actions.push(ClientAction::ConnectionChanged { state: after });
        }

        Ok(actions)
    }

    fn handle_connect(&mut self, token: &str) -> Vec<ClientAction> {
        let mut actions = lift(self.session.connect(token, self.env.now()));
        if token.is_empty() {
            actions.push(ClientAction::Log {
                message: "no auth token available, chat stays offline".to_string(),
            });
        }
        actions
    }

    fn handle_disconnect(&mut self) -> Vec<ClientAction> {
        let mut actions = lift(self.session.disconnect());
        actions.extend(self.clear_typing_indicators());
        actions
    }

    fn handle_transport_opened(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let mut actions = lift(self.session.handle_opened(self.env.now())?);

        if let Some(token) = self.session.token() {
            actions.push(ClientAction::Emit(ClientCommand::Authenticate {
                token: token.to_string(),
            }));
        }

        Ok(actions)
    }

    fn handle_transport_closed(&mut self, reason: Option<String>) -> Vec<ClientAction> {
        let mut actions = lift(self.session.handle_closed(self.env.now()));
        actions.extend(self.clear_typing_indicators());
        actions.push(ClientAction::Log {
            message: format!(
                "connection lost ({}), state now {:?}",
                reason.unwrap_or_else(|| "no reason".to_string()),
                self.session.state()
            ),
        });
        actions
    }

    /// Drop remote typing indicators; they cannot be refreshed while offline.
    fn clear_typing_indicators(&mut self) -> Vec<ClientAction> {
        let Some(room) = self.rooms.active_mut() else { return vec![] };
        if room.typing.typists().is_empty() {
            return vec![];
        }
        room.typing.clear();
        vec![ClientAction::TypingChanged { room_id: room.room_id.clone(), typists: vec![] }]
    }

    fn handle_broker(&mut self, event: ServerEvent) -> Vec<ClientAction> {
        let now = self.env.now();
        let local_user = self.identity.user_id;

        match event {
            ServerEvent::ConnectAck { user_id } => {
                let mut actions = Vec::new();
                if user_id != local_user {
                    actions.push(ClientAction::Log {
                        message: format!(
                            "broker acknowledged user {user_id}, expected {local_user}"
                        ),
                    });
                }
                // Re-join the open conversation after a reconnect; the join
                // response replaces any transcript gaps accumulated offline
                if let Some(room_id) = self.rooms.active_id() {
                    actions.push(ClientAction::Emit(ClientCommand::JoinRoom {
                        room_id: room_id.clone(),
                    }));
                }
                actions
            },

            ServerEvent::RoomJoined { room_id, members, history } => {
                let Some(room) = self.rooms.active_mut_for(&room_id) else {
                    return vec![ClientAction::Log {
                        message: format!("dropping stale join response for room {room_id}"),
                    }];
                };
                room.members = members.into_iter().collect();
                room.transcript.replace_history(history);
                vec![
                    ClientAction::MembersChanged {
                        room_id: room_id.clone(),
                        members: room.member_list(),
                    },
                    ClientAction::TranscriptUpdated { room_id },
                ]
            },

            ServerEvent::NewMessage { message } => self.ingest_confirmed(&message, now),

            ServerEvent::TypingStarted { room_id, user_id } => {
                if user_id == local_user {
                    return vec![];
                }
                let Some(room) = self.rooms.active_mut_for(&room_id) else { return vec![] };
                if room.typing.observe(user_id, now) {
                    vec![ClientAction::TypingChanged { room_id, typists: room.typing.typists() }]
                } else {
                    vec![]
                }
            },

            ServerEvent::TypingStopped { room_id, user_id } => {
                let Some(room) = self.rooms.active_mut_for(&room_id) else { return vec![] };
                if room.typing.stop(user_id) {
                    vec![ClientAction::TypingChanged { room_id, typists: room.typing.typists() }]
                } else {
                    vec![]
                }
            },

            ServerEvent::MemberJoined { room_id, user_id } => {
                let Some(room) = self.rooms.active_mut_for(&room_id) else { return vec![] };
                if !room.members.insert(user_id) {
                    return vec![];
                }
                vec![
                    ClientAction::MembersChanged {
                        room_id: room_id.clone(),
                        members: room.member_list(),
                    },
                    ClientAction::Log { message: format!("user {user_id} joined room {room_id}") },
                ]
            },

            ServerEvent::MemberLeft { room_id, user_id } => {
                let Some(room) = self.rooms.active_mut_for(&room_id) else { return vec![] };
                let mut actions = Vec::new();
                if room.members.remove(&user_id) {
                    actions.push(ClientAction::MembersChanged {
                        room_id: room_id.clone(),
                        members: room.member_list(),
                    });
                    actions.push(ClientAction::Log {
                        message: format!("user {user_id} left room {room_id}"),
                    });
                }
                // Whoever left cannot still be typing
                if room.typing.stop(user_id) {
                    actions.push(ClientAction::TypingChanged {
                        room_id,
                        typists: room.typing.typists(),
                    });
                }
                actions
            },

            ServerEvent::OrderStatus { room_id, status } => {
                let Some(room) = self.rooms.active_mut_for(&room_id) else {
                    return vec![ClientAction::Log {
                        message: format!("dropping order status for inactive room {room_id}"),
                    }];
                };
                room.transcript.push_system(status);
                vec![ClientAction::TranscriptUpdated { room_id }]
            },

            ServerEvent::Error { message } => vec![
                ClientAction::Notify { message: format!("chat error: {message}") },
                ClientAction::Log { message: format!("broker error: {message}") },
            ],

            // Absence of pongs is not a failure signal; nothing to track
            ServerEvent::Pong => vec![],
        }
    }

    /// Reconcile a server-confirmed message (broker echo or REST response).
    fn ingest_confirmed(&mut self, message: &WireMessage, now: E::Instant) -> Vec<ClientAction> {
        let local_user = self.identity.user_id;
        let Some(room) = self.rooms.active_mut_for(&message.room_id) else {
            // Room exclusivity: messages for rooms we are no longer viewing
            // must not reach the active transcript
            return vec![ClientAction::Log {
                message: format!("dropping message for inactive room {}", message.room_id),
            }];
        };

        let mut actions = Vec::new();

        // A message from someone ends their typing indicator
        if message.author_id != local_user && room.typing.stop(message.author_id) {
            actions.push(ClientAction::TypingChanged {
                room_id: room.room_id.clone(),
                typists: room.typing.typists(),
            });
        }

        match room.transcript.ingest(message, local_user, now) {
            Ingest::Duplicate => actions.push(ClientAction::Log {
                message: format!("dropping duplicate message {}", message.id),
            }),
            Ingest::Replaced(_) | Ingest::Appended(_) => {
                actions.push(ClientAction::TranscriptUpdated {
                    room_id: message.room_id.clone(),
                });
            },
        }

        actions
    }

    fn handle_join_room(&mut self, room_id: RoomId) -> Vec<ClientAction> {
        if self.rooms.is_active(&room_id) {
            return vec![ClientAction::Log {
                message: format!("room {room_id} is already active"),
            }];
        }

        let can_emit = self.session.can_emit();
        let previous = self.rooms.activate(room_id.clone());

        let mut actions = Vec::new();

        if let Some(previous) = previous {
            if can_emit {
                actions.push(ClientAction::Emit(ClientCommand::LeaveRoom { room_id: previous }));
            }
        }

        if can_emit {
            actions.push(ClientAction::Emit(ClientCommand::JoinRoom {
                room_id: room_id.clone(),
            }));
        } else {
            // Offline: fetch history over REST instead of waiting for a join
            actions.push(ClientAction::Rest(RestRequest::RoomMessages {
                room_id: room_id.clone(),
                page: 1,
            }));
            actions.push(ClientAction::Log {
                message: format!("joining room {room_id} offline, fetching history via REST"),
            });
        }

        actions.push(ClientAction::Rest(RestRequest::MarkRead { room_id: room_id.clone() }));
        actions.push(ClientAction::TranscriptUpdated { room_id });

        actions
    }

    fn handle_leave_room(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let room_id = self.rooms.deactivate().ok_or(ClientError::NoActiveRoom)?;

        let mut actions = Vec::new();
        if self.session.can_emit() {
            actions.push(ClientAction::Emit(ClientCommand::LeaveRoom {
                room_id: room_id.clone(),
            }));
        }
        actions.push(ClientAction::Log { message: format!("left room {room_id}") });

        Ok(actions)
    }

    fn handle_delete_room(&mut self, room_id: RoomId) -> Vec<ClientAction> {
        let mut actions = Vec::new();

        // Deleting the open conversation closes it first
        if self.rooms.is_active(&room_id) {
            self.rooms.deactivate();
            if self.session.can_emit() {
                actions.push(ClientAction::Emit(ClientCommand::LeaveRoom {
                    room_id: room_id.clone(),
                }));
            }
        }

        actions.push(ClientAction::Rest(RestRequest::DeleteRoom { room_id: room_id.clone() }));
        actions.push(ClientAction::Log { message: format!("deleting room {room_id}") });
        actions
    }

    fn handle_send_message(&mut self, body: String) -> Result<Vec<ClientAction>, ClientError> {
        if self.rooms.active_id().is_none() {
            return Err(ClientError::NoActiveRoom);
        }
        if body.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let len = body.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(ClientError::MessageTooLong { len });
        }

        let correlation_id = CorrelationId::new(self.env.random_u128());
        let now = self.env.now();
        let can_emit = self.session.can_emit();

        let Some(room) = self.rooms.active_mut() else {
            return Err(ClientError::NoActiveRoom);
        };
        let room_id = room.room_id.clone();

        // Optimistic append happens before the emit in either path
        room.transcript.push_local(correlation_id, self.identity.user_id, body.clone(), now);
        let stop_typing = room.debounce.message_sent();

        let mut actions = Vec::new();

        if stop_typing && can_emit {
            actions.push(ClientAction::Emit(ClientCommand::TypingStop {
                room_id: room_id.clone(),
            }));
        }

        if can_emit {
            actions.push(ClientAction::Emit(ClientCommand::SendMessage {
                room_id: room_id.clone(),
                correlation_id,
                body,
            }));
        } else {
            actions.push(ClientAction::Rest(RestRequest::SendMessage {
                room_id: room_id.clone(),
                correlation_id,
                body,
            }));
            actions.push(ClientAction::Log {
                message: format!("broker unavailable, sending to room {room_id} via REST"),
            });
        }

        actions.push(ClientAction::TranscriptUpdated { room_id });

        Ok(actions)
    }

    fn handle_keystroke(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let now = self.env.now();
        let can_emit = self.session.can_emit();
        let room = self.rooms.active_mut().ok_or(ClientError::NoActiveRoom)?;

        if room.debounce.keystroke(now) && can_emit {
            return Ok(vec![ClientAction::Emit(ClientCommand::TypingStart {
                room_id: room.room_id.clone(),
            })]);
        }

        Ok(vec![])
    }

    fn handle_rest_outcome(&mut self, outcome: RestOutcome) -> Vec<ClientAction> {
        let now = self.env.now();

        match outcome {
            RestOutcome::MessageSent { message } => self.ingest_confirmed(&message, now),

            RestOutcome::MessageFailed { correlation_id, reason } => {
                let Some(room) = self.rooms.active_mut() else {
                    return vec![ClientAction::Log {
                        message: format!("REST send failed after room closed: {reason}"),
                    }];
                };
                let room_id = room.room_id.clone();
                // A room switch drops pending tracking; a failure for a
                // departed room must not disturb the new room's view
                if !room.transcript.mark_unconfirmed(correlation_id) {
                    return vec![ClientAction::Log {
                        message: format!("REST send failed for untracked message: {reason}"),
                    }];
                }

                vec![
                    ClientAction::Notify {
                        message: "message could not be delivered".to_string(),
                    },
                    ClientAction::Log { message: format!("REST send failed: {reason}") },
                    ClientAction::TranscriptUpdated { room_id },
                ]
            },

            RestOutcome::HistoryFetched { room_id, messages } => {
                let Some(room) = self.rooms.active_mut_for(&room_id) else {
                    return vec![ClientAction::Log {
                        message: format!("dropping stale history page for room {room_id}"),
                    }];
                };

                // A live join may have raced this fetch and queued sends;
                // never wipe tracked pending entries with a REST page
                if room.transcript.pending_count() > 0 {
                    return vec![ClientAction::Log {
                        message: format!(
                            "keeping pending entries in room {room_id}, ignoring REST history"
                        ),
                    }];
                }

                room.transcript.replace_history(messages);
                vec![ClientAction::TranscriptUpdated { room_id }]
            },
        }
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        let mut actions = lift(self.session.tick(now));
        let can_emit = self.session.can_emit();

        if let Some(room) = self.rooms.active_mut() {
            let room_id = room.room_id.clone();

            let evicted = room.transcript.evict_stale(now);
            if !evicted.is_empty() {
                actions.push(ClientAction::Log {
                    message: format!(
                        "{} message(s) in room {room_id} unconfirmed after timeout",
                        evicted.len()
                    ),
                });
                actions.push(ClientAction::TranscriptUpdated { room_id: room_id.clone() });
            }

            if !room.typing.expire_stale(now).is_empty() {
                actions.push(ClientAction::TypingChanged {
                    room_id: room_id.clone(),
                    typists: room.typing.typists(),
                });
            }

            if room.debounce.tick(now) && can_emit {
                actions.push(ClientAction::Emit(ClientCommand::TypingStop { room_id }));
            }
        }

        actions
    }
}

fn lift(actions: Vec<SessionAction>) -> Vec<ClientAction> {
    actions
        .into_iter()
        .map(|action| match action {
            SessionAction::Open { token } => ClientAction::Open { token },
            SessionAction::Close => ClientAction::CloseTransport,
            SessionAction::SendPing => ClientAction::Emit(ClientCommand::Ping),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_core::{SessionState, env::test_utils::MockEnv};

    use super::*;

    const LOCAL: UserId = 42;

    fn client() -> (MockEnv, Client<MockEnv>) {
        let env = MockEnv::new();
        let client =
            Client::new(env.clone(), ClientIdentity::new(LOCAL), ClientConfig::default());
        (env, client)
    }

    fn connected_client() -> (MockEnv, Client<MockEnv>) {
        let (env, mut client) = client();
        client.handle(ClientEvent::Connect { token: "t".into() }).unwrap();
        client.handle(ClientEvent::TransportOpened).unwrap();
        client.handle(ClientEvent::Broker(ServerEvent::ConnectAck { user_id: LOCAL })).unwrap();
        (env, client)
    }

    #[test]
    fn connect_opens_and_authenticates() {
        let (_env, mut client) = client();

        let actions = client.handle(ClientEvent::Connect { token: "t".into() }).unwrap();
        assert!(actions.iter().any(|a| matches!(a, ClientAction::Open { .. })));
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::ConnectionChanged { state: SessionState::Connecting }
        )));

        let actions = client.handle(ClientEvent::TransportOpened).unwrap();
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Emit(ClientCommand::Authenticate { .. })
        )));
        assert_eq!(client.connection_state(), SessionState::Connected);
    }

    #[test]
    fn missing_token_degrades_to_disconnected() {
        let (_env, mut client) = client();

        let actions = client.handle(ClientEvent::Connect { token: String::new() }).unwrap();
        assert!(!actions.iter().any(|a| matches!(a, ClientAction::Open { .. })));
        assert_eq!(client.connection_state(), SessionState::Disconnected);
    }

    #[test]
    fn send_without_room_is_an_error() {
        let (_env, mut client) = connected_client();
        let result = client.handle(ClientEvent::SendMessage { body: "hello".into() });
        assert_eq!(result, Err(ClientError::NoActiveRoom));
    }

    #[test]
    fn oversized_body_is_rejected() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        let result = client.handle(ClientEvent::SendMessage { body: "x".repeat(1001) });
        assert_eq!(result, Err(ClientError::MessageTooLong { len: 1001 }));
    }

    #[test]
    fn join_emits_leave_for_previous_room() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-a") }).unwrap();

        let actions = client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-b") }).unwrap();
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Emit(ClientCommand::LeaveRoom { room_id }) if room_id.as_str() == "order-a"
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Emit(ClientCommand::JoinRoom { room_id }) if room_id.as_str() == "order-b"
        )));
        assert_eq!(client.active_room(), Some(&RoomId::from("order-b")));
    }

    #[test]
    fn offline_send_falls_back_to_rest() {
        let (_env, mut client) = client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        let actions = client.handle(ClientEvent::SendMessage { body: "hi".into() }).unwrap();
        assert!(actions.iter().any(|a| matches!(a, ClientAction::Rest(RestRequest::SendMessage { .. }))));
        assert!(!actions.iter().any(|a| matches!(a, ClientAction::Emit(_))));

        // Optimistically visible
        assert_eq!(client.transcript().len(), 1);
        assert!(client.transcript()[0].is_pending());
    }

    #[test]
    fn keystrokes_emit_one_typing_start() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        let first = client.handle(ClientEvent::Keystroke).unwrap();
        assert!(first.iter().any(|a| matches!(
            a,
            ClientAction::Emit(ClientCommand::TypingStart { .. })
        )));

        let second = client.handle(ClientEvent::Keystroke).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn member_events_update_roster() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();
        client
            .handle(ClientEvent::Broker(ServerEvent::RoomJoined {
                room_id: RoomId::from("order-1"),
                members: vec![LOCAL, 7],
                history: vec![],
            }))
            .unwrap();
        assert_eq!(client.members(), vec![7, LOCAL]);

        let actions = client
            .handle(ClientEvent::Broker(ServerEvent::MemberJoined {
                room_id: RoomId::from("order-1"),
                user_id: 9,
            }))
            .unwrap();
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::MembersChanged { members, .. } if members == &vec![7, 9, LOCAL]
        )));
        assert_eq!(client.members(), vec![7, 9, LOCAL]);

        // A typist who leaves drops off both the roster and the typing line
        client
            .handle(ClientEvent::Broker(ServerEvent::TypingStarted {
                room_id: RoomId::from("order-1"),
                user_id: 9,
            }))
            .unwrap();
        let actions = client
            .handle(ClientEvent::Broker(ServerEvent::MemberLeft {
                room_id: RoomId::from("order-1"),
                user_id: 9,
            }))
            .unwrap();
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::MembersChanged { members, .. } if members == &vec![7, LOCAL]
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::TypingChanged { typists, .. } if typists.is_empty()
        )));
        assert_eq!(client.members(), vec![7, LOCAL]);
    }

    #[test]
    fn member_events_for_other_rooms_are_ignored() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        let actions = client
            .handle(ClientEvent::Broker(ServerEvent::MemberJoined {
                room_id: RoomId::from("order-2"),
                user_id: 9,
            }))
            .unwrap();
        assert!(actions.is_empty());
        assert!(client.members().is_empty());
    }

    #[test]
    fn deleting_active_room_closes_it() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        let actions =
            client.handle(ClientEvent::DeleteRoom { room_id: RoomId::from("order-1") }).unwrap();
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Emit(ClientCommand::LeaveRoom { room_id }) if room_id.as_str() == "order-1"
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Rest(RestRequest::DeleteRoom { room_id }) if room_id.as_str() == "order-1"
        )));
        assert_eq!(client.active_room(), None);
    }

    #[test]
    fn deleting_inactive_room_only_calls_rest() {
        let (_env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        let actions =
            client.handle(ClientEvent::DeleteRoom { room_id: RoomId::from("order-2") }).unwrap();
        assert!(!actions.iter().any(|a| matches!(a, ClientAction::Emit(_))));
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Rest(RestRequest::DeleteRoom { room_id }) if room_id.as_str() == "order-2"
        )));
        assert_eq!(client.active_room(), Some(&RoomId::from("order-1")));
    }

    #[test]
    fn connect_ack_rejoins_active_room() {
        let (env, mut client) = connected_client();
        client.handle(ClientEvent::JoinRoom { room_id: RoomId::from("order-1") }).unwrap();

        // Drop and reconnect
        client.handle(ClientEvent::TransportClosed { reason: None }).unwrap();
        env.advance(std::time::Duration::from_secs(5));
        client.handle(ClientEvent::Tick { now: env.now() }).unwrap();
        client.handle(ClientEvent::TransportOpened).unwrap();

        let actions = client
            .handle(ClientEvent::Broker(ServerEvent::ConnectAck { user_id: LOCAL }))
            .unwrap();
        assert!(actions.iter().any(|a| matches!(
            a,
            ClientAction::Emit(ClientCommand::JoinRoom { room_id }) if room_id.as_str() == "order-1"
        )));
    }
}
