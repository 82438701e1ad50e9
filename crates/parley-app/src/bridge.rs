//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`parley_client::Client`] and adapts it
//! to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`ClientCommand`]s, [`RestRequest`]s, and transport
//!   directives to be executed by the driver in the next I/O cycle.
//! - Interprets client actions and converts them back into
//!   [`crate::AppEvent`]s to update the UI, snapshotting the transcript on
//!   change.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic tests.

use parley_client::{Client, ClientAction, ClientConfig, ClientError, ClientEvent, ClientIdentity, RestOutcome};
use parley_core::env::Environment;
use parley_proto::{ClientCommand, ServerEvent, UserId, rest::RestRequest};

use crate::{AppAction, AppEvent};

/// Transport instructions for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportDirective {
    /// Open a broker connection authenticated with this token.
    Open {
        /// Bearer token for the broker handshake.
        token: String,
    },
    /// Tear down the live broker connection.
    Close,
}

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and deterministic
/// test time. The Instant type is determined by the Environment's associated
/// type.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<ClientCommand>,
    rest: Vec<RestRequest>,
    transport: Vec<TransportDirective>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge for the given user.
    pub fn new(env: E, user_id: UserId) -> Self {
        let client = Client::new(env, ClientIdentity::new(user_id), ClientConfig::default());
        Self { client, outgoing: Vec::new(), rest: Vec::new(), transport: Vec::new() }
    }

    /// Local user id.
    pub fn user_id(&self) -> UserId {
        self.client.user_id()
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::Connect { token } => {
                let result = self.client.handle(ClientEvent::Connect { token });
                self.handle_client_result(result)
            },
            AppAction::Disconnect => {
                let result = self.client.handle(ClientEvent::Disconnect);
                self.handle_client_result(result)
            },
            AppAction::OpenRoom { room_id } => {
                let result = self.client.handle(ClientEvent::JoinRoom { room_id });
                self.handle_client_result(result)
            },
            AppAction::CloseRoom => {
                let result = self.client.handle(ClientEvent::LeaveRoom);
                self.handle_client_result(result)
            },
            AppAction::DeleteRoom { room_id } => {
                let result = self.client.handle(ClientEvent::DeleteRoom { room_id });
                self.handle_client_result(result)
            },
            AppAction::SendMessage { body } => {
                let result = self.client.handle(ClientEvent::SendMessage { body });
                self.handle_client_result(result)
            },
            AppAction::Keystroke => {
                let result = self.client.handle(ClientEvent::Keystroke);
                self.handle_client_result(result)
            },
            AppAction::Render | AppAction::Quit => vec![],
        }
    }

    /// Handle an event from the broker connection.
    pub fn handle_broker_event(&mut self, event: ServerEvent) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Broker(event));
        self.handle_client_result(result)
    }

    /// The driver opened the broker connection.
    pub fn handle_transport_opened(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::TransportOpened);
        self.handle_client_result(result)
    }

    /// The broker connection closed or failed to open.
    pub fn handle_transport_closed(&mut self, reason: Option<String>) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::TransportClosed { reason });
        self.handle_client_result(result)
    }

    /// Handle the result of an executed REST request.
    pub fn handle_rest_outcome(&mut self, outcome: RestOutcome) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Rest(outcome));
        self.handle_client_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Take pending outgoing broker commands.
    pub fn take_outgoing(&mut self) -> Vec<ClientCommand> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take pending REST requests.
    pub fn take_rest_requests(&mut self) -> Vec<RestRequest> {
        std::mem::take(&mut self.rest)
    }

    /// Take pending transport directives.
    pub fn take_transport_directives(&mut self) -> Vec<TransportDirective> {
        std::mem::take(&mut self.transport)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Open { token } => {
                    self.transport.push(TransportDirective::Open { token });
                },
                ClientAction::CloseTransport => {
                    self.transport.push(TransportDirective::Close);
                },
                ClientAction::Emit(command) => {
                    self.outgoing.push(command);
                },
                ClientAction::Rest(request) => {
                    self.rest.push(request);
                },
                ClientAction::ConnectionChanged { state } => {
                    events.push(AppEvent::ConnectionChanged { state });
                },
                ClientAction::TranscriptUpdated { room_id } => {
                    events.push(AppEvent::TranscriptChanged {
                        room_id,
                        entries: self.client.transcript().to_vec(),
                    });
                },
                ClientAction::MembersChanged { room_id, members } => {
                    events.push(AppEvent::MembersChanged { room_id, members });
                },
                ClientAction::TypingChanged { room_id, typists } => {
                    events.push(AppEvent::TypingChanged { room_id, typists });
                },
                ClientAction::Notify { message } => {
                    events.push(AppEvent::Notice { message });
                },
                ClientAction::Log { message } => {
                    tracing::debug!(%message, "client");
                },
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use parley_core::env::test_utils::MockEnv;
    use parley_proto::RoomId;

    use super::*;

    fn connected_bridge() -> Bridge<MockEnv> {
        let mut bridge = Bridge::new(MockEnv::new(), 42);
        let _ = bridge.process_app_action(AppAction::Connect { token: "t".into() });
        let _ = bridge.handle_transport_opened();
        let _ = bridge.handle_broker_event(ServerEvent::ConnectAck { user_id: 42 });
        bridge
    }

    #[test]
    fn connect_produces_transport_open() {
        let mut bridge = Bridge::new(MockEnv::new(), 42);
        let _ = bridge.process_app_action(AppAction::Connect { token: "t".into() });

        assert_eq!(
            bridge.take_transport_directives(),
            vec![TransportDirective::Open { token: "t".into() }]
        );
    }

    #[test]
    fn send_message_produces_outgoing_command() {
        let mut bridge = connected_bridge();
        let _ = bridge.process_app_action(AppAction::OpenRoom { room_id: RoomId::from("order-1") });
        let _ = bridge.take_outgoing();

        let events = bridge.process_app_action(AppAction::SendMessage { body: "hello".into() });

        assert!(bridge
            .take_outgoing()
            .iter()
            .any(|c| matches!(c, ClientCommand::SendMessage { .. })));
        // The optimistic entry reaches the UI immediately
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::TranscriptChanged { entries, .. } if entries.len() == 1
        )));
    }

    #[test]
    fn send_without_room_produces_error_event() {
        let mut bridge = connected_bridge();
        let events = bridge.process_app_action(AppAction::SendMessage { body: "hello".into() });
        assert!(events.iter().any(|e| matches!(e, AppEvent::Error { .. })));
    }

    #[test]
    fn delete_room_queues_rest_request() {
        let mut bridge = connected_bridge();
        let _ = bridge.process_app_action(AppAction::OpenRoom { room_id: RoomId::from("order-1") });
        let _ = bridge.take_outgoing();
        let _ = bridge.take_rest_requests();

        let _ =
            bridge.process_app_action(AppAction::DeleteRoom { room_id: RoomId::from("order-1") });

        assert!(bridge
            .take_rest_requests()
            .iter()
            .any(|r| matches!(r, RestRequest::DeleteRoom { .. })));
        assert!(bridge
            .take_outgoing()
            .iter()
            .any(|c| matches!(c, ClientCommand::LeaveRoom { .. })));
    }

    #[test]
    fn join_response_surfaces_the_roster() {
        let mut bridge = connected_bridge();
        let _ = bridge.process_app_action(AppAction::OpenRoom { room_id: RoomId::from("order-1") });

        let events = bridge.handle_broker_event(ServerEvent::RoomJoined {
            room_id: RoomId::from("order-1"),
            members: vec![42, 7],
            history: vec![],
        });

        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::MembersChanged { members, .. } if members == &vec![7, 42]
        )));
    }

    #[test]
    fn offline_open_room_queues_rest_requests() {
        let mut bridge = Bridge::new(MockEnv::new(), 42);
        let _ = bridge.process_app_action(AppAction::OpenRoom { room_id: RoomId::from("order-1") });

        let rest = bridge.take_rest_requests();
        assert!(rest.iter().any(|r| matches!(r, RestRequest::RoomMessages { .. })));
        assert!(rest.iter().any(|r| matches!(r, RestRequest::MarkRead { .. })));
    }
}
