//! WebSocket transport for the client.
//!
//! Provides [`BrokerConnection`] which handles WebSocket I/O for the broker
//! protocol. This is a thin layer that just sends commands and receives
//! events as JSON text frames; protocol logic remains in the Sans-IO
//! [`Client`](crate::Client).

use futures_util::{SinkExt, StreamExt};
use parley_proto::{ClientCommand, ServerEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// WebSocket stream error.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Handle to a live broker connection.
///
/// Commands and events flow through the channels; an internal task handles
/// the WebSocket I/O. Dropping the receiver or calling [`stop`] tears the
/// connection down.
///
/// [`stop`]: BrokerConnection::stop
pub struct BrokerConnection {
    /// Send commands to the broker.
    pub to_broker: mpsc::Sender<ClientCommand>,
    /// Receive events from the broker. `None` marks the stream end.
    pub from_broker: mpsc::Receiver<ServerEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl BrokerConnection {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a chat broker over WebSocket.
pub async fn connect(url: &str) -> Result<BrokerConnection, TransportError> {
    let (stream, _response) = connect_async(url)
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    let (to_broker_tx, to_broker_rx) = mpsc::channel::<ClientCommand>(32);
    let (from_broker_tx, from_broker_rx) = mpsc::channel::<ServerEvent>(32);

    let handle = tokio::spawn(run_connection(stream, to_broker_rx, from_broker_tx));

    Ok(BrokerConnection {
        to_broker: to_broker_tx,
        from_broker: from_broker_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the WebSocket.
async fn run_connection(
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    mut to_broker: mpsc::Receiver<ClientCommand>,
    from_broker: mpsc::Sender<ServerEvent>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            command = to_broker.recv() => {
                let Some(command) = command else { break };
                let text = match command.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "dropping unencodable command");
                        continue;
                    },
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!(error = %e, "send failed, closing connection");
                    break;
                }
            },

            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match ServerEvent::decode(&text) {
                            Ok(event) => {
                                if from_broker.send(event).await.is_err() {
                                    break;
                                }
                            },
                            // Unknown events from newer brokers are skipped,
                            // not fatal
                            Err(e) => debug!(error = %e, "skipping undecodable event"),
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {},
                    Some(Err(e)) => {
                        warn!(error = %e, "receive failed, closing connection");
                        break;
                    },
                }
            },
        }
    }
}
