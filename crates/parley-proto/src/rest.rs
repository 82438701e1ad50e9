//! REST fallback API types.
//!
//! The client core never performs HTTP itself; it produces [`RestRequest`]
//! descriptions as actions and the driver executes them with whatever HTTP
//! stack the host application uses. Every response arrives wrapped in the
//! backend's uniform [`Envelope`].

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::ids::{CorrelationId, RoomId};

/// Uniform response envelope returned by every REST endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,

    /// Payload, present on success.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Human-readable status or error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope into its payload.
    pub fn into_result(self) -> Result<T, RestError> {
        if self.success {
            self.data.ok_or(RestError::MissingData)
        } else {
            Err(RestError::Rejected {
                message: self.message.unwrap_or_else(|| "request failed".to_string()),
            })
        }
    }
}

/// Failure while interpreting a REST response.
#[derive(Debug, Error)]
pub enum RestError {
    /// The backend reported failure.
    #[error("backend rejected request: {message}")]
    Rejected {
        /// Backend-supplied error text.
        message: String,
    },

    /// A successful envelope arrived without a payload.
    #[error("successful response carried no data")]
    MissingData,
}

/// A REST call the driver should perform on the client's behalf.
///
/// `POST` message is the fallback path used only while the live connection
/// is down; everything else is ordinary request/response traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestRequest {
    /// `GET` the caller's room list.
    ListRooms,

    /// `GET` one page of a room's messages.
    RoomMessages {
        /// Room to page through.
        room_id: RoomId,
        /// 1-based page number.
        page: u32,
    },

    /// `POST` a message when the broker connection is unavailable.
    SendMessage {
        /// Target room.
        room_id: RoomId,
        /// Correlation id matching the pending transcript entry.
        correlation_id: CorrelationId,
        /// Message body.
        body: String,
    },

    /// `PATCH` a room as read.
    MarkRead {
        /// Room to mark.
        room_id: RoomId,
    },

    /// `DELETE` a room/conversation.
    DeleteRoom {
        /// Room to delete.
        room_id: RoomId,
    },
}

impl RestRequest {
    /// HTTP method for this request.
    pub fn method(&self) -> &'static str {
        match self {
            Self::ListRooms | Self::RoomMessages { .. } => "GET",
            Self::SendMessage { .. } => "POST",
            Self::MarkRead { .. } => "PATCH",
            Self::DeleteRoom { .. } => "DELETE",
        }
    }

    /// Request path relative to the API root.
    pub fn path(&self) -> String {
        match self {
            Self::ListRooms => "/chat/rooms".to_string(),
            Self::RoomMessages { room_id, page } => {
                format!("/chat/rooms/{room_id}/messages?page={page}")
            },
            Self::SendMessage { room_id, .. } => format!("/chat/rooms/{room_id}/messages"),
            Self::MarkRead { room_id } => format!("/chat/rooms/{room_id}/read"),
            Self::DeleteRoom { room_id } => format!("/chat/rooms/{room_id}"),
        }
    }

    /// JSON request body, if the method carries one.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            Self::SendMessage { correlation_id, body, .. } => Some(json!({
                "correlation_id": correlation_id.to_string(),
                "body": body,
            })),
            _ => None,
        }
    }
}
