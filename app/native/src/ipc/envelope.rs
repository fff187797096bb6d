//! Server message envelope.
//!
//! Every message sent to a client, reply or event alike, is a
//! [`ServerMessage`]. `data` is present only on success and `error` only on
//! failure; both serialize as `null` otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WmError, WmResult};
use crate::tiling::bus::{CommandResponse, Event};

/// Kind of server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    ClientResponse,
    SubscribedEvent,
}

/// A message sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub success: bool,
    pub message_type: MessageType,
    pub data: Option<Value>,
    pub error: Option<String>,
    /// The client message this answers, or the subscription an event
    /// belongs to.
    pub client_message: Option<String>,
}

impl ServerMessage {
    /// A successful reply.
    #[must_use]
    pub fn ok(client_message: &str, data: Value) -> Self {
        Self {
            success: true,
            message_type: MessageType::ClientResponse,
            data: Some(data),
            error: None,
            client_message: Some(client_message.to_string()),
        }
    }

    /// A failed reply.
    #[must_use]
    pub fn err(client_message: &str, error: &WmError) -> Self {
        Self {
            success: false,
            message_type: MessageType::ClientResponse,
            data: None,
            error: Some(error.to_string()),
            client_message: Some(client_message.to_string()),
        }
    }

    /// Wraps a query or serialization result.
    #[must_use]
    pub fn from_result(client_message: &str, result: WmResult<Value>) -> Self {
        match result {
            Ok(data) => Self::ok(client_message, data),
            Err(error) => Self::err(client_message, &error),
        }
    }

    /// Wraps a command response. Failed commands carry their error message.
    #[must_use]
    pub fn from_response(client_message: &str, response: &CommandResponse) -> Self {
        match &response.error {
            Some(error) if !response.success => Self::err(client_message, error),
            _ => Self::from_result(
                client_message,
                serde_json::to_value(response).map_err(WmError::from),
            ),
        }
    }

    /// Wraps an event delivered to a subscription.
    ///
    /// # Errors
    ///
    /// Fails with `Serialization` if the event cannot be encoded.
    pub fn event(subscription: &str, event: &Event) -> WmResult<Self> {
        Ok(Self {
            success: true,
            message_type: MessageType::SubscribedEvent,
            data: Some(serde_json::to_value(event)?),
            error: None,
            client_message: Some(subscription.to_string()),
        })
    }

    /// Encodes the envelope as one line of JSON.
    ///
    /// # Errors
    ///
    /// Fails with `Serialization` if encoding fails.
    pub fn to_json(&self) -> WmResult<String> { Ok(serde_json::to_string(self)?) }
}
