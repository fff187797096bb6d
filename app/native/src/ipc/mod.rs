//! Client-facing message layer.
//!
//! Transport-agnostic: a server reads one message per line from whatever
//! channel it owns, passes it to [`handle_client_message`] and writes back
//! the JSON of the returned envelope. Subscriptions hand back a
//! [`Subscription`] the server then drains into the same channel.

pub mod command_parser;
pub mod dto;
pub mod envelope;
pub mod message;
pub mod session;

pub use command_parser::parse_command;
pub use dto::{ContainerDto, ContainerKindDto, WindowDto};
pub use envelope::{MessageType, ServerMessage};
pub use message::{ClientMessage, Query, Request, parse_message};
use serde_json::Value;
pub use session::{EventFilter, Subscription};

use crate::error::{WmError, WmResult};
use crate::tiling::Bus;
use crate::tiling::services::{monitors, windows, workspaces};
use crate::tiling::state::{ContainerId, WmState};

/// Outcome of a client message.
#[derive(Debug)]
pub enum ClientReply {
    /// A single reply.
    Response(ServerMessage),
    /// An acknowledgement followed by a stream of events.
    Subscribed { ack: ServerMessage, subscription: Subscription },
}

impl ClientReply {
    /// The immediate reply.
    #[must_use]
    pub const fn message(&self) -> &ServerMessage {
        match self {
            Self::Response(message) | Self::Subscribed { ack: message, .. } => message,
        }
    }
}

/// Parses and runs one client message against `bus`.
///
/// Errors never escape: they come back as unsuccessful envelopes.
#[must_use]
pub fn handle_client_message(bus: &Bus, raw: &str) -> ClientReply {
    let message = match parse_message(raw) {
        Ok(message) => message,
        Err(error) => {
            tracing::debug!(%error, raw, "rejected client message");
            return ClientReply::Response(ServerMessage::err(raw, &error));
        }
    };

    match message.request {
        Request::Command { words } => {
            let text = words.join(" ");
            let reply = match parse_command(&text, None).and_then(|command| bus.invoke(command)) {
                Ok(response) => ServerMessage::from_response(raw, &response),
                Err(error) => ServerMessage::err(raw, &error),
            };
            ClientReply::Response(reply)
        }
        Request::Subscribe { events } => match EventFilter::parse(&events) {
            Ok(filter) => {
                let subscription = Subscription::new(bus, filter, raw);
                tracing::debug!(raw, "client subscribed");
                ClientReply::Subscribed { ack: ServerMessage::ok(raw, Value::Null), subscription }
            }
            Err(error) => ClientReply::Response(ServerMessage::err(raw, &error)),
        },
        Request::Get(query) => {
            let result = bus.with_state(|state| run_query(state, query));
            ClientReply::Response(ServerMessage::from_result(raw, result))
        }
    }
}

/// Snapshots the containers a query selects.
///
/// # Errors
///
/// Fails with `ContainerNotFound` for `focused` when nothing is focused.
pub fn run_query(state: &WmState, query: Query) -> WmResult<Value> {
    let ids: Vec<ContainerId> = match query {
        Query::Monitors => monitors(&state.tree),
        Query::Workspaces => workspaces(&state.tree),
        Query::Windows => windows(&state.tree, state.tree.root()),
        Query::Focused => {
            let focused = state
                .focused_container()
                .ok_or_else(|| WmError::not_found("no container is focused"))?;
            let dto = dto::snapshot(state, focused)
                .ok_or_else(|| WmError::not_found("focused container"))?;
            return Ok(serde_json::to_value(dto)?);
        }
    };

    let snapshots: Vec<ContainerDto> =
        ids.into_iter().filter_map(|id| dto::snapshot(state, id)).collect();
    Ok(serde_json::to_value(snapshots)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::handlers::test_support::Fixture;

    #[test]
    fn test_queries_return_snapshots() {
        let mut fx = Fixture::new(&["1", "2"]);
        fx.tiling(1);
        fx.tiling(2);

        let monitors = run_query(&fx.state, Query::Monitors).unwrap();
        assert_eq!(monitors.as_array().unwrap().len(), 1);
        assert_eq!(monitors[0]["type"], "monitor");

        let workspaces = run_query(&fx.state, Query::Workspaces).unwrap();
        assert_eq!(workspaces[0]["name"], "1");

        let windows = run_query(&fx.state, Query::Windows).unwrap();
        let handles: Vec<u64> =
            windows.as_array().unwrap().iter().filter_map(|w| w["handle"].as_u64()).collect();
        assert_eq!(handles, [1, 2]);

        let focused = run_query(&fx.state, Query::Focused).unwrap();
        assert_eq!(focused["handle"], 2);
    }
}
