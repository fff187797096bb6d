//! Event subscriptions.
//!
//! A [`Subscription`] wraps a broadcast receiver taken from the bus and
//! yields `subscribed_event` envelopes for the event kinds the client asked
//! for. A subscriber that falls behind loses the oldest events and keeps
//! going.

use std::collections::HashSet;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use super::envelope::ServerMessage;
use crate::error::{WmError, WmResult};
use crate::tiling::bus::{Bus, Event, EventKind};

/// Which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Kinds(HashSet<EventKind>),
}

impl EventFilter {
    /// Builds a filter from event names; `all` selects every event.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidCommand` for unknown names or an empty list.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> WmResult<Self> {
        let mut kinds = HashSet::new();
        for name in names.iter().map(AsRef::as_ref).map(str::trim).filter(|name| !name.is_empty()) {
            if name == "all" {
                return Ok(Self::All);
            }
            let kind = EventKind::from_name(name)
                .ok_or_else(|| WmError::invalid(format!("unknown event \"{name}\"")))?;
            kinds.insert(kind);
        }

        if kinds.is_empty() {
            return Err(WmError::invalid("no events to subscribe to"));
        }
        Ok(Self::Kinds(kinds))
    }

    #[must_use]
    pub fn matches(&self, kind: EventKind) -> bool {
        match self {
            Self::All => true,
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

/// A client's event stream.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Event>,
    filter: EventFilter,
    client_message: String,
}

impl Subscription {
    /// Subscribes to `bus`. Only events emitted after this call are seen.
    #[must_use]
    pub fn new(bus: &Bus, filter: EventFilter, client_message: impl Into<String>) -> Self {
        Self { receiver: bus.subscribe(), filter, client_message: client_message.into() }
    }

    #[must_use]
    pub const fn filter(&self) -> &EventFilter { &self.filter }

    /// Waits for the next matching event. Returns `None` once the bus is
    /// gone.
    pub async fn next(&mut self) -> Option<ServerMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if let Some(message) = self.wrap(&event) {
                        return Some(message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, subscription = %self.client_message, "subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next matching event that is already queued, without
    /// waiting.
    pub fn try_next(&mut self) -> Option<ServerMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if let Some(message) = self.wrap(&event) {
                        return Some(message);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, subscription = %self.client_message, "subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    fn wrap(&self, event: &Event) -> Option<ServerMessage> {
        if !self.filter.matches(event.kind()) {
            return None;
        }
        match ServerMessage::event(&self.client_message, event) {
            Ok(message) => Some(message),
            Err(error) => {
                tracing::error!(%error, event = event.kind().name(), "failed to encode event");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!(EventFilter::parse(&["all"]).unwrap(), EventFilter::All);
        let filter = EventFilter::parse(&["focus_changed", " window_managed "]).unwrap();
        assert!(filter.matches(EventKind::FocusChanged));
        assert!(filter.matches(EventKind::WindowManaged));
        assert!(!filter.matches(EventKind::MonitorAdded));

        assert!(EventFilter::parse(&["focus_changd"]).is_err());
        assert!(EventFilter::parse::<&str>(&[]).is_err());
    }
}
