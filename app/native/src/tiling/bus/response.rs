//! Result of a command invocation.

use serde::Serialize;
use uuid::Uuid;

use crate::error::WmError;

/// What the bus reports back for a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    /// Container focused once the command finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused_container_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WmError>,
}

impl CommandResponse {
    #[must_use]
    pub const fn success(focused_container_id: Option<Uuid>) -> Self {
        Self { success: true, focused_container_id, error: None }
    }

    #[must_use]
    pub const fn failure(error: WmError) -> Self {
        Self { success: false, focused_container_id: None, error: Some(error) }
    }

    /// Error message of a failed command.
    #[must_use]
    pub fn error_message(&self) -> Option<String> { self.error.as_ref().map(ToString::to_string) }
}
