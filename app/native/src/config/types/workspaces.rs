//! Workspace configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tiling::state::Layout;

/// Workspace configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Unique name for the workspace.
    pub name: String,

    /// Name shown by the bar and in IPC payloads. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Device name of the monitor this workspace prefers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_to_monitor: Option<String>,

    /// Keep the workspace active even when it has no windows.
    #[serde(default)]
    pub keep_alive: bool,

    /// Initial layout axis. If not specified, follows the monitor orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl WorkspaceConfig {
    /// Creates a workspace config with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Returns `true` if the workspace is bound to the given monitor.
    #[must_use]
    pub fn is_bound_to(&self, device_name: &str) -> bool {
        self.bind_to_monitor.as_deref().is_some_and(|bound| bound == device_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_config_defaults() {
        let config: WorkspaceConfig = serde_json::from_str(r#"{ "name": "1" }"#).unwrap();
        assert_eq!(config, WorkspaceConfig::named("1"));
        assert!(!config.keep_alive);
        assert!(config.layout.is_none());
    }

    #[test]
    fn test_is_bound_to() {
        let config: WorkspaceConfig = serde_json::from_str(
            r#"{ "name": "web", "bindToMonitor": "DISPLAY2", "keepAlive": true }"#,
        )
        .unwrap();
        assert!(config.is_bound_to("DISPLAY2"));
        assert!(!config.is_bound_to("DISPLAY1"));
        assert!(config.keep_alive);
    }
}
