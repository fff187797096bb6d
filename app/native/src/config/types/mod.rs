//! Configuration types for Trellis.
//!
//! The window manager core only reads the fields defined here. Every struct
//! uses `#[serde(default)]` so partial configuration files are valid.

mod gaps;
mod rules;
mod workspaces;

use std::path::PathBuf;

pub use gaps::{GapValue, GapsConfig};
pub use rules::{MatchPattern, MatchStrategy, RuleAction, RuleSubject, WindowRule};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use workspaces::WorkspaceConfig;

/// Default resize step, in percentage points.
const DEFAULT_RESIZE_PERCENTAGE: u32 = 5;

/// Default distance a floating window moves per `move` command, in pixels.
const DEFAULT_FLOATING_MOVE_STEP: u32 = 50;

/// Default number of commands kept for fatal error reports.
const DEFAULT_COMMAND_HISTORY_SIZE: usize = 50;

/// General behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralConfig {
    /// Resize step for `resize grow|shrink`, in percentage points.
    pub resize_percentage: u32,

    /// Distance a floating window moves per `move <direction>`, in pixels.
    pub floating_move_step: u32,

    /// Center newly managed floating windows on their workspace.
    pub center_new_floating_windows: bool,

    /// File that fatal error reports are appended to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,

    /// Number of recent commands kept for error reports.
    pub command_history_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            resize_percentage: DEFAULT_RESIZE_PERCENTAGE,
            floating_move_step: DEFAULT_FLOATING_MOVE_STEP,
            center_new_floating_windows: true,
            error_log: None,
            command_history_size: DEFAULT_COMMAND_HISTORY_SIZE,
        }
    }
}

impl GeneralConfig {
    /// Returns the resize step as a fraction (5 -> 0.05).
    #[must_use]
    pub fn resize_step(&self) -> f64 { f64::from(self.resize_percentage) / 100.0 }
}

/// Edge of the monitor the bar is docked to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum BarPosition {
    /// Top edge.
    #[default]
    Top,
    /// Bottom edge.
    Bottom,
}

/// Space reserved for the status bar on every monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BarConfig {
    /// Bar height in pixels. `0` reserves nothing.
    pub height: u32,
    /// Edge the bar is docked to.
    pub position: BarPosition,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WmConfig {
    /// JSON schema reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// General behaviour settings.
    pub general: GeneralConfig,

    /// Inner and outer gaps.
    pub gaps: GapsConfig,

    /// Space reserved for the bar.
    pub bar: BarConfig,

    /// Workspaces, in declaration order.
    pub workspaces: Vec<WorkspaceConfig>,

    /// Window rules, evaluated in order.
    pub window_rules: Vec<WindowRule>,
}

impl WmConfig {
    /// Prepares rules for matching. Called once after loading.
    pub fn prepare(&mut self) {
        for rule in &mut self.window_rules {
            rule.prepare();
        }
    }

    /// Returns the action of the first rule matching the subject.
    #[must_use]
    pub fn rule_action_for(&self, subject: &RuleSubject<'_>) -> Option<RuleAction> {
        self.window_rules.iter().find(|rule| rule.matches(subject)).map(|rule| rule.action)
    }

    /// Returns the workspace config with the given name.
    #[must_use]
    pub fn workspace(&self, name: &str) -> Option<&WorkspaceConfig> {
        self.workspaces.iter().find(|ws| ws.name == name)
    }

    /// Returns the declaration index of the named workspace.
    #[must_use]
    pub fn workspace_index(&self, name: &str) -> Option<usize> {
        self.workspaces.iter().position(|ws| ws.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WmConfig::default();
        assert!(config.workspaces.is_empty());
        assert!(config.window_rules.is_empty());
        assert_eq!(config.general.resize_percentage, 5);
        assert!((config.general.resize_step() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let json = r#"{
            "windowRules": [
                { "title": { "value": "picture-in-picture", "strategy": "contains" }, "action": "floating" },
                { "processName": { "value": "firefox.exe" }, "action": "ignore" }
            ]
        }"#;
        let mut config: WmConfig = serde_json::from_str(json).unwrap();
        config.prepare();

        let subject = RuleSubject {
            process_name: "firefox.exe",
            class_name: "MozillaWindowClass",
            title: "Picture-in-Picture",
        };
        assert_eq!(config.rule_action_for(&subject), Some(RuleAction::Floating));

        let subject = RuleSubject { title: "Mozilla Firefox", ..subject };
        assert_eq!(config.rule_action_for(&subject), Some(RuleAction::Ignore));

        let subject = RuleSubject { process_name: "code.exe", ..subject };
        assert_eq!(config.rule_action_for(&subject), None);
    }

    #[test]
    fn test_workspace_lookup() {
        let config = WmConfig {
            workspaces: vec![WorkspaceConfig::named("1"), WorkspaceConfig::named("2")],
            ..Default::default()
        };
        assert_eq!(config.workspace_index("2"), Some(1));
        assert!(config.workspace("3").is_none());
    }
}
