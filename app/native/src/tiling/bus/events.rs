//! Events published on the bus.
//!
//! OS events carry only a window handle (or the new monitor set) and are
//! turned into commands by the reconciler. Window manager events carry DTO
//! snapshots taken under the state lock, so subscribers never see live
//! state.

use serde::Serialize;
use uuid::Uuid;

use crate::ipc::dto::ContainerDto;
use crate::platform::MonitorInfo;
use crate::tiling::state::{Layout, WindowHandle};

/// Something that happened, either in the OS or in the window manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    // OS notifications
    WindowShown { handle: WindowHandle },
    WindowHidden { handle: WindowHandle },
    WindowDestroyed { handle: WindowHandle },
    WindowFocused { handle: WindowHandle },
    WindowMinimized { handle: WindowHandle },
    WindowMinimizeEnded { handle: WindowHandle },
    WindowLocationChanged { handle: WindowHandle },
    WindowTitleChanged { handle: WindowHandle },
    DisplaySettingsChanged { monitors: Vec<MonitorInfo> },

    // Window manager notifications
    FocusChanged { focused_container: ContainerDto },
    WorkspaceActivated { activated_workspace: ContainerDto },
    WorkspaceDeactivated { deactivated_id: Uuid, deactivated_name: String },
    MonitorAdded { added_monitor: ContainerDto },
    MonitorRemoved { removed_id: Uuid, removed_device_name: String },
    TilingDirectionChanged { container: ContainerDto, new_layout: Layout },
    WindowManaged { managed_window: ContainerDto },
    WindowUnmanaged { unmanaged_id: Uuid, unmanaged_handle: WindowHandle },
    UserConfigReloaded,
    ApplicationExiting,
}

/// Fieldless mirror of [`Event`], used for handler tables and subscription
/// filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    WindowShown,
    WindowHidden,
    WindowDestroyed,
    WindowFocused,
    WindowMinimized,
    WindowMinimizeEnded,
    WindowLocationChanged,
    WindowTitleChanged,
    DisplaySettingsChanged,
    FocusChanged,
    WorkspaceActivated,
    WorkspaceDeactivated,
    MonitorAdded,
    MonitorRemoved,
    TilingDirectionChanged,
    WindowManaged,
    WindowUnmanaged,
    UserConfigReloaded,
    ApplicationExiting,
}

impl EventKind {
    pub const ALL: [Self; 19] = [
        Self::WindowShown,
        Self::WindowHidden,
        Self::WindowDestroyed,
        Self::WindowFocused,
        Self::WindowMinimized,
        Self::WindowMinimizeEnded,
        Self::WindowLocationChanged,
        Self::WindowTitleChanged,
        Self::DisplaySettingsChanged,
        Self::FocusChanged,
        Self::WorkspaceActivated,
        Self::WorkspaceDeactivated,
        Self::MonitorAdded,
        Self::MonitorRemoved,
        Self::TilingDirectionChanged,
        Self::WindowManaged,
        Self::WindowUnmanaged,
        Self::UserConfigReloaded,
        Self::ApplicationExiting,
    ];

    /// Name used in subscriptions and in the serialized `event_type`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WindowShown => "window_shown",
            Self::WindowHidden => "window_hidden",
            Self::WindowDestroyed => "window_destroyed",
            Self::WindowFocused => "window_focused",
            Self::WindowMinimized => "window_minimized",
            Self::WindowMinimizeEnded => "window_minimize_ended",
            Self::WindowLocationChanged => "window_location_changed",
            Self::WindowTitleChanged => "window_title_changed",
            Self::DisplaySettingsChanged => "display_settings_changed",
            Self::FocusChanged => "focus_changed",
            Self::WorkspaceActivated => "workspace_activated",
            Self::WorkspaceDeactivated => "workspace_deactivated",
            Self::MonitorAdded => "monitor_added",
            Self::MonitorRemoved => "monitor_removed",
            Self::TilingDirectionChanged => "tiling_direction_changed",
            Self::WindowManaged => "window_managed",
            Self::WindowUnmanaged => "window_unmanaged",
            Self::UserConfigReloaded => "user_config_reloaded",
            Self::ApplicationExiting => "application_exiting",
        }
    }

    /// Looks a kind up by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns `true` for notifications that originate in the OS.
    #[must_use]
    pub const fn is_platform(self) -> bool {
        matches!(
            self,
            Self::WindowShown
                | Self::WindowHidden
                | Self::WindowDestroyed
                | Self::WindowFocused
                | Self::WindowMinimized
                | Self::WindowMinimizeEnded
                | Self::WindowLocationChanged
                | Self::WindowTitleChanged
                | Self::DisplaySettingsChanged
        )
    }
}

impl Event {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::WindowShown { .. } => EventKind::WindowShown,
            Self::WindowHidden { .. } => EventKind::WindowHidden,
            Self::WindowDestroyed { .. } => EventKind::WindowDestroyed,
            Self::WindowFocused { .. } => EventKind::WindowFocused,
            Self::WindowMinimized { .. } => EventKind::WindowMinimized,
            Self::WindowMinimizeEnded { .. } => EventKind::WindowMinimizeEnded,
            Self::WindowLocationChanged { .. } => EventKind::WindowLocationChanged,
            Self::WindowTitleChanged { .. } => EventKind::WindowTitleChanged,
            Self::DisplaySettingsChanged { .. } => EventKind::DisplaySettingsChanged,
            Self::FocusChanged { .. } => EventKind::FocusChanged,
            Self::WorkspaceActivated { .. } => EventKind::WorkspaceActivated,
            Self::WorkspaceDeactivated { .. } => EventKind::WorkspaceDeactivated,
            Self::MonitorAdded { .. } => EventKind::MonitorAdded,
            Self::MonitorRemoved { .. } => EventKind::MonitorRemoved,
            Self::TilingDirectionChanged { .. } => EventKind::TilingDirectionChanged,
            Self::WindowManaged { .. } => EventKind::WindowManaged,
            Self::WindowUnmanaged { .. } => EventKind::WindowUnmanaged,
            Self::UserConfigReloaded => EventKind::UserConfigReloaded,
            Self::ApplicationExiting => EventKind::ApplicationExiting,
        }
    }

    /// Handle carried by an OS window notification.
    #[must_use]
    pub const fn window_handle(&self) -> Option<WindowHandle> {
        match self {
            Self::WindowShown { handle }
            | Self::WindowHidden { handle }
            | Self::WindowDestroyed { handle }
            | Self::WindowFocused { handle }
            | Self::WindowMinimized { handle }
            | Self::WindowMinimizeEnded { handle }
            | Self::WindowLocationChanged { handle }
            | Self::WindowTitleChanged { handle } => Some(*handle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("all"), None);
    }

    #[test]
    fn test_serialized_tag_matches_kind_name() {
        let event = Event::WindowShown { handle: WindowHandle(7) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], event.kind().name());
        assert_eq!(json["handle"], 7);

        let json = serde_json::to_value(Event::ApplicationExiting).unwrap();
        assert_eq!(json["event_type"], "application_exiting");
    }

    #[test]
    fn test_platform_classification() {
        assert!(EventKind::WindowFocused.is_platform());
        assert!(!EventKind::FocusChanged.is_platform());
        assert_eq!(Event::WindowHidden { handle: WindowHandle(3) }.window_handle(), Some(WindowHandle(3)));
        assert_eq!(Event::UserConfigReloaded.window_handle(), None);
    }
}
