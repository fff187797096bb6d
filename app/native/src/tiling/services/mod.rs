//! Domain services.
//!
//! Read-only queries over the container tree that handlers and the
//! reconciler share: ancestor lookups, directional search across containers
//! and monitors, workspace activation order and the should-manage filter.

pub mod container;
pub mod monitor;
pub mod window;
pub mod workspace;

pub use container::{
    ancestor_along_axis, descendant_in_direction, is_displayed, monitor_of, sibling_in_direction,
    tiling_focus_target, workspace_of,
};
pub use monitor::{
    displayed_workspace, focused_monitor, monitor_at_point, monitor_by_device_name,
    monitor_in_direction, monitors,
};
pub use window::{floating_in_direction, should_manage, windows, windows_where};
pub use workspace::{
    compare_names, focused_workspace, inactive_configs, insertion_index, sorted_workspaces,
    workspace_by_name, workspace_in_cycle, workspace_name, workspace_to_activate, workspaces,
};

#[cfg(test)]
pub(crate) mod test_support {
    //! Builds small trees for service and layout tests.

    use crate::tiling::layout::share_on_attach;
    use crate::tiling::state::{
        Container, ContainerId, ContainerKind, ContainerTree, Layout, MonitorData, Rect,
        SplitData, WindowData, WindowHandle, WindowState, WorkspaceData,
    };

    pub(crate) struct TreeBuilder {
        pub tree: ContainerTree,
        pub monitor: ContainerId,
        pub workspace: ContainerId,
    }

    impl TreeBuilder {
        /// One 1000x500 monitor `DISPLAY1` displaying workspace `1`.
        pub fn single_monitor(layout: Layout) -> Self {
            let mut tree = ContainerTree::new();
            let monitor = tree
                .insert(Container::new(ContainerKind::Monitor(MonitorData {
                    device_name: "DISPLAY1".into(),
                    rect: Rect::new(0.0, 0.0, 1000.0, 500.0),
                    displayed_workspace: None,
                })))
                .unwrap();
            tree.add_child(tree.root(), monitor).unwrap();

            let mut builder = Self { tree, monitor, workspace: monitor };
            let workspace = builder.workspace_with_layout("1", layout);
            builder.workspace = workspace;
            builder.tree.get_mut(monitor).unwrap().as_monitor_mut().unwrap().displayed_workspace =
                Some(workspace);
            builder
        }

        fn workspace_with_layout(&mut self, name: &str, layout: Layout) -> ContainerId {
            let id = self
                .tree
                .insert(Container::new(ContainerKind::Workspace(WorkspaceData {
                    name: name.into(),
                    display_name: None,
                    keep_alive: false,
                    layout,
                })))
                .unwrap();
            self.tree.add_child(self.monitor, id).unwrap();
            id
        }

        /// Adds a non-displayed workspace to the first monitor.
        pub fn workspace(&mut self, name: &str) -> ContainerId {
            self.workspace_with_layout(name, Layout::Horizontal)
        }

        /// Adds a monitor with no workspaces.
        pub fn monitor(&mut self, device_name: &str, rect: Rect) -> ContainerId {
            let id = self
                .tree
                .insert(Container::new(ContainerKind::Monitor(MonitorData {
                    device_name: device_name.into(),
                    rect,
                    displayed_workspace: None,
                })))
                .unwrap();
            self.tree.add_child(self.tree.root(), id).unwrap();
            id
        }

        fn attach(&mut self, parent: ContainerId, kind: ContainerKind) -> ContainerId {
            let id = self.tree.insert(Container::new(kind)).unwrap();
            self.tree.add_child(parent, id).unwrap();
            share_on_attach(&mut self.tree, id);
            id
        }

        /// Attaches a tiling window.
        pub fn tiling(&mut self, parent: ContainerId, handle: u64) -> ContainerId {
            self.attach(
                parent,
                ContainerKind::Window(WindowData::new(
                    WindowHandle(handle),
                    WindowState::Tiling { size_percentage: 0.0 },
                    Rect::zero(),
                )),
            )
        }

        /// Attaches a split container.
        pub fn split(&mut self, parent: ContainerId, layout: Layout) -> ContainerId {
            self.attach(parent, ContainerKind::Split(SplitData { layout, size_percentage: 0.0 }))
        }

        /// Attaches a floating window at `rect`.
        pub fn floating(&mut self, parent: ContainerId, handle: u64, rect: Rect) -> ContainerId {
            self.attach(
                parent,
                ContainerKind::Window(WindowData::new(WindowHandle(handle), WindowState::Floating, rect)),
            )
        }
    }
}
