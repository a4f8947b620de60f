use mindweave_core::{LogicalPoint, Positions, Viewport};

/// Notifications from a [`ViewerSession`](crate::ViewerSession) to its embedding UI.
///
/// Every method defaults to a no-op.
pub trait ViewerHost {
    fn on_pan_zoom(&mut self, _viewport: &Viewport) {}

    fn on_node_drag(&mut self, _id: &str, _position: LogicalPoint) {}

    fn on_node_select(&mut self, _id: &str) {}

    /// A pan or node drag finished. The session has already persisted.
    fn on_drag_end(&mut self) {}

    /// An organize run converged or was stopped. The session has already persisted.
    fn on_layout_end(&mut self, _positions: &Positions, _viewport: &Viewport) {}

    /// A node carrying a sub-module reference was selected.
    fn on_enter_sub_module(&mut self, _reference: &str) {}
}

impl ViewerHost for () {}
