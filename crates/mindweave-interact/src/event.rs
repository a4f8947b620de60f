use mindweave_core::{LogicalPoint, ScreenPoint, Viewport};

/// Input normalized by the host: points are relative to the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// `target` is the node under the pointer, if any.
    PointerDown {
        point: ScreenPoint,
        target: Option<String>,
    },
    PointerMove {
        point: ScreenPoint,
    },
    PointerUp {
        point: ScreenPoint,
    },
    PointerLeave {
        point: ScreenPoint,
    },
    /// Negative `delta_y` zooms in.
    Wheel {
        point: ScreenPoint,
        delta_y: f64,
    },
    /// `touches` holds every contact currently down; `target` is the node under the first.
    TouchStart {
        touches: Vec<ScreenPoint>,
        target: Option<String>,
    },
    TouchMove {
        touches: Vec<ScreenPoint>,
    },
    /// `remaining` are the contacts still down, `changed` the ones just lifted.
    TouchEnd {
        remaining: Vec<ScreenPoint>,
        changed: Vec<ScreenPoint>,
    },
}

/// What the owner of the viewport and position map must apply, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Viewport(Viewport),
    /// Emitted before any `MoveNode` so the layout run never races a drag.
    CancelOrganize,
    MoveNode {
        id: String,
        position: LogicalPoint,
    },
    Select(String),
    /// A pan or drag finished; state is worth persisting.
    DragEnd,
}
