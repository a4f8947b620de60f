#![forbid(unsafe_code)]

//! Headless layout for mind maps.
//!
//! - `force`: frame-stepped force-directed "organize" run with cooling
//! - `tidy`: one-shot tree placement for nodes that have no position yet
//!
//! Neither schedules work on its own; the owner of the position map drives them.

pub mod force;
pub mod rng;
pub mod settings;
pub mod tidy;

pub use force::{EndReason, ForceLayout, LayoutEnd, OrganizeStart, PhysicsBody, TickOutcome};
pub use rng::{RandomSource, XorShift64Star};
pub use settings::LayoutSettings;
pub use tidy::place_unpositioned;
