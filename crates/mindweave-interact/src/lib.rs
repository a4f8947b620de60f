#![forbid(unsafe_code)]

//! Interaction controller for mind-map viewers.
//!
//! Hosts translate their native pointer/wheel/touch events into [`InputEvent`]s (surface
//! relative, with the node under the pointer already resolved) and apply the returned
//! [`Effect`]s to whatever owns the viewport and the position map.

mod controller;
mod event;

pub use controller::{Gesture, InteractionController, InteractionSettings};
pub use event::{Effect, InputEvent};
