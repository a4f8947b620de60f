#![forbid(unsafe_code)]

//! Render/transform applier for mind maps.
//!
//! [`Scene`] is a retained, host-agnostic description of the drawn surface. Hosts either
//! consume [`Scene::take_damage`] to patch their own widgets or serialize with
//! [`Scene::to_svg`].

pub mod scene;
pub mod style;
pub mod svg;
pub mod transition;

pub use scene::{Damage, Scene, SceneEdge, SceneNode};
pub use style::SceneStyle;
pub use svg::{SvgOptions, viewport_transform};
pub use transition::{ViewportTransition, ease_out_cubic};
