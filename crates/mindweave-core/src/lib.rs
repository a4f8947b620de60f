#![forbid(unsafe_code)]

//! Headless mind-map model.
//!
//! - `model`: arena node tree and the module document format
//! - `geom`: screen/logical coordinate spaces, viewport math, zoom-to-fit
//! - `config`: JSON-backed viewer configuration

pub mod config;
pub mod error;
pub mod geom;
pub mod model;

pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use geom::{
    LogicalPoint, LogicalSpace, LogicalVector, ScreenPoint, ScreenSize, ScreenSpace,
    ScreenVector, Viewport, ZoomBounds, logical_point, screen_point, screen_size,
    screen_vector,
};
pub use model::{Document, NodeRecord, NodeTree, Positions, QuizQuestion, ROOT_ID};
