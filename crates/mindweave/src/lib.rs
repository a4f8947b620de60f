#![forbid(unsafe_code)]

//! `mindweave` is a headless mind-map viewer core.
//!
//! A [`ViewerSession`] owns one module document and everything derived from it: positions,
//! the pan/zoom viewport, the force-directed organize run, the interaction state machine and
//! the retained scene. The embedding UI supplies three collaborators:
//!
//! - [`ViewerHost`]: receives pan/zoom, drag, select and layout notifications
//! - [`FrameScheduler`]: turns frame requests into [`ViewerSession::on_frame`] calls
//! - [`DocumentStore`]: persists documents ([`MemoryStore`] keeps them in memory)

pub use mindweave_core::*;

pub mod layout {
    pub use mindweave_layout::*;
}

pub mod interact {
    pub use mindweave_interact::*;
}

pub mod render {
    pub use mindweave_render::*;
}

mod session_error;
mod host;
mod scheduler;
mod session;
mod settings;
mod store;

pub use session_error::{Result, SessionError, StoreError};
pub use host::ViewerHost;
pub use scheduler::{FrameScheduler, ManualScheduler};
pub use session::ViewerSession;
pub use settings::SessionSettings;
pub use store::{DocumentStore, MemoryStore};
