use mindweave_core::ViewerConfig;
use std::time::Duration;

/// View-level behavior of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Fraction of the surface a zoom-to-fit fills.
    pub fit_margin: f64,
    /// Length of animated viewport moves; zero jumps.
    pub transition: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fit_margin: 0.9,
            transition: Duration::from_millis(400),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let d = Self::default();
        Self {
            fit_margin: config
                .get_f64("view.fitMargin")
                .filter(|m| *m > 0.0 && *m <= 1.0)
                .unwrap_or(d.fit_margin),
            transition: config
                .get_u64("view.transitionMs")
                .map(Duration::from_millis)
                .unwrap_or(d.transition),
        }
    }
}
