use mindweave_core::ViewerConfig;

/// Sizes derived from the root font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyle {
    pub font_size: f64,
    pub node_radius: f64,
    /// Vertical distance between tree levels; also the tidy-placement slot width.
    pub node_spacing: f64,
    pub line_height: f64,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self::from_font_size(16.0)
    }
}

impl SceneStyle {
    pub fn from_font_size(font_size: f64) -> Self {
        let font_size = if font_size.is_finite() && font_size > 0.0 {
            font_size
        } else {
            16.0
        };
        Self {
            font_size,
            node_radius: 2.5 * font_size,
            node_spacing: 9.0 * font_size,
            line_height: 0.9 * font_size,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::from_font_size(config.font_size())
    }
}
