//! Coordinate spaces and the pan/zoom viewport transform.
//!
//! Two spaces exist: *screen* space (pixels relative to the drawing surface, as reported by
//! input events) and *logical* space (where node positions are stored, independent of the
//! current view). The viewport maps logical to screen as `screen = pan + logical * zoom`.

/// Pixel coordinates relative to the top-left corner of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenSpace {}

/// Untransformed graph coordinates in which node positions are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalSpace {}

pub type ScreenPoint = euclid::Point2D<f64, ScreenSpace>;
pub type ScreenVector = euclid::Vector2D<f64, ScreenSpace>;
pub type ScreenSize = euclid::Size2D<f64, ScreenSpace>;
pub type LogicalPoint = euclid::Point2D<f64, LogicalSpace>;
pub type LogicalVector = euclid::Vector2D<f64, LogicalSpace>;
pub type LogicalBox = euclid::Box2D<f64, LogicalSpace>;
pub type ZoomScale = euclid::Scale<f64, LogicalSpace, ScreenSpace>;
pub type ViewTransform = euclid::Transform2D<f64, LogicalSpace, ScreenSpace>;

pub fn screen_point(x: f64, y: f64) -> ScreenPoint {
    euclid::point2(x, y)
}

pub fn screen_vector(x: f64, y: f64) -> ScreenVector {
    euclid::vec2(x, y)
}

pub fn screen_size(width: f64, height: f64) -> ScreenSize {
    euclid::size2(width, height)
}

pub fn logical_point(x: f64, y: f64) -> LogicalPoint {
    euclid::point2(x, y)
}

pub fn logical_vector(x: f64, y: f64) -> LogicalVector {
    euclid::vec2(x, y)
}

/// The affine transform from logical space to screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: ScreenVector,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: ScreenVector::zero(),
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Builds a viewport, normalizing a non-finite or non-positive zoom to `1`.
    pub fn new(pan: ScreenVector, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };
        let pan = if pan.x.is_finite() && pan.y.is_finite() {
            pan
        } else {
            ScreenVector::zero()
        };
        Self { pan, zoom }
    }

    pub fn scale(&self) -> ZoomScale {
        euclid::Scale::new(self.zoom)
    }

    /// `(screen - pan) / zoom`
    pub fn screen_to_logical(&self, point: ScreenPoint) -> LogicalPoint {
        (point - self.pan) / self.scale()
    }

    /// `logical * zoom + pan`
    pub fn logical_to_screen(&self, point: LogicalPoint) -> ScreenPoint {
        point * self.scale() + self.pan
    }

    /// Returns the viewport with `new_zoom` whose pan keeps the logical point currently under
    /// `anchor` under `anchor`.
    pub fn zoom_around_point(&self, anchor: ScreenPoint, new_zoom: f64) -> Self {
        let under_anchor = self.screen_to_logical(anchor);
        let zoom = Self::new(self.pan, new_zoom).zoom;
        let pan = anchor - under_anchor * ZoomScale::new(zoom);
        Self::new(pan, zoom)
    }

    pub fn panned_by(&self, delta: ScreenVector) -> Self {
        Self::new(self.pan + delta, self.zoom)
    }

    pub fn to_transform(&self) -> ViewTransform {
        ViewTransform::scale(self.zoom, self.zoom).then_translate(self.pan)
    }

    /// Linear interpolation of pan and zoom, `t` in `[0, 1]`.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.pan.lerp(other.pan, t),
            self.zoom + (other.zoom - self.zoom) * t,
        )
    }
}

/// The fixed `[min, max]` band every interactive zoom is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: 0.1, max: 5.0 }
    }
}

impl ZoomBounds {
    pub fn new(min: f64, max: f64) -> Self {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(min) || !valid(max) {
            return Self::default();
        }
        if min > max {
            return Self { min: max, max: min };
        }
        Self { min, max }
    }

    /// Clamps `zoom` into the band. NaN maps to `min`; the result is never zero or negative.
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }

    /// Brings `viewport` into the band, keeping the logical point under `anchor` in place.
    pub fn clamp_viewport(&self, viewport: Viewport, anchor: ScreenPoint) -> Viewport {
        let zoom = self.clamp(viewport.zoom);
        if zoom == viewport.zoom {
            viewport
        } else {
            viewport.zoom_around_point(anchor, zoom)
        }
    }
}

pub fn pinch_distance(a: ScreenPoint, b: ScreenPoint) -> f64 {
    (b - a).length()
}

pub fn pinch_midpoint(a: ScreenPoint, b: ScreenPoint) -> ScreenPoint {
    a.lerp(b, 0.5)
}

/// Rescales `viewport` by `new_distance / reference_distance`, anchored at `center`.
///
/// A degenerate reference distance leaves the viewport unchanged.
pub fn pinch_zoom(
    viewport: &Viewport,
    reference_distance: f64,
    new_distance: f64,
    center: ScreenPoint,
    bounds: ZoomBounds,
) -> Viewport {
    if !(reference_distance.is_finite() && reference_distance > 0.0 && new_distance.is_finite()) {
        return *viewport;
    }
    let factor = new_distance / reference_distance;
    let zoom = bounds.clamp(viewport.zoom * factor);
    // Clamping an out-of-band viewport must not reverse the gesture.
    if (factor > 1.0 && zoom < viewport.zoom) || (factor < 1.0 && zoom > viewport.zoom) {
        return *viewport;
    }
    viewport.zoom_around_point(center, zoom)
}

/// Axis-aligned bounds of `points`, or `None` for an empty set.
pub fn bounding_box<'a>(points: impl IntoIterator<Item = &'a LogicalPoint>) -> Option<LogicalBox> {
    let mut it = points.into_iter();
    let first = *it.next()?;
    let mut b = LogicalBox::new(first, first);
    for p in it {
        b.min = b.min.min(*p);
        b.max = b.max.max(*p);
    }
    Some(b)
}

/// Computes a viewport showing every position (inflated by `padding`) centered in `surface`,
/// scaled by `margin` (< 1 leaves a border).
///
/// A zero-extent axis uses a scale factor of `1` for that axis.
pub fn zoom_to_fit<'a>(
    positions: impl IntoIterator<Item = &'a LogicalPoint>,
    padding: f64,
    surface: ScreenSize,
    margin: f64,
) -> Option<Viewport> {
    let content = bounding_box(positions)?.inflate(padding, padding);
    let scale_axis = |surface_len: f64, content_len: f64| {
        if content_len > 0.0 {
            surface_len / content_len
        } else {
            1.0
        }
    };
    let scale_x = scale_axis(surface.width, content.width());
    let scale_y = scale_axis(surface.height, content.height());
    let zoom = scale_x.min(scale_y) * margin;
    let zoom = Viewport::new(ScreenVector::zero(), zoom).zoom;
    Some(center_on(content.center(), surface, zoom))
}

/// The viewport at `zoom` that puts `point` at the center of `surface`.
pub fn center_on(point: LogicalPoint, surface: ScreenSize, zoom: f64) -> Viewport {
    let zoom = Viewport::new(ScreenVector::zero(), zoom).zoom;
    let surface_center = surface.to_vector() / 2.0;
    let scaled = point * ZoomScale::new(zoom);
    Viewport::new(surface_center - scaled.to_vector(), zoom)
}
