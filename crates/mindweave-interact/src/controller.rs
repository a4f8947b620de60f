use crate::event::{Effect, InputEvent};
use mindweave_core::geom::{LogicalVector, pinch_distance, pinch_midpoint, pinch_zoom};
use mindweave_core::{LogicalPoint, Positions, ScreenPoint, Viewport, ViewerConfig, ZoomBounds};

/// Thresholds and factors for turning raw input into view changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    /// Pointer travel (screen px, per axis) below which a node press counts as a click.
    pub click_threshold: f64,
    pub wheel_zoom_factor: f64,
    pub zoom_bounds: ZoomBounds,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            click_threshold: 5.0,
            wheel_zoom_factor: 1.1,
            zoom_bounds: ZoomBounds::default(),
        }
    }
}

impl InteractionSettings {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let d = Self::default();
        let bounds = ZoomBounds::new(
            config
                .get_positive_f64("interaction.minZoom")
                .unwrap_or(d.zoom_bounds.min),
            config
                .get_positive_f64("interaction.maxZoom")
                .unwrap_or(d.zoom_bounds.max),
        );
        Self {
            click_threshold: config
                .get_positive_f64("interaction.clickThreshold")
                .unwrap_or(d.click_threshold),
            wheel_zoom_factor: config
                .get_f64("interaction.wheelZoomFactor")
                .filter(|f| *f > 1.0)
                .unwrap_or(d.wheel_zoom_factor),
            zoom_bounds: bounds,
        }
    }
}

/// The gesture in progress. At most one is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        anchor: ScreenPoint,
    },
    DraggingNode {
        id: String,
        /// Node position minus pointer position, in logical space.
        offset: LogicalVector,
        start: ScreenPoint,
    },
    Pinching {
        reference_distance: f64,
    },
}

/// Pointer/wheel/touch state machine.
///
/// It owns no view state: every call receives the current viewport and positions and answers
/// with the effects the caller should apply.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    settings: InteractionSettings,
    gesture: Gesture,
}

impl InteractionController {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            settings,
            gesture: Gesture::Idle,
        }
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Drops any gesture in progress without emitting effects.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn handle(
        &mut self,
        event: InputEvent,
        viewport: &Viewport,
        positions: &Positions,
    ) -> Vec<Effect> {
        match event {
            InputEvent::PointerDown { point, target } => {
                self.press(point, target, viewport, positions);
                Vec::new()
            }
            InputEvent::PointerMove { point } => self.motion(point, viewport),
            InputEvent::PointerUp { point } | InputEvent::PointerLeave { point } => {
                self.release(point)
            }
            InputEvent::Wheel { point, delta_y } => self.wheel(point, delta_y, viewport),
            InputEvent::TouchStart { touches, target } => {
                self.touch_start(&touches, target, viewport, positions);
                Vec::new()
            }
            InputEvent::TouchMove { touches } => self.touch_move(&touches, viewport),
            InputEvent::TouchEnd { remaining, changed } => self.touch_end(&remaining, &changed),
        }
    }

    fn press(
        &mut self,
        point: ScreenPoint,
        target: Option<String>,
        viewport: &Viewport,
        positions: &Positions,
    ) {
        self.gesture = match target {
            Some(id) => {
                let node = positions
                    .get(&id)
                    .copied()
                    .unwrap_or_else(LogicalPoint::origin);
                let offset = node - viewport.screen_to_logical(point);
                tracing::trace!(node = %id, "drag start");
                Gesture::DraggingNode {
                    id,
                    offset,
                    start: point,
                }
            }
            None => Gesture::Panning { anchor: point },
        };
    }

    fn motion(&mut self, point: ScreenPoint, viewport: &Viewport) -> Vec<Effect> {
        match &mut self.gesture {
            Gesture::Panning { anchor } => {
                let delta = point - *anchor;
                *anchor = point;
                vec![Effect::Viewport(viewport.panned_by(delta))]
            }
            Gesture::DraggingNode { id, offset, .. } => {
                let position = viewport.screen_to_logical(point) + *offset;
                vec![
                    Effect::CancelOrganize,
                    Effect::MoveNode {
                        id: id.clone(),
                        position,
                    },
                ]
            }
            Gesture::Idle | Gesture::Pinching { .. } => Vec::new(),
        }
    }

    fn release(&mut self, point: ScreenPoint) -> Vec<Effect> {
        match std::mem::take(&mut self.gesture) {
            Gesture::DraggingNode { id, start, .. } => {
                let t = self.settings.click_threshold;
                let travel = point - start;
                if travel.x.abs() < t && travel.y.abs() < t {
                    vec![Effect::Select(id)]
                } else {
                    vec![Effect::DragEnd]
                }
            }
            Gesture::Panning { .. } => vec![Effect::DragEnd],
            Gesture::Idle | Gesture::Pinching { .. } => Vec::new(),
        }
    }

    fn wheel(&mut self, point: ScreenPoint, delta_y: f64, viewport: &Viewport) -> Vec<Effect> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return Vec::new();
        }
        let factor = self.settings.wheel_zoom_factor;
        let wanted = if delta_y < 0.0 {
            viewport.zoom * factor
        } else {
            viewport.zoom / factor
        };
        let zoom = self.settings.zoom_bounds.clamp(wanted);
        let reversed = if delta_y < 0.0 {
            zoom < viewport.zoom
        } else {
            zoom > viewport.zoom
        };
        if zoom == viewport.zoom || reversed {
            return Vec::new();
        }
        vec![Effect::Viewport(viewport.zoom_around_point(point, zoom))]
    }

    fn touch_start(
        &mut self,
        touches: &[ScreenPoint],
        target: Option<String>,
        viewport: &Viewport,
        positions: &Positions,
    ) {
        match touches {
            [] => {}
            [single] => self.press(*single, target, viewport, positions),
            [a, b, ..] => {
                if !self.is_idle() {
                    tracing::trace!("second contact cancels the active gesture");
                }
                self.gesture = Gesture::Pinching {
                    reference_distance: pinch_distance(*a, *b),
                };
            }
        }
    }

    fn touch_move(&mut self, touches: &[ScreenPoint], viewport: &Viewport) -> Vec<Effect> {
        if let ([a, b, ..], Gesture::Pinching { reference_distance }) =
            (touches, &mut self.gesture)
        {
            let distance = pinch_distance(*a, *b);
            let next = pinch_zoom(
                viewport,
                *reference_distance,
                distance,
                pinch_midpoint(*a, *b),
                self.settings.zoom_bounds,
            );
            if distance > 0.0 {
                *reference_distance = distance;
            }
            return if next == *viewport {
                Vec::new()
            } else {
                vec![Effect::Viewport(next)]
            };
        }
        match touches {
            [single] => self.motion(*single, viewport),
            _ => Vec::new(),
        }
    }

    fn touch_end(&mut self, remaining: &[ScreenPoint], changed: &[ScreenPoint]) -> Vec<Effect> {
        match &self.gesture {
            Gesture::Pinching { .. } => {
                if remaining.len() < 2 {
                    self.gesture = Gesture::Idle;
                }
                Vec::new()
            }
            Gesture::Panning { anchor } if remaining.is_empty() => {
                let point = changed.first().copied().unwrap_or(*anchor);
                self.release(point)
            }
            Gesture::DraggingNode { start, .. } if remaining.is_empty() => {
                let point = changed.first().copied().unwrap_or(*start);
                self.release(point)
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindweave_core::screen_point;

    #[test]
    fn moves_while_idle_do_nothing() {
        let mut c = InteractionController::default();
        let effects = c.handle(
            InputEvent::PointerMove {
                point: screen_point(10.0, 10.0),
            },
            &Viewport::default(),
            &Positions::new(),
        );
        assert!(effects.is_empty());
        assert!(c.is_idle());
    }

    #[test]
    fn reset_drops_gesture_silently() {
        let mut c = InteractionController::default();
        c.handle(
            InputEvent::PointerDown {
                point: screen_point(0.0, 0.0),
                target: None,
            },
            &Viewport::default(),
            &Positions::new(),
        );
        c.reset();
        let effects = c.handle(
            InputEvent::PointerUp {
                point: screen_point(0.0, 0.0),
            },
            &Viewport::default(),
            &Positions::new(),
        );
        assert!(effects.is_empty());
    }
}
