use mindweave_core::{
    Positions, ScreenPoint, Viewport, ViewerConfig, ZoomBounds, logical_point, screen_point,
    screen_vector,
};
use mindweave_interact::{Effect, Gesture, InputEvent, InteractionController, InteractionSettings};
use rstest::rstest;
use serde_json::json;

fn two_nodes() -> Positions {
    let mut p = Positions::new();
    p.insert("root".to_string(), logical_point(0.0, 0.0));
    p.insert("A".to_string(), logical_point(0.0, 0.0));
    p.insert("B".to_string(), logical_point(100.0, 50.0));
    p
}

fn down(x: f64, y: f64, target: Option<&str>) -> InputEvent {
    InputEvent::PointerDown {
        point: screen_point(x, y),
        target: target.map(str::to_string),
    }
}

fn moved(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        point: screen_point(x, y),
    }
}

fn up(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerUp {
        point: screen_point(x, y),
    }
}

/// Feeds events through the controller the way a state owner would, applying viewport and
/// position effects between events.
struct Harness {
    controller: InteractionController,
    viewport: Viewport,
    positions: Positions,
    log: Vec<Effect>,
}

impl Harness {
    fn new(viewport: Viewport) -> Self {
        Self {
            controller: InteractionController::default(),
            viewport,
            positions: two_nodes(),
            log: Vec::new(),
        }
    }

    fn feed(&mut self, event: InputEvent) -> Vec<Effect> {
        let effects = self
            .controller
            .handle(event, &self.viewport, &self.positions);
        for e in &effects {
            match e {
                Effect::Viewport(vp) => self.viewport = *vp,
                Effect::MoveNode { id, position } => {
                    self.positions.insert(id.clone(), *position);
                }
                _ => {}
            }
        }
        self.log.extend(effects.iter().cloned());
        effects
    }
}

#[test]
fn click_on_node_selects_without_moving_the_view() {
    let mut h = Harness::new(Viewport::default());
    let b = h.viewport.logical_to_screen(h.positions["B"]);
    h.feed(down(b.x, b.y, Some("B")));
    let effects = h.feed(up(b.x, b.y));

    assert_eq!(effects, vec![Effect::Select("B".to_string())]);
    assert!(!h.log.iter().any(|e| matches!(e, Effect::Viewport(_))));
    assert_eq!(h.viewport, Viewport::default());
    assert!(h.controller.is_idle());
}

#[test]
fn drag_at_zoom_two_moves_half_the_screen_distance() {
    let mut h = Harness::new(Viewport::new(screen_vector(0.0, 0.0), 2.0));
    let a = h.viewport.logical_to_screen(h.positions["A"]);
    h.feed(down(a.x, a.y, Some("A")));
    let effects = h.feed(moved(a.x + 50.0, a.y));
    assert_eq!(effects.first(), Some(&Effect::CancelOrganize));

    let end = h.feed(up(a.x + 50.0, a.y));
    assert_eq!(end, vec![Effect::DragEnd]);
    let p = h.positions["A"];
    assert!((p.x - 25.0).abs() < 1e-9, "x = {}", p.x);
    assert_eq!(p.y, 0.0);
}

#[test]
fn drag_keeps_grab_offset() {
    let mut h = Harness::new(Viewport::new(screen_vector(10.0, 20.0), 1.0));
    // Grab B 3px right of its center.
    let b = h.viewport.logical_to_screen(h.positions["B"]);
    h.feed(down(b.x + 3.0, b.y, Some("B")));
    h.feed(moved(b.x + 13.0, b.y + 7.0));
    assert_eq!(h.positions["B"], logical_point(110.0, 57.0));
}

#[test]
fn node_without_position_drags_from_origin() {
    let mut h = Harness::new(Viewport::default());
    h.positions.shift_remove("B");
    h.feed(down(40.0, 40.0, Some("B")));
    h.feed(moved(50.0, 40.0));
    assert_eq!(h.positions["B"], logical_point(10.0, 0.0));
}

#[rstest]
#[case(4.0, 4.0, true)]
#[case(-4.9, 0.0, true)]
#[case(5.0, 0.0, false)]
#[case(0.0, -5.0, false)]
#[case(30.0, 30.0, false)]
fn click_threshold_is_five_pixels(#[case] dx: f64, #[case] dy: f64, #[case] is_click: bool) {
    let mut h = Harness::new(Viewport::default());
    h.feed(down(100.0, 50.0, Some("B")));
    h.feed(moved(100.0 + dx, 50.0 + dy));
    let effects = h.feed(up(100.0 + dx, 50.0 + dy));
    if is_click {
        assert_eq!(effects, vec![Effect::Select("B".to_string())]);
    } else {
        assert_eq!(effects, vec![Effect::DragEnd]);
    }
}

#[test]
fn background_pan_follows_pointer_and_ends_with_drag_end() {
    let mut h = Harness::new(Viewport::new(screen_vector(5.0, 5.0), 1.5));
    h.feed(down(10.0, 10.0, None));
    assert!(matches!(h.controller.gesture(), Gesture::Panning { .. }));
    h.feed(moved(20.0, 5.0));
    h.feed(moved(25.0, 15.0));
    assert_eq!(h.viewport.pan, screen_vector(20.0, 10.0));
    assert_eq!(h.viewport.zoom, 1.5);

    let end = h.feed(InputEvent::PointerLeave {
        point: screen_point(25.0, 15.0),
    });
    assert_eq!(end, vec![Effect::DragEnd]);
    assert!(h.feed(moved(90.0, 90.0)).is_empty());
}

#[test]
fn wheel_zooms_around_cursor() {
    let mut h = Harness::new(Viewport::new(screen_vector(30.0, -10.0), 1.0));
    let cursor = screen_point(200.0, 120.0);
    let under = h.viewport.screen_to_logical(cursor);

    h.feed(InputEvent::Wheel {
        point: cursor,
        delta_y: -120.0,
    });
    assert!((h.viewport.zoom - 1.1).abs() < 1e-12);
    let after = h.viewport.screen_to_logical(cursor);
    assert!((after.x - under.x).abs() < 1e-9 && (after.y - under.y).abs() < 1e-9);

    h.feed(InputEvent::Wheel {
        point: cursor,
        delta_y: 3.0,
    });
    assert!((h.viewport.zoom - 1.0).abs() < 1e-12);
}

#[test]
fn wheel_clamps_and_stops_emitting_at_bounds() {
    let mut h = Harness::new(Viewport::new(screen_vector(0.0, 0.0), 4.9));
    let p = screen_point(0.0, 0.0);
    h.feed(InputEvent::Wheel {
        point: p,
        delta_y: -1.0,
    });
    assert_eq!(h.viewport.zoom, 5.0);
    let again = h.feed(InputEvent::Wheel {
        point: p,
        delta_y: -1.0,
    });
    assert!(again.is_empty());
    assert_eq!(h.viewport.zoom, 5.0);

    assert!(
        h.feed(InputEvent::Wheel {
            point: p,
            delta_y: 0.0,
        })
        .is_empty()
    );
}

#[rstest]
#[case(6.75, -1.0)]
#[case(0.05, 1.0)]
fn wheel_outside_the_band_never_reverses(#[case] zoom: f64, #[case] delta_y: f64) {
    let mut h = Harness::new(Viewport::new(screen_vector(0.0, 0.0), zoom));
    let effects = h.feed(InputEvent::Wheel {
        point: screen_point(400.0, 300.0),
        delta_y,
    });
    assert!(effects.is_empty(), "{effects:?}");
    assert_eq!(h.viewport.zoom, zoom);

    // The opposite direction still moves towards the band.
    h.feed(InputEvent::Wheel {
        point: screen_point(400.0, 300.0),
        delta_y: -delta_y,
    });
    let bounds = ZoomBounds::default();
    assert!(h.viewport.zoom >= bounds.min && h.viewport.zoom <= bounds.max);
}

fn touches(points: &[(f64, f64)]) -> Vec<ScreenPoint> {
    points.iter().map(|&(x, y)| screen_point(x, y)).collect()
}

#[test]
fn pinch_scales_around_midpoint_and_tracks_reference() {
    let mut h = Harness::new(Viewport::default());
    h.feed(InputEvent::TouchStart {
        touches: touches(&[(100.0, 100.0), (200.0, 100.0)]),
        target: None,
    });
    assert_eq!(
        h.controller.gesture(),
        &Gesture::Pinching {
            reference_distance: 100.0
        }
    );

    h.feed(InputEvent::TouchMove {
        touches: touches(&[(50.0, 100.0), (250.0, 100.0)]),
    });
    assert!((h.viewport.zoom - 2.0).abs() < 1e-12);
    // Midpoint (150, 100) stays over logical (150, 100).
    let mid = h.viewport.screen_to_logical(screen_point(150.0, 100.0));
    assert!((mid.x - 150.0).abs() < 1e-9 && (mid.y - 100.0).abs() < 1e-9);

    // Reference is now 200; holding the fingers still changes nothing.
    let still = h.feed(InputEvent::TouchMove {
        touches: touches(&[(50.0, 100.0), (250.0, 100.0)]),
    });
    assert!(still.is_empty());

    h.feed(InputEvent::TouchEnd {
        remaining: touches(&[(50.0, 100.0)]),
        changed: touches(&[(250.0, 100.0)]),
    });
    assert!(h.controller.is_idle());
}

#[test]
fn pinch_zoom_is_clamped() {
    let mut h = Harness::new(Viewport::new(screen_vector(0.0, 0.0), 4.0));
    h.feed(InputEvent::TouchStart {
        touches: touches(&[(0.0, 0.0), (10.0, 0.0)]),
        target: None,
    });
    h.feed(InputEvent::TouchMove {
        touches: touches(&[(0.0, 0.0), (100.0, 0.0)]),
    });
    assert_eq!(h.viewport.zoom, 5.0);
}

#[test]
fn second_touch_cancels_drag_silently() {
    let mut h = Harness::new(Viewport::default());
    h.feed(InputEvent::TouchStart {
        touches: touches(&[(100.0, 50.0)]),
        target: Some("B".to_string()),
    });
    h.feed(InputEvent::TouchStart {
        touches: touches(&[(100.0, 50.0), (160.0, 50.0)]),
        target: None,
    });
    let effects = h.feed(InputEvent::TouchEnd {
        remaining: Vec::new(),
        changed: touches(&[(100.0, 50.0), (160.0, 50.0)]),
    });
    assert!(effects.is_empty());
    assert!(!h.log.iter().any(|e| matches!(e, Effect::Select(_) | Effect::DragEnd)));
}

#[test]
fn single_touch_tap_selects() {
    let mut h = Harness::new(Viewport::default());
    h.feed(InputEvent::TouchStart {
        touches: touches(&[(100.0, 50.0)]),
        target: Some("B".to_string()),
    });
    let effects = h.feed(InputEvent::TouchEnd {
        remaining: Vec::new(),
        changed: touches(&[(101.0, 51.0)]),
    });
    assert_eq!(effects, vec![Effect::Select("B".to_string())]);
}

#[test]
fn settings_read_from_config() {
    let mut cfg = ViewerConfig::default();
    cfg.set_value("interaction.clickThreshold", json!(8));
    cfg.set_value("interaction.maxZoom", json!(3));
    cfg.set_value("interaction.wheelZoomFactor", json!(0.5));
    let s = InteractionSettings::from_config(&cfg);
    assert_eq!(s.click_threshold, 8.0);
    assert_eq!(s.zoom_bounds, ZoomBounds::new(0.1, 3.0));
    assert_eq!(s.wheel_zoom_factor, 1.1);
}
