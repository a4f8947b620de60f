//! Renders a module document to SVG on stdout.
//!
//! ```text
//! cargo run -p mindweave-render --example render_document -- fixtures/modules/ai.json [--organize]
//! ```
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=mindweave_layout=debug`).

use mindweave_core::geom::{LogicalBox, zoom_to_fit};
use mindweave_core::{Document, ViewerConfig, logical_point, screen_size};
use mindweave_layout::{ForceLayout, LayoutSettings, place_unpositioned};
use mindweave_render::{Scene, SceneStyle, SvgOptions};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("usage: render_document <module.json> [--organize]");
    let organize = args.any(|a| a == "--organize");

    let text = std::fs::read_to_string(&path).expect("read module");
    let mut doc = Document::from_json_str(&text).expect("valid module document");
    let config = ViewerConfig::default();
    let style = SceneStyle::from_config(&config);
    let (width, height) = (1280.0, 800.0);

    place_unpositioned(&doc.tree, &mut doc.positions, style.node_spacing);
    if organize {
        let mut engine = ForceLayout::new(LayoutSettings::from_config(&config));
        let area = LogicalBox::new(logical_point(0.0, 0.0), logical_point(width, height));
        engine.start(&doc.tree, &mut doc.positions, area);
        let end = engine.run_to_end(&mut doc.positions);
        tracing::info!(?end, "organize finished");
    }

    let viewport = zoom_to_fit(
        doc.positions.values(),
        style.node_radius,
        screen_size(width, height),
        0.9,
    )
    .unwrap_or(doc.viewport);

    let mut scene = Scene::new(style);
    scene.redraw(&doc.tree, &doc.positions, style);
    scene.apply_viewport(viewport);

    print!(
        "{}",
        scene.to_svg(&SvgOptions {
            width: Some(width),
            height: Some(height),
            style: None,
        })
    );
}
