//! SVG serialization of a [`Scene`].

mod util;

use crate::scene::Scene;
use mindweave_core::Viewport;
use std::fmt::Write as _;
use util::{FmtDisplay, escape_xml_into, fmt_into};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgOptions {
    /// Explicit surface size; `None` emits `100%`.
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Inline CSS placed in a `<style>` element ahead of the content.
    pub style: Option<String>,
}

/// `translate(x, y) scale(z)`
pub fn viewport_transform(viewport: &Viewport) -> String {
    format!(
        "translate({}, {}) scale({})",
        FmtDisplay(viewport.pan.x),
        FmtDisplay(viewport.pan.y),
        FmtDisplay(viewport.zoom)
    )
}

impl Scene {
    /// Serializes the scene: lines first, then node groups, all inside the viewport group.
    pub fn to_svg(&self, options: &SvgOptions) -> String {
        let style = self.style();
        let mut out = String::with_capacity(256 + self.nodes().count() * 192);

        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" width=""#);
        push_length(&mut out, options.width);
        out.push_str(r#"" height=""#);
        push_length(&mut out, options.height);
        out.push_str(r#"">"#);

        if let Some(css) = options.style.as_deref() {
            out.push_str("<style>");
            escape_xml_into(&mut out, css);
            out.push_str("</style>");
        }

        out.push_str(r#"<g class="viewport" transform=""#);
        out.push_str(&viewport_transform(self.viewport()));
        out.push_str(r#"">"#);

        for (child, edge) in self.edges() {
            out.push_str(r#"<line class="link-line" data-child-id=""#);
            escape_xml_into(&mut out, child);
            let _ = write!(
                out,
                r#"" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
                FmtDisplay(edge.from.x),
                FmtDisplay(edge.from.y),
                FmtDisplay(edge.to.x),
                FmtDisplay(edge.to.y)
            );
        }

        for node in self.nodes() {
            out.push_str(r#"<g class=""#);
            out.push_str(&node.classes().join(" "));
            out.push_str(r#"" data-node-id=""#);
            escape_xml_into(&mut out, &node.id);
            let _ = write!(
                out,
                r#"" transform="translate({}, {})">"#,
                FmtDisplay(node.position.x),
                FmtDisplay(node.position.y)
            );

            out.push_str(r#"<circle class="node-circle" r=""#);
            fmt_into(&mut out, style.node_radius);
            out.push_str(r#""/><text class="node-text">"#);
            let first = node.first_line_offset(style.line_height);
            for (i, line) in node.lines.iter().enumerate() {
                let dy = if i == 0 { first } else { style.line_height };
                let _ = write!(out, r#"<tspan x="0" dy="{}px">"#, FmtDisplay(dy));
                escape_xml_into(&mut out, line);
                out.push_str("</tspan>");
            }
            out.push_str("</text></g>");
        }

        out.push_str("</g></svg>");
        out
    }
}

fn push_length(out: &mut String, v: Option<f64>) {
    match v {
        Some(v) if v.is_finite() && v >= 0.0 => fmt_into(out, v),
        _ => out.push_str("100%"),
    }
}
