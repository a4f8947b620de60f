use std::fmt::Write as _;

/// Formats a number for an SVG attribute: no `-0`, no float noise, `0` for non-finite input.
pub(crate) fn fmt_into(out: &mut String, v: f64) {
    let _ = write!(out, "{}", FmtDisplay(v));
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FmtDisplay(pub(crate) f64);

impl std::fmt::Display for FmtDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut v = self.0;
        if !v.is_finite() {
            return f.write_str("0");
        }
        if v.abs() < 1e-9 {
            v = 0.0;
        }
        let nearest = v.round();
        if (v - nearest).abs() < 1e-6 {
            v = nearest;
        }
        if v == 0.0 {
            v = 0.0;
        }
        write!(f, "{v}")
    }
}

/// Escapes text content and attribute values.
pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + 1;
    }
    out.push_str(&text[start..]);
}
