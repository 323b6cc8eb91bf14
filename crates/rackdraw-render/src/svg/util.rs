use std::fmt::Write as _;

/// Formats a coordinate for an SVG attribute: shortest round-trippable decimal, with float noise
/// snapped to the nearest integer and `-0` printed as `0`.
pub(super) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

pub(super) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }
    // Three decimals are plenty for a rack drawing and keep outputs byte-stable.
    let rounded = (v * 1000.0).round() / 1000.0;

    let _ = write!(out, "{rounded}");
}

pub(super) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

pub(super) fn escape_xml_into(out: &mut String, text: &str) {
    escape_into(out, text, false);
}

/// Escapes an attribute value. Tab, line feed and carriage return become character references,
/// since attribute-value normalization would otherwise turn them into spaces.
pub(super) fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text, true);
    out
}

fn escape_into(out: &mut String, text: &str, attr: bool) {
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            b'\t' if attr => "&#9;",
            b'\n' if attr => "&#10;",
            b'\r' if attr => "&#13;",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + 1;
    }
    out.push_str(&text[start..]);
}
