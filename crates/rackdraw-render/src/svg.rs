//! SVG serialization of a finished [`Diagram`].

mod util;

use crate::model::{Diagram, Primitive};
use std::fmt::Write as _;
use util::{escape_attr, escape_xml, escape_xml_into, fmt, fmt_into};

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Adds extra space around the diagram's view box.
    pub viewbox_padding: f64,
    /// Root element id; also scopes the embedded stylesheet.
    pub diagram_id: Option<String>,
    /// Fill painted behind the drawing. `None` leaves the background transparent.
    pub background: Option<String>,
    pub font_family: Option<String>,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 0.0,
            diagram_id: None,
            background: Some("white".to_string()),
            font_family: None,
        }
    }
}

const DEFAULT_FONT_FAMILY: &str = r#""trebuchet ms",verdana,arial,sans-serif"#;

/// Writes `diagram` as a standalone SVG document.
///
/// `width`/`height` carry the fitted output size; coordinates stay in the natural view box.
pub fn render_svg(diagram: &Diagram, options: &SvgRenderOptions) -> String {
    let id = options.diagram_id.as_deref().unwrap_or("rackdraw");
    let id_esc = escape_attr(id);
    let pad = options.viewbox_padding.max(0.0);
    let vb = diagram.view_box();
    let scale = diagram.scale();

    let vb_w = vb.width() + 2.0 * pad;
    let vb_h = vb.height() + 2.0 * pad;
    let out_w = vb_w * scale;
    let out_h = vb_h * scale;

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{id_esc}" width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{x} {y} {vw} {vh}" role="graphics-document document" aria-roledescription="rack">"#,
        w = fmt(out_w),
        h = fmt(out_h),
        x = fmt(vb.min_x - pad),
        y = fmt(vb.min_y - pad),
        vw = fmt(vb_w),
        vh = fmt(vb_h),
    );

    if let Some(title) = diagram.title() {
        let _ = write!(
            &mut out,
            r#"<title id="chart-title-{id_esc}">{}</title>"#,
            escape_xml(title)
        );
    }

    let font = options
        .font_family
        .as_deref()
        .unwrap_or(DEFAULT_FONT_FAMILY);
    let _ = write!(
        &mut out,
        "<style>#{id_esc}{{font-family:{font};}}#{id_esc} text{{dominant-baseline:central;}}</style>",
        font = escape_xml(font),
    );

    if let Some(bg) = options.background.as_deref() {
        let _ = write!(
            &mut out,
            r#"<rect class="background" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            fmt(vb.min_x - pad),
            fmt(vb.min_y - pad),
            fmt(vb_w),
            fmt(vb_h),
            escape_attr(bg)
        );
    }

    let group_class = if diagram.is_placeholder() {
        "rack placeholder"
    } else {
        "rack"
    };
    let _ = write!(&mut out, r#"<g class="{group_class}">"#);
    for primitive in diagram.primitives() {
        write_primitive(&mut out, primitive);
    }
    out.push_str("</g></svg>\n");
    out
}

fn write_primitive(out: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Rect {
            class,
            rect,
            fill,
            stroke,
            stroke_width,
            corner_radius,
            dashed,
        } => {
            let _ = write!(
                out,
                r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}""#,
                escape_attr(class),
                fmt(rect.x),
                fmt(rect.y),
                fmt(rect.width),
                fmt(rect.height)
            );
            if *corner_radius > 0.0 {
                let _ = write!(out, r#" rx="{r}" ry="{r}""#, r = fmt(*corner_radius));
            }
            let _ = write!(
                out,
                r#" fill="{}""#,
                escape_attr(fill.as_deref().unwrap_or("none"))
            );
            if let Some(stroke) = stroke {
                let _ = write!(
                    out,
                    r#" stroke="{}" stroke-width="{}""#,
                    escape_attr(stroke),
                    fmt(*stroke_width)
                );
                if *dashed {
                    out.push_str(r#" stroke-dasharray="6 4""#);
                }
            }
            out.push_str("/>");
        }
        Primitive::Line {
            class,
            from,
            to,
            stroke,
            stroke_width,
        } => {
            let _ = write!(
                out,
                r#"<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
                escape_attr(class),
                fmt(from.x),
                fmt(from.y),
                fmt(to.x),
                fmt(to.y),
                escape_attr(stroke),
                fmt(*stroke_width)
            );
        }
        Primitive::Polyline {
            class,
            points,
            stroke,
            stroke_width,
        } => {
            let _ = write!(out, r#"<polyline class="{}" points=""#, escape_attr(class));
            for (i, p) in points.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                fmt_into(out, p.x);
                out.push(',');
                fmt_into(out, p.y);
            }
            let _ = write!(
                out,
                r#"" fill="none" stroke="{}" stroke-width="{}"/>"#,
                escape_attr(stroke),
                fmt(*stroke_width)
            );
        }
        Primitive::Text {
            class,
            at,
            text,
            font_size,
            fill,
            anchor,
            bold,
        } => {
            let _ = write!(
                out,
                r#"<text class="{}" x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{}""#,
                escape_attr(class),
                fmt(at.x),
                fmt(at.y),
                fmt(*font_size),
                escape_attr(fill),
                anchor.as_svg()
            );
            if *bold {
                out.push_str(r#" font-weight="bold""#);
            }
            out.push('>');
            escape_xml_into(out, text);
            out.push_str("</text>");
        }
        Primitive::Image { class, rect, href } => {
            let _ = write!(
                out,
                r#"<image class="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" xlink:href="{}"/>"#,
                escape_attr(class),
                fmt(rect.x),
                fmt(rect.y),
                fmt(rect.width),
                fmt(rect.height),
                escape_attr(href)
            );
        }
        Primitive::Circle {
            class,
            center,
            radius,
            fill,
            stroke,
        } => {
            let _ = write!(
                out,
                r#"<circle class="{}" cx="{}" cy="{}" r="{}" fill="{}""#,
                escape_attr(class),
                fmt(center.x),
                fmt(center.y),
                fmt(*radius),
                escape_attr(fill)
            );
            if let Some(stroke) = stroke {
                let _ = write!(out, r#" stroke="{}" stroke-width="1""#, escape_attr(stroke));
            }
            out.push_str("/>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bounds, DiagramKind, Point, Rect, TextAnchor};

    fn diagram(primitives: Vec<Primitive>) -> Diagram {
        Diagram {
            kind: DiagramKind::Rack,
            title: Some("Row <A> & B".to_string()),
            view_box: Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 100.0,
                max_y: 50.0,
            },
            scale: 2.0,
            devices: Vec::new(),
            primitives,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn root_carries_scaled_size_and_natural_view_box() {
        let svg = render_svg(&diagram(Vec::new()), &SvgRenderOptions::default());
        assert!(svg.starts_with(r#"<svg id="rackdraw" width="200" height="100""#));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(svg.contains("<title id=\"chart-title-rackdraw\">Row &lt;A&gt; &amp; B</title>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn primitives_are_written_in_paint_order() {
        let svg = render_svg(
            &diagram(vec![
                Primitive::Rect {
                    class: "rack-frame".to_string(),
                    rect: Rect {
                        x: 1.0,
                        y: 2.0,
                        width: 3.0,
                        height: 4.0,
                    },
                    fill: Some("#000".to_string()),
                    stroke: Some("#111".to_string()),
                    stroke_width: 1.5,
                    corner_radius: 0.0,
                    dashed: true,
                },
                Primitive::Image {
                    class: "device-image compute".to_string(),
                    rect: Rect {
                        x: 0.0,
                        y: 0.0,
                        width: 10.0,
                        height: 5.0,
                    },
                    href: "data:image/png;base64,AA==".to_string(),
                },
                Primitive::Text {
                    class: "device-label".to_string(),
                    at: Point { x: 5.0, y: 6.0 },
                    text: "Compute-<1>".to_string(),
                    font_size: 11.0,
                    fill: "#222".to_string(),
                    anchor: TextAnchor::End,
                    bold: false,
                },
            ]),
            &SvgRenderOptions {
                background: None,
                ..Default::default()
            },
        );

        let rect = svg.find("rack-frame").unwrap();
        let image = svg.find("<image").unwrap();
        let text = svg.find("<text").unwrap();
        assert!(rect < image && image < text);
        assert!(svg.contains(r#"stroke-dasharray="6 4""#));
        assert!(svg.contains(r#"preserveAspectRatio="none" xlink:href="data:image/png;base64,AA==""#));
        assert!(svg.contains(">Compute-&lt;1&gt;</text>"));
        assert!(!svg.contains(r#"class="background""#));
    }
}
