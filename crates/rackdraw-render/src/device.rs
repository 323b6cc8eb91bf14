//! Drawing of one admitted device: body (photo or glyph), status indicator, external label.

use crate::assets::{ImageAsset, ImageLibrary};
use crate::canvas::{Placement, RackGeometry};
use crate::model::{DeviceVisual, LabelLayout, Point, Primitive, Rect, TextAnchor};
use crate::settings::{LayoutSettings, Theme};
use crate::text::{TextMeasurer, TextStyle, truncate_to_width};
use rackdraw_core::{DeviceKind, Diagnostic, HeightClass};
use std::sync::Arc;

/// Synthetic stand-in drawn when no photo exists for a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphAsset {
    pub fill: String,
    pub code: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderAsset {
    Image(Arc<ImageAsset>),
    Glyph(GlyphAsset),
}

impl RenderAsset {
    /// The photo when there is one, otherwise the device-kind glyph.
    pub fn for_device(photo: Option<&Arc<ImageAsset>>, theme: &Theme, kind: DeviceKind) -> Self {
        match photo {
            Some(asset) => Self::Image(Arc::clone(asset)),
            None => Self::Glyph(GlyphAsset {
                fill: theme.kind_color(kind).to_string(),
                code: kind.glyph_code(),
            }),
        }
    }
}

/// Looks up the photo for `model` at `height`.
///
/// A miss is reported as [`Diagnostic::MissingAsset`]; it is the usual outcome, not an error.
/// The result does not depend on the device kind, so compute and storage devices of the same
/// model share one lookup.
pub fn lookup_photo(
    library: &ImageLibrary,
    model: &str,
    height: HeightClass,
) -> (Option<Arc<ImageAsset>>, Option<Diagnostic>) {
    match library.lookup(model, height.units()) {
        Some(asset) => (Some(Arc::clone(asset)), None),
        None => (
            None,
            Some(Diagnostic::MissingAsset {
                model: model.to_string(),
                height_units: height.units(),
            }),
        ),
    }
}

pub fn status_color<'a>(theme: &'a Theme, status: &str) -> &'a str {
    match status.trim().to_ascii_uppercase().as_str() {
        "ACTIVE" | "ONLINE" | "OK" | "HEALTHY" | "UP" => &theme.status_active,
        "OFFLINE" | "FAILED" | "FAILURE" | "ERROR" | "DOWN" | "INACTIVE" => &theme.status_offline,
        _ => &theme.status_unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSide {
    Left,
    Right,
}

impl LabelSide {
    pub fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Compute => Self::Left,
            DeviceKind::Storage => Self::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDrawing {
    pub body: Rect,
    pub visual: DeviceVisual,
    pub primitives: Vec<Primitive>,
}

fn kind_class(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Compute => "compute",
        DeviceKind::Storage => "storage",
    }
}

/// Body and status indicator of `placement`. Labels are drawn separately once every device is
/// known, see [`draw_label`].
pub fn draw_device(
    geometry: &RackGeometry,
    settings: &LayoutSettings,
    measurer: &dyn TextMeasurer,
    placement: &Placement,
    asset: &RenderAsset,
) -> DeviceDrawing {
    let theme = &settings.theme;
    let body = geometry.body_rect(placement.bottom_unit, placement.height.units());
    let kind = kind_class(placement.kind);
    let mut primitives = Vec::new();

    let visual = match asset {
        RenderAsset::Image(image) => {
            primitives.push(Primitive::Image {
                class: format!("device-image {kind}"),
                rect: body,
                href: image.data_uri.clone(),
            });
            primitives.push(Primitive::Rect {
                class: format!("device-outline {kind}"),
                rect: body,
                fill: None,
                stroke: Some(theme.frame_color.clone()),
                stroke_width: 0.5,
                corner_radius: 0.0,
                dashed: false,
            });
            DeviceVisual::Image {
                source: image.path.display().to_string(),
            }
        }
        RenderAsset::Glyph(glyph) => {
            primitives.push(Primitive::Rect {
                class: format!("device-body {kind}"),
                rect: body,
                fill: Some(glyph.fill.clone()),
                stroke: Some(theme.frame_color.clone()),
                stroke_width: 0.75,
                corner_radius: 2.0,
                dashed: false,
            });

            let code_size = (body.height * 0.55).min(settings.label_font_size);
            primitives.push(Primitive::Text {
                class: "device-code".to_string(),
                at: Point {
                    x: body.x + 6.0,
                    y: body.mid_y(),
                },
                text: glyph.code.to_string(),
                font_size: code_size,
                fill: "#ffffff".to_string(),
                anchor: TextAnchor::Start,
                bold: true,
            });

            let model_style = TextStyle {
                font_family: Some(theme.font_family.clone()),
                font_size: code_size * 0.9,
                font_weight: None,
            };
            // Keep the model name clear of the code on the left and the status dot on the right.
            let reserved = 6.0 + measurer.measure(glyph.code, &model_style).width * 1.2 + 24.0;
            let model_text = truncate_to_width(
                measurer,
                placement.model.trim(),
                &model_style,
                (body.width - 2.0 * reserved).max(0.0),
            );
            if !model_text.is_empty() {
                primitives.push(Primitive::Text {
                    class: "device-model".to_string(),
                    at: Point {
                        x: body.x + body.width / 2.0,
                        y: body.mid_y(),
                    },
                    text: model_text,
                    font_size: model_style.font_size,
                    fill: "#ffffff".to_string(),
                    anchor: TextAnchor::Middle,
                    bold: false,
                });
            }

            DeviceVisual::Glyph {
                fill: glyph.fill.clone(),
                code: glyph.code.to_string(),
            }
        }
    };

    let radius = (geometry.unit_height * 0.2).clamp(1.5, 4.0);
    primitives.push(Primitive::Circle {
        class: "device-status".to_string(),
        center: Point {
            x: body.right() - radius - 5.0,
            y: body.mid_y(),
        },
        radius,
        fill: status_color(theme, &placement.status).to_string(),
        stroke: Some("#ffffff".to_string()),
    });

    DeviceDrawing {
        body,
        visual,
        primitives,
    }
}

/// External label at `label_y`, joined to the device body by an elbow connector.
pub fn draw_label(
    geometry: &RackGeometry,
    settings: &LayoutSettings,
    body: &Rect,
    side: LabelSide,
    text: String,
    label_y: f64,
) -> (Vec<Primitive>, LabelLayout) {
    let elbow = settings.label_gap / 2.0;
    let (start, bend, end, text_x, anchor) = match side {
        LabelSide::Left => (
            Point {
                x: body.x,
                y: body.mid_y(),
            },
            Point {
                x: geometry.frame_left - elbow,
                y: body.mid_y(),
            },
            Point {
                x: geometry.left_labels_x + 3.0,
                y: label_y,
            },
            geometry.left_labels_x,
            TextAnchor::End,
        ),
        LabelSide::Right => (
            Point {
                x: body.right(),
                y: body.mid_y(),
            },
            Point {
                x: geometry.frame_right() + elbow,
                y: body.mid_y(),
            },
            Point {
                x: geometry.right_labels_x - 3.0,
                y: label_y,
            },
            geometry.right_labels_x,
            TextAnchor::Start,
        ),
    };

    let primitives = vec![
        Primitive::Polyline {
            class: "label-connector".to_string(),
            points: vec![start, bend, end],
            stroke: settings.theme.text_color.clone(),
            stroke_width: 0.75,
        },
        Primitive::Text {
            class: "device-label".to_string(),
            at: Point {
                x: text_x,
                y: label_y,
            },
            text: text.clone(),
            font_size: settings.label_font_size,
            fill: settings.theme.text_color.clone(),
            anchor,
            bold: false,
        },
    ];

    let layout = LabelLayout {
        text,
        x: text_x,
        y: label_y,
        anchor,
        offset: label_y - body.mid_y(),
    };
    (primitives, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKey;
    use crate::text::DeterministicTextMeasurer;
    use rackdraw_core::UnitIndex;
    use std::path::PathBuf;

    fn placement(kind: DeviceKind, top: u8, height: HeightClass, status: &str) -> Placement {
        Placement {
            id: "7".to_string(),
            kind,
            model: "alpha_1u".to_string(),
            status: status.to_string(),
            bottom_unit: UnitIndex::new(top + 1 - height.units()).unwrap(),
            height,
        }
    }

    fn geometry(settings: &LayoutSettings) -> RackGeometry {
        RackGeometry::new(settings, 120.0, 120.0, false)
    }

    #[test]
    fn missing_asset_falls_back_to_kind_glyph() {
        let settings = LayoutSettings::default();
        let (photo, diag) = lookup_photo(&ImageLibrary::empty(), "beta_2u", HeightClass::TwoU);
        assert!(photo.is_none());
        assert_eq!(
            RenderAsset::for_device(photo.as_ref(), &settings.theme, DeviceKind::Storage),
            RenderAsset::Glyph(GlyphAsset {
                fill: settings.theme.storage_color.clone(),
                code: "STG"
            })
        );
        assert_eq!(
            diag,
            Some(Diagnostic::MissingAsset {
                model: "beta_2u".to_string(),
                height_units: 2
            })
        );
    }

    #[test]
    fn image_asset_fills_the_unit_span_exactly() {
        let settings = LayoutSettings::default();
        let g = geometry(&settings);
        let image = Arc::new(ImageAsset {
            key: AssetKey {
                model: "beta".to_string(),
                height_units: 2,
            },
            path: PathBuf::from("beta_2u.png"),
            pixel_width: 640,
            pixel_height: 90,
            data_uri: "data:image/png;base64,AAAA".to_string(),
        });
        let p = placement(DeviceKind::Storage, 17, HeightClass::TwoU, "ACTIVE");
        let drawing = draw_device(
            &g,
            &settings,
            &DeterministicTextMeasurer::default(),
            &p,
            &RenderAsset::Image(image),
        );

        let Some(Primitive::Image { rect, href, .. }) = drawing.primitives.first() else {
            panic!("expected image primitive first");
        };
        assert_eq!(rect.width, settings.inner_width);
        assert_eq!(rect.height, settings.unit_height * 2.0);
        assert_eq!(rect.x, g.inner_left());
        assert_eq!(href, "data:image/png;base64,AAAA");
        assert!(matches!(drawing.visual, DeviceVisual::Image { .. }));
    }

    #[test]
    fn every_device_gets_a_status_indicator() {
        let settings = LayoutSettings::default();
        let g = geometry(&settings);
        for status in ["ACTIVE", "offline", "", "degraded"] {
            let p = placement(DeviceKind::Compute, 25, HeightClass::OneU, status);
            let asset = RenderAsset::for_device(None, &settings.theme, p.kind);
            let drawing = draw_device(
                &g,
                &settings,
                &DeterministicTextMeasurer::default(),
                &p,
                &asset,
            );
            let dots: Vec<_> = drawing
                .primitives
                .iter()
                .filter(|p| p.class() == "device-status")
                .collect();
            assert_eq!(dots.len(), 1, "status {status:?}");
        }
    }

    #[test]
    fn status_colors() {
        let theme = LayoutSettings::default().theme;
        assert_eq!(status_color(&theme, "ACTIVE"), theme.status_active);
        assert_eq!(status_color(&theme, " offline "), theme.status_offline);
        assert_eq!(status_color(&theme, "DEGRADED"), theme.status_unknown);
    }

    #[test]
    fn labels_sit_outside_the_frame() {
        let settings = LayoutSettings::default();
        let g = geometry(&settings);
        let body = g.body_rect(UnitIndex::new(25).unwrap(), 1);

        let (_, left) = draw_label(
            &g,
            &settings,
            &body,
            LabelSide::Left,
            "Compute-7".into(),
            body.mid_y(),
        );
        assert!(left.x < g.frame_left);
        assert_eq!(left.anchor, TextAnchor::End);
        assert_eq!(left.offset, 0.0);

        let (prims, right) = draw_label(
            &g,
            &settings,
            &body,
            LabelSide::Right,
            "Storage-7".into(),
            body.mid_y() + 6.0,
        );
        assert!(right.x > g.frame_right());
        assert_eq!(right.offset, 6.0);
        assert!(matches!(prims[0], Primitive::Polyline { .. }));
    }
}
