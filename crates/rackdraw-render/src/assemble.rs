//! Diagram assembly, driven as a small typestate machine:
//!
//! `Empty -> RackDrawn -> DevicesPlaced -> Diagram`, or `RackDrawn -> Placeholder -> Diagram` when
//! not a single device has a usable rack position.

use crate::LayoutOptions;
use crate::assets::{ImageAsset, ImageLibrary, normalize_model};
use crate::canvas::{RackGeometry, RackOccupancy};
use crate::device::{self, LabelSide, RenderAsset};
use crate::labels::spread_labels;
use crate::model::{
    Bounds, Diagram, DiagramKind, LabelLayout, PlacedDevice, Point, Primitive, Rect, TextAnchor,
};
use crate::settings::LayoutSettings;
use crate::text::{TextMeasurer, TextStyle};
use rackdraw_core::{
    Classification, DeviceKind, DeviceRecord, Diagnostic, HeightClassifier, RACK_UNITS, UnitIndex,
    parse_position,
};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Everything a generation run reads. Borrowed for the duration of one call.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub settings: &'a LayoutSettings,
    pub classifier: &'a HeightClassifier,
    pub library: &'a ImageLibrary,
    pub options: &'a LayoutOptions,
}

impl RenderContext<'_> {
    fn measurer(&self) -> &dyn TextMeasurer {
        self.options.text_measurer.as_ref()
    }
}

/// The two device collections, processed compute first, each in input order.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSets<'a> {
    pub compute: &'a [DeviceRecord],
    pub storage: &'a [DeviceRecord],
}

impl<'a> DeviceSets<'a> {
    fn iter(self) -> impl Iterator<Item = (DeviceKind, &'a DeviceRecord)> {
        let compute = self.compute.iter().map(|d| (DeviceKind::Compute, d));
        let storage = self.storage.iter().map(|d| (DeviceKind::Storage, d));
        compute.chain(storage)
    }
}

fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    diagnostic.emit();
    diagnostics.push(diagnostic);
}

fn fit_scale(view_box: &Bounds, options: &LayoutOptions) -> f64 {
    let valid = |v: &f64| v.is_finite() && *v > 0.0;
    let mut scale = f64::INFINITY;
    if let Some(w) = options.content_width.filter(valid) {
        scale = scale.min(w / view_box.width().max(1.0));
    }
    if let Some(h) = options.content_height.filter(valid) {
        scale = scale.min(h / view_box.height().max(1.0));
    }
    if scale.is_finite() { scale } else { 1.0 }
}

fn label_column_width(
    ctx: &RenderContext<'_>,
    devices: &[DeviceRecord],
    kind: DeviceKind,
) -> f64 {
    let style = TextStyle {
        font_family: Some(ctx.settings.theme.font_family.clone()),
        font_size: ctx.settings.label_font_size,
        font_weight: None,
    };
    devices
        .iter()
        .map(|d| ctx.measurer().measure(&d.label(kind), &style).width + 4.0)
        .fold(ctx.settings.label_column_width, f64::max)
}

/// Nothing drawn yet.
pub struct Empty<'a> {
    ctx: RenderContext<'a>,
    devices: DeviceSets<'a>,
    title: Option<String>,
}

impl<'a> Empty<'a> {
    pub fn new(ctx: RenderContext<'a>, devices: DeviceSets<'a>, title: Option<String>) -> Self {
        Self {
            ctx,
            devices,
            title,
        }
    }

    /// Draws the 42-unit frame, unit division lines and unit numbers (1 at the bottom).
    pub fn draw_rack(self) -> RackDrawn<'a> {
        let settings = self.ctx.settings;
        let theme = &settings.theme;
        let geometry = RackGeometry::new(
            settings,
            label_column_width(&self.ctx, self.devices.compute, DeviceKind::Compute),
            label_column_width(&self.ctx, self.devices.storage, DeviceKind::Storage),
            self.title.is_some(),
        );

        let mut primitives = Vec::new();
        push_title(&mut primitives, &geometry, settings, self.title.as_deref());

        primitives.push(Primitive::Rect {
            class: "rack-frame".to_string(),
            rect: Rect {
                x: geometry.frame_left,
                y: geometry.frame_top,
                width: geometry.frame_right() - geometry.frame_left,
                height: geometry.frame_bottom() - geometry.frame_top,
            },
            fill: Some(theme.frame_color.clone()),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 3.0,
            dashed: false,
        });
        for rail_x in [geometry.frame_left, geometry.inner_right()] {
            primitives.push(Primitive::Rect {
                class: "rack-rail".to_string(),
                rect: Rect {
                    x: rail_x,
                    y: geometry.units_top,
                    width: geometry.rail_width,
                    height: geometry.units_bottom - geometry.units_top,
                },
                fill: Some(theme.rail_color.clone()),
                stroke: None,
                stroke_width: 0.0,
                corner_radius: 0.0,
                dashed: false,
            });
        }
        primitives.push(Primitive::Rect {
            class: "rack-slots".to_string(),
            rect: Rect {
                x: geometry.inner_left(),
                y: geometry.units_top,
                width: geometry.inner_width,
                height: geometry.units_bottom - geometry.units_top,
            },
            fill: Some(theme.slot_color.clone()),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
            dashed: false,
        });

        for boundary in 1..RACK_UNITS {
            let y = geometry.to_canvas_y(f64::from(boundary) * geometry.unit_height);
            primitives.push(Primitive::Line {
                class: "unit-line".to_string(),
                from: Point {
                    x: geometry.inner_left(),
                    y,
                },
                to: Point {
                    x: geometry.inner_right(),
                    y,
                },
                stroke: theme.grid_color.clone(),
                stroke_width: 0.5,
            });
        }

        let number_size = (geometry.unit_height * 0.45).min(geometry.rail_width * 0.45);
        for unit in (1..=RACK_UNITS).filter_map(UnitIndex::new) {
            let span = geometry.unit_span(unit);
            let mid_y = geometry.to_canvas_y((span.lo + span.hi) / 2.0);
            for rail_x in [geometry.frame_left, geometry.inner_right()] {
                primitives.push(Primitive::Text {
                    class: "unit-number".to_string(),
                    at: Point {
                        x: rail_x + geometry.rail_width / 2.0,
                        y: mid_y,
                    },
                    text: unit.get().to_string(),
                    font_size: number_size,
                    fill: "#f9fafb".to_string(),
                    anchor: TextAnchor::Middle,
                    bold: false,
                });
            }
        }

        RackDrawn {
            ctx: self.ctx,
            devices: self.devices,
            title: self.title,
            geometry,
            primitives,
            diagnostics: Vec::new(),
        }
    }
}

fn push_title(
    primitives: &mut Vec<Primitive>,
    geometry: &RackGeometry,
    settings: &LayoutSettings,
    title: Option<&str>,
) {
    let (Some(title), Some(y)) = (title, geometry.title_y) else {
        return;
    };
    primitives.push(Primitive::Text {
        class: "rack-title".to_string(),
        at: Point {
            x: (geometry.frame_left + geometry.frame_right()) / 2.0,
            y,
        },
        text: title.to_string(),
        font_size: settings.label_font_size * 1.4,
        fill: settings.theme.text_color.clone(),
        anchor: TextAnchor::Middle,
        bold: true,
    });
}

/// Frame drawn, no device admitted yet.
pub struct RackDrawn<'a> {
    ctx: RenderContext<'a>,
    devices: DeviceSets<'a>,
    title: Option<String>,
    geometry: RackGeometry,
    primitives: Vec<Primitive>,
    diagnostics: Vec<Diagnostic>,
}

struct PendingLabel {
    device: usize,
    side: LabelSide,
}

impl<'a> RackDrawn<'a> {
    pub fn geometry(&self) -> &RackGeometry {
        &self.geometry
    }

    /// Parses, classifies, admits and draws every device. Devices failing a step are skipped
    /// with a diagnostic.
    ///
    /// Returns the placeholder state when no device at all has a usable position.
    pub fn place_devices(mut self) -> Result<DevicesPlaced<'a>, Placeholder<'a>> {
        let ctx = self.ctx;
        let mut occupancy = RackOccupancy::new();
        let mut photos: FxHashMap<(String, u8), Option<Arc<ImageAsset>>> = FxHashMap::default();
        let mut placed: Vec<PlacedDevice> = Vec::new();
        let mut pending: Vec<PendingLabel> = Vec::new();
        let mut usable_positions = 0usize;

        for (kind, dev) in self.devices.iter() {
            let top = match parse_position(&dev.position) {
                Ok(top) => top,
                Err(err) => {
                    record(
                        &mut self.diagnostics,
                        Diagnostic::UnparseablePosition {
                            kind,
                            device_id: dev.id.clone(),
                            position: dev.position.clone(),
                            message: err.to_string(),
                        },
                    );
                    continue;
                }
            };
            usable_positions += 1;

            let height = match ctx.classifier.classify(&dev.model) {
                Classification::Matched(h) => h,
                c @ Classification::Defaulted => {
                    record(
                        &mut self.diagnostics,
                        Diagnostic::UnknownModel {
                            kind,
                            device_id: dev.id.clone(),
                            model: dev.model.clone(),
                        },
                    );
                    c.height()
                }
            };

            let placement = match occupancy.admit(kind, dev, top, height) {
                Ok(p) => p.clone(),
                Err(reason) => {
                    record(
                        &mut self.diagnostics,
                        Diagnostic::RejectedPlacement {
                            kind,
                            device_id: dev.id.clone(),
                            reason,
                        },
                    );
                    continue;
                }
            };

            // One library lookup per (model, height) for the whole run.
            let photo = match photos.entry((normalize_model(&dev.model), height.units())) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let (photo, missing) = device::lookup_photo(ctx.library, &dev.model, height);
                    if let Some(d) = missing {
                        record(&mut self.diagnostics, d);
                    }
                    entry.insert(photo)
                }
            };
            let asset = RenderAsset::for_device(photo.as_ref(), &ctx.settings.theme, kind);

            let drawing = device::draw_device(
                &self.geometry,
                ctx.settings,
                ctx.measurer(),
                &placement,
                &asset,
            );
            self.primitives.extend(drawing.primitives);

            pending.push(PendingLabel {
                device: placed.len(),
                side: LabelSide::for_kind(kind),
            });
            placed.push(PlacedDevice {
                label: LabelLayout {
                    text: placement.label(),
                    x: 0.0,
                    y: drawing.body.mid_y(),
                    anchor: TextAnchor::Start,
                    offset: 0.0,
                },
                id: placement.id,
                kind,
                model: placement.model,
                status: placement.status,
                bottom_unit: placement.bottom_unit.get(),
                top_unit: top.get(),
                height,
                body: drawing.body,
                visual: drawing.visual,
            });
        }

        if usable_positions == 0 {
            record(
                &mut self.diagnostics,
                Diagnostic::PlaceholderFallback {
                    compute_devices: self.devices.compute.len(),
                    storage_devices: self.devices.storage.len(),
                },
            );
            return Err(Placeholder {
                ctx,
                title: self.title,
                geometry: self.geometry,
                diagnostics: self.diagnostics,
            });
        }

        tracing::debug!(
            placed = placed.len(),
            free_units = occupancy.free_units(),
            "devices placed"
        );
        self.draw_labels(&mut placed, &pending);

        Ok(DevicesPlaced {
            ctx,
            title: self.title,
            geometry: self.geometry,
            primitives: self.primitives,
            devices: placed,
            diagnostics: self.diagnostics,
        })
    }

    fn draw_labels(&mut self, placed: &mut [PlacedDevice], pending: &[PendingLabel]) {
        let settings = self.ctx.settings;
        let spacing = settings.label_line_height();
        let min_y = self.geometry.frame_top + spacing / 2.0;
        let max_y = self.geometry.frame_bottom() - spacing / 2.0;

        let mut lowest = f64::NEG_INFINITY;
        for side in [LabelSide::Left, LabelSide::Right] {
            let on_side: Vec<usize> = pending
                .iter()
                .filter(|p| p.side == side)
                .map(|p| p.device)
                .collect();
            let desired: Vec<f64> = on_side.iter().map(|&i| placed[i].body.mid_y()).collect();
            let ys = spread_labels(&desired, spacing, min_y, max_y);

            lowest = ys.iter().copied().fold(lowest, f64::max);
            for (&idx, y) in on_side.iter().zip(ys) {
                let dev = &mut placed[idx];
                let (prims, layout) = device::draw_label(
                    &self.geometry,
                    settings,
                    &dev.body,
                    side,
                    dev.label.text.clone(),
                    y,
                );
                self.primitives.extend(prims);
                dev.label = layout;
            }
        }
        // A label column taller than the frame runs past it; keep those labels in view.
        self.geometry.extend_below(lowest + spacing / 2.0, settings.padding);
    }
}

/// Every admitted device drawn and labeled.
pub struct DevicesPlaced<'a> {
    ctx: RenderContext<'a>,
    title: Option<String>,
    geometry: RackGeometry,
    primitives: Vec<Primitive>,
    devices: Vec<PlacedDevice>,
    diagnostics: Vec<Diagnostic>,
}

impl DevicesPlaced<'_> {
    pub fn devices(&self) -> &[PlacedDevice] {
        &self.devices
    }

    pub fn finalize(self) -> Diagram {
        let view_box = self.geometry.view_box();
        Diagram {
            kind: DiagramKind::Rack,
            title: self.title,
            scale: fit_scale(&view_box, self.ctx.options),
            view_box,
            devices: self.devices,
            primitives: self.primitives,
            diagnostics: self.diagnostics,
        }
    }
}

/// Detailed layout abandoned: a labeled empty frame of the same footprint.
pub struct Placeholder<'a> {
    ctx: RenderContext<'a>,
    title: Option<String>,
    geometry: RackGeometry,
    diagnostics: Vec<Diagnostic>,
}

impl Placeholder<'_> {
    pub fn finalize(self) -> Diagram {
        let settings = self.ctx.settings;
        let theme = &settings.theme;
        let g = &self.geometry;

        let mut primitives = Vec::new();
        push_title(&mut primitives, g, settings, self.title.as_deref());
        primitives.push(Primitive::Rect {
            class: "placeholder-frame".to_string(),
            rect: Rect {
                x: g.frame_left,
                y: g.frame_top,
                width: g.frame_right() - g.frame_left,
                height: g.frame_bottom() - g.frame_top,
            },
            fill: Some(theme.slot_color.clone()),
            stroke: Some(theme.frame_color.clone()),
            stroke_width: 1.5,
            corner_radius: 3.0,
            dashed: true,
        });

        let center_x = (g.frame_left + g.frame_right()) / 2.0;
        let center_y = (g.frame_top + g.frame_bottom()) / 2.0;
        let line = settings.label_line_height();
        let lines = [
            ("placeholder-heading", "Rack layout unavailable", true, -line),
            (
                "placeholder-detail",
                "No device reported a usable rack position",
                false,
                0.0,
            ),
        ];
        for (class, text, bold, dy) in lines {
            primitives.push(Primitive::Text {
                class: class.to_string(),
                at: Point {
                    x: center_x,
                    y: center_y + dy,
                },
                text: text.to_string(),
                font_size: settings.label_font_size,
                fill: theme.text_color.clone(),
                anchor: TextAnchor::Middle,
                bold,
            });
        }

        let view_box = g.view_box();
        Diagram {
            kind: DiagramKind::Placeholder,
            title: self.title,
            scale: fit_scale(&view_box, self.ctx.options),
            view_box,
            devices: Vec::new(),
            primitives,
            diagnostics: self.diagnostics,
        }
    }
}

/// Runs the whole machine: always yields a diagram, populated or placeholder.
pub fn assemble(ctx: RenderContext<'_>, devices: DeviceSets<'_>, title: Option<String>) -> Diagram {
    match Empty::new(ctx, devices, title).draw_rack().place_devices() {
        Ok(placed) => placed.finalize(),
        Err(placeholder) => placeholder.finalize(),
    }
}
