use rackdraw_core::{DeviceKind, Diagnostic, HeightClass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in canvas space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// One drawing primitive. A diagram is an ordered list of these, painted first to last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Rect {
        class: String,
        rect: Rect,
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: f64,
        corner_radius: f64,
        dashed: bool,
    },
    Line {
        class: String,
        from: Point,
        to: Point,
        stroke: String,
        stroke_width: f64,
    },
    Polyline {
        class: String,
        points: Vec<Point>,
        stroke: String,
        stroke_width: f64,
    },
    Text {
        class: String,
        at: Point,
        text: String,
        font_size: f64,
        fill: String,
        anchor: TextAnchor,
        bold: bool,
    },
    /// Embedded raster image stretched to `rect` (aspect ratio is not preserved).
    Image {
        class: String,
        rect: Rect,
        href: String,
    },
    Circle {
        class: String,
        center: Point,
        radius: f64,
        fill: String,
        stroke: Option<String>,
    },
}

impl Primitive {
    pub fn class(&self) -> &str {
        match self {
            Self::Rect { class, .. }
            | Self::Line { class, .. }
            | Self::Polyline { class, .. }
            | Self::Text { class, .. }
            | Self::Image { class, .. }
            | Self::Circle { class, .. } => class,
        }
    }
}

/// How a placed device body was drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceVisual {
    Image { source: String },
    Glyph { fill: String, code: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLayout {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    /// Vertical distance the label was moved from the device midpoint to stay legible.
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedDevice {
    pub id: String,
    pub kind: DeviceKind,
    pub model: String,
    pub status: String,
    pub bottom_unit: u8,
    pub top_unit: u8,
    pub height: HeightClass,
    pub body: Rect,
    pub visual: DeviceVisual,
    pub label: LabelLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    /// Populated rack elevation.
    Rack,
    /// No device had a usable position; the drawing is a labeled empty frame.
    Placeholder,
}

/// The finished, immutable drawing handed to the document layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub(crate) kind: DiagramKind,
    pub(crate) title: Option<String>,
    pub(crate) view_box: Bounds,
    pub(crate) scale: f64,
    pub(crate) devices: Vec<PlacedDevice>,
    pub(crate) primitives: Vec<Primitive>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Diagram {
    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == DiagramKind::Placeholder
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Natural drawing extent; primitives are expressed in these units.
    pub fn view_box(&self) -> Bounds {
        self.view_box
    }

    /// Uniform scale applied to fit the caller's content area.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn width(&self) -> f64 {
        self.view_box.width() * self.scale
    }

    pub fn height(&self) -> f64 {
        self.view_box.height() * self.scale
    }

    pub fn devices(&self) -> &[PlacedDevice] {
        &self.devices
    }

    pub fn device(&self, kind: DeviceKind, id: &str) -> Option<&PlacedDevice> {
        self.devices.iter().find(|d| d.kind == kind && d.id == id)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
