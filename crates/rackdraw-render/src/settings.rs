use rackdraw_core::{DeviceKind, RackConfig};

/// Typed view over the drawing-related keys of a [`RackConfig`].
///
/// Missing or nonsensical values fall back to the built-in defaults; lengths are clamped so the
/// geometry never degenerates.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    pub unit_height: f64,
    pub inner_width: f64,
    pub rail_width: f64,
    pub padding: f64,
    pub title_height: f64,
    pub title: Option<String>,
    pub label_column_width: f64,
    pub label_font_size: f64,
    pub label_gap: f64,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub font_family: String,
    pub frame_color: String,
    pub rail_color: String,
    pub slot_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub compute_color: String,
    pub storage_color: String,
    pub status_active: String,
    pub status_offline: String,
    pub status_unknown: String,
}

impl Theme {
    pub fn kind_color(&self, kind: DeviceKind) -> &str {
        match kind {
            DeviceKind::Compute => &self.compute_color,
            DeviceKind::Storage => &self.storage_color,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self::from_config(&RackConfig::default())
    }
}

impl LayoutSettings {
    pub fn from_config(cfg: &RackConfig) -> Self {
        let f = |path: &str, default: f64, min: f64| {
            cfg.get_f64(path)
                .filter(|v| v.is_finite())
                .unwrap_or(default)
                .max(min)
        };
        let s = |path: &str, default: &str| cfg.get_str(path).unwrap_or(default).to_string();

        Self {
            unit_height: f("rack.unitHeight", 20.0, 4.0),
            inner_width: f("rack.innerWidth", 240.0, 40.0),
            rail_width: f("rack.railWidth", 22.0, 4.0),
            padding: f("rack.padding", 16.0, 0.0),
            title_height: f("rack.titleHeight", 28.0, 0.0),
            title: cfg
                .get_str("rack.title")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            label_column_width: f("labels.columnWidth", 150.0, 0.0),
            label_font_size: f("labels.fontSize", 11.0, 4.0),
            label_gap: f("labels.gap", 18.0, 4.0),
            theme: Theme {
                font_family: s("theme.fontFamily", "arial,sans-serif"),
                frame_color: s("theme.frameColor", "#374151"),
                rail_color: s("theme.railColor", "#4b5563"),
                slot_color: s("theme.slotColor", "#f3f4f6"),
                grid_color: s("theme.gridColor", "#d1d5db"),
                text_color: s("theme.textColor", "#111827"),
                compute_color: s("theme.computeColor", "#2563eb"),
                storage_color: s("theme.storageColor", "#059669"),
                status_active: s("theme.statusActive", "#22c55e"),
                status_offline: s("theme.statusOffline", "#ef4444"),
                status_unknown: s("theme.statusUnknown", "#f59e0b"),
            },
        }
    }

    /// Vertical distance between two label baselines that keeps them from overlapping.
    pub fn label_line_height(&self) -> f64 {
        self.label_font_size * 1.4
    }
}
