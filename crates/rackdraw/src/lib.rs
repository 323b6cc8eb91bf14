#![forbid(unsafe_code)]

//! `rackdraw` turns rack inventories (compute and storage devices with nominal unit positions)
//! into collision-free 42U rack elevation diagrams.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`rackdraw::render`)
//! - `raster`: enable PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion

pub use rackdraw_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use rackdraw_render::assets::ImageLibrary;
    pub use rackdraw_render::model::{Diagram, DiagramKind, PlacedDevice, Primitive};
    pub use rackdraw_render::svg::{SvgRenderOptions, render_svg};
    pub use rackdraw_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use rackdraw_render::{LayoutOptions, RackEngine, diagram_to_json};

    #[cfg(feature = "raster")]
    pub mod raster;

    use rackdraw_core::Inventory;
    use std::path::Path;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Inventory(#[from] rackdraw_core::Error),
        #[error(transparent)]
        Render(#[from] rackdraw_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string (typically a rack name) into a conservative SVG `id` token,
    /// so several rack diagrams can be inlined in one document without colliding.
    ///
    /// Unsupported characters become `-`, and the id is prefixed with `rack-` unless it already
    /// starts with an ASCII letter.
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        let mut out = String::with_capacity(raw.len() + 5);
        for ch in raw.chars() {
            let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
            out.push(if ok { ch } else { '-' });
        }

        while out.contains("--") {
            out = out.replace("--", "-");
        }
        let out = out.trim_matches('-');
        if out.is_empty() {
            return "rack-untitled".to_string();
        }
        if out.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.to_string()
        } else {
            format!("rack-{out}")
        }
    }

    /// Lays out and serializes `inventory` in one call.
    pub fn render_svg_sync(
        engine: &RackEngine,
        inventory: &Inventory,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> String {
        let diagram = engine.generate_inventory(inventory, layout_options);
        render_svg(&diagram, svg_options)
    }

    /// Bundles a configured [`RackEngine`] with layout and SVG options.
    #[derive(Clone, Default)]
    pub struct HeadlessRenderer {
        pub engine: RackEngine,
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Engine built from an optional asset directory and an optional config override file.
        pub fn from_paths(asset_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
            let engine = RackEngine::from_paths(asset_dir, config_path)?;
            let svg = SvgRenderOptions {
                font_family: Some(engine.settings().theme.font_family.clone()),
                ..SvgRenderOptions::default()
            };
            Ok(Self {
                engine,
                layout: LayoutOptions::default(),
                svg,
            })
        }

        pub fn with_content_area(mut self, width: Option<f64>, height: Option<f64>) -> Self {
            self.layout = self.layout.with_content_area(width, height);
            self
        }

        pub fn layout(&self, inventory: &Inventory) -> Diagram {
            self.engine.generate_inventory(inventory, &self.layout)
        }

        /// Parses an inventory document (JSON or YAML) and lays it out.
        pub fn layout_text(&self, text: &str) -> Result<Diagram> {
            let inventory = Inventory::from_str_auto(text)?;
            Ok(self.layout(&inventory))
        }

        pub fn render_svg_sync(&self, inventory: &Inventory) -> String {
            render_svg_sync(&self.engine, inventory, &self.layout, &self.svg)
        }

        pub fn render_svg_sync_with_diagram_id(
            &self,
            inventory: &Inventory,
            diagram_id: &str,
        ) -> String {
            let mut svg = self.svg.clone();
            svg.diagram_id = Some(sanitize_svg_id(diagram_id));
            render_svg_sync(&self.engine, inventory, &self.layout, &svg)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_sync(
            &self,
            inventory: &Inventory,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_png(&self.render_svg_sync(inventory), raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg_sync(
            &self,
            inventory: &Inventory,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_jpeg(&self.render_svg_sync(inventory), raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_pdf_sync(&self, inventory: &Inventory) -> raster::Result<Vec<u8>> {
            raster::svg_to_pdf(&self.render_svg_sync(inventory))
        }
    }
}
