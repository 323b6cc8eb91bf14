#![forbid(unsafe_code)]

//! Rack elevation layout: image library, rack canvas, device drawing and diagram assembly.

pub mod assemble;
pub mod assets;
pub mod canvas;
pub mod device;
pub mod labels;
pub mod model;
pub mod settings;
pub mod svg;
pub mod text;

use crate::assemble::{DeviceSets, RenderContext};
use crate::assets::ImageLibrary;
use crate::model::Diagram;
use crate::settings::LayoutSettings;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use rackdraw_core::{DeviceRecord, Diagnostic, HeightClassifier, Inventory, RackConfig};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] rackdraw_core::Error),
    #[error("diagram JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Width of the area the diagram must fit in. `None` keeps the natural width.
    pub content_width: Option<f64>,
    pub content_height: Option<f64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            content_width: None,
            content_height: None,
        }
    }
}

impl LayoutOptions {
    pub fn with_content_area(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.content_width = width;
        self.content_height = height;
        self
    }
}

/// Configured layout engine. The asset directory is scanned once, in the constructor; every
/// `generate` call afterwards only reads shared state.
#[derive(Debug, Clone)]
pub struct RackEngine {
    config: RackConfig,
    settings: LayoutSettings,
    classifier: HeightClassifier,
    library: ImageLibrary,
}

impl Default for RackEngine {
    fn default() -> Self {
        Self::new(RackConfig::default(), ImageLibrary::empty())
    }
}

impl RackEngine {
    pub fn new(config: RackConfig, library: ImageLibrary) -> Self {
        Self {
            settings: LayoutSettings::from_config(&config),
            classifier: HeightClassifier::from_config(&config),
            config,
            library,
        }
    }

    /// Site defaults merged with the optional override file, plus the optional asset directory.
    pub fn from_paths(asset_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => RackConfig::load_overrides(path)?,
            None => RackConfig::default(),
        };
        let library = asset_dir.map(ImageLibrary::scan).unwrap_or_default();
        tracing::debug!(
            assets = library.len(),
            asset_dir = ?asset_dir,
            "rack engine ready"
        );
        Ok(Self::new(config, library))
    }

    pub fn config(&self) -> &RackConfig {
        &self.config
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &HeightClassifier {
        &self.classifier
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    /// Problems found while scanning the asset directory.
    pub fn asset_diagnostics(&self) -> &[Diagnostic] {
        self.library.diagnostics()
    }

    /// Lays out `compute` then `storage`, each in input order.
    ///
    /// Never fails: devices that cannot be placed are skipped with a diagnostic, and a rack with no
    /// usable position at all comes back as a placeholder diagram.
    pub fn generate(
        &self,
        compute: &[DeviceRecord],
        storage: &[DeviceRecord],
        options: &LayoutOptions,
    ) -> Diagram {
        self.generate_titled(compute, storage, None, options)
    }

    /// Like [`Self::generate`]; the title is `rack.title` from the configuration, else the
    /// inventory's rack name.
    pub fn generate_inventory(&self, inventory: &Inventory, options: &LayoutOptions) -> Diagram {
        self.generate_titled(
            &inventory.compute,
            &inventory.storage,
            inventory.rack_name.as_deref(),
            options,
        )
    }

    fn generate_titled(
        &self,
        compute: &[DeviceRecord],
        storage: &[DeviceRecord],
        fallback_title: Option<&str>,
        options: &LayoutOptions,
    ) -> Diagram {
        let title = self.settings.title.clone().or_else(|| {
            fallback_title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        });
        let ctx = RenderContext {
            settings: &self.settings,
            classifier: &self.classifier,
            library: &self.library,
            options,
        };
        assemble::assemble(ctx, DeviceSets { compute, storage }, title)
    }
}

/// The diagram as JSON, as printed by `rackdraw-cli layout`.
pub fn diagram_to_json(diagram: &Diagram, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(diagram)?
    } else {
        serde_json::to_string(diagram)?
    })
}
