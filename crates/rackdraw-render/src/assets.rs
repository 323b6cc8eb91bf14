//! Device photo library.
//!
//! Assets live in one flat directory and are named `{normalized-model}_{height}u.{png,jpg,jpeg}`.
//! The directory is scanned once; lookups afterwards are pure reads of the resulting index.

use base64::Engine as _;
use rackdraw_core::Diagnostic;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Lowercases `model` and collapses every run of non-alphanumeric characters into one `_`.
pub fn normalize_model(model: &str) -> String {
    let mut out = String::with_capacity(model.len());
    let mut pending_sep = false;
    for ch in model.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey {
    pub model: String,
    pub height_units: u8,
}

impl AssetKey {
    /// Splits a file stem such as `alpha_1u` into `("alpha", 1)`.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let stem = normalize_model(stem);
        let (model, height) = stem.rsplit_once('_')?;
        let digits = height.strip_suffix('u')?;
        if model.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let height_units = digits.parse::<u8>().ok().filter(|h| *h > 0)?;
        Some(Self {
            model: model.to_string(),
            height_units,
        })
    }
}

/// A decoded, embeddable device photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub key: AssetKey,
    pub path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// `data:` URI with the original file bytes, ready for an SVG `<image>`.
    pub data_uri: String,
}

impl ImageAsset {
    /// Decodes `bytes` to validate them and builds the embeddable asset.
    pub fn from_bytes(key: AssetKey, path: PathBuf, bytes: &[u8]) -> Result<Self, String> {
        let format = image::guess_format(bytes).map_err(|e| e.to_string())?;
        let mime = match format {
            image::ImageFormat::Png => "image/png",
            image::ImageFormat::Jpeg => "image/jpeg",
            other => return Err(format!("unsupported image format {other:?}")),
        };
        let decoded =
            image::load_from_memory_with_format(bytes, format).map_err(|e| e.to_string())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self {
            key,
            path,
            pixel_width: decoded.width(),
            pixel_height: decoded.height(),
            data_uri: format!("data:{mime};base64,{encoded}"),
        })
    }
}

/// Immutable index of device photos keyed by normalized model name and height.
#[derive(Debug, Clone, Default)]
pub struct ImageLibrary {
    root: Option<PathBuf>,
    assets: BTreeMap<AssetKey, Arc<ImageAsset>>,
    diagnostics: Vec<Diagnostic>,
}

impl ImageLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_assets(assets: impl IntoIterator<Item = ImageAsset>) -> Self {
        Self {
            root: None,
            assets: assets
                .into_iter()
                .map(|a| (a.key.clone(), Arc::new(a)))
                .collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Indexes every image in `dir` (non-recursive).
    ///
    /// Never fails: a missing directory, unreadable or undecodable files and files that do not
    /// follow the naming convention are skipped and reported through [`Self::diagnostics`].
    pub fn scan(dir: &Path) -> Self {
        let mut lib = Self {
            root: Some(dir.to_path_buf()),
            ..Self::default()
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                lib.record(Diagnostic::AssetLoadFailed {
                    path: dir.display().to_string(),
                    message: format!("asset directory unavailable: {err}"),
                });
                return lib;
            }
        };

        // Sorted so diagnostics and duplicate resolution do not depend on directory order.
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let Some(ext) = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
            else {
                continue;
            };
            if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                tracing::debug!(path = %path.display(), "skipping non-image file");
                continue;
            }

            let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(AssetKey::from_file_stem)
            else {
                lib.record(Diagnostic::AssetLoadFailed {
                    path: path.display().to_string(),
                    message: "file name does not follow <model>_<height>u".to_string(),
                });
                continue;
            };

            let loaded = std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| ImageAsset::from_bytes(key.clone(), path.clone(), &bytes));
            match loaded {
                Ok(asset) => {
                    if lib.assets.contains_key(&key) {
                        lib.record(Diagnostic::AssetLoadFailed {
                            path: path.display().to_string(),
                            message: format!(
                                "duplicate asset for {}_{}u, keeping the first",
                                key.model, key.height_units
                            ),
                        });
                        continue;
                    }
                    tracing::debug!(
                        path = %path.display(),
                        model = key.model.as_str(),
                        height_units = key.height_units,
                        "indexed image asset"
                    );
                    lib.assets.insert(key, Arc::new(asset));
                }
                Err(message) => lib.record(Diagnostic::AssetLoadFailed {
                    path: path.display().to_string(),
                    message,
                }),
            }
        }
        lib
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.assets.keys()
    }

    /// Problems found while scanning.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finds the photo for `model` at `height_units`.
    ///
    /// Exact normalized-name match first, then the longest known model name contained in the
    /// normalized query (ties broken alphabetically).
    pub fn lookup(&self, model: &str, height_units: u8) -> Option<&Arc<ImageAsset>> {
        let query = normalize_model(model);
        if query.is_empty() {
            return None;
        }

        let exact = AssetKey {
            model: query.clone(),
            height_units,
        };
        if let Some(asset) = self.assets.get(&exact) {
            return Some(asset);
        }

        self.assets
            .iter()
            .filter(|(k, _)| k.height_units == height_units && query.contains(k.model.as_str()))
            .min_by(|(a, _), (b, _)| {
                b.model
                    .len()
                    .cmp(&a.model.len())
                    .then_with(|| a.model.cmp(&b.model))
            })
            .map(|(_, asset)| asset)
    }
}
