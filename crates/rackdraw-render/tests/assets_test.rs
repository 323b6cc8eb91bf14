use rackdraw_core::{DeviceKind, DeviceRecord, Diagnostic};
use rackdraw_render::assets::ImageLibrary;
use rackdraw_render::model::{DeviceVisual, Primitive};
use rackdraw_render::{LayoutOptions, RackEngine};
use std::path::Path;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbaImage::from_pixel(width, height, image::Rgba([40, 40, 40, 255]))
        .save(dir.join(name))
        .expect("write png");
}

#[test]
fn scan_indexes_only_conforming_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "alpha_1u.png", 8, 2);
    write_png(dir.path(), "Beta-Storage_2U.png", 8, 4);
    write_png(dir.path(), "no-height.png", 4, 4);
    std::fs::write(dir.path().join("broken_1u.jpg"), b"not a jpeg").expect("write");
    std::fs::write(dir.path().join("README.txt"), b"photos").expect("write");

    let lib = ImageLibrary::scan(dir.path());
    let keys: Vec<(String, u8)> = lib
        .keys()
        .map(|k| (k.model.clone(), k.height_units))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("alpha".to_string(), 1),
            ("beta_storage".to_string(), 2)
        ]
    );

    let failed: Vec<&str> = lib
        .diagnostics()
        .iter()
        .filter_map(|d| match d {
            Diagnostic::AssetLoadFailed { path, .. } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().any(|p| p.ends_with("broken_1u.jpg")));
    assert!(failed.iter().any(|p| p.ends_with("no-height.png")));

    let alpha = lib.lookup("alpha", 1).expect("alpha asset");
    assert_eq!((alpha.pixel_width, alpha.pixel_height), (8, 2));
    assert!(alpha.data_uri.starts_with("data:image/png;base64,"));
}

#[test]
fn devices_with_a_photo_are_drawn_with_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "alpha_1u.png", 16, 2);

    let engine = RackEngine::from_paths(Some(dir.path()), None).expect("engine");
    assert!(engine.asset_diagnostics().is_empty());

    let diagram = engine.generate(
        &[
            DeviceRecord::new("1", "Alpha 1U", "U3", "ACTIVE"),
            DeviceRecord::new("2", "alpha_1u", "U4", "ACTIVE"),
            DeviceRecord::new("3", "delta_1u", "U5", "ACTIVE"),
        ],
        &[],
        &LayoutOptions::default(),
    );

    for id in ["1", "2"] {
        let dev = diagram.device(DeviceKind::Compute, id).expect("placed");
        assert!(
            matches!(&dev.visual, DeviceVisual::Image { source } if source.ends_with("alpha_1u.png")),
            "device {id}"
        );
    }
    let glyph = diagram.device(DeviceKind::Compute, "3").expect("placed");
    assert!(matches!(glyph.visual, DeviceVisual::Glyph { .. }));

    let images: Vec<_> = diagram
        .primitives()
        .iter()
        .filter_map(|p| match p {
            Primitive::Image { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 2);
    for rect in images {
        // Stretched to the rack opening regardless of the photo's own aspect ratio.
        assert_eq!(rect.width, engine.settings().inner_width);
        assert_eq!(rect.height, engine.settings().unit_height);
    }
}

#[test]
fn photo_height_must_match_the_device_height() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "beta_1u.png", 8, 2);

    let engine = RackEngine::from_paths(Some(dir.path()), None).expect("engine");
    let diagram = engine.generate(
        &[],
        &[DeviceRecord::new("1", "beta_2u", "U20", "ACTIVE")],
        &LayoutOptions::default(),
    );
    let dev = diagram.device(DeviceKind::Storage, "1").expect("placed");
    assert!(matches!(dev.visual, DeviceVisual::Glyph { .. }));
}

#[test]
fn missing_asset_directory_is_reported_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gone = dir.path().join("gone");

    let engine = RackEngine::from_paths(Some(&gone), None).expect("engine");
    assert!(engine.library().is_empty());
    assert!(matches!(
        engine.asset_diagnostics(),
        [Diagnostic::AssetLoadFailed { .. }]
    ));

    let diagram = engine.generate(
        &[DeviceRecord::new("1", "alpha_1u", "U1", "ACTIVE")],
        &[],
        &LayoutOptions::default(),
    );
    assert_eq!(diagram.devices().len(), 1);
}
