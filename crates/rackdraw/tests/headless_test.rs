use rackdraw::render::{HeadlessRenderer, sanitize_svg_id};
use rackdraw::{DeviceRecord, Inventory};

const INVENTORY_YAML: &str = r#"
rack_name: "Row 4 / 12"
compute:
  - { id: n1, model: alpha_1u, position: U40, status: ACTIVE }
  - { id: n2, model: alpha_1u, position: "U 39", status: ACTIVE }
storage:
  - { id: d1, model: beta_2u, position: RU12, status: ACTIVE }
"#;

#[test]
fn sanitize_svg_id_produces_safe_tokens() {
    assert_eq!(sanitize_svg_id("Row 4 / 12"), "Row-4-12");
    assert_eq!(sanitize_svg_id("  rack_a.1 "), "rack_a.1");
    assert_eq!(sanitize_svg_id("42"), "rack-42");
    assert_eq!(sanitize_svg_id("<>"), "rack-untitled");
    assert_eq!(sanitize_svg_id(""), "rack-untitled");
}

#[test]
fn layout_text_accepts_yaml_inventories() {
    let renderer = HeadlessRenderer::new();
    let diagram = renderer.layout_text(INVENTORY_YAML).expect("inventory parses");
    assert_eq!(diagram.devices().len(), 3);
    assert_eq!(diagram.title(), Some("Row 4 / 12"));
}

#[test]
fn layout_text_reports_malformed_documents() {
    let renderer = HeadlessRenderer::new();
    assert!(renderer.layout_text("{ \"compute\": 3 }").is_err());
}

#[test]
fn svg_uses_sanitized_diagram_id() {
    let renderer = HeadlessRenderer::new().with_content_area(Some(400.0), None);
    let inventory = Inventory {
        rack_name: None,
        compute: vec![DeviceRecord::new("1", "alpha_1u", "U1", "ACTIVE")],
        storage: Vec::new(),
    };
    let svg = renderer.render_svg_sync_with_diagram_id(&inventory, "lab rack #2");
    assert!(svg.starts_with(r#"<svg id="lab-rack-2" width="400""#));
}
