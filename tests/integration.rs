//! Integration tests for the Maquette designer pipeline.
//!
//! These tests exercise the full path from pointer events and JSON input
//! to rendered output. They verify:
//! - Element lifecycle: add, update, duplicate, delete
//! - Drag clamping and corner-anchored resizing through the designer
//! - Variable resolution and token substitution end to end
//! - Style registry linkage, deletion fallback, export/import
//! - Document save/load round trips

use maquette::canvas::{Designer, ResizeTuning};
use maquette::model::*;
use maquette::render::{RenderMode, Visual};
use maquette::style::*;
use maquette::vars;
use serde_json::json;

// ─── Helpers ────────────────────────────────────────────────────

fn designer_with(data: serde_json::Value) -> Designer {
    let mut designer = Designer::new(
        CanvasBounds {
            width: 800.0,
            height: 600.0,
        },
        StyleRegistry::new(),
        &data,
    );
    designer.set_resize_tuning(ResizeTuning::exact());
    designer
}

fn designer() -> Designer {
    designer_with(json!({}))
}

fn set_text(designer: &mut Designer, id: &ElementId, text: &str) {
    designer
        .update_element(
            id,
            ElementPatch {
                text: Some(text.to_string()),
                ..Default::default()
            },
        )
        .unwrap();
}

fn place(designer: &mut Designer, id: &ElementId, x: f64, y: f64) {
    designer
        .update_element(
            id,
            ElementPatch {
                x: Some(x),
                y: Some(y),
                ..Default::default()
            },
        )
        .unwrap();
}

fn rendered_text(designer: &Designer, id: &ElementId, mode: RenderMode) -> String {
    designer
        .render(mode)
        .into_iter()
        .find(|r| &r.id == id)
        .map(|r| r.text_content())
        .unwrap()
}

// ─── Token Substitution ─────────────────────────────────────────

#[test]
fn test_hello_token_substitutes_in_value_mode() {
    let mut d = designer_with(json!({"user": {"name": "Ann"}}));
    let id = d.add_element(ElementType::Text);
    set_text(&mut d, &id, "Hello {{user.name}}");
    assert_eq!(rendered_text(&d, &id, RenderMode::Values), "Hello Ann");
    // Token mode keeps the raw text; substitution is draw-time only.
    assert_eq!(
        rendered_text(&d, &id, RenderMode::Tokens),
        "Hello {{user.name}}"
    );
    match &d.element(&id).unwrap().kind {
        ElementKind::Text { text, .. } => assert_eq!(text, "Hello {{user.name}}"),
        _ => unreachable!(),
    }
}

#[test]
fn test_unknown_token_stays_literal() {
    let mut d = designer_with(json!({"user": {"name": "Ann"}}));
    let id = d.add_element(ElementType::Text);
    set_text(&mut d, &id, "Hi {{user.email}}");
    assert_eq!(
        rendered_text(&d, &id, RenderMode::Values),
        "Hi {{user.email}}"
    );
}

#[test]
fn test_snake_case_keys_resolve_with_dots() {
    let d = designer_with(json!({"user_id": 7, "user_name": "Ann"}));
    let paths = d.variable_paths();
    assert_eq!(paths, vec!["user.id", "user.name"]);
}

#[test]
fn test_nested_objects_flatten_to_dot_paths() {
    let variables = vars::resolve(&json!({
        "order": {"id": "A-1", "lines": [{"sku": "X"}]}
    }));
    assert!(variables.contains_key("order.id"));
    assert_eq!(variables["order.lines"].display_value, "Array[1]");
    assert_eq!(variables["order.lines[0].sku"].display_value, "X");
}

#[test]
fn test_variable_element_renders_value() {
    let mut d = designer_with(json!({"order": {"total": 42.5}}));
    let id = d.add_element(ElementType::Variable);
    d.update_element(
        &id,
        ElementPatch {
            variable: Some("order.total".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(rendered_text(&d, &id, RenderMode::Values), "42.5");
    assert_eq!(
        rendered_text(&d, &id, RenderMode::Tokens),
        "{{order.total}}"
    );
}

// ─── Drag ───────────────────────────────────────────────────────

#[test]
fn test_drag_preserves_grab_offset() {
    let mut d = designer();
    let id = d.add_element(ElementType::Rectangle);
    place(&mut d, &id, 100.0, 100.0);
    // Grab 30px into the element, clear of the handles.
    d.pointer_down(130.0, 120.0);
    d.pointer_move(330.0, 220.0);
    d.pointer_up();
    let el = d.element(&id).unwrap();
    assert_eq!((el.x, el.y), (300.0, 200.0));
}

#[test]
fn test_drag_clamps_to_canvas_bounds() {
    let mut d = designer();
    let id = d.add_element(ElementType::Rectangle); // 120x80 on an 800x600 canvas
    place(&mut d, &id, 100.0, 100.0);
    d.pointer_down(160.0, 140.0);
    d.pointer_move(5000.0, 5000.0);
    let el = d.element(&id).unwrap();
    assert_eq!((el.x, el.y), (680.0, 520.0));
    d.pointer_move(-5000.0, -5000.0);
    d.pointer_up();
    let el = d.element(&id).unwrap();
    assert_eq!((el.x, el.y), (0.0, 0.0));
}

#[test]
fn test_release_commits_position() {
    let mut d = designer();
    let id = d.add_element(ElementType::Rectangle);
    place(&mut d, &id, 100.0, 100.0);
    d.pointer_down(160.0, 140.0);
    d.pointer_move(260.0, 240.0);
    d.pointer_up();
    // Further moves after release change nothing.
    d.pointer_move(400.0, 400.0);
    let el = d.element(&id).unwrap();
    assert_eq!((el.x, el.y), (200.0, 200.0));
}

// ─── Resize ─────────────────────────────────────────────────────

#[test]
fn test_top_left_resize_anchors_bottom_right() {
    let mut d = designer();
    let id = d.add_element(ElementType::Rectangle);
    place(&mut d, &id, 50.0, 50.0);
    d.update_element(
        &id,
        ElementPatch {
            width: Some(100.0),
            height: Some(50.0),
            ..Default::default()
        },
    )
    .unwrap();
    // Element is selected; press exactly on its top-left handle.
    d.pointer_down(50.0, 50.0);
    d.pointer_move(60.0, 60.0);
    d.pointer_up();
    let el = d.element(&id).unwrap();
    let (w, h) = el.kind.size().unwrap();
    assert_eq!((el.x, el.y), (60.0, 60.0));
    assert_eq!((w, h), (90.0, 40.0));
    // The opposite corner never moved.
    assert_eq!((el.x + w, el.y + h), (150.0, 100.0));
}

#[test]
fn test_resize_respects_text_minimum() {
    let mut d = designer();
    let id = d.add_element(ElementType::Text); // min 50x30
    place(&mut d, &id, 100.0, 100.0);
    let frame = d.element(&id).unwrap().frame();
    d.pointer_down(frame.x + frame.width, frame.y + frame.height);
    d.pointer_move(frame.x - 500.0, frame.y - 500.0);
    d.pointer_up();
    let (w, h) = d.element(&id).unwrap().kind.size().unwrap();
    assert_eq!((w, h), (50.0, 30.0));
}

// ─── Styles ─────────────────────────────────────────────────────

#[test]
fn test_linked_style_cascades_into_render() {
    let mut d = designer();
    let id = d.add_element(ElementType::Text);
    d.registry_mut().add_style(
        "brand",
        StyleRecord::custom(
            "brand",
            "Brand",
            TextStyleProps {
                color: Some(Color::hex("#dc2626")),
                ..Default::default()
            },
        ),
    );
    d.update_element(
        &id,
        ElementPatch {
            text_style_id: Some(Some("brand".to_string())),
            ..Default::default()
        },
    )
    .unwrap();
    let rendered = d.render(RenderMode::Tokens);
    let Visual::Text { text_style, .. } = &rendered[0].visual else {
        unreachable!()
    };
    assert_eq!(text_style.color, Color::hex("#dc2626"));
}

#[test]
fn test_deleted_custom_style_degrades_to_default() {
    let mut d = designer();
    let id = d.add_element(ElementType::Text);
    d.registry_mut().add_style(
        "brand",
        StyleRecord::custom(
            "brand",
            "Brand",
            TextStyleProps {
                color: Some(Color::hex("#dc2626")),
                ..Default::default()
            },
        ),
    );
    d.update_element(
        &id,
        ElementPatch {
            text_style_id: Some(Some("brand".to_string())),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(d.registry_mut().delete_style::<TextStyleProps>("brand"));
    // The dangling link renders with the base default, not an error.
    let rendered = d.render(RenderMode::Tokens);
    let Visual::Text { text_style, .. } = &rendered[0].visual else {
        unreachable!()
    };
    assert_eq!(text_style.color, Color::BLACK);
}

#[test]
fn test_builtin_styles_are_not_deletable() {
    let mut registry = StyleRegistry::new();
    assert!(!registry.delete_style::<TextStyleProps>("body"));
    assert!(registry.get_style::<TextStyleProps>("body").is_some());
}

#[test]
fn test_registry_export_import_merges_by_id() {
    let mut source = StyleRegistry::new();
    source.add_style(
        "brand",
        StyleRecord::custom("brand", "Brand", TextStyleProps::default()),
    );
    let exported = source.export_json();

    let mut target = StyleRegistry::new();
    target.add_style(
        "local",
        StyleRecord::custom("local", "Local", TextStyleProps::default()),
    );
    target.import_json(&exported).unwrap();
    // Imported styles land; pre-existing ones survive.
    assert!(target.get_style::<TextStyleProps>("brand").is_some());
    assert!(target.get_style::<TextStyleProps>("local").is_some());
}

#[test]
fn test_import_rejects_malformed_json_without_mutating() {
    let mut registry = StyleRegistry::new();
    let before = registry.list_styles::<TextStyleProps>().len();
    assert!(registry.import_json("{not json").is_err());
    assert_eq!(registry.list_styles::<TextStyleProps>().len(), before);
}

#[test]
fn test_inline_override_survives_partial_patch() {
    let mut d = designer();
    let id = d.add_element(ElementType::Text);
    d.update_element(
        &id,
        ElementPatch {
            text_style: Some(TextStyleProps {
                font_weight: Some(700),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
    .unwrap();
    // A later patch touching only color must keep the weight.
    d.update_element(
        &id,
        ElementPatch {
            text_style: Some(TextStyleProps {
                color: Some(Color::hex("#dc2626")),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
    .unwrap();
    let bag = d.element(&id).unwrap().text_style.as_ref().unwrap();
    assert_eq!(bag.font_weight, Some(700));
    assert_eq!(bag.color, Some(Color::hex("#dc2626")));
}

// ─── Persistence ────────────────────────────────────────────────

#[test]
fn test_save_load_round_trip() {
    let mut d = designer_with(json!({"user": {"name": "Ann"}}));
    let text_id = d.add_element(ElementType::Text);
    set_text(&mut d, &text_id, "Hello {{user.name}}");
    d.add_element(ElementType::Rectangle);
    let saved = d.save();
    assert_eq!(saved.metadata.version, DOCUMENT_VERSION);
    assert_eq!(saved.metadata.text_count, 1);
    assert_eq!(saved.metadata.rectangle_count, 1);

    let json = serde_json::to_string(&saved).unwrap();
    let mut restored = designer_with(json!({"user": {"name": "Ann"}}));
    restored.load_json(&json).unwrap();
    assert_eq!(restored.elements().len(), 2);
    assert_eq!(
        rendered_text(&restored, &text_id, RenderMode::Values),
        "Hello Ann"
    );
}

#[test]
fn test_load_backfills_style_bags() {
    let mut d = designer();
    d.load_json(
        r#"{"elements": [{"id": "el-1", "type": "text", "x": 0, "y": 0,
            "width": 200, "height": 40, "text": "old save"}]}"#,
    )
    .unwrap();
    let el = d.element(&ElementId("el-1".to_string())).unwrap();
    assert!(el.text_style.is_some());
    assert!(el.paragraph_style.is_some());
    assert_eq!(el.font_size, 14.0);
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let mut d = designer();
    d.load_json(
        r#"{"elements": [{"id": "el-1", "type": "rectangle", "x": 0, "y": 0,
            "width": 100, "height": 100, "futureField": true}],
            "metadata": {"version": 1, "newerThing": []}}"#,
    )
    .unwrap();
    assert_eq!(d.elements().len(), 1);
}

// ─── Batch Rendering ────────────────────────────────────────────

#[test]
fn test_render_json_produces_svg() {
    let layout = r#"{"elements": [
        {"id": "el-1", "type": "text", "x": 10, "y": 10,
         "width": 300, "height": 40, "text": "Hello {{user.name}}"}
    ]}"#;
    let svg = maquette::render_json(
        layout,
        &json!({"user": {"name": "Ann"}}),
        RenderMode::Values,
    )
    .unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Hello Ann"));
}

#[test]
fn test_render_json_reports_parse_errors() {
    let err = maquette::render_json("{broken", &json!({}), RenderMode::Tokens)
        .unwrap_err();
    assert!(err.to_string().contains("hint"));
}
