//! Integration tests: overlay lifecycle and picking in a host document (ac-editor).

use ac_core::*;
use ac_editor::{HostHandle, ShapeDocument};
use ac_render::handler::ResizeScale;
use kurbo::Rect;
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn overlay_status(doc: &ShapeDocument, id: ShapeId) -> Option<Status> {
    doc.get(id).and_then(|r| r.as_status_overlay()).map(|p| p.status)
}

#[test]
fn overlay_lifecycle_over_a_table() {
    init_logger();
    let mut doc = ShapeDocument::default();
    let table = doc.create(
        ShapeProps::TabularData(TabularDataProps {
            headers_json: r#"["Company","Notes"]"#.into(),
            rows_json: r#"[["Acme","x"]]"#.into(),
            title: "Research".into(),
            ..Default::default()
        }),
        40.0,
        40.0,
    );
    let (w, h) = doc.get(table).map(|r| r.props.size()).unwrap_or_default();
    let overlay = doc.create(
        ShapeProps::StatusOverlay(StatusOverlayProps {
            width: w,
            height: h,
            status_text: "Collecting rows".into(),
            ..Default::default()
        }),
        40.0,
        40.0,
    );

    for status in [Status::Working, Status::Completing, Status::Done] {
        doc.set_status(overlay, status).expect("overlay exists");
        assert_eq!(overlay_status(&doc, overlay), Some(status));
        assert_eq!(doc.hit_test(60.0, 60.0), Some(table));
        assert_eq!(doc.hit_test_rect(Rect::new(0.0, 0.0, 1000.0, 1000.0)), vec![table]);
    }

    let tree = doc.render(overlay, None).expect("overlay renders");
    assert_eq!(tree.opacity_at(600.0), 0.0);

    // Producer removes the overlay once the fade has played.
    assert!(doc.remove(overlay).is_some());
    assert_eq!(doc.len(), 1);
}

#[test]
fn late_status_update_does_not_revive_overlay() {
    let mut doc = ShapeDocument::default();
    let overlay = doc.create_default(ShapeType::StatusOverlay, 0.0, 0.0);
    doc.set_status(overlay, Status::Done).expect("overlay exists");
    assert_eq!(doc.set_status(overlay, Status::Working).ok(), Some(false));
    assert_eq!(overlay_status(&doc, overlay), Some(Status::Done));
}

#[test]
fn host_updates_apply_patches_together() {
    let mut doc = ShapeDocument::default();
    let overlay = doc.create_default(ShapeType::StatusOverlay, 0.0, 0.0);
    let mut update = ShapeUpdate::new(overlay, PropsPatch::StatusText { text: "Summarizing".into() });
    update.patches.push(PropsPatch::Size {
        width: 800.0,
        height: 600.0,
    });
    doc.update_shape(update).expect("valid update");

    let props = doc.get(overlay).and_then(|r| r.as_status_overlay()).cloned();
    assert_eq!(
        props,
        Some(StatusOverlayProps {
            width: 800.0,
            height: 600.0,
            status_text: "Summarizing".into(),
            status: Status::Working,
        })
    );
}

#[test]
fn resizing_table_never_recomputes_from_content() {
    let mut doc = ShapeDocument::default();
    let table = doc.create(
        ShapeProps::TabularData(TabularDataProps {
            sheets_json: r#"[{"name":"S","headers":["a","b","c","d"],"rows":[["1"]]}]"#.into(),
            ..Default::default()
        }),
        0.0,
        0.0,
    );
    assert_eq!(doc.get(table).map(|r| r.props.size()), Some((680.0, 128.0)));

    doc.resize(table, ResizeScale { scale_x: 1.5, scale_y: 2.0 }).expect("table exists");
    assert_eq!(doc.get(table).map(|r| r.props.size()), Some((1020.0, 256.0)));

    // New content does not resize the shape.
    doc.update_shape(ShapeUpdate::new(
        table,
        PropsPatch::SheetsJson {
            json: r#"[{"name":"S","headers":["a"],"rows":[]}]"#.into(),
        },
    ))
    .expect("table exists");
    assert_eq!(doc.get(table).map(|r| r.props.size()), Some((1020.0, 256.0)));
}

#[test]
fn svg_export_covers_every_shape() {
    let mut doc = ShapeDocument::default();
    let overlay = doc.create_default(ShapeType::StatusOverlay, 0.0, 0.0);
    let table = doc.create_default(ShapeType::TabularData, 500.0, 0.0);
    let svg = doc.to_svg(|_| None);
    assert!(svg.contains(&format!("id=\"{}\"", overlay.resource_key("overlay"))));
    assert!(svg.contains(&format!("id=\"{}\"", table.resource_key("table"))));
    assert!(svg.contains("No data"));
}
