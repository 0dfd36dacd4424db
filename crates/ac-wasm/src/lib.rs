//! WASM bridge for Agent Canvas: exposes the shape document and table
//! editing to a JavaScript canvas host.
//!
//! Compiled via `wasm-pack build --target web`. Shapes, updates and
//! geometry cross the boundary as JSON strings; rendering returns SVG
//! markup whose `data-action` regions the host feeds back through
//! [`AgentCanvas::table_event`].

use ac_core::config::ShapeConfig;
use ac_core::error::{ShapeError, ShapeResult};
use ac_core::id::ShapeId;
use ac_core::model::{ShapeProps, ShapeType, ShapeUpdate, Status};
use ac_editor::{HostHandle, ShapeDocument, TableEditor, TableEvent};
use ac_render::handler::ResizeScale;
use ac_render::svg::tree_to_svg;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

/// Shape creation request: `{"id"?, "x", "y", "type", "props"}`.
#[derive(Deserialize)]
struct CreateRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(flatten)]
    props: ShapeProps,
}

/// The main WASM-facing canvas controller.
///
/// Owns the committed document and one `TableEditor` per table the user
/// has interacted with. All interaction from JS goes through this struct.
#[wasm_bindgen]
pub struct AgentCanvas {
    doc: ShapeDocument,
    editors: HashMap<ShapeId, TableEditor>,
    /// Notified with every update JSON before it is committed. Returning
    /// `false` or throwing rejects the update.
    on_update: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl AgentCanvas {
    /// Create a controller. `config_json` overrides any subset of the
    /// default metrics and theme; invalid config falls back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        console_error_panic_hook_setup();

        let config = match config_json.as_deref().map(ShapeConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("{e}; using default shape config");
                ShapeConfig::default()
            }
            None => ShapeConfig::default(),
        };
        Self {
            doc: ShapeDocument::new(config),
            editors: HashMap::new(),
            on_update: None,
        }
    }

    /// Register the host's persistence callback.
    pub fn set_update_callback(&mut self, callback: js_sys::Function) {
        self.on_update = Some(callback);
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Create a shape from request JSON. Returns the shape id, or an empty
    /// string if the request is malformed.
    pub fn create_shape(&mut self, json: &str) -> String {
        let req: CreateRequest = match serde_json::from_str(json) {
            Ok(req) => req,
            Err(e) => {
                log::warn!("create_shape rejected: {e}");
                return String::new();
            }
        };
        let id = match req.id.as_deref() {
            Some(id) if !id.is_empty() => {
                let id = ShapeId::intern(id);
                self.doc.create_with_id(id, req.props, req.x, req.y);
                self.editors.remove(&id);
                id
            }
            _ => self.doc.create(req.props, req.x, req.y),
        };
        id.as_str().to_string()
    }

    /// Create a shape of type `shape_type` (`status-overlay`,
    /// `tabular-data`) with default props.
    pub fn create_default(&mut self, shape_type: &str, x: f64, y: f64) -> String {
        match shape_type.parse::<ShapeType>() {
            Ok(t) => self.doc.create_default(t, x, y).as_str().to_string(),
            Err(e) => {
                log::warn!("{e}");
                String::new()
            }
        }
    }

    pub fn remove_shape(&mut self, id: &str) -> bool {
        let id = ShapeId::intern(id);
        self.editors.remove(&id);
        self.doc.remove(id).is_some()
    }

    /// The shape record as JSON, or an empty string if it does not exist.
    pub fn get_shape(&self, id: &str) -> String {
        self.doc
            .get(ShapeId::intern(id))
            .and_then(|r| serde_json::to_string(r).ok())
            .unwrap_or_default()
    }

    /// Ids of every shape in paint order, as a JSON array.
    pub fn get_shape_ids(&self) -> String {
        let ids: Vec<&str> = self.doc.records().iter().map(|r| r.id.as_str()).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply a `ShapeUpdate` JSON (`{"id", "patches": [{"op", ...}]}`).
    pub fn update_shape(&mut self, json: &str) -> bool {
        match serde_json::from_str::<ShapeUpdate>(json) {
            Ok(update) => self.commit(update).is_ok(),
            Err(e) => {
                log::warn!("update_shape rejected: {e}");
                false
            }
        }
    }

    /// Advance an overlay's status. Back transitions are ignored.
    pub fn set_status(&mut self, id: &str, status: &str) -> bool {
        let status = match status {
            "working" => Status::Working,
            "completing" => Status::Completing,
            "done" => Status::Done,
            other => {
                log::warn!("unknown status `{other}`");
                return false;
            }
        };
        self.doc
            .set_status(ShapeId::intern(id), status)
            .unwrap_or_else(|e| {
                log::warn!("{e}");
                false
            })
    }

    pub fn move_shape(&mut self, id: &str, x: f64, y: f64) -> bool {
        self.doc.move_to(ShapeId::intern(id), x, y).is_ok()
    }

    /// Route a resize gesture. Returns `false` if the shape ignores it.
    pub fn resize_shape(&mut self, id: &str, scale_x: f64, scale_y: f64) -> bool {
        self.doc
            .resize(ShapeId::intern(id), ResizeScale { scale_x, scale_y })
            .unwrap_or(false)
    }

    // ─── Host contract queries ───────────────────────────────────────────

    /// Page-space hit geometry: `{"x","y","width","height","filled"}`.
    pub fn get_geometry(&self, id: &str) -> String {
        let Some(record) = self.doc.get(ShapeId::intern(id)) else {
            return String::new();
        };
        let g = self.doc.registry().geometry(record);
        let r = g.page_rect(record.x, record.y);
        json!({
            "x": r.x0,
            "y": r.y0,
            "width": r.width(),
            "height": r.height(),
            "filled": g.filled,
        })
        .to_string()
    }

    pub fn get_capabilities(&self, id: &str) -> String {
        let Some(record) = self.doc.get(ShapeId::intern(id)) else {
            return String::new();
        };
        let c = self.doc.registry().capabilities(record);
        json!({
            "canBind": c.can_bind,
            "canEdit": c.can_edit,
            "canSnap": c.can_snap,
            "canResize": c.can_resize,
            "canCrop": c.can_crop,
            "canDropShapes": c.can_drop_shapes,
            "hideSelectionBounds": c.hide_selection_bounds,
            "hideResizeHandles": c.hide_resize_handles,
            "hideRotateHandle": c.hide_rotate_handle,
            "lockAspectRatio": c.lock_aspect_ratio,
        })
        .to_string()
    }

    /// Selection outline JSON, or `null` for unselectable shapes.
    pub fn get_indicator(&self, id: &str) -> String {
        let outline = self
            .doc
            .get(ShapeId::intern(id))
            .and_then(|r| self.doc.registry().indicator(r).map(|o| (r, o)));
        match outline {
            Some((r, o)) => json!({
                "x": r.x + o.rect.x0,
                "y": r.y + o.rect.y0,
                "width": o.rect.width(),
                "height": o.rect.height(),
                "radius": o.radius,
            })
            .to_string(),
            None => "null".to_string(),
        }
    }

    /// Topmost shape at a page point, or an empty string.
    pub fn hit_test(&self, x: f64, y: f64) -> String {
        self.doc
            .hit_test(x, y)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Shapes inside a marquee, as a JSON array of ids.
    pub fn hit_test_rect(&self, x: f64, y: f64, width: f64, height: f64) -> String {
        let ids: Vec<&str> = self
            .doc
            .hit_test_rect(kurbo::Rect::new(x, y, x + width, y + height))
            .into_iter()
            .map(|id| id.as_str())
            .collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Every shape as one standalone SVG document.
    pub fn render_svg(&self) -> String {
        self.doc
            .to_svg(|id| self.editors.get(&id).map(|e| e.session()))
    }

    /// One shape as an SVG `<g>` fragment in local coordinates.
    pub fn render_shape_svg(&self, id: &str) -> String {
        let id = ShapeId::intern(id);
        let session = self.editors.get(&id).map(|e| e.session());
        self.doc
            .render(id, session)
            .map(|tree| tree_to_svg(&tree))
            .unwrap_or_default()
    }

    /// Action token of the interactive region under a page point, or an
    /// empty string.
    pub fn action_at(&self, id: &str, x: f64, y: f64) -> String {
        let id = ShapeId::intern(id);
        let Some(record) = self.doc.get(id) else {
            return String::new();
        };
        let session = self.editors.get(&id).map(|e| e.session());
        self.doc
            .registry()
            .render(record, session)
            .action_at(x - record.x, y - record.y)
            .map(|a| a.token())
            .unwrap_or_default()
    }

    // ─── Table editing ───────────────────────────────────────────────────

    /// Feed a DOM event to a table (`click`/`dblclick` with an action
    /// token, `keydown` with a key, `input` with a value, `blur`).
    /// Returns `true` if the table needs a repaint.
    pub fn table_event(&mut self, id: &str, kind: &str, detail: &str) -> bool {
        let id = ShapeId::intern(id);
        let Some(event) = TableEvent::from_dom(kind, detail) else {
            return false;
        };
        let Some(props) = self.doc.get(id).and_then(|r| r.as_tabular()).cloned() else {
            return false;
        };
        let editor = self.editors.entry(id).or_insert_with(|| TableEditor::new(id));
        let mut host = JsHost {
            doc: &mut self.doc,
            callback: self.on_update.as_ref(),
        };
        editor.handle(&event, &props, Some(&mut host))
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editors
            .get(&ShapeId::intern(id))
            .is_some_and(|e| e.is_editing())
    }
}

impl AgentCanvas {
    fn commit(&mut self, update: ShapeUpdate) -> ShapeResult<()> {
        let mut host = JsHost {
            doc: &mut self.doc,
            callback: self.on_update.as_ref(),
        };
        host.update_shape(update).inspect_err(|e| log::warn!("{e}"))
    }
}

/// The document as a host handle, with the JS callback as a veto point.
struct JsHost<'a> {
    doc: &'a mut ShapeDocument,
    callback: Option<&'a js_sys::Function>,
}

impl HostHandle for JsHost<'_> {
    fn update_shape(&mut self, update: ShapeUpdate) -> ShapeResult<()> {
        if let Some(callback) = self.callback {
            let payload = serde_json::to_string(&update).unwrap_or_default();
            match callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
                Ok(ret) if ret.as_bool() == Some(false) => {
                    return Err(ShapeError::UpdateFailure(update.id));
                }
                Ok(_) => {}
                Err(_) => return Err(ShapeError::UpdateFailure(update.id)),
            }
        }
        self.doc.update_shape(update)
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Agent Canvas WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ──────────────────────────────

/// Initial `[width, height]` a table with this `sheetsJson` payload would
/// be created with, as JSON.
#[wasm_bindgen]
pub fn table_size_for(sheets_json: &str) -> String {
    let props = ac_core::model::TabularDataProps {
        sheets_json: sheets_json.to_string(),
        ..Default::default()
    };
    let sheets = ac_core::sheets::parse_sheets(&props).sheets;
    let (w, h) = ac_core::sizing::table_size(&sheets, &ac_core::config::TableMetrics::default());
    json!([w, h]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = r#"{"id":"wasm-table","x":10,"y":10,"type":"tabular-data",
        "props":{"title":"T","sheetsJson":"[{\"name\":\"S\",\"headers\":[\"a\",\"b\"],\"rows\":[[\"1\",\"2\"]]}]"}}"#;

    #[test]
    fn creates_shapes_from_json() {
        let mut canvas = AgentCanvas::new(None);
        assert_eq!(canvas.create_shape(TABLE), "wasm-table");
        assert_eq!(canvas.create_shape("{not json"), "");
        let overlay = canvas.create_default("status-overlay", 10.0, 10.0);
        assert!(!overlay.is_empty());
        assert_eq!(canvas.create_default("sticky-note", 0.0, 0.0), "");

        assert_eq!(canvas.hit_test(20.0, 20.0), "wasm-table");
        assert_eq!(canvas.get_indicator(&overlay), "null");
        let geometry: serde_json::Value =
            serde_json::from_str(&canvas.get_geometry("wasm-table")).unwrap();
        assert_eq!(geometry["width"], 400.0);
        assert_eq!(geometry["height"], 128.0);
    }

    #[test]
    fn edits_table_through_action_tokens() {
        let mut canvas = AgentCanvas::new(None);
        canvas.create_shape(TABLE);
        // Title bar at y 10..54, header row to 90, first row to 122.
        assert_eq!(canvas.action_at("wasm-table", 15.0, 100.0), "cell:0:0");

        assert!(canvas.table_event("wasm-table", "click", "edit"));
        assert!(canvas.is_editing("wasm-table"));
        assert!(canvas.table_event("wasm-table", "dblclick", "cell:0:1"));
        assert!(canvas.table_event("wasm-table", "input", "42"));
        assert!(canvas.table_event("wasm-table", "click", "save"));
        assert!(!canvas.is_editing("wasm-table"));

        let record: serde_json::Value =
            serde_json::from_str(&canvas.get_shape("wasm-table")).unwrap();
        let sheets = ac_core::sheets::decode_sheets(record["props"]["sheetsJson"].as_str().unwrap())
            .unwrap();
        assert_eq!(sheets[0].cell(0, 1), "42");
    }

    #[test]
    fn status_and_updates_from_json() {
        let mut canvas = AgentCanvas::new(Some(r#"{"overlay":{"fade_ms":900}}"#.into()));
        let id = canvas.create_default("status-overlay", 0.0, 0.0);
        assert!(canvas.set_status(&id, "done"));
        assert!(!canvas.set_status(&id, "working"));
        assert!(!canvas.set_status(&id, "paused"));
        assert!(canvas.render_shape_svg(&id).contains("dur=\"900ms\""));

        let update = format!(r#"{{"id":"{id}","patches":[{{"op":"statusText","text":"hi"}}]}}"#);
        assert!(canvas.update_shape(&update));
        assert!(!canvas.update_shape(r#"{"id":"missing","patches":[]}"#));
    }

    #[test]
    fn marquee_lists_ids_as_json() {
        let mut canvas = AgentCanvas::new(None);
        canvas.create_shape(TABLE);
        canvas.create_default("status-overlay", 10.0, 10.0);
        assert_eq!(canvas.hit_test_rect(0.0, 0.0, 1000.0, 1000.0), r#"["wasm-table"]"#);
        assert_eq!(canvas.hit_test_rect(2000.0, 2000.0, 10.0, 10.0), "[]");
    }

    #[test]
    fn inverted_width_config_still_creates_tables() {
        let mut canvas = AgentCanvas::new(Some(r#"{"table":{"min_auto_width":1300}}"#.into()));
        assert_eq!(canvas.create_shape(TABLE), "wasm-table");
        let geometry: serde_json::Value =
            serde_json::from_str(&canvas.get_geometry("wasm-table")).unwrap();
        assert_eq!(geometry["width"], 1200.0);
    }

    #[test]
    fn standalone_sizing() {
        assert_eq!(table_size_for("[]"), "[400.0,128.0]");
    }
}
