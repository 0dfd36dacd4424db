//! In-memory host document.
//!
//! Holds the committed shape records in paint order and plays the host's
//! part of the contract: creating shapes with default props and the
//! before-create hook, applying `ShapeUpdate`s atomically, routing resize
//! gestures through the handler, hit testing, and rendering.

use crate::host::HostHandle;
use ac_core::config::ShapeConfig;
use ac_core::error::{ShapeError, ShapeResult};
use ac_core::id::ShapeId;
use ac_core::model::{PropsPatch, ShapeProps, ShapeRecord, ShapeType, ShapeUpdate, Status};
use ac_core::session::TableSession;
use ac_render::handler::{ResizeScale, ShapeRegistry};
use ac_render::hit::{hit_test, hit_test_rect};
use ac_render::svg::render_svg;
use ac_render::tree::VisualTree;
use kurbo::{Point, Rect};

/// The committed shapes of one canvas. Records are kept in paint order
/// (last = topmost).
#[derive(Debug, Clone, Default)]
pub struct ShapeDocument {
    registry: ShapeRegistry,
    records: Vec<ShapeRecord>,
}

impl ShapeDocument {
    pub fn new(config: ShapeConfig) -> Self {
        Self {
            registry: ShapeRegistry::new(config),
            records: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&ShapeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn position(&self, id: ShapeId) -> ShapeResult<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(ShapeError::UpdateFailure(id))
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Create a shape on top of the stack with a generated id. Ids already
    /// taken by host-assigned shapes are skipped.
    pub fn create(&mut self, props: ShapeProps, x: f64, y: f64) -> ShapeId {
        let prefix = props.shape_type().as_str();
        let mut id = ShapeId::with_prefix(prefix);
        while self.get(id).is_some() {
            id = ShapeId::with_prefix(prefix);
        }
        self.create_with_id(id, props, x, y);
        id
    }

    /// Create a shape of `shape_type` with its default props.
    pub fn create_default(&mut self, shape_type: ShapeType, x: f64, y: f64) -> ShapeId {
        let props = self.registry.default_props(shape_type);
        self.create(props, x, y)
    }

    /// Create a shape with a host-assigned id. An existing shape with the
    /// same id is replaced in place.
    pub fn create_with_id(&mut self, id: ShapeId, props: ShapeProps, x: f64, y: f64) {
        let props = self.registry.on_before_create(props);
        let record = ShapeRecord::new(id, x, y, props);
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(existing) => {
                log::debug!("recreated {} as {}", id, record.shape_type());
                *existing = record;
            }
            None => {
                log::debug!("created {} as {}", id, record.shape_type());
                self.records.push(record);
            }
        }
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<ShapeRecord> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn move_to(&mut self, id: ShapeId, x: f64, y: f64) -> ShapeResult<()> {
        let idx = self.position(id)?;
        let record = &mut self.records[idx];
        record.x = x;
        record.y = y;
        Ok(())
    }

    // ─── Updates ─────────────────────────────────────────────────────────

    /// Advance an overlay's status. Back transitions are rejected with a
    /// warning and leave the record untouched; returns whether the status
    /// changed.
    pub fn set_status(&mut self, id: ShapeId, status: Status) -> ShapeResult<bool> {
        let idx = self.position(id)?;
        let Some(current) = self.records[idx].as_status_overlay().map(|p| p.status) else {
            return Err(ShapeError::TypeMismatch {
                id,
                expected: ShapeType::StatusOverlay,
            });
        };
        if current == status {
            return Ok(false);
        }
        if !current.can_advance_to(status) {
            log::warn!(
                "ignored status change on {id}: {} -> {}",
                current.as_str(),
                status.as_str()
            );
            return Ok(false);
        }
        self.update_shape(ShapeUpdate::new(id, PropsPatch::Status { status }))?;
        Ok(true)
    }

    /// Route a resize gesture through the shape's handler. Returns whether
    /// the shape accepted it.
    pub fn resize(&mut self, id: ShapeId, scale: ResizeScale) -> ShapeResult<bool> {
        let idx = self.position(id)?;
        match self.registry.on_resize(&self.records[idx], scale) {
            Some(patch) => {
                self.update_shape(ShapeUpdate::new(id, patch))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn hit_test(&self, px: f64, py: f64) -> Option<ShapeId> {
        hit_test(&self.registry, &self.records, px, py)
    }

    pub fn hit_test_rect(&self, marquee: Rect) -> Vec<ShapeId> {
        hit_test_rect(&self.registry, &self.records, marquee)
    }

    /// Render one shape. Tables render from `session` when one is given.
    pub fn render(&self, id: ShapeId, session: Option<&TableSession>) -> Option<VisualTree> {
        self.get(id).map(|r| self.registry.render(r, session))
    }

    /// Export every shape as one SVG document. `session_of` supplies the
    /// live session of tables being viewed or edited.
    pub fn to_svg<'s>(&self, session_of: impl Fn(ShapeId) -> Option<&'s TableSession>) -> String {
        let trees: Vec<(Point, VisualTree)> = self
            .records
            .iter()
            .map(|r| (Point::new(r.x, r.y), self.registry.render(r, session_of(r.id))))
            .collect();
        let placed: Vec<(Point, &VisualTree)> = trees.iter().map(|(p, t)| (*p, t)).collect();
        render_svg(&placed)
    }
}

impl HostHandle for ShapeDocument {
    fn update_shape(&mut self, update: ShapeUpdate) -> ShapeResult<()> {
        let idx = self.position(update.id)?;
        // Apply to a copy so a rejected patch leaves the record untouched.
        let mut next = self.records[idx].clone();
        for patch in &update.patches {
            next.apply(patch)?;
        }
        log::debug!("updated {} ({} patches)", update.id, update.patches.len());
        self.records[idx] = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::model::{StatusOverlayProps, TabularDataProps};
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    #[test]
    fn create_applies_before_create_hook() {
        let mut doc = ShapeDocument::default();
        let id = doc.create(
            ShapeProps::TabularData(TabularDataProps {
                headers_json: r#"["a","b"]"#.into(),
                rows_json: r#"[["1","2"]]"#.into(),
                ..Default::default()
            }),
            0.0,
            0.0,
        );
        let record = doc.get(id).expect("created");
        assert_eq!(record.props.size(), (400.0, 44.0 + 36.0 + 32.0 + 16.0));
        assert!(id.as_str().starts_with("tabular-data_"));
    }

    #[test]
    fn create_default_overlay_uses_defaults() {
        let mut doc = ShapeDocument::default();
        let id = doc.create_default(ShapeType::StatusOverlay, 5.0, 5.0);
        assert_eq!(
            doc.get(id).and_then(|r| r.as_status_overlay()).cloned(),
            Some(StatusOverlayProps::default())
        );
    }

    #[test]
    fn update_is_atomic() {
        let mut doc = ShapeDocument::default();
        let id = doc.create_default(ShapeType::StatusOverlay, 0.0, 0.0);
        let before = doc.get(id).cloned();
        let bad = ShapeUpdate {
            id,
            patches: smallvec![
                PropsPatch::StatusText { text: "new".into() },
                PropsPatch::Title { title: "wrong type".into() },
            ],
        };
        assert!(matches!(
            doc.update_shape(bad),
            Err(ShapeError::TypeMismatch { expected: ShapeType::TabularData, .. })
        ));
        assert_eq!(doc.get(id).cloned(), before);
    }

    #[test]
    fn update_of_missing_shape_fails() {
        let mut doc = ShapeDocument::default();
        let ghost = ShapeId::intern("doc-ghost");
        let err = doc.update_shape(ShapeUpdate::new(ghost, PropsPatch::Title { title: "t".into() }));
        assert!(matches!(err, Err(ShapeError::UpdateFailure(id)) if id == ghost));
    }

    #[test]
    fn status_only_moves_forward() {
        let mut doc = ShapeDocument::default();
        let id = doc.create_default(ShapeType::StatusOverlay, 0.0, 0.0);
        assert_eq!(doc.set_status(id, Status::Completing).ok(), Some(true));
        assert_eq!(doc.set_status(id, Status::Working).ok(), Some(false));
        assert_eq!(doc.set_status(id, Status::Done).ok(), Some(true));
        assert_eq!(doc.set_status(id, Status::Done).ok(), Some(false));
        assert_eq!(
            doc.get(id).and_then(|r| r.as_status_overlay()).map(|p| p.status),
            Some(Status::Done)
        );

        let table = doc.create_default(ShapeType::TabularData, 0.0, 0.0);
        assert!(doc.set_status(table, Status::Done).is_err());
    }

    #[test]
    fn resize_is_routed_through_handler() {
        let mut doc = ShapeDocument::default();
        let overlay = doc.create_default(ShapeType::StatusOverlay, 0.0, 0.0);
        let table = doc.create_default(ShapeType::TabularData, 0.0, 0.0);
        let scale = ResizeScale {
            scale_x: 0.5,
            scale_y: 0.5,
        };
        assert_eq!(doc.resize(overlay, scale).ok(), Some(false));
        assert_eq!(doc.resize(table, scale).ok(), Some(true));
        // Empty default table is sized 400x128 on create; halving hits the floor.
        assert_eq!(doc.get(table).map(|r| r.props.size()), Some((300.0, 120.0)));
    }

    #[test]
    fn generated_ids_skip_host_assigned_ones() {
        let mut doc = ShapeDocument::default();
        // Claim the next few ids the counter could hand out.
        let drawn = ShapeId::with_prefix("tabular-data");
        let next: usize = drawn.as_str().trim_start_matches("tabular-data_").parse().unwrap();
        for n in next + 1..next + 4 {
            let id = ShapeId::intern(&format!("tabular-data_{n}"));
            doc.create_with_id(id, ShapeProps::StatusOverlay(StatusOverlayProps::default()), 0.0, 0.0);
        }

        let created = doc.create_default(ShapeType::TabularData, 0.0, 0.0);
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.get(created).map(|r| r.shape_type()), Some(ShapeType::TabularData));
        let overlays = doc
            .records()
            .iter()
            .filter(|r| r.shape_type() == ShapeType::StatusOverlay)
            .count();
        assert_eq!(overlays, 3);
    }

    #[test]
    fn recreate_replaces_in_place() {
        let mut doc = ShapeDocument::default();
        let id = ShapeId::intern("doc-fixed");
        doc.create_with_id(id, ShapeProps::StatusOverlay(StatusOverlayProps::default()), 0.0, 0.0);
        doc.create_default(ShapeType::TabularData, 0.0, 0.0);
        doc.create_with_id(id, ShapeProps::TabularData(TabularDataProps::default()), 0.0, 0.0);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.records()[0].shape_type(), ShapeType::TabularData);
        assert!(doc.remove(id).is_some());
        assert!(doc.remove(id).is_none());
    }
}
