//! The shape handler contract and type-tag dispatch.
//!
//! The host canvas calls into a handler for everything it needs to know
//! about a shape type: default props, hit geometry, which interactions are
//! allowed, how to draw it, how to highlight it, and how to adjust props
//! on creation and resize. Handlers never mutate committed props; any
//! change they want goes back to the host as a `PropsPatch`.

use crate::geometry::{Geometry, Outline};
use crate::status_overlay::StatusOverlayHandler;
use crate::tabular::TabularDataHandler;
use crate::tree::VisualTree;
use ac_core::config::ShapeConfig;
use ac_core::id::ShapeId;
use ac_core::model::{PropsPatch, ShapeProps, ShapeRecord, ShapeType};
use ac_core::session::TableSession;

/// Interaction flags the host consults before routing pointer, selection,
/// and transform gestures to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_bind: bool,
    pub can_edit: bool,
    pub can_snap: bool,
    pub can_resize: bool,
    pub can_crop: bool,
    pub can_drop_shapes: bool,
    pub hide_selection_bounds: bool,
    pub hide_resize_handles: bool,
    pub hide_rotate_handle: bool,
    pub lock_aspect_ratio: bool,
}

impl Capabilities {
    /// Nothing is interactive and no selection affordance is shown.
    pub const INERT: Capabilities = Capabilities {
        can_bind: false,
        can_edit: false,
        can_snap: false,
        can_resize: false,
        can_crop: false,
        can_drop_shapes: false,
        hide_selection_bounds: true,
        hide_resize_handles: true,
        hide_rotate_handle: true,
        lock_aspect_ratio: false,
    };

    pub fn is_inert(&self) -> bool {
        !(self.can_bind
            || self.can_edit
            || self.can_snap
            || self.can_resize
            || self.can_crop
            || self.can_drop_shapes)
    }
}

/// Scale delta the host issues during a resize gesture, relative to the
/// size at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeScale {
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Per-type shape behaviour.
pub trait ShapeHandler {
    type Props;
    /// Shape-local ephemeral state (animation phase, edit buffer). Never
    /// shared between instances.
    type Local: Default;

    fn shape_type(&self) -> ShapeType;

    fn default_props(&self) -> Self::Props;

    fn geometry(&self, props: &Self::Props) -> Geometry;

    fn capabilities(&self, props: &Self::Props) -> Capabilities;

    /// Pure function of props and local state. Must not block.
    fn render(&self, id: ShapeId, props: &Self::Props, local: &Self::Local) -> VisualTree;

    /// `None` for shapes that cannot be selected.
    fn indicator(&self, props: &Self::Props) -> Option<Outline>;

    /// Rewrite props before the record is committed.
    fn on_before_create(&self, props: Self::Props) -> Self::Props {
        props
    }

    /// Props change for a resize gesture, or `None` to ignore it.
    fn on_resize(&self, _props: &Self::Props, _scale: ResizeScale) -> Option<PropsPatch> {
        None
    }
}

/// Dispatches the handler contract by shape type tag.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    overlay: StatusOverlayHandler,
    table: TabularDataHandler,
}

impl ShapeRegistry {
    pub fn new(config: ShapeConfig) -> Self {
        Self {
            overlay: StatusOverlayHandler::new(config.overlay),
            table: TabularDataHandler::new(config.table),
        }
    }

    pub fn overlay(&self) -> &StatusOverlayHandler {
        &self.overlay
    }

    pub fn table(&self) -> &TabularDataHandler {
        &self.table
    }

    pub fn default_props(&self, shape_type: ShapeType) -> ShapeProps {
        match shape_type {
            ShapeType::StatusOverlay => ShapeProps::StatusOverlay(self.overlay.default_props()),
            ShapeType::TabularData => ShapeProps::TabularData(self.table.default_props()),
        }
    }

    pub fn geometry(&self, record: &ShapeRecord) -> Geometry {
        match &record.props {
            ShapeProps::StatusOverlay(p) => self.overlay.geometry(p),
            ShapeProps::TabularData(p) => self.table.geometry(p),
        }
    }

    pub fn capabilities(&self, record: &ShapeRecord) -> Capabilities {
        match &record.props {
            ShapeProps::StatusOverlay(p) => self.overlay.capabilities(p),
            ShapeProps::TabularData(p) => self.table.capabilities(p),
        }
    }

    pub fn indicator(&self, record: &ShapeRecord) -> Option<Outline> {
        match &record.props {
            ShapeProps::StatusOverlay(p) => self.overlay.indicator(p),
            ShapeProps::TabularData(p) => self.table.indicator(p),
        }
    }

    /// Render a record. Tables without a session render in viewing mode.
    pub fn render(&self, record: &ShapeRecord, session: Option<&TableSession>) -> VisualTree {
        match &record.props {
            ShapeProps::StatusOverlay(p) => self.overlay.render(record.id, p, &()),
            ShapeProps::TabularData(p) => match session {
                Some(s) => self.table.render(record.id, p, s),
                None => self.table.render(record.id, p, &TableSession::default()),
            },
        }
    }

    pub fn on_before_create(&self, props: ShapeProps) -> ShapeProps {
        match props {
            ShapeProps::StatusOverlay(p) => {
                ShapeProps::StatusOverlay(self.overlay.on_before_create(p))
            }
            ShapeProps::TabularData(p) => ShapeProps::TabularData(self.table.on_before_create(p)),
        }
    }

    pub fn on_resize(&self, record: &ShapeRecord, scale: ResizeScale) -> Option<PropsPatch> {
        match &record.props {
            ShapeProps::StatusOverlay(p) => self.overlay.on_resize(p, scale),
            ShapeProps::TabularData(p) => self.table.on_resize(p, scale),
        }
    }
}
