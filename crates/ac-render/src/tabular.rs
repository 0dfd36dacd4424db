//! Tabular data shape: a resizable, multi-sheet table with inline editing.
//!
//! Layout, top to bottom: title bar (title plus Edit, or Save/Cancel while
//! editing), tab bar when there is more than one sheet, header row, data
//! rows. Rows that do not fit are clipped to the body. Every cell and
//! button is a `Region` so the host can route clicks back as `UiAction`s.

use crate::geometry::{Geometry, Outline};
use crate::handler::{Capabilities, ResizeScale, ShapeHandler};
use crate::tree::{Def, Fill, StrokeStyle, TextAlign, UiAction, VisualNode, VisualTree};
use ac_core::config::TableMetrics;
use ac_core::id::ShapeId;
use ac_core::model::{Color, PropsPatch, ShapeType, Sheet, TabularDataProps};
use ac_core::session::TableSession;
use ac_core::sheets::parse_sheets;
use ac_core::sizing::{resized, table_size};
use kurbo::{Point, Rect};

const BACKGROUND: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
const CHROME: Color = Color::rgba(0.973, 0.980, 0.988, 1.0);
const HEADER: Color = Color::rgba(0.945, 0.961, 0.976, 1.0);
const BORDER: Color = Color::rgba(0.886, 0.910, 0.941, 1.0);
const TEXT: Color = Color::rgba(0.059, 0.090, 0.165, 1.0);
const MUTED: Color = Color::rgba(0.392, 0.455, 0.545, 1.0);
const ACCENT: Color = Color::rgba(0.388, 0.400, 0.945, 1.0);

const CELL_PAD: f64 = 8.0;
const BUTTON_WIDTH: f64 = 60.0;
const BUTTON_GAP: f64 = 8.0;
/// Average glyph advance as a share of font size, for truncation.
const GLYPH_RATIO: f64 = 0.6;

/// Placeholder shown when neither payload yields any sheet.
pub const EMPTY_PLACEHOLDER: &str = "No data";

#[derive(Debug, Clone, Default)]
pub struct TabularDataHandler {
    metrics: TableMetrics,
}

impl TabularDataHandler {
    pub fn new(metrics: TableMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &TableMetrics {
        &self.metrics
    }

    fn title_bar(&self, props: &TabularDataProps, has_data: bool, editing: bool) -> Vec<VisualNode> {
        let m = &self.metrics;
        let h = m.title_bar_height;
        let mut nodes = vec![
            VisualNode::Rect {
                rect: Rect::new(0.0, 0.0, props.width, h),
                radius: 0.0,
                fill: Fill::Solid(CHROME),
                stroke: None,
                animation: None,
            },
            VisualNode::Text {
                origin: Point::new(12.0, h / 2.0 + 5.0),
                content: truncate(&props.title, props.width * 0.5, m.font_size + 1.0),
                size: m.font_size + 1.0,
                bold: true,
                color: TEXT,
                align: TextAlign::Start,
            },
        ];
        if !has_data {
            return nodes;
        }

        let buttons: &[(UiAction, &str)] = if editing {
            &[(UiAction::Save, "Save"), (UiAction::Cancel, "Cancel")]
        } else {
            &[(UiAction::Edit, "Edit")]
        };
        let mut right = props.width - 12.0;
        for &(action, label) in buttons.iter().rev() {
            let rect = Rect::new(right - BUTTON_WIDTH, 8.0, right, h - 8.0);
            let primary = action == UiAction::Save;
            nodes.push(VisualNode::Region {
                rect,
                action,
                children: vec![
                    VisualNode::Rect {
                        rect,
                        radius: 6.0,
                        fill: Fill::Solid(if primary { ACCENT } else { BACKGROUND }),
                        stroke: Some(StrokeStyle {
                            color: if primary { ACCENT } else { BORDER },
                            width: 1.0,
                            dash: None,
                        }),
                        animation: None,
                    },
                    VisualNode::Text {
                        origin: Point::new(rect.center().x, rect.center().y + 4.0),
                        content: label.to_string(),
                        size: m.font_size,
                        bold: primary,
                        color: if primary { BACKGROUND } else { TEXT },
                        align: TextAlign::Middle,
                    },
                ],
            });
            right -= BUTTON_WIDTH + BUTTON_GAP;
        }
        nodes
    }

    fn tab_bar(&self, sheets: &[Sheet], active: usize, top: f64, width: f64) -> Vec<VisualNode> {
        let m = &self.metrics;
        let mut nodes = vec![VisualNode::Rect {
            rect: Rect::new(0.0, top, width, top + m.tab_bar_height),
            radius: 0.0,
            fill: Fill::Solid(CHROME),
            stroke: None,
            animation: None,
        }];
        let mut x = 8.0;
        for (i, sheet) in sheets.iter().enumerate() {
            let label = sheet.label(i);
            let tab_w = label.chars().count() as f64 * m.font_size as f64 * GLYPH_RATIO + 24.0;
            let rect = Rect::new(x, top + 4.0, x + tab_w, top + m.tab_bar_height);
            let is_active = i == active;
            nodes.push(VisualNode::Region {
                rect,
                action: UiAction::SelectTab(i),
                children: vec![
                    VisualNode::Rect {
                        rect,
                        radius: 6.0,
                        fill: Fill::Solid(if is_active { BACKGROUND } else { CHROME }),
                        stroke: is_active.then_some(StrokeStyle {
                            color: BORDER,
                            width: 1.0,
                            dash: None,
                        }),
                        animation: None,
                    },
                    VisualNode::Text {
                        origin: Point::new(rect.center().x, rect.center().y + 4.0),
                        content: label,
                        size: m.font_size,
                        bold: is_active,
                        color: if is_active { TEXT } else { MUTED },
                        align: TextAlign::Middle,
                    },
                ],
            });
            x += tab_w + 4.0;
        }
        nodes
    }

    fn grid(
        &self,
        sheet: &Sheet,
        sheet_index: usize,
        session: &TableSession,
        top: f64,
        width: f64,
    ) -> Vec<VisualNode> {
        let m = &self.metrics;
        let columns = sheet.headers.len().max(1);
        let col_w = width / columns as f64;
        let mut nodes = vec![VisualNode::Rect {
            rect: Rect::new(0.0, top, width, top + m.header_row_height),
            radius: 0.0,
            fill: Fill::Solid(HEADER),
            stroke: None,
            animation: None,
        }];

        for (c, header) in sheet.headers.iter().enumerate() {
            nodes.push(VisualNode::Text {
                origin: Point::new(c as f64 * col_w + CELL_PAD, top + m.header_row_height / 2.0 + 4.0),
                content: truncate(header, col_w - 2.0 * CELL_PAD, m.font_size),
                size: m.font_size,
                bold: true,
                color: TEXT,
                align: TextAlign::Start,
            });
        }

        let editing_cell = session.cell_edit().filter(|e| e.sheet == sheet_index);
        let body_top = top + m.header_row_height;
        for r in 0..sheet.rows.len() {
            let y = body_top + r as f64 * m.row_height;
            nodes.push(VisualNode::Rect {
                rect: Rect::new(0.0, y + m.row_height - 1.0, width, y + m.row_height),
                radius: 0.0,
                fill: Fill::Solid(BORDER),
                stroke: None,
                animation: None,
            });
            // Only columns under a header are shown; excess cells are ignored.
            for c in 0..sheet.headers.len() {
                let rect = Rect::new(c as f64 * col_w, y, (c + 1) as f64 * col_w, y + m.row_height);
                let content = match editing_cell {
                    Some(e) if e.row == r && e.col == c => VisualNode::TextInput {
                        rect: rect.inset(-2.0),
                        value: e.draft.clone(),
                    },
                    _ => VisualNode::text(
                        Point::new(rect.x0 + CELL_PAD, y + m.row_height / 2.0 + 4.0),
                        truncate(sheet.cell(r, c), col_w - 2.0 * CELL_PAD, m.font_size),
                        m.font_size,
                        TEXT,
                    ),
                };
                nodes.push(VisualNode::Region {
                    rect,
                    action: UiAction::Cell { row: r, col: c },
                    children: vec![content],
                });
            }
        }
        nodes
    }
}

impl ShapeHandler for TabularDataHandler {
    type Props = TabularDataProps;
    type Local = TableSession;

    fn shape_type(&self) -> ShapeType {
        ShapeType::TabularData
    }

    fn default_props(&self) -> TabularDataProps {
        TabularDataProps::default()
    }

    fn geometry(&self, props: &TabularDataProps) -> Geometry {
        Geometry::filled_rect(props.width, props.height)
    }

    fn capabilities(&self, _props: &TabularDataProps) -> Capabilities {
        Capabilities {
            can_snap: true,
            can_resize: true,
            hide_selection_bounds: false,
            hide_resize_handles: false,
            hide_rotate_handle: true,
            lock_aspect_ratio: false,
            ..Capabilities::INERT
        }
    }

    fn render(&self, id: ShapeId, props: &TabularDataProps, session: &TableSession) -> VisualTree {
        let m = &self.metrics;
        let committed = parse_sheets(props).sheets;
        let sheets = session.sheets(&committed);
        let width = props.width.max(0.0);
        let height = props.height.max(0.0);
        let clip_id = id.resource_key("table-body");

        let mut children = vec![VisualNode::Rect {
            rect: Rect::new(0.0, 0.0, width, height),
            radius: m.corner_radius,
            fill: Fill::Solid(BACKGROUND),
            stroke: Some(StrokeStyle {
                color: BORDER,
                width: 1.0,
                dash: None,
            }),
            animation: None,
        }];
        children.extend(self.title_bar(props, !sheets.is_empty(), session.is_editing()));

        let mut top = m.title_bar_height;
        let active = session.active_tab(sheets.len());
        if sheets.len() > 1 {
            children.extend(self.tab_bar(sheets, active, top, width));
            top += m.tab_bar_height;
        }

        let mut defs = Vec::new();
        match sheets.get(active) {
            None => children.push(VisualNode::Text {
                origin: Point::new(width / 2.0, (m.title_bar_height + height) / 2.0),
                content: EMPTY_PLACEHOLDER.to_string(),
                size: m.font_size,
                bold: false,
                color: MUTED,
                align: TextAlign::Middle,
            }),
            Some(sheet) => {
                defs.push(Def::ClipRect {
                    id: clip_id.clone(),
                    rect: Rect::new(0.0, top, width, height.max(top)),
                    radius: 0.0,
                });
                children.push(VisualNode::Group {
                    opacity: 1.0,
                    transition: None,
                    clip: Some(clip_id),
                    children: self.grid(sheet, active, session, top, width),
                });
            }
        }

        log::trace!(
            "render table {id} sheets={} editing={}",
            sheets.len(),
            session.is_editing()
        );
        VisualTree {
            id: id.resource_key("table"),
            defs,
            root: VisualNode::group(children),
        }
    }

    fn indicator(&self, props: &TabularDataProps) -> Option<Outline> {
        Some(Outline {
            rect: Rect::new(0.0, 0.0, props.width, props.height),
            radius: self.metrics.corner_radius,
        })
    }

    fn on_before_create(&self, mut props: TabularDataProps) -> TabularDataProps {
        let parsed = parse_sheets(&props);
        let (width, height) = table_size(&parsed.sheets, &self.metrics);
        log::debug!(
            "sized new table from {:?} payload: {width}x{height}",
            parsed.source
        );
        props.width = width;
        props.height = height;
        props
    }

    fn on_resize(&self, props: &TabularDataProps, scale: ResizeScale) -> Option<PropsPatch> {
        let (width, height) = resized(
            props.width,
            props.height,
            scale.scale_x,
            scale.scale_y,
            &self.metrics,
        );
        Some(PropsPatch::Size { width, height })
    }
}

/// Shorten `text` with an ellipsis so it fits roughly within `max_width`.
fn truncate(text: &str, max_width: f64, font_size: f32) -> String {
    let advance = font_size as f64 * GLYPH_RATIO;
    let max_chars = (max_width / advance).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('\u{2026}');
    out
}
