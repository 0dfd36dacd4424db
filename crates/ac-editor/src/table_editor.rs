//! Per-instance editing controller for a tabular shape.
//!
//! Wraps a `TableSession` (tab selection and the uncommitted buffer) and
//! turns `TableEvent`s into session transitions. Saving is the only
//! operation that reaches the document, through an explicit `HostHandle`.
//! Dropping an editor mid-edit discards its buffer.

use crate::host::HostHandle;
use crate::input::{CellKey, TableEvent};
use ac_core::id::ShapeId;
use ac_core::model::{PropsPatch, ShapeUpdate, Sheet, TabularDataProps};
use ac_core::session::TableSession;
use ac_core::sheets::{encode_sheets, parse_sheets};
use ac_render::tree::UiAction;

#[derive(Debug, Clone)]
pub struct TableEditor {
    shape_id: ShapeId,
    session: TableSession,
}

impl TableEditor {
    pub fn new(shape_id: ShapeId) -> Self {
        Self {
            shape_id,
            session: TableSession::new(),
        }
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn session(&self) -> &TableSession {
        &self.session
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    /// Route one input event. Returns whether the shape needs a repaint.
    ///
    /// `props` are the committed props the host currently holds for this
    /// shape; `host` is only used by Save.
    pub fn handle(
        &mut self,
        event: &TableEvent,
        props: &TabularDataProps,
        host: Option<&mut dyn HostHandle>,
    ) -> bool {
        match event {
            TableEvent::Click(UiAction::Edit) => self.begin_edit(props),
            TableEvent::Click(UiAction::Save) => self.save(host),
            TableEvent::Click(UiAction::Cancel) => self.cancel(),
            TableEvent::Click(UiAction::SelectTab(i))
            | TableEvent::DoubleClick(UiAction::SelectTab(i)) => self.select_tab(*i, props),
            // Clicks inside the open cell land on its input.
            TableEvent::Click(UiAction::Cell { row, col }) if self.session.is_cell_open(*row, *col) => {
                false
            }
            // Clicking elsewhere in the grid blurs the open cell.
            TableEvent::Click(UiAction::Cell { .. }) => self.session.commit_cell(),
            TableEvent::DoubleClick(UiAction::Cell { row, col }) => self.edit_cell(*row, *col),
            TableEvent::DoubleClick(_) => false,
            TableEvent::Key { .. } => match event.cell_key() {
                Some(CellKey::Enter) => self.session.commit_cell(),
                Some(CellKey::Escape) => self.session.cancel_cell(),
                None => false,
            },
            TableEvent::Input { text } => self.session.set_draft(text.as_str()),
            TableEvent::Blur => self.session.commit_cell(),
        }
    }

    /// Enter edit mode with a copy of the committed sheets. No-op when the
    /// table is empty or already being edited.
    pub fn begin_edit(&mut self, props: &TabularDataProps) -> bool {
        let committed = parse_sheets(props).sheets;
        self.session.begin_edit(&committed)
    }

    /// Open the cell at (`row`, `col`) of the active tab for editing.
    pub fn edit_cell(&mut self, row: usize, col: usize) -> bool {
        self.session.begin_cell_edit(row, col)
    }

    pub fn set_draft(&mut self, text: &str) -> bool {
        self.session.set_draft(text)
    }

    pub fn select_tab(&mut self, index: usize, props: &TabularDataProps) -> bool {
        let count = self.displayed_sheets(props).len();
        self.session.select_tab(index, count)
    }

    /// The sheets on display: the buffer while editing, else the
    /// committed content.
    pub fn displayed_sheets(&self, props: &TabularDataProps) -> Vec<Sheet> {
        if self.session.is_editing() {
            self.session.sheets(&[]).to_vec()
        } else {
            parse_sheets(props).sheets
        }
    }

    /// Leave edit mode and write the buffer back as a single update that
    /// replaces `sheetsJson`.
    ///
    /// Without a host, or when the host rejects the update, the edit is
    /// dropped with a warning. The editor is back in viewing mode either
    /// way.
    pub fn save(&mut self, host: Option<&mut dyn HostHandle>) -> bool {
        let Some(buffer) = self.session.save() else {
            return false;
        };
        let update = ShapeUpdate::new(
            self.shape_id,
            PropsPatch::SheetsJson {
                json: encode_sheets(&buffer),
            },
        );
        match host {
            None => {
                log::warn!("save on {} without a host; edit dropped", self.shape_id);
            }
            Some(host) => match host.update_shape(update) {
                Ok(()) => log::debug!("saved {} sheets to {}", buffer.len(), self.shape_id),
                Err(e) => log::warn!("save on {} dropped: {e}", self.shape_id),
            },
        }
        true
    }

    /// Leave edit mode, discarding the buffer.
    pub fn cancel(&mut self) -> bool {
        self.session.cancel()
    }
}
