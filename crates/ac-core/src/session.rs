//! Per-instance view and edit state of a tabular shape.
//!
//! ```text
//! Viewing ──begin_edit──▶ Editing { buffer, cell: None }
//!                           │  ▲
//!            begin_cell_edit│  │commit_cell / cancel_cell
//!                           ▼  │
//!                         Editing { buffer, cell: Some(..) }
//! Editing ──save / cancel──▶ Viewing
//! ```
//!
//! The buffer is a clone of the committed sheets taken on `begin_edit`. It
//! belongs to exactly one session, so editing one shape can never touch the
//! committed or buffered data of another. Tab selection is independent of
//! the edit mode.

use crate::model::Sheet;

/// An in-progress edit of a single cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    /// Sheet index the cell belongs to (fixed when the edit starts).
    pub sheet: usize,
    pub row: usize,
    pub col: usize,
    /// Text typed so far; not yet in the buffer.
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing {
        buffer: Vec<Sheet>,
        cell: Option<CellEdit>,
    },
}

/// View/edit state for one tabular shape instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSession {
    active_tab: usize,
    mode: EditMode,
}

impl TableSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::Editing { .. })
    }

    /// The active tab, clamped to the number of sheets on display.
    pub fn active_tab(&self, sheet_count: usize) -> usize {
        self.active_tab.min(sheet_count.saturating_sub(1))
    }

    /// Switch tabs. Allowed while viewing and while editing; a pending cell
    /// edit keeps pointing at its own sheet.
    pub fn select_tab(&mut self, index: usize, sheet_count: usize) -> bool {
        if index >= sheet_count {
            return false;
        }
        self.active_tab = index;
        true
    }

    /// Sheets to display: the buffer while editing, otherwise `committed`.
    pub fn sheets<'a>(&'a self, committed: &'a [Sheet]) -> &'a [Sheet] {
        match &self.mode {
            EditMode::Editing { buffer, .. } => buffer,
            EditMode::Viewing => committed,
        }
    }

    pub fn cell_edit(&self) -> Option<&CellEdit> {
        match &self.mode {
            EditMode::Editing { cell, .. } => cell.as_ref(),
            EditMode::Viewing => None,
        }
    }

    /// Whether (`row`, `col`) of the active tab is the cell being edited.
    pub fn is_cell_open(&self, row: usize, col: usize) -> bool {
        let EditMode::Editing {
            buffer,
            cell: Some(edit),
        } = &self.mode
        else {
            return false;
        };
        edit.sheet == self.active_tab(buffer.len()) && edit.row == row && edit.col == col
    }

    /// Enter edit mode with a private copy of the committed sheets.
    /// No-op when already editing or when there is nothing to edit.
    pub fn begin_edit(&mut self, committed: &[Sheet]) -> bool {
        if self.is_editing() || committed.is_empty() {
            return false;
        }
        log::debug!("table edit started ({} sheets)", committed.len());
        self.mode = EditMode::Editing {
            buffer: committed.to_vec(),
            cell: None,
        };
        true
    }

    /// Start editing the cell at (`row`, `col`) of the active tab.
    ///
    /// Only valid while editing, and only for cells the table shows: rows
    /// that exist and columns under a header. A pending edit on another cell
    /// is committed first, as if it had lost focus.
    pub fn begin_cell_edit(&mut self, row: usize, col: usize) -> bool {
        self.commit_cell();
        let active_tab = self.active_tab;
        let EditMode::Editing { buffer, cell } = &mut self.mode else {
            return false;
        };
        let sheet_idx = active_tab.min(buffer.len().saturating_sub(1));
        let Some(sheet) = buffer.get(sheet_idx) else {
            return false;
        };
        if row >= sheet.rows.len() || col >= sheet.headers.len() {
            return false;
        }
        *cell = Some(CellEdit {
            sheet: sheet_idx,
            row,
            col,
            draft: sheet.cell(row, col).to_string(),
        });
        true
    }

    /// Replace the pending cell's draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        match &mut self.mode {
            EditMode::Editing {
                cell: Some(edit), ..
            } => {
                edit.draft = text.into();
                true
            }
            _ => false,
        }
    }

    /// Write the pending draft into the buffer (blur or Enter). Short rows
    /// are padded with empty cells up to the edited column.
    pub fn commit_cell(&mut self) -> bool {
        let EditMode::Editing { buffer, cell } = &mut self.mode else {
            return false;
        };
        let Some(edit) = cell.take() else {
            return false;
        };
        let Some(row) = buffer
            .get_mut(edit.sheet)
            .and_then(|s| s.rows.get_mut(edit.row))
        else {
            return false;
        };
        if row.len() <= edit.col {
            row.resize(edit.col + 1, String::new());
        }
        row[edit.col] = edit.draft;
        true
    }

    /// Drop the pending draft (Escape). Stays in edit mode.
    pub fn cancel_cell(&mut self) -> bool {
        match &mut self.mode {
            EditMode::Editing { cell, .. } => cell.take().is_some(),
            EditMode::Viewing => false,
        }
    }

    /// Leave edit mode, handing back the buffer to commit. A pending cell
    /// draft is committed first.
    pub fn save(&mut self) -> Option<Vec<Sheet>> {
        self.commit_cell();
        match std::mem::take(&mut self.mode) {
            EditMode::Editing { buffer, .. } => Some(buffer),
            EditMode::Viewing => None,
        }
    }

    /// Leave edit mode, discarding the buffer.
    pub fn cancel(&mut self) -> bool {
        let was_editing = self.is_editing();
        if was_editing {
            log::debug!("table edit canceled");
        }
        self.mode = EditMode::Viewing;
        was_editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheets() -> Vec<Sheet> {
        vec![
            Sheet::new(
                "People",
                vec!["Name".into(), "Role".into()],
                vec![vec!["Ada".into(), "Eng".into()], vec!["Bo".into()]],
            ),
            Sheet::new("Empty", vec!["Only".into()], vec![vec![]]),
        ]
    }

    #[test]
    fn cell_edits_require_edit_mode() {
        let mut s = TableSession::new();
        assert!(!s.begin_cell_edit(0, 0));
        assert!(s.begin_edit(&sheets()));
        assert!(!s.begin_edit(&sheets()));
        assert!(s.begin_cell_edit(0, 0));
        assert_eq!(s.cell_edit().unwrap().draft, "Ada");
    }

    #[test]
    fn commit_writes_into_buffer_only() {
        let committed = sheets();
        let mut s = TableSession::new();
        s.begin_edit(&committed);
        s.begin_cell_edit(1, 1);
        s.set_draft("PM");
        assert!(s.commit_cell());

        assert_eq!(s.sheets(&committed)[0].rows[1], vec!["Bo", "PM"]);
        assert_eq!(committed[0].rows[1], vec!["Bo"]);
    }

    #[test]
    fn escape_discards_only_the_cell() {
        let committed = sheets();
        let mut s = TableSession::new();
        s.begin_edit(&committed);
        s.begin_cell_edit(0, 1);
        s.set_draft("nope");
        assert!(s.cancel_cell());
        assert!(s.is_editing());
        assert_eq!(s.sheets(&committed)[0].cell(0, 1), "Eng");
    }

    #[test]
    fn switching_cells_commits_the_previous_one() {
        let committed = sheets();
        let mut s = TableSession::new();
        s.begin_edit(&committed);
        s.begin_cell_edit(0, 0);
        s.set_draft("Grace");
        s.begin_cell_edit(1, 0);
        assert_eq!(s.sheets(&committed)[0].cell(0, 0), "Grace");
        assert_eq!(s.cell_edit().unwrap().row, 1);
    }

    #[test]
    fn out_of_range_cells_are_rejected() {
        let mut s = TableSession::new();
        s.begin_edit(&sheets());
        assert!(!s.begin_cell_edit(5, 0));
        assert!(!s.begin_cell_edit(0, 2));
    }

    #[test]
    fn tab_switch_keeps_edit_state() {
        let committed = sheets();
        let mut s = TableSession::new();
        s.begin_edit(&committed);
        s.begin_cell_edit(0, 0);
        s.set_draft("X");
        assert!(s.select_tab(1, committed.len()));
        assert!(s.is_editing());
        assert_eq!(s.cell_edit().unwrap().sheet, 0);
        assert!(!s.select_tab(7, committed.len()));
        assert_eq!(s.active_tab(committed.len()), 1);

        let saved = s.save().unwrap();
        assert_eq!(saved[0].cell(0, 0), "X");
        assert_eq!(saved[1], committed[1]);
    }

    #[test]
    fn save_and_cancel_return_to_viewing() {
        let committed = sheets();
        let mut s = TableSession::new();
        assert!(s.save().is_none());
        s.begin_edit(&committed);
        s.begin_cell_edit(0, 0);
        s.set_draft("pending");
        assert!(s.cancel());
        assert_eq!(s.mode(), &EditMode::Viewing);
        assert_eq!(s.sheets(&committed), committed.as_slice());
        assert!(!s.cancel());
    }

    #[test]
    fn nothing_to_edit() {
        let mut s = TableSession::new();
        assert!(!s.begin_edit(&[]));
        assert_eq!(s.active_tab(0), 0);
    }
}
