//! Input abstraction layer.
//!
//! Normalizes the DOM events a table receives (clicks on interactive
//! regions, keys and text from the inline cell input, focus loss) into a
//! `TableEvent` consumed by `TableEditor`.

use ac_render::tree::UiAction;

/// A normalized input event targeted at one table shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Single click on a region (button, tab, cell).
    Click(UiAction),
    /// Double click on a region. On a cell while editing, opens it.
    DoubleClick(UiAction),
    /// Key pressed in the inline cell input.
    Key { key: String },
    /// Inline cell input value changed.
    Input { text: String },
    /// Inline cell input lost focus.
    Blur,
}

/// Keys with a meaning inside the inline cell input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKey {
    /// Commit the draft.
    Enter,
    /// Discard the draft.
    Escape,
}

impl CellKey {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(CellKey::Enter),
            "Escape" | "Esc" => Some(CellKey::Escape),
            _ => None,
        }
    }
}

impl TableEvent {
    /// Create an event from a DOM event type and its detail: the region's
    /// action token for clicks, the key for `keydown`, the value for
    /// `input`. Returns `None` for events a table does not handle.
    /// (Used when bridging from JS via wasm-bindgen.)
    pub fn from_dom(kind: &str, detail: &str) -> Option<Self> {
        match kind {
            "click" => UiAction::from_token(detail).map(Self::Click),
            "dblclick" => UiAction::from_token(detail).map(Self::DoubleClick),
            "keydown" => Some(Self::Key { key: detail.to_string() }),
            "input" => Some(Self::Input { text: detail.to_string() }),
            "blur" | "focusout" => Some(Self::Blur),
            _ => None,
        }
    }

    /// The region action this event targets, if it is a pointer event.
    pub fn action(&self) -> Option<UiAction> {
        match self {
            Self::Click(a) | Self::DoubleClick(a) => Some(*a),
            _ => None,
        }
    }

    /// Recognized cell-input key, if this is a key event.
    pub fn cell_key(&self) -> Option<CellKey> {
        match self {
            Self::Key { key } => CellKey::from_key(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dom_events_map_to_table_events() {
        assert_eq!(TableEvent::from_dom("click", "save"), Some(TableEvent::Click(UiAction::Save)));
        assert_eq!(
            TableEvent::from_dom("dblclick", "cell:3:1"),
            Some(TableEvent::DoubleClick(UiAction::Cell { row: 3, col: 1 }))
        );
        assert_eq!(TableEvent::from_dom("blur", ""), Some(TableEvent::Blur));
        assert_eq!(TableEvent::from_dom("click", "bogus"), None);
        assert_eq!(TableEvent::from_dom("wheel", ""), None);
    }

    #[test]
    fn cell_keys() {
        let enter = TableEvent::from_dom("keydown", "Enter");
        assert_eq!(enter.and_then(|e| e.cell_key()), Some(CellKey::Enter));
        assert_eq!(CellKey::from_key("Esc"), Some(CellKey::Escape));
        assert_eq!(CellKey::from_key("a"), None);
        assert_eq!(TableEvent::Blur.cell_key(), None);
        assert_eq!(TableEvent::Blur.action(), None);
    }
}
