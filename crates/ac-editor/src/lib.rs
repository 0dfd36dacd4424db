pub mod document;
pub mod host;
pub mod input;
pub mod table_editor;

pub use document::ShapeDocument;
pub use host::HostHandle;
pub use input::TableEvent;
pub use table_editor::TableEditor;
