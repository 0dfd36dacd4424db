pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod session;
pub mod sheets;
pub mod sizing;

pub use config::{OverlayTheme, ShapeConfig, TableMetrics};
pub use error::{ShapeError, ShapeResult};
pub use id::ShapeId;
pub use model::*;
pub use session::{CellEdit, EditMode, TableSession};
pub use sheets::{ParsedSheets, SheetSource, decode_sheets, encode_sheets, parse_sheets};
pub use sizing::table_size;
