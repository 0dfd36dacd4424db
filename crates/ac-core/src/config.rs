//! Tunable metrics and timings for the built-in shapes.
//!
//! Defaults reproduce the stock look. A host may override any subset by
//! passing JSON to [`ShapeConfig::from_json`]; missing fields keep their
//! defaults.

use crate::error::{ShapeError, ShapeResult};
use crate::model::Color;
use serde::{Deserialize, Serialize};

// ─── Table ────────────────────────────────────────────────────────────────

/// Layout metrics for the tabular data shape, shared by the sizing
/// algorithm and the renderer so both agree on row positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableMetrics {
    /// Width allotted per column when sizing from content.
    pub column_width: f64,
    /// Extra width added on top of the column total.
    pub width_padding: f64,
    pub min_auto_width: f64,
    pub max_auto_width: f64,
    pub title_bar_height: f64,
    pub header_row_height: f64,
    pub row_height: f64,
    /// Only reserved when the shape holds more than one sheet.
    pub tab_bar_height: f64,
    /// Bottom padding below the last row.
    pub padding: f64,
    /// Floor applied to user resizes.
    pub min_width: f64,
    pub min_height: f64,
    pub corner_radius: f64,
    pub font_size: f32,
}

impl Default for TableMetrics {
    fn default() -> Self {
        Self {
            column_width: 160.0,
            width_padding: 40.0,
            min_auto_width: 400.0,
            max_auto_width: 1200.0,
            title_bar_height: 44.0,
            header_row_height: 36.0,
            row_height: 32.0,
            tab_bar_height: 36.0,
            padding: 16.0,
            min_width: 300.0,
            min_height: 120.0,
            corner_radius: 8.0,
            font_size: 13.0,
        }
    }
}

// ─── Status overlay ───────────────────────────────────────────────────────

/// Colors and animation periods for the status overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayTheme {
    /// Tint while the agent is working.
    pub working_tint: Color,
    /// Tint once the agent is completing.
    pub completing_tint: Color,
    pub pill_background: Color,
    pub pill_text: Color,
    pub scan_period_ms: u32,
    pub border_period_ms: u32,
    pub pulse_period_ms: u32,
    pub fade_ms: u32,
    /// Fixed label shown while completing.
    pub done_label: String,
    pub corner_radius: f64,
    pub dash: [f64; 2],
}

impl Default for OverlayTheme {
    fn default() -> Self {
        Self {
            working_tint: Color::rgba(0.545, 0.361, 0.965, 1.0),
            completing_tint: Color::rgba(0.133, 0.773, 0.369, 1.0),
            pill_background: Color::rgba(0.067, 0.071, 0.098, 0.85),
            pill_text: Color::rgba(1.0, 1.0, 1.0, 1.0),
            scan_period_ms: 3000,
            border_period_ms: 8000,
            pulse_period_ms: 1500,
            fade_ms: 600,
            done_label: "\u{2713} Done".into(),
            corner_radius: 8.0,
            dash: [8.0, 6.0],
        }
    }
}

// ─── Top level ────────────────────────────────────────────────────────────

/// Configuration for all shape handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub table: TableMetrics,
    pub overlay: OverlayTheme,
}

impl ShapeConfig {
    /// Parse a (possibly partial) JSON configuration.
    ///
    /// # Errors
    /// Returns [`ShapeError::InvalidConfig`] when the JSON does not match
    /// the config schema.
    pub fn from_json(json: &str) -> ShapeResult<Self> {
        serde_json::from_str(json).map_err(ShapeError::InvalidConfig)
    }
}
