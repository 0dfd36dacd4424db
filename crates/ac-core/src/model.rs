//! Shape data model for agent-produced canvas artifacts.
//!
//! A `ShapeRecord` is owned by the host document. This crate only defines
//! the typed `props` payload of each shape type, the partial updates the
//! host may apply to it, and the declarative animation vocabulary shapes
//! use when rendering. Nested table data travels as JSON strings inside the
//! props (wire compatibility) and is decoded once by `crate::sheets`.

use crate::error::{ShapeError, ShapeResult};
use crate::id::ShapeId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let channel = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            6 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, ignoring alpha (alpha travels as a separate
    /// opacity attribute in SVG output).
    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

// ─── Shape types ─────────────────────────────────────────────────────────

/// The shape type tag. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeType {
    StatusOverlay,
    TabularData,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::StatusOverlay => "status-overlay",
            ShapeType::TabularData => "tabular-data",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeType {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status-overlay" => Ok(ShapeType::StatusOverlay),
            "tabular-data" => Ok(ShapeType::TabularData),
            other => Err(ShapeError::UnknownShapeType(other.to_string())),
        }
    }
}

// ─── Status overlay ──────────────────────────────────────────────────────

/// Lifecycle of a status overlay. Variants are declared in lifecycle order,
/// so `Ord` follows `working < completing < done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Working,
    Completing,
    Done,
}

impl Status {
    /// Whether moving from `self` to `next` respects the monotonic
    /// lifecycle. Re-asserting the current status is allowed.
    pub fn can_advance_to(self, next: Status) -> bool {
        next >= self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Working => "working",
            Status::Completing => "completing",
            Status::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusOverlayProps {
    pub width: f64,
    pub height: f64,
    pub status_text: String,
    pub status: Status,
}

impl Default for StatusOverlayProps {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            status_text: "Working...".into(),
            status: Status::Working,
        }
    }
}

impl StatusOverlayProps {
    /// Move to `next` if the lifecycle allows it. Returns `false` and leaves
    /// the props untouched on a back-transition.
    pub fn advance(&mut self, next: Status) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        true
    }
}

// ─── Tabular data ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabularDataProps {
    pub width: f64,
    pub height: f64,
    pub title: String,
    /// Legacy single-sheet headers (`string[]`).
    pub headers_json: String,
    /// Legacy single-sheet rows (`string[][]`).
    pub rows_json: String,
    /// Canonical multi-sheet payload (`[{name, headers, rows}]`).
    pub sheets_json: String,
    /// Agent task that produced this data. Lookup only.
    pub source_task_id: String,
}

impl Default for TabularDataProps {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            title: "Results".into(),
            headers_json: "[]".into(),
            rows_json: "[]".into(),
            sheets_json: "[]".into(),
            source_task_id: String::new(),
        }
    }
}

/// One named table within a tabular shape.
///
/// Well-formed rows have exactly `headers.len()` cells, but ragged rows are
/// kept as-is: renderers ignore excess cells and show missing ones empty.
/// Scalar JSON cells (numbers, booleans) are read as text and `null` as an
/// empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_cells")]
    pub headers: Vec<String>,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Cell text at (row, col); missing cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Tab label, falling back to a positional name for unnamed sheets.
    pub fn label(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("Sheet {}", index + 1)
        } else {
            self.name.clone()
        }
    }
}

/// Read any JSON scalar as cell text.
pub(crate) fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_cells<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().map(value_to_text).collect())
}

fn lenient_rows<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Vec<String>>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().map(row_from_value).collect())
}

/// A row is normally an array; a bare scalar becomes a one-cell row.
pub(crate) fn row_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(cells) => cells.into_iter().map(value_to_text).collect(),
        Value::Null => Vec::new(),
        scalar => vec![value_to_text(scalar)],
    }
}

// ─── Records ─────────────────────────────────────────────────────────────

/// Type-tagged props payload. Serializes as `{"type": ..., "props": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props", rename_all = "kebab-case")]
pub enum ShapeProps {
    StatusOverlay(StatusOverlayProps),
    TabularData(TabularDataProps),
}

impl ShapeProps {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeProps::StatusOverlay(_) => ShapeType::StatusOverlay,
            ShapeProps::TabularData(_) => ShapeType::TabularData,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        match self {
            ShapeProps::StatusOverlay(p) => (p.width, p.height),
            ShapeProps::TabularData(p) => (p.width, p.height),
        }
    }
}

/// A shape as stored by the host document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: ShapeId,
    /// Page position of the top-left corner.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(flatten)]
    pub props: ShapeProps,
}

impl ShapeRecord {
    pub fn new(id: ShapeId, x: f64, y: f64, props: ShapeProps) -> Self {
        Self { id, x, y, props }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.props.shape_type()
    }

    pub fn as_status_overlay(&self) -> Option<&StatusOverlayProps> {
        match &self.props {
            ShapeProps::StatusOverlay(p) => Some(p),
            ShapeProps::TabularData(_) => None,
        }
    }

    pub fn as_tabular(&self) -> Option<&TabularDataProps> {
        match &self.props {
            ShapeProps::TabularData(p) => Some(p),
            ShapeProps::StatusOverlay(_) => None,
        }
    }

    /// Apply one partial update. Patches that do not fit the shape's type
    /// are rejected without touching the record.
    pub fn apply(&mut self, patch: &PropsPatch) -> ShapeResult<()> {
        let id = self.id;
        let mismatch = |expected| ShapeError::TypeMismatch { id, expected };

        match (&mut self.props, patch) {
            (ShapeProps::StatusOverlay(p), PropsPatch::Size { width, height }) => {
                p.width = *width;
                p.height = *height;
            }
            (ShapeProps::TabularData(p), PropsPatch::Size { width, height }) => {
                p.width = *width;
                p.height = *height;
            }
            (ShapeProps::StatusOverlay(p), PropsPatch::Status { status }) => p.status = *status,
            (ShapeProps::StatusOverlay(p), PropsPatch::StatusText { text }) => {
                p.status_text = text.clone();
            }
            (ShapeProps::TabularData(p), PropsPatch::SheetsJson { json }) => {
                p.sheets_json = json.clone();
            }
            (ShapeProps::TabularData(p), PropsPatch::Title { title }) => p.title = title.clone(),
            (_, PropsPatch::Status { .. } | PropsPatch::StatusText { .. }) => {
                return Err(mismatch(ShapeType::StatusOverlay));
            }
            (_, PropsPatch::SheetsJson { .. } | PropsPatch::Title { .. }) => {
                return Err(mismatch(ShapeType::TabularData));
            }
        }
        Ok(())
    }
}

// ─── Updates ─────────────────────────────────────────────────────────────

/// A partial props update the host commits on behalf of a shape or producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PropsPatch {
    Size { width: f64, height: f64 },
    Status { status: Status },
    StatusText { text: String },
    SheetsJson { json: String },
    Title { title: String },
}

/// One host update: all patches for a shape, committed atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeUpdate {
    pub id: ShapeId,
    pub patches: SmallVec<[PropsPatch; 2]>,
}

impl ShapeUpdate {
    pub fn new(id: ShapeId, patch: PropsPatch) -> Self {
        let mut patches = SmallVec::new();
        patches.push(patch);
        Self { id, patches }
    }
}

// ─── Animation ───────────────────────────────────────────────────────────

/// What a declared animation moves. The host's rendering pipeline drives
/// it; shapes only declare period and trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimKind {
    /// Translate vertically from 0 to `travel` (scan band sweep).
    ScanSweep { travel: f64 },
    /// Stroke dash offset from 0 to `-dash_cycle` (marching ants).
    MarchingAnts { dash_cycle: f64 },
    /// Opacity 1 → `min_opacity` → 1.
    Pulse { min_opacity: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    Loop,
    Once,
}

/// A time-driven animation declaration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub kind: AnimKind,
    pub period_ms: u32,
    pub repeat: Repeat,
}

impl Animation {
    pub fn looping(kind: AnimKind, period_ms: u32) -> Self {
        Self {
            kind,
            period_ms,
            repeat: Repeat::Loop,
        }
    }

    /// Progress in `[0, 1)` for loops, `[0, 1]` for one-shots.
    pub fn phase(&self, elapsed_ms: f64) -> f64 {
        if self.period_ms == 0 {
            return 1.0;
        }
        let t = elapsed_ms.max(0.0) / self.period_ms as f64;
        match self.repeat {
            Repeat::Loop => t.fract(),
            Repeat::Once => t.min(1.0),
        }
    }
}

/// One-shot opacity transition (the overlay fade-out).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: f32,
    pub to: f32,
    pub duration_ms: u32,
}

impl Transition {
    /// Linear interpolation, clamped to `to` once the window has elapsed.
    pub fn value_at(&self, elapsed_ms: f64) -> f32 {
        if self.duration_ms == 0 || elapsed_ms >= self.duration_ms as f64 {
            return self.to;
        }
        let t = (elapsed_ms.max(0.0) / self.duration_ms as f64) as f32;
        self.from + (self.to - self.from) * t
    }
}
