//! Tolerant decoding of agent-supplied table payloads.
//!
//! Resolution order for a [`TabularDataProps`]:
//!
//! 1. `sheetsJson`, if it decodes to a non-empty sheet list.
//! 2. The legacy `headersJson` / `rowsJson` pair, wrapped as one sheet named
//!    after the title. Each half falls back to empty on its own.
//! 3. Nothing: the shape renders its "no data" placeholder.
//!
//! Malformed JSON is logged and treated as absent. Nothing here returns an
//! error to the renderer.

use crate::error::{ShapeError, ShapeResult};
use crate::model::{Sheet, TabularDataProps, row_from_value, value_to_text};
use serde_json::Value;

/// Name given to the legacy sheet when the shape has no title.
pub const FALLBACK_SHEET_NAME: &str = "Sheet 1";

/// Which payload the sheets came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSource {
    Sheets,
    Legacy,
    Empty,
}

/// Result of resolving a shape's table payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheets {
    pub sheets: Vec<Sheet>,
    pub source: SheetSource,
}

impl ParsedSheets {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Strictly decode a `sheetsJson` payload. Blank input is an empty list.
///
/// # Errors
/// Returns [`ShapeError::MalformedPayload`] if the JSON is invalid or is not
/// an array of sheet objects.
pub fn decode_sheets(json: &str) -> ShapeResult<Vec<Sheet>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json).map_err(|source| ShapeError::MalformedPayload {
        field: "sheetsJson",
        source,
    })
}

/// Serialize sheets to the canonical `sheetsJson` wire format.
pub fn encode_sheets(sheets: &[Sheet]) -> String {
    serde_json::to_string(sheets).unwrap_or_else(|e| {
        log::warn!("failed to encode sheets: {e}");
        "[]".to_string()
    })
}

/// Decode the legacy single-sheet fields. Each field independently falls
/// back to empty when blank or malformed.
pub fn decode_legacy(headers_json: &str, rows_json: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = decode_array(headers_json, "headersJson")
        .into_iter()
        .map(value_to_text)
        .collect();
    let rows = decode_array(rows_json, "rowsJson")
        .into_iter()
        .map(row_from_value)
        .collect();
    (headers, rows)
}

fn decode_array(json: &str, field: &'static str) -> Vec<Value> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Value>>(json) {
        Ok(values) => values,
        Err(source) => {
            log::debug!("{}", ShapeError::MalformedPayload { field, source });
            Vec::new()
        }
    }
}

/// Resolve the sheets a tabular shape should display.
pub fn parse_sheets(props: &TabularDataProps) -> ParsedSheets {
    match decode_sheets(&props.sheets_json) {
        Ok(sheets) if !sheets.is_empty() => {
            return ParsedSheets {
                sheets,
                source: SheetSource::Sheets,
            };
        }
        Ok(_) => {}
        Err(e) => log::debug!("{e}; trying legacy fields"),
    }

    let (headers, rows) = decode_legacy(&props.headers_json, &props.rows_json);
    if headers.is_empty() && rows.is_empty() {
        return ParsedSheets {
            sheets: Vec::new(),
            source: SheetSource::Empty,
        };
    }

    let name = if props.title.trim().is_empty() {
        FALLBACK_SHEET_NAME.to_string()
    } else {
        props.title.clone()
    };
    ParsedSheets {
        sheets: vec![Sheet::new(name, headers, rows)],
        source: SheetSource::Legacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(sheets_json: &str, headers_json: &str, rows_json: &str, title: &str) -> TabularDataProps {
        TabularDataProps {
            title: title.into(),
            headers_json: headers_json.into(),
            rows_json: rows_json.into(),
            sheets_json: sheets_json.into(),
            ..Default::default()
        }
    }

    #[test]
    fn sheets_json_wins_when_present() {
        let parsed = parse_sheets(&props(
            r#"[{"name":"A","headers":["x"],"rows":[["1"]]}]"#,
            r#"["legacy"]"#,
            "[]",
            "T",
        ));
        assert_eq!(parsed.source, SheetSource::Sheets);
        assert_eq!(parsed.sheets.len(), 1);
        assert_eq!(parsed.sheets[0].name, "A");
    }

    #[test]
    fn legacy_fallback_uses_title() {
        let parsed = parse_sheets(&props("[]", r#"["A","B"]"#, r#"[["1","2"]]"#, "T"));
        assert_eq!(parsed.source, SheetSource::Legacy);
        assert_eq!(
            parsed.sheets,
            vec![Sheet::new(
                "T",
                vec!["A".into(), "B".into()],
                vec![vec!["1".into(), "2".into()]]
            )]
        );
    }

    #[test]
    fn legacy_fallback_without_title() {
        let parsed = parse_sheets(&props("", r#"["A"]"#, "not json", "  "));
        assert_eq!(parsed.sheets[0].name, FALLBACK_SHEET_NAME);
        assert_eq!(parsed.sheets[0].headers, vec!["A"]);
        assert!(parsed.sheets[0].rows.is_empty());
    }

    #[test]
    fn truncated_sheets_json_falls_through() {
        let parsed = parse_sheets(&props(
            r#"[{"name":"A","headers":["x"],"rows":[["1"#,
            r#"["H"]"#,
            "[]",
            "Fallback",
        ));
        assert_eq!(parsed.source, SheetSource::Legacy);
        assert_eq!(parsed.sheets[0].name, "Fallback");
    }

    #[test]
    fn everything_malformed_is_empty() {
        let parsed = parse_sheets(&props("{", "{", "{", "T"));
        assert_eq!(parsed.source, SheetSource::Empty);
        assert!(parsed.is_empty());
    }

    #[test]
    fn schema_mismatch_is_malformed() {
        assert!(matches!(
            decode_sheets(r#"{"name":"not a list"}"#),
            Err(ShapeError::MalformedPayload {
                field: "sheetsJson",
                ..
            })
        ));
        assert!(decode_sheets("   ").unwrap().is_empty());
    }

    #[test]
    fn encode_is_canonical() {
        let sheets = vec![Sheet::new("S", vec!["h".into()], vec![vec!["v".into()]])];
        assert_eq!(
            encode_sheets(&sheets),
            r#"[{"name":"S","headers":["h"],"rows":[["v"]]}]"#
        );
    }
}
