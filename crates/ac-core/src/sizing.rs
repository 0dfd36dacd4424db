//! Content-driven initial size for tabular shapes.
//!
//! Runs once, when the shape is created. Later user resizes are never
//! recomputed from content.

use crate::config::TableMetrics;
use crate::model::Sheet;

/// Largest column and row counts across all sheets, each floored at 1.
pub fn content_extent(sheets: &[Sheet]) -> (usize, usize) {
    let columns = sheets.iter().map(|s| s.headers.len()).max().unwrap_or(0).max(1);
    let rows = sheets.iter().map(|s| s.rows.len()).max().unwrap_or(0).max(1);
    (columns, rows)
}

/// Compute `(width, height)` for a freshly created table.
///
/// Width is `columns * column_width + width_padding`, clamped to the auto
/// width range (an inverted range resolves to its upper bound). Height
/// stacks title bar, header row, every row, the tab bar (only with more
/// than one sheet) and bottom padding.
pub fn table_size(sheets: &[Sheet], metrics: &TableMetrics) -> (f64, f64) {
    let (columns, rows) = content_extent(sheets);

    let width = (columns as f64 * metrics.column_width + metrics.width_padding)
        .max(metrics.min_auto_width)
        .min(metrics.max_auto_width);

    let tab_bar = if sheets.len() > 1 {
        metrics.tab_bar_height
    } else {
        0.0
    };
    let height = metrics.title_bar_height
        + metrics.header_row_height
        + rows as f64 * metrics.row_height
        + tab_bar
        + metrics.padding;

    (width, height)
}

/// Apply a host scale delta to the current size, floored at the minimum
/// table dimensions. Negative scales (flips) are treated by magnitude.
pub fn resized(
    width: f64,
    height: f64,
    scale_x: f64,
    scale_y: f64,
    metrics: &TableMetrics,
) -> (f64, f64) {
    (
        (width * scale_x.abs()).max(metrics.min_width),
        (height * scale_y.abs()).max(metrics.min_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cols: usize, rows: usize) -> Sheet {
        Sheet::new(
            "s",
            (0..cols).map(|c| format!("c{c}")).collect(),
            (0..rows).map(|_| vec![String::new(); cols]).collect(),
        )
    }

    #[test]
    fn empty_content_gets_minimum_size() {
        let m = TableMetrics::default();
        let (w, h) = table_size(&[], &m);
        assert_eq!(w, 400.0);
        assert_eq!(h, 44.0 + 36.0 + 32.0 + 16.0);
    }

    #[test]
    fn width_grows_with_columns_then_clamps() {
        let m = TableMetrics::default();
        assert_eq!(table_size(&[sheet(3, 1)], &m).0, 520.0);
        assert_eq!(table_size(&[sheet(20, 1)], &m).0, 1200.0);
    }

    #[test]
    fn inverted_width_range_does_not_panic() {
        let m = TableMetrics {
            min_auto_width: 1300.0,
            max_auto_width: 1200.0,
            ..TableMetrics::default()
        };
        assert_eq!(table_size(&[], &m).0, 1200.0);
        assert_eq!(table_size(&[sheet(20, 1)], &m).0, 1200.0);
    }

    #[test]
    fn tab_bar_only_for_multiple_sheets() {
        let m = TableMetrics::default();
        let (_, single) = table_size(&[sheet(2, 5)], &m);
        let (_, multi) = table_size(&[sheet(2, 5), sheet(1, 2)], &m);
        assert_eq!(single, 44.0 + 36.0 + 5.0 * 32.0 + 16.0);
        assert_eq!(multi, single + 36.0);
    }

    #[test]
    fn extent_takes_max_across_sheets() {
        assert_eq!(content_extent(&[sheet(2, 9), sheet(6, 1)]), (6, 9));
    }

    #[test]
    fn resize_is_floor_clamped() {
        let m = TableMetrics::default();
        assert_eq!(resized(600.0, 400.0, 0.1, 0.1, &m), (300.0, 120.0));
        assert_eq!(resized(600.0, 400.0, 1.5, -0.5, &m), (900.0, 200.0));
    }
}
