//! Hit testing: page point → shape lookup.
//!
//! Shapes are checked in reverse document order (last painted = topmost)
//! against the geometry their handler reports. Zero-area geometry is never
//! hit and never caught by a marquee.

use crate::handler::ShapeRegistry;
use ac_core::id::ShapeId;
use ac_core::model::ShapeRecord;
use kurbo::{Point, Rect};

/// Find the topmost shape at page position (px, py).
/// Returns `None` if no shape is hit (background).
pub fn hit_test(registry: &ShapeRegistry, records: &[ShapeRecord], px: f64, py: f64) -> Option<ShapeId> {
    records.iter().rev().find_map(|record| {
        let geometry = registry.geometry(record);
        let local = Point::new(px - record.x, py - record.y);
        geometry.hit(local).then_some(record.id)
    })
}

/// Find every shape whose geometry intersects the page rectangle.
/// Used for marquee (box) selection.
pub fn hit_test_rect(registry: &ShapeRegistry, records: &[ShapeRecord], marquee: Rect) -> Vec<ShapeId> {
    let marquee = marquee.abs();
    records
        .iter()
        .filter(|record| {
            let geometry = registry.geometry(record);
            if geometry.is_zero_area() {
                return false;
            }
            let page = geometry.page_rect(record.x, record.y);
            page.intersect(marquee).area() > 0.0
        })
        .map(|record| record.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::model::{ShapeProps, StatusOverlayProps, TabularDataProps};
    use pretty_assertions::assert_eq;

    fn table(id: &str, x: f64, y: f64) -> ShapeRecord {
        ShapeRecord::new(
            ShapeId::intern(id),
            x,
            y,
            ShapeProps::TabularData(TabularDataProps::default()),
        )
    }

    fn overlay(id: &str) -> ShapeRecord {
        ShapeRecord::new(
            ShapeId::intern(id),
            0.0,
            0.0,
            ShapeProps::StatusOverlay(StatusOverlayProps {
                width: 2000.0,
                height: 2000.0,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn topmost_wins() {
        let registry = ShapeRegistry::default();
        let records = vec![table("under", 0.0, 0.0), table("over", 100.0, 100.0)];
        assert_eq!(hit_test(&registry, &records, 50.0, 50.0), Some(ShapeId::intern("under")));
        assert_eq!(hit_test(&registry, &records, 150.0, 150.0), Some(ShapeId::intern("over")));
        assert_eq!(hit_test(&registry, &records, 5000.0, 5000.0), None);
    }

    #[test]
    fn overlay_on_top_never_intercepts() {
        let registry = ShapeRegistry::default();
        let records = vec![table("data", 10.0, 10.0), overlay("status")];
        assert_eq!(hit_test(&registry, &records, 20.0, 20.0), Some(ShapeId::intern("data")));
        assert_eq!(hit_test(&registry, &records, 0.0, 0.0), None);
    }

    #[test]
    fn marquee_skips_zero_area_shapes() {
        let registry = ShapeRegistry::default();
        let records = vec![overlay("status"), table("data", 10.0, 10.0), table("far", 5000.0, 0.0)];
        // Dragged from bottom-right to top-left.
        let hits = hit_test_rect(&registry, &records, Rect::new(700.0, 700.0, -10.0, -10.0));
        assert_eq!(hits, vec![ShapeId::intern("data")]);
    }
}
