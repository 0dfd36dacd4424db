//! Visual tree → SVG markup.
//!
//! Declared animations become SMIL `<animate>` / `<animateTransform>`
//! elements so the browser drives them without script. Interactive regions
//! carry a `data-action` attribute holding the `UiAction` token.

use crate::tree::{Def, Fill, StrokeStyle, TextAlign, VisualNode, VisualTree};
use ac_core::model::{AnimKind, Animation, Color, Repeat, Transition};
use kurbo::{Point, Rect};
use std::fmt::Write;

const EXPORT_PADDING: f64 = 16.0;

/// Render a single tree as a `<g>` fragment in shape-local coordinates.
pub fn tree_to_svg(tree: &VisualTree) -> String {
    let mut out = String::new();
    write_tree(&mut out, tree, Point::ZERO);
    out
}

/// Render trees placed at page positions into a standalone document sized
/// to their union, padded on every side.
pub fn render_svg(placed: &[(Point, &VisualTree)]) -> String {
    let area = placed
        .iter()
        .filter_map(|(origin, tree)| tree_extent(tree).map(|r| r + origin.to_vec2()))
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::new(0.0, 0.0, 800.0, 600.0));

    let width = area.width() + EXPORT_PADDING * 2.0;
    let height = area.height() + EXPORT_PADDING * 2.0;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    svg.push_str("<style>\n  text { font-family: Inter, system-ui, sans-serif; }\n</style>\n");
    let _ = writeln!(
        svg,
        "<g transform=\"translate({}, {})\">",
        EXPORT_PADDING - area.x0,
        EXPORT_PADDING - area.y0
    );
    for (origin, tree) in placed {
        write_tree(&mut svg, tree, *origin);
    }
    svg.push_str("</g>\n</svg>");
    svg
}

/// Union of every drawn rectangle in the tree, in local coordinates.
/// Clipped groups contribute their clip rectangle only.
pub fn tree_extent(tree: &VisualTree) -> Option<Rect> {
    node_extent(tree, &tree.root)
}

fn node_extent(tree: &VisualTree, node: &VisualNode) -> Option<Rect> {
    let own = match node {
        VisualNode::Group { clip: Some(id), .. } => {
            if let Some(Def::ClipRect { rect, .. }) = tree.def(id) {
                return Some(*rect);
            }
            None
        }
        VisualNode::Rect { rect, .. }
        | VisualNode::Region { rect, .. }
        | VisualNode::TextInput { rect, .. } => Some(*rect),
        VisualNode::Circle { center, radius, .. } => {
            Some(Rect::from_center_size(*center, (radius * 2.0, radius * 2.0)))
        }
        VisualNode::Group { .. } | VisualNode::Text { .. } => None,
    };
    node.children()
        .iter()
        .filter_map(|child| node_extent(tree, child))
        .fold(own, |acc, r| Some(acc.map_or(r, |a| a.union(r))))
}

fn write_tree(out: &mut String, tree: &VisualTree, origin: Point) {
    let _ = writeln!(
        out,
        "<g id=\"{}\" transform=\"translate({}, {})\">",
        escape(&tree.id),
        origin.x,
        origin.y
    );
    if !tree.defs.is_empty() {
        out.push_str("<defs>\n");
        for def in &tree.defs {
            write_def(out, def);
        }
        out.push_str("</defs>\n");
    }
    write_node(out, &tree.root);
    out.push_str("</g>\n");
}

fn write_def(out: &mut String, def: &Def) {
    match def {
        Def::LinearGradient { id, stops, vertical } => {
            let (x2, y2) = if *vertical { (0, 1) } else { (1, 0) };
            let _ = writeln!(
                out,
                "  <linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"{x2}\" y2=\"{y2}\">",
                escape(id)
            );
            for (offset, color) in stops {
                let _ = writeln!(
                    out,
                    "    <stop offset=\"{offset}\" stop-color=\"{}\" stop-opacity=\"{}\" />",
                    color.to_hex(),
                    color.a
                );
            }
            out.push_str("  </linearGradient>\n");
        }
        Def::ClipRect { id, rect, radius } => {
            let _ = writeln!(
                out,
                "  <clipPath id=\"{}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" /></clipPath>",
                escape(id),
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height()
            );
        }
    }
}

fn write_node(out: &mut String, node: &VisualNode) {
    match node {
        VisualNode::Group {
            opacity,
            transition,
            clip,
            children,
        } => {
            out.push_str("<g");
            if *opacity < 1.0 || transition.is_some() {
                let _ = write!(out, " opacity=\"{opacity}\"");
            }
            if let Some(clip) = clip {
                let _ = write!(out, " clip-path=\"url(#{})\"", escape(clip));
            }
            out.push_str(">\n");
            if let Some(t) = transition {
                write_transition(out, t);
            }
            for child in children {
                write_node(out, child);
            }
            out.push_str("</g>\n");
        }
        VisualNode::Rect {
            rect,
            radius,
            fill,
            stroke,
            animation,
        } => {
            let _ = write!(
                out,
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" ry=\"{radius}\"{}{}",
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                fill_attrs(fill),
                stroke_attrs(stroke.as_ref())
            );
            close_with_animation(out, "rect", animation.as_ref());
        }
        VisualNode::Circle {
            center,
            radius,
            fill,
            animation,
        } => {
            let _ = write!(
                out,
                "  <circle cx=\"{}\" cy=\"{}\" r=\"{radius}\"{}",
                center.x,
                center.y,
                color_attrs("fill", *fill)
            );
            close_with_animation(out, "circle", animation.as_ref());
        }
        VisualNode::Text {
            origin,
            content,
            size,
            bold,
            color,
            align,
        } => {
            let anchor = match align {
                TextAlign::Start => "start",
                TextAlign::Middle => "middle",
                TextAlign::End => "end",
            };
            let weight = if *bold { " font-weight=\"600\"" } else { "" };
            let _ = writeln!(
                out,
                "  <text x=\"{}\" y=\"{}\" font-size=\"{size}\"{weight}{} text-anchor=\"{anchor}\">{}</text>",
                origin.x,
                origin.y,
                color_attrs("fill", *color),
                escape(content)
            );
        }
        VisualNode::Region {
            rect,
            action,
            children,
        } => {
            let _ = writeln!(
                out,
                "<g data-action=\"{}\" style=\"cursor: pointer\">",
                action.token()
            );
            // Transparent hit target so clicks land even between glyphs.
            let _ = writeln!(
                out,
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"transparent\" />",
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height()
            );
            for child in children {
                write_node(out, child);
            }
            out.push_str("</g>\n");
        }
        VisualNode::TextInput { rect, value } => {
            let _ = writeln!(
                out,
                "  <foreignObject x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"><input xmlns=\"http://www.w3.org/1999/xhtml\" data-cell-input=\"\" value=\"{}\" style=\"width: 100%; height: 100%; box-sizing: border-box\" /></foreignObject>",
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                escape(value)
            );
        }
    }
}

fn close_with_animation(out: &mut String, tag: &str, animation: Option<&Animation>) {
    let Some(anim) = animation else {
        out.push_str(" />\n");
        return;
    };
    out.push_str(">\n");
    let repeat = match anim.repeat {
        Repeat::Loop => "repeatCount=\"indefinite\"".to_string(),
        Repeat::Once => "repeatCount=\"1\" fill=\"freeze\"".to_string(),
    };
    let dur = anim.period_ms;
    match anim.kind {
        AnimKind::ScanSweep { travel } => {
            let _ = writeln!(
                out,
                "    <animateTransform attributeName=\"transform\" type=\"translate\" from=\"0 0\" to=\"0 {travel}\" dur=\"{dur}ms\" {repeat} />"
            );
        }
        AnimKind::MarchingAnts { dash_cycle } => {
            let _ = writeln!(
                out,
                "    <animate attributeName=\"stroke-dashoffset\" from=\"0\" to=\"{}\" dur=\"{dur}ms\" {repeat} />",
                -dash_cycle
            );
        }
        AnimKind::Pulse { min_opacity } => {
            let _ = writeln!(
                out,
                "    <animate attributeName=\"opacity\" values=\"1;{min_opacity};1\" dur=\"{dur}ms\" {repeat} />"
            );
        }
    }
    let _ = writeln!(out, "  </{tag}>");
}

fn write_transition(out: &mut String, t: &Transition) {
    let _ = writeln!(
        out,
        "  <animate attributeName=\"opacity\" from=\"{}\" to=\"{}\" dur=\"{}ms\" fill=\"freeze\" />",
        t.from, t.to, t.duration_ms
    );
}

fn fill_attrs(fill: &Fill) -> String {
    match fill {
        Fill::None => " fill=\"none\"".to_string(),
        Fill::Solid(c) => color_attrs("fill", *c),
        Fill::Gradient(id) => format!(" fill=\"url(#{})\"", escape(id)),
    }
}

fn stroke_attrs(stroke: Option<&StrokeStyle>) -> String {
    let Some(s) = stroke else {
        return String::new();
    };
    let mut attrs = color_attrs("stroke", s.color);
    let _ = write!(attrs, " stroke-width=\"{}\"", s.width);
    if let Some([dash, gap]) = s.dash {
        let _ = write!(attrs, " stroke-dasharray=\"{dash} {gap}\"");
    }
    attrs
}

/// `#RRGGBB` plus a separate opacity attribute when not fully opaque.
fn color_attrs(attr: &str, c: Color) -> String {
    if (c.a - 1.0).abs() < f32::EPSILON {
        format!(" {attr}=\"{}\"", c.to_hex())
    } else {
        format!(" {attr}=\"{}\" {attr}-opacity=\"{}\"", c.to_hex(), c.a)
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ShapeRegistry;
    use ac_core::id::ShapeId;
    use ac_core::model::{ShapeProps, ShapeRecord, Sheet, Status, StatusOverlayProps, TabularDataProps};
    use ac_core::sheets::encode_sheets;

    fn overlay(status: Status) -> ShapeRecord {
        ShapeRecord::new(
            ShapeId::intern("svg-ov"),
            0.0,
            0.0,
            ShapeProps::StatusOverlay(StatusOverlayProps {
                status,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn working_overlay_emits_looping_animations() {
        let registry = ShapeRegistry::default();
        let svg = tree_to_svg(&registry.render(&overlay(Status::Working), None));
        assert!(svg.contains("<animateTransform attributeName=\"transform\""));
        assert!(svg.contains("dur=\"3000ms\" repeatCount=\"indefinite\""));
        assert!(svg.contains("attributeName=\"stroke-dashoffset\" from=\"0\" to=\"-14\""));
        assert!(svg.contains("values=\"1;0.3;1\""));
        assert!(svg.contains("clip-path=\"url(#overlay-clip_svg-ov)\""));
        assert!(svg.contains("fill=\"url(#overlay-scan_svg-ov)\""));
    }

    #[test]
    fn done_overlay_freezes_fade() {
        let registry = ShapeRegistry::default();
        let svg = tree_to_svg(&registry.render(&overlay(Status::Done), None));
        assert!(svg.contains("<g opacity=\"0\">"));
        assert!(svg.contains("from=\"1\" to=\"0\" dur=\"600ms\" fill=\"freeze\""));
        assert!(!svg.contains("repeatCount"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn table_regions_and_escaping() {
        let registry = ShapeRegistry::default();
        let sheets = vec![Sheet::new(
            "S",
            vec!["a<b".into()],
            vec![vec!["\"x\" & y".into()]],
        )];
        let record = ShapeRecord::new(
            ShapeId::intern("svg-tbl"),
            0.0,
            0.0,
            ShapeProps::TabularData(TabularDataProps {
                sheets_json: encode_sheets(&sheets),
                ..Default::default()
            }),
        );
        let svg = tree_to_svg(&registry.render(&record, None));
        assert!(svg.contains("data-action=\"edit\""));
        assert!(svg.contains("data-action=\"cell:0:0\""));
        assert!(svg.contains("a&lt;b"));
        assert!(svg.contains("&quot;x&quot; &amp; y"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn document_is_sized_to_placed_shapes() {
        let registry = ShapeRegistry::default();
        let tree = registry.render(&overlay(Status::Working), None);
        let svg = render_svg(&[(Point::new(100.0, 50.0), &tree)]);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"432\" height=\"332\""));
        assert!(svg.contains("translate(-84, -34)"));
        assert!(svg.ends_with("</svg>"));
    }
}
