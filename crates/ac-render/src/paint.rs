//! Visual tree → Vello drawing commands.
//!
//! Animations are sampled at `elapsed_ms`, so the caller drives time by
//! repainting; nothing here holds a clock.

use crate::tree::{Def, Fill, StrokeStyle, VisualNode, VisualTree};
use ac_core::model::{AnimKind, Animation, Color};
use kurbo::{Affine, Circle, Point, Rect, RoundedRect, Shape, Stroke as KurboStroke};
use peniko::{Color as PenikoColor, Fill as FillRule, Mix};
use vello::Scene;

/// Paint one shape's tree at page position `origin`.
///
/// Call once per shape per frame into a freshly-cleared `Scene`.
/// The caller presents the scene.
pub fn paint_tree(scene: &mut Scene, tree: &VisualTree, origin: Point, elapsed_ms: f64) {
    let cx = PaintCx {
        tree,
        transform: Affine::translate(origin.to_vec2()),
        elapsed_ms,
    };
    paint_node(scene, &cx, &tree.root, 1.0);
}

struct PaintCx<'a> {
    tree: &'a VisualTree,
    transform: Affine,
    elapsed_ms: f64,
}

fn paint_node(scene: &mut Scene, cx: &PaintCx<'_>, node: &VisualNode, alpha: f32) {
    match node {
        VisualNode::Group {
            opacity,
            transition,
            clip,
            children,
        } => {
            let group_alpha = transition.map_or(*opacity, |t| t.value_at(cx.elapsed_ms));
            let alpha = alpha * group_alpha.clamp(0.0, 1.0);
            if alpha <= 0.0 {
                return;
            }
            let clip_shape = clip.as_deref().and_then(|id| match cx.tree.def(id) {
                Some(Def::ClipRect { rect, radius, .. }) => Some(rect.to_rounded_rect(*radius)),
                _ => {
                    log::warn!("clip `{id}` not found in {}", cx.tree.id);
                    None
                }
            });
            if let Some(shape) = &clip_shape {
                scene.push_layer(Mix::Clip, 1.0, cx.transform, shape);
            }
            for child in children {
                paint_node(scene, cx, child, alpha);
            }
            if clip_shape.is_some() {
                scene.pop_layer();
            }
        }

        VisualNode::Rect {
            rect,
            radius,
            fill,
            stroke,
            animation,
        } => {
            let mut transform = cx.transform;
            let mut dash_offset = 0.0;
            if let Some(anim) = animation {
                match anim.kind {
                    AnimKind::ScanSweep { travel } => {
                        let dy = anim.phase(cx.elapsed_ms) * travel;
                        transform = transform * Affine::translate((0.0, dy));
                    }
                    AnimKind::MarchingAnts { dash_cycle } => {
                        dash_offset = -anim.phase(cx.elapsed_ms) * dash_cycle;
                    }
                    AnimKind::Pulse { .. } => {}
                }
            }
            let alpha = alpha * pulse_alpha(animation.as_ref(), cx.elapsed_ms);
            let shape = rect.to_rounded_rect(*radius);
            paint_fill(scene, cx, transform, &shape, *rect, fill, alpha);
            if let Some(s) = stroke {
                paint_stroke(scene, transform, &shape, s, dash_offset, alpha);
            }
        }

        VisualNode::Circle {
            center,
            radius,
            fill,
            animation,
        } => {
            let alpha = alpha * pulse_alpha(animation.as_ref(), cx.elapsed_ms);
            let shape = Circle::new(*center, *radius);
            scene.fill(FillRule::NonZero, cx.transform, to_peniko(*fill, alpha), None, &shape);
        }

        VisualNode::Text {
            origin, content, ..
        } => {
            log::trace!("TEXT {:?} at ({}, {}) in {}", content, origin.x, origin.y, cx.tree.id);
            // Glyph shaping needs a font context owned by the host.
        }

        VisualNode::Region { children, .. } => {
            for child in children {
                paint_node(scene, cx, child, alpha);
            }
        }

        VisualNode::TextInput { rect, value } => {
            let shape = rect.to_rounded_rect(4.0);
            let field = Color::rgba(1.0, 1.0, 1.0, 1.0);
            let focus = Color::rgba(0.388, 0.400, 0.945, 1.0);
            scene.fill(FillRule::NonZero, cx.transform, to_peniko(field, alpha), None, &shape);
            scene.stroke(
                &KurboStroke::new(2.0),
                cx.transform,
                to_peniko(focus, alpha),
                None,
                &shape,
            );
            log::trace!("INPUT {:?} in {}", value, cx.tree.id);
        }
    }
}

// ─── Fill and stroke ─────────────────────────────────────────────────────────

fn paint_fill(
    scene: &mut Scene,
    cx: &PaintCx<'_>,
    transform: Affine,
    shape: &RoundedRect,
    bounds: Rect,
    fill: &Fill,
    alpha: f32,
) {
    let color = match fill {
        Fill::None => return,
        Fill::Solid(c) => *c,
        Fill::Gradient(id) => match cx.tree.def(id) {
            Some(Def::LinearGradient { stops, .. }) => peak_stop(stops),
            _ => {
                log::warn!("gradient `{id}` not found in {}", cx.tree.id);
                return;
            }
        },
    };
    if bounds.area() > 0.0 {
        scene.fill(FillRule::NonZero, transform, to_peniko(color, alpha), None, shape);
    }
}

fn paint_stroke<S: Shape>(
    scene: &mut Scene,
    transform: Affine,
    shape: &S,
    style: &StrokeStyle,
    dash_offset: f64,
    alpha: f32,
) {
    let mut stroke = KurboStroke::new(style.width);
    if let Some([dash, gap]) = style.dash {
        stroke = stroke.with_dashes(dash_offset, [dash, gap]);
    }
    scene.stroke(&stroke, transform, to_peniko(style.color, alpha), None, shape);
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Opacity multiplier of a pulse animation: 1 → min → 1 over one period.
fn pulse_alpha(animation: Option<&Animation>, elapsed_ms: f64) -> f32 {
    match animation {
        Some(anim) => match anim.kind {
            AnimKind::Pulse { min_opacity } => {
                let phase = anim.phase(elapsed_ms) as f32;
                let depth = 1.0 - (2.0 * phase - 1.0).abs();
                1.0 - (1.0 - min_opacity) * depth
            }
            _ => 1.0,
        },
        None => 1.0,
    }
}

/// Gradients are approximated by their most opaque stop.
fn peak_stop(stops: &[(f32, Color)]) -> Color {
    stops
        .iter()
        .map(|(_, c)| *c)
        .max_by(|a, b| a.a.total_cmp(&b.a))
        .unwrap_or(Color::TRANSPARENT)
}

fn to_peniko(c: Color, alpha: f32) -> PenikoColor {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    PenikoColor::from_rgba8(to_u8(c.r), to_u8(c.g), to_u8(c.b), to_u8(c.a * alpha))
}
