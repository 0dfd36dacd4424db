//! Status overlay: an animated, un-pickable marker over the area an agent
//! is working on.
//!
//! | status       | tint   | scan band | border ants | pill               |
//! |--------------|--------|-----------|-------------|--------------------|
//! | `working`    | violet | 3 s loop  | 8 s loop    | status text, pulse |
//! | `completing` | green  | none      | 8 s loop    | "✓ Done", static   |
//! | `done`       | green  | none      | none        | hidden, fade to 0  |
//!
//! The overlay exposes zero-area geometry at every size and status, so the
//! host never picks, selects, snaps to, or marquee-selects it.

use crate::geometry::{Geometry, Outline};
use crate::handler::{Capabilities, ShapeHandler};
use crate::tree::{Def, Fill, StrokeStyle, TextAlign, VisualNode, VisualTree};
use ac_core::config::OverlayTheme;
use ac_core::id::ShapeId;
use ac_core::model::{AnimKind, Animation, Color, ShapeType, Status, StatusOverlayProps, Transition};
use kurbo::{Point, Rect};

const PILL_INSET: f64 = 12.0;
const PILL_HEIGHT: f64 = 28.0;
const PILL_FONT: f32 = 12.0;
const DOT_RADIUS: f64 = 4.0;
/// Scan band height as a share of the overlay height.
const BAND_RATIO: f64 = 0.2;
const BAND_MIN: f64 = 24.0;

#[derive(Debug, Clone, Default)]
pub struct StatusOverlayHandler {
    theme: OverlayTheme,
}

impl StatusOverlayHandler {
    pub fn new(theme: OverlayTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &OverlayTheme {
        &self.theme
    }

    fn tint(&self, status: Status) -> Color {
        match status {
            Status::Working => self.theme.working_tint,
            Status::Completing | Status::Done => self.theme.completing_tint,
        }
    }

    fn label<'a>(&'a self, props: &'a StatusOverlayProps) -> &'a str {
        match props.status {
            Status::Working => &props.status_text,
            Status::Completing | Status::Done => &self.theme.done_label,
        }
    }

    fn scan_band(&self, props: &StatusOverlayProps, gradient: &str, clip: &str) -> VisualNode {
        let band = (props.height * BAND_RATIO).max(BAND_MIN);
        VisualNode::Group {
            opacity: 1.0,
            transition: None,
            clip: Some(clip.to_string()),
            children: vec![VisualNode::Rect {
                // Starts fully above the top edge and exits below the bottom.
                rect: Rect::new(0.0, -band, props.width, 0.0),
                radius: 0.0,
                fill: Fill::Gradient(gradient.to_string()),
                stroke: None,
                animation: Some(Animation::looping(
                    AnimKind::ScanSweep {
                        travel: props.height + band,
                    },
                    self.theme.scan_period_ms,
                )),
            }],
        }
    }

    fn pill(&self, props: &StatusOverlayProps, tint: Color) -> VisualNode {
        let label = self.label(props);
        let estimated = label.chars().count() as f64 * PILL_FONT as f64 * 0.6 + 40.0;
        let width = estimated.min((props.width - 2.0 * PILL_INSET).max(0.0));
        let top = PILL_INSET;
        let pulse = (props.status == Status::Working).then(|| {
            Animation::looping(
                AnimKind::Pulse { min_opacity: 0.3 },
                self.theme.pulse_period_ms,
            )
        });

        VisualNode::group(vec![
            VisualNode::Rect {
                rect: Rect::new(PILL_INSET, top, PILL_INSET + width, top + PILL_HEIGHT),
                radius: PILL_HEIGHT / 2.0,
                fill: Fill::Solid(self.theme.pill_background),
                stroke: None,
                animation: None,
            },
            VisualNode::Circle {
                center: Point::new(PILL_INSET + 14.0, top + PILL_HEIGHT / 2.0),
                radius: DOT_RADIUS,
                fill: tint,
                animation: pulse,
            },
            VisualNode::Text {
                origin: Point::new(PILL_INSET + 26.0, top + PILL_HEIGHT / 2.0 + 4.0),
                content: label.to_string(),
                size: PILL_FONT,
                bold: false,
                color: self.theme.pill_text,
                align: TextAlign::Start,
            },
        ])
    }
}

impl ShapeHandler for StatusOverlayHandler {
    type Props = StatusOverlayProps;
    type Local = ();

    fn shape_type(&self) -> ShapeType {
        ShapeType::StatusOverlay
    }

    fn default_props(&self) -> StatusOverlayProps {
        StatusOverlayProps::default()
    }

    fn geometry(&self, _props: &StatusOverlayProps) -> Geometry {
        Geometry::zero()
    }

    fn capabilities(&self, _props: &StatusOverlayProps) -> Capabilities {
        Capabilities::INERT
    }

    fn render(&self, id: ShapeId, props: &StatusOverlayProps, _local: &()) -> VisualTree {
        let tint = self.tint(props.status);
        let gradient_id = id.resource_key("overlay-scan");
        let clip_id = id.resource_key("overlay-clip");
        let bounds = Rect::new(0.0, 0.0, props.width.max(0.0), props.height.max(0.0));

        let defs = vec![
            Def::LinearGradient {
                id: gradient_id.clone(),
                stops: vec![
                    (0.0, tint.with_alpha(0.0)),
                    (0.5, tint.with_alpha(0.35)),
                    (1.0, tint.with_alpha(0.0)),
                ],
                vertical: true,
            },
            Def::ClipRect {
                id: clip_id.clone(),
                rect: bounds,
                radius: self.theme.corner_radius,
            },
        ];

        let ants = (props.status != Status::Done).then(|| {
            let [dash, gap] = self.theme.dash;
            Animation::looping(
                AnimKind::MarchingAnts {
                    dash_cycle: dash + gap,
                },
                self.theme.border_period_ms,
            )
        });

        let mut children = vec![VisualNode::Rect {
            rect: bounds,
            radius: self.theme.corner_radius,
            fill: Fill::Solid(tint.with_alpha(0.06)),
            stroke: Some(StrokeStyle {
                color: tint,
                width: 2.0,
                dash: Some(self.theme.dash),
            }),
            animation: ants,
        }];
        if props.status == Status::Working {
            children.push(self.scan_band(props, &gradient_id, &clip_id));
        }
        if props.status != Status::Done {
            children.push(self.pill(props, tint));
        }

        let (opacity, transition) = match props.status {
            Status::Done => (
                0.0,
                Some(Transition {
                    from: 1.0,
                    to: 0.0,
                    duration_ms: self.theme.fade_ms,
                }),
            ),
            Status::Working | Status::Completing => (1.0, None),
        };

        log::trace!("render overlay {id} status={}", props.status.as_str());
        VisualTree {
            id: id.resource_key("overlay"),
            defs,
            root: VisualNode::Group {
                opacity,
                transition,
                clip: None,
                children,
            },
        }
    }

    fn indicator(&self, _props: &StatusOverlayProps) -> Option<Outline> {
        None
    }
}
