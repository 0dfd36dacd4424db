//! Declarative render output shared by every back end.
//!
//! A `VisualTree` is a pure value: shapes build one from their props and
//! local state, and the SVG exporter or the Vello painter interprets it.
//! Coordinates are local to the shape (origin at its top-left corner).
//! Animations are declared with a period; back ends sample or emit them,
//! shapes never drive timers.

use ac_core::model::{Animation, Color, Transition};
use kurbo::{Point, Rect};

/// How a rectangle is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    None,
    Solid(Color),
    /// Reference to a gradient in `VisualTree::defs`.
    Gradient(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    /// `[dash, gap]`; `None` draws a solid line.
    pub dash: Option<[f64; 2]>,
}

/// Render-scoped resources referenced by id from nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Def {
    LinearGradient {
        id: String,
        stops: Vec<(f32, Color)>,
        /// Top-to-bottom when true, left-to-right otherwise.
        vertical: bool,
    },
    ClipRect {
        id: String,
        rect: Rect,
        radius: f64,
    },
}

impl Def {
    pub fn id(&self) -> &str {
        match self {
            Def::LinearGradient { id, .. } | Def::ClipRect { id, .. } => id,
        }
    }
}

/// What an interactive region does when the user activates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    Edit,
    Save,
    Cancel,
    SelectTab(usize),
    Cell { row: usize, col: usize },
}

impl UiAction {
    /// Compact token, e.g. `cell:2:0` or `tab:1`.
    pub fn token(&self) -> String {
        match self {
            UiAction::Edit => "edit".into(),
            UiAction::Save => "save".into(),
            UiAction::Cancel => "cancel".into(),
            UiAction::SelectTab(i) => format!("tab:{i}"),
            UiAction::Cell { row, col } => format!("cell:{row}:{col}"),
        }
    }

    /// Inverse of [`UiAction::token`].
    pub fn from_token(token: &str) -> Option<Self> {
        let mut parts = token.split(':');
        let action = match parts.next()? {
            "edit" => UiAction::Edit,
            "save" => UiAction::Save,
            "cancel" => UiAction::Cancel,
            "tab" => UiAction::SelectTab(parts.next()?.parse().ok()?),
            "cell" => UiAction::Cell {
                row: parts.next()?.parse().ok()?,
                col: parts.next()?.parse().ok()?,
            },
            _ => return None,
        };
        parts.next().is_none().then_some(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualNode {
    Group {
        /// Resting opacity.
        opacity: f32,
        /// Animated approach to `opacity`, if any.
        transition: Option<Transition>,
        /// Id of a `Def::ClipRect`.
        clip: Option<String>,
        children: Vec<VisualNode>,
    },
    Rect {
        rect: Rect,
        radius: f64,
        fill: Fill,
        stroke: Option<StrokeStyle>,
        animation: Option<Animation>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
        animation: Option<Animation>,
    },
    Text {
        /// Baseline anchor.
        origin: Point,
        content: String,
        size: f32,
        bold: bool,
        color: Color,
        align: TextAlign,
    },
    /// Pointer-interactive area. Hosts map clicks inside `rect` to `action`.
    Region {
        rect: Rect,
        action: UiAction,
        children: Vec<VisualNode>,
    },
    /// Inline text field for the cell being edited.
    TextInput { rect: Rect, value: String },
}

impl VisualNode {
    pub fn group(children: Vec<VisualNode>) -> Self {
        VisualNode::Group {
            opacity: 1.0,
            transition: None,
            clip: None,
            children,
        }
    }

    pub fn text(origin: Point, content: impl Into<String>, size: f32, color: Color) -> Self {
        VisualNode::Text {
            origin,
            content: content.into(),
            size,
            bold: false,
            color,
            align: TextAlign::Start,
        }
    }

    pub fn children(&self) -> &[VisualNode] {
        match self {
            VisualNode::Group { children, .. } | VisualNode::Region { children, .. } => children,
            _ => &[],
        }
    }

    pub fn animation(&self) -> Option<&Animation> {
        match self {
            VisualNode::Rect { animation, .. } | VisualNode::Circle { animation, .. } => {
                animation.as_ref()
            }
            _ => None,
        }
    }
}

/// The complete render output of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    /// Render-scoped unique id, derived from the shape id.
    pub id: String,
    pub defs: Vec<Def>,
    pub root: VisualNode,
}

impl VisualTree {
    /// Depth-first, paint-order visit of every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a VisualNode)) {
        fn go<'a>(node: &'a VisualNode, visit: &mut impl FnMut(&'a VisualNode)) {
            visit(node);
            for child in node.children() {
                go(child, visit);
            }
        }
        go(&self.root, visit);
    }

    /// Every animation declared anywhere in the tree.
    pub fn animations(&self) -> Vec<Animation> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let Some(a) = node.animation() {
                out.push(*a);
            }
        });
        out
    }

    /// All text content, in paint order. Inline inputs report their value.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |node| match node {
            VisualNode::Text { content, .. } => out.push(content.as_str()),
            VisualNode::TextInput { value, .. } => out.push(value.as_str()),
            _ => {}
        });
        out
    }

    /// Opacity of the whole tree `elapsed_ms` after this render was mounted.
    pub fn opacity_at(&self, elapsed_ms: f64) -> f32 {
        match &self.root {
            VisualNode::Group {
                opacity,
                transition,
                ..
            } => transition.map_or(*opacity, |t| t.value_at(elapsed_ms)),
            _ => 1.0,
        }
    }

    pub fn def(&self, id: &str) -> Option<&Def> {
        self.defs.iter().find(|d| d.id() == id)
    }

    /// Topmost interactive region containing the local point. Regions
    /// under a clip only match inside the clip rect.
    pub fn action_at(&self, x: f64, y: f64) -> Option<UiAction> {
        fn go(tree: &VisualTree, node: &VisualNode, p: Point, hit: &mut Option<UiAction>) {
            match node {
                VisualNode::Group {
                    clip: Some(id), ..
                } => {
                    if let Some(Def::ClipRect { rect, .. }) = tree.def(id)
                        && !rect.contains(p)
                    {
                        return;
                    }
                }
                VisualNode::Region { rect, action, .. } if rect.contains(p) => {
                    *hit = Some(*action);
                }
                _ => {}
            }
            for child in node.children() {
                go(tree, child, p, hit);
            }
        }
        // Later regions paint over earlier ones, so the last match wins.
        let mut hit = None;
        go(self, &self.root, Point::new(x, y), &mut hit);
        hit
    }

    /// Every region's action, in paint order.
    pub fn actions(&self) -> Vec<UiAction> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let VisualNode::Region { action, .. } = node {
                out.push(*action);
            }
        });
        out
    }
}
