use serde::{Deserialize, Serialize};

mod path;
mod style;

pub use jumpstitch_core::Point;
pub use path::{DesignPath, PathCommand, Polyline};
pub use style::Style;

/// Bézier circle approximation constant.
const KAPPA: f64 = 0.552_284_749_830_793_4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Path,
    Rectangle,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
}

impl ShapeType {
    /// SVG element name.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeType::Path => "path",
            ShapeType::Rectangle => "rect",
            ShapeType::Circle => "circle",
            ShapeType::Ellipse => "ellipse",
            ShapeType::Line => "line",
            ShapeType::Polyline => "polyline",
            ShapeType::Polygon => "polygon",
        }
    }
}

/// Geometry of a drawable leaf node, in the node's own coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Path {
        d: DesignPath,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Line {
        from: Point,
        to: Point,
    },
    Polyline {
        points: Vec<Point>,
        closed: bool,
    },
}

impl Shape {
    pub fn path(d: DesignPath) -> Self {
        Shape::Path { d }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Path { .. } => ShapeType::Path,
            Shape::Rect { .. } => ShapeType::Rectangle,
            Shape::Circle { .. } => ShapeType::Circle,
            Shape::Ellipse { .. } => ShapeType::Ellipse,
            Shape::Line { .. } => ShapeType::Line,
            Shape::Polyline { closed: false, .. } => ShapeType::Polyline,
            Shape::Polyline { closed: true, .. } => ShapeType::Polygon,
        }
    }

    /// Whether the geometry is stored as path data, which connectors can be merged into.
    pub fn is_path(&self) -> bool {
        matches!(self, Shape::Path { .. })
    }

    pub fn as_path(&self) -> Option<&DesignPath> {
        match self {
            Shape::Path { d } => Some(d),
            _ => None,
        }
    }

    /// Equivalent path geometry.
    pub fn to_path(&self) -> DesignPath {
        match self {
            Shape::Path { d } => d.clone(),
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                let mut cmds = DesignPath::from_points(&[
                    Point::new(*x, *y),
                    Point::new(x + width, *y),
                    Point::new(x + width, y + height),
                    Point::new(*x, y + height),
                ])
                .commands()
                .to_vec();
                cmds.push(PathCommand::Close);
                DesignPath::from_commands(cmds)
            }
            Shape::Circle { cx, cy, r } => ellipse_path(*cx, *cy, *r, *r),
            Shape::Ellipse { cx, cy, rx, ry } => ellipse_path(*cx, *cy, *rx, *ry),
            Shape::Line { from, to } => DesignPath::from_points(&[*from, *to]),
            Shape::Polyline { points, closed } => {
                let mut cmds = DesignPath::from_points(points).commands().to_vec();
                if *closed && !cmds.is_empty() {
                    cmds.push(PathCommand::Close);
                }
                DesignPath::from_commands(cmds)
            }
        }
    }
}

/// Four cubic quarter arcs, starting at the rightmost point and running clockwise in screen space.
fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> DesignPath {
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;
    let right = Point::new(cx + rx, cy);
    let bottom = Point::new(cx, cy + ry);
    let left = Point::new(cx - rx, cy);
    let top = Point::new(cx, cy - ry);
    DesignPath::from_commands(vec![
        PathCommand::MoveTo(right),
        PathCommand::CubicTo {
            ctrl1: Point::new(cx + rx, cy + ky),
            ctrl2: Point::new(cx + kx, cy + ry),
            to: bottom,
        },
        PathCommand::CubicTo {
            ctrl1: Point::new(cx - kx, cy + ry),
            ctrl2: Point::new(cx - rx, cy + ky),
            to: left,
        },
        PathCommand::CubicTo {
            ctrl1: Point::new(cx - rx, cy - ky),
            ctrl2: Point::new(cx - kx, cy - ry),
            to: top,
        },
        PathCommand::CubicTo {
            ctrl1: Point::new(cx + kx, cy - ry),
            ctrl2: Point::new(cx + rx, cy - ky),
            to: right,
        },
        PathCommand::Close,
    ])
}
