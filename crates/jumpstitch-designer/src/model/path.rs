use std::fmt;
use std::str::FromStr;

use jumpstitch_core::{PathDataError, Point, Transform};
use lyon::geom::{CubicBezierSegment, QuadraticBezierSegment};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

type LyonPoint = lyon::geom::Point<f64>;

/// One absolute path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

impl PathCommand {
    /// End point of the command; `None` for `Close`, whose end is the subpath start.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::QuadTo { to, .. } | PathCommand::CubicTo { to, .. } => Some(to),
            PathCommand::Close => None,
        }
    }

    fn map(&self, f: impl Fn(Point) -> Point) -> PathCommand {
        match *self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(f(p)),
            PathCommand::LineTo(p) => PathCommand::LineTo(f(p)),
            PathCommand::QuadTo { ctrl, to } => PathCommand::QuadTo {
                ctrl: f(ctrl),
                to: f(to),
            },
            PathCommand::CubicTo { ctrl1, ctrl2, to } => PathCommand::CubicTo {
                ctrl1: f(ctrl1),
                ctrl2: f(ctrl2),
                to: f(to),
            },
            PathCommand::Close => PathCommand::Close,
        }
    }
}

/// A flattened subpath.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Path geometry as a list of absolute commands.
///
/// Serialises as SVG path data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DesignPath {
    commands: Vec<PathCommand>,
}

impl DesignPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    /// Open polyline through `points`.
    pub fn from_points(points: &[Point]) -> Self {
        let commands = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == 0 {
                    PathCommand::MoveTo(*p)
                } else {
                    PathCommand::LineTo(*p)
                }
            })
            .collect();
        Self { commands }
    }

    pub fn from_svg_path(d: &str) -> Result<Self, PathDataError> {
        parse_path_data(d)
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn first_point(&self) -> Option<Point> {
        self.commands.first().and_then(PathCommand::end_point)
    }

    pub fn last_point(&self) -> Option<Point> {
        let mut subpath_start = None;
        let mut last = None;
        for cmd in &self.commands {
            match cmd {
                PathCommand::MoveTo(p) => {
                    subpath_start = Some(*p);
                    last = Some(*p);
                }
                PathCommand::Close => last = subpath_start,
                other => last = other.end_point(),
            }
        }
        last
    }

    /// Every command after the first one.
    pub fn tail(&self) -> &[PathCommand] {
        self.commands.get(1..).unwrap_or(&[])
    }

    /// `self` followed by `other` without its leading command.
    ///
    /// Joining paths that share an endpoint this way keeps the shared point once.
    pub fn joined(&self, other: &DesignPath) -> DesignPath {
        let mut commands = Vec::with_capacity(self.commands.len() + other.commands.len());
        commands.extend_from_slice(&self.commands);
        commands.extend_from_slice(other.tail());
        DesignPath { commands }
    }

    pub fn transform(&mut self, t: &Transform) {
        for cmd in self.commands.iter_mut() {
            *cmd = cmd.map(|p| t.apply(p));
        }
    }

    pub fn transformed(&self, t: &Transform) -> DesignPath {
        let mut path = self.clone();
        path.transform(t);
        path
    }

    /// Flattens curves into polylines, one per subpath.
    pub fn flatten(&self, tolerance: f64) -> Vec<Polyline> {
        let mut polylines = Vec::new();
        let mut current = Polyline::default();
        let mut cursor = Point::default();

        let to_lyon = |p: Point| LyonPoint::new(p.x, p.y);
        let from_lyon = |p: LyonPoint| Point::new(p.x, p.y);

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if !current.points.is_empty() {
                        polylines.push(std::mem::take(&mut current));
                    }
                    current.points.push(p);
                    cursor = p;
                }
                PathCommand::LineTo(p) => {
                    current.points.push(p);
                    cursor = p;
                }
                PathCommand::QuadTo { ctrl, to } => {
                    let segment = QuadraticBezierSegment {
                        from: to_lyon(cursor),
                        ctrl: to_lyon(ctrl),
                        to: to_lyon(to),
                    };
                    current
                        .points
                        .extend(segment.flattened(tolerance).map(from_lyon));
                    cursor = to;
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    let segment = CubicBezierSegment {
                        from: to_lyon(cursor),
                        ctrl1: to_lyon(ctrl1),
                        ctrl2: to_lyon(ctrl2),
                        to: to_lyon(to),
                    };
                    current
                        .points
                        .extend(segment.flattened(tolerance).map(from_lyon));
                    cursor = to;
                }
                PathCommand::Close => {
                    current.closed = true;
                    if let Some(&start) = current.points.first() {
                        cursor = start;
                    }
                    polylines.push(std::mem::take(&mut current));
                }
            }
        }
        if !current.points.is_empty() {
            polylines.push(current);
        }
        polylines
    }

    pub fn to_svg_path(&self) -> String {
        let mut parts = Vec::with_capacity(self.commands.len());
        for cmd in &self.commands {
            parts.push(match cmd {
                PathCommand::MoveTo(p) => format!("M {} {}", p.x, p.y),
                PathCommand::LineTo(p) => format!("L {} {}", p.x, p.y),
                PathCommand::QuadTo { ctrl, to } => {
                    format!("Q {} {} {} {}", ctrl.x, ctrl.y, to.x, to.y)
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => format!(
                    "C {} {} {} {} {} {}",
                    ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                ),
                PathCommand::Close => "Z".to_string(),
            });
        }
        parts.join(" ")
    }
}

impl fmt::Display for DesignPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg_path())
    }
}

impl FromStr for DesignPath {
    type Err = PathDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path_data(s)
    }
}

impl Serialize for DesignPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_svg_path())
    }
}

impl<'de> Deserialize<'de> for DesignPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let d = String::deserialize(deserializer)?;
        parse_path_data(&d).map_err(serde::de::Error::custom)
    }
}

/// Parses SVG path data into absolute commands.
///
/// Supports `m/l/h/v/c/s/q/t/a/z` and their uppercase forms. Smooth curves get
/// explicit control points and arcs become cubic Béziers.
fn parse_path_data(data: &str) -> Result<DesignPath, PathDataError> {
    let tokens = tokenize_svg_path(data);
    let mut parser = PathParser {
        tokens: &tokens,
        pos: 0,
        commands: Vec::new(),
        current: Point::default(),
        start: Point::default(),
        subpath_open: false,
        prev_cubic_ctrl: None,
        prev_quad_ctrl: None,
    };
    parser.run()?;
    Ok(DesignPath {
        commands: parser.commands,
    })
}

struct PathParser<'a> {
    tokens: &'a [String],
    pos: usize,
    commands: Vec<PathCommand>,
    current: Point,
    start: Point,
    subpath_open: bool,
    prev_cubic_ctrl: Option<Point>,
    prev_quad_ctrl: Option<Point>,
}

fn is_cmd_token(s: &str) -> bool {
    s.len() == 1 && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn reflect(p: Point, around: Point) -> Point {
    Point::new(2.0 * around.x - p.x, 2.0 * around.y - p.y)
}

impl<'a> PathParser<'a> {
    fn run(&mut self) -> Result<(), PathDataError> {
        if let Some(first) = self.tokens.first() {
            if !matches!(first.as_str(), "M" | "m") {
                return Err(PathDataError::MissingMoveTo);
            }
        }

        while self.pos < self.tokens.len() {
            let token = &self.tokens[self.pos];
            if !is_cmd_token(token) {
                return Err(self.error("expected a command"));
            }
            let cmd = token.chars().next().unwrap_or('Z');
            let relative = cmd.is_ascii_lowercase();
            self.pos += 1;

            match cmd.to_ascii_uppercase() {
                'M' => {
                    let mut first = true;
                    while self.has_args() {
                        let p = self.point(relative)?;
                        if first {
                            self.commands.push(PathCommand::MoveTo(p));
                            self.start = p;
                            self.subpath_open = true;
                            first = false;
                        } else {
                            self.line_to(p);
                        }
                        self.current = p;
                    }
                    self.clear_smooth();
                }
                'L' => {
                    while self.has_args() {
                        let p = self.point(relative)?;
                        self.line_to(p);
                    }
                    self.clear_smooth();
                }
                'H' => {
                    while self.has_args() {
                        let x = self.number()?;
                        let x = if relative { self.current.x + x } else { x };
                        self.line_to(Point::new(x, self.current.y));
                    }
                    self.clear_smooth();
                }
                'V' => {
                    while self.has_args() {
                        let y = self.number()?;
                        let y = if relative { self.current.y + y } else { y };
                        self.line_to(Point::new(self.current.x, y));
                    }
                    self.clear_smooth();
                }
                'C' => {
                    while self.has_args() {
                        let ctrl1 = self.point(relative)?;
                        let ctrl2 = self.point(relative)?;
                        let to = self.point(relative)?;
                        self.cubic_to(ctrl1, ctrl2, to);
                    }
                }
                'S' => {
                    while self.has_args() {
                        let ctrl1 = self
                            .prev_cubic_ctrl
                            .map(|prev| reflect(prev, self.current))
                            .unwrap_or(self.current);
                        let ctrl2 = self.point(relative)?;
                        let to = self.point(relative)?;
                        self.cubic_to(ctrl1, ctrl2, to);
                    }
                }
                'Q' => {
                    while self.has_args() {
                        let ctrl = self.point(relative)?;
                        let to = self.point(relative)?;
                        self.quad_to(ctrl, to);
                    }
                }
                'T' => {
                    while self.has_args() {
                        let ctrl = self
                            .prev_quad_ctrl
                            .map(|prev| reflect(prev, self.current))
                            .unwrap_or(self.current);
                        let to = self.point(relative)?;
                        self.quad_to(ctrl, to);
                    }
                }
                'A' => {
                    while self.has_args() {
                        let rx = self.number()?;
                        let ry = self.number()?;
                        let rotation = self.number()?;
                        let large_arc = self.number()? != 0.0;
                        let sweep = self.number()? != 0.0;
                        let to = self.point(relative)?;
                        self.ensure_subpath();
                        for (ctrl1, ctrl2, end) in
                            arc_to_cubics(self.current, to, rx, ry, rotation, large_arc, sweep)
                        {
                            self.commands
                                .push(PathCommand::CubicTo { ctrl1, ctrl2, to: end });
                        }
                        self.current = to;
                    }
                    self.clear_smooth();
                }
                'Z' => {
                    if self.subpath_open {
                        self.commands.push(PathCommand::Close);
                        self.subpath_open = false;
                    }
                    self.current = self.start;
                    self.clear_smooth();
                }
                _ => return Err(self.error("unsupported command")),
            }
        }
        Ok(())
    }

    fn error(&self, reason: &str) -> PathDataError {
        PathDataError::InvalidSyntax {
            position: self.pos,
            reason: reason.to_string(),
        }
    }

    fn has_args(&self) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| !is_cmd_token(t))
    }

    fn number(&mut self) -> Result<f64, PathDataError> {
        let token = self
            .tokens
            .get(self.pos)
            .filter(|t| !is_cmd_token(t))
            .ok_or_else(|| self.error("incomplete coordinates"))?;
        let value = token
            .parse::<f64>()
            .map_err(|_| self.error(&format!("invalid number '{}'", token)))?;
        self.pos += 1;
        Ok(value)
    }

    fn point(&mut self, relative: bool) -> Result<Point, PathDataError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(if relative {
            Point::new(self.current.x + x, self.current.y + y)
        } else {
            Point::new(x, y)
        })
    }

    /// Drawing after a closepath starts a new subpath at the closed subpath's start.
    fn ensure_subpath(&mut self) {
        if !self.subpath_open {
            self.commands.push(PathCommand::MoveTo(self.current));
            self.start = self.current;
            self.subpath_open = true;
        }
    }

    fn line_to(&mut self, p: Point) {
        self.ensure_subpath();
        self.commands.push(PathCommand::LineTo(p));
        self.current = p;
    }

    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.ensure_subpath();
        self.commands.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
        self.current = to;
        self.prev_cubic_ctrl = Some(ctrl2);
        self.prev_quad_ctrl = None;
    }

    fn quad_to(&mut self, ctrl: Point, to: Point) {
        self.ensure_subpath();
        self.commands.push(PathCommand::QuadTo { ctrl, to });
        self.current = to;
        self.prev_quad_ctrl = Some(ctrl);
        self.prev_cubic_ctrl = None;
    }

    fn clear_smooth(&mut self) {
        self.prev_cubic_ctrl = None;
        self.prev_quad_ctrl = None;
    }
}

fn angle_between(u: (f64, f64), v: (f64, f64)) -> f64 {
    let dot = u.0 * v.0 + u.1 * v.1;
    let det = u.0 * v.1 - u.1 * v.0;
    det.atan2(dot)
}

/// Endpoint-parameterised elliptical arc to cubic Béziers of at most 90° each.
fn arc_to_cubics(
    from: Point,
    to: Point,
    rx: f64,
    ry: f64,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
) -> Vec<(Point, Point, Point)> {
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx < f64::EPSILON || ry < f64::EPSILON || from == to {
        return vec![(from, to, to)];
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Scale radii up when they cannot span the endpoints.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let denom = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let numer = (rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p).max(0.0);
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = sign * (numer / denom).sqrt();
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

    let u = ((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = ((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let mut theta = angle_between((1.0, 0.0), u);
    let mut delta = angle_between(u, v);
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    let segments = ((delta.abs() / std::f64::consts::FRAC_PI_2).ceil() as usize).max(1);
    let step = delta / segments as f64;
    let on_ellipse = |ux: f64, uy: f64| {
        Point::new(
            cx + cos_phi * (rx * ux) - sin_phi * (ry * uy),
            cy + sin_phi * (rx * ux) + cos_phi * (ry * uy),
        )
    };

    let mut cubics = Vec::with_capacity(segments);
    for i in 0..segments {
        let t0 = theta;
        let t1 = theta + step;
        let k = 4.0 / 3.0 * ((t1 - t0) / 4.0).tan();
        let (s0, c0) = t0.sin_cos();
        let (s1, c1) = t1.sin_cos();
        let ctrl1 = on_ellipse(c0 - k * s0, s0 + k * c0);
        let ctrl2 = on_ellipse(c1 + k * s1, s1 - k * c1);
        // Land exactly on the requested endpoint.
        let end = if i + 1 == segments { to } else { on_ellipse(c1, s1) };
        cubics.push((ctrl1, ctrl2, end));
        theta = t1;
    }
    cubics
}

/// Tokenize SVG path data into commands and numeric strings.
///
/// This handles commas/whitespace and also splits on `+`/`-` when they begin a
/// new number (e.g. `10-5` -> `10`, `-5`), while preserving scientific notation.
fn tokenize_svg_path(path_data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current_token = String::new();

    for ch in path_data.chars() {
        match ch {
            'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q' | 'q'
            | 'T' | 't' | 'A' | 'a' | 'Z' | 'z' => {
                if !current_token.is_empty() {
                    tokens.push(std::mem::take(&mut current_token));
                }
                tokens.push(ch.to_string());
            }
            ' ' | ',' | '\n' | '\r' | '\t' => {
                if !current_token.is_empty() {
                    tokens.push(std::mem::take(&mut current_token));
                }
            }
            '-' | '+' => {
                if current_token.is_empty() || matches!(current_token.chars().last(), Some('e' | 'E')) {
                    current_token.push(ch);
                } else {
                    tokens.push(std::mem::take(&mut current_token));
                    current_token.push(ch);
                }
            }
            _ => current_token.push(ch),
        }
    }

    if !current_token.is_empty() {
        tokens.push(current_token);
    }

    tokens
}
