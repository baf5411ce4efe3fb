//! Stitch plan generation.
//!
//! Converts an [`Element`] into needle positions. The jump classifier only
//! looks at the first and last stitch of the last group an element
//! produces, so the built-in planner is a plain running stitch.

use jumpstitch_core::{mm_to_px, Point, Result};
use jumpstitch_settings::StitchPlanSettings;
use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind};
use crate::model::Polyline;

/// A needle position in document space.
pub type Stitch = Point;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StitchGroup {
    pub color: String,
    pub stitches: Vec<Stitch>,
    pub trim_after: bool,
    pub stop_after: bool,
}

impl StitchGroup {
    pub fn new(color: impl Into<String>, stitches: Vec<Stitch>) -> Self {
        Self {
            color: color.into(),
            stitches,
            trim_after: false,
            stop_after: false,
        }
    }

    pub fn first_stitch(&self) -> Option<Stitch> {
        self.stitches.first().copied()
    }

    pub fn last_stitch(&self) -> Option<Stitch> {
        self.stitches.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.stitches.is_empty()
    }
}

/// Converts elements into stitch groups.
pub trait StitchPlanner {
    /// Stitch groups for `element`, in sewing order.
    ///
    /// `previous` is the last group sewn before this element, if any.
    fn to_stitch_groups(
        &self,
        element: &Element,
        previous: Option<&StitchGroup>,
    ) -> Result<Vec<StitchGroup>>;
}

/// Running stitch along every subpath of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStitchPlanner {
    pub default_stitch_length_mm: f64,
    pub pixels_per_mm: f64,
}

impl RunningStitchPlanner {
    pub fn new(settings: &StitchPlanSettings, pixels_per_mm: f64) -> Self {
        Self {
            default_stitch_length_mm: settings.running_stitch_length_mm,
            pixels_per_mm,
        }
    }

    fn stitch_length_px(&self, element: &Element) -> f64 {
        let mm = element
            .running_stitch_length_mm
            .filter(|l| *l > 0.0)
            .unwrap_or(self.default_stitch_length_mm);
        mm_to_px(mm, self.pixels_per_mm)
    }
}

impl StitchPlanner for RunningStitchPlanner {
    fn to_stitch_groups(
        &self,
        element: &Element,
        previous: Option<&StitchGroup>,
    ) -> Result<Vec<StitchGroup>> {
        let max_len = self.stitch_length_px(element);
        let mut groups: Vec<StitchGroup> = Vec::with_capacity(element.paths.len());

        for polyline in &element.paths {
            let mut points = loop_points(polyline);
            if points.is_empty() {
                continue;
            }
            if polyline.closed && element.kind != ElementKind::Stroke {
                let context = groups
                    .last()
                    .or(previous)
                    .and_then(StitchGroup::last_stitch);
                if let Some(target) = context {
                    rotate_to_nearest(&mut points, target);
                }
            }
            if polyline.closed {
                points.push(points[0]);
            }
            groups.push(StitchGroup::new(
                element.color.clone(),
                running_stitch(&points, max_len),
            ));
        }

        if let Some(last) = groups.last_mut() {
            last.trim_after = element.trims_after();
            last.stop_after = element.stops_after();
        }
        Ok(groups)
    }
}

/// Vertices of a polyline; for closed loops the repeated end vertex is dropped.
fn loop_points(polyline: &Polyline) -> Vec<Point> {
    let mut points = polyline.points.clone();
    if polyline.closed && points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn rotate_to_nearest(points: &mut [Point], target: Point) {
    let nearest = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_to(&target).total_cmp(&b.distance_to(&target)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    points.rotate_left(nearest);
}

/// Stitches at every vertex, splitting segments longer than `max_len` evenly.
pub fn running_stitch(points: &[Point], max_len: f64) -> Vec<Stitch> {
    let mut stitches = Vec::with_capacity(points.len());
    let Some(&first) = points.first() else {
        return stitches;
    };
    stitches.push(first);

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance_to(&b);
        if len <= f64::EPSILON {
            continue;
        }
        let steps = if max_len > 0.0 {
            (len / max_len).ceil().max(1.0) as usize
        } else {
            1
        };
        for k in 1..=steps {
            stitches.push(a.lerp(&b, k as f64 / steps as f64));
        }
    }
    stitches
}
