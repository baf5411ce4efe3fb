//! Break-or-connect decisions over an ordered run of elements.
//!
//! The walk is a fold: [`advance`] takes the context left by the previous
//! element plus the current element and returns the next context together
//! with the decision for the pair. [`Classify`] drives that fold lazily,
//! converting each element to stitches only when it is reached.

use std::fmt;
use std::iter::FusedIterator;

use jumpstitch_core::{JumpError, Point, Result};
use jumpstitch_settings::{ConnectMode, JumpOptions};
use tracing::debug;

use crate::document::NodeId;
use crate::element::Element;
use crate::stitch_plan::{StitchGroup, StitchPlanner};

/// A candidate connector between two adjacent elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorRequest<'a> {
    /// Last stitch of the predecessor.
    pub start: Point,
    /// First stitch of the successor.
    pub end: Point,
    pub predecessor: &'a Element,
    pub successor: &'a Element,
}

impl ConnectorRequest<'_> {
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakReason {
    First,
    ColorChange,
    LayerChange,
    GroupChange,
    Trim,
    Stop,
    ForcedLock,
}

impl fmt::Display for BreakReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BreakReason::First => "first element",
            BreakReason::ColorChange => "color change",
            BreakReason::LayerChange => "layer change",
            BreakReason::GroupChange => "group change",
            BreakReason::Trim => "trim",
            BreakReason::Stop => "stop",
            BreakReason::ForcedLock => "forced lock stitches",
        };
        f.write_str(s)
    }
}

/// What the walk decided for one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<'a> {
    Break { node: NodeId, reason: BreakReason },
    Connect(ConnectorRequest<'a>),
}

/// Rolling state carried from one element to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpContext<'a> {
    pub element: &'a Element,
    pub group: Option<NodeId>,
    pub layer: Option<NodeId>,
    pub stitch_group: StitchGroup,
}

/// Why no connector may precede `element`, if any.
pub fn break_reason(
    last: Option<&JumpContext<'_>>,
    element: &Element,
    group: Option<NodeId>,
    layer: Option<NodeId>,
    options: &JumpOptions,
) -> Option<BreakReason> {
    let Some(last) = last else {
        return Some(BreakReason::First);
    };
    let previous = last.element;

    if element.color != previous.color {
        Some(BreakReason::ColorChange)
    } else if options.connect == ConnectMode::Layer && layer != last.layer {
        Some(BreakReason::LayerChange)
    } else if options.connect == ConnectMode::Group && group != last.group {
        Some(BreakReason::GroupChange)
    } else if options.exclude_trim && previous.trims_after() {
        Some(BreakReason::Trim)
    } else if options.exclude_stop && previous.stops_after() {
        Some(BreakReason::Stop)
    } else if options.exclude_forced_lock && previous.force_lock_stitches {
        Some(BreakReason::ForcedLock)
    } else {
        None
    }
}

/// One step of the walk.
///
/// `stitch_group` is the last group `element` converts to.
pub fn advance<'a>(
    last: Option<JumpContext<'a>>,
    element: &'a Element,
    stitch_group: StitchGroup,
    options: &JumpOptions,
) -> Result<(JumpContext<'a>, Step<'a>)> {
    let group = element.nearest_group();
    let layer = element.nearest_layer();

    let step = match break_reason(last.as_ref(), element, group, layer, options) {
        Some(reason) => Step::Break {
            node: element.node,
            reason,
        },
        None => {
            let start = last
                .as_ref()
                .and_then(|c| c.stitch_group.last_stitch())
                .ok_or(JumpError::EmptyStitchPlan {
                    node: last.as_ref().map_or(element.node.0, |c| c.element.node.0),
                })?;
            let end = stitch_group
                .first_stitch()
                .ok_or(JumpError::EmptyStitchPlan {
                    node: element.node.0,
                })?;
            Step::Connect(ConnectorRequest {
                start,
                end,
                predecessor: last.map_or(element, |c| c.element),
                successor: element,
            })
        }
    };

    let context = JumpContext {
        element,
        group,
        layer,
        stitch_group,
    };
    Ok((context, step))
}

/// Lazy walk over elements yielding a [`Step`] per element.
///
/// Stops after the first error.
pub struct Classify<'a, 'p, P: StitchPlanner + ?Sized> {
    elements: std::slice::Iter<'a, Element>,
    planner: &'p P,
    options: &'p JumpOptions,
    context: Option<JumpContext<'a>>,
    failed: bool,
}

impl<'a, 'p, P: StitchPlanner + ?Sized> Classify<'a, 'p, P> {
    pub fn new(elements: &'a [Element], planner: &'p P, options: &'p JumpOptions) -> Self {
        Self {
            elements: elements.iter(),
            planner,
            options,
            context: None,
            failed: false,
        }
    }

    /// Only the connector requests, dropping breaks.
    pub fn requests(self) -> impl Iterator<Item = Result<ConnectorRequest<'a>>> + use<'a, 'p, P> {
        self.filter_map(|step| match step {
            Ok(Step::Connect(request)) => Some(Ok(request)),
            Ok(Step::Break { .. }) => None,
            Err(e) => Some(Err(e)),
        })
    }

    fn step(&mut self, element: &'a Element) -> Result<Step<'a>> {
        let previous = self.context.as_ref().map(|c| &c.stitch_group);
        let stitch_group = self
            .planner
            .to_stitch_groups(element, previous)?
            .pop()
            .filter(|g| !g.is_empty())
            .ok_or(JumpError::EmptyStitchPlan {
                node: element.node.0,
            })?;

        let (context, step) = advance(self.context.take(), element, stitch_group, self.options)?;
        self.context = Some(context);

        match &step {
            Step::Break { node, reason } => debug!(%node, %reason, "jump kept"),
            Step::Connect(request) => debug!(
                from = %request.predecessor.node,
                to = %request.successor.node,
                length = request.length(),
                "connector candidate"
            ),
        }
        Ok(step)
    }
}

impl<'a, P: StitchPlanner + ?Sized> Iterator for Classify<'a, '_, P> {
    type Item = Result<Step<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let element = self.elements.next()?;
        let step = self.step(element);
        self.failed = step.is_err();
        Some(step)
    }
}

impl<P: StitchPlanner + ?Sized> FusedIterator for Classify<'_, '_, P> {}

/// Connector requests for adjacent elements of `elements`, in order.
pub fn classify<'a, 'p, P: StitchPlanner + ?Sized>(
    elements: &'a [Element],
    planner: &'p P,
    options: &'p JumpOptions,
) -> impl Iterator<Item = Result<ConnectorRequest<'a>>> + use<'a, 'p, P> {
    Classify::new(elements, planner, options).requests()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Container, ElementKind};
    use smallvec::SmallVec;

    /// Planner returning a fixed two-stitch group per element, keyed by node id.
    struct FixedPlanner;

    impl StitchPlanner for FixedPlanner {
        fn to_stitch_groups(
            &self,
            element: &Element,
            _previous: Option<&StitchGroup>,
        ) -> Result<Vec<StitchGroup>> {
            let x = element.node.0 as f64 * 100.0;
            Ok(vec![StitchGroup::new(
                element.color.clone(),
                vec![Point::new(x, 0.0), Point::new(x + 50.0, 0.0)],
            )])
        }
    }

    fn element(id: u64, color: &str) -> Element {
        Element {
            node: NodeId(id),
            color: color.to_string(),
            kind: ElementKind::Stroke,
            path_shaped: true,
            ancestry: SmallVec::new(),
            trim_after: false,
            stop_after: false,
            force_lock_stitches: false,
            commands: Vec::new(),
            running_stitch_length_mm: None,
            running_stitch_tolerance_mm: None,
            paths: Vec::new(),
        }
    }

    fn in_containers(mut el: Element, containers: &[(u64, bool)]) -> Element {
        el.ancestry = containers
            .iter()
            .map(|&(id, is_layer)| Container {
                id: NodeId(id),
                is_layer,
            })
            .collect();
        el
    }

    fn collect<'a>(elements: &'a [Element], options: &JumpOptions) -> Vec<Step<'a>> {
        Classify::new(elements, &FixedPlanner, options)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_first_element_is_a_break() {
        let elements = [element(1, "red")];
        let steps = collect(&elements, &JumpOptions::default());
        assert_eq!(
            steps,
            vec![Step::Break {
                node: NodeId(1),
                reason: BreakReason::First
            }]
        );
    }

    #[test]
    fn test_adjacent_pairs_only() {
        let elements = [element(1, "red"), element(2, "red"), element(3, "red")];
        let options = JumpOptions::default();
        let requests: Vec<_> = classify(&elements, &FixedPlanner, &options)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].predecessor.node, NodeId(1));
        assert_eq!(requests[0].successor.node, NodeId(2));
        assert_eq!(requests[0].start, Point::new(150.0, 0.0));
        assert_eq!(requests[0].end, Point::new(200.0, 0.0));
        assert_eq!(requests[1].predecessor.node, NodeId(2));
    }

    #[test]
    fn test_color_change_breaks() {
        let elements = [element(1, "red"), element(2, "blue"), element(3, "blue")];
        let steps = collect(&elements, &JumpOptions::default());
        assert!(matches!(
            steps[1],
            Step::Break {
                reason: BreakReason::ColorChange,
                ..
            }
        ));
        assert!(matches!(steps[2], Step::Connect(_)));
    }

    #[test]
    fn test_commands_and_flags_break_only_when_excluded() {
        let mut trimmed = element(1, "red");
        trimmed.commands.push("trim".to_string());
        let mut stopped = element(2, "red");
        stopped.stop_after = true;
        let mut locked = element(3, "red");
        locked.force_lock_stitches = true;
        let elements = [trimmed, stopped, locked, element(4, "red")];

        let steps = collect(&elements, &JumpOptions::default());
        let reasons: Vec<_> = steps
            .iter()
            .map(|s| match s {
                Step::Break { reason, .. } => Some(*reason),
                Step::Connect(_) => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                Some(BreakReason::First),
                Some(BreakReason::Trim),
                Some(BreakReason::Stop),
                Some(BreakReason::ForcedLock)
            ]
        );

        let options = JumpOptions {
            exclude_trim: false,
            exclude_stop: false,
            exclude_forced_lock: false,
            ..JumpOptions::default()
        };
        let steps = collect(&elements, &options);
        assert_eq!(
            steps.iter().filter(|s| matches!(s, Step::Connect(_))).count(),
            3
        );
    }

    #[test]
    fn test_connect_modes() {
        // Two layers, the first holding two groups.
        let elements = [
            in_containers(element(1, "red"), &[(10, false), (100, true)]),
            in_containers(element(2, "red"), &[(11, false), (100, true)]),
            in_containers(element(3, "red"), &[(101, true)]),
        ];
        let count = |connect| {
            let options = JumpOptions {
                connect,
                ..JumpOptions::default()
            };
            collect(&elements, &options)
                .iter()
                .filter(|s| matches!(s, Step::Connect(_)))
                .count()
        };
        assert_eq!(count(ConnectMode::All), 2);
        assert_eq!(count(ConnectMode::Layer), 1);
        assert_eq!(count(ConnectMode::Group), 0);
    }

    #[test]
    fn test_empty_stitch_plan_stops_the_walk() {
        struct EmptyPlanner;
        impl StitchPlanner for EmptyPlanner {
            fn to_stitch_groups(&self, _: &Element, _: Option<&StitchGroup>) -> Result<Vec<StitchGroup>> {
                Ok(Vec::new())
            }
        }

        let elements = [element(1, "red"), element(2, "red")];
        let options = JumpOptions::default();
        let mut walk = Classify::new(&elements, &EmptyPlanner, &options);
        let err = walk.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            jumpstitch_core::Error::Jump(JumpError::EmptyStitchPlan { node: 1 })
        ));
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_advance_is_pure() {
        let a = element(1, "red");
        let b = element(2, "red");
        let options = JumpOptions::default();
        let group = |x: f64| StitchGroup::new("red", vec![Point::new(x, 0.0), Point::new(x + 1.0, 0.0)]);

        let (ctx, _) = advance(None, &a, group(0.0), &options).unwrap();
        let first = advance(Some(ctx.clone()), &b, group(10.0), &options).unwrap();
        let second = advance(Some(ctx), &b, group(10.0), &options).unwrap();
        assert_eq!(first, second);
    }
}
