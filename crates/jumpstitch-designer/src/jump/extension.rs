//! The jump-to-stroke operation over a document selection.

use jumpstitch_core::{Error, JumpError, Result};
use jumpstitch_settings::{Config, JumpOptions};
use serde::Serialize;
use tracing::info;

use crate::document::{Document, NodeId};
use crate::element::Element;
use crate::host::HostDocument;
use crate::jump::classifier::{Classify, Step};
use crate::jump::connector::{ConnectorOutcome, ConnectorSynthesizer, Mutation, SkipReason};
use crate::selection_manager::SelectionManager;
use crate::stitch_plan::StitchPlanner;

/// Counts of what one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JumpReport {
    pub elements: usize,
    pub breaks: usize,
    pub inserted: usize,
    pub merged: usize,
    pub skipped_short: usize,
    pub skipped_long: usize,
    pub removed_containers: usize,
    /// Ids of inserted connector paths, in insertion order.
    pub inserted_nodes: Vec<NodeId>,
}

impl JumpReport {
    /// Whether the document was modified.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.merged > 0
    }

    fn record(&mut self, outcome: ConnectorOutcome) {
        match outcome {
            ConnectorOutcome::Skipped {
                reason: SkipReason::TooShort,
                ..
            } => self.skipped_short += 1,
            ConnectorOutcome::Skipped {
                reason: SkipReason::TooLong,
                ..
            } => self.skipped_long += 1,
            ConnectorOutcome::Applied(Mutation::Inserted { node }) => {
                self.inserted += 1;
                self.inserted_nodes.push(node);
            }
            ConnectorOutcome::Applied(Mutation::MergedBoth { removed_container }) => {
                self.merged += 1;
                self.removed_containers += usize::from(removed_container.is_some());
            }
            ConnectorOutcome::Applied(_) => self.merged += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpToStroke {
    options: JumpOptions,
    flatten_tolerance: f64,
}

impl JumpToStroke {
    pub fn new(options: JumpOptions) -> Self {
        Self {
            options,
            flatten_tolerance: 0.1,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jump.clone()).with_flatten_tolerance(config.stitch_plan.flatten_tolerance)
    }

    pub fn with_flatten_tolerance(mut self, tolerance: f64) -> Self {
        self.flatten_tolerance = tolerance;
        self
    }

    pub fn options(&self) -> &JumpOptions {
        &self.options
    }

    /// Converts jumps between the selected elements of `doc`.
    ///
    /// Fails before touching the document when fewer than two elements are
    /// selected or the options are out of range.
    pub fn run<P: StitchPlanner + ?Sized>(
        &self,
        doc: &mut Document,
        selection: &SelectionManager,
        planner: &P,
    ) -> Result<JumpReport> {
        let elements = selection.elements(doc, self.flatten_tolerance)?;
        self.run_on_elements(doc, &elements, planner)
    }

    /// Same as [`run`](Self::run) for already collected element snapshots.
    pub fn run_on_elements<D, P>(
        &self,
        doc: &mut D,
        elements: &[Element],
        planner: &P,
    ) -> Result<JumpReport>
    where
        D: HostDocument + ?Sized,
        P: StitchPlanner + ?Sized,
    {
        if elements.len() < 2 {
            return Err(JumpError::InsufficientSelection {
                count: elements.len(),
            }
            .into());
        }
        self.options
            .validate()
            .map_err(|e| Error::InvalidOptions(Box::new(e)))?;

        let synthesizer = ConnectorSynthesizer::new(&self.options);
        let mut report = JumpReport {
            elements: elements.len(),
            ..JumpReport::default()
        };

        for step in Classify::new(elements, planner, &self.options) {
            match step? {
                Step::Break { .. } => report.breaks += 1,
                Step::Connect(request) => {
                    let outcome = synthesizer.synthesize(doc, &request)?;
                    report.record(outcome);
                }
            }
        }

        info!(
            elements = report.elements,
            inserted = report.inserted,
            merged = report.merged,
            skipped_short = report.skipped_short,
            skipped_long = report.skipped_long,
            breaks = report.breaks,
            "jump to stroke finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NewNode;
    use crate::model::{DesignPath, Point};
    use crate::stitch_plan::RunningStitchPlanner;
    use jumpstitch_core::{mm_to_px, PIXELS_PER_MM};
    use jumpstitch_settings::{SettingsError, StitchPlanSettings};

    fn planner() -> RunningStitchPlanner {
        RunningStitchPlanner::new(&StitchPlanSettings::default(), PIXELS_PER_MM)
    }

    #[test]
    fn test_single_element_is_rejected_without_mutation() {
        let mut doc = Document::new();
        let a = doc
            .append(
                doc.root(),
                NewNode::path(DesignPath::from_points(&[
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                ]))
                .style("stroke:red"),
            )
            .unwrap();
        let before = doc.clone();

        let err = JumpToStroke::new(JumpOptions::default())
            .run(&mut doc, &SelectionManager::from_ids([a]), &planner())
            .unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(
            err.to_string(),
            "Please select at least two elements to convert the jump stitch to a running stitch."
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let mut doc = Document::new();
        let node = || {
            NewNode::path(DesignPath::from_points(&[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
            ]))
            .style("stroke:red")
        };
        let a = doc.append(doc.root(), node()).unwrap();
        let b = doc.append(doc.root(), node()).unwrap();

        let options = JumpOptions {
            min_jump_length_mm: -1.0,
            ..JumpOptions::default()
        };
        let before = doc.clone();
        let err = JumpToStroke::new(options)
            .run(&mut doc, &SelectionManager::from_ids([a, b]), &planner())
            .unwrap_err();
        let Error::InvalidOptions(source) = &err else {
            panic!("expected invalid options, got {:?}", err);
        };
        assert!(source.downcast_ref::<SettingsError>().is_some());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_negative_max_jump_is_unbounded() {
        let mut doc = Document::new();
        let gap = mm_to_px(10.0, PIXELS_PER_MM);
        let line = |x: f64| {
            NewNode::path(DesignPath::from_points(&[
                Point::new(x, 0.0),
                Point::new(x + 20.0, 0.0),
            ]))
            .style("stroke:#ff0000;fill:none")
        };
        let a = doc.append(doc.root(), line(0.0)).unwrap();
        let b = doc.append(doc.root(), line(20.0 + gap)).unwrap();

        let options = JumpOptions {
            max_jump_length_mm: -1.0,
            ..JumpOptions::default()
        };
        let report = JumpToStroke::new(options)
            .run(&mut doc, &SelectionManager::from_ids([a, b]), &planner())
            .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped_long, 0);
        assert_eq!(doc.children(doc.root()).unwrap().len(), 3);
    }

    #[test]
    fn test_report_counts() {
        let mut report = JumpReport::default();
        report.record(ConnectorOutcome::Skipped {
            reason: SkipReason::TooShort,
            length: 1.0,
        });
        report.record(ConnectorOutcome::Applied(Mutation::Inserted { node: NodeId(7) }));
        report.record(ConnectorOutcome::Applied(Mutation::MergedBoth {
            removed_container: Some(NodeId(2)),
        }));
        assert_eq!(report.skipped_short, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.merged, 1);
        assert_eq!(report.removed_containers, 1);
        assert_eq!(report.inserted_nodes, vec![NodeId(7)]);
        assert!(report.changed());
    }
}
