//! Connector synthesis: length gating and the merge policy.

use jumpstitch_core::{format_length, LengthUnit, Result};
use jumpstitch_settings::JumpOptions;
use tracing::debug;

use crate::document::{params, NewNode, NodeId};
use crate::host::HostDocument;
use crate::jump::classifier::ConnectorRequest;
use crate::model::DesignPath;

/// Style of an inserted connector; the colour is appended at the front.
const CONNECTOR_STYLE: &str = "stroke-width:1px;stroke-dasharray:3, 1;fill:none;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    TooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// A new dashed path was inserted before the successor.
    Inserted { node: NodeId },
    /// The predecessor path absorbed the connector.
    MergedIntoPredecessor,
    /// The successor path absorbed the connector.
    MergedIntoSuccessor,
    /// The successor absorbed predecessor and connector; the predecessor is gone.
    MergedBoth { removed_container: Option<NodeId> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectorOutcome {
    Skipped { reason: SkipReason, length: f64 },
    Applied(Mutation),
}

impl ConnectorOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ConnectorOutcome::Applied(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectorSynthesizer<'o> {
    options: &'o JumpOptions,
}

impl<'o> ConnectorSynthesizer<'o> {
    pub fn new(options: &'o JumpOptions) -> Self {
        Self { options }
    }

    /// Length gate. `None` accepts the connector.
    pub fn gate(&self, length: f64) -> Option<SkipReason> {
        if length < self.options.min_jump_length_px() {
            Some(SkipReason::TooShort)
        } else if self
            .options
            .max_jump_length_px()
            .is_some_and(|max| length > max)
        {
            Some(SkipReason::TooLong)
        } else {
            None
        }
    }

    pub fn synthesize<D: HostDocument + ?Sized>(
        &self,
        doc: &mut D,
        request: &ConnectorRequest<'_>,
    ) -> Result<ConnectorOutcome> {
        let length = request.length();
        if let Some(reason) = self.gate(length) {
            debug!(
                from = %request.predecessor.node,
                to = %request.successor.node,
                length = %format_length(length, LengthUnit::Mm, self.options.pixels_per_mm),
                ?reason,
                "connector skipped"
            );
            return Ok(ConnectorOutcome::Skipped { reason, length });
        }

        let mutation = self.apply(doc, request)?;
        debug!(
            from = %request.predecessor.node,
            to = %request.successor.node,
            length = %format_length(length, LengthUnit::Mm, self.options.pixels_per_mm),
            ?mutation,
            "connector applied"
        );
        Ok(ConnectorOutcome::Applied(mutation))
    }

    fn apply<D: HostDocument + ?Sized>(
        &self,
        doc: &mut D,
        request: &ConnectorRequest<'_>,
    ) -> Result<Mutation> {
        let predecessor = request.predecessor;
        let successor = request.successor;
        let merge = self.options.merge;

        // Document space until a branch moves it.
        let mut connector = DesignPath::from_points(&[request.start, request.end]);
        let mut merged_predecessor = false;

        if merge && predecessor.is_mergeable() {
            let correction = doc.correction_transform(predecessor.node)?;
            connector.transform(&correction);
            let merged = doc.path(predecessor.node)?.joined(&connector);
            doc.set_path(predecessor.node, merged.clone())?;
            connector = merged.transformed(&correction.inverse()?);
            merged_predecessor = true;
        }

        if merge && successor.is_mergeable() {
            connector.transform(&doc.correction_transform(successor.node)?);
            let merged = connector.joined(&doc.path(successor.node)?);
            doc.set_path(successor.node, merged)?;

            if !merged_predecessor {
                return Ok(Mutation::MergedIntoSuccessor);
            }
            let parent = doc.parent(predecessor.node)?;
            doc.remove(predecessor.node)?;
            let removed_container = doc.remove_if_empty(parent)?.then_some(parent);
            return Ok(Mutation::MergedBoth { removed_container });
        }

        if merged_predecessor {
            return Ok(Mutation::MergedIntoPredecessor);
        }

        connector.transform(&doc.sibling_correction_transform(successor.node)?);
        let style = format!("stroke:{};{}", successor.color, CONNECTOR_STYLE);
        let new = NewNode::path(connector)
            .style(style.as_str())
            .param(
                params::RUNNING_STITCH_LENGTH_MM,
                self.options.running_stitch_length_mm,
            )
            .param(
                params::RUNNING_STITCH_TOLERANCE_MM,
                self.options.running_stitch_tolerance_mm,
            );
        let node = doc.insert_before(successor.node, new)?;
        Ok(Mutation::Inserted { node })
    }
}
