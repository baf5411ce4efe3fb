//! Embroidery element snapshots.
//!
//! An [`Element`] captures everything the jump classifier and connector
//! synthesis need to know about one drawable node, read once before any
//! document mutation happens.

use jumpstitch_core::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::document::{params, Document, NodeId, NodeKind};
use crate::model::Polyline;

/// Command name that requests a thread trim after the element.
pub const TRIM_COMMAND: &str = "trim";
/// Command name that requests a machine stop after the element.
pub const STOP_COMMAND: &str = "stop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Running stitch along the outline.
    Stroke,
    Fill,
    Satin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Container {
    pub id: NodeId,
    pub is_layer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub node: NodeId,
    pub color: String,
    pub kind: ElementKind,
    /// The node's geometry is stored as path data.
    pub path_shaped: bool,
    /// Enclosing groups, nearest first. The drawing root is not included.
    pub ancestry: SmallVec<[Container; 4]>,
    pub trim_after: bool,
    pub stop_after: bool,
    pub force_lock_stitches: bool,
    pub commands: Vec<String>,
    pub running_stitch_length_mm: Option<f64>,
    pub running_stitch_tolerance_mm: Option<f64>,
    /// Geometry in document space, one polyline per subpath.
    pub paths: Vec<Polyline>,
}

impl Element {
    /// Snapshot of `id`, or `None` when the node is not an embroidery element.
    pub fn from_node(doc: &Document, id: NodeId, flatten_tolerance: f64) -> Result<Option<Self>> {
        let node = doc.node(id)?;
        let shape = match &node.kind {
            NodeKind::Shape { shape } => shape,
            _ => return Ok(None),
        };
        if node.style.get("display") == Some("none") {
            return Ok(None);
        }

        let (kind, color) = if node.param_bool(params::SATIN_COLUMN) {
            match node.style.stroke() {
                Some(color) => (ElementKind::Satin, color),
                None => return Ok(None),
            }
        } else if let Some(color) = node.style.stroke() {
            (ElementKind::Stroke, color)
        } else if let Some(color) = node.style.fill() {
            (ElementKind::Fill, color)
        } else {
            return Ok(None);
        };

        let ancestry = doc
            .ancestors(id)
            .filter(|n| n.is_group())
            .map(|n| Container {
                id: n.id,
                is_layer: n.is_layer(),
            })
            .collect();

        let paths = shape
            .to_path()
            .transformed(&doc.composed_transform(id)?)
            .flatten(flatten_tolerance);

        Ok(Some(Element {
            node: id,
            color,
            kind,
            path_shaped: shape.is_path(),
            ancestry,
            trim_after: node.param_bool(params::TRIM_AFTER),
            stop_after: node.param_bool(params::STOP_AFTER),
            force_lock_stitches: node.param_bool(params::FORCE_LOCK_STITCHES),
            commands: node.commands.clone(),
            running_stitch_length_mm: node.param_f64(params::RUNNING_STITCH_LENGTH_MM),
            running_stitch_tolerance_mm: node.param_f64(params::RUNNING_STITCH_TOLERANCE_MM),
            paths,
        }))
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c == name)
    }

    /// A trim follows this element, by command or by param.
    pub fn trims_after(&self) -> bool {
        self.trim_after || self.has_command(TRIM_COMMAND)
    }

    /// A stop follows this element, by command or by param.
    pub fn stops_after(&self) -> bool {
        self.stop_after || self.has_command(STOP_COMMAND)
    }

    /// Nearest enclosing group of any kind.
    pub fn nearest_group(&self) -> Option<NodeId> {
        self.ancestry.first().map(|c| c.id)
    }

    /// Nearest enclosing group flagged as a layer.
    pub fn nearest_layer(&self) -> Option<NodeId> {
        self.ancestry.iter().find(|c| c.is_layer).map(|c| c.id)
    }

    /// Stroke elements with path geometry can absorb a connector.
    pub fn is_mergeable(&self) -> bool {
        self.kind == ElementKind::Stroke && self.path_shaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NewNode;
    use crate::model::{DesignPath, Point, Shape};
    use jumpstitch_core::Transform;

    fn stroke(color: &str) -> NewNode {
        NewNode::path(DesignPath::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        ]))
        .style(format!("stroke:{};fill:none", color).as_str())
    }

    #[test]
    fn test_kind_precedence() {
        let mut doc = Document::new();
        let root = doc.root();
        let s = doc.append(root, stroke("#FF0000")).unwrap();
        let satin = doc
            .append(root, stroke("#00ff00").param(params::SATIN_COLUMN, true))
            .unwrap();
        let fill = doc
            .append(
                root,
                NewNode::shape(Shape::Circle {
                    cx: 0.0,
                    cy: 0.0,
                    r: 1.0,
                }),
            )
            .unwrap();
        let none = doc
            .append(root, stroke("none").style("stroke:none;fill:none"))
            .unwrap();

        let s = Element::from_node(&doc, s, 0.1).unwrap().unwrap();
        assert_eq!(s.kind, ElementKind::Stroke);
        assert_eq!(s.color, "#ff0000");
        assert!(s.is_mergeable());

        let satin = Element::from_node(&doc, satin, 0.1).unwrap().unwrap();
        assert_eq!(satin.kind, ElementKind::Satin);
        assert!(!satin.is_mergeable());

        let fill = Element::from_node(&doc, fill, 0.1).unwrap().unwrap();
        assert_eq!(fill.kind, ElementKind::Fill);
        assert_eq!(fill.color, "#000000");
        assert!(!fill.path_shaped);

        assert!(Element::from_node(&doc, none, 0.1).unwrap().is_none());
        assert!(Element::from_node(&doc, root, 0.1).unwrap().is_none());
    }

    #[test]
    fn test_group_and_layer_resolution() {
        let mut doc = Document::new();
        let layer = doc.append(doc.root(), NewNode::layer("L")).unwrap();
        let group = doc.append(layer, NewNode::group()).unwrap();
        let inner = doc.append(group, NewNode::group()).unwrap();
        let a = doc.append(inner, stroke("red")).unwrap();
        let top = doc.append(doc.root(), stroke("red")).unwrap();

        let a = Element::from_node(&doc, a, 0.1).unwrap().unwrap();
        assert_eq!(a.nearest_group(), Some(inner));
        assert_eq!(a.nearest_layer(), Some(layer));
        assert_eq!(a.ancestry.len(), 3);

        let top = Element::from_node(&doc, top, 0.1).unwrap().unwrap();
        assert_eq!(top.nearest_group(), None);
        assert_eq!(top.nearest_layer(), None);
    }

    #[test]
    fn test_flags_and_commands() {
        let mut doc = Document::new();
        let a = doc
            .append(
                doc.root(),
                stroke("red")
                    .param(params::STOP_AFTER, "true")
                    .param(params::FORCE_LOCK_STITCHES, "true")
                    .command(TRIM_COMMAND),
            )
            .unwrap();
        let a = Element::from_node(&doc, a, 0.1).unwrap().unwrap();
        assert!(a.trims_after());
        assert!(!a.trim_after);
        assert!(a.stops_after());
        assert!(a.force_lock_stitches);
    }

    #[test]
    fn test_geometry_in_document_space() {
        let mut doc = Document::new();
        let layer = doc
            .append(
                doc.root(),
                NewNode::layer("L").transform(Transform::translate(5.0, 5.0)),
            )
            .unwrap();
        let a = doc.append(layer, stroke("red")).unwrap();
        let a = Element::from_node(&doc, a, 0.1).unwrap().unwrap();
        assert_eq!(
            a.paths[0].points,
            vec![Point::new(5.0, 5.0), Point::new(15.0, 5.0)]
        );
    }

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let mut doc = Document::new();
        let a = doc
            .append(doc.root(), stroke("red").style("stroke:red;display:none"))
            .unwrap();
        assert!(Element::from_node(&doc, a, 0.1).unwrap().is_none());
    }
}
