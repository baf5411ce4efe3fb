//! Embroidery document tree.
//!
//! An arena of nodes keyed by [`NodeId`]. The root is the drawing itself;
//! groups (optionally flagged as layers) hold ordered children, and shape
//! leaves carry geometry, style, embroidery params and attached commands.
//!
//! Coordinate spaces:
//! - a node's geometry is expressed in its own space, which its `transform`
//!   maps into the parent's space;
//! - [`Document::composed_transform`] maps a node's space into document space;
//! - [`Document::correction_transform`] is the inverse, mapping document
//!   space into the space the node's own geometry is written in.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use jumpstitch_core::{DocumentError, Result, Transform};
use serde::{Deserialize, Serialize};

use crate::model::{DesignPath, Shape, Style};

/// Embroidery parameter names, written as `inkstitch:<name>` attributes in SVG.
pub mod params {
    pub const TRIM_AFTER: &str = "trim_after";
    pub const STOP_AFTER: &str = "stop_after";
    pub const FORCE_LOCK_STITCHES: &str = "force_lock_stitches";
    pub const SATIN_COLUMN: &str = "satin_column";
    pub const RUNNING_STITCH_LENGTH_MM: &str = "running_stitch_length_mm";
    pub const RUNNING_STITCH_TOLERANCE_MM: &str = "running_stitch_tolerance_mm";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Group { layer: bool },
    Shape { shape: Shape },
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Group { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, with = "transform_attr")]
    pub transform: Transform,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Node {
    pub fn is_layer(&self) -> bool {
        matches!(self.kind, NodeKind::Group { layer: true })
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn shape(&self) -> Option<&Shape> {
        match &self.kind {
            NodeKind::Shape { shape } => Some(shape),
            _ => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Boolean param; anything but `true`/`1`/`yes` reads as false.
    pub fn param_bool(&self, name: &str) -> bool {
        self.param(name)
            .is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    pub fn param_f64(&self, name: &str) -> Option<f64> {
        self.param(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c == name)
    }
}

/// Content of a node about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub kind: NodeKind,
    pub label: Option<String>,
    pub transform: Transform,
    pub style: Style,
    pub params: BTreeMap<String, String>,
    pub commands: Vec<String>,
}

impl NewNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            label: None,
            transform: Transform::identity(),
            style: Style::new(),
            params: BTreeMap::new(),
            commands: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group { layer: false })
    }

    pub fn layer(label: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Group { layer: true }).label(label)
    }

    pub fn shape(shape: Shape) -> Self {
        Self::with_kind(NodeKind::Shape { shape })
    }

    pub fn path(d: DesignPath) -> Self {
        Self::shape(Shape::path(d))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn style(mut self, style: impl Into<Style>) -> Self {
        self.style = style.into();
        self
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn command(mut self, name: &str) -> Self {
        self.commands.push(name.to_string());
        self
    }

    fn into_node(self, id: NodeId, parent: NodeId) -> Node {
        Node {
            id,
            parent: Some(parent),
            children: Vec::new(),
            kind: self.kind,
            label: self.label,
            transform: self.transform,
            style: self.style,
            params: self.params,
            commands: self.commands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "DocumentData", try_from = "DocumentData")]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                id: root,
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
                label: None,
                transform: Transform::identity(),
                style: Style::new(),
                params: BTreeMap::new(),
                commands: Vec::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the drawing has no content besides the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| DocumentError::NodeNotFound { id: id.0 }.into())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| DocumentError::NodeNotFound { id: id.0 }.into())
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: NodeId) -> Result<NodeId> {
        self.node(id)?
            .parent
            .ok_or_else(|| DocumentError::Orphan { id: id.0 }.into())
    }

    /// Position of `id` among its siblings.
    pub fn index_in_parent(&self, id: NodeId) -> Result<usize> {
        let parent = self.parent(id)?;
        self.children(parent)?
            .iter()
            .position(|&c| c == id)
            .ok_or_else(|| DocumentError::Orphan { id: id.0 }.into())
    }

    /// Appends a node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: NewNode) -> Result<NodeId> {
        let index = self.container(parent)?.children.len();
        self.insert_at(parent, index, node)
    }

    /// Inserts a node as the sibling directly before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, node: NewNode) -> Result<NodeId> {
        let parent = self.parent(sibling)?;
        let index = self.index_in_parent(sibling)?;
        self.insert_at(parent, index, node)
    }

    pub fn insert_at(&mut self, parent: NodeId, index: usize, node: NewNode) -> Result<NodeId> {
        let len = self.container(parent)?.children.len();
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node.into_node(id, parent));
        self.node_mut(parent)?.children.insert(index.min(len), id);
        Ok(id)
    }

    /// Removes `id` and its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocumentError::RemoveRoot.into());
        }
        let parent = self.parent(id)?;
        self.node_mut(parent)?.children.retain(|&c| c != id);

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
            }
        }
        Ok(())
    }

    /// Removes a container that has no children left. The root is never removed.
    pub fn remove_if_empty(&mut self, id: NodeId) -> Result<bool> {
        let node = self.container(id)?;
        if id == self.root || !node.children.is_empty() {
            return Ok(false);
        }
        self.remove(id)?;
        Ok(true)
    }

    /// Ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    /// All nodes below `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id)?.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next)?.iter().rev().copied());
        }
        Ok(out)
    }

    /// Map from the node's own coordinate space to document space.
    pub fn composed_transform(&self, id: NodeId) -> Result<Transform> {
        let mut transform = self.node(id)?.transform;
        for ancestor in self.ancestors(id) {
            transform = ancestor.transform * transform;
        }
        Ok(transform)
    }

    /// Map from document space to the space the node's geometry is written in.
    pub fn correction_transform(&self, id: NodeId) -> Result<Transform> {
        Ok(self.composed_transform(id)?.inverse()?)
    }

    /// Map from document space to the space of a new, untransformed sibling of `id`.
    pub fn sibling_correction_transform(&self, id: NodeId) -> Result<Transform> {
        self.correction_transform(self.parent(id)?)
    }

    pub fn path(&self, id: NodeId) -> Result<&DesignPath> {
        self.node(id)?
            .shape()
            .and_then(Shape::as_path)
            .ok_or_else(|| DocumentError::NotAPath { id: id.0 }.into())
    }

    pub fn set_path(&mut self, id: NodeId, d: DesignPath) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Shape {
                shape: Shape::Path { d: current },
            } => {
                *current = d;
                Ok(())
            }
            _ => Err(DocumentError::NotAPath { id: id.0 }.into()),
        }
    }

    /// Every node in document order, starting with the root.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root).unwrap_or_default())
            .filter_map(move |id| self.get(id))
    }

    fn container(&self, id: NodeId) -> Result<&Node> {
        let node = self.node(id)?;
        if node.kind.is_container() {
            Ok(node)
        } else {
            Err(DocumentError::NotAContainer { id: id.0 }.into())
        }
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.document.get(self.next?)?;
        self.next = node.parent;
        Some(node)
    }
}

/// Flat on-disk form of [`Document`]: nodes in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentData {
    root: NodeId,
    next_id: u64,
    nodes: Vec<Node>,
}

impl From<Document> for DocumentData {
    fn from(doc: Document) -> Self {
        let nodes = doc.iter().cloned().collect();
        DocumentData {
            root: doc.root,
            next_id: doc.next_id,
            nodes,
        }
    }
}

impl TryFrom<DocumentData> for Document {
    type Error = String;

    fn try_from(data: DocumentData) -> std::result::Result<Self, Self::Error> {
        let nodes: HashMap<NodeId, Node> = data.nodes.into_iter().map(|n| (n.id, n)).collect();
        if !nodes.contains_key(&data.root) {
            return Err(format!("root node {} missing", data.root));
        }
        for node in nodes.values() {
            if let Some(child) = node.children.iter().find(|c| !nodes.contains_key(c)) {
                return Err(format!("node {} lists missing child {}", node.id, child));
            }
            if node.id.0 >= data.next_id {
                return Err(format!("node id {} not below next_id {}", node.id, data.next_id));
            }
        }
        Ok(Document {
            nodes,
            root: data.root,
            next_id: data.next_id,
        })
    }
}

mod transform_attr {
    use jumpstitch_core::Transform;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(transform: &Transform, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if transform.is_identity() {
            serializer.serialize_str("")
        } else {
            serializer.serialize_str(&transform.to_string())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Transform, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn line(x1: f64, x2: f64) -> NewNode {
        NewNode::path(DesignPath::from_points(&[
            Point::new(x1, 0.0),
            Point::new(x2, 0.0),
        ]))
    }

    #[test]
    fn test_append_and_insert_before() {
        let mut doc = Document::new();
        let layer = doc.append(doc.root(), NewNode::layer("Layer 1")).unwrap();
        let a = doc.append(layer, line(0.0, 1.0)).unwrap();
        let b = doc.append(layer, line(2.0, 3.0)).unwrap();
        let between = doc.insert_before(b, line(1.0, 2.0)).unwrap();

        assert_eq!(doc.children(layer).unwrap(), &[a, between, b]);
        assert_eq!(doc.parent(between).unwrap(), layer);
        assert_eq!(doc.index_in_parent(b).unwrap(), 2);
    }

    #[test]
    fn test_shapes_are_not_containers() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), line(0.0, 1.0)).unwrap();
        let err = doc.append(a, line(1.0, 2.0)).unwrap_err();
        assert!(err.is_document_error());
    }

    #[test]
    fn test_remove_subtree() {
        let mut doc = Document::new();
        let group = doc.append(doc.root(), NewNode::group()).unwrap();
        let a = doc.append(group, line(0.0, 1.0)).unwrap();

        doc.remove(group).unwrap();
        assert!(!doc.contains(group));
        assert!(!doc.contains(a));
        assert!(doc.is_empty());
        assert!(doc.remove(doc.root()).is_err());
    }

    #[test]
    fn test_remove_if_empty() {
        let mut doc = Document::new();
        let group = doc.append(doc.root(), NewNode::group()).unwrap();
        let a = doc.append(group, line(0.0, 1.0)).unwrap();

        assert!(!doc.remove_if_empty(group).unwrap());
        doc.remove(a).unwrap();
        assert!(doc.remove_if_empty(group).unwrap());
        assert!(!doc.contains(group));
        assert!(!doc.remove_if_empty(doc.root()).unwrap());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut doc = Document::new();
        let layer = doc.append(doc.root(), NewNode::layer("L")).unwrap();
        let group = doc.append(layer, NewNode::group()).unwrap();
        let a = doc.append(group, line(0.0, 1.0)).unwrap();

        let ids: Vec<NodeId> = doc.ancestors(a).map(|n| n.id).collect();
        assert_eq!(ids, vec![group, layer, doc.root()]);
    }

    #[test]
    fn test_descendants_document_order() {
        let mut doc = Document::new();
        let g1 = doc.append(doc.root(), NewNode::group()).unwrap();
        let a = doc.append(g1, line(0.0, 1.0)).unwrap();
        let b = doc.append(doc.root(), line(1.0, 2.0)).unwrap();
        let c = doc.append(g1, line(2.0, 3.0)).unwrap();

        assert_eq!(doc.descendants(doc.root()).unwrap(), vec![g1, a, c, b]);
    }

    #[test]
    fn test_correction_transform_inverts_ancestry() {
        let mut doc = Document::new();
        let layer = doc
            .append(
                doc.root(),
                NewNode::layer("L").transform(Transform::translate(10.0, 0.0)),
            )
            .unwrap();
        let a = doc
            .append(layer, line(0.0, 1.0).transform(Transform::scale(2.0, 2.0)))
            .unwrap();

        let composed = doc.composed_transform(a).unwrap();
        assert_eq!(composed.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));

        let correction = doc.correction_transform(a).unwrap();
        assert_eq!(correction.apply(Point::new(12.0, 2.0)), Point::new(1.0, 1.0));

        let sibling = doc.sibling_correction_transform(a).unwrap();
        assert_eq!(sibling.apply(Point::new(12.0, 2.0)), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_set_path_only_on_paths() {
        let mut doc = Document::new();
        let rect = doc
            .append(
                doc.root(),
                NewNode::shape(Shape::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 1.0,
                    height: 1.0,
                }),
            )
            .unwrap();
        assert!(doc.path(rect).is_err());
        assert!(doc.set_path(rect, DesignPath::new()).is_err());
    }

    #[test]
    fn test_params_and_commands() {
        let mut doc = Document::new();
        let a = doc
            .append(
                doc.root(),
                line(0.0, 1.0)
                    .param(params::TRIM_AFTER, "true")
                    .param(params::RUNNING_STITCH_LENGTH_MM, 1.5)
                    .command("stop"),
            )
            .unwrap();
        let node = doc.node(a).unwrap();
        assert!(node.param_bool(params::TRIM_AFTER));
        assert!(!node.param_bool(params::STOP_AFTER));
        assert_eq!(node.param_f64(params::RUNNING_STITCH_LENGTH_MM), Some(1.5));
        assert!(node.has_command("stop"));
        assert!(!node.has_command("trim"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut doc = Document::new();
        let layer = doc
            .append(
                doc.root(),
                NewNode::layer("L").transform(Transform::translate(3.0, 4.0)),
            )
            .unwrap();
        doc.append(layer, line(0.0, 5.0).style("stroke:#ff0000;fill:none"))
            .unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), doc.len());
        assert_eq!(back.children(layer).unwrap(), doc.children(layer).unwrap());
        assert_eq!(
            back.composed_transform(layer).unwrap().apply(Point::new(0.0, 0.0)),
            Point::new(3.0, 4.0)
        );
    }
}
