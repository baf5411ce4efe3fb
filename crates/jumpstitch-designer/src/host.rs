//! Document mutation interface used by connector synthesis.
//!
//! Connector synthesis only ever touches the host drawing through this
//! trait, so it can run against any tree that can answer these questions.

use jumpstitch_core::{Result, Transform};

use crate::document::{Document, NewNode, NodeId};
use crate::model::DesignPath;

pub trait HostDocument {
    /// Path data of a path-shaped node, in its own coordinate space.
    fn path(&self, node: NodeId) -> Result<DesignPath>;

    /// Replaces the path data of a path-shaped node.
    fn set_path(&mut self, node: NodeId, path: DesignPath) -> Result<()>;

    /// Document space to the node's own geometry space.
    fn correction_transform(&self, node: NodeId) -> Result<Transform>;

    /// Document space to the space of an untransformed sibling of `node`.
    fn sibling_correction_transform(&self, node: NodeId) -> Result<Transform>;

    fn parent(&self, node: NodeId) -> Result<NodeId>;

    /// Inserts `new` directly before `sibling` in its parent.
    fn insert_before(&mut self, sibling: NodeId, new: NewNode) -> Result<NodeId>;

    fn remove(&mut self, node: NodeId) -> Result<()>;

    /// Removes `container` when it has no children. Returns whether it was removed.
    fn remove_if_empty(&mut self, container: NodeId) -> Result<bool>;
}

impl HostDocument for Document {
    fn path(&self, node: NodeId) -> Result<DesignPath> {
        Document::path(self, node).cloned()
    }

    fn set_path(&mut self, node: NodeId, path: DesignPath) -> Result<()> {
        Document::set_path(self, node, path)
    }

    fn correction_transform(&self, node: NodeId) -> Result<Transform> {
        Document::correction_transform(self, node)
    }

    fn sibling_correction_transform(&self, node: NodeId) -> Result<Transform> {
        Document::sibling_correction_transform(self, node)
    }

    fn parent(&self, node: NodeId) -> Result<NodeId> {
        Document::parent(self, node)
    }

    fn insert_before(&mut self, sibling: NodeId, new: NewNode) -> Result<NodeId> {
        Document::insert_before(self, sibling, new)
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        Document::remove(self, node)
    }

    fn remove_if_empty(&mut self, container: NodeId) -> Result<bool> {
        Document::remove_if_empty(self, container)
    }
}
