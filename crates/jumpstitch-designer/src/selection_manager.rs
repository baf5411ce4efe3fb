use std::collections::HashSet;

use jumpstitch_core::Result;
use tracing::warn;

use crate::document::{Document, NodeId};
use crate::element::Element;

/// Tracks the user's selection and turns it into embroidery elements.
///
/// `SelectionManager` is responsible for:
/// - Keeping the selected node ids in the order the user picked them
/// - Expanding selected groups and layers into the elements they contain
/// - Snapshotting each element before the document is modified
///
/// # Selection Model
///
/// - **Order**: Elements are processed in selection order. A selected group
///   contributes its descendants in document order at the group's position.
/// - **Duplicates**: A node reached twice (selected directly and through a
///   group) is kept at its first position only.
/// - **Non-elements**: Groups, hidden nodes and shapes without stroke or fill
///   paint never become elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    selected: Vec<NodeId>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use jumpstitch_designer::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert!(manager.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selection from ids in the given order.
    pub fn from_ids(ids: impl IntoIterator<Item = NodeId>) -> Self {
        let mut manager = Self::new();
        for id in ids {
            manager.select(id);
        }
        manager
    }

    /// Adds `id` to the end of the selection. Selecting an id twice has no effect.
    pub fn select(&mut self, id: NodeId) {
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    /// Removes `id` from the selection.
    ///
    /// # Returns
    ///
    /// `true` if the id was selected.
    pub fn deselect(&mut self, id: NodeId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|&s| s != id);
        before != self.selected.len()
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected node ids with containers expanded into their descendants.
    ///
    /// # Errors
    ///
    /// Returns a document error if a selected id is not part of `doc`.
    pub fn expanded_ids(&self, doc: &Document) -> Result<Vec<NodeId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &id in &self.selected {
            let node = doc.node(id)?;
            let ids = if node.kind.is_container() {
                doc.descendants(id)?
            } else {
                vec![id]
            };
            out.extend(ids.into_iter().filter(|id| seen.insert(*id)));
        }
        Ok(out)
    }

    /// Snapshots every selected embroidery element.
    ///
    /// # Arguments
    ///
    /// * `doc` - The document the selection refers to
    /// * `flatten_tolerance` - Curve flattening tolerance in document units
    pub fn elements(&self, doc: &Document, flatten_tolerance: f64) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        for id in self.expanded_ids(doc)? {
            match Element::from_node(doc, id, flatten_tolerance)? {
                Some(element) => elements.push(element),
                None if self.selected.contains(&id) && !doc.node(id)?.kind.is_container() => {
                    warn!(node = %id, "selected node is not an embroidery element, ignoring");
                }
                None => {}
            }
        }
        Ok(elements)
    }
}
