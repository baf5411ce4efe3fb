//! Serialization and deserialization for design files.
//!
//! A design file is JSON holding the document tree, the stored selection
//! and some metadata.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::document::{Document, NodeId};
use super::selection_manager::SelectionManager;

/// Design file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete design file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignFile {
    pub version: String,
    pub metadata: DesignMetadata,
    pub document: Document,
    #[serde(default)]
    pub selection: Vec<NodeId>,
}

/// Design metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl DesignFile {
    /// Create a new design file with an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_document(name, Document::new())
    }

    pub fn with_document(name: impl Into<String>, document: Document) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DesignMetadata {
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            document,
            selection: Vec::new(),
        }
    }

    /// Stored selection as a selection manager
    pub fn selection_manager(&self) -> SelectionManager {
        SelectionManager::from_ids(self.selection.iter().copied())
    }

    pub fn touch(&mut self) {
        self.metadata.modified = Utc::now();
    }

    /// Save design to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize design")?;

        std::fs::write(path.as_ref(), json).context("Failed to write design file")?;

        Ok(())
    }

    /// Load design from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read design file")?;

        let design: DesignFile =
            serde_json::from_str(&content).context("Failed to parse design file")?;

        if design.version != FILE_FORMAT_VERSION {
            bail!("Unsupported design file version {}", design.version);
        }
        if let Some(missing) = design
            .selection
            .iter()
            .find(|id| !design.document.contains(**id))
        {
            bail!("Selection refers to missing node {}", missing);
        }

        Ok(design)
    }
}
