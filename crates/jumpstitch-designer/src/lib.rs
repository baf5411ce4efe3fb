//! # Jumpstitch Designer
//!
//! This crate holds the embroidery document model and the jump-to-stroke
//! conversion that runs on it.
//!
//! ## Core Components
//!
//! ### Document
//! - **Document**: Arena tree of layers, groups and shapes with transforms,
//!   styles, `inkstitch:*` params and attached commands
//! - **Model**: SVG path data, shapes and inline styles
//! - **Selection**: Ordered selection expanded into element snapshots
//!
//! ### Jump to Stroke
//! - **Classifier**: Decides which adjacent elements may be connected
//! - **Connector**: Length gates and the merge/insert policy
//! - **Stitch Plan**: Running stitch planner that supplies jump endpoints
//!
//! ### Import/Export
//! - **Serialization**: JSON design files
//! - **SVG Renderer**: SVG output for Inkscape/Ink/Stitch
//!
//! ## Architecture
//!
//! ```text
//! Document ──► SelectionManager ──► Element snapshots
//!                                        │
//!                     StitchPlanner ──► Classify ──► ConnectorRequest
//!                                                        │
//!           HostDocument ◄── ConnectorSynthesizer ◄──────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use jumpstitch_designer::{
//!     DesignPath, Document, JumpToStroke, NewNode, Point, RunningStitchPlanner,
//!     SelectionManager,
//! };
//! use jumpstitch_settings::Config;
//!
//! let mut doc = Document::new();
//! let line = |x: f64| {
//!     NewNode::path(DesignPath::from_points(&[Point::new(x, 0.0), Point::new(x + 20.0, 0.0)]))
//!         .style("stroke:#ff0000;fill:none")
//! };
//! let a = doc.append(doc.root(), line(0.0)).unwrap();
//! let b = doc.append(doc.root(), line(60.0)).unwrap();
//!
//! let config = Config::default();
//! let planner = RunningStitchPlanner::new(&config.stitch_plan, config.jump.pixels_per_mm);
//! let report = JumpToStroke::from_config(&config)
//!     .run(&mut doc, &SelectionManager::from_ids([a, b]), &planner)
//!     .unwrap();
//! assert_eq!(report.inserted, 1);
//! ```

pub mod document;
pub mod element;
pub mod host;
pub mod jump;
pub mod model;
pub mod selection_manager;
pub mod serialization;
pub mod stitch_plan;
pub mod svg_renderer;

pub use document::{params, Document, NewNode, Node, NodeId, NodeKind};
pub use element::{Container, Element, ElementKind};
pub use host::HostDocument;
pub use jump::{
    classify, ConnectorOutcome, ConnectorRequest, ConnectorSynthesizer, JumpReport, JumpToStroke,
    Mutation, SkipReason,
};
pub use model::{DesignPath, PathCommand, Point, Polyline, Shape, ShapeType, Style};
pub use selection_manager::SelectionManager;
pub use serialization::{DesignFile, DesignMetadata};
pub use stitch_plan::{RunningStitchPlanner, Stitch, StitchGroup, StitchPlanner};
pub use svg_renderer::render_svg;
