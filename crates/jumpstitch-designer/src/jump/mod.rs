//! Jump to stroke.
//!
//! Replaces the needle travel between adjacent selected elements with a
//! running stitch path. [`classifier`] decides which adjacent pairs may be
//! connected, [`connector`] gates each candidate by length and writes it
//! into the document, and [`JumpToStroke`] runs both over a selection.

pub mod classifier;
pub mod connector;
mod extension;

pub use classifier::{
    advance, break_reason, classify, BreakReason, Classify, ConnectorRequest, JumpContext, Step,
};
pub use connector::{ConnectorOutcome, ConnectorSynthesizer, Mutation, SkipReason};
pub use extension::{JumpReport, JumpToStroke};
