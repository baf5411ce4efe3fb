//! # Jumpstitch Core
//!
//! Core types and utilities for Jumpstitch.
//! Provides the planar geometry, unit conversion and error taxonomy shared
//! by the settings, designer and frontend crates.

pub mod error;
pub mod geometry;
pub mod units;

pub use error::{DocumentError, Error, JumpError, PathDataError, Result, TransformError};
pub use geometry::{Point, Transform};
pub use units::{format_length, mm_to_px, px_to_mm, LengthUnit, PIXELS_PER_MM};
