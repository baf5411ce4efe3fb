//! Unit conversion utilities
//!
//! Embroidery options are entered in millimeters while document geometry is
//! expressed in drawing units (CSS pixels). The scale between the two is an
//! explicit parameter so callers can work in either space.

use std::fmt;

/// Drawing units per millimeter at the CSS reference resolution (96 dpi)
pub const PIXELS_PER_MM: f64 = 96.0 / 25.4;

/// Convert a length in millimeters to drawing units
///
/// * `value_mm` - Length in millimeters
/// * `pixels_per_mm` - Drawing units per millimeter
pub fn mm_to_px(value_mm: f64, pixels_per_mm: f64) -> f64 {
    value_mm * pixels_per_mm
}

/// Convert a length in drawing units to millimeters
///
/// * `value_px` - Length in drawing units
/// * `pixels_per_mm` - Drawing units per millimeter
pub fn px_to_mm(value_px: f64, pixels_per_mm: f64) -> f64 {
    value_px / pixels_per_mm
}

/// Length unit used when displaying lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    /// Millimeters
    #[default]
    Mm,
    /// Drawing units (CSS pixels)
    Px,
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mm => write!(f, "mm"),
            Self::Px => write!(f, "px"),
        }
    }
}

/// Format a drawing-unit length in the requested unit
pub fn format_length(value_px: f64, unit: LengthUnit, pixels_per_mm: f64) -> String {
    match unit {
        LengthUnit::Mm => format!("{:.3}mm", px_to_mm(value_px, pixels_per_mm)),
        LengthUnit::Px => format!("{:.3}px", value_px),
    }
}
