//! Error codes for input diagnostics.
//!
//! Error codes are organized by input record kind:
//! - `E0xx` - Raw shape records
//! - `E1xx` - OCR fragment records
//! - `E2xx` - Adjacency hint records

use std::fmt;

/// Error codes for categorizing input diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Raw shape errors (E0xx)
    // =========================================================================
    /// Invalid bounding box.
    ///
    /// A coordinate is not a finite number or the width/height is negative.
    E001,

    /// Confidence out of range.
    ///
    /// Detector confidence must be a finite number in `[0, 1]`.
    E002,

    /// Empty geometry.
    ///
    /// The bounding box has zero width or zero height.
    E003,

    /// Invalid shape metric.
    ///
    /// A declared area, perimeter or circularity is negative or not finite.
    E004,

    /// Invalid contour point.
    ///
    /// A contour vertex has a non-finite coordinate.
    E005,

    // =========================================================================
    // OCR fragment errors (E1xx)
    // =========================================================================
    /// Invalid fragment bounding box.
    E100,

    /// Fragment confidence out of range.
    E101,

    /// Blank fragment text.
    ///
    /// Reported as a warning; the fragment is ignored.
    E102,

    // =========================================================================
    // Adjacency hint errors (E2xx)
    // =========================================================================
    /// Non-finite connector endpoint.
    E200,

    /// Zero-length connector segment.
    ///
    /// Reported as a warning; the segment still takes part in clustering.
    E201,

    /// Link to a missing shape.
    ///
    /// A link endpoint is not an index into the shape list.
    E202,

    /// Link to a discarded shape.
    ///
    /// Reported as a warning by the connector resolver when an endpoint
    /// shape was dropped by the confidence guard or a size filter.
    E203,
}

impl ErrorCode {
    /// Returns a short description of what the code means.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E001 => "invalid bounding box",
            ErrorCode::E002 => "confidence out of range",
            ErrorCode::E003 => "empty geometry",
            ErrorCode::E004 => "invalid shape metric",
            ErrorCode::E005 => "invalid contour point",
            ErrorCode::E100 => "invalid fragment bounding box",
            ErrorCode::E101 => "fragment confidence out of range",
            ErrorCode::E102 => "blank fragment text",
            ErrorCode::E200 => "non-finite connector endpoint",
            ErrorCode::E201 => "zero-length connector segment",
            ErrorCode::E202 => "link to a missing shape",
            ErrorCode::E203 => "link to a discarded shape",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_code_name() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
        assert_eq!(ErrorCode::E201.to_string(), "E201");
    }

    #[test]
    fn test_description() {
        assert_eq!(ErrorCode::E003.description(), "empty geometry");
    }
}
