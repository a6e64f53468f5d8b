//! Unified error handling for the waypoint-matcher library.
//!
//! Every failure is a local precondition violation detected at the offending
//! call, so none of these are retryable.

use std::fmt;

use crate::{Shape, WaypointId};

/// Unified error type for waypoint operations.
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointError {
    /// A sample count that cannot be honoured
    InvalidCount { context: String, count: usize },
    /// Nearest-waypoint query against a set with no waypoints
    EmptySet { shape: Shape },
    /// Zero-area rectangle, zero-length line or unusable sampling parameter
    DegenerateGeometry { shape: Shape, message: String },
    /// Network without nodes/links, or referencing unknown nodes
    InvalidNetwork { message: String },
    /// A merge would map one id to two different points
    IdCollision { id: WaypointId },
}

impl fmt::Display for WaypointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaypointError::InvalidCount { context, count } => {
                write!(f, "Invalid sample count {} for {}", count, context)
            }
            WaypointError::EmptySet { shape } => {
                write!(f, "Nearest-waypoint query on empty {} set", shape)
            }
            WaypointError::DegenerateGeometry { shape, message } => {
                write!(f, "Degenerate {} geometry: {}", shape, message)
            }
            WaypointError::InvalidNetwork { message } => {
                write!(f, "Invalid network: {}", message)
            }
            WaypointError::IdCollision { id } => {
                write!(f, "Waypoint id {} is already assigned", id)
            }
        }
    }
}

impl std::error::Error for WaypointError {}

/// Result type alias for waypoint operations.
pub type Result<T> = std::result::Result<T, WaypointError>;

/// Extension trait for converting Option to WaypointError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an empty set error.
    fn ok_or_empty_set(self, shape: Shape) -> Result<T>;

    /// Convert Option to Result with an invalid network error.
    fn ok_or_invalid_network(self, message: impl FnOnce() -> String) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_empty_set(self, shape: Shape) -> Result<T> {
        self.ok_or(WaypointError::EmptySet { shape })
    }

    fn ok_or_invalid_network(self, message: impl FnOnce() -> String) -> Result<T> {
        self.ok_or_else(|| WaypointError::InvalidNetwork { message: message() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WaypointError::InvalidCount {
            context: "line query".to_string(),
            count: 0,
        };
        assert!(err.to_string().contains("line query"));
        assert!(err.to_string().contains("count 0"));

        let err = WaypointError::EmptySet {
            shape: Shape::Rectangle,
        };
        assert!(err.to_string().contains("empty rectangle set"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<u32> = None;
        assert!(matches!(
            none.ok_or_empty_set(Shape::Line),
            Err(WaypointError::EmptySet { shape: Shape::Line })
        ));

        let none: Option<u32> = None;
        let result = none.ok_or_invalid_network(|| "node 7 has no position".to_string());
        match result {
            Err(WaypointError::InvalidNetwork { message }) => assert!(message.contains("node 7")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
