//! Error types for homing.

use std::fmt;
use thiserror::Error;

/// Result alias for homing operations.
pub type HomingResult<T> = std::result::Result<T, HomingError>;

/// The entity a lookup failed to find.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    /// An image file referenced by a stored view.
    Image(String),
    /// A grid view at a map-unit coordinate.
    GridCoordinate { x: i32, y: i32 },
    /// A grid view at a `(Grid X, Grid Y)` index pair.
    GridIndex { grid_x: i32, grid_y: i32 },
    /// A route position outside the stored sequence.
    RouteIndex { index: usize, len: usize },
    /// A database file.
    File(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Image(name) => write!(f, "image `{name}`"),
            Missing::GridCoordinate { x, y } => write!(f, "grid view at ({x}, {y})"),
            Missing::GridIndex { grid_x, grid_y } => {
                write!(f, "grid view at index ({grid_x}, {grid_y})")
            }
            Missing::RouteIndex { index, len } => {
                write!(f, "route index {index} (route has {len} views)")
            }
            Missing::File(path) => write!(f, "file `{path}`"),
        }
    }
}

fn at_line(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

/// Errors that can occur while loading databases or matching views.
#[derive(Debug, Error, PartialEq)]
pub enum HomingError {
    /// The image bytes could not be decoded.
    #[error("cannot decode image `{source_name}`: {reason}")]
    Decode { source_name: String, reason: String },
    /// An image or view has zero area or a buffer that does not fit it.
    #[error("invalid view shape {width}x{height}")]
    InvalidShape { width: usize, height: usize },
    /// Two views that must share a shape do not.
    #[error("view shape mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .got.0, .got.1)]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// A database record is malformed.
    #[error("malformed record in `{source_name}`{}: {reason}", at_line(.line))]
    Data {
        source_name: String,
        line: Option<u64>,
        reason: String,
    },
    /// A file, coordinate or index is absent.
    #[error("not found: {0}")]
    NotFound(Missing),
    /// The operation needs at least one stored view.
    #[error("empty database: {context}")]
    EmptyDatabase { context: &'static str },
    /// Incompatible configuration, detected at construction time.
    #[error("invalid configuration: {reason}")]
    Config { reason: String },
    /// A familiarity profile has no meaningful signal-strength ratio.
    #[error("degenerate familiarity profile: {reason}")]
    DegenerateProfile { reason: &'static str },
    /// A learned scorer received or produced vectors of the wrong length.
    #[error("embedding length mismatch: expected {expected}, got {got}")]
    EmbeddingMismatch { expected: usize, got: usize },
    /// A sweep was cancelled before completion.
    #[error("sweep cancelled")]
    Cancelled,
}

impl HomingError {
    /// Returns true for the `NotFound` class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HomingError::NotFound(_))
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        HomingError::Config {
            reason: reason.into(),
        }
    }
}
