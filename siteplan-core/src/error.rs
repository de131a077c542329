//! Error types for layout engine operations.

use thiserror::Error;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors surfaced by the layout engine.
///
/// Every variant is detected before any state mutation, so a rejected
/// command always leaves the committed state exactly as it was. Nothing
/// here is fatal; each failure waits for a fresh user action.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Calibration distance must be a finite, positive millimetre value.
    #[error("invalid calibration distance: {0} mm")]
    InvalidCalibrationDistance(f64),

    /// The two calibration clicks landed on the same pixel.
    #[error("calibration points are coincident")]
    CoincidentCalibrationPoints,

    /// A restored pixels-per-millimetre ratio was not finite and positive.
    #[error("invalid calibration ratio: {0} px/mm")]
    InvalidCalibrationRatio(f64),

    /// A polygon operation would leave fewer than three vertices.
    #[error("polygon must keep at least 3 vertices (would have {0})")]
    TooFewVertices(usize),

    /// The imported document failed to parse or is missing required fields.
    #[error("malformed layout document: {0}")]
    MalformedDocument(String),

    /// The imported document declares a version this engine does not read.
    #[error("unsupported layout version: {0}")]
    UnsupportedVersion(String),

    /// The operation needs a site boundary and none is set.
    #[error("no site boundary set")]
    NoBoundary,

    /// No object with the given id exists.
    #[error("unknown object id: {0}")]
    UnknownObject(String),

    /// A vertex index fell outside the boundary polygon.
    #[error("vertex index {index} out of range (polygon has {len} vertices)")]
    VertexOutOfRange {
        /// The offending index.
        index: usize,
        /// Current vertex count.
        len: usize,
    },

    /// An edge index fell outside the boundary polygon.
    #[error("edge index {index} out of range (polygon has {len} edges)")]
    EdgeOutOfRange {
        /// The offending index.
        index: usize,
        /// Current edge count.
        len: usize,
    },

    /// A calibration call arrived in a state that cannot accept it.
    #[error("calibration is not expecting {0}")]
    CalibrationState(&'static str),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure while persisting or loading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
