//! Versioned JSON document for persisting and restoring a layout session.
//!
//! The wire format uses `camelCase` field names so documents exported by
//! any front end read the same way. `version` and `siteBoundary` are required
//! on import; everything else has a defined default, so older or partial
//! documents still load.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{Point, Polygon, MIN_POLYGON_VERTICES};
use crate::objects::{Building, Parking};

/// Format version this engine writes and reads.
pub const LAYOUT_FORMAT_VERSION: &str = "1.0";

/// Stage dimensions recorded with a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Default for StageSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// The persisted layout format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    /// Format version.
    pub version: String,
    /// Unix timestamp in milliseconds at export time.
    #[serde(default)]
    pub timestamp: u64,
    /// Boundary vertices. Required; at least three points.
    pub site_boundary: Vec<Point>,
    /// Placed buildings.
    #[serde(default)]
    pub buildings: Vec<Building>,
    /// Placed parking stalls.
    #[serde(default)]
    pub parkings: Vec<Parking>,
    /// Calibrated pixels-per-millimetre ratio; absent means the assumed
    /// print scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_to_mm_ratio: Option<f64>,
    /// Stage dimensions.
    #[serde(default)]
    pub stage_size: StageSize,
    /// Opaque background raster reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_image_src: Option<String>,
}

impl LayoutDocument {
    /// Parse and validate a document from JSON.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MalformedDocument`] for unparseable JSON or missing
    /// required fields, [`LayoutError::UnsupportedVersion`] for a version
    /// this engine does not read, and [`LayoutError::TooFewVertices`] for a
    /// boundary with fewer than three points.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        let doc: Self = serde_json::from_str(json)
            .map_err(|e| LayoutError::MalformedDocument(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Validate version, boundary, and ratio constraints.
    pub(crate) fn validate(&self) -> LayoutResult<()> {
        if self.version != LAYOUT_FORMAT_VERSION {
            return Err(LayoutError::UnsupportedVersion(self.version.clone()));
        }
        if self.site_boundary.len() < MIN_POLYGON_VERTICES {
            return Err(LayoutError::TooFewVertices(self.site_boundary.len()));
        }
        if let Some(ratio) = self.pixel_to_mm_ratio {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(LayoutError::InvalidCalibrationRatio(ratio));
            }
        }
        Ok(())
    }

    /// The boundary as a polygon.
    ///
    /// # Errors
    ///
    /// [`LayoutError::TooFewVertices`] for a hand-built document that
    /// skipped [`LayoutDocument::from_json`].
    pub fn boundary(&self) -> LayoutResult<Polygon> {
        Polygon::new(self.site_boundary.clone())
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> LayoutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Current Unix time in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Will not exceed u64 range for millennia.
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_requires_site_boundary() {
        let result = LayoutDocument::from_json(r#"{"version":"1.0"}"#);
        assert!(matches!(result, Err(LayoutError::MalformedDocument(_))));
    }

    #[test]
    fn test_import_requires_version() {
        let result = LayoutDocument::from_json(
            r#"{"siteBoundary":[{"x":0,"y":0},{"x":10,"y":0},{"x":0,"y":10}]}"#,
        );
        assert!(matches!(result, Err(LayoutError::MalformedDocument(_))));
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let result = LayoutDocument::from_json(
            r#"{"version":"2.0","siteBoundary":[{"x":0,"y":0},{"x":10,"y":0},{"x":0,"y":10}]}"#,
        );
        assert!(matches!(result, Err(LayoutError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_import_rejects_short_boundary() {
        let result = LayoutDocument::from_json(
            r#"{"version":"1.0","siteBoundary":[{"x":0,"y":0},{"x":10,"y":0}]}"#,
        );
        assert!(matches!(result, Err(LayoutError::TooFewVertices(2))));
    }

    #[test]
    fn test_missing_collections_default_empty() {
        let doc = LayoutDocument::from_json(
            r#"{"version":"1.0","siteBoundary":[{"x":0,"y":0},{"x":10,"y":0},{"x":0,"y":10}]}"#,
        )
        .expect("minimal document loads");
        assert!(doc.buildings.is_empty());
        assert!(doc.parkings.is_empty());
        assert!(doc.pixel_to_mm_ratio.is_none());
        assert!((doc.stage_size.width - 800.0).abs() < 1e-9);
        assert!((doc.stage_size.height - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_import_rejects_bad_ratio() {
        let result = LayoutDocument::from_json(
            r#"{"version":"1.0","siteBoundary":[{"x":0,"y":0},{"x":10,"y":0},{"x":0,"y":10}],"pixelToMmRatio":-0.5}"#,
        );
        assert!(matches!(
            result,
            Err(LayoutError::InvalidCalibrationRatio(_))
        ));
    }

    #[test]
    fn test_document_json_round_trip() {
        let doc = LayoutDocument {
            version: LAYOUT_FORMAT_VERSION.to_string(),
            timestamp: 1_700_000_000_000,
            site_boundary: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            buildings: Vec::new(),
            parkings: Vec::new(),
            pixel_to_mm_ratio: Some(0.1),
            stage_size: StageSize::default(),
            pdf_image_src: Some("uploads/plan-04.pdf".to_string()),
        };
        let json = doc.to_json().expect("serialize");
        let back = LayoutDocument::from_json(&json).expect("parse back");
        assert_eq!(back, doc);
    }
}
