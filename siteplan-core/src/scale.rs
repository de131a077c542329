//! Pixel to millimetre scale model.
//!
//! Two modes: an assumed print scale used until the user calibrates, and a
//! calibrated ratio measured from two clicks a known distance apart. A
//! calibration supersedes the assumption for the rest of the session.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::Point;

/// Assumed print scale denominator (a 1/100 drawing) when uncalibrated.
const PRINT_SCALE_DENOMINATOR: f64 = 100.0;

/// Assumed raster DPI when uncalibrated.
const ASSUMED_DPI: f64 = 150.0;

/// Render scale the raster was produced at.
const RENDER_SCALE: f64 = 2.0;

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Active scale mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ScaleMode {
    /// No user calibration yet: assume a 1/100 print at fixed DPI and
    /// render scale.
    Assumed,
    /// User-calibrated pixels-per-millimetre ratio.
    Calibrated {
        /// Pixels per millimetre.
        px_per_mm: f64,
    },
}

/// Converts between pixel space and real-world millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleModel {
    mode: ScaleMode,
}

impl ScaleModel {
    /// New model in the assumed (uncalibrated) mode.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: ScaleMode::Assumed,
        }
    }

    /// The active mode.
    #[must_use]
    pub const fn mode(&self) -> ScaleMode {
        self.mode
    }

    /// Whether a user calibration is active.
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        matches!(self.mode, ScaleMode::Calibrated { .. })
    }

    /// The active linear factor in pixels per millimetre.
    #[must_use]
    pub fn px_per_mm(&self) -> f64 {
        match self.mode {
            ScaleMode::Calibrated { px_per_mm } => px_per_mm,
            ScaleMode::Assumed => {
                (ASSUMED_DPI / MM_PER_INCH) * RENDER_SCALE / PRINT_SCALE_DENOMINATOR
            }
        }
    }

    /// Convert a millimetre length to pixels.
    #[must_use]
    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm * self.px_per_mm()
    }

    /// Convert a pixel length to millimetres.
    #[must_use]
    pub fn px_to_mm(&self, px: f64) -> f64 {
        px / self.px_per_mm()
    }

    /// Convert a pixel area to square metres, inverting the squared form of
    /// whichever mode is active.
    #[must_use]
    pub fn pixel_area_to_m2(&self, pixel_area: f64) -> f64 {
        let factor = self.px_per_mm();
        pixel_area / (factor * factor) / 1_000_000.0
    }

    /// Calibrate from two points a known real-world distance apart.
    ///
    /// Returns the new pixels-per-millimetre ratio. All rejections happen
    /// before any state change, so a failed call leaves the prior mode
    /// active.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidCalibrationDistance`] if `real_distance_mm` is
    /// non-positive or non-finite, and
    /// [`LayoutError::CoincidentCalibrationPoints`] if the two points are
    /// the same pixel.
    pub fn calibrate(&mut self, p1: Point, p2: Point, real_distance_mm: f64) -> LayoutResult<f64> {
        if !real_distance_mm.is_finite() || real_distance_mm <= 0.0 {
            return Err(LayoutError::InvalidCalibrationDistance(real_distance_mm));
        }
        let pixel_distance = p1.distance_to(p2);
        if pixel_distance <= 0.0 {
            return Err(LayoutError::CoincidentCalibrationPoints);
        }
        let ratio = pixel_distance / real_distance_mm;
        self.mode = ScaleMode::Calibrated { px_per_mm: ratio };
        tracing::info!("scale calibrated: {ratio} px/mm over {real_distance_mm} mm");
        Ok(ratio)
    }

    /// Restore a previously measured ratio, e.g. from an imported document.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidCalibrationRatio`] for a non-finite or
    /// non-positive ratio; the prior mode stays active.
    pub fn set_ratio(&mut self, px_per_mm: f64) -> LayoutResult<()> {
        if !px_per_mm.is_finite() || px_per_mm <= 0.0 {
            return Err(LayoutError::InvalidCalibrationRatio(px_per_mm));
        }
        self.mode = ScaleMode::Calibrated { px_per_mm };
        Ok(())
    }
}

impl Default for ScaleModel {
    fn default() -> Self {
        Self::new()
    }
}
