//! Two-click scale calibration workflow.
//!
//! Drives [`ScaleModel::calibrate`] through a four-state machine:
//!
//! ```text
//! Idle -> AwaitingFirstPoint -> AwaitingSecondPoint -> AwaitingDistanceInput -> Idle
//! ```
//!
//! The two measurement points live only in the controller until the distance
//! input is confirmed, so a cancelled or abandoned run leaves the scale
//! model untouched.

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::Point;
use crate::scale::ScaleModel;

/// Calibration workflow state, as the UI sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// Not calibrating.
    Idle,
    /// Waiting for the first reference click.
    AwaitingFirstPoint,
    /// First point captured; waiting for the second click.
    AwaitingSecondPoint,
    /// Both points captured; waiting for the real-world distance.
    AwaitingDistanceInput,
}

/// Internal stage, carrying the captured points.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    AwaitingFirstPoint,
    AwaitingSecondPoint { p1: Point },
    AwaitingDistanceInput { p1: Point, p2: Point },
}

/// Two-click calibration state machine.
///
/// Exactly two points are captured per successful calibration; nothing
/// leaks into the scale model until [`CalibrationController::confirm`]
/// succeeds.
#[derive(Debug)]
pub struct CalibrationController {
    stage: Stage,
}

impl CalibrationController {
    /// New controller, idle.
    #[must_use]
    pub const fn new() -> Self {
        Self { stage: Stage::Idle }
    }

    /// Current workflow state.
    #[must_use]
    pub const fn state(&self) -> CalibrationState {
        match self.stage {
            Stage::Idle => CalibrationState::Idle,
            Stage::AwaitingFirstPoint => CalibrationState::AwaitingFirstPoint,
            Stage::AwaitingSecondPoint { .. } => CalibrationState::AwaitingSecondPoint,
            Stage::AwaitingDistanceInput { .. } => CalibrationState::AwaitingDistanceInput,
        }
    }

    /// Whether a calibration run is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Idle)
    }

    /// Begin a calibration run, discarding any pending points.
    pub fn start(&mut self) {
        self.stage = Stage::AwaitingFirstPoint;
        tracing::debug!("calibration started");
    }

    /// Feed a reference click.
    ///
    /// The first click stores the point and waits for the second; the
    /// second stores the point and moves on to the distance input.
    ///
    /// # Errors
    ///
    /// [`LayoutError::CalibrationState`] if the controller is idle or
    /// already holds both points; the stage is unchanged.
    pub fn click(&mut self, point: Point) -> LayoutResult<CalibrationState> {
        self.stage = match self.stage {
            Stage::AwaitingFirstPoint => Stage::AwaitingSecondPoint { p1: point },
            Stage::AwaitingSecondPoint { p1 } => Stage::AwaitingDistanceInput { p1, p2: point },
            Stage::Idle | Stage::AwaitingDistanceInput { .. } => {
                return Err(LayoutError::CalibrationState("a reference click"));
            }
        };
        Ok(self.state())
    }

    /// Pixel distance between the two captured points, once both exist.
    ///
    /// The UI shows this next to the distance input.
    #[must_use]
    pub fn pixel_distance(&self) -> Option<f64> {
        if let Stage::AwaitingDistanceInput { p1, p2 } = self.stage {
            Some(p1.distance_to(p2))
        } else {
            None
        }
    }

    /// Confirm the measured real-world distance and commit the calibration.
    ///
    /// On success the controller returns to idle and reports the new ratio.
    /// On a rejected distance nothing is committed and the controller stays
    /// in the distance-input state so the user can correct the value.
    ///
    /// # Errors
    ///
    /// [`LayoutError::CalibrationState`] if both points are not yet
    /// captured; otherwise whatever [`ScaleModel::calibrate`] rejects.
    pub fn confirm(&mut self, scale: &mut ScaleModel, distance_mm: f64) -> LayoutResult<f64> {
        let Stage::AwaitingDistanceInput { p1, p2 } = self.stage else {
            return Err(LayoutError::CalibrationState("a distance input"));
        };
        let ratio = scale.calibrate(p1, p2, distance_mm)?;
        self.stage = Stage::Idle;
        Ok(ratio)
    }

    /// Abandon the run from any state, discarding pending points.
    pub fn cancel(&mut self) {
        if self.is_active() {
            tracing::debug!("calibration cancelled");
        }
        self.stage = Stage::Idle;
    }
}

impl Default for CalibrationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_calibration_run() {
        let mut controller = CalibrationController::new();
        let mut scale = ScaleModel::new();

        controller.start();
        assert_eq!(controller.state(), CalibrationState::AwaitingFirstPoint);

        controller
            .click(Point::new(0.0, 0.0))
            .expect("first click accepted");
        assert_eq!(controller.state(), CalibrationState::AwaitingSecondPoint);

        controller
            .click(Point::new(1000.0, 0.0))
            .expect("second click accepted");
        assert_eq!(controller.state(), CalibrationState::AwaitingDistanceInput);
        let px = controller.pixel_distance().expect("both points captured");
        assert!((px - 1000.0).abs() < 1e-9);

        let ratio = controller
            .confirm(&mut scale, 10_000.0)
            .expect("valid distance");
        assert!((ratio - 0.1).abs() < 1e-9);
        assert_eq!(controller.state(), CalibrationState::Idle);
        assert!(scale.is_calibrated());
    }

    #[test]
    fn test_click_rejected_when_idle() {
        let mut controller = CalibrationController::new();
        let result = controller.click(Point::new(1.0, 1.0));
        assert!(matches!(result, Err(LayoutError::CalibrationState(_))));
        assert_eq!(controller.state(), CalibrationState::Idle);
    }

    #[test]
    fn test_confirm_rejected_without_points() {
        let mut controller = CalibrationController::new();
        let mut scale = ScaleModel::new();
        controller.start();
        let result = controller.confirm(&mut scale, 1000.0);
        assert!(matches!(result, Err(LayoutError::CalibrationState(_))));
        assert!(!scale.is_calibrated());
    }

    #[test]
    fn test_invalid_distance_keeps_awaiting_input() {
        let mut controller = CalibrationController::new();
        let mut scale = ScaleModel::new();
        controller.start();
        controller.click(Point::new(0.0, 0.0)).expect("first click");
        controller
            .click(Point::new(500.0, 0.0))
            .expect("second click");

        let result = controller.confirm(&mut scale, -5.0);
        assert!(matches!(
            result,
            Err(LayoutError::InvalidCalibrationDistance(_))
        ));
        // Nothing committed; the user can retype the distance.
        assert!(!scale.is_calibrated());
        assert_eq!(controller.state(), CalibrationState::AwaitingDistanceInput);

        controller
            .confirm(&mut scale, 5000.0)
            .expect("corrected distance");
        assert!(scale.is_calibrated());
    }

    #[test]
    fn test_cancel_discards_points_from_any_state() {
        let mut controller = CalibrationController::new();
        controller.start();
        controller.click(Point::new(0.0, 0.0)).expect("first click");
        controller.cancel();
        assert_eq!(controller.state(), CalibrationState::Idle);
        assert!(controller.pixel_distance().is_none());

        // Restarting clears anything pending.
        controller.start();
        assert_eq!(controller.state(), CalibrationState::AwaitingFirstPoint);
    }
}
