//! Traditional Japanese units and the fixed real-world dimensions the
//! engine places and snaps by.

use serde::{Deserialize, Serialize};

/// Millimetres per ken.
pub const MM_PER_KEN: f64 = 1818.0;

/// Square millimetres per tsubo.
pub const MM2_PER_TSUBO: f64 = 3_305_785.0;

/// Placement grid step, a quarter ken, in millimetres.
pub const GRID_STEP_MM: f64 = 455.0;

/// Civil-law minimum distance between a structure corner and the site
/// boundary, in millimetres.
pub const CIVIL_DISTANCE_MM: f64 = 500.0;

/// Convert a ken dimension to millimetres.
#[must_use]
pub fn ken_to_mm(ken: f64) -> f64 {
    ken * MM_PER_KEN
}

/// Floor area in tsubo for a millimetre footprint, rounded to one decimal
/// place.
#[must_use]
pub fn tsubo_from_mm_dims(width_mm: f64, depth_mm: f64) -> f64 {
    (width_mm * depth_mm / MM2_PER_TSUBO * 10.0).round() / 10.0
}

/// Vehicle classes a parking stall can hold, each with a fixed footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    /// Kei car (light automobile).
    Kei,
    /// Standard passenger car.
    Normal,
    /// Sport-utility vehicle.
    Suv,
    /// Minivan.
    Minivan,
}

impl VehicleClass {
    /// Footprint as `(width, length)` in millimetres.
    #[must_use]
    pub const fn dimensions_mm(self) -> (f64, f64) {
        match self {
            Self::Kei => (1480.0, 3400.0),
            Self::Normal => (1700.0, 4700.0),
            Self::Suv => (1900.0, 4900.0),
            Self::Minivan => (1850.0, 4800.0),
        }
    }

    /// All classes, in picker order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Kei, Self::Normal, Self::Suv, Self::Minivan]
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Kei => "kei",
            Self::Normal => "normal",
            Self::Suv => "suv",
            Self::Minivan => "minivan",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ken_to_mm() {
        assert!((ken_to_mm(5.0) - 9090.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tsubo_rounds_to_one_decimal() {
        // 9090 x 9090 mm -> 82_628_100 / 3_305_785 = 24.995..., rounds to 25.0
        let tsubo = tsubo_from_mm_dims(9090.0, 9090.0);
        assert!((tsubo - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_vehicle_class_serde_lowercase() {
        let json = serde_json::to_string(&VehicleClass::Kei).expect("serialize");
        assert_eq!(json, "\"kei\"");
        let back: VehicleClass = serde_json::from_str("\"minivan\"").expect("deserialize");
        assert_eq!(back, VehicleClass::Minivan);
    }
}
