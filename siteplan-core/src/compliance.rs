//! Legal-compliance arithmetic: setback clearance against the boundary and
//! coverage / floor-area ratios against zoning limits.
//!
//! Everything here is derived: results are recomputed from the latest
//! committed state on every call and never cached across a mutation.

use serde::{Deserialize, Serialize};

use crate::geometry::{point_to_segment_distance, polygon_area, polygon_edges, Point, Polygon};
use crate::layout::SiteLayout;
use crate::objects::{Building, ObjectId};
use crate::scale::ScaleModel;

/// Default floors multiplier: a uniform two-storey assumption across all
/// buildings.
pub const DEFAULT_FLOORS_MULTIPLIER: f64 = 2.0;

/// Zoning limit percentages for the selected administrative area.
///
/// When no district is selected both limits default to 100%, i.e.
/// unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningLimits {
    /// Maximum building coverage ratio, percent.
    pub building_coverage_ratio: f64,
    /// Maximum floor-area ratio, percent.
    pub floor_area_ratio: f64,
}

impl Default for ZoningLimits {
    fn default() -> Self {
        Self {
            building_coverage_ratio: 100.0,
            floor_area_ratio: 100.0,
        }
    }
}

/// Derived coverage and floor-area figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    /// Site area in square metres.
    pub site_area_m2: f64,
    /// Building footprint area in square metres.
    pub building_area_m2: f64,
    /// Total floor area across storeys in square metres.
    pub total_floor_area_m2: f64,
    /// Coverage ratio, percent.
    pub coverage_ratio: f64,
    /// Floor-area ratio, percent.
    pub floor_area_ratio: f64,
    /// Whether coverage is within the zoning limit.
    pub coverage_ok: bool,
    /// Whether floor area is within the zoning limit.
    pub floor_area_ok: bool,
}

impl ComplianceResult {
    /// Whether both ratios pass their limits.
    #[must_use]
    pub const fn passes(&self) -> bool {
        self.coverage_ok && self.floor_area_ok
    }
}

/// One object corner found closer to a boundary edge than the legal
/// minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetbackViolation {
    /// Offending object.
    pub object: ObjectId,
    /// The corner that sits too close, in pixels.
    pub corner: Point,
    /// Index of the boundary edge it was measured against.
    pub edge_index: usize,
    /// Measured distance in pixels.
    pub distance_px: f64,
    /// Required minimum in pixels.
    pub required_px: f64,
}

/// Check one object's corners against every boundary edge.
///
/// This is a conservative corner-based approximation: only the four corners
/// are tested, not the full footprint outline, so objects near a concave
/// notch of the boundary can be mis-classified in either direction. The UI
/// presents results as advisory.
#[must_use]
pub fn corner_setback_violations(
    object: ObjectId,
    corners: &[Point; 4],
    boundary: &Polygon,
    required_px: f64,
) -> Vec<SetbackViolation> {
    let mut violations = Vec::new();
    for (edge_index, (a, b)) in polygon_edges(boundary.points()).into_iter().enumerate() {
        for corner in corners {
            let distance_px = point_to_segment_distance(*corner, a, b);
            if distance_px < required_px {
                violations.push(SetbackViolation {
                    object,
                    corner: *corner,
                    edge_index,
                    distance_px,
                    required_px,
                });
            }
        }
    }
    violations
}

/// Setback violations for every building and parking stall in a layout.
///
/// Returns an empty list when no boundary is set.
#[must_use]
pub fn setback_violations(
    layout: &SiteLayout,
    scale: &ScaleModel,
    min_distance_mm: f64,
) -> Vec<SetbackViolation> {
    let Some(boundary) = layout.boundary.as_ref() else {
        return Vec::new();
    };
    let required_px = scale.mm_to_px(min_distance_mm);
    let mut violations = Vec::new();
    for building in &layout.buildings {
        violations.extend(corner_setback_violations(
            building.id,
            &building.corners(scale),
            boundary,
            required_px,
        ));
    }
    for parking in &layout.parkings {
        violations.extend(corner_setback_violations(
            parking.id,
            &parking.corners(scale),
            boundary,
            required_px,
        ));
    }
    violations
}

/// Coverage and floor-area ratios for a boundary and building set.
///
/// Site area comes from the boundary's pixel area through the scale model;
/// building area is the sum of real-world footprints, independent of the
/// pixel scale. A zero site area yields zero ratios rather than dividing
/// by it.
#[must_use]
pub fn coverage_and_floor_area_ratio(
    boundary: &Polygon,
    buildings: &[Building],
    floors_multiplier: f64,
    scale: &ScaleModel,
    limits: ZoningLimits,
) -> ComplianceResult {
    let site_area_m2 = scale.pixel_area_to_m2(polygon_area(boundary.points()));
    let building_area_m2 = buildings
        .iter()
        .map(|b| b.width_mm * b.depth_mm / 1_000_000.0)
        .sum::<f64>();
    let total_floor_area_m2 = building_area_m2 * floors_multiplier;
    let (coverage_ratio, floor_area_ratio) = if site_area_m2 > 0.0 {
        (
            building_area_m2 / site_area_m2 * 100.0,
            total_floor_area_m2 / site_area_m2 * 100.0,
        )
    } else {
        (0.0, 0.0)
    };
    ComplianceResult {
        site_area_m2,
        building_area_m2,
        total_floor_area_m2,
        coverage_ratio,
        floor_area_ratio,
        coverage_ok: coverage_ratio <= limits.building_coverage_ratio,
        floor_area_ok: floor_area_ratio <= limits.floor_area_ratio,
    }
}
