//! The committed layout state: boundary, buildings, parking stalls.

use serde::{Deserialize, Serialize};

use crate::geometry::{polygon_centroid, Point, Polygon};
use crate::objects::{Building, ObjectId, Parking};

/// Everything the user has committed to the drawing.
///
/// This is the exact unit the undo history snapshots: cloning it deep-copies
/// the boundary and every placed object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteLayout {
    /// The property line, if traced. At most one per session.
    pub boundary: Option<Polygon>,
    /// Placed building footprints.
    pub buildings: Vec<Building>,
    /// Placed parking stalls.
    pub parkings: Vec<Parking>,
}

impl SiteLayout {
    /// Vertex-average centroid of the boundary, where new objects land.
    #[must_use]
    pub fn boundary_centroid(&self) -> Option<Point> {
        self.boundary.as_ref().map(|b| polygon_centroid(b.points()))
    }

    /// Whether any object with this id exists.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.buildings.iter().any(|b| b.id == id) || self.parkings.iter().any(|p| p.id == id)
    }

    /// Anchor position of an object, if it exists.
    #[must_use]
    pub fn position_of(&self, id: ObjectId) -> Option<Point> {
        self.buildings
            .iter()
            .find(|b| b.id == id)
            .map(|b| Point::new(b.x, b.y))
            .or_else(|| {
                self.parkings
                    .iter()
                    .find(|p| p.id == id)
                    .map(|p| Point::new(p.x, p.y))
            })
    }

    /// Total number of placed objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.buildings.len() + self.parkings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::VehicleClass;

    #[test]
    fn test_centroid_of_boundary() {
        let layout = SiteLayout {
            boundary: Some(Polygon::rectangle(
                Point::new(0.0, 0.0),
                Point::new(10.0, 20.0),
            )),
            ..SiteLayout::default()
        };
        let centroid = layout.boundary_centroid().expect("boundary set");
        assert!((centroid.x - 5.0).abs() < 1e-9);
        assert!((centroid.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_spans_both_lists() {
        let building = Building::new(1.0, 1.0, Point::new(0.0, 0.0));
        let parking = Parking::new(VehicleClass::Kei, Point::new(0.0, 0.0));
        let layout = SiteLayout {
            boundary: None,
            buildings: vec![building.clone()],
            parkings: vec![parking.clone()],
        };
        assert!(layout.contains(building.id));
        assert!(layout.contains(parking.id));
        assert!(!layout.contains(ObjectId::new()));
        assert_eq!(layout.object_count(), 2);
    }
}
