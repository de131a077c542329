//! Buildings, parking stalls, and the ids that address them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;
use crate::scale::ScaleModel;
use crate::units::{ken_to_mm, tsubo_from_mm_dims, VehicleClass};

/// Unique identifier for a placed object (building or parking stall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Right-angle rotation of a footprint.
///
/// Serialized as bare degrees so documents read naturally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// 0 degrees.
    #[default]
    Deg0,
    /// 90 degrees.
    Deg90,
    /// 180 degrees.
    Deg180,
    /// 270 degrees.
    Deg270,
}

impl Rotation {
    /// Rotation after a further quarter turn clockwise.
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// Angle in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Whether width and depth swap on screen at this rotation.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(format!("rotation must be 0/90/180/270, got {other}")),
        }
    }
}

/// A reusable floor-plan record supplied by the template collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanTemplate {
    /// Footprint width in ken.
    pub width_ken: f64,
    /// Footprint depth in ken.
    pub depth_ken: f64,
    /// Catalogued floor area in tsubo, copied verbatim on instantiation.
    pub tsubo: f64,
    /// Path to the template's plan image, if it ships one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// A building footprint placed on the drawing.
///
/// The anchor `(x, y)` is the centre of the footprint in pixels.
/// Dimensions are authored in ken; the derived millimetre dims and tsubo
/// floor area are kept in sync by the constructors and
/// [`Building::resize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Unique id.
    pub id: ObjectId,
    /// Centre X in pixels.
    pub x: f64,
    /// Centre Y in pixels.
    pub y: f64,
    /// Width in ken.
    pub width_ken: f64,
    /// Depth in ken.
    pub depth_ken: f64,
    /// Derived width in millimetres.
    pub width_mm: f64,
    /// Derived depth in millimetres.
    pub depth_mm: f64,
    /// Derived floor area in tsubo, one decimal place.
    pub tsubo: f64,
    /// Footprint rotation.
    #[serde(default)]
    pub rotation: Rotation,
    /// Optional template image reference, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Building {
    /// Create a building of the given ken dimensions centred at `center`.
    #[must_use]
    pub fn new(width_ken: f64, depth_ken: f64, center: Point) -> Self {
        let width_mm = ken_to_mm(width_ken);
        let depth_mm = ken_to_mm(depth_ken);
        Self {
            id: ObjectId::new(),
            x: center.x,
            y: center.y,
            width_ken,
            depth_ken,
            width_mm,
            depth_mm,
            tsubo: tsubo_from_mm_dims(width_mm, depth_mm),
            rotation: Rotation::Deg0,
            image: None,
        }
    }

    /// Instantiate a template, copying its dims, tsubo, and image verbatim.
    #[must_use]
    pub fn from_template(template: &FloorPlanTemplate, center: Point) -> Self {
        Self {
            id: ObjectId::new(),
            x: center.x,
            y: center.y,
            width_ken: template.width_ken,
            depth_ken: template.depth_ken,
            width_mm: ken_to_mm(template.width_ken),
            depth_mm: ken_to_mm(template.depth_ken),
            tsubo: template.tsubo,
            rotation: Rotation::Deg0,
            image: template.image_path.clone(),
        }
    }

    /// Recompute dimensions from new ken values, keeping the position.
    pub fn resize(&mut self, width_ken: f64, depth_ken: f64) {
        self.width_ken = width_ken;
        self.depth_ken = depth_ken;
        self.width_mm = ken_to_mm(width_ken);
        self.depth_mm = ken_to_mm(depth_ken);
        self.tsubo = tsubo_from_mm_dims(self.width_mm, self.depth_mm);
    }

    /// On-screen footprint `(width, depth)` in millimetres, rotation
    /// applied.
    #[must_use]
    pub fn footprint_mm(&self) -> (f64, f64) {
        if self.rotation.swaps_axes() {
            (self.depth_mm, self.width_mm)
        } else {
            (self.width_mm, self.depth_mm)
        }
    }

    /// The four pixel-space corners of the footprint.
    #[must_use]
    pub fn corners(&self, scale: &ScaleModel) -> [Point; 4] {
        footprint_corners(self.x, self.y, self.footprint_mm(), scale)
    }
}

/// A parking stall placed on the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parking {
    /// Unique id.
    pub id: ObjectId,
    /// Centre X in pixels.
    pub x: f64,
    /// Centre Y in pixels.
    pub y: f64,
    /// Vehicle class fixing the stall's real-world footprint.
    pub vehicle: VehicleClass,
    /// Footprint rotation.
    #[serde(default)]
    pub rotation: Rotation,
}

impl Parking {
    /// Create a stall for `vehicle` centred at `center`.
    #[must_use]
    pub fn new(vehicle: VehicleClass, center: Point) -> Self {
        Self {
            id: ObjectId::new(),
            x: center.x,
            y: center.y,
            vehicle,
            rotation: Rotation::Deg0,
        }
    }

    /// On-screen footprint `(width, depth)` in millimetres, rotation
    /// applied.
    #[must_use]
    pub fn footprint_mm(&self) -> (f64, f64) {
        let (width, length) = self.vehicle.dimensions_mm();
        if self.rotation.swaps_axes() {
            (length, width)
        } else {
            (width, length)
        }
    }

    /// The four pixel-space corners of the stall.
    #[must_use]
    pub fn corners(&self, scale: &ScaleModel) -> [Point; 4] {
        footprint_corners(self.x, self.y, self.footprint_mm(), scale)
    }
}

/// Corners of an axis-aligned footprint centred at `(x, y)`.
fn footprint_corners(x: f64, y: f64, dims_mm: (f64, f64), scale: &ScaleModel) -> [Point; 4] {
    let (width_mm, depth_mm) = dims_mm;
    let hw = scale.mm_to_px(width_mm) / 2.0;
    let hd = scale.mm_to_px(depth_mm) / 2.0;
    [
        Point::new(x - hw, y - hd),
        Point::new(x + hw, y - hd),
        Point::new(x + hw, y + hd),
        Point::new(x - hw, y + hd),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_building_derives_mm_and_tsubo() {
        let building = Building::new(5.0, 5.0, Point::new(100.0, 100.0));
        assert!((building.width_mm - 9090.0).abs() < TOLERANCE);
        assert!((building.depth_mm - 9090.0).abs() < TOLERANCE);
        assert!((building.tsubo - 25.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_resize_recomputes_derived_dims() {
        let mut building = Building::new(5.0, 5.0, Point::new(100.0, 100.0));
        building.resize(2.0, 3.0);
        assert!((building.width_mm - 3636.0).abs() < TOLERANCE);
        assert!((building.depth_mm - 5454.0).abs() < TOLERANCE);
        let expected = (3636.0 * 5454.0 / 3_305_785.0 * 10.0_f64).round() / 10.0;
        assert!((building.tsubo - expected).abs() < TOLERANCE);
        assert!((building.x - 100.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_from_template_copies_verbatim() {
        let template = FloorPlanTemplate {
            width_ken: 4.0,
            depth_ken: 3.5,
            tsubo: 14.2,
            image_path: Some("plans/a-101.png".to_string()),
        };
        let building = Building::from_template(&template, Point::new(50.0, 60.0));
        assert!((building.tsubo - 14.2).abs() < TOLERANCE);
        assert_eq!(building.image.as_deref(), Some("plans/a-101.png"));
        assert_eq!(building.rotation, Rotation::Deg0);
    }

    #[test]
    fn test_rotation_cycle() {
        let mut rotation = Rotation::Deg0;
        for expected in [90, 180, 270, 0] {
            rotation = rotation.rotated_cw();
            assert_eq!(rotation.degrees(), expected);
        }
    }

    #[test]
    fn test_rotation_serde_as_degrees() {
        let json = serde_json::to_string(&Rotation::Deg270).expect("serialize");
        assert_eq!(json, "270");
        let back: Rotation = serde_json::from_str("90").expect("deserialize");
        assert_eq!(back, Rotation::Deg90);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_rotation_swaps_footprint_axes() {
        let mut parking = Parking::new(VehicleClass::Normal, Point::new(0.0, 0.0));
        let (w, d) = parking.footprint_mm();
        assert!((w - 1700.0).abs() < TOLERANCE);
        assert!((d - 4700.0).abs() < TOLERANCE);
        parking.rotation = Rotation::Deg90;
        let (w, d) = parking.footprint_mm();
        assert!((w - 4700.0).abs() < TOLERANCE);
        assert!((d - 1700.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_corners_are_centred_on_anchor() {
        let building = Building::new(2.0, 2.0, Point::new(100.0, 100.0));
        let scale = ScaleModel::new();
        let corners = building.corners(&scale);
        let half = scale.mm_to_px(3636.0) / 2.0;
        assert!((corners[0].x - (100.0 - half)).abs() < TOLERANCE);
        assert!((corners[2].y - (100.0 + half)).abs() < TOLERANCE);
    }
}
