//! # Siteplan Core
//!
//! Engine for tracing a property boundary over an uploaded drawing, placing
//! building and parking footprints inside it, and validating setback and
//! coverage / floor-area-ratio limits at an interactively calibrated scale.
//!
//! The engine is UI-agnostic: the drawing surface, raster decoding, zoning
//! lookups, floor-plan templates, and document export are collaborators
//! that drive it through [`SiteLayoutStore`] commands and read derived
//! values back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               siteplan-core                  │
//! ├──────────────────────────────────────────────┤
//! │  SiteLayoutStore    │  Compliance            │
//! │  - boundary         │  - setback clearance   │
//! │  - footprints       │  - coverage / FAR      │
//! │  - selection        │                        │
//! ├──────────────────────────────────────────────┤
//! │  History            │  ScaleModel            │
//! │  - 50 snapshots     │  - assumed 1/100 print │
//! │  - replay guard     │  - two-click calibrate │
//! └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod calibration;
pub mod compliance;
pub mod document;
pub mod error;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod objects;
pub mod scale;
pub mod store;
pub mod units;

pub use calibration::{CalibrationController, CalibrationState};
pub use compliance::{
    ComplianceResult, SetbackViolation, ZoningLimits, DEFAULT_FLOORS_MULTIPLIER,
};
pub use document::{LayoutDocument, StageSize, LAYOUT_FORMAT_VERSION};
pub use error::{LayoutError, LayoutResult};
pub use geometry::{
    point_to_segment_distance, polygon_area, polygon_centroid, polygon_edges, Point, Polygon,
};
pub use history::{History, MAX_SNAPSHOTS};
pub use layout::SiteLayout;
pub use objects::{Building, FloorPlanTemplate, ObjectId, Parking, Rotation};
pub use scale::{ScaleMode, ScaleModel};
pub use store::SiteLayoutStore;
pub use units::{VehicleClass, CIVIL_DISTANCE_MM, GRID_STEP_MM, MM2_PER_TSUBO, MM_PER_KEN};

/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
