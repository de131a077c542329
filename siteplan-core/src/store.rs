//! The single owned layout store: every mutation command and derived query.
//!
//! Mirrors the interaction contract of the drawing surface. Live drag
//! updates go through the `preview`/`move_vertex` paths and touch no
//! history; the matching commit call at gesture end snaps to the placement
//! grid and records exactly one snapshot. Every other command validates,
//! mutates, then commits in one step, so a rejected command never leaves a
//! half-applied state behind.

use std::path::Path;

use crate::calibration::{CalibrationController, CalibrationState};
use crate::compliance::{self, ComplianceResult, SetbackViolation, ZoningLimits};
use crate::document::{self, LayoutDocument, StageSize, LAYOUT_FORMAT_VERSION};
use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{Point, Polygon};
use crate::history::History;
use crate::layout::SiteLayout;
use crate::objects::{Building, FloorPlanTemplate, ObjectId, Parking};
use crate::scale::{ScaleMode, ScaleModel};
use crate::units::{VehicleClass, CIVIL_DISTANCE_MM, GRID_STEP_MM};

/// Default stage width in pixels.
const DEFAULT_STAGE_WIDTH: f64 = 800.0;

/// Default stage height in pixels.
const DEFAULT_STAGE_HEIGHT: f64 = 600.0;

/// Fraction of each stage dimension left as margin by the default boundary.
const DEFAULT_BOUNDARY_INSET: f64 = 0.125;

/// Owns the committed layout, scale, selection, calibration workflow, and
/// undo history. There is exactly one instance per editing session; all
/// mutation flows through it on the interaction thread.
#[derive(Debug)]
pub struct SiteLayoutStore {
    layout: SiteLayout,
    scale: ScaleModel,
    calibration: CalibrationController,
    selection: Option<ObjectId>,
    history: History,
    stage_width: f64,
    stage_height: f64,
    background_image: Option<String>,
    revision: u64,
}

impl SiteLayoutStore {
    /// New empty store with the default 800x600 stage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stage(DEFAULT_STAGE_WIDTH, DEFAULT_STAGE_HEIGHT)
    }

    /// New empty store sized to a decoded raster.
    #[must_use]
    pub fn with_stage(width: f64, height: f64) -> Self {
        let layout = SiteLayout::default();
        Self {
            history: History::new(layout.clone()),
            layout,
            scale: ScaleModel::new(),
            calibration: CalibrationController::new(),
            selection: None,
            stage_width: width,
            stage_height: height,
            background_image: None,
            revision: 0,
        }
    }

    /// Record the current state as one history snapshot.
    fn commit(&mut self) {
        self.history.push(self.layout.clone());
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Boundary commands
    // -----------------------------------------------------------------------

    /// Trace a default boundary: a rectangle inset from the stage edges.
    ///
    /// Replaces any existing boundary and commits.
    pub fn set_default_boundary(&mut self) {
        let dx = self.stage_width * DEFAULT_BOUNDARY_INSET;
        let dy = self.stage_height * DEFAULT_BOUNDARY_INSET;
        self.layout.boundary = Some(Polygon::rectangle(
            Point::new(dx, dy),
            Point::new(self.stage_width - dx, self.stage_height - dy),
        ));
        self.commit();
        tracing::debug!("default boundary set");
    }

    /// Replace the boundary with a caller-supplied polygon and commit.
    pub fn set_boundary(&mut self, boundary: Polygon) {
        self.layout.boundary = Some(boundary);
        self.commit();
    }

    /// Explicit reset: clear the boundary, every object, and the selection,
    /// then commit.
    pub fn reset(&mut self) {
        self.layout = SiteLayout::default();
        self.selection = None;
        self.commit();
        tracing::debug!("layout reset");
    }

    fn boundary_mut(&mut self) -> LayoutResult<&mut Polygon> {
        self.layout.boundary.as_mut().ok_or(LayoutError::NoBoundary)
    }

    /// Live drag update for a boundary vertex; nothing is recorded until
    /// [`SiteLayoutStore::commit_vertex_move`] at drag end.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] or [`LayoutError::VertexOutOfRange`].
    pub fn move_vertex(&mut self, index: usize, position: Point) -> LayoutResult<()> {
        self.boundary_mut()?.move_vertex(index, position)?;
        self.revision += 1;
        Ok(())
    }

    /// Drag end for a vertex move: record one snapshot.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] if there is no boundary to commit.
    pub fn commit_vertex_move(&mut self) -> LayoutResult<()> {
        if self.layout.boundary.is_none() {
            return Err(LayoutError::NoBoundary);
        }
        self.commit();
        Ok(())
    }

    /// Insert the midpoint of a boundary edge as a new draggable vertex and
    /// commit. Returns the inserted point.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] or [`LayoutError::EdgeOutOfRange`].
    pub fn add_vertex_on_edge(&mut self, edge_index: usize) -> LayoutResult<Point> {
        let mid = self.boundary_mut()?.insert_midpoint(edge_index)?;
        self.commit();
        Ok(mid)
    }

    /// Delete a boundary vertex and commit.
    ///
    /// # Errors
    ///
    /// [`LayoutError::TooFewVertices`] if the polygon currently has exactly
    /// three vertices (the boundary is unchanged),
    /// [`LayoutError::NoBoundary`], or [`LayoutError::VertexOutOfRange`].
    pub fn delete_vertex(&mut self, index: usize) -> LayoutResult<()> {
        self.boundary_mut()?.remove_vertex(index)?;
        self.commit();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Object commands
    // -----------------------------------------------------------------------

    fn placement_centroid(&self) -> LayoutResult<Point> {
        self.layout
            .boundary_centroid()
            .ok_or(LayoutError::NoBoundary)
    }

    /// Place a building of the given ken dimensions centred on the
    /// boundary's vertex-average centroid and commit. Returns the new id.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] if no boundary has been traced yet.
    pub fn add_building(&mut self, width_ken: f64, depth_ken: f64) -> LayoutResult<ObjectId> {
        let center = self.placement_centroid()?;
        let building = Building::new(width_ken, depth_ken, center);
        let id = building.id;
        self.layout.buildings.push(building);
        self.commit();
        tracing::debug!("building {id} added ({width_ken} x {depth_ken} ken)");
        Ok(id)
    }

    /// Instantiate a floor-plan template at the boundary centroid and
    /// commit. Dims, tsubo, and image reference are copied verbatim.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] if no boundary has been traced yet.
    pub fn add_building_from_template(
        &mut self,
        template: &FloorPlanTemplate,
    ) -> LayoutResult<ObjectId> {
        let center = self.placement_centroid()?;
        let building = Building::from_template(template, center);
        let id = building.id;
        self.layout.buildings.push(building);
        self.commit();
        tracing::debug!("template building {id} added");
        Ok(id)
    }

    /// Place a parking stall at the boundary centroid and commit.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] if no boundary has been traced yet.
    pub fn add_parking(&mut self, vehicle: VehicleClass) -> LayoutResult<ObjectId> {
        let center = self.placement_centroid()?;
        let parking = Parking::new(vehicle, center);
        let id = parking.id;
        self.layout.parkings.push(parking);
        self.commit();
        tracing::debug!("parking {id} added ({vehicle})");
        Ok(id)
    }

    fn object_position_mut(&mut self, id: ObjectId) -> LayoutResult<(&mut f64, &mut f64)> {
        if let Some(i) = self.layout.buildings.iter().position(|b| b.id == id) {
            let building = &mut self.layout.buildings[i];
            return Ok((&mut building.x, &mut building.y));
        }
        if let Some(i) = self.layout.parkings.iter().position(|p| p.id == id) {
            let parking = &mut self.layout.parkings[i];
            return Ok((&mut parking.x, &mut parking.y));
        }
        Err(LayoutError::UnknownObject(id.to_string()))
    }

    /// Live drag update: move an object with no snapping and no history.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownObject`] if the id matches nothing.
    pub fn preview_move(&mut self, id: ObjectId, x: f64, y: f64) -> LayoutResult<()> {
        let (px, py) = self.object_position_mut(id)?;
        *px = x;
        *py = y;
        self.revision += 1;
        Ok(())
    }

    /// Gesture end: snap the object's position to the quarter-ken grid and
    /// record one snapshot.
    ///
    /// Each axis snaps independently to the nearest multiple of
    /// `mm_to_px(GRID_STEP_MM)`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownObject`] if the id matches nothing.
    pub fn commit_move(&mut self, id: ObjectId) -> LayoutResult<()> {
        let step = self.scale.mm_to_px(GRID_STEP_MM);
        let (x, y) = self.object_position_mut(id)?;
        *x = snap_to_grid(*x, step);
        *y = snap_to_grid(*y, step);
        self.commit();
        Ok(())
    }

    /// Rotate an object a quarter turn clockwise and commit.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownObject`] if the id matches nothing.
    pub fn rotate(&mut self, id: ObjectId) -> LayoutResult<()> {
        if let Some(i) = self.layout.buildings.iter().position(|b| b.id == id) {
            let building = &mut self.layout.buildings[i];
            building.rotation = building.rotation.rotated_cw();
        } else if let Some(i) = self.layout.parkings.iter().position(|p| p.id == id) {
            let parking = &mut self.layout.parkings[i];
            parking.rotation = parking.rotation.rotated_cw();
        } else {
            return Err(LayoutError::UnknownObject(id.to_string()));
        }
        self.commit();
        Ok(())
    }

    /// Resize a building in ken, recomputing its derived dims and tsubo
    /// while keeping the position, then commit.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownObject`] if the id is not a building.
    pub fn resize_building(
        &mut self,
        id: ObjectId,
        width_ken: f64,
        depth_ken: f64,
    ) -> LayoutResult<()> {
        let building = self
            .layout
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| LayoutError::UnknownObject(id.to_string()))?;
        building.resize(width_ken, depth_ken);
        self.commit();
        Ok(())
    }

    /// Remove an object, clearing the selection if it pointed at it, then
    /// commit.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownObject`] if the id matches nothing.
    pub fn delete(&mut self, id: ObjectId) -> LayoutResult<()> {
        if !self.layout.contains(id) {
            return Err(LayoutError::UnknownObject(id.to_string()));
        }
        self.layout.buildings.retain(|b| b.id != id);
        self.layout.parkings.retain(|p| p.id != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.commit();
        tracing::debug!("object {id} deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select an object. Selection is a view concern and records no
    /// history.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownObject`] if the id matches nothing.
    pub fn select(&mut self, id: ObjectId) -> LayoutResult<()> {
        if !self.layout.contains(id) {
            return Err(LayoutError::UnknownObject(id.to_string()));
        }
        self.selection = Some(id);
        self.revision += 1;
        Ok(())
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.revision += 1;
    }

    /// Currently selected object, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// Drop the selection if the restored state no longer has the object.
    fn refresh_selection(&mut self) {
        if let Some(id) = self.selection {
            if !self.layout.contains(id) {
                self.selection = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Calibration
    // -----------------------------------------------------------------------

    /// Begin the two-click calibration workflow.
    pub fn start_calibration(&mut self) {
        self.calibration.start();
        self.revision += 1;
    }

    /// Feed a calibration reference click.
    ///
    /// # Errors
    ///
    /// [`LayoutError::CalibrationState`] if the workflow cannot accept a
    /// click right now.
    pub fn calibration_click(&mut self, point: Point) -> LayoutResult<CalibrationState> {
        let state = self.calibration.click(point)?;
        self.revision += 1;
        Ok(state)
    }

    /// Confirm the measured distance, committing the new scale ratio.
    ///
    /// Calibration changes derived areas only, so it records no history
    /// snapshot.
    ///
    /// # Errors
    ///
    /// [`LayoutError::CalibrationState`] if both points are not captured,
    /// or whatever [`ScaleModel::calibrate`] rejects.
    pub fn confirm_calibration(&mut self, distance_mm: f64) -> LayoutResult<f64> {
        let ratio = self.calibration.confirm(&mut self.scale, distance_mm)?;
        self.revision += 1;
        Ok(ratio)
    }

    /// Abandon calibration, discarding pending points. No side effects.
    pub fn cancel_calibration(&mut self) {
        self.calibration.cancel();
        self.revision += 1;
    }

    /// Current calibration workflow state.
    #[must_use]
    pub const fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    /// Pixel distance between the two captured clicks, once both exist.
    #[must_use]
    pub fn calibration_pixel_distance(&self) -> Option<f64> {
        self.calibration.pixel_distance()
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Step back one committed snapshot. Returns whether a step happened.
    ///
    /// The replay guard stays raised for the whole restore, so nothing in
    /// the restore path can push the restored state back into the history.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.begin_undo() else {
            return false;
        };
        self.layout = snapshot;
        self.refresh_selection();
        self.revision += 1;
        self.history.end_replay();
        tracing::debug!("undo applied");
        true
    }

    /// Step forward one undone snapshot. Returns whether a step happened.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.begin_redo() else {
            return false;
        };
        self.layout = snapshot;
        self.refresh_selection();
        self.revision += 1;
        self.history.end_replay();
        tracing::debug!("redo applied");
        true
    }

    /// Whether undo can step back.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo can step forward.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The committed layout.
    #[must_use]
    pub const fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// The active scale model.
    #[must_use]
    pub const fn scale(&self) -> &ScaleModel {
        &self.scale
    }

    /// Monotonic revision counter; bumps on every state change, committed
    /// or live. The render surface polls it to know when to redraw.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Stage size in pixels.
    #[must_use]
    pub const fn stage_size(&self) -> (f64, f64) {
        (self.stage_width, self.stage_height)
    }

    /// Resize the stage to a newly decoded raster. View concern; no
    /// history.
    pub fn set_stage_size(&mut self, width: f64, height: f64) {
        self.stage_width = width;
        self.stage_height = height;
        self.revision += 1;
    }

    /// Opaque background raster reference, if any.
    #[must_use]
    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    /// Point the background at a newly decoded raster. View concern; no
    /// history.
    pub fn set_background_image(&mut self, src: Option<String>) {
        self.background_image = src;
        self.revision += 1;
    }

    /// Coverage and floor-area ratios from the latest committed state.
    ///
    /// Recomputed on every call; nothing is cached across mutations.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] when no boundary is traced.
    pub fn compliance(
        &self,
        limits: ZoningLimits,
        floors_multiplier: f64,
    ) -> LayoutResult<ComplianceResult> {
        let boundary = self.layout.boundary.as_ref().ok_or(LayoutError::NoBoundary)?;
        Ok(compliance::coverage_and_floor_area_ratio(
            boundary,
            &self.layout.buildings,
            floors_multiplier,
            &self.scale,
            limits,
        ))
    }

    /// Setback violations at the civil-law minimum distance.
    #[must_use]
    pub fn setback_violations(&self) -> Vec<SetbackViolation> {
        self.setback_violations_at(CIVIL_DISTANCE_MM)
    }

    /// Setback violations at a caller-supplied minimum distance.
    #[must_use]
    pub fn setback_violations_at(&self, min_distance_mm: f64) -> Vec<SetbackViolation> {
        compliance::setback_violations(&self.layout, &self.scale, min_distance_mm)
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Export the committed state as a versioned document.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`]: a layout with no traced boundary has
    /// nothing a reader could re-import.
    pub fn export_document(&self) -> LayoutResult<LayoutDocument> {
        let boundary = self.layout.boundary.as_ref().ok_or(LayoutError::NoBoundary)?;
        Ok(LayoutDocument {
            version: LAYOUT_FORMAT_VERSION.to_string(),
            timestamp: document::current_timestamp_ms(),
            site_boundary: boundary.points().to_vec(),
            buildings: self.layout.buildings.clone(),
            parkings: self.layout.parkings.clone(),
            pixel_to_mm_ratio: match self.scale.mode() {
                ScaleMode::Calibrated { px_per_mm } => Some(px_per_mm),
                ScaleMode::Assumed => None,
            },
            stage_size: StageSize {
                width: self.stage_width,
                height: self.stage_height,
            },
            pdf_image_src: self.background_image.clone(),
        })
    }

    /// Replace the whole session from a parsed document.
    ///
    /// Validation happens before any state is touched; a failed import
    /// leaves the store exactly as it was. A successful import replaces
    /// layout, scale, stage, and background, clears the selection, and
    /// commits one snapshot.
    ///
    /// # Errors
    ///
    /// The document's validation errors: [`LayoutError::MalformedDocument`],
    /// [`LayoutError::UnsupportedVersion`], [`LayoutError::TooFewVertices`],
    /// or [`LayoutError::InvalidCalibrationRatio`].
    pub fn import_document(&mut self, doc: &LayoutDocument) -> LayoutResult<()> {
        doc.validate()?;
        let boundary = doc.boundary()?;
        let mut scale = ScaleModel::new();
        if let Some(ratio) = doc.pixel_to_mm_ratio {
            scale.set_ratio(ratio)?;
        }

        self.layout = SiteLayout {
            boundary: Some(boundary),
            buildings: doc.buildings.clone(),
            parkings: doc.parkings.clone(),
        };
        self.scale = scale;
        self.stage_width = doc.stage_size.width;
        self.stage_height = doc.stage_size.height;
        self.background_image = doc.pdf_image_src.clone();
        self.selection = None;
        self.commit();
        tracing::info!(
            "layout imported: {} buildings, {} parkings",
            doc.buildings.len(),
            doc.parkings.len()
        );
        Ok(())
    }

    /// Parse and import a JSON document.
    ///
    /// # Errors
    ///
    /// See [`SiteLayoutStore::import_document`].
    pub fn import_json(&mut self, json: &str) -> LayoutResult<()> {
        let doc = LayoutDocument::from_json(json)?;
        self.import_document(&doc)
    }

    /// Export the committed state to a JSON string.
    ///
    /// # Errors
    ///
    /// See [`SiteLayoutStore::export_document`].
    pub fn export_json(&self) -> LayoutResult<String> {
        self.export_document()?.to_json()
    }

    /// Persist the current session to a file.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoBoundary`] with nothing to save, or an I/O error.
    pub fn save_to_file(&self, path: &Path) -> LayoutResult<()> {
        let json = self.export_json()?;
        std::fs::write(path, json)?;
        tracing::info!("layout saved to {}", path.display());
        Ok(())
    }

    /// Load and import a session from a file.
    ///
    /// # Errors
    ///
    /// An I/O error, or see [`SiteLayoutStore::import_document`].
    pub fn load_from_file(&mut self, path: &Path) -> LayoutResult<()> {
        let contents = std::fs::read_to_string(path)?;
        self.import_json(&contents)
    }
}

impl Default for SiteLayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest multiple of `step`; identity for a degenerate step.
fn snap_to_grid(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}
