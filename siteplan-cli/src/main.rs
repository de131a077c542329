//! # Siteplan CLI
//!
//! Loads a layout document exported by the editor, recomputes site and
//! building areas at the document's scale, and prints setback and
//! coverage / floor-area findings.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use siteplan_core::{
    SiteLayoutStore, ZoningLimits, CIVIL_DISTANCE_MM, DEFAULT_FLOORS_MULTIPLIER,
};

#[derive(Parser)]
#[command(name = "siteplan", version, about = "Site-plan layout compliance tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a layout document.
    Info {
        /// Path to the layout JSON.
        file: PathBuf,
    },
    /// Check setbacks and zoning ratios.
    Check {
        /// Path to the layout JSON.
        file: PathBuf,
        /// Maximum building coverage ratio, percent.
        #[arg(long, default_value_t = 100.0)]
        coverage_limit: f64,
        /// Maximum floor-area ratio, percent.
        #[arg(long, default_value_t = 100.0)]
        floor_area_limit: f64,
        /// Uniform storey count applied to every building.
        #[arg(long, default_value_t = DEFAULT_FLOORS_MULTIPLIER)]
        floors: f64,
        /// Minimum boundary setback in millimetres.
        #[arg(long, default_value_t = CIVIL_DISTANCE_MM)]
        setback_mm: f64,
    },
}

/// Initialize tracing from `RUST_LOG`, defaulting to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_store(file: &Path) -> anyhow::Result<SiteLayoutStore> {
    let mut store = SiteLayoutStore::new();
    store
        .load_from_file(file)
        .with_context(|| format!("failed to load layout from {}", file.display()))?;
    Ok(store)
}

fn info(file: &Path) -> anyhow::Result<()> {
    let store = load_store(file)?;
    let layout = store.layout();
    let (stage_w, stage_h) = store.stage_size();

    println!("layout: {}", file.display());
    println!("  stage: {stage_w} x {stage_h} px");
    if let Some(src) = store.background_image() {
        println!("  background: {src}");
    }
    println!(
        "  scale: {}",
        if store.scale().is_calibrated() {
            format!("calibrated, {:.6} px/mm", store.scale().px_per_mm())
        } else {
            "assumed 1/100 print".to_string()
        }
    );
    if let Some(boundary) = layout.boundary.as_ref() {
        println!("  boundary: {} vertices", boundary.vertex_count());
    }
    println!("  buildings: {}", layout.buildings.len());
    for building in &layout.buildings {
        println!(
            "    {} - {} x {} ken, {} tsubo, {} deg",
            building.id,
            building.width_ken,
            building.depth_ken,
            building.tsubo,
            building.rotation.degrees()
        );
    }
    println!("  parkings: {}", layout.parkings.len());
    for parking in &layout.parkings {
        println!(
            "    {} - {}, {} deg",
            parking.id,
            parking.vehicle,
            parking.rotation.degrees()
        );
    }
    Ok(())
}

fn check(file: &Path, limits: ZoningLimits, floors: f64, setback_mm: f64) -> anyhow::Result<()> {
    let store = load_store(file)?;

    let result = store
        .compliance(limits, floors)
        .context("layout has no boundary to check")?;
    println!("site area:        {:>10.2} m2", result.site_area_m2);
    println!("building area:    {:>10.2} m2", result.building_area_m2);
    println!("total floor area: {:>10.2} m2", result.total_floor_area_m2);
    println!(
        "coverage:         {:>9.2} % (limit {:.0} %) {}",
        result.coverage_ratio,
        limits.building_coverage_ratio,
        pass_mark(result.coverage_ok)
    );
    println!(
        "floor-area ratio: {:>9.2} % (limit {:.0} %) {}",
        result.floor_area_ratio,
        limits.floor_area_ratio,
        pass_mark(result.floor_area_ok)
    );

    let violations = store.setback_violations_at(setback_mm);
    if violations.is_empty() {
        println!("setbacks:         all corners clear of {setback_mm} mm");
    } else {
        println!("setbacks:         {} violation(s)", violations.len());
        for v in &violations {
            println!(
                "    object {} corner ({:.1}, {:.1}) is {:.1} px from edge {} (needs {:.1} px)",
                v.object, v.corner.x, v.corner.y, v.distance_px, v.edge_index, v.required_px
            );
        }
    }

    if !result.passes() || !violations.is_empty() {
        anyhow::bail!("layout does not comply");
    }
    Ok(())
}

fn pass_mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "OVER"
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Info { file } => info(&file),
        Command::Check {
            file,
            coverage_limit,
            floor_area_limit,
            floors,
            setback_mm,
        } => check(
            &file,
            ZoningLimits {
                building_coverage_ratio: coverage_limit,
                floor_area_ratio: floor_area_limit,
            },
            floors,
            setback_mm,
        ),
    }
}
