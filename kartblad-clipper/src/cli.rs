//! Arguments et exécution de la commande de découpage
//!
//! Enchaîne: lecture de l'AOI, phase préparatoire (Fysak, lasindex),
//! lecture des kartblad, découpage concurrent, rapport.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};

use crate::config::ToolConfig;
use crate::orchestrator::{clip_many, ClipJob, FaultMode};
use crate::prepare::{prepare, Preparation};
use crate::report::RunReport;
use crate::tools::{Fysak, LasClip, LasIndex, ShapefileBoundaryWriter};

#[derive(Args, Debug, Clone)]
pub struct ClipArgs {
    /// Directory containing the input laser data (*.laz)
    #[arg(short = 'i', long)]
    pub input_directory: PathBuf,

    /// Directory where the clipped laser data is written (created if missing)
    #[arg(short = 'o', long)]
    pub output_directory: PathBuf,

    /// SOSI file with the area(s) of interest
    #[arg(short = 'a', long)]
    pub aoi: PathBuf,

    /// Build the spatial index (*.lax) of the input data before clipping
    #[arg(long)]
    pub run_indexing: bool,

    /// Number of cores to use (défaut: tous les cœurs disponibles)
    #[arg(short = 'C', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub ncores: Option<u32>,

    /// What to do when clipping a kartblad fails
    #[arg(long, value_enum, default_value_t = FaultMode::Prompt)]
    pub on_fault: FaultMode,

    /// Write a JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Fysak installation directory (défaut: env FYSAK_PATH / C:\Fysak)
    #[arg(long)]
    pub fysak_path: Option<PathBuf>,

    /// LAStools directory (défaut: env LASTOOLS_PATH / <fysak>/LAStools)
    #[arg(long)]
    pub lastools_path: Option<PathBuf>,
}

impl ClipArgs {
    pub fn cores(&self) -> usize {
        match self.ncores {
            Some(n) => n as usize,
            None => default_cores(),
        }
    }
}

fn default_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Exécute le découpage complet
pub async fn cmd_clip(args: &ClipArgs, verbose: bool) -> Result<()> {
    let started = Instant::now();

    if !args.input_directory.is_dir() {
        bail!(
            "Input directory not found: {}",
            args.input_directory.display()
        );
    }
    std::fs::create_dir_all(&args.output_directory).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.output_directory.display()
        )
    })?;

    let header = sosi::read_header(&args.aoi).context("Failed to read the AOI header")?;
    let epsg = header
        .require_epsg()
        .map_err(|e| e.in_file(args.aoi.display().to_string()))?;
    let utm_zone = epsg % 100;
    info!(epsg, utm_zone, "Projected coordinate system of the AOI");

    let mut tools = ToolConfig::from_env();
    tools.apply_overrides(args.fysak_path.clone(), args.lastools_path.clone());
    info!(
        fysak = %tools.fysak_dir.display(),
        lastools = %tools.lastools_dir.display(),
        "External tools"
    );

    let cores = args.cores();
    let kartblad_file = tempfile::Builder::new()
        .prefix("kartblad-")
        .suffix(".sos")
        .tempfile()
        .context("Failed to create the kartblad file")?
        .into_temp_path();

    prepare(
        &Fysak::new(&tools),
        &LasIndex::new(&tools),
        Preparation {
            aoi: &args.aoi,
            kartblad_file: &kartblad_file,
            utm_zone,
            index_dir: args.run_indexing.then_some(args.input_directory.as_path()),
            cores,
        },
    )
    .await
    .context("Preparation failed")?;

    info!("Reading the kartblad file");
    let set = sosi::read_kartblad(&kartblad_file).context("Failed to read the kartblad file")?;
    if let Err(e) = kartblad_file.close() {
        warn!(error = %e, "Cannot remove the kartblad file");
    }

    println!(
        "{} kartblad polygons will be used to clip the laser data.",
        set.kartblad.len()
    );
    println!("{} core(s) will be used.", cores);

    let job = ClipJob {
        input_dir: args.input_directory.clone(),
        output_dir: args.output_directory.clone(),
        epsg,
        workers: cores,
        verbose,
    };
    let summary = clip_many(
        set.kartblad,
        &job,
        LasClip::new(&tools),
        ShapefileBoundaryWriter,
        &args.on_fault,
    )
    .await?;

    let mut report = RunReport::new(&args.aoi.display().to_string(), epsg);
    report.record_dropped(&set.dropped);
    report.record_summary(&summary);
    report.set_duration(started.elapsed());
    report.finalize();
    report.display();
    info!("{}", report.summary());

    if let Some(path) = &args.report {
        save_report(&report, path)?;
    }

    if let Some(fault) = summary.aborted_by {
        bail!("Clipping aborted after failure on kartblad {}: {}", fault.kartblad, fault.detail);
    }

    Ok(())
}

fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    report
        .save_to_file(path)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}
