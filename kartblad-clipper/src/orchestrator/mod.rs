//! Découpage concurrent d'une liste de kartblad
//!
//! Une tâche `tokio` par kartblad dans un `JoinSet`, au plus `workers`
//! outils actifs à la fois (sémaphore). Les résultats sont agrégés dans
//! l'ordre de complétion; un échec est soumis à la `FaultPolicy`.

pub mod fault;
pub mod outcome;
pub mod progress;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use sosi::Kartblad;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cancel::cancel_pair;
use crate::tools::{BoundaryWriter, ClipTool};

pub use fault::{FaultDecision, FaultMode, FaultPolicy};
pub use outcome::{ClipFault, ClipOutcome, OutcomeCounts};
pub use progress::Progress;
pub use worker::rename_output;

use worker::{TaskResult, WorkerContext};

/// Paramètres d'un lot de découpage
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Code EPSG inscrit dans les fichiers polygone
    pub epsg: u32,
    pub workers: usize,
    /// Journalise chaque kartblad au lieu d'afficher l'avancement
    pub verbose: bool,
}

/// Bilan d'un lot
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClipSummary {
    pub counts: OutcomeCounts,
    /// Échecs ignorés, plus celui qui a provoqué l'abandon
    pub failures: Vec<ClipFault>,
    /// Tâches non exécutées ou interrompues après un abandon
    pub cancelled: usize,
    pub aborted_by: Option<ClipFault>,
}

impl ClipSummary {
    pub fn is_aborted(&self) -> bool {
        self.aborted_by.is_some()
    }
}

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("clip task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Découpe les données laser selon chaque kartblad
pub async fn clip_many<T, W, P>(
    kartblad: Vec<Kartblad>,
    job: &ClipJob,
    tool: T,
    writer: W,
    policy: &P,
) -> Result<ClipSummary, ClipError>
where
    T: ClipTool,
    W: BoundaryWriter,
    P: FaultPolicy,
{
    if job.workers == 0 {
        return Err(ClipError::NoWorkers);
    }

    let scratch = tempfile::Builder::new()
        .prefix("kartblad-clip-")
        .tempdir()
        .map_err(ClipError::Scratch)?;

    let total = kartblad.len();
    info!(total, workers = job.workers, "Clipping laser data");

    let (cancel_handle, cancel) = cancel_pair();
    let ctx = Arc::new(WorkerContext {
        tool,
        writer,
        job: job.clone(),
        scratch: scratch.path().to_path_buf(),
        cancel,
    });
    let semaphore = Arc::new(Semaphore::new(job.workers));

    let mut tasks = JoinSet::new();
    for sheet in kartblad {
        let ctx = Arc::clone(&ctx);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => worker::clip_one(&*ctx, &sheet).await,
                Err(_) => TaskResult::Cancelled,
            };
            (sheet.name, result)
        });
    }

    let mut summary = ClipSummary::default();
    let mut progress = Progress::new("Clipping", total, !job.verbose);

    while let Some(joined) = tasks.join_next().await {
        let (name, result) = joined?;
        progress.advance();

        match result {
            TaskResult::Done(outcome) => summary.counts.record(outcome),
            TaskResult::Cancelled => {
                debug!(kartblad = %name, "Cancelled");
                summary.cancelled += 1;
            }
            TaskResult::Fault(fault) => {
                warn!(kartblad = %fault.kartblad, detail = %fault.detail, "Clipping failed");
                summary.counts.record(ClipOutcome::Failed);

                if !summary.is_aborted() {
                    progress.suspend();
                    if policy.decide(&fault).await == FaultDecision::Abort {
                        warn!(kartblad = %fault.kartblad, "Aborting remaining kartblad");
                        cancel_handle.cancel();
                        summary.aborted_by = Some(fault.clone());
                    }
                }
                summary.failures.push(fault);
            }
        }
    }
    progress.finish();

    if let Err(e) = scratch.close() {
        warn!(error = %e, "Cannot remove scratch directory");
    }

    info!(
        clipped = summary.counts.clipped,
        empty = summary.counts.empty,
        failed = summary.counts.failed,
        cancelled = summary.cancelled,
        "Clipping finished"
    );
    Ok(summary)
}
