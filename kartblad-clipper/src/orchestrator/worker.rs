//! Découpage d'un kartblad: polygone, outil, renommage de la sortie

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use sosi::Kartblad;
use tracing::{debug, warn};

use super::outcome::{ClipFault, ClipOutcome};
use super::ClipJob;
use crate::cancel::CancelToken;
use crate::tools::{BoundaryWriter, ClipRequest, ClipTool};

/// Ce que rend une tâche à l'agrégateur
#[derive(Debug)]
pub(crate) enum TaskResult {
    Done(ClipOutcome),
    Fault(ClipFault),
    Cancelled,
}

/// État partagé par toutes les tâches d'un lot
pub(crate) struct WorkerContext<T, W> {
    pub tool: T,
    pub writer: W,
    pub job: ClipJob,
    pub scratch: PathBuf,
    pub cancel: CancelToken,
}

pub(crate) async fn clip_one<T, W>(ctx: &WorkerContext<T, W>, kartblad: &Kartblad) -> TaskResult
where
    T: ClipTool,
    W: BoundaryWriter,
{
    if ctx.cancel.is_cancelled() {
        return TaskResult::Cancelled;
    }

    let boundary = match ctx.writer.write(&ctx.scratch, kartblad, ctx.job.epsg) {
        Ok(boundary) => boundary,
        Err(e) => return TaskResult::Fault(ClipFault::new(&kartblad.name, e)),
    };

    let output = ctx.job.output_dir.join(format!("{}.laz", kartblad.name));
    let request = ClipRequest {
        input_dir: ctx.job.input_dir.clone(),
        boundary: boundary.path().to_path_buf(),
        bounding_box: kartblad.bounding_box,
        output: output.clone(),
    };

    let result = ctx.tool.clip(&request, &ctx.cancel).await;
    drop(boundary);

    match result {
        Err(e) if e.is_cancelled() => TaskResult::Cancelled,
        Err(e) => TaskResult::Fault(ClipFault::new(&kartblad.name, e)),
        Ok(()) => match rename_output(&output) {
            Ok(outcome) => {
                debug!(kartblad = %kartblad.name, %outcome, "Kartblad done");
                TaskResult::Done(outcome)
            }
            Err(e) => TaskResult::Fault(ClipFault::new(
                &kartblad.name,
                format!("cannot rename output: {e}"),
            )),
        },
    }
}

/// Renomme `<nom>_<n>.laz` en `<nom>.laz`
///
/// `Clipped` si un fichier numéroté existe, `Empty` sinon.
pub fn rename_output(output: &Path) -> io::Result<ClipOutcome> {
    let candidates = numbered_outputs(output)?;
    let Some(first) = candidates.first() else {
        return Ok(ClipOutcome::Empty);
    };
    if candidates.len() > 1 {
        warn!(
            output = %output.display(),
            count = candidates.len(),
            "Several numbered outputs, keeping the first"
        );
    }
    fs::rename(first, output)?;
    Ok(ClipOutcome::Clipped)
}

fn numbered_outputs(output: &Path) -> io::Result<Vec<PathBuf>> {
    let (Some(dir), Some(stem)) = (output.parent(), output.file_stem()) else {
        return Ok(Vec::new());
    };
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    let stem = stem.to_string_lossy();
    let pattern = format!(
        "{}{}{}_*.laz",
        Pattern::escape(&dir.to_string_lossy()),
        std::path::MAIN_SEPARATOR,
        Pattern::escape(&stem)
    );

    let entries = glob::glob(&pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|path| has_numbered_suffix(path, &stem))
        .collect();
    found.sort();
    Ok(found)
}

fn has_numbered_suffix(path: &Path, stem: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(stem))
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".laz"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
