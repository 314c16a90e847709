//! Commandes LAStools: `lasclip` et `lasindex`

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use super::{process, ClipRequest, ClipTool, ToolError};
use crate::cancel::CancelToken;
use crate::config::ToolConfig;

/// Motif des fichiers d'entrée, développé par LAStools lui-même
const INPUT_PATTERN: &str = "*.laz";

/// Découpage par `lasclip`
#[derive(Debug, Clone)]
pub struct LasClip {
    exe: PathBuf,
    gdal_data: PathBuf,
}

impl LasClip {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            exe: config.lastools_exe("lasclip"),
            gdal_data: config.gdal_data().to_path_buf(),
        }
    }

    /// `lasclip -i *.laz -merged -inside minx miny maxx maxy -poly <f> -split -o <sortie>`
    pub fn command(&self, request: &ClipRequest) -> Command {
        let bbox = &request.bounding_box;
        let mut command = Command::new(&self.exe);
        command
            .args(["-i", INPUT_PATTERN, "-merged", "-inside"])
            .arg(bbox.min_x.to_string())
            .arg(bbox.min_y.to_string())
            .arg(bbox.max_x.to_string())
            .arg(bbox.max_y.to_string())
            .arg("-poly")
            .arg(&request.boundary)
            .arg("-split")
            .arg("-o")
            .arg(&request.output)
            .current_dir(&request.input_dir)
            .env("GDAL_DATA", &self.gdal_data);
        command
    }
}

impl ClipTool for LasClip {
    fn clip(
        &self,
        request: &ClipRequest,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<(), ToolError>> + Send {
        let command = self.command(request);
        async move { process::run(command, cancel, "lasclip").await }
    }
}

/// Indexation spatiale par `lasindex` (fichiers `.lax`)
#[derive(Debug, Clone)]
pub struct LasIndex {
    exe: PathBuf,
}

impl LasIndex {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            exe: config.lastools_exe("lasindex"),
        }
    }

    /// `lasindex -i *.laz [-cores N]`, `-cores` seulement si N > 1
    pub fn command(&self, input_dir: &Path, cores: usize) -> Command {
        let mut command = Command::new(&self.exe);
        command.args(["-i", INPUT_PATTERN]).current_dir(input_dir);
        if cores > 1 {
            command.arg("-cores").arg(cores.to_string());
        }
        command
    }

    pub async fn run(
        &self,
        input_dir: &Path,
        cores: usize,
        cancel: &CancelToken,
    ) -> Result<(), ToolError> {
        info!(dir = %input_dir.display(), cores, "Running spatial indexing");
        process::run(self.command(input_dir, cores), cancel, "lasindex").await
    }
}
