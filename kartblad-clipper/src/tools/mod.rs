//! Adaptateurs vers les outils externes (LAStools, Fysak)
//!
//! Chaque outil est lancé comme processus enfant via `tokio::process`,
//! tué si l'annulation est demandée.

pub mod boundary;
pub mod fysak;
pub mod lastools;
pub mod process;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitStatus;

use sosi::BoundingBox;
use thiserror::Error;

use crate::cancel::CancelToken;

pub use boundary::{BoundaryFile, BoundaryWriter, ShapefileBoundaryWriter};
pub use fysak::Fysak;
pub use lastools::{LasClip, LasIndex};

/// Erreurs des outils externes
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program} was cancelled")]
    Cancelled { program: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("boundary file: {0}")]
    Boundary(String),
}

impl ToolError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ToolError::Cancelled { .. })
    }
}

/// Un découpage: entrée, polygone, emprise et sortie attendue
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    /// Dossier contenant les `.laz` source
    pub input_dir: PathBuf,
    /// Fichier polygone écrit par un `BoundaryWriter`
    pub boundary: PathBuf,
    pub bounding_box: BoundingBox,
    /// `<output_dir>/<nom>.laz`; l'outil produit `<nom>_<n>.laz`
    pub output: PathBuf,
}

/// Outil de découpage des nuages de points
pub trait ClipTool: Send + Sync + 'static {
    fn clip(
        &self,
        request: &ClipRequest,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<(), ToolError>> + Send;
}
