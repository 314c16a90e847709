//! # kartblad-clipper
//!
//! Découpage de données laser (`.laz`) selon les kartblad (feuilles de
//! carte) couvrant une zone d'intérêt SOSI.
//!
//! ## Features
//!
//! - Fichier kartblad produit par une macro Fysak, indexation `lasindex`
//!   optionnelle en parallèle
//! - Découpage `lasclip` concurrent, borné par le nombre de cœurs
//! - Échec d'un kartblad: continuer, abandonner ou demander (y/n)
//! - Rapport console et JSON
//!
//! ## Usage CLI
//!
//! ```bash
//! kartblad-clipper -i ./laz -o ./clipped -a ./aoi.sos --run-indexing -C 8
//! kartblad-clipper -i ./laz -o ./clipped -a ./aoi.sos --on-fault continue --report run.json
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod prepare;
pub mod report;
pub mod tools;

pub use config::ToolConfig;
pub use orchestrator::{clip_many, ClipJob, ClipOutcome, ClipSummary, FaultMode, OutcomeCounts};
pub use report::{RunReport, RunStatus};
