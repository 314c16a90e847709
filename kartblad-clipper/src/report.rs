//! Rapport de découpage
//!
//! Ce module collecte les compteurs d'un lot, les kartblad écartés à la
//! lecture et les échecs de l'outil, pour affichage et export JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use sosi::DroppedArea;

use crate::orchestrator::{ClipFault, ClipSummary};

/// Statut global du lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Tous les kartblad traités sans échec
    Success,
    /// Des échecs ignorés, des kartblad traités
    PartialSuccess,
    /// Abandon demandé après un échec
    Aborted,
    /// Aucun kartblad traité avec succès
    Failed,
}

/// Surface écartée à la lecture du fichier kartblad
#[derive(Debug, Clone, Serialize)]
pub struct DroppedEntry {
    pub name: String,
    pub reason: String,
}

/// Rapport complet d'un lot
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Fichier de la zone d'intérêt
    pub aoi: String,
    pub epsg: u32,
    pub duration_secs: f64,
    pub status: RunStatus,

    /// Nombre de kartblad soumis au découpage
    pub kartblad_total: usize,
    pub clipped: usize,
    pub empty: usize,
    pub failed: usize,
    pub cancelled: usize,

    pub dropped: Vec<DroppedEntry>,
    pub failures: Vec<ClipFault>,
    pub aborted_by: Option<ClipFault>,
}

impl RunReport {
    pub fn new(aoi: &str, epsg: u32) -> Self {
        Self {
            aoi: aoi.to_string(),
            epsg,
            duration_secs: 0.0,
            status: RunStatus::Success,
            kartblad_total: 0,
            clipped: 0,
            empty: 0,
            failed: 0,
            cancelled: 0,
            dropped: Vec::new(),
            failures: Vec::new(),
            aborted_by: None,
        }
    }

    /// Enregistre les surfaces écartées par la polygonisation
    pub fn record_dropped(&mut self, dropped: &[DroppedArea]) {
        self.dropped.extend(dropped.iter().map(|d| DroppedEntry {
            name: d.name.clone(),
            reason: d.reason.to_string(),
        }));
    }

    /// Enregistre le bilan du découpage
    pub fn record_summary(&mut self, summary: &ClipSummary) {
        self.clipped = summary.counts.clipped;
        self.empty = summary.counts.empty;
        self.failed = summary.counts.failed;
        self.cancelled = summary.cancelled;
        self.kartblad_total = summary.counts.total() + summary.cancelled;
        self.failures = summary.failures.clone();
        self.aborted_by = summary.aborted_by.clone();
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_success = self.clipped > 0 || self.empty > 0;

        self.status = if self.aborted_by.is_some() {
            RunStatus::Aborted
        } else if self.failed > 0 && has_success {
            RunStatus::PartialSuccess
        } else if self.failed > 0 {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("{}", "-".repeat(30));
        if self.clipped > 0 {
            println!("{} kartblad used to clip the laser data.", self.clipped);
        }
        if self.empty > 0 {
            println!("{} empty kartblad.", self.empty);
        }
        if self.failed > 0 {
            println!("{} kartblad failed.", self.failed);
        }
        if self.cancelled > 0 {
            println!("{} kartblad cancelled.", self.cancelled);
        }

        if !self.dropped.is_empty() {
            println!("\n--- DROPPED AREAS ({}) ---", self.dropped.len());
            for d in self.dropped.iter().take(10) {
                println!("  {}: {}", d.name, d.reason);
            }
            if self.dropped.len() > 10 {
                println!("  ... and {} more", self.dropped.len() - 10);
            }
        }

        if !self.failures.is_empty() {
            println!("\n--- FAILURES ({}) ---", self.failures.len());
            for f in self.failures.iter().take(20) {
                println!("  [{}] {}", f.kartblad, f.detail);
            }
            if self.failures.len() > 20 {
                println!("  ... and {} more", self.failures.len() - 20);
            }
        }

        println!("\nStatus: {:?}", self.status);
        println!(
            "Elapsed time :{}",
            format_elapsed(Duration::from_secs_f64(self.duration_secs))
        );
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} clipped, {} empty, {} failed, {} cancelled",
            self.aoi, self.clipped, self.empty, self.failed, self.cancelled
        )
    }
}

/// Durée au format ` 1h 2m 3.4s`; les composantes nulles sont omises
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let hours = (total / 3600.0).floor();
    let minutes = ((total - hours * 3600.0) / 60.0).floor();
    let seconds = total - hours * 3600.0 - minutes * 60.0;

    let mut formatted = String::new();
    if hours > 0.0 {
        formatted.push_str(&format!(" {}h", hours as u64));
    }
    if minutes > 0.0 {
        formatted.push_str(&format!(" {}m", minutes as u64));
    }
    if seconds > 0.0 {
        formatted.push_str(&format!(" {:.1}s", seconds));
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::OutcomeCounts;
    use sosi::DropReason;

    fn summary(clipped: usize, empty: usize, failed: usize) -> ClipSummary {
        ClipSummary {
            counts: OutcomeCounts {
                clipped,
                empty,
                failed,
            },
            failures: (0..failed)
                .map(|i| ClipFault::new(format!("1-{i}"), "exit status: 1"))
                .collect(),
            cancelled: 0,
            aborted_by: None,
        }
    }

    #[test]
    fn test_run_report_default() {
        let report = RunReport::new("aoi.sos", 25832);
        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(report.kartblad_total, 0);
    }

    #[test]
    fn test_record_summary() {
        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_summary(&summary(3, 2, 1));
        assert_eq!(report.kartblad_total, 6);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_record_dropped() {
        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_dropped(&[DroppedArea {
            name: "33-3".to_string(),
            reason: DropReason::UnknownCurve("99".to_string()),
        }]);
        assert_eq!(report.dropped.len(), 1);
        assert!(report.dropped[0].reason.contains("99"));
    }

    #[test]
    fn test_finalize_success() {
        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_summary(&summary(3, 1, 0));
        report.finalize();
        assert_eq!(report.status, RunStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_summary(&summary(3, 0, 1));
        report.finalize();
        assert_eq!(report.status, RunStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_summary(&summary(0, 0, 2));
        report.finalize();
        assert_eq!(report.status, RunStatus::Failed);
    }

    #[test]
    fn test_finalize_aborted() {
        let mut s = summary(1, 0, 1);
        s.cancelled = 4;
        s.aborted_by = s.failures.first().cloned();

        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_summary(&s);
        report.finalize();
        assert_eq!(report.status, RunStatus::Aborted);
        assert_eq!(report.kartblad_total, 6);
    }

    #[test]
    fn test_summary() {
        let mut report = RunReport::new("aoi.sos", 25832);
        report.record_summary(&summary(100, 5, 0));
        let line = report.summary();
        assert!(line.contains("aoi.sos"));
        assert!(line.contains("100 clipped"));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = RunReport::new("aoi.sos", 25833);
        report.record_summary(&summary(1, 1, 1));
        report.finalize();
        report.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "PartialSuccess");
        assert_eq!(json["epsg"], 25833);
        assert_eq!(json["failures"][0]["kartblad"], "1-0");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs_f64(3723.4)), " 1h 2m 3.4s");
        assert_eq!(format_elapsed(Duration::from_secs(120)), " 2m");
        assert_eq!(format_elapsed(Duration::from_millis(2500)), " 2.5s");
        assert_eq!(format_elapsed(Duration::ZERO), "");
    }
}
