//! Décision à prendre quand l'outil échoue sur un kartblad

use std::future::Future;
use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use tracing::warn;

use super::outcome::ClipFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultDecision {
    /// Compter le kartblad en échec et poursuivre
    Continue,
    /// Annuler le reste de la liste
    Abort,
}

/// Politique appliquée par l'agrégateur à chaque échec
///
/// Les tâches ne bloquent jamais: elles rendent l'échec et l'agrégateur
/// décide pendant que les autres tâches continuent.
pub trait FaultPolicy: Send + Sync {
    fn decide(&self, fault: &ClipFault) -> impl Future<Output = FaultDecision> + Send;
}

/// Choix de politique en ligne de commande
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FaultMode {
    /// Demander (y/n) sur le terminal
    #[default]
    Prompt,
    /// Ignorer tous les échecs
    Continue,
    /// S'arrêter au premier échec
    Abort,
}

impl FaultPolicy for FaultMode {
    fn decide(&self, fault: &ClipFault) -> impl Future<Output = FaultDecision> + Send {
        let mode = *self;
        let fault = fault.clone();
        async move {
            match mode {
                FaultMode::Continue => FaultDecision::Continue,
                FaultMode::Abort => FaultDecision::Abort,
                FaultMode::Prompt => prompt(fault).await,
            }
        }
    }
}

/// Pose la question dans un thread bloquant
async fn prompt(fault: ClipFault) -> FaultDecision {
    let answer = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut stderr = io::stderr();
        ask(&fault, &mut stdin.lock(), &mut stderr)
    })
    .await;

    match answer {
        Ok(Ok(decision)) => decision,
        Ok(Err(e)) => {
            warn!(error = %e, "Cannot read answer, aborting");
            FaultDecision::Abort
        }
        Err(e) => {
            warn!(error = %e, "Prompt task failed, aborting");
            FaultDecision::Abort
        }
    }
}

/// Répète la question jusqu'à une réponse valide; fin d'entrée = abandon
pub(crate) fn ask<R: BufRead, W: Write>(
    fault: &ClipFault,
    input: &mut R,
    output: &mut W,
) -> io::Result<FaultDecision> {
    loop {
        write!(
            output,
            "\nAn exception occurred when clipping kartblad {:?}:\n{}\nDo you want to ignore it and continue? (y/n) ",
            fault.kartblad, fault.detail
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(FaultDecision::Abort);
        }
        if let Some(decision) = parse_answer(&line) {
            return Ok(decision);
        }
    }
}

pub fn parse_answer(answer: &str) -> Option<FaultDecision> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(FaultDecision::Continue),
        "n" | "no" => Some(FaultDecision::Abort),
        _ => None,
    }
}
