//! Résultat d'une tâche de découpage et comptage

use std::fmt;

use serde::Serialize;

/// Catégorie finale d'un kartblad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipOutcome {
    /// Un fichier de sortie a été produit et renommé
    Clipped,
    /// Aucun point dans le polygone
    Empty,
    /// L'outil a échoué et l'échec a été ignoré
    Failed,
}

impl fmt::Display for ClipOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClipOutcome::Clipped => "clipped",
            ClipOutcome::Empty => "empty",
            ClipOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Nombre de kartblad par catégorie
///
/// Le comptage est commutatif: l'ordre de complétion n'a pas d'effet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub clipped: usize,
    pub empty: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: ClipOutcome) {
        *self.slot(outcome) += 1;
    }

    pub fn total(&self) -> usize {
        self.clipped + self.empty + self.failed
    }

    fn slot(&mut self, outcome: ClipOutcome) -> &mut usize {
        match outcome {
            ClipOutcome::Clipped => &mut self.clipped,
            ClipOutcome::Empty => &mut self.empty,
            ClipOutcome::Failed => &mut self.failed,
        }
    }
}

impl Extend<ClipOutcome> for OutcomeCounts {
    fn extend<I: IntoIterator<Item = ClipOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}

impl FromIterator<ClipOutcome> for OutcomeCounts {
    fn from_iter<I: IntoIterator<Item = ClipOutcome>>(iter: I) -> Self {
        let mut counts = Self::default();
        counts.extend(iter);
        counts
    }
}

/// Échec de l'outil sur un kartblad
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipFault {
    pub kartblad: String,
    pub detail: String,
}

impl ClipFault {
    pub fn new(kartblad: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            kartblad: kartblad.into(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for ClipFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kartblad {}: {}", self.kartblad, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClipOutcome::*;

    #[test]
    fn test_record() {
        let mut counts = OutcomeCounts::default();
        counts.record(Clipped);
        counts.record(Clipped);
        counts.record(Empty);
        assert_eq!(counts.clipped, 2);
        assert_eq!(counts.empty, 1);
        assert_eq!(counts.failed, 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_order_does_not_matter() {
        let forward: OutcomeCounts = [Clipped, Empty, Failed, Clipped].into_iter().collect();
        let backward: OutcomeCounts = [Clipped, Failed, Empty, Clipped].into_iter().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_display() {
        assert_eq!(Clipped.to_string(), "clipped");
        let fault = ClipFault::new("33-1", "lasclip exited with exit status: 1");
        assert_eq!(fault.to_string(), "kartblad 33-1: lasclip exited with exit status: 1");
    }
}
