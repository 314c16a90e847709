//! Graphe des courbes d'un document

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::types::{CurveFeature, DropReason};

/// Courbes `.KURVE` / `.LINJE` indexées par identifiant
#[derive(Debug, Clone, Default)]
pub struct CurveGraph {
    curves: HashMap<String, CurveFeature>,
}

impl CurveGraph {
    /// Indexe les courbes; un identifiant répété remplace le précédent
    pub fn from_curves(curves: impl IntoIterator<Item = CurveFeature>) -> Self {
        let mut map = HashMap::new();
        for curve in curves {
            if let Some(previous) = map.insert(curve.id.clone(), curve) {
                warn!(curve = %previous.id, "Duplicate curve id, keeping the last one");
            }
        }
        Self { curves: map }
    }

    pub fn get(&self, id: &str) -> Option<&CurveFeature> {
        self.curves.get(id)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Résout des références dans l'ordre, chaque courbe une seule fois
    pub fn resolve(&self, refs: &[String]) -> Result<Vec<&CurveFeature>, DropReason> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(refs.len());

        for id in refs {
            if !seen.insert(id.as_str()) {
                continue;
            }
            let curve = self
                .curves
                .get(id)
                .ok_or_else(|| DropReason::UnknownCurve(id.clone()))?;
            resolved.push(curve);
        }

        Ok(resolved)
    }
}
