//! Reconstruction des anneaux fermés à partir de courbes ouvertes

use std::collections::HashMap;

use geo::{Coord, LineString};
use tracing::debug;

/// Clé exacte d'une extrémité de courbe
///
/// Les coordonnées sont déjà arrondies à la précision de l'unité: l'égalité
/// exacte suffit. `+ 0.0` confond `-0.0` et `0.0`.
type NodeKey = (u64, u64);

fn node_key(c: Coord) -> NodeKey {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Index extrémité -> courbes qui y commencent ou y finissent
struct Endpoints {
    nodes: HashMap<NodeKey, Vec<usize>>,
}

impl Endpoints {
    fn new(curves: &[&[Coord]]) -> Self {
        let mut nodes: HashMap<NodeKey, Vec<usize>> = HashMap::new();
        for (idx, curve) in curves.iter().enumerate() {
            let (Some(&first), Some(&last)) = (curve.first(), curve.last()) else {
                continue;
            };
            nodes.entry(node_key(first)).or_default().push(idx);
            if node_key(first) != node_key(last) {
                nodes.entry(node_key(last)).or_default().push(idx);
            }
        }
        Self { nodes }
    }

    /// Première courbe non utilisée touchant ce point (ordre des références)
    fn next_unused(&self, at: Coord, used: &[bool]) -> Option<usize> {
        self.nodes
            .get(&node_key(at))?
            .iter()
            .copied()
            .filter(|&idx| !used[idx])
            .min()
    }
}

/// Marque comme utilisées les courbes pendantes
///
/// Une courbe ouverte dont une extrémité ne touche aucune autre courbe ne
/// peut appartenir à un anneau. Le retrait est répété jusqu'à stabilité.
fn prune_dangling(curves: &[&[Coord]], used: &mut [bool]) {
    let mut degree: HashMap<NodeKey, usize> = HashMap::new();
    for curve in curves.iter().filter(|c| c.len() >= 2) {
        *degree.entry(node_key(curve[0])).or_default() += 1;
        *degree.entry(node_key(curve[curve.len() - 1])).or_default() += 1;
    }

    loop {
        let mut pruned = false;
        for (idx, curve) in curves.iter().enumerate() {
            if used[idx] || curve.len() < 2 || is_closed(curve) {
                continue;
            }
            let (first, last) = (node_key(curve[0]), node_key(curve[curve.len() - 1]));
            if degree[&first] > 1 && degree[&last] > 1 {
                continue;
            }
            used[idx] = true;
            pruned = true;
            for key in [first, last] {
                if let Some(d) = degree.get_mut(&key) {
                    *d -= 1;
                }
            }
            debug!(curve = idx, "Discarding dangling curve");
        }
        if !pruned {
            break;
        }
    }
}

/// Enchaîne les courbes par extrémités communes et retourne les anneaux fermés
///
/// Les courbes pendantes sont d'abord écartées. Chaque chaîne part de la
/// première courbe non utilisée, s'étend par sa queue (en inversant les
/// courbes si besoin) et s'arrête dès que la queue revient sur une jonction
/// de la chaîne: la boucle ainsi formée est gardée, le reste de la chaîne
/// est écarté. Les chaînes qui ne se ferment pas sont écartées.
pub fn closed_rings(curves: &[&[Coord]]) -> Vec<LineString> {
    let endpoints = Endpoints::new(curves);
    let mut used = vec![false; curves.len()];
    prune_dangling(curves, &mut used);
    let mut rings = Vec::new();

    for start in 0..curves.len() {
        if used[start] || curves[start].len() < 2 {
            continue;
        }
        used[start] = true;

        let mut ring: Vec<Coord> = curves[start].to_vec();
        let mut junctions: HashMap<NodeKey, usize> = HashMap::from([(node_key(ring[0]), 0)]);
        let mut chained = 1;
        let mut closed_at = is_closed(&ring).then_some(0);

        while closed_at.is_none() {
            let tail = ring[ring.len() - 1];
            let Some(idx) = endpoints.next_unused(tail, &used) else {
                break;
            };
            used[idx] = true;
            chained += 1;
            append(&mut ring, curves[idx]);

            let tail_key = node_key(ring[ring.len() - 1]);
            match junctions.get(&tail_key) {
                Some(&pos) => closed_at = Some(pos),
                None => {
                    junctions.insert(tail_key, ring.len() - 1);
                }
            }
        }

        match closed_at {
            Some(pos) => {
                if pos > 0 {
                    debug!(points = pos, "Discarding chain lead-in before loop");
                    ring.drain(..pos);
                }
                rings.push(LineString::new(ring));
            }
            None => debug!(curves = chained, points = ring.len(), "Discarding open chain"),
        }
    }

    rings
}

fn is_closed(ring: &[Coord]) -> bool {
    ring.len() > 2 && node_key(ring[0]) == node_key(ring[ring.len() - 1])
}

/// Ajoute une courbe en queue, le point commun n'est pas dupliqué
fn append(ring: &mut Vec<Coord>, curve: &[Coord]) {
    let tail = node_key(ring[ring.len() - 1]);
    if node_key(curve[0]) == tail {
        ring.extend(curve.iter().skip(1));
    } else {
        ring.extend(curve.iter().rev().skip(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    fn rings_of(curves: &[Vec<Coord>]) -> Vec<LineString> {
        let slices: Vec<&[Coord]> = curves.iter().map(|c| c.as_slice()).collect();
        closed_rings(&slices)
    }

    #[test]
    fn test_reconstruct_simple_ring() {
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(1.0, 0.0)],
            vec![c(1.0, 0.0), c(1.0, 1.0)],
            vec![c(1.0, 1.0), c(0.0, 1.0)],
            vec![c(0.0, 1.0), c(0.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].0.len(), 5);
        assert!(rings[0].is_closed());
    }

    #[test]
    fn test_reversed_and_unordered_curves() {
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(1.0, 0.0)],
            vec![c(0.0, 1.0), c(1.0, 1.0)],
            vec![c(0.0, 0.0), c(0.0, 1.0)],
            vec![c(1.0, 1.0), c(1.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(
            rings[0].0,
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)]
        );
    }

    #[test]
    fn test_self_closing_curve() {
        let rings = rings_of(&[vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]]);
        assert_eq!(rings.len(), 1);
    }

    #[test]
    fn test_open_chain_discarded() {
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(1.0, 0.0)],
            vec![c(5.0, 5.0), c(6.0, 6.0)],
        ]);
        assert!(rings.is_empty());
    }

    #[test]
    fn test_two_loops() {
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)],
            vec![c(5.0, 5.0), c(6.0, 5.0)],
            vec![c(6.0, 5.0), c(6.0, 6.0), c(5.0, 5.0)],
        ]);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].0[0], c(0.0, 0.0));
        assert_eq!(rings[1].0[0], c(5.0, 5.0));
    }

    #[test]
    fn test_dangling_curve_at_loop_vertex() {
        // Carré A-B-C-D avec une courbe pendante B-E référencée en second
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(1.0, 0.0)],
            vec![c(1.0, 0.0), c(2.0, -1.0)],
            vec![c(1.0, 0.0), c(1.0, 1.0)],
            vec![c(1.0, 1.0), c(0.0, 1.0)],
            vec![c(0.0, 1.0), c(0.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(
            rings[0].0,
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)]
        );
    }

    #[test]
    fn test_dangling_curve_before_self_closing_curve() {
        let rings = rings_of(&[
            vec![c(-5.0, -5.0), c(0.0, 0.0)],
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].0.len(), 4);
        assert_eq!(rings[0].0[0], c(0.0, 0.0));
    }

    #[test]
    fn test_dangling_chain_pruned_repeatedly() {
        // Deux courbes pendantes en série accrochées au triangle
        let rings = rings_of(&[
            vec![c(3.0, 3.0), c(2.0, 2.0)],
            vec![c(2.0, 2.0), c(1.0, 1.0)],
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)],
            vec![c(1.0, 1.0), c(0.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].0.len(), 4);
    }

    #[test]
    fn test_lead_in_cut_at_junction() {
        // Pont P-Q entre deux boucles: la chaîne part du pont
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(5.0, 0.0)],
            vec![c(5.0, 0.0), c(6.0, 0.0), c(6.0, 1.0), c(5.0, 0.0)],
            vec![c(0.0, 0.0), c(-1.0, 0.0), c(-1.0, 1.0), c(0.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 2);
        assert_eq!(
            rings[0].0,
            vec![c(5.0, 0.0), c(6.0, 0.0), c(6.0, 1.0), c(5.0, 0.0)]
        );
        assert_eq!(rings[1].0[0], c(0.0, 0.0));
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let rings = rings_of(&[
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)],
            vec![c(1.0, 1.0), c(-0.0, 0.0)],
        ]);
        assert_eq!(rings.len(), 1);
    }
}
