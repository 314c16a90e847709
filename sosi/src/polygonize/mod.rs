//! Reconstruction des kartblad à partir des `.FLATE` et de leurs courbes

mod graph;
pub mod ring;

pub use graph::CurveGraph;

use std::collections::HashSet;

use geo::{Coord, Polygon};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::geometry::{distinct_vertex_count, BoundingBox};
use crate::types::{AreaFeature, DropReason, DroppedArea, Document, Kartblad, KartbladSet};

/// Construit le kartblad d'une `.FLATE`
///
/// Le premier anneau fermé (dans l'ordre des références) devient le contour
/// extérieur. Les anneaux supplémentaires ne sont pas des trous: ils sont
/// ignorés.
pub fn polygonize(area: &AreaFeature, graph: &CurveGraph) -> Result<Kartblad, DropReason> {
    if !is_valid_name(&area.name) {
        return Err(DropReason::InvalidName);
    }
    let curves = graph.resolve(&area.curve_refs)?;
    let paths: Vec<&[Coord]> = curves.iter().map(|c| c.points.as_slice()).collect();

    let rings = ring::closed_rings(&paths);
    if rings.is_empty() {
        return Err(DropReason::NoClosedRing);
    }

    let ring_count = rings.len();
    let exterior = rings
        .into_iter()
        .find(|ring| distinct_vertex_count(ring) >= 3)
        .ok_or(DropReason::DegenerateRing)?;

    if ring_count > 1 {
        debug!(kartblad = %area.name, rings = ring_count, "Keeping only the first closed ring");
    }

    let polygon = Polygon::new(exterior, vec![]);
    let bounding_box = BoundingBox::from_polygon(&polygon).ok_or(DropReason::DegenerateRing)?;

    Ok(Kartblad {
        name: area.name.clone(),
        polygon,
        bounding_box,
    })
}

/// Le nom sert de nom de fichier de sortie: il doit rester dans le dossier
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(&['/', '\\', ':', '\0'][..])
}

/// Construit tous les kartblad d'un document, dans l'ordre des `.FLATE`
///
/// Chaque surface écartée est signalée par un warning et rapportée dans
/// [`KartbladSet::dropped`]. Pour un nom répété, le premier kartblad
/// construit est conservé.
pub fn build_kartblad(document: &Document) -> KartbladSet {
    let results: Vec<Result<Kartblad, DropReason>> = document
        .areas
        .par_iter()
        .map(|area| polygonize(area, &document.curves))
        .collect();

    let mut set = KartbladSet::default();
    let mut names: HashSet<String> = HashSet::new();

    for (area, result) in document.areas.iter().zip(results) {
        let outcome = result.and_then(|kartblad| {
            if names.insert(kartblad.name.clone()) {
                Ok(kartblad)
            } else {
                Err(DropReason::DuplicateName)
            }
        });

        match outcome {
            Ok(kartblad) => set.kartblad.push(kartblad),
            Err(reason) => {
                warn!(kartblad = %area.name, reason = %reason, "Dropping area feature");
                set.dropped.push(DroppedArea {
                    name: area.name.clone(),
                    reason,
                });
            }
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurveFeature;

    fn curve(id: &str, points: &[(f64, f64)]) -> CurveFeature {
        CurveFeature {
            id: id.to_string(),
            points: points.iter().map(|&(x, y)| Coord { x, y }).collect(),
        }
    }

    fn area(name: &str, refs: &[&str]) -> AreaFeature {
        AreaFeature {
            name: name.to_string(),
            curve_refs: refs.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn square_graph() -> CurveGraph {
        CurveGraph::from_curves(vec![
            curve("1", &[(0.0, 0.0), (2.0, 0.0), (2.0, 3.0)]),
            curve("2", &[(2.0, 3.0), (0.0, 3.0), (0.0, 0.0)]),
            curve("3", &[(10.0, 10.0), (11.0, 10.0)]),
            curve("4", &[(20.0, 20.0), (21.0, 20.0)]),
            curve("5", &[(5.0, 5.0), (6.0, 5.0), (5.0, 5.0)]),
        ])
    }

    #[test]
    fn test_polygonize_square() {
        let kartblad = polygonize(&area("33-1", &["1", "2"]), &square_graph()).unwrap();
        assert_eq!(kartblad.name, "33-1");
        assert_eq!(kartblad.bounding_box.as_tuple(), (0.0, 0.0, 2.0, 3.0));
        assert!(kartblad.polygon.interiors().is_empty());
        assert!(kartblad.polygon.exterior().is_closed());
    }

    #[test]
    fn test_polygonize_open_curves() {
        let result = polygonize(&area("x", &["3", "4"]), &square_graph());
        assert_eq!(result.unwrap_err(), DropReason::NoClosedRing);
    }

    #[test]
    fn test_polygonize_unknown_curve() {
        let result = polygonize(&area("x", &["1", "2", "99"]), &square_graph());
        assert_eq!(result.unwrap_err(), DropReason::UnknownCurve("99".to_string()));
    }

    #[test]
    fn test_polygonize_degenerate_ring() {
        let result = polygonize(&area("x", &["5"]), &square_graph());
        assert_eq!(result.unwrap_err(), DropReason::DegenerateRing);
    }

    #[test]
    fn test_polygonize_keeps_open_chain_out() {
        let kartblad = polygonize(&area("x", &["3", "1", "2"]), &square_graph()).unwrap();
        assert_eq!(kartblad.bounding_box.as_tuple(), (0.0, 0.0, 2.0, 3.0));
    }

    #[test]
    fn test_polygonize_ignores_dangling_curves() {
        let graph = CurveGraph::from_curves(vec![
            curve("1", &[(0.0, 0.0), (1.0, 0.0)]),
            curve("5", &[(1.0, 0.0), (3.0, -2.0)]),
            curve("2", &[(1.0, 0.0), (1.0, 1.0)]),
            curve("3", &[(1.0, 1.0), (0.0, 1.0)]),
            curve("4", &[(0.0, 1.0), (0.0, 0.0)]),
            curve("9", &[(-4.0, -4.0), (-1.0, -1.0)]),
            curve("6", &[(-1.0, -1.0), (-2.0, -1.0), (-2.0, -2.0), (-1.0, -1.0)]),
        ]);

        let square = polygonize(&area("33-1", &["1", "5", "2", "3", "4"]), &graph).unwrap();
        assert_eq!(square.bounding_box.as_tuple(), (0.0, 0.0, 1.0, 1.0));

        let island = polygonize(&area("33-2", &["9", "6"]), &graph).unwrap();
        assert_eq!(island.bounding_box.as_tuple(), (-2.0, -2.0, -1.0, -1.0));
    }

    #[test]
    fn test_polygonize_rejects_path_like_names() {
        for name in ["", "..", "../33-1", "a/b", "a\\b", "C:33-1"] {
            let result = polygonize(&area(name, &["1", "2"]), &square_graph());
            assert_eq!(result.unwrap_err(), DropReason::InvalidName, "{name:?}");
        }
        assert!(polygonize(&area("1-2.3", &["1", "2"]), &square_graph()).is_ok());
    }

    #[test]
    fn test_build_kartblad_drops_and_duplicates() {
        let document = Document {
            header: crate::types::HeaderInfo::with_scale(1.0),
            curves: square_graph(),
            areas: vec![
                area("A", &["1", "2"]),
                area("B", &["3"]),
                area("A", &["2", "1"]),
                area("C", &["42"]),
            ],
        };

        let set = build_kartblad(&document);
        let names: Vec<&str> = set.kartblad.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);

        let dropped: Vec<(&str, &DropReason)> = set
            .dropped
            .iter()
            .map(|d| (d.name.as_str(), &d.reason))
            .collect();
        assert_eq!(
            dropped,
            vec![
                ("B", &DropReason::NoClosedRing),
                ("A", &DropReason::DuplicateName),
                ("C", &DropReason::UnknownCurve("42".to_string())),
            ]
        );
    }
}
