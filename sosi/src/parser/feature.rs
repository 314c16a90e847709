//! Lecture des blocs `.KURVE`, `.LINJE` et `.FLATE`

use geo::Coord;
use tracing::{debug, warn};

use super::lexer::Element;
use super::{parse_number, transform_coordinate};
use crate::types::{AreaFeature, CurveFeature, HeaderInfo};

/// Types de géométrie lus dans le document
const SUPPORTED_TAGS: &[&str] = &["KURVE", "LINJE", "FLATE"];

/// Sous-blocs de coordonnées (nord, est, hauteur optionnelle)
const COORDINATE_TAGS: &[&str] = &["NØ", "NØH"];

/// Courbes et surfaces extraites d'un document
#[derive(Debug, Default)]
pub struct Features {
    pub curves: Vec<CurveFeature>,
    pub areas: Vec<AreaFeature>,
}

/// Parcourt les éléments de premier niveau et extrait les features supportées
///
/// Un bloc mal formé est ignoré avec un warning: seule une erreur d'en-tête
/// est fatale pour le document.
pub fn parse(elements: &[Element<'_>], header: &HeaderInfo) -> Features {
    let mut features = Features::default();

    for element in elements
        .iter()
        .filter(|e| e.level == 1 && SUPPORTED_TAGS.contains(&e.tag))
    {
        match element.tag {
            "FLATE" => match parse_area(element) {
                Ok(area) => {
                    debug!(kartblad = %area.name, refs = area.curve_refs.len(), "Registering references");
                    features.areas.push(area);
                }
                Err(reason) => {
                    warn!(line = element.line, tag = element.tag, reason = %reason, "Skipping feature block")
                }
            },
            _ => match parse_curve(element, header) {
                Ok(curve) => features.curves.push(curve),
                Err(reason) => {
                    warn!(line = element.line, tag = element.tag, reason = %reason, "Skipping feature block")
                }
            },
        }
    }

    features
}

/// Parse un bloc `.KURVE` / `.LINJE`
fn parse_curve(element: &Element<'_>, header: &HeaderInfo) -> Result<CurveFeature, String> {
    let id = parse_id(element.value).ok_or_else(|| format!("invalid id {:?}", element.value))?;

    let mut points: Vec<Coord> = Vec::new();
    for block in element.children_tagged(COORDINATE_TAGS) {
        for (line, text) in block.value_lines() {
            let (north, east) =
                parse_vertex(text).ok_or_else(|| format!("invalid vertex at line {}", line))?;
            points.push(transform_coordinate(north, east, header));
        }
    }

    if points.len() < 2 {
        return Err(format!("curve {} has {} vertices", id, points.len()));
    }

    Ok(CurveFeature { id, points })
}

/// Parse un bloc `.FLATE`
fn parse_area(element: &Element<'_>) -> Result<AreaFeature, String> {
    let name = element
        .find("R_KART")
        .map(|e| e.value.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "missing R_KART".to_string())?;

    let curve_refs = element
        .find("REF")
        .map(|refs| refs.tokens().filter_map(parse_reference).collect())
        .unwrap_or_default();

    Ok(AreaFeature { name, curve_refs })
}

/// `1:` -> "1"
fn parse_id(value: &str) -> Option<String> {
    let id = value.split_whitespace().next()?.trim_end_matches(':');
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// `:12`, `:-12`, `(:12` -> "12"
///
/// Le signe indique le sens de parcours de la courbe; le polygoniseur
/// oriente lui-même les courbes.
fn parse_reference(token: &str) -> Option<String> {
    let id = token
        .trim_matches(|c: char| c == '(' || c == ')')
        .strip_prefix(':')?
        .trim_start_matches('-');
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// Une ligne de sommet: 2 ou 3 nombres (nord, est, hauteur)
///
/// Les mots qui suivent (ex: `...KP 1`) sont ignorés.
fn parse_vertex(text: &str) -> Option<(f64, f64)> {
    let mut numbers = Vec::with_capacity(3);
    for word in text.split_whitespace() {
        if word.starts_with('.') {
            break;
        }
        numbers.push(parse_number(word)?);
    }

    match numbers.as_slice() {
        [north, east] | [north, east, _] => Some((*north, *east)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12:"), Some("12".to_string()));
        assert_eq!(parse_id("12"), Some("12".to_string()));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc:"), None);
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse_reference(":12"), Some("12".to_string()));
        assert_eq!(parse_reference(":-7"), Some("7".to_string()));
        assert_eq!(parse_reference("(:3"), Some("3".to_string()));
        assert_eq!(parse_reference(":4)"), Some("4".to_string()));
        assert_eq!(parse_reference("12"), None);
    }

    #[test]
    fn test_parse_vertex() {
        assert_eq!(parse_vertex("100 200"), Some((100.0, 200.0)));
        assert_eq!(parse_vertex("100 200 35"), Some((100.0, 200.0)));
        assert_eq!(parse_vertex("100 200 ...KP 1"), Some((100.0, 200.0)));
        assert_eq!(parse_vertex("100"), None);
        assert_eq!(parse_vertex("100 abc"), None);
        assert_eq!(parse_vertex("1 2 3 4"), None);
    }

    #[test]
    fn test_curve_swaps_axes() {
        let elements = tokenize(".KURVE 5:\n..NØ\n10 20\n30 40 7\n");
        let header = HeaderInfo::with_scale(1.0);
        let features = parse(&elements, &header);

        assert_eq!(features.curves.len(), 1);
        let curve = &features.curves[0];
        assert_eq!(curve.id, "5");
        assert_eq!(curve.points[0], Coord { x: 20.0, y: 10.0 });
        assert_eq!(curve.points[1], Coord { x: 40.0, y: 30.0 });
    }

    #[test]
    fn test_coordinates_on_element_line() {
        let elements = tokenize(".LINJE 2:\n..NØ 10 20\n..NØ\n30 40\n");
        let features = parse(&elements, &HeaderInfo::with_scale(1.0));
        assert_eq!(features.curves[0].points.len(), 2);
    }

    #[test]
    fn test_area_with_islands() {
        let elements =
            tokenize(".FLATE 9:\n..OBJTYPE Kartblad\n..R_KART \"33-1\"\n..REF :1 :-2\n(:3)\n..NØ\n5 5\n");
        let features = parse(&elements, &HeaderInfo::with_scale(1.0));

        assert_eq!(features.areas.len(), 1);
        assert_eq!(features.areas[0].name, "33-1");
        assert_eq!(features.areas[0].curve_refs, vec!["1", "2", "3"]);
        assert!(features.curves.is_empty());
    }

    #[test]
    fn test_malformed_blocks_are_skipped() {
        let elements = tokenize(
            ".KURVE 1:\n..NØ\n0 0\n.KURVE 2:\n..NØ\n0 0\nx y\n.FLATE 3:\n..REF :1\n.KURVE 4:\n..NØ\n0 0\n1 1\n",
        );
        let features = parse(&elements, &HeaderInfo::with_scale(1.0));
        let ids: Vec<&str> = features.curves.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["4"]);
        assert!(features.areas.is_empty());
    }
}
