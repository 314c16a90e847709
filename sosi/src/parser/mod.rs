//! Lecteur du format d'échange SOSI
//!
//! Le document est d'abord découpé en arbre d'éléments ([`lexer`]), puis
//! l'en-tête ([`header`]) et les blocs géométriques ([`feature`]) sont lus
//! depuis cet arbre.

pub mod feature;
pub mod header;
pub mod lexer;

use std::path::Path;

use geo::Coord;
use tracing::info;

use crate::charset;
use crate::polygonize::CurveGraph;
use crate::types::{Document, HeaderInfo};
use crate::SosiError;

/// Parse un document SOSI déjà décodé
pub fn parse_str(content: &str) -> Result<Document, SosiError> {
    let elements = lexer::tokenize(content);
    let header = header::parse(&elements)?;

    info!("Extracting the geometry features");
    let features = feature::parse(&elements, &header);

    Ok(Document {
        header,
        curves: CurveGraph::from_curves(features.curves),
        areas: features.areas,
    })
}

/// Parse un document SOSI brut (UTF-8 ou jeu de caractères `..TEGNSETT`)
pub fn parse_bytes(data: &[u8]) -> Result<Document, SosiError> {
    parse_str(&charset::decode(data))
}

/// Parse un fichier SOSI
///
/// # Errors
///
/// Les erreurs sont rattachées au chemin du fichier ([`SosiError::InFile`]).
pub fn parse_file(path: &Path) -> Result<Document, SosiError> {
    info!(path = %path.display(), "Reading SOSI file");
    std::fs::read(path)
        .map_err(SosiError::from)
        .and_then(|data| parse_bytes(&data))
        .map_err(|e| e.in_file(path.display().to_string()))
}

/// Lit uniquement l'en-tête d'un fichier SOSI
pub fn read_header(path: &Path) -> Result<HeaderInfo, SosiError> {
    std::fs::read(path)
        .map_err(SosiError::from)
        .and_then(|data| {
            let text = charset::decode(&data);
            header::parse(&lexer::tokenize(&text))
        })
        .map_err(|e| e.in_file(path.display().to_string()))
}

/// Convertit un sommet brut (nord, est) en coordonnée (x = est, y = nord)
///
/// Mise à l'échelle par `ENHET`, arrondi à la précision de l'unité, puis
/// décalage par `ORIGO-NØ`: les valeurs brutes sont stockées relativement
/// à l'origine.
pub fn transform_coordinate(raw_north: f64, raw_east: f64, header: &HeaderInfo) -> Coord {
    let decimals = header.decimals();
    let mut x = round_to(raw_east * header.unit_scale, decimals);
    let mut y = round_to(raw_north * header.unit_scale, decimals);

    if let Some((origin_north, origin_east)) = header.origin {
        x += origin_east as f64;
        y += origin_north as f64;
    }

    Coord { x, y }
}

/// Arrondit à `decimals` décimales
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Parse un nombre SOSI (`+12`, `-3.5`, `100`)
#[inline]
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    fast_float::parse(raw.trim_start_matches('+')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_scale_and_origin() {
        let header = HeaderInfo {
            unit_scale: 0.01,
            origin: Some((1000, 2000)),
            coordinate_system_code: None,
            charset: None,
        };

        assert_eq!(
            transform_coordinate(0.0, 0.0, &header),
            Coord { x: 2000.0, y: 1000.0 }
        );
        assert_eq!(
            transform_coordinate(100.0, 100.0, &header),
            Coord { x: 2001.0, y: 1001.0 }
        );
        assert_eq!(
            transform_coordinate(12300.0, -250.0, &header),
            Coord { x: 1997.5, y: 1123.0 }
        );
    }

    #[test]
    fn test_transform_rounds_to_unit_precision() {
        let header = HeaderInfo::with_scale(0.001);
        let c = transform_coordinate(123_456_789.0, 7.0, &header);
        assert_eq!(c.y, 123_456.789);
        assert_eq!(c.x, 0.007);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("+12"), Some(12.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("0.01"), Some(0.01));
        assert_eq!(parse_number("x"), None);
    }
}
