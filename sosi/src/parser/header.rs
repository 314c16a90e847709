//! Lecture du bloc `.HODE`

use tracing::{debug, info};

use super::lexer::Element;
use super::parse_number;
use crate::types::HeaderInfo;
use crate::SosiError;

/// Extrait l'unité, l'origine et le système de coordonnées de l'en-tête
pub fn parse(elements: &[Element<'_>]) -> Result<HeaderInfo, SosiError> {
    let hode = elements
        .iter()
        .find(|e| e.level == 1 && e.tag == "HODE")
        .ok_or(SosiError::MissingHeader)?;

    info!("Finding the units of the SOSI file");
    let unit = hode
        .find("ENHET")
        .ok_or(SosiError::MissingUnitAttribute)?;
    let unit_scale = unit
        .tokens()
        .next()
        .and_then(parse_number)
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| SosiError::InvalidUnitValue(unit.value.to_string()))?;

    let origin = match hode.find("ORIGO-NØ") {
        Some(element) => Some(parse_origin(element)?),
        None => None,
    };

    let coordinate_system_code = match hode.find("KOORDSYS") {
        Some(element) => {
            let raw = element.tokens().next().unwrap_or("");
            let code = raw
                .parse::<u32>()
                .map_err(|_| SosiError::InvalidCoordinateSystem(element.value.to_string()))?;
            Some(code)
        }
        None => None,
    };

    let charset = hode
        .find("TEGNSETT")
        .map(|e| e.value.trim_matches('"').to_string())
        .filter(|s| !s.is_empty());

    debug!(
        unit_scale,
        origin = ?origin,
        koordsys = ?coordinate_system_code,
        charset = ?charset,
        "Parsed .HODE"
    );

    Ok(HeaderInfo {
        unit_scale,
        origin,
        coordinate_system_code,
        charset,
    })
}

/// `...ORIGO-NØ <nord> <est>`
fn parse_origin(element: &Element<'_>) -> Result<(i64, i64), SosiError> {
    let invalid = || SosiError::InvalidOrigin(element.value.to_string());
    let mut tokens = element.tokens();

    let north = tokens.next().and_then(|t| t.parse::<i64>().ok());
    let east = tokens.next().and_then(|t| t.parse::<i64>().ok());

    match (north, east) {
        (Some(north), Some(east)) => Ok((north, east)),
        _ => Err(invalid()),
    }
}
