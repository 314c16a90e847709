//! # sosi
//!
//! Lecteur du format d'échange SOSI limité aux limites de kartblad
//! (feuilles de carte) et reconstruction de leurs polygones.
//!
//! ## Features
//!
//! - Découpage du texte en arbre d'éléments (`.HODE`, `.KURVE`, `..NØ`, ...)
//! - Unité (`...ENHET`), origine (`...ORIGO-NØ`) et système de coordonnées
//!   (`...KOORDSYS`) appliqués aux sommets
//! - Décodage UTF-8 validé par `simdutf8`, sinon selon `..TEGNSETT`
//! - Polygonisation des `.FLATE` à partir des courbes référencées
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sosi::read_kartblad;
//! use std::path::Path;
//!
//! let set = read_kartblad(Path::new("kartblad.sos"))?;
//! for kartblad in &set.kartblad {
//!     println!("{}: {}", kartblad.name, kartblad.bounding_box);
//! }
//! ```

pub mod charset;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod polygonize;
pub mod types;

pub use error::SosiError;
pub use geometry::BoundingBox;
pub use parser::{parse_bytes, parse_file, parse_str, read_header, transform_coordinate};
pub use polygonize::{build_kartblad, polygonize, CurveGraph};
pub use types::{
    AreaFeature, CurveFeature, Document, DropReason, DroppedArea, HeaderInfo, Kartblad,
    KartbladSet,
};

use std::path::Path;

/// Lit un fichier SOSI et retourne ses kartblad.
///
/// # Arguments
///
/// * `path` - Chemin vers le fichier `.sos`
///
/// # Returns
///
/// Un `KartbladSet` contenant les kartblad dans l'ordre des `.FLATE` et les
/// surfaces écartées (courbe inconnue, pas d'anneau fermé, ...).
///
/// # Errors
///
/// Retourne `SosiError` si le fichier est illisible, sans `.HODE`, ou si
/// l'unité est absente ou invalide.
pub fn read_kartblad(path: &Path) -> Result<KartbladSet, SosiError> {
    let document = parse_file(path)?;
    tracing::debug!(
        curves = document.curves.len(),
        areas = document.areas.len(),
        "Parsed SOSI document"
    );
    Ok(build_kartblad(&document))
}
