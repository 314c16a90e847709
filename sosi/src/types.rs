//! Types de données pour le crate sosi

use geo::{Coord, Polygon};
use thiserror::Error;

use crate::geometry::BoundingBox;
use crate::polygonize::CurveGraph;
use crate::SosiError;

/// Informations extraites du bloc `.HODE`
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    /// Multiplicateur des coordonnées brutes (`...ENHET`)
    pub unit_scale: f64,

    /// Décalage (nord, est) ajouté après mise à l'échelle (`...ORIGO-NØ`)
    pub origin: Option<(i64, i64)>,

    /// Code du système de coordonnées (`...KOORDSYS`)
    pub coordinate_system_code: Option<u32>,

    /// Jeu de caractères déclaré (`..TEGNSETT`)
    pub charset: Option<String>,
}

impl HeaderInfo {
    /// En-tête minimal avec une unité donnée
    pub fn with_scale(unit_scale: f64) -> Self {
        Self {
            unit_scale,
            origin: None,
            coordinate_system_code: None,
            charset: None,
        }
    }

    /// Nombre de décimales conservées après mise à l'échelle
    ///
    /// `ceil(log10(1 / ENHET))`, borné à 0 pour les unités >= 1.
    pub fn decimals(&self) -> u32 {
        let digits = (1.0 / self.unit_scale).log10();
        let nearest = digits.round();
        // 1/0.001 n'est pas exactement 1000 en flottant
        let digits = if (digits - nearest).abs() < 1e-9 {
            nearest
        } else {
            digits.ceil()
        };
        digits.max(0.0) as u32
    }

    /// Code EPSG ETRS89 / UTM correspondant à `KOORDSYS` (22 -> 25832, ...)
    pub fn epsg(&self) -> Option<u32> {
        self.coordinate_system_code.map(|code| 25810 + code)
    }

    /// Comme [`HeaderInfo::epsg`] mais obligatoire
    pub fn require_epsg(&self) -> Result<u32, SosiError> {
        self.epsg().ok_or(SosiError::MissingCoordinateSystem)
    }

    /// Zone UTM (deux derniers chiffres du code EPSG)
    pub fn utm_zone(&self) -> Option<u32> {
        self.epsg().map(|epsg| epsg % 100)
    }
}

/// Courbe `.KURVE` / `.LINJE` avec ses coordonnées corrigées (x = est, y = nord)
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFeature {
    pub id: String,
    pub points: Vec<Coord>,
}

/// Surface `.FLATE` définie par référence à des courbes
#[derive(Debug, Clone, PartialEq)]
pub struct AreaFeature {
    /// Nom du kartblad (`..R_KART`)
    pub name: String,

    /// Identifiants des courbes de bordure, dans l'ordre du fichier
    pub curve_refs: Vec<String>,
}

/// Résultat de la lecture d'un document SOSI
#[derive(Debug, Clone)]
pub struct Document {
    pub header: HeaderInfo,
    pub curves: CurveGraph,
    pub areas: Vec<AreaFeature>,
}

/// Un kartblad: polygone nommé utilisé pour découper les données laser
#[derive(Debug, Clone, PartialEq)]
pub struct Kartblad {
    pub name: String,
    pub polygon: Polygon,
    pub bounding_box: BoundingBox,
}

/// Raison pour laquelle une `.FLATE` ne produit pas de kartblad
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    /// Référence vers une courbe absente du document
    #[error("reference to unknown curve {0}")]
    UnknownCurve(String),

    /// Les courbes référencées ne forment aucun anneau fermé
    #[error("curves do not form a closed ring")]
    NoClosedRing,

    /// Anneau fermé avec moins de trois sommets distincts
    #[error("closed ring has fewer than 3 distinct vertices")]
    DegenerateRing,

    /// Nom vide ou contenant un séparateur de chemin
    #[error("kartblad name is not a valid file name")]
    InvalidName,

    /// Nom de kartblad déjà utilisé plus haut dans le document
    #[error("duplicate kartblad name")]
    DuplicateName,
}

/// Une `.FLATE` écartée et la raison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedArea {
    pub name: String,
    pub reason: DropReason,
}

/// Kartblad produits à partir d'un document, plus les surfaces écartées
#[derive(Debug, Clone, Default)]
pub struct KartbladSet {
    pub kartblad: Vec<Kartblad>,
    pub dropped: Vec<DroppedArea>,
}
