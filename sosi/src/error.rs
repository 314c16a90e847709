//! Types d'erreurs pour le crate sosi

use thiserror::Error;

/// Erreurs fatales pouvant survenir lors de la lecture d'un fichier SOSI
///
/// Une erreur de ce type interrompt la lecture complète du document: aucun
/// kartblad n'est produit. Les problèmes limités à une seule `.FLATE` ne
/// passent pas par ce type (voir [`crate::DropReason`]).
#[derive(Debug, Error)]
pub enum SosiError {
    /// Erreur d'I/O lors de la lecture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pas de bloc `.HODE` dans le document
    #[error("Missing .HODE header block")]
    MissingHeader,

    /// Pas d'attribut `...ENHET` dans l'en-tête
    #[error("Missing \"ENHET\" attribute in .HODE header")]
    MissingUnitAttribute,

    /// Valeur de `...ENHET` non numérique ou non positive
    #[error("The \"ENHET\" attribute does not have a valid value: {0:?}")]
    InvalidUnitValue(String),

    /// `...ORIGO-NØ` présent mais ne contenant pas deux entiers
    #[error("The \"ORIGO-NØ\" attribute does not have a valid value: {0:?}")]
    InvalidOrigin(String),

    /// `...KOORDSYS` présent mais non entier
    #[error("The \"KOORDSYS\" attribute does not have a valid value: {0:?}")]
    InvalidCoordinateSystem(String),

    /// `...KOORDSYS` absent alors que l'appelant en a besoin
    #[error("Missing \"KOORDSYS\" attribute in .HODE header")]
    MissingCoordinateSystem,

    /// Erreur rattachée au fichier en cours de lecture
    #[error("{path}: {source}")]
    InFile {
        path: String,
        #[source]
        source: Box<SosiError>,
    },
}

impl SosiError {
    /// Rattache l'erreur au fichier qui l'a produite
    pub fn in_file(self, path: impl Into<String>) -> Self {
        match self {
            already @ Self::InFile { .. } => already,
            other => Self::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Erreur d'origine, sans le contexte de fichier
    pub fn root(&self) -> &SosiError {
        match self {
            Self::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_file_mentions_path_and_attribute() {
        let err = SosiError::MissingUnitAttribute.in_file("/tmp/kartblad.sos");
        let message = err.to_string();
        assert!(message.contains("/tmp/kartblad.sos"));
        assert!(message.contains("ENHET"));
        assert!(matches!(err.root(), SosiError::MissingUnitAttribute));
    }

    #[test]
    fn test_in_file_is_not_nested_twice() {
        let err = SosiError::MissingHeader.in_file("a.sos").in_file("b.sos");
        assert_eq!(err.to_string(), "a.sos: Missing .HODE header block");
    }
}
