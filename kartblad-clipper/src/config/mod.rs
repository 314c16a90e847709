//! Configuration des outils externes
//!
//! Les emplacements des exécutables sont passés explicitement aux
//! adaptateurs: le PATH et l'environnement du processus ne sont jamais
//! modifiés.

use std::path::{Path, PathBuf};

/// Installation Fysak par défaut (LAStools et GDAL y sont embarqués)
pub const DEFAULT_FYSAK_PATH: &str = r"C:\Fysak";

/// Emplacements des outils externes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Dossier contenant `Fysak.exe`
    pub fysak_dir: PathBuf,

    /// Dossier contenant `lasclip` et `lasindex`
    pub lastools_dir: PathBuf,

    /// Valeur de `GDAL_DATA` transmise aux outils
    pub gdal_data: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::with_fysak_dir(DEFAULT_FYSAK_PATH)
    }
}

impl ToolConfig {
    /// Dispositions par défaut relatives à une installation Fysak
    pub fn with_fysak_dir(dir: impl Into<PathBuf>) -> Self {
        let fysak_dir = dir.into();
        Self {
            lastools_dir: fysak_dir.join("LAStools"),
            gdal_data: fysak_dir.join("GDAL").join("data"),
            fysak_dir,
        }
    }

    /// Charge la configuration depuis les variables d'environnement
    ///
    /// `FYSAK_PATH`, `LASTOOLS_PATH`, `GDAL_DATA`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = lookup("FYSAK_PATH")
            .filter(|s| !s.is_empty())
            .map(Self::with_fysak_dir)
            .unwrap_or_default();

        if let Some(dir) = lookup("LASTOOLS_PATH").filter(|s| !s.is_empty()) {
            config.lastools_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("GDAL_DATA").filter(|s| !s.is_empty()) {
            config.gdal_data = PathBuf::from(dir);
        }
        config
    }

    /// Applique les options de ligne de commande
    ///
    /// Un `--fysak-path` explicite redéfinit aussi les dossiers dérivés,
    /// sauf si `--lastools-path` est donné.
    pub fn apply_overrides(&mut self, fysak: Option<PathBuf>, lastools: Option<PathBuf>) {
        if let Some(dir) = fysak {
            *self = Self::with_fysak_dir(dir);
        }
        if let Some(dir) = lastools {
            self.lastools_dir = dir;
        }
    }

    /// Chemin de `Fysak.exe`
    pub fn fysak_exe(&self) -> PathBuf {
        self.fysak_dir.join("Fysak.exe")
    }

    /// Chemin d'un exécutable LAStools (`lasclip`, `lasindex`)
    pub fn lastools_exe(&self, name: &str) -> PathBuf {
        self.lastools_dir
            .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
    }

    pub fn gdal_data(&self) -> &Path {
        &self.gdal_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ToolConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.fysak_dir, PathBuf::from(DEFAULT_FYSAK_PATH));
        assert_eq!(config.lastools_dir, Path::new(DEFAULT_FYSAK_PATH).join("LAStools"));
    }

    #[test]
    fn test_env_values() {
        let config = ToolConfig::from_lookup(lookup_from(&[
            ("FYSAK_PATH", "/opt/fysak"),
            ("GDAL_DATA", "/usr/share/gdal"),
        ]));
        assert_eq!(config.fysak_exe(), Path::new("/opt/fysak").join("Fysak.exe"));
        assert_eq!(config.lastools_dir, Path::new("/opt/fysak").join("LAStools"));
        assert_eq!(config.gdal_data(), Path::new("/usr/share/gdal"));
    }

    #[test]
    fn test_overrides() {
        let mut config = ToolConfig::from_lookup(lookup_from(&[("LASTOOLS_PATH", "/env/lastools")]));
        config.apply_overrides(None, Some(PathBuf::from("/cli/lastools")));
        assert_eq!(config.lastools_dir, PathBuf::from("/cli/lastools"));

        config.apply_overrides(Some(PathBuf::from("/cli/fysak")), None);
        assert_eq!(config.lastools_dir, Path::new("/cli/fysak").join("LAStools"));

        let exe = config.lastools_exe("lasclip");
        assert!(exe.starts_with("/cli/fysak"));
        assert!(exe.to_string_lossy().contains("lasclip"));
    }
}
