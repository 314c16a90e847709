//! Génération du fichier kartblad par une macro Fysak

use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use tokio::process::Command;
use tracing::info;

use super::{process, ToolError};
use crate::cancel::CancelToken;
use crate::config::ToolConfig;

/// Macro Fysak: ouvre l'AOI, découpe en kartblad 1:1000 dans la zone UTM
/// et enregistre le résultat au format SOSI
pub const MACRO_TEMPLATE: &str = "
FysakVersjon >= K1.1

UTFØR

.Fil/Datafil
..Steng 1
!..Bakgrunn 1
..NyIndeks 0
..Datafil <AOI>

.Tegn/Base

.Fil/NyDatafil
..Datafil <outfile>
..Innhold Geodata
..Format SOSI
..Steng 0

.Dig/Kartbladinnd
..Sone <UTMzone>
..Base 1
..Målestokk 1000

.Fil/Utelat
..AlleFramgrunn 1
..SlettIndeks 1
..Rens 1

.Fil/Avslutt
..SlettIndeks 1
..Rens 1";

/// Remplit les champs `<AOI>`, `<outfile>` et `<UTMzone>` de la macro
pub fn render_macro(aoi: &Path, outfile: &Path, utm_zone: u32) -> String {
    MACRO_TEMPLATE
        .replace("<AOI>", &aoi.display().to_string())
        .replace("<outfile>", &outfile.display().to_string())
        .replace("<UTMzone>", &utm_zone.to_string())
}

#[derive(Debug, Clone)]
pub struct Fysak {
    exe: PathBuf,
}

impl Fysak {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            exe: config.fysak_exe(),
        }
    }

    /// Produit `outfile`, le fichier SOSI des kartblad couvrant `aoi`
    ///
    /// La macro est écrite en windows-1252 dans un `.mko` temporaire,
    /// supprimé au retour.
    pub async fn make_kartblad_file(
        &self,
        aoi: &Path,
        outfile: &Path,
        utm_zone: u32,
        cancel: &CancelToken,
    ) -> Result<(), ToolError> {
        let script = render_macro(aoi, outfile, utm_zone);
        let (encoded, _, _) = WINDOWS_1252.encode(&script);

        let mut mko = tempfile::Builder::new()
            .prefix("kartblad-")
            .suffix(".mko")
            .tempfile()?;
        mko.write_all(&encoded)?;
        mko.flush()?;

        let mut command = Command::new(&self.exe);
        command.arg("/m").arg(mko.path());
        if let Some(dir) = mko.path().parent() {
            command.current_dir(dir);
        }

        info!(aoi = %aoi.display(), zone = utm_zone, "Running Fysak: make kartblad file");
        let result = process::run(command, cancel, "fysak").await;
        drop(mko);
        result
    }
}
