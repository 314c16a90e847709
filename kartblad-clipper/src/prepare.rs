//! Phase préparatoire: fichier kartblad et indexation spatiale
//!
//! Les deux commandes sont lancées ensemble; le découpage ne commence
//! qu'une fois les deux terminées.

use std::path::Path;

use tracing::info;

use crate::cancel::CancelToken;
use crate::tools::{Fysak, LasIndex, ToolError};

/// Entrées de la phase préparatoire
#[derive(Debug, Clone, Copy)]
pub struct Preparation<'a> {
    pub aoi: &'a Path,
    /// Fichier SOSI des kartblad à produire
    pub kartblad_file: &'a Path,
    pub utm_zone: u32,
    /// Dossier à indexer avec `lasindex`, si demandé
    pub index_dir: Option<&'a Path>,
    pub cores: usize,
}

/// Produit le fichier kartblad et, si demandé, indexe les données laser
pub async fn prepare(
    fysak: &Fysak,
    lasindex: &LasIndex,
    preparation: Preparation<'_>,
) -> Result<(), ToolError> {
    let cancel = CancelToken::never();

    let make_kartblad = fysak.make_kartblad_file(
        preparation.aoi,
        preparation.kartblad_file,
        preparation.utm_zone,
        &cancel,
    );
    let index = async {
        match preparation.index_dir {
            Some(dir) => lasindex.run(dir, preparation.cores, &cancel).await,
            None => Ok(()),
        }
    };

    tokio::try_join!(make_kartblad, index)?;
    info!("Preparation done");
    Ok(())
}
