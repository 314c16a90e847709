//! Fichier polygone d'un kartblad, lu par l'outil de découpage

use std::fs;
use std::path::{Path, PathBuf};

use geo::Winding;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, PolygonRing};
use sosi::Kartblad;
use tempfile::TempPath;
use tracing::warn;

use super::ToolError;

/// Fichiers annexes d'un Shapefile
const SIDECAR_EXTENSIONS: [&str; 3] = ["shx", "dbf", "prj"];

/// Fichier temporaire et ses fichiers annexes, supprimés au drop
#[derive(Debug)]
pub struct BoundaryFile {
    path: TempPath,
    sidecars: Vec<PathBuf>,
}

impl BoundaryFile {
    pub fn new(path: TempPath, sidecars: Vec<PathBuf>) -> Self {
        Self { path, sidecars }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BoundaryFile {
    fn drop(&mut self) {
        for sidecar in &self.sidecars {
            if sidecar.exists() {
                if let Err(e) = fs::remove_file(sidecar) {
                    warn!(path = %sidecar.display(), error = %e, "Cannot remove temporary file");
                }
            }
        }
    }
}

/// Écrit le polygone d'un kartblad dans un format lisible par l'outil
pub trait BoundaryWriter: Send + Sync + 'static {
    fn write(&self, dir: &Path, kartblad: &Kartblad, epsg: u32) -> Result<BoundaryFile, ToolError>;
}

/// Shapefile d'un seul polygone (`.shp`, `.shx`, `.dbf`, `.prj`)
///
/// Format attendu par `lasclip -poly`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileBoundaryWriter;

impl BoundaryWriter for ShapefileBoundaryWriter {
    fn write(&self, dir: &Path, kartblad: &Kartblad, epsg: u32) -> Result<BoundaryFile, ToolError> {
        let path = tempfile::Builder::new()
            .prefix("kartblad-")
            .suffix(".shp")
            .tempfile_in(dir)?
            .into_temp_path();
        let sidecars = SIDECAR_EXTENSIONS
            .iter()
            .map(|ext| path.with_extension(ext))
            .collect();

        // Le garde existe avant l'écriture: un échec nettoie aussi les annexes
        let boundary = BoundaryFile::new(path, sidecars);
        write_shapefile(boundary.path(), kartblad)?;

        match etrs89_utm_wkt(epsg) {
            Some(wkt) => fs::write(boundary.path().with_extension("prj"), wkt)?,
            None => warn!(epsg, "No projection file for this EPSG code"),
        }

        Ok(boundary)
    }
}

fn write_shapefile(path: &Path, kartblad: &Kartblad) -> Result<(), ToolError> {
    let name_field =
        FieldName::try_from("name").map_err(|e| ToolError::Boundary(format!("{e:?}")))?;
    let table = TableWriterBuilder::new().add_character_field(name_field, 80);

    let mut writer = shapefile::Writer::from_path(path, table).map_err(boundary_error)?;
    let mut record = Record::default();
    record.insert(
        "name".to_string(),
        FieldValue::Character(Some(kartblad.name.clone())),
    );
    writer
        .write_shape_and_record(&outer_polygon(kartblad), &record)
        .map_err(boundary_error)?;
    drop(writer);
    Ok(())
}

fn boundary_error(e: shapefile::Error) -> ToolError {
    ToolError::Boundary(e.to_string())
}

/// Contour extérieur en sens horaire, comme l'exige le format
fn outer_polygon(kartblad: &Kartblad) -> shapefile::Polygon {
    let mut ring = kartblad.polygon.exterior().clone();
    if ring.is_ccw() {
        ring.0.reverse();
    }
    let points = ring.coords().map(|c| Point::new(c.x, c.y)).collect();
    shapefile::Polygon::new(PolygonRing::Outer(points))
}

/// WKT ESRI de ETRS89 / UTM pour les codes EPSG 25801 à 25860
fn etrs89_utm_wkt(epsg: u32) -> Option<String> {
    let zone = epsg.checked_sub(25800).filter(|z| (1..=60).contains(z))?;
    let central_meridian = i64::from(zone) * 6 - 183;
    Some(format!(
        "PROJCS[\"ETRS_1989_UTM_Zone_{zone}N\",\
         GEOGCS[\"GCS_ETRS_1989\",DATUM[\"D_ETRS_1989\",SPHEROID[\"GRS_1980\",6378137.0,298.257222101]],\
         PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]],\
         PROJECTION[\"Transverse_Mercator\"],\
         PARAMETER[\"False_Easting\",500000.0],PARAMETER[\"False_Northing\",0.0],\
         PARAMETER[\"Central_Meridian\",{central_meridian}.0],PARAMETER[\"Scale_Factor\",0.9996],\
         PARAMETER[\"Latitude_Of_Origin\",0.0],UNIT[\"Meter\",1.0]]"
    ))
}
