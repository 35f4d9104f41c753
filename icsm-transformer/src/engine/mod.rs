//! Capacités du moteur géospatial consommées par le pilote de reprojection
//!
//! Le moteur lit les jeux de données, détecte leur CRS, écrit les vecteurs et
//! rééchantillonne les rasters. L'implémentation GDAL est disponible avec le
//! feature `gdal`.

#[cfg(feature = "gdal")]
pub mod gdal_engine;

use std::fmt;
use std::path::{Path, PathBuf};

use icsm_catalog::CrsSpec;
use thiserror::Error;

#[cfg(feature = "gdal")]
pub use self::gdal_engine::{GdalEngine, GdalHandle};

/// Nature d'un jeu de données d'entrée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Vector,
    Raster,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Vector => f.write_str("VECTOR"),
            DatasetKind::Raster => f.write_str("RASTER"),
        }
    }
}

/// Méthode de rééchantillonnage raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    #[default]
    NearestNeighbour,
}

/// Paramètres du warp raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpOptions {
    pub resampling: Resampling,
    /// Erreur d'approximation tolérée, en pixels
    pub error_threshold: f64,
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            resampling: Resampling::NearestNeighbour,
            error_threshold: 0.125,
        }
    }
}

/// Erreurs remontées par le moteur
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ni vecteur ni raster lisible
    #[error("Couldn't read {} as vector or raster", .0.display())]
    Unreadable(PathBuf),

    /// Définition de CRS refusée
    #[error("Invalid CRS definition {crs}: {reason}")]
    InvalidCrs { crs: String, reason: String },

    /// Écriture vecteur en échec
    #[error("Error writing vector, code: {code}: {message}")]
    Write { code: i32, message: String },

    /// Échec du warp ou de la copie raster
    #[error("Raster warp failed: {0}")]
    Warp(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] ::gdal::errors::GdalError),
}

/// Moteur géospatial: lecture, affectation de CRS, écriture et warp
pub trait GeoEngine {
    /// Jeu de données ouvert, possédé par la session
    type Handle;

    /// Ouvre un fichier comme vecteur, sinon comme raster
    fn open(&self, path: &Path) -> Result<(DatasetKind, Self::Handle), EngineError>;

    /// Identifiant d'autorité du CRS (ex: "EPSG:4283"), s'il est reconnu
    fn detect_crs(&self, handle: &Self::Handle) -> Option<String>;

    /// Affecte un CRS au jeu de données, sans réécrire les données
    fn assign_crs(&self, handle: &mut Self::Handle, crs: &CrsSpec) -> Result<(), EngineError>;

    /// Écrit le jeu vecteur dans `path` (shapefile) reprojeté vers `crs`
    fn write_vector(
        &self,
        handle: &Self::Handle,
        path: &Path,
        crs: &CrsSpec,
    ) -> Result<(), EngineError>;

    /// Copie warpée (GeoTIFF) du raster de `src` vers `dst`
    fn warp_raster(
        &self,
        handle: &Self::Handle,
        path: &Path,
        src: &CrsSpec,
        dst: &CrsSpec,
        options: &WarpOptions,
    ) -> Result<(), EngineError>;

    /// Réécrit les métadonnées de projection d'un raster déjà écrit
    fn stamp_crs(&self, path: &Path, crs: &CrsSpec) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_warp_options() {
        let options = WarpOptions::default();
        assert_eq!(options.resampling, Resampling::NearestNeighbour);
        assert_eq!(options.error_threshold, 0.125);
    }

    #[test]
    fn test_unreadable_message() {
        let err = EngineError::Unreadable(PathBuf::from("/data/in.bin"));
        assert_eq!(err.to_string(), "Couldn't read /data/in.bin as vector or raster");
    }
}
