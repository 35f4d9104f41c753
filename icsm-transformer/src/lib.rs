//! # icsm-transformer
//!
//! Transformation de jeux de données vecteur et raster entre datums australiens
//! avec les grilles NTv2 officielles de l'ICSM.
//!
//! ## Features
//!
//! - Catalogue des transformations (crate `icsm-catalog`)
//! - Téléchargement des grilles à la demande, validé par taille
//! - Reprojection vecteur en deux passes quand la cible est une définition PROJ
//! - Warp raster plus-proche-voisin
//! - Moteur GDAL optionnel (feature `gdal`)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Candidats pour un CRS source
//! icsm-transformer catalog --source EPSG:28356
//!
//! # Pré-télécharger les grilles
//! icsm-transformer fetch-grids
//!
//! # Transformer un shapefile AGD66 / AMG zone 55 vers GDA94 / MGA
//! icsm-transformer transform --input roads.shp --output roads_gda94.shp
//! ```

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod grids;
pub mod shell;
pub mod workflow;

pub use config::Settings;
pub use driver::ReprojectionDriver;
pub use engine::{DatasetKind, EngineError, GeoEngine, Resampling, WarpOptions};
pub use error::WorkflowError;
pub use grids::{GridProvisioner, HttpGridProvisioner};
pub use shell::{ConsoleShell, Severity, Shell};
pub use workflow::{Session, Workflow};
