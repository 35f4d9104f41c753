//! # icsm-catalog
//!
//! Catalogue des transformations officielles ICSM entre les datums australiens
//! (AGD66, AGD84, GDA94, GDA2020), en projection MGA/AMG (zones 49 à 56) ou en
//! latitude/longitude.
//!
//! ## Features
//!
//! - Registre typé des datums (code EPSG de base + variante conforme/distorsion)
//! - Table d'adjacence des conversions supportées
//! - Catalogue développé par zone UTM, avec chaînes PROJ et grilles NTv2
//! - Résolution des candidats pour le CRS d'un fichier d'entrée
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use icsm_catalog::{Catalog, Resolver};
//!
//! let catalog = Arc::new(Catalog::australian().unwrap());
//! let mut resolver = Resolver::new(catalog);
//!
//! let candidates = resolver.select_source_crs("EPSG:20249").unwrap();
//! assert_eq!(candidates[0].target_code, 28349);
//! println!("{}", resolver.describe_selected());
//! ```

pub mod adjacency;
pub mod catalog;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod types;

pub use adjacency::{Adjacency, AdjacencyEntry};
pub use catalog::{Catalog, CatalogBuilder, DEFAULT_GRID_DIR};
pub use error::{CatalogError, ResolveError};
pub use registry::{DatumDefinition, Registry, UTM_ZONES};
pub use resolver::{Resolver, CHOOSE_INPUT_PROMPT};
pub use types::{CrsSpec, DatumId, GridFile, Transform, Variant};
