//! Types d'erreurs pour le crate icsm-catalog

use thiserror::Error;

use crate::DatumId;

/// Erreurs de construction du catalogue (registre ou table d'adjacence incohérents)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Identifiant de datum illisible
    #[error("Invalid datum identifier: {0:?}")]
    InvalidDatumId(String),

    /// Datum référencé par l'adjacence mais absent du registre
    #[error("Unknown datum in registry: {0}")]
    UnknownDatum(DatumId),

    /// Datum déclaré deux fois dans le registre
    #[error("Duplicate datum in registry: {0}")]
    DuplicateDatum(DatumId),

    /// Entrée d'adjacence sans cible
    #[error("Adjacency entry for {0} has no target")]
    EmptyTargets(DatumId),
}

/// Erreurs de résolution d'une transformation pour un fichier d'entrée
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// CRS détecté absent du catalogue
    #[error("The CRS {0} for the selected input file is not supported.")]
    Unsupported(String),

    /// Aucune liste de candidats chargée
    #[error("No candidate transforms loaded, select a valid input file first")]
    NoCandidates,

    /// Index hors de la liste des candidats
    #[error("Candidate index {index} out of range ({len} candidates)")]
    IndexOutOfRange { index: usize, len: usize },
}
