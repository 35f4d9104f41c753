//! Erreurs du processus de transformation
//!
//! Toutes ces erreurs sont converties en message utilisateur par le workflow;
//! aucune ne remonte jusqu'à la couche de présentation.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Fichier ni vecteur ni raster
    #[error("Couldn't read 'in file' {} as vector or raster", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    /// CRS du fichier non identifiable
    #[error("Unable to identify the source file's CRS...")]
    UndetectedCrs,

    /// CRS absent du catalogue
    #[error("The CRS {0} for the selected input file is not supported.")]
    UnsupportedCrs(String),

    /// Aucune liste de candidats pour changer la sélection
    #[error("Unable to identify the source file's CRS...")]
    NoCandidates,

    /// Validation sans transformation sélectionnée
    #[error("No transformation available...")]
    NoTransformSelected,

    /// Index hors de la liste des destinations proposées
    #[error("Destination {index} is not available, choose one of the {len} listed.")]
    CandidateOutOfRange { index: usize, len: usize },

    /// Grille absente et téléchargement en échec
    #[error("Failed to download grid file {}. Please check your network connection and try again.", .0.display())]
    GridUnavailable(PathBuf),

    /// Impossible de créer le répertoire temporaire
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// Échec de la passe intermédiaire (vecteur)
    #[error("Transformation failed, please check your configuration.")]
    IntermediateWriteFailure(#[source] EngineError),

    /// Échec de l'écriture finale
    #[error("Transformation failed, please check your configuration.")]
    FinalWriteFailure(#[source] EngineError),

    /// Exception du moteur (warp raster)
    #[error("Transformation failed, please check your configuration. Error was: {0}")]
    Engine(#[source] EngineError),
}

impl WorkflowError {
    /// Erreur affichée dans le panneau d'état plutôt qu'en notification
    pub fn is_status_only(&self) -> bool {
        matches!(
            self,
            WorkflowError::UndetectedCrs
                | WorkflowError::UnsupportedCrs(_)
                | WorkflowError::NoCandidates
                | WorkflowError::CandidateOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            WorkflowError::UnsupportedCrs("EPSG:9999".into()).to_string(),
            "The CRS EPSG:9999 for the selected input file is not supported."
        );
        let err = WorkflowError::Engine(EngineError::Warp("boom".into()));
        assert!(err.to_string().ends_with("Error was: Raster warp failed: boom"));
        assert!(WorkflowError::GridUnavailable(PathBuf::from("grids/a.gsb"))
            .to_string()
            .contains("grids/a.gsb"));
    }

    #[test]
    fn test_status_only() {
        assert!(WorkflowError::UnsupportedCrs("EPSG:1".into()).is_status_only());
        assert!(!WorkflowError::NoTransformSelected.is_status_only());
        assert!(WorkflowError::CandidateOutOfRange { index: 5, len: 2 }.is_status_only());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = WorkflowError::CandidateOutOfRange { index: 5, len: 2 };
        assert_eq!(
            err.to_string(),
            "Destination 5 is not available, choose one of the 2 listed."
        );
        assert_ne!(err.to_string(), WorkflowError::NoCandidates.to_string());
    }
}
