//! Résolution de la transformation pour le CRS d'un fichier d'entrée

use std::sync::Arc;

use tracing::{debug, info};

use crate::{Catalog, ResolveError, Transform};

/// Message affiché tant qu'aucun fichier valide n'est chargé
pub const CHOOSE_INPUT_PROMPT: &str = "Choose an in file to get started.";

/// Suit les candidats du CRS courant et la transformation sélectionnée
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    /// Clé du catalogue du CRS source validé
    source_key: Option<String>,
    /// Index dans les candidats de `source_key`
    selected: Option<usize>,
}

impl Resolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            source_key: None,
            selected: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Valide le CRS détecté et charge ses candidats; le premier est sélectionné.
    /// En cas d'échec l'état précédent est effacé.
    pub fn select_source_crs(&mut self, detected_crs: &str) -> Result<&[Transform], ResolveError> {
        self.clear();

        let Some(candidates) = self.catalog.get(detected_crs) else {
            info!(crs = detected_crs, "Selected CRS is NOT supported");
            return Err(ResolveError::Unsupported(detected_crs.to_string()));
        };

        info!(
            crs = detected_crs,
            candidates = candidates.len(),
            "Selected CRS is supported"
        );
        self.source_key = Some(detected_crs.to_string());
        self.selected = Some(0);
        Ok(candidates)
    }

    /// Sélectionne un candidat; `None` correspond à "rien de choisi"
    pub fn select_candidate(&mut self, index: Option<usize>) -> Result<&Transform, ResolveError> {
        let candidates = self.candidates();
        if candidates.is_empty() {
            return Err(ResolveError::NoCandidates);
        }
        let Some(index) = index else {
            return Err(ResolveError::NoCandidates);
        };
        if index >= candidates.len() {
            return Err(ResolveError::IndexOutOfRange {
                index,
                len: candidates.len(),
            });
        }

        debug!(index, "Candidate selected");
        self.selected = Some(index);
        Ok(&self.candidates()[index])
    }

    /// Candidats du CRS courant (vide si aucun)
    pub fn candidates(&self) -> &[Transform] {
        self.source_key
            .as_deref()
            .and_then(|key| self.catalog.get(key))
            .unwrap_or(&[])
    }

    /// Libellés des cibles, pour la liste déroulante
    pub fn candidate_names(&self) -> Vec<String> {
        self.candidates()
            .iter()
            .map(|t| t.target_name.clone())
            .collect()
    }

    pub fn source_key(&self) -> Option<&str> {
        self.source_key.as_deref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Transform> {
        self.selected.and_then(|i| self.candidates().get(i))
    }

    /// Texte d'état décrivant la transformation sélectionnée
    pub fn describe_selected(&self) -> String {
        match self.selected() {
            Some(t) => format!(
                "Source CRS is {}<br>Destination CRS is {}<br><br>Transforming from {} {}",
                t.source_name, t.target_name, t.name, t.grid_text
            ),
            None => CHOOSE_INPUT_PROMPT.to_string(),
        }
    }

    /// Oublie le CRS courant et la sélection (changement de fichier d'entrée)
    pub fn clear(&mut self) {
        self.source_key = None;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(Catalog::australian().unwrap()))
    }

    #[test]
    fn test_select_supported_crs() {
        let mut resolver = resolver();
        let candidates = resolver.select_source_crs("EPSG:20249").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target_code, 28349);
        assert_eq!(resolver.selected_index(), Some(0));
        assert_eq!(resolver.selected().unwrap().target_code, 28349);
    }

    #[test]
    fn test_unsupported_clears_previous_state() {
        let mut resolver = resolver();
        resolver.select_source_crs("EPSG:28356").unwrap();
        resolver.select_candidate(Some(1)).unwrap();

        let err = resolver.select_source_crs("EPSG:9999").unwrap_err();
        assert_eq!(err, ResolveError::Unsupported("EPSG:9999".into()));
        assert!(resolver.candidates().is_empty());
        assert!(resolver.selected().is_none());
        assert_eq!(resolver.describe_selected(), CHOOSE_INPUT_PROMPT);
    }

    #[test]
    fn test_select_candidate() {
        let mut resolver = resolver();
        resolver.select_source_crs("EPSG:28356").unwrap();

        let t = resolver.select_candidate(Some(1)).unwrap();
        assert_eq!(t.name, "GDA94 to AGD84");
        assert_eq!(resolver.selected().unwrap().target_code, 20356);

        assert_eq!(
            resolver.select_candidate(Some(10)).unwrap_err(),
            ResolveError::IndexOutOfRange { index: 10, len: 4 }
        );
        // La sélection précédente est conservée
        assert_eq!(resolver.selected_index(), Some(1));
    }

    #[test]
    fn test_select_candidate_without_list() {
        let mut resolver = resolver();
        assert_eq!(
            resolver.select_candidate(Some(0)).unwrap_err(),
            ResolveError::NoCandidates
        );
        assert_eq!(
            resolver.select_candidate(None).unwrap_err(),
            ResolveError::NoCandidates
        );
        assert!(resolver.selected().is_none());
    }

    #[test]
    fn test_describe_selected() {
        let mut resolver = resolver();
        assert_eq!(resolver.describe_selected(), CHOOSE_INPUT_PROMPT);

        resolver.select_source_crs("EPSG:4202").unwrap();
        let text = resolver.describe_selected();
        assert!(text.starts_with("Source CRS is AGD66 Latitude and Longitude [EPSG:4202]"));
        assert!(text.contains("Destination CRS is GDA94 Latitude and Longitude [EPSG:4283]"));
        assert!(text.contains("Transforming from AGD66 to GDA94 using NTv2 grid"));
    }

    #[test]
    fn test_candidate_names() {
        let mut resolver = resolver();
        resolver.select_source_crs("EPSG:7844").unwrap();
        assert_eq!(
            resolver.candidate_names(),
            [
                "GDA94 Latitude and Longitude (Conformal and distortion) [EPSG:4283]",
                "GDA94 Latitude and Longitude (Conformal only) [EPSG:4283]",
            ]
        );
    }
}
