//! Contrôleur du processus: fichier d'entrée → CRS → sélection → transformation
//!
//! Les gestionnaires `on_*` sont appelés par la couche de présentation; ils ne
//! retournent jamais d'erreur: tout échec est converti en texte d'état ou en
//! notification.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use icsm_catalog::{Catalog, ResolveError, Resolver, Transform, CHOOSE_INPUT_PROMPT};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::driver::ReprojectionDriver;
use crate::engine::{DatasetKind, GeoEngine};
use crate::grids::GridProvisioner;
use crate::shell::{Severity, Shell};
use crate::WorkflowError;

const DOWNLOADING: &str = "Downloading required grid file, please wait...";
const FINISHED: &str = "Finished processing...";
const UNREADABLE_INPUT: &str = "Couldn't read 'In file.'";

/// Suffixe du fichier de sortie par défaut
const DEFAULT_OUTPUT_SUFFIX: &str = "_transformed";

/// État lié au fichier d'entrée courant
pub struct Session<H> {
    pub input: PathBuf,
    /// `None`: fichier lisible mais CRS non supporté
    pub kind: Option<DatasetKind>,
    pub crs: Option<String>,
    pub output: Option<PathBuf>,
    handle: H,
}

impl<H> Session<H> {
    pub fn handle(&self) -> &H {
        &self.handle
    }
}

/// Chemin de sortie par défaut: `{stem}_transformed.shp|.tiff` à côté de l'entrée
pub fn default_output_path(input: &Path, kind: DatasetKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = match kind {
        DatasetKind::Vector => "shp",
        DatasetKind::Raster => "tiff",
    };
    input.with_file_name(format!("{}{}.{}", stem, DEFAULT_OUTPUT_SUFFIX, ext))
}

/// Force l'extension attendue: `.shp` pour un vecteur, `.tif`/`.tiff` pour un raster
pub fn normalize_output_path(path: PathBuf, kind: DatasetKind) -> PathBuf {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match (kind, ext.as_deref()) {
        (DatasetKind::Vector, Some("shp")) => path,
        (DatasetKind::Vector, _) => path.with_extension("shp"),
        (DatasetKind::Raster, Some("tif" | "tiff")) => path,
        (DatasetKind::Raster, _) => path.with_extension("tiff"),
    }
}

pub struct Workflow<E: GeoEngine, G: GridProvisioner> {
    engine: E,
    grids: G,
    resolver: Resolver,
    settings: Settings,
    session: Option<Session<E::Handle>>,
    /// Sortie choisie par l'utilisateur, indépendante du fichier d'entrée
    output: Option<PathBuf>,
}

impl<E: GeoEngine, G: GridProvisioner> Workflow<E, G> {
    pub fn new(catalog: Arc<Catalog>, engine: E, grids: G, settings: Settings) -> Self {
        Self {
            engine,
            grids,
            resolver: Resolver::new(catalog),
            settings,
            session: None,
            output: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn grids(&self) -> &G {
        &self.grids
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn session(&self) -> Option<&Session<E::Handle>> {
        self.session.as_ref()
    }

    pub fn selected(&self) -> Option<&Transform> {
        self.resolver.selected()
    }

    /// Nouveau fichier d'entrée: réinitialise la session puis valide son CRS
    pub fn on_input_selected(&mut self, path: &Path, shell: &mut dyn Shell) {
        self.session = None;
        self.resolver.clear();
        shell.set_candidate_list(&[]);

        if !path.is_file() {
            debug!(path = %path.display(), "There's no file at path. Ignoring.");
            shell.set_status_text(CHOOSE_INPUT_PROMPT);
            return;
        }

        info!(path = %path.display(), "Updating in file");
        match self.load_input(path) {
            Ok(()) => {
                shell.set_candidate_list(&self.resolver.candidate_names());
                shell.set_status_text(&self.resolver.describe_selected());
            }
            Err(e) => self.report(shell, &e),
        }
    }

    fn load_input(&mut self, path: &Path) -> Result<(), WorkflowError> {
        let (kind, handle) =
            self.engine
                .open(path)
                .map_err(|source| WorkflowError::InputUnreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
        info!(kind = %kind, "Recognised input layer");

        let crs = self.engine.detect_crs(&handle);
        let session = self.session.insert(Session {
            input: path.to_path_buf(),
            kind: Some(kind),
            crs: crs.clone(),
            output: None,
            handle,
        });

        let Some(crs) = crs else {
            session.kind = None;
            return Err(WorkflowError::UndetectedCrs);
        };

        if self.resolver.select_source_crs(&crs).is_err() {
            session.kind = None;
            return Err(WorkflowError::UnsupportedCrs(crs));
        }
        Ok(())
    }

    /// Changement de destination; `None` si rien n'est choisi dans la liste.
    /// Retourne `false` si la sélection courante n'a pas changé.
    pub fn on_candidate_selected(&mut self, index: Option<usize>, shell: &mut dyn Shell) -> bool {
        match self.resolver.select_candidate(index) {
            Ok(_) => {
                shell.set_status_text(&self.resolver.describe_selected());
                true
            }
            Err(e) => {
                debug!(error = %e, "Candidate selection rejected");
                let err = match e {
                    ResolveError::IndexOutOfRange { index, len } => {
                        WorkflowError::CandidateOutOfRange { index, len }
                    }
                    _ => WorkflowError::NoCandidates,
                };
                self.report(shell, &err);
                false
            }
        }
    }

    pub fn on_output_selected(&mut self, path: Option<PathBuf>) {
        self.output = path;
    }

    /// Validation: grille, chemin de sortie puis reprojection.
    /// Retourne le chemin écrit en cas de succès.
    pub fn on_confirm(&mut self, shell: &mut dyn Shell) -> Option<PathBuf> {
        let Some(transform) = self.ready_transform() else {
            // Le panneau d'état garde la raison (CRS non supporté, etc.)
            self.report(shell, &WorkflowError::NoTransformSelected);
            return None;
        };

        let written = match self.confirm(&transform, shell) {
            Ok(output) => {
                shell.show_message(Severity::Success, "Transformation complete.");
                if self.settings.load_result {
                    self.load_result(shell, &output);
                }
                Some(output)
            }
            Err(e) => {
                error!(error = ?e, "Transformation aborted");
                self.report(shell, &e);
                None
            }
        };
        shell.set_status_text(FINISHED);
        written
    }

    /// Processus complet en une passe: entrée, choix du candidat, sortie, validation.
    /// Un index rejeté interrompt le processus avant toute écriture.
    pub fn run(
        &mut self,
        input: &Path,
        index: Option<usize>,
        output: Option<PathBuf>,
        shell: &mut dyn Shell,
    ) -> Option<PathBuf> {
        self.on_input_selected(input, shell);
        if self.selected().is_none() {
            self.report(shell, &WorkflowError::NoTransformSelected);
            return None;
        }
        if index.is_some() && !self.on_candidate_selected(index, shell) {
            return None;
        }
        self.on_output_selected(output);
        self.on_confirm(shell)
    }

    /// Transformation sélectionnée, si la session a un type de fichier valide
    fn ready_transform(&self) -> Option<Transform> {
        let session = self.session.as_ref()?;
        session.kind?;
        self.resolver.selected().cloned()
    }

    fn confirm(&mut self, transform: &Transform, shell: &mut dyn Shell) -> Result<PathBuf, WorkflowError> {
        let session = self
            .session
            .as_mut()
            .ok_or(WorkflowError::NoTransformSelected)?;
        let kind = session.kind.ok_or(WorkflowError::NoTransformSelected)?;

        if let Some(grid) = &transform.grid {
            debug!(grid = %grid.display(), "Checking whether we need a grid file");
            if !grid.is_file() {
                shell.set_status_text(DOWNLOADING);
            }
            if !self.grids.ensure_grid_available(grid) {
                return Err(WorkflowError::GridUnavailable(grid.clone()));
            }
        }

        let output = match &self.output {
            Some(path) => normalize_output_path(path.clone(), kind),
            None => {
                debug!("No outfile set, writing to default name");
                default_output_path(&session.input, kind)
            }
        };
        session.output = Some(output.clone());

        info!(output = %output.display(), "Starting transform process");
        let driver =
            ReprojectionDriver::new(&self.engine).scratch_root(self.settings.scratch_dir.clone());
        match kind {
            DatasetKind::Vector => driver.reproject_vector(&mut session.handle, transform, &output)?,
            DatasetKind::Raster => driver.reproject_raster(&session.handle, transform, &output)?,
        }

        Ok(output)
    }

    /// Ouvre le résultat comme couche; un échec est seulement journalisé
    fn load_result(&self, shell: &mut dyn Shell, output: &Path) {
        match self.engine.open(output) {
            Ok((kind, _)) => shell.add_layer(output, kind),
            Err(e) => warn!(output = %output.display(), error = %e, "Result layer invalid"),
        }
    }

    fn report(&self, shell: &mut dyn Shell, err: &WorkflowError) {
        if err.is_status_only() {
            shell.set_status_text(&err.to_string());
            return;
        }

        shell.show_message(Severity::Critical, &err.to_string());
        if matches!(err, WorkflowError::InputUnreadable { .. }) {
            shell.set_status_text(UNREADABLE_INPUT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_vector() {
        assert_eq!(
            normalize_output_path(PathBuf::from("/o/out.geojson"), DatasetKind::Vector),
            PathBuf::from("/o/out.shp")
        );
        assert_eq!(
            normalize_output_path(PathBuf::from("/o/out.SHP"), DatasetKind::Vector),
            PathBuf::from("/o/out.SHP")
        );
        assert_eq!(
            normalize_output_path(PathBuf::from("/o/out"), DatasetKind::Vector),
            PathBuf::from("/o/out.shp")
        );
    }

    #[test]
    fn test_normalize_raster() {
        assert_eq!(
            normalize_output_path(PathBuf::from("/o/dem.tif"), DatasetKind::Raster),
            PathBuf::from("/o/dem.tif")
        );
        assert_eq!(
            normalize_output_path(PathBuf::from("/o/dem.png"), DatasetKind::Raster),
            PathBuf::from("/o/dem.tiff")
        );
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/roads.shp"), DatasetKind::Vector),
            PathBuf::from("/data/roads_transformed.shp")
        );
        assert_eq!(
            default_output_path(Path::new("/data/dem.asc"), DatasetKind::Raster),
            PathBuf::from("/data/dem_transformed.tiff")
        );
        assert_eq!(
            default_output_path(Path::new("/data/v1.2.shp"), DatasetKind::Vector),
            PathBuf::from("/data/v1.2_transformed.shp")
        );
    }
}
