//! Pilote de reprojection
//!
//! Vecteur: affectation du CRS source, passe intermédiaire optionnelle vers une
//! cible PROJ personnalisée puis ré-étiquetage EPSG, et écriture finale.
//! Raster: une seule copie warpée, puis tampon des métadonnées EPSG si la cible
//! est un simple code.

use std::path::{Path, PathBuf};

use icsm_catalog::Transform;
use tracing::{debug, error, info};

use crate::engine::{GeoEngine, WarpOptions};
use crate::WorkflowError;

/// Nom du shapefile intermédiaire dans le répertoire temporaire
const SCRATCH_FILE: &str = "temp_file.shp";

pub struct ReprojectionDriver<'a, E: GeoEngine> {
    engine: &'a E,
    scratch_root: Option<PathBuf>,
    warp: WarpOptions,
}

impl<'a, E: GeoEngine> ReprojectionDriver<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            scratch_root: None,
            warp: WarpOptions::default(),
        }
    }

    /// Racine des répertoires temporaires (défaut: celui du système)
    pub fn scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    pub fn warp_options(mut self, warp: WarpOptions) -> Self {
        self.warp = warp;
        self
    }

    /// Nouveau répertoire temporaire, conservé après l'appel
    fn scratch_path(&self) -> Result<PathBuf, WorkflowError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("icsm-");
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(WorkflowError::Scratch)?;

        Ok(dir.keep().join(SCRATCH_FILE))
    }

    /// Reprojette un jeu vecteur vers `output`
    pub fn reproject_vector(
        &self,
        handle: &mut E::Handle,
        transform: &Transform,
        output: &Path,
    ) -> Result<(), WorkflowError> {
        info!(transform = %transform.name, output = %output.display(), "Transforming vector");

        let source = transform.source_crs();
        debug!(source = %source, "Setting source CRS");
        self.engine
            .assign_crs(handle, &source)
            .map_err(WorkflowError::Engine)?;

        let target = transform.target_epsg();

        match &transform.target_proj {
            Some(_) => {
                // Passe intermédiaire: la reprojection se fait vers la définition PROJ,
                // puis le résultat est ré-étiqueté avec le code EPSG cible.
                let intermediate = transform.target_crs();
                let scratch = self.scratch_path()?;
                debug!(scratch = %scratch.display(), target = %intermediate, "Intermediate transform");

                self.engine
                    .write_vector(handle, &scratch, &intermediate)
                    .map_err(|e| {
                        error!(error = %e, "Intermediate write failed");
                        WorkflowError::IntermediateWriteFailure(e)
                    })?;
                info!("Success on intermediate transform");

                let (_, mut relabelled) = self
                    .engine
                    .open(&scratch)
                    .map_err(WorkflowError::IntermediateWriteFailure)?;
                self.engine
                    .assign_crs(&mut relabelled, &target)
                    .map_err(WorkflowError::Engine)?;

                self.write_final(&relabelled, output, &target)
            }
            None => self.write_final(handle, output, &target),
        }
    }

    fn write_final(
        &self,
        handle: &E::Handle,
        output: &Path,
        target: &icsm_catalog::CrsSpec,
    ) -> Result<(), WorkflowError> {
        self.engine
            .write_vector(handle, output, target)
            .map_err(|e| {
                error!(error = %e, "Final write failed");
                WorkflowError::FinalWriteFailure(e)
            })?;
        info!(output = %output.display(), "Success");
        Ok(())
    }

    /// Reprojette un raster vers `output` (GeoTIFF)
    pub fn reproject_raster(
        &self,
        handle: &E::Handle,
        transform: &Transform,
        output: &Path,
    ) -> Result<(), WorkflowError> {
        info!(transform = %transform.name, output = %output.display(), "Transforming raster");

        let source = transform.source_crs();
        let target = transform.target_crs();

        self.engine
            .warp_raster(handle, output, &source, &target, &self.warp)
            .map_err(|e| {
                error!(error = %e, "Raster warp failed");
                WorkflowError::Engine(e)
            })?;

        // Cible EPSG: métadonnées de projection exactes sur la sortie
        if !transform.needs_relabel() {
            self.engine
                .stamp_crs(output, &transform.target_epsg())
                .map_err(WorkflowError::Engine)?;
        }

        info!(output = %output.display(), "Success");
        Ok(())
    }
}
