//! Configuration du transformateur

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use icsm_catalog::{Adjacency, Catalog, CatalogBuilder, Registry, DEFAULT_GRID_DIR};
use serde::{Deserialize, Serialize};

/// Source S3 des grilles ICSM (le nom du fichier .gsb est ajouté à la fin)
pub const DEFAULT_GRID_SOURCE: &str = "https://s3-ap-southeast-2.amazonaws.com/transformationgrids/";

/// Taille minimale d'un téléchargement de grille considéré valide
pub const DEFAULT_MIN_GRID_BYTES: u64 = 1000;

/// Paramètres d'exécution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Répertoire local des grilles NTv2
    pub grid_dir: PathBuf,

    /// URL de base des grilles distantes
    pub grid_source: String,

    /// En dessous de cette taille, un téléchargement est jugé corrompu
    pub min_grid_bytes: u64,

    /// Ouvrir le résultat comme couche d'affichage après succès
    pub load_result: bool,

    /// Racine des répertoires temporaires (défaut: répertoire temporaire du système)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_dir: PathBuf::from(DEFAULT_GRID_DIR),
            grid_source: DEFAULT_GRID_SOURCE.to_string(),
            min_grid_bytes: DEFAULT_MIN_GRID_BYTES,
            load_result: true,
            scratch_dir: None,
        }
    }
}

impl Settings {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Fichier optionnel puis surcharges d'environnement.
    ///
    /// Un `grid_dir` relatif est résolu depuis le répertoire du fichier de
    /// configuration, ou à défaut depuis celui de l'exécutable, pour que les
    /// grilles déjà téléchargées soient retrouvées quel que soit le répertoire courant.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::load(path)?.anchored_to(path.parent()),
            None => {
                let exe = std::env::current_exe().ok();
                Self::default().anchored_to(exe.as_deref().and_then(Path::parent))
            }
        };
        settings.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Rend `grid_dir` absolu par rapport à `base` s'il est relatif
    pub fn anchored_to(mut self, base: Option<&Path>) -> Self {
        if let Some(base) = base.filter(|b| !b.as_os_str().is_empty()) {
            if self.grid_dir.is_relative() {
                self.grid_dir = base.join(&self.grid_dir);
            }
        }
        self
    }

    /// Applique `ICSM_GRID_DIR`, `ICSM_GRID_SOURCE` et `ICSM_MIN_GRID_BYTES`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = lookup("ICSM_GRID_DIR") {
            self.grid_dir = PathBuf::from(dir);
        }
        if let Some(source) = lookup("ICSM_GRID_SOURCE") {
            self.grid_source = source;
        }
        if let Some(min) = lookup("ICSM_MIN_GRID_BYTES") {
            self.min_grid_bytes = min
                .trim()
                .parse()
                .context(format!("Invalid ICSM_MIN_GRID_BYTES: {}", min))?;
        }
        Ok(self)
    }

    /// Construit le catalogue partagé avec le répertoire de grilles configuré
    pub fn build_catalog(&self) -> Result<Arc<Catalog>> {
        let registry = Registry::australian();
        let adjacency = Adjacency::australian();
        let catalog = CatalogBuilder::new(&registry, &adjacency)
            .grid_dir(&self.grid_dir)
            .build()
            .context("Failed to build the transform catalog")?;
        Ok(Arc::new(catalog))
    }
}
