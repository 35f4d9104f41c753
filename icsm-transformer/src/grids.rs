//! Mise à disposition des grilles NTv2
//!
//! Une grille absente est téléchargée depuis la source configurée. Un fichier
//! trop petit est considéré comme un téléchargement raté et supprimé. Aucune
//! nouvelle tentative automatique: l'utilisateur relance l'opération.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{error, info, warn};
use ureq::Agent;

use crate::config::Settings;

const CLIENT: &str = concat!("icsm-transformer/", env!("CARGO_PKG_VERSION"));

/// Garantit la présence locale d'une grille
pub trait GridProvisioner {
    /// `true` si la grille existe déjà ou vient d'être téléchargée correctement
    fn ensure_grid_available(&self, path: &Path) -> bool;
}

/// Erreurs de téléchargement
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Invalid grid path: {0}")]
    InvalidPath(String),

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Downloaded file too small ({bytes} bytes, expected at least {min})")]
    TooSmall { bytes: u64, min: u64 },
}

/// Vérifie la taille d'un téléchargement terminé
pub fn validate_download(bytes: u64, min_bytes: u64) -> Result<(), GridError> {
    if bytes < min_bytes {
        return Err(GridError::TooSmall {
            bytes,
            min: min_bytes,
        });
    }
    Ok(())
}

/// Téléchargement HTTP depuis une URL de base (S3 ICSM par défaut)
pub struct HttpGridProvisioner {
    agent: Agent,
    base_url: String,
    min_bytes: u64,
}

impl HttpGridProvisioner {
    pub fn new(base_url: impl Into<String>, min_bytes: u64) -> Self {
        Self {
            agent: Agent::new_with_defaults(),
            base_url: base_url.into(),
            min_bytes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.grid_source.clone(), settings.min_grid_bytes)
    }

    /// URL distante d'une grille: base + nom de fichier
    pub fn url_for(&self, path: &Path) -> Result<String, GridError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GridError::InvalidPath(path.display().to_string()))?;

        if self.base_url.ends_with('/') {
            Ok(format!("{}{}", self.base_url, file_name))
        } else {
            Ok(format!("{}/{}", self.base_url, file_name))
        }
    }

    /// Télécharge la grille vers `path` et retourne la taille écrite.
    /// Le contenu transite par un fichier temporaire voisin, renommé seulement
    /// une fois la taille validée: `path` n'existe jamais à moitié écrit.
    pub fn download(&self, path: &Path) -> Result<u64, GridError> {
        let url = self.url_for(path)?;
        info!(url = %url, path = %path.display(), "Updating local grid file");

        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut response = self.agent.get(&url).header("User-Agent", CLIENT).call()?;

        let partial = tempfile::Builder::new()
            .prefix(".grid-")
            .suffix(".part")
            .tempfile_in(dir)?;
        let bytes = {
            let mut writer = BufWriter::new(partial.as_file());
            let n = io::copy(&mut response.body_mut().as_reader(), &mut writer)?;
            writer.flush()?;
            n
        };

        if let Err(e) = validate_download(bytes, self.min_bytes) {
            warn!(path = %path.display(), bytes, "Discarding incomplete grid download");
            return Err(e);
        }

        partial.persist(path).map_err(|e| GridError::Io(e.error))?;
        Ok(bytes)
    }
}

impl GridProvisioner for HttpGridProvisioner {
    fn ensure_grid_available(&self, path: &Path) -> bool {
        if path.is_file() {
            return true;
        }

        match self.download(path) {
            Ok(bytes) => {
                info!(bytes, path = %path.display(), "Successfully downloaded grid file");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to download grid file");
                false
            }
        }
    }
}
