//! Définition et implémentation des commandes CLI
//!
//! La CLI joue le rôle de la couche de présentation:
//! - `catalog`: clés du catalogue ou candidats d'un CRS source
//! - `describe`: texte d'état d'une transformation
//! - `fetch-grids`: téléchargement des grilles NTv2
//! - `transform`: processus complet (moteur GDAL requis)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use icsm_catalog::{GridFile, Resolver};
use icsm_transformer::grids::GridProvisioner;
use icsm_transformer::shell::html_to_text;
use icsm_transformer::{HttpGridProvisioner, Settings};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// List catalog keys, or the candidate transforms of one source CRS
    Catalog {
        /// Source CRS (e.g., EPSG:28356)
        #[arg(long)]
        source: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Describe the transform selected for a source CRS
    Describe {
        /// Source CRS (e.g., EPSG:20249)
        crs: String,

        /// Candidate index (0 = default destination)
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Download NTv2 grids into the grid directory
    FetchGrids {
        /// Only this grid file (e.g., A66_National_13_09_01.gsb)
        #[arg(long)]
        grid: Option<String>,
    },

    /// Transform a vector or raster dataset
    Transform {
        /// Input dataset
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (default: <input>_transformed.shp|.tiff)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Candidate index (default: first destination)
        #[arg(long)]
        index: Option<usize>,

        /// Do not reopen the result as a layer
        #[arg(long)]
        no_load: bool,
    },
}

/// Exécute la commande catalog
pub fn cmd_catalog(settings: &Settings, source: Option<&str>, json: bool) -> Result<()> {
    let catalog = settings.build_catalog()?;

    match source {
        Some(key) => {
            let transforms = catalog
                .get(key)
                .with_context(|| format!("The CRS {} is not supported", key))?;
            if json {
                println!("{}", serde_json::to_string_pretty(transforms)?);
                return Ok(());
            }
            println!("=== {} ===", key);
            for (i, t) in transforms.iter().enumerate() {
                let grid = t
                    .grid
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("[{}] {} -> {} (grid: {})", i, t.name, t.target_name, grid);
            }
        }
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.as_ref())?);
                return Ok(());
            }
            for (key, transforms) in catalog.iter() {
                println!("{:<12} {} transform(s)", key, transforms.len());
            }
            println!("{} source CRS supported", catalog.len());
        }
    }

    Ok(())
}

/// Exécute la commande describe
pub fn cmd_describe(settings: &Settings, crs: &str, index: usize) -> Result<()> {
    let mut resolver = Resolver::new(settings.build_catalog()?);
    resolver.select_source_crs(crs)?;
    resolver.select_candidate(Some(index))?;

    println!("{}", html_to_text(&resolver.describe_selected()));
    Ok(())
}

/// Exécute la commande fetch-grids
pub fn cmd_fetch_grids(settings: &Settings, grid: Option<&str>) -> Result<()> {
    let grids: Vec<GridFile> = match grid {
        Some(name) => match GridFile::from_file_name(name) {
            Some(grid) => vec![grid],
            None => bail!(
                "Unknown grid: {}. Use one of: {}",
                name,
                GridFile::ALL.map(GridFile::file_name).join(", ")
            ),
        },
        None => GridFile::ALL.to_vec(),
    };

    let provisioner = HttpGridProvisioner::from_settings(settings);
    let mut failed = 0;

    for grid in &grids {
        let path = settings.grid_dir.join(grid.file_name());
        if provisioner.ensure_grid_available(&path) {
            println!("OK      {}", path.display());
        } else {
            println!("FAILED  {}", path.display());
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} grid(s) could not be downloaded", failed);
    }
    info!(count = grids.len(), dir = %settings.grid_dir.display(), "Grids available");
    Ok(())
}

/// Exécute la commande transform
#[cfg(feature = "gdal")]
pub fn cmd_transform(
    settings: &Settings,
    input: &Path,
    output: Option<PathBuf>,
    index: Option<usize>,
    no_load: bool,
) -> Result<()> {
    use icsm_transformer::engine::GdalEngine;
    use icsm_transformer::{ConsoleShell, Workflow};

    let mut settings = settings.clone();
    if no_load {
        settings.load_result = false;
    }

    let catalog = settings.build_catalog()?;
    let grids = HttpGridProvisioner::from_settings(&settings);
    let mut workflow = Workflow::new(catalog, GdalEngine::new(), grids, settings);
    let mut shell = ConsoleShell::default();

    match workflow.run(input, index, output, &mut shell) {
        Some(written) => {
            info!(output = %written.display(), "Transformation complete");
            Ok(())
        }
        None => bail!("No output written for {}", input.display()),
    }
}

/// Exécute la commande transform
#[cfg(not(feature = "gdal"))]
pub fn cmd_transform(
    _settings: &Settings,
    input: &Path,
    _output: Option<PathBuf>,
    _index: Option<usize>,
    _no_load: bool,
) -> Result<()> {
    warn!(input = %input.display(), "No geospatial engine available");
    bail!(
        "Transforming datasets requires the 'gdal' feature. \
         Build with: cargo build --features gdal"
    )
}
