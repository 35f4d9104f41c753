//! Construction du catalogue des transformations
//!
//! Le catalogue est le produit registre × adjacence × zones UTM: pour chaque
//! CRS source exact (`EPSG:28356`, `EPSG:4202`...), la liste ordonnée des
//! transformations légales.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::registry::UTM_ZONES;
use crate::{Adjacency, AdjacencyEntry, CatalogError, DatumDefinition, Registry, Transform};

/// Répertoire des grilles par défaut, relatif au répertoire de travail
pub const DEFAULT_GRID_DIR: &str = "grids";

/// Catalogue: clé `EPSG:{code}` → transformations candidates (liste non vide)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    entries: BTreeMap<String, Vec<Transform>>,
}

impl Catalog {
    /// Construit le catalogue australien avec le répertoire de grilles par défaut
    pub fn australian() -> Result<Self, CatalogError> {
        Self::build(&Registry::australian(), &Adjacency::australian())
    }

    /// Construit le catalogue avec le répertoire de grilles par défaut
    pub fn build(registry: &Registry, adjacency: &Adjacency) -> Result<Self, CatalogError> {
        CatalogBuilder::new(registry, adjacency).build()
    }

    /// Candidats pour une clé (ex: "EPSG:20249")
    pub fn get(&self, key: &str) -> Option<&[Transform]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Transform])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ajoute des transformations sous une clé. Une clé déjà présente (variantes
    /// `c`/`d` partageant un code numérique) conserve ses entrées en tête:
    /// l'ordre de déclaration de l'adjacence fixe la priorité.
    fn insert(&mut self, key: String, transforms: Vec<Transform>) {
        self.entries.entry(key).or_default().extend(transforms);
    }
}

/// Constructeur du catalogue
pub struct CatalogBuilder<'a> {
    registry: &'a Registry,
    adjacency: &'a Adjacency,
    grid_dir: PathBuf,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(registry: &'a Registry, adjacency: &'a Adjacency) -> Self {
        Self {
            registry,
            adjacency,
            grid_dir: PathBuf::from(DEFAULT_GRID_DIR),
        }
    }

    /// Répertoire local où résident (ou seront téléchargées) les grilles
    pub fn grid_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.grid_dir = dir.into();
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        self.adjacency.validate(self.registry)?;

        let mut catalog = Catalog::default();

        for entry in self.adjacency.entries() {
            let source = self.registry.require(entry.source)?;

            if source.is_utm {
                for zone in UTM_ZONES {
                    let (key, transforms) = self.build_entry(source, entry, Some(zone))?;
                    catalog.insert(key, transforms);
                }
            } else {
                let (key, transforms) = self.build_entry(source, entry, None)?;
                catalog.insert(key, transforms);
            }
        }

        debug!(keys = catalog.len(), "Catalog built");
        Ok(catalog)
    }

    /// Construit les transformations d'une entrée d'adjacence pour une zone
    fn build_entry(
        &self,
        source: &DatumDefinition,
        entry: &AdjacencyEntry,
        zone: Option<u8>,
    ) -> Result<(String, Vec<Transform>), CatalogError> {
        let source_code = source.id.code(zone);
        let source_proj = self.render_template(source, zone);

        let transforms = entry
            .targets
            .iter()
            .map(|&target_id| {
                let target = self.registry.require(target_id)?;
                let target_code = target.id.code(zone);

                // Grille source prioritaire, sinon grille cible
                let grid = source.grid.or(target.grid);
                let grid_text = grid
                    .map(|g| {
                        format!(
                            "using NTv2 grid: '{}'<br><br>{}",
                            g.file_name(),
                            g.caveat()
                        )
                    })
                    .unwrap_or_default();

                Ok(Transform {
                    name: format!("{} to {}", source.short_name(), target.short_name()),
                    source_name: format!("{} [EPSG:{}]", source.display_name, source_code),
                    target_name: format!("{} [EPSG:{}]", target.display_name, target_code),
                    source_proj: source_proj.clone(),
                    target_proj: self.render_template(target, zone),
                    source_code,
                    target_code,
                    grid: grid.map(|g| self.grid_dir.join(g.file_name())),
                    grid_text,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok((format!("EPSG:{}", source_code), transforms))
    }

    /// Instancie le modèle PROJ d'un datum pour une zone
    fn render_template(&self, datum: &DatumDefinition, zone: Option<u8>) -> Option<String> {
        let template = datum.proj_template?;
        let mut proj = template.to_string();

        if let Some(zone) = zone {
            proj = proj.replace("{zone}", &zone.to_string());
        }
        if let Some(grid) = datum.grid {
            proj = proj.replace("{grid}", &grid_path(&self.grid_dir, grid.file_name()));
        }

        Some(proj)
    }
}

fn grid_path(dir: &Path, file_name: &str) -> String {
    dir.join(file_name).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatumId, GridFile};

    fn catalog() -> Catalog {
        Catalog::australian().unwrap()
    }

    #[test]
    fn test_every_utm_zone_present() {
        let catalog = catalog();
        for zone in UTM_ZONES {
            for base in [202, 203, 283, 78] {
                let key = format!("EPSG:{}{}", base, zone);
                assert!(catalog.contains(&key), "missing {}", key);
            }
        }
        assert!(!catalog.contains("EPSG:20248"));
        assert!(!catalog.contains("EPSG:20257"));
    }

    #[test]
    fn test_key_count() {
        // 4 sources UTM × 8 zones + 4 sources lat/lon
        assert_eq!(catalog().len(), 36);
    }

    #[test]
    fn test_agd66_zone_49() {
        let catalog = catalog();
        let transforms = catalog.get("EPSG:20249").unwrap();
        assert_eq!(transforms.len(), 1);

        let t = &transforms[0];
        assert_eq!(t.name, "AGD66 to GDA94");
        assert_eq!(t.source_name, "AGD66 / AMG [EPSG:20249]");
        assert_eq!(t.target_name, "GDA94 / MGA [EPSG:28349]");
        assert_eq!(t.source_code, 20249);
        assert_eq!(t.target_code, 28349);
        assert!(t.target_proj.is_none());
        assert!(t
            .grid
            .as_ref()
            .unwrap()
            .ends_with("A66_National_13_09_01.gsb"));

        let proj = t.source_proj.as_deref().unwrap();
        assert!(proj.contains("+zone=49 "));
        assert!(proj.contains("+nadgrids=grids/A66_National_13_09_01.gsb"));
        assert!(!proj.contains('{'));
    }

    #[test]
    fn test_variants_merged_under_numeric_key() {
        let catalog = catalog();
        for zone in UTM_ZONES {
            let key = format!("EPSG:283{}", zone);
            let transforms = catalog.get(&key).unwrap();
            // 283 -> [202, 203], 283d -> [78], 283c -> [78]
            assert_eq!(transforms.len(), 4);
            assert!(transforms
                .iter()
                .any(|t| t.source_name.starts_with("GDA94 / MGA (Conformal only)")));
            assert!(transforms
                .iter()
                .any(|t| t.source_name.starts_with("GDA94 / MGA (Conformal and distortion)")));
        }
    }

    #[test]
    fn test_merge_keeps_declaration_order() {
        let catalog = catalog();
        let names: Vec<_> = catalog
            .get("EPSG:4283")
            .unwrap()
            .iter()
            .map(|t| t.target_name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "AGD66 Latitude and Longitude [EPSG:4202]",
                "AGD84 Latitude and Longitude [EPSG:4203]",
                "GDA2020 Latitude and Longitude [EPSG:7844]",
                "GDA2020 Latitude and Longitude [EPSG:7844]",
            ]
        );
    }

    #[test]
    fn test_source_grid_has_priority() {
        // Registre où source et cible ont chacune une grille
        let registry = Registry::australian();
        let adjacency = Adjacency::new(vec![AdjacencyEntry::new(
            DatumId::plain(4202),
            [DatumId::plain(4203)],
        )]);
        let catalog = Catalog::build(&registry, &adjacency).unwrap();
        let t = &catalog.get("EPSG:4202").unwrap()[0];
        assert_eq!(
            t.grid,
            Some(PathBuf::from("grids").join(GridFile::Agd66National.file_name()))
        );
        assert!(t.grid_text.contains("A66_National_13_09_01.gsb"));
    }

    #[test]
    fn test_target_grid_fallback() {
        let catalog = catalog();
        let t = &catalog.get("EPSG:7855").unwrap()[0];
        assert_eq!(t.name, "GDA2020 to GDA94");
        assert_eq!(t.target_code, 28355);
        assert!(t
            .grid
            .as_ref()
            .unwrap()
            .ends_with("GDA94_GDA2020_conformal_and_distortion.gsb"));
        assert!(t.target_proj.as_deref().unwrap().contains("+zone=55 "));
        assert!(t.source_proj.is_none());
    }

    #[test]
    fn test_no_grid_means_empty_text() {
        let registry = Registry::australian();
        let adjacency = Adjacency::new(vec![AdjacencyEntry::new(
            DatumId::plain(4283),
            [DatumId::plain(7844)],
        )]);
        let catalog = Catalog::build(&registry, &adjacency).unwrap();
        let t = &catalog.get("EPSG:4283").unwrap()[0];
        assert!(t.grid.is_none());
        assert!(t.grid_text.is_empty());
    }

    #[test]
    fn test_custom_grid_dir() {
        let registry = Registry::australian();
        let adjacency = Adjacency::australian();
        let catalog = CatalogBuilder::new(&registry, &adjacency)
            .grid_dir("/opt/icsm/grids")
            .build()
            .unwrap();
        let t = &catalog.get("EPSG:4203").unwrap()[0];
        assert_eq!(
            t.grid.as_deref(),
            Some(Path::new("/opt/icsm/grids/National_84_02_07_01.gsb"))
        );
        assert!(t
            .source_proj
            .as_deref()
            .unwrap()
            .contains("+nadgrids=/opt/icsm/grids/National_84_02_07_01.gsb"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = catalog();
        let b = catalog();
        assert!(a.keys().eq(b.keys()));
        for (key, transforms) in a.iter() {
            assert_eq!(b.get(key).unwrap(), transforms);
        }
    }
}
