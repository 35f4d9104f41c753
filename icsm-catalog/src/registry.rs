//! Registre des datums australiens connus

use std::collections::HashSet;

use crate::{CatalogError, DatumId, GridFile};

/// Plage des zones UTM australiennes (MGA/AMG)
pub const UTM_ZONES: std::ops::RangeInclusive<u8> = 49..=56;

/// Définition d'un CRS du registre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatumDefinition {
    /// Identifiant (code EPSG de base + variante)
    pub id: DatumId,

    /// Libellé affiché (ex: "GDA94 / MGA")
    pub display_name: &'static str,

    /// Datum projeté par zone UTM (49 à 56)
    pub is_utm: bool,

    /// Modèle PROJ4 avec les marqueurs `{zone}` et `{grid}`.
    /// Absent: le code EPSG numérique suffit.
    pub proj_template: Option<&'static str>,

    /// Grille NTv2 dont dépend la transformation
    pub grid: Option<GridFile>,
}

impl DatumDefinition {
    /// Nom court: le texte avant le premier espace ("AGD66 / AMG" -> "AGD66")
    pub fn short_name(&self) -> &'static str {
        self.display_name
            .split(' ')
            .next()
            .unwrap_or(self.display_name)
    }
}

const UTM_AUST_SA: &str =
    "+proj=utm +zone={zone} +south +ellps=aust_SA +units=m +no_defs +nadgrids={grid} +wktext";
const UTM_GRS80: &str =
    "+proj=utm +zone={zone} +south +ellps=GRS80 +units=m +no_defs +nadgrids={grid} +wktext";
const LONGLAT_AUST_SA: &str = "+proj=longlat +ellps=aust_SA +no_defs +nadgrids={grid} +wktext";
const LONGLAT_GRS80: &str = "+proj=longlat +ellps=GRS80 +no_defs +nadgrids={grid} +wktext";

/// Registre indexé des définitions de datums
#[derive(Debug, Clone)]
pub struct Registry {
    datums: Vec<DatumDefinition>,
}

impl Registry {
    /// Construit un registre en vérifiant l'unicité des identifiants
    pub fn new(datums: Vec<DatumDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for datum in &datums {
            if !seen.insert(datum.id) {
                return Err(CatalogError::DuplicateDatum(datum.id));
            }
        }
        Ok(Self { datums })
    }

    /// Registre des datums AGD66, AGD84, GDA94 et GDA2020
    pub fn australian() -> Self {
        Self {
            datums: australian_datums(),
        }
    }

    pub fn get(&self, id: DatumId) -> Option<&DatumDefinition> {
        self.datums.iter().find(|d| d.id == id)
    }

    /// Recherche stricte, erreur si absent
    pub fn require(&self, id: DatumId) -> Result<&DatumDefinition, CatalogError> {
        self.get(id).ok_or(CatalogError::UnknownDatum(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatumDefinition> {
        self.datums.iter()
    }

    pub fn len(&self) -> usize {
        self.datums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datums.is_empty()
    }
}

fn australian_datums() -> Vec<DatumDefinition> {
    vec![
        // UTM
        DatumDefinition {
            id: DatumId::plain(202),
            display_name: "AGD66 / AMG",
            is_utm: true,
            proj_template: Some(UTM_AUST_SA),
            grid: Some(GridFile::Agd66National),
        },
        DatumDefinition {
            id: DatumId::plain(203),
            display_name: "AGD84 / AMG",
            is_utm: true,
            proj_template: Some(UTM_AUST_SA),
            grid: Some(GridFile::Agd84National),
        },
        DatumDefinition {
            id: DatumId::plain(283),
            display_name: "GDA94 / MGA",
            is_utm: true,
            proj_template: None,
            grid: None,
        },
        DatumDefinition {
            id: DatumId::conformal(283),
            display_name: "GDA94 / MGA (Conformal only)",
            is_utm: true,
            proj_template: Some(UTM_GRS80),
            grid: Some(GridFile::Gda2020Conformal),
        },
        DatumDefinition {
            id: DatumId::conformal_and_distortion(283),
            display_name: "GDA94 / MGA (Conformal and distortion)",
            is_utm: true,
            proj_template: Some(UTM_GRS80),
            grid: Some(GridFile::Gda2020ConformalAndDistortion),
        },
        DatumDefinition {
            id: DatumId::plain(78),
            display_name: "GDA2020 / MGA",
            is_utm: true,
            proj_template: None,
            grid: None,
        },
        // Latitude / longitude
        DatumDefinition {
            id: DatumId::plain(4202),
            display_name: "AGD66 Latitude and Longitude",
            is_utm: false,
            proj_template: Some(LONGLAT_AUST_SA),
            grid: Some(GridFile::Agd66National),
        },
        DatumDefinition {
            id: DatumId::plain(4203),
            display_name: "AGD84 Latitude and Longitude",
            is_utm: false,
            proj_template: Some(LONGLAT_AUST_SA),
            grid: Some(GridFile::Agd84National),
        },
        DatumDefinition {
            id: DatumId::plain(4283),
            display_name: "GDA94 Latitude and Longitude",
            is_utm: false,
            proj_template: None,
            grid: None,
        },
        DatumDefinition {
            id: DatumId::conformal(4283),
            display_name: "GDA94 Latitude and Longitude (Conformal only)",
            is_utm: false,
            proj_template: Some(LONGLAT_GRS80),
            grid: Some(GridFile::Gda2020Conformal),
        },
        DatumDefinition {
            id: DatumId::conformal_and_distortion(4283),
            display_name: "GDA94 Latitude and Longitude (Conformal and distortion)",
            is_utm: false,
            proj_template: Some(LONGLAT_GRS80),
            grid: Some(GridFile::Gda2020ConformalAndDistortion),
        },
        DatumDefinition {
            id: DatumId::plain(7844),
            display_name: "GDA2020 Latitude and Longitude",
            is_utm: false,
            proj_template: None,
            grid: None,
        },
    ]
}
