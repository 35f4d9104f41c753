//! Table d'adjacence: conversions source → cibles officiellement supportées

use crate::{CatalogError, DatumId, Registry};

/// Une source et ses cibles, dans l'ordre de préférence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyEntry {
    pub source: DatumId,
    pub targets: Vec<DatumId>,
}

impl AdjacencyEntry {
    pub fn new(source: DatumId, targets: impl Into<Vec<DatumId>>) -> Self {
        Self {
            source,
            targets: targets.into(),
        }
    }
}

/// Relation orientée entre datums. L'ordre des entrées est significatif:
/// il fixe l'ordre des candidats lorsque plusieurs entrées partagent un code source.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    entries: Vec<AdjacencyEntry>,
}

impl Adjacency {
    pub fn new(entries: Vec<AdjacencyEntry>) -> Self {
        Self { entries }
    }

    /// Conversions ICSM entre AGD66, AGD84, GDA94 et GDA2020
    pub fn australian() -> Self {
        let agd66 = DatumId::plain(202);
        let agd84 = DatumId::plain(203);
        let gda94 = DatumId::plain(283);
        let gda94_conf = DatumId::conformal(283);
        let gda94_dist = DatumId::conformal_and_distortion(283);
        let gda2020 = DatumId::plain(78);

        let agd66_ll = DatumId::plain(4202);
        let agd84_ll = DatumId::plain(4203);
        let gda94_ll = DatumId::plain(4283);
        let gda94_ll_conf = DatumId::conformal(4283);
        let gda94_ll_dist = DatumId::conformal_and_distortion(4283);
        let gda2020_ll = DatumId::plain(7844);

        Self::new(vec![
            // UTM
            AdjacencyEntry::new(agd66, [gda94]),
            AdjacencyEntry::new(agd84, [gda94]),
            AdjacencyEntry::new(gda94, [agd66, agd84]),
            AdjacencyEntry::new(gda94_dist, [gda2020]),
            AdjacencyEntry::new(gda94_conf, [gda2020]),
            AdjacencyEntry::new(gda2020, [gda94_dist, gda94_conf]),
            // Latitude / longitude
            AdjacencyEntry::new(agd66_ll, [gda94_ll]),
            AdjacencyEntry::new(agd84_ll, [gda94_ll]),
            AdjacencyEntry::new(gda94_ll, [agd66_ll, agd84_ll]),
            AdjacencyEntry::new(gda94_ll_dist, [gda2020_ll]),
            AdjacencyEntry::new(gda94_ll_conf, [gda2020_ll]),
            AdjacencyEntry::new(gda2020_ll, [gda94_ll_dist, gda94_ll_conf]),
        ])
    }

    pub fn entries(&self) -> &[AdjacencyEntry] {
        &self.entries
    }

    /// Cibles déclarées pour une source donnée
    pub fn targets_of(&self, source: DatumId) -> impl Iterator<Item = DatumId> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.source == source)
            .flat_map(|e| e.targets.iter().copied())
    }

    /// Vérifie que toutes les clés existent dans le registre et qu'aucune entrée n'est vide
    pub fn validate(&self, registry: &Registry) -> Result<(), CatalogError> {
        for entry in &self.entries {
            registry.require(entry.source)?;
            if entry.targets.is_empty() {
                return Err(CatalogError::EmptyTargets(entry.source));
            }
            for target in &entry.targets {
                registry.require(*target)?;
            }
        }
        Ok(())
    }
}
