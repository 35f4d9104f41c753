//! Propriétés du catalogue construit depuis le registre australien

use std::collections::HashMap;

use icsm_catalog::{Adjacency, Catalog, DatumId, GridFile, Registry, Variant, UTM_ZONES};

/// Nombre de transformations attendues par clé, calculé depuis l'adjacence
fn expected_counts(registry: &Registry, adjacency: &Adjacency) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for entry in adjacency.entries() {
        let source = registry.get(entry.source).unwrap();
        let zones: Vec<Option<u8>> = if source.is_utm {
            UTM_ZONES.map(Some).collect()
        } else {
            vec![None]
        };
        for zone in zones {
            *counts
                .entry(format!("EPSG:{}", entry.source.code(zone)))
                .or_insert(0) += entry.targets.len();
        }
    }
    counts
}

#[test]
fn test_counts_match_adjacency() {
    let registry = Registry::australian();
    let adjacency = Adjacency::australian();
    let catalog = Catalog::build(&registry, &adjacency).unwrap();

    let expected = expected_counts(&registry, &adjacency);
    assert_eq!(catalog.len(), expected.len());
    for (key, count) in expected {
        assert_eq!(
            catalog.get(&key).map(<[_]>::len),
            Some(count),
            "wrong count for {}",
            key
        );
    }
}

#[test]
fn test_no_empty_entries() {
    let catalog = Catalog::australian().unwrap();
    for (key, transforms) in catalog.iter() {
        assert!(!transforms.is_empty(), "{} has no transform", key);
        for t in transforms {
            assert_eq!(key, format!("EPSG:{}", t.source_code));
        }
    }
}

#[test]
fn test_grid_precedence_everywhere() {
    let registry = Registry::australian();
    let adjacency = Adjacency::australian();
    let catalog = Catalog::build(&registry, &adjacency).unwrap();

    for entry in adjacency.entries() {
        let source = registry.get(entry.source).unwrap();
        let zone = source.is_utm.then_some(55);
        let key = format!("EPSG:{}", entry.source.code(zone));
        let transforms = catalog.get(&key).unwrap();

        for target_id in &entry.targets {
            let target = registry.get(*target_id).unwrap();
            let expected = source.grid.or(target.grid).map(GridFile::file_name);
            let target_name = format!("{} [EPSG:{}]", target.display_name, target_id.code(zone));
            let source_name = format!("{} [EPSG:{}]", source.display_name, entry.source.code(zone));

            let t = transforms
                .iter()
                .find(|t| t.source_name == source_name && t.target_name == target_name)
                .unwrap();
            let actual = t
                .grid
                .as_ref()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str());
            assert_eq!(actual, expected, "{} -> {}", source_name, target_name);
        }
    }
}

#[test]
fn test_variants_share_numeric_key() {
    let registry = Registry::australian();
    let catalog = Catalog::australian().unwrap();

    for base in [283, 4283] {
        let conformal = DatumId {
            base_code: base,
            variant: Variant::ConformalOnly,
        };
        let distortion = DatumId {
            base_code: base,
            variant: Variant::ConformalAndDistortion,
        };
        let zone = registry.get(conformal).unwrap().is_utm.then_some(50);
        let key = format!("EPSG:{}", conformal.code(zone));
        assert_eq!(conformal.code(zone), distortion.code(zone));

        let transforms = catalog.get(&key).unwrap();
        let conformal_name = registry.get(conformal).unwrap().display_name;
        let distortion_name = registry.get(distortion).unwrap().display_name;
        assert!(transforms.iter().any(|t| t.source_name.starts_with(conformal_name)));
        assert!(transforms.iter().any(|t| t.source_name.starts_with(distortion_name)));
    }
}

#[test]
fn test_templates_fully_rendered() {
    let catalog = Catalog::australian().unwrap();
    for (_, transforms) in catalog.iter() {
        for t in transforms {
            for proj in [&t.source_proj, &t.target_proj].into_iter().flatten() {
                assert!(!proj.contains("{zone}"), "{}", proj);
                assert!(!proj.contains("{grid}"), "{}", proj);
                assert!(proj.contains("+nadgrids="));
            }
        }
    }
}
