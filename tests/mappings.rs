//! Structural checks over every bundled mapping description
//!
//! Each check is written against the raw tables rather than through the validator,
//! so a regression in the validator cannot hide a broken mapping.

use motion_controllers::mapping::description::DataSourceType;
use motion_controllers::mapping::loader;
use motion_controllers::{MappingDescription, MappingRegistry};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn mappings_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("mappings")
}

fn bundled() -> Vec<(String, MappingDescription)> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(mappings_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no bundled mappings found");

    paths
        .into_iter()
        .map(|path| {
            let id = path.file_stem().unwrap().to_string_lossy().into_owned();
            let mapping = loader::load_file(&path)
                .unwrap_or_else(|e| panic!("{} does not parse: {}", id, e));
            (id, mapping)
        })
        .collect()
}

#[test]
fn every_mapping_registers() {
    let mut registry = MappingRegistry::new();
    let report = loader::load_dir(&mut registry, &mappings_dir()).unwrap();
    assert!(report.is_clean(), "failures: {:?}", report.failed);
    assert_eq!(registry.len(), bundled().len());

    let listed: Vec<&str> = registry.list().collect();
    let mut expected: Vec<String> = bundled().into_iter().map(|(id, _)| id).collect();
    expected.sort();
    assert_eq!(listed, expected);
}

#[test]
fn data_source_ids_are_unique() {
    for (id, mapping) in bundled() {
        let mut seen = HashSet::new();
        for source in &mapping.data_sources {
            assert!(seen.insert(&source.id), "{}: duplicate data source '{}'", id, source.id);
        }
    }
}

#[test]
fn each_hand_has_unique_data_sources() {
    for (id, mapping) in bundled() {
        for (handedness, hand) in &mapping.hands {
            let mut seen = HashSet::new();
            for &component in &hand.components {
                let data_source = mapping.components[component].data_source;
                assert!(
                    seen.insert(data_source),
                    "{}: {} hand reuses data source {}",
                    id,
                    handedness,
                    data_source
                );
            }
        }
    }
}

#[test]
fn component_references_are_valid() {
    for (id, mapping) in bundled() {
        for component in &mapping.components {
            assert!(component.data_source < mapping.data_sources.len(), "{}", id);
            for &response in &component.visual_responses {
                assert!(response < mapping.visual_responses.len(), "{}", id);
            }
        }
    }
}

#[test]
fn hand_references_are_valid() {
    for (id, mapping) in bundled() {
        for hand in mapping.hands.values() {
            for &component in &hand.components {
                assert!(component < mapping.components.len(), "{}", id);
            }

            if let Some(component) = hand.primary_button_component {
                let source = mapping.component_source(component).unwrap();
                assert_eq!(source.data_source_type, DataSourceType::Button, "{}", id);
            }

            if let Some(component) = hand.primary_axes_component {
                let source = mapping.component_source(component).unwrap();
                assert!(source.data_source_type.is_axes(), "{}", id);
            }
        }
    }
}

#[test]
fn no_unused_data_sources() {
    for (id, mapping) in bundled() {
        let used: HashSet<usize> = mapping.components.iter().map(|c| c.data_source).collect();
        let all: HashSet<usize> = (0..mapping.data_sources.len()).collect();
        assert_eq!(used, all, "{}", id);
    }
}

#[test]
fn no_unused_components() {
    for (id, mapping) in bundled() {
        let used: HashSet<usize> = mapping
            .hands
            .values()
            .flat_map(|hand| hand.components.iter().copied())
            .collect();
        let all: HashSet<usize> = (0..mapping.components.len()).collect();
        assert_eq!(used, all, "{}", id);
    }
}
