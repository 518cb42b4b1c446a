//! Semantic validation of mapping descriptions
//!
//! Schema tooling can only check the shape of a description. The checks here cover
//! what a schema cannot express: cross-table index bounds, uniqueness, per-hand data
//! source exclusivity, primary component types and dead table entries.
//!
//! Every check guards its own indexing, so a description with several broken
//! references reports all of them instead of panicking on the first.

use crate::mapping::description::{DataSourceType, MappingDescription};
use crate::mapping::error::{ValidationError, Violation};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Validates a description, returning the first violated invariant
pub fn validate(identifier: &str, mapping: &MappingDescription) -> Result<(), ValidationError> {
    match violations(mapping).into_iter().next() {
        Some(violation) => Err(ValidationError {
            identifier: identifier.to_string(),
            violation,
        }),
        None => {
            debug!("Mapping '{}' passed all structural checks", identifier);
            Ok(())
        }
    }
}

/// Collects every violation, ordered by invariant number
pub fn violations(mapping: &MappingDescription) -> Vec<Violation> {
    let mut found = Vec::new();

    check_unique_data_source_ids(mapping, &mut found);
    check_component_references(mapping, &mut found);
    check_hand_exclusive_data_sources(mapping, &mut found);
    check_hand_references(mapping, &mut found);
    check_unused_entries(mapping, &mut found);

    found.sort_by_key(Violation::invariant);
    found
}

// #1
fn check_unique_data_source_ids(mapping: &MappingDescription, found: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for (index, data_source) in mapping.data_sources.iter().enumerate() {
        if !seen.insert(data_source.id.as_str()) {
            found.push(Violation::DuplicateDataSourceId {
                index,
                id: data_source.id.clone(),
            });
        }
    }
}

// #2, #3
fn check_component_references(mapping: &MappingDescription, found: &mut Vec<Violation>) {
    for (index, component) in mapping.components.iter().enumerate() {
        if component.data_source >= mapping.data_sources.len() {
            found.push(Violation::DataSourceOutOfRange {
                component: index,
                data_source: component.data_source,
            });
        }

        for &visual_response in &component.visual_responses {
            if visual_response >= mapping.visual_responses.len() {
                found.push(Violation::VisualResponseOutOfRange {
                    component: index,
                    visual_response,
                });
            }
        }
    }
}

// #4
fn check_hand_exclusive_data_sources(mapping: &MappingDescription, found: &mut Vec<Violation>) {
    for (&handedness, hand) in &mapping.hands {
        let mut claimed: HashMap<usize, usize> = HashMap::new();
        for &component_index in &hand.components {
            // Out-of-range components are reported by #5
            let Some(component) = mapping.component(component_index) else {
                continue;
            };
            if let Some(&first) = claimed.get(&component.data_source) {
                // The same component listed twice is one logical control, not two
                if first != component_index {
                    found.push(Violation::SharedDataSourceInHand {
                        handedness,
                        component: component_index,
                        data_source: component.data_source,
                    });
                }
                continue;
            }
            claimed.insert(component.data_source, component_index);
        }
    }
}

// #5, #6, #7
fn check_hand_references(mapping: &MappingDescription, found: &mut Vec<Violation>) {
    for (&handedness, hand) in &mapping.hands {
        for &component in &hand.components {
            if component >= mapping.components.len() {
                found.push(Violation::ComponentOutOfRange {
                    handedness,
                    component,
                });
            }
        }

        if let Some(component) = hand.primary_button_component {
            let is_button = mapping
                .component_source(component)
                .is_some_and(|source| source.data_source_type == DataSourceType::Button);
            if !is_button {
                found.push(Violation::PrimaryButtonNotButton {
                    handedness,
                    component,
                });
            }
        }

        if let Some(component) = hand.primary_axes_component {
            let is_axes = mapping
                .component_source(component)
                .is_some_and(|source| source.data_source_type.is_axes());
            if !is_axes {
                found.push(Violation::PrimaryAxesNotAxes {
                    handedness,
                    component,
                });
            }
        }
    }
}

// #8, #9
fn check_unused_entries(mapping: &MappingDescription, found: &mut Vec<Violation>) {
    let used_sources: HashSet<usize> = mapping.components.iter().map(|c| c.data_source).collect();
    for (index, data_source) in mapping.data_sources.iter().enumerate() {
        if !used_sources.contains(&index) {
            found.push(Violation::UnusedDataSource {
                index,
                id: data_source.id.clone(),
            });
        }
    }

    let used_components: HashSet<usize> = mapping
        .hands
        .values()
        .flat_map(|hand| hand.components.iter().copied())
        .collect();
    for index in 0..mapping.components.len() {
        if !used_components.contains(&index) {
            found.push(Violation::UnusedComponent { index });
        }
    }
}
