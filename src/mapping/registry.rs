//! Registry of validated mapping descriptions, keyed by device identifier
//!
//! The registry is an ordinary value: callers construct it, fill it during startup
//! and pass it to every motion controller that needs to bind. Registered descriptions
//! are shared as `Arc` and never mutated, so any number of controllers may hold the
//! same description without locking.

use crate::mapping::description::MappingDescription;
use crate::mapping::error::MappingError;
use crate::mapping::validation;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Default, Clone)]
pub struct MappingRegistry {
    mappings: BTreeMap<String, Arc<MappingDescription>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a description
    ///
    /// A failing description is rejected with the violated invariant; mappings
    /// registered earlier stay usable.
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        description: MappingDescription,
    ) -> Result<Arc<MappingDescription>, MappingError> {
        let identifier = identifier.into();

        // Prüfen, ob die Kennung bereits vergeben ist
        if self.mappings.contains_key(&identifier) {
            warn!("Mapping '{}' is already registered", identifier);
            return Err(MappingError::AlreadyRegistered { identifier });
        }

        if let Err(e) = validation::validate(&identifier, &description) {
            error!("Rejected mapping: {}", e);
            return Err(e.into());
        }

        warn_on_back_reference_mismatch(&identifier, &description);

        let description = Arc::new(description);
        self.mappings
            .insert(identifier.clone(), Arc::clone(&description));
        info!(
            "Registered mapping '{}' ({} components, {} visual responses)",
            identifier,
            description.components.len(),
            description.visual_responses.len()
        );
        Ok(description)
    }

    pub fn lookup(&self, identifier: &str) -> Result<Arc<MappingDescription>, MappingError> {
        self.mappings
            .get(identifier)
            .cloned()
            .ok_or_else(|| MappingError::NotFound {
                identifier: identifier.to_string(),
            })
    }

    /// Registered identifiers in sorted order; call again to restart
    pub fn list(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.mappings.keys().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.mappings.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// The engine drives responses from the component that lists them; a differing
/// `componentIndex` on the response is almost always an authoring mistake.
fn warn_on_back_reference_mismatch(identifier: &str, description: &MappingDescription) {
    for (component_index, component) in description.components.iter().enumerate() {
        for &response_index in &component.visual_responses {
            let Some(response) = description.visual_response(response_index) else {
                continue;
            };
            if let Some(declared) = response.component_index {
                if declared != component_index {
                    warn!(
                        "Mapping '{}': visual response {} is listed by component {} but declares componentIndex {}",
                        identifier, response_index, component_index, declared
                    );
                }
            }
        }
    }
}
