//! Loads mapping descriptions from a directory of JSON files
//!
//! Each `<identifier>.json` holds one description. A file that fails to parse or
//! validate is reported and skipped; the rest of the directory still registers.

use crate::mapping::description::MappingDescription;
use crate::mapping::error::MappingError;
use crate::mapping::registry::MappingRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of loading a directory
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(PathBuf, MappingError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn parse_mapping(content: &str) -> Result<MappingDescription, MappingError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_file(path: &Path) -> Result<MappingDescription, MappingError> {
    let content = fs::read_to_string(path)?;
    parse_mapping(&content)
}

/// Registers every `*.json` file in `dir`, using the file stem as identifier
///
/// Only failing to read the directory itself is an error.
pub fn load_dir(registry: &mut MappingRegistry, dir: &Path) -> Result<LoadReport, MappingError> {
    info!("Loading mappings from {}", dir.display());

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut report = LoadReport::default();
    for path in paths {
        let Some(identifier) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
        else {
            warn!("Skipping file with non UTF-8 name: {}", path.display());
            continue;
        };

        debug!("Loading mapping '{}' from {}", identifier, path.display());
        let result = load_file(&path).and_then(|mapping| registry.register(&identifier, mapping));
        match result {
            Ok(_) => report.loaded.push(identifier),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.failed.push((path, e));
            }
        }
    }

    info!(
        "Loaded {} mappings ({} failed)",
        report.loaded.len(),
        report.failed.len()
    );
    Ok(report)
}
