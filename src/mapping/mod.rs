//! Mapping descriptions and their registry
//!
//! A mapping description declares, as data, how a device's raw data sources become
//! logical components and which asset nodes those components animate. Descriptions
//! are validated once when they are registered and are read-only afterwards.

pub mod description;
pub mod error;
pub mod loader;
pub mod registry;
pub mod validation;

// Re-exports für einfacheren Zugriff
pub use description::{
    Component, ComponentProperty, ComponentType, DataSource, DataSourceType, Hand, Handedness,
    MappingDescription, ResponseProperty, VisualResponse,
};
pub use error::{MappingError, ValidationError, Violation};
pub use registry::MappingRegistry;
