//! Error definitions for mapping registration and controller updates

use crate::mapping::description::Handedness;
use std::fmt;
use thiserror::Error;

/// Error types for the registry and the per-device controller
#[derive(Debug, Error)]
pub enum MappingError {
    /// A mapping description broke one of the structural invariants
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No mapping is registered under this identifier
    #[error("No mapping registered for identifier '{identifier}'")]
    NotFound { identifier: String },

    /// The mapping exists but has no entry for the requested hand
    #[error("Mapping '{identifier}' has no '{handedness}' hand")]
    HandNotFound {
        identifier: String,
        handedness: Handedness,
    },

    /// Descriptions are immutable once registered
    #[error("Mapping '{identifier}' is already registered")]
    AlreadyRegistered { identifier: String },

    /// A visual response names an asset node the renderer never provided
    #[error("Asset node '{node}' could not be resolved")]
    MissingNode { node: String },

    /// `update` after `dispose`
    #[error("Motion controller has been disposed")]
    Disposed,

    /// Operation not allowed in the controller's current lifecycle state
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Mapping file could not be read
    #[error("Failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),

    /// Mapping file is not a well-formed description
    #[error("Failed to parse mapping description: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Registration failure report: which mapping, which invariant, which index or id
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Mapping '{identifier}' violates invariant #{}: {violation}", .violation.invariant())]
pub struct ValidationError {
    pub identifier: String,
    pub violation: Violation,
}

/// One variant per structural invariant of a mapping description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// #1
    DuplicateDataSourceId { index: usize, id: String },
    /// #2
    DataSourceOutOfRange {
        component: usize,
        data_source: usize,
    },
    /// #3
    VisualResponseOutOfRange {
        component: usize,
        visual_response: usize,
    },
    /// #4
    SharedDataSourceInHand {
        handedness: Handedness,
        component: usize,
        data_source: usize,
    },
    /// #5
    ComponentOutOfRange {
        handedness: Handedness,
        component: usize,
    },
    /// #6
    PrimaryButtonNotButton {
        handedness: Handedness,
        component: usize,
    },
    /// #7
    PrimaryAxesNotAxes {
        handedness: Handedness,
        component: usize,
    },
    /// #8
    UnusedDataSource { index: usize, id: String },
    /// #9
    UnusedComponent { index: usize },
}

impl Violation {
    /// Number of the violated invariant (1..=9)
    pub fn invariant(&self) -> u8 {
        match self {
            Violation::DuplicateDataSourceId { .. } => 1,
            Violation::DataSourceOutOfRange { .. } => 2,
            Violation::VisualResponseOutOfRange { .. } => 3,
            Violation::SharedDataSourceInHand { .. } => 4,
            Violation::ComponentOutOfRange { .. } => 5,
            Violation::PrimaryButtonNotButton { .. } => 6,
            Violation::PrimaryAxesNotAxes { .. } => 7,
            Violation::UnusedDataSource { .. } => 8,
            Violation::UnusedComponent { .. } => 9,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateDataSourceId { index, id } => {
                write!(f, "data source {} reuses id '{}'", index, id)
            }
            Violation::DataSourceOutOfRange {
                component,
                data_source,
            } => write!(
                f,
                "component {} references data source {} which does not exist",
                component, data_source
            ),
            Violation::VisualResponseOutOfRange {
                component,
                visual_response,
            } => write!(
                f,
                "component {} references visual response {} which does not exist",
                component, visual_response
            ),
            Violation::SharedDataSourceInHand {
                handedness,
                component,
                data_source,
            } => write!(
                f,
                "{} hand: component {} reuses data source {}",
                handedness, component, data_source
            ),
            Violation::ComponentOutOfRange {
                handedness,
                component,
            } => write!(
                f,
                "{} hand references component {} which does not exist",
                handedness, component
            ),
            Violation::PrimaryButtonNotButton {
                handedness,
                component,
            } => write!(
                f,
                "{} hand: primary button component {} does not resolve to a buttonSource",
                handedness, component
            ),
            Violation::PrimaryAxesNotAxes {
                handedness,
                component,
            } => write!(
                f,
                "{} hand: primary axes component {} does not resolve to a thumbstickSource or touchpadSource",
                handedness, component
            ),
            Violation::UnusedDataSource { index, id } => {
                write!(f, "data source {} ('{}') is not used by any component", index, id)
            }
            Violation::UnusedComponent { index } => {
                write!(f, "component {} is not used by any hand", index)
            }
        }
    }
}
