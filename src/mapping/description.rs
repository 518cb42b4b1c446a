//! Data model of a mapping description
//!
//! One description exists per device identifier. It consists of four tables which
//! reference each other purely by index:
//!
//! ```text
//! hands ──► components ──► dataSources
//!               │
//!               └────────► visualResponses
//! ```
//!
//! Descriptions are immutable once registered. Everything that changes per frame
//! (component state, weights) lives in the motion controller instead.

use crate::controller::state::ComponentState;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Which hand a controller instance represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    None,
    Left,
    Right,
}

impl Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::None => write!(f, "none"),
            Handedness::Left => write!(f, "left"),
            Handedness::Right => write!(f, "right"),
        }
    }
}

impl std::str::FromStr for Handedness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Handedness::None),
            "left" => Ok(Handedness::Left),
            "right" => Ok(Handedness::Right),
            other => Err(format!("unknown handedness '{}'", other)),
        }
    }
}

/// Kind of raw channel group a data source reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceType {
    Button,
    Thumbstick,
    Touchpad,
    /// Types this engine does not know yet; state is derived with button rules
    Unknown(String),
}

impl DataSourceType {
    pub fn as_str(&self) -> &str {
        match self {
            DataSourceType::Button => "buttonSource",
            DataSourceType::Thumbstick => "thumbstickSource",
            DataSourceType::Touchpad => "touchpadSource",
            DataSourceType::Unknown(name) => name,
        }
    }

    pub fn from_name(s: &str) -> Self {
        match s {
            "buttonSource" => DataSourceType::Button,
            "thumbstickSource" => DataSourceType::Thumbstick,
            "touchpadSource" => DataSourceType::Touchpad,
            other => DataSourceType::Unknown(other.to_string()),
        }
    }

    /// Thumbsticks and touchpads report an x/y axis pair
    pub fn is_axes(&self) -> bool {
        matches!(self, DataSourceType::Thumbstick | DataSourceType::Touchpad)
    }
}

impl Serialize for DataSourceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

struct DataSourceTypeVisitor;

impl<'de> Visitor<'de> for DataSourceTypeVisitor {
    type Value = DataSourceType;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a data source type string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(DataSourceType::from_name(v))
    }
}

impl<'de> Deserialize<'de> for DataSourceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(DataSourceTypeVisitor)
    }
}

/// One raw physical input channel group
///
/// The index fields name the device-side channels (gamepad button/axis slots) the
/// polling layer reads; only the ones relevant for the type are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub data_source_type: DataSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<usize>,
    /// The device reports an analog value but never a full press
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub press_unsupported: bool,
}

impl DataSource {
    /// Axis sources with a clickable stick/pad also expose a button field
    pub fn has_button(&self) -> bool {
        !self.data_source_type.is_axes() || self.button_index.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Trigger,
    Squeeze,
    Touchpad,
    Thumbstick,
    Button,
}

/// A logical control built on top of one data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub data_source: usize,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub visual_responses: Vec<usize>,
}

/// Which value of the component drives a visual response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentProperty {
    Button,
    XAxis,
    YAxis,
    State,
}

/// Animated property of the target node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "lowercase")]
pub enum ResponseProperty {
    /// Interpolate between the poses of two reference nodes
    Transform {
        #[serde(rename = "minNodeName")]
        min_node: String,
        #[serde(rename = "maxNodeName")]
        max_node: String,
    },
    Visibility,
}

/// One animated property of the 3D asset, driven by one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualResponse {
    /// Back-reference to the component this response listens to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_index: Option<usize>,
    pub component_property: ComponentProperty,
    /// Asset node whose pose or visibility is written
    #[serde(rename = "targetNodeName")]
    pub target_node: String,
    #[serde(flatten)]
    pub property: ResponseProperty,
    /// Restricts the response to these component states
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<ComponentState>>,
}

/// Per-handedness view of the components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    pub components: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_button_component: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_axes_component: Option<usize>,
}

/// Declarative description of one device model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDescription {
    pub data_sources: Vec<DataSource>,
    pub components: Vec<Component>,
    #[serde(default)]
    pub visual_responses: Vec<VisualResponse>,
    pub hands: BTreeMap<Handedness, Hand>,
}

impl MappingDescription {
    pub fn data_source(&self, index: usize) -> Option<&DataSource> {
        self.data_sources.get(index)
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn visual_response(&self, index: usize) -> Option<&VisualResponse> {
        self.visual_responses.get(index)
    }

    pub fn hand(&self, handedness: Handedness) -> Option<&Hand> {
        self.hands.get(&handedness)
    }

    /// Resolves a component to the data source it reads from
    pub fn component_source(&self, component: usize) -> Option<&DataSource> {
        self.component(component)
            .and_then(|c| self.data_source(c.data_source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THUMBSTICK_MAPPING: &str = r#"{
        "dataSources": [
            { "id": "thumbstick", "dataSourceType": "thumbstickSource",
              "xAxisIndex": 2, "yAxisIndex": 3, "buttonIndex": 3 },
            { "id": "trigger", "dataSourceType": "buttonSource", "buttonIndex": 0 },
            { "id": "gaze", "dataSourceType": "eyeSource" }
        ],
        "components": [
            { "dataSource": 0, "type": "thumbstick", "visualResponses": [0, 1] },
            { "dataSource": 1, "type": "trigger", "visualResponses": [] },
            { "dataSource": 2, "type": "button" }
        ],
        "visualResponses": [
            { "componentProperty": "x_axis", "targetNodeName": "THUMBSTICK_X",
              "property": "transform", "minNodeName": "X_MIN", "maxNodeName": "X_MAX" },
            { "componentProperty": "state", "targetNodeName": "TOUCH_DOT",
              "property": "visibility", "states": ["touched", "pressed"] }
        ],
        "hands": {
            "left": { "components": [0, 1, 2], "primaryButtonComponent": 1,
                      "primaryAxesComponent": 0 }
        }
    }"#;

    #[test]
    fn test_parse_mapping_description() {
        let mapping: MappingDescription = serde_json::from_str(THUMBSTICK_MAPPING).unwrap();

        assert_eq!(mapping.data_sources.len(), 3);
        assert_eq!(
            mapping.data_sources[0].data_source_type,
            DataSourceType::Thumbstick
        );
        assert_eq!(
            mapping.data_sources[2].data_source_type,
            DataSourceType::Unknown("eyeSource".to_string())
        );
        assert_eq!(mapping.components[2].visual_responses, Vec::<usize>::new());

        match &mapping.visual_responses[0].property {
            ResponseProperty::Transform { min_node, max_node } => {
                assert_eq!(min_node, "X_MIN");
                assert_eq!(max_node, "X_MAX");
            }
            other => panic!("unexpected property {:?}", other),
        }
        assert_eq!(
            mapping.visual_responses[1].states,
            Some(vec![ComponentState::Touched, ComponentState::Pressed])
        );

        let left = mapping.hand(Handedness::Left).unwrap();
        assert_eq!(left.primary_axes_component, Some(0));
        assert!(mapping.hand(Handedness::Right).is_none());
    }

    #[test]
    fn test_component_source_resolution() {
        let mapping: MappingDescription = serde_json::from_str(THUMBSTICK_MAPPING).unwrap();

        assert_eq!(mapping.component_source(1).unwrap().id, "trigger");
        assert!(mapping.component_source(7).is_none());
        assert!(mapping.component_source(0).unwrap().has_button());
        assert!(mapping.component_source(1).unwrap().has_button());
    }

    #[test]
    fn test_data_source_type_round_trips_unknown_names() {
        let json = serde_json::to_string(&DataSourceType::Unknown("eyeSource".into())).unwrap();
        assert_eq!(json, "\"eyeSource\"");
        assert!(DataSourceType::Touchpad.is_axes());
        assert!(!DataSourceType::Button.is_axes());
    }

    #[test]
    fn test_handedness_from_str() {
        assert_eq!("right".parse::<Handedness>(), Ok(Handedness::Right));
        assert!("both".parse::<Handedness>().is_err());
    }
}
