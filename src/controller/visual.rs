//! Visual response evaluation
//!
//! A visual response reads one value of a component, turns it into a blend weight in
//! `[0, 1]` and applies that weight to its target node: either as an interpolated pose
//! between two reference nodes of the asset, or as a visibility toggle.
//!
//! ```text
//! raw values / state ──► weight ──► lerp(min pose, max pose) ──► NodeValue::Pose
//!                                └─► weight >= threshold     ──► NodeValue::Visible
//! ```

use crate::config::EngineSettings;
use crate::controller::state::{ComponentState, RawValues};
use crate::mapping::description::{ComponentProperty, ResponseProperty, VisualResponse};
use crate::mapping::error::MappingError;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight at or above which a visibility response shows its node
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// Reference pose of an asset node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for NodePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl NodePose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Linear translation blend; rotation uses slerp so it stays a unit quaternion
    pub fn lerp(&self, other: &NodePose, t: f32) -> NodePose {
        NodePose {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

/// Node lookup into the loaded 3D asset, provided by the rendering side
pub trait AssetNodes {
    fn node_pose(&self, name: &str) -> Option<NodePose>;
}

impl AssetNodes for HashMap<String, NodePose> {
    fn node_pose(&self, name: &str) -> Option<NodePose> {
        self.get(name).copied()
    }
}

/// Resolved value for one asset node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeValue {
    Pose(NodePose),
    Visible(bool),
}

/// One entry of a frame's visual output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeUpdate {
    pub node: String,
    pub weight: f32,
    pub value: NodeValue,
}

/// Projects an axis pair onto the unit disc and remaps both axes to `[0, 1]`
pub fn normalize_axes(x: f32, y: f32) -> (f32, f32) {
    let (mut x_axis, mut y_axis) = (x, y);
    if x.hypot(y) > 1.0 {
        let theta = y.atan2(x);
        x_axis = theta.cos();
        y_axis = theta.sin();
    }
    ((x_axis + 1.0) / 2.0, (y_axis + 1.0) / 2.0)
}

/// Fixed weights for state-driven responses
pub fn state_weight(state: ComponentState) -> f32 {
    match state {
        ComponentState::Default => 0.0,
        ComponentState::Touched => 0.5,
        ComponentState::Pressed => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualResponseEngine {
    visibility_threshold: f32,
}

impl Default for VisualResponseEngine {
    fn default() -> Self {
        Self {
            visibility_threshold: VISIBILITY_THRESHOLD,
        }
    }
}

impl VisualResponseEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            visibility_threshold: settings.visibility_threshold,
        }
    }

    /// Blend weight of a response for the component's current values, in `[0, 1]`
    pub fn compute_weight(
        &self,
        response: &VisualResponse,
        state: ComponentState,
        raw: &RawValues,
    ) -> f32 {
        if let Some(states) = &response.states {
            if !states.contains(&state) {
                return 0.0;
            }
        }

        let weight = match response.component_property {
            ComponentProperty::Button => raw.button_value(),
            ComponentProperty::XAxis => normalize_axes(raw.x_value(), raw.y_value()).0,
            ComponentProperty::YAxis => normalize_axes(raw.x_value(), raw.y_value()).1,
            ComponentProperty::State => state_weight(state),
        };

        // NaN from a misbehaving driver is treated like a missing field
        if weight.is_nan() {
            return 0.0;
        }
        weight.clamp(0.0, 1.0)
    }

    pub fn apply_transform(&self, weight: f32, min_node: &NodePose, max_node: &NodePose) -> NodePose {
        min_node.lerp(max_node, weight)
    }

    pub fn is_visible(&self, weight: f32) -> bool {
        weight >= self.visibility_threshold
    }

    /// Applies a weight to the response's target node
    ///
    /// Fails with [`MappingError::MissingNode`] when a transform reference node is not
    /// part of the asset; the caller skips just this response.
    pub fn resolve(
        &self,
        response: &VisualResponse,
        weight: f32,
        nodes: &dyn AssetNodes,
    ) -> Result<NodeUpdate, MappingError> {
        let value = match &response.property {
            ResponseProperty::Transform { min_node, max_node } => {
                let min_pose = lookup(nodes, min_node)?;
                let max_pose = lookup(nodes, max_node)?;
                NodeValue::Pose(self.apply_transform(weight, &min_pose, &max_pose))
            }
            ResponseProperty::Visibility => NodeValue::Visible(self.is_visible(weight)),
        };

        Ok(NodeUpdate {
            node: response.target_node.clone(),
            weight,
            value,
        })
    }
}

fn lookup(nodes: &dyn AssetNodes, name: &str) -> Result<NodePose, MappingError> {
    nodes.node_pose(name).ok_or_else(|| MappingError::MissingNode {
        node: name.to_string(),
    })
}
