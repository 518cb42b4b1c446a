//! Declarative XR motion controller mapping engine
//!
//! Translates raw input from an XR controller (buttons, triggers, thumbsticks,
//! touchpads) into discrete component states and into the poses and visibility of
//! the nodes of a 3D controller model. Which raw channel drives which control and
//! which node is described per device model by a [`MappingDescription`].

pub mod config;
pub mod controller;
pub mod mapping;

pub use config::{EngineSettings, Settings};
pub use controller::motion_controller::{
    FrameOutput, Lifecycle, MotionController, MotionControllerMachine, SkippedResponse,
};
pub use controller::state::{ComponentState, ComponentStateMachine, RawSnapshot, RawValues};
pub use controller::visual::{AssetNodes, NodePose, NodeUpdate, NodeValue, VisualResponseEngine};
pub use mapping::{Handedness, MappingDescription, MappingError, MappingRegistry};
