//! Per-device motion controller with statum state machine
//!
//! Binds one physical device (one hand) to a registered mapping description and
//! recomputes component states and visual responses once per frame.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized ──► Ready ──► Updating ──► Ready ──► ...
//!       │             │                               │
//!       └─────────────┴──────────► Disposed ◄─────────┘
//! ```
//!
//! The typed machine ([`MotionControllerMachine`]) enforces the transitions at compile
//! time. [`MotionController`] wraps it for hosts that keep one controller per device
//! in a long-lived slot and need runtime errors such as [`MappingError::Disposed`].
//!
//! # Data Flow
//!
//! ```text
//! RawSnapshot ──► [ComponentStateMachine] ──► ComponentState
//!                                                 │
//!                 [VisualResponseEngine] ◄────────┘
//!                          │
//!                          ▼
//!                     FrameOutput ──► renderer
//! ```

use crate::config::EngineSettings;
use crate::controller::state::{ComponentState, ComponentStateMachine, RawSnapshot, RawValues};
use crate::controller::visual::{AssetNodes, NodePose, NodeUpdate, VisualResponseEngine};
use crate::mapping::description::{Handedness, MappingDescription};
use crate::mapping::error::MappingError;
use crate::mapping::registry::MappingRegistry;
use statum::{machine, state};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// States of a motion controller's lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum MotionControllerState {
    Uninitialized, // Created, no mapping bound
    Ready,         // Mapping bound, waiting for the next frame
    Updating,      // Inside one update pass
    Disposed,      // Device gone, mapping released
}

/// A visual response that was skipped for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResponse {
    pub visual_response: usize,
    pub node: String,
}

/// Everything one update produced for the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub updates: Vec<NodeUpdate>,
    pub skipped: Vec<SkippedResponse>,
}

/// The mapping a controller is bound to, reduced to the components of its hand
#[derive(Debug, Clone, Default)]
struct Binding {
    identifier: String,
    description: Arc<MappingDescription>,
    components: Vec<usize>,
    primary_button: Option<usize>,
    primary_axes: Option<usize>,
}

#[machine]
pub struct MotionControllerMachine<S: MotionControllerState> {
    handedness: Handedness,
    binding: Binding,
    states: Vec<ComponentState>,
    values: Vec<RawValues>,
    state_machine: ComponentStateMachine,
    engine: VisualResponseEngine,
    nodes: Option<Arc<dyn AssetNodes>>,
    reported_missing: HashSet<String>,
}

impl<S: MotionControllerState> MotionControllerMachine<S> {
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn identifier(&self) -> &str {
        &self.binding.identifier
    }

    /// Provides the loaded asset the transform responses resolve their nodes against
    pub fn attach_asset(&mut self, nodes: Arc<dyn AssetNodes>) {
        debug!("Asset attached to {} controller", self.handedness);
        self.nodes = Some(nodes);
    }

    pub fn component_state(&self, component: usize) -> Option<ComponentState> {
        self.states.get(component).copied()
    }

    pub fn primary_button_state(&self) -> Option<ComponentState> {
        self.binding
            .primary_button
            .and_then(|c| self.component_state(c))
    }

    /// Last raw axis pair of the primary thumbstick/touchpad
    pub fn primary_axes(&self) -> Option<(f32, f32)> {
        self.binding
            .primary_axes
            .and_then(|c| self.values.get(c))
            .map(|raw| (raw.x_value(), raw.y_value()))
    }

    /// Releases the bound description; allowed from every state
    pub fn dispose(mut self) -> MotionControllerMachine<Disposed> {
        info!(
            "Disposing {} controller for '{}'",
            self.handedness, self.binding.identifier
        );
        self.binding = Binding::default();
        self.states.clear();
        self.values.clear();
        self.nodes = None;
        self.transition()
    }
}

impl MotionControllerMachine<Uninitialized> {
    pub fn create(handedness: Handedness, settings: &EngineSettings) -> Self {
        debug!("Creating motion controller for {} hand", handedness);

        Self::new(
            handedness,
            Binding::default(),
            Vec::new(),
            Vec::new(),
            ComponentStateMachine::new(settings),
            VisualResponseEngine::new(settings),
            None,
            HashSet::new(),
        )
    }

    /// Resolves the mapping and transitions to Ready
    pub fn bind(
        self,
        identifier: &str,
        registry: &MappingRegistry,
    ) -> Result<MotionControllerMachine<Ready>, MappingError> {
        let binding = self.resolve_binding(identifier, registry)?;
        Ok(self.bind_to(binding))
    }

    fn resolve_binding(
        &self,
        identifier: &str,
        registry: &MappingRegistry,
    ) -> Result<Binding, MappingError> {
        let description = registry.lookup(identifier)?;

        let hand = description
            .hand(self.handedness)
            .ok_or_else(|| MappingError::HandNotFound {
                identifier: identifier.to_string(),
                handedness: self.handedness,
            })?;

        Ok(Binding {
            identifier: identifier.to_string(),
            components: hand.components.clone(),
            primary_button: hand.primary_button_component,
            primary_axes: hand.primary_axes_component,
            description: Arc::clone(&description),
        })
    }

    fn bind_to(mut self, binding: Binding) -> MotionControllerMachine<Ready> {
        let component_count = binding.description.components.len();
        self.states = vec![ComponentState::Default; component_count];
        self.values = vec![RawValues::default(); component_count];
        self.binding = binding;

        info!(
            "Bound {} controller to '{}' ({} components)",
            self.handedness,
            self.binding.identifier,
            self.binding.components.len()
        );
        self.transition()
    }
}

impl MotionControllerMachine<Ready> {
    pub fn begin_update(self) -> MotionControllerMachine<Updating> {
        self.transition()
    }

    /// Runs one full update pass and returns to Ready
    pub fn update(self, snapshot: &RawSnapshot) -> (MotionControllerMachine<Ready>, FrameOutput) {
        let mut updating = self.begin_update();
        let output = updating.apply(snapshot);
        (updating.finish(), output)
    }
}

impl MotionControllerMachine<Updating> {
    /// Derives every component state of the bound hand, then every visual response
    ///
    /// A response whose reference nodes are missing from the asset is skipped for
    /// this frame; the remaining responses still update.
    pub fn apply(&mut self, snapshot: &RawSnapshot) -> FrameOutput {
        let description = Arc::clone(&self.binding.description);
        let empty: HashMap<String, NodePose> = HashMap::new();
        let nodes = self.nodes.clone();
        let nodes: &dyn AssetNodes = match &nodes {
            Some(nodes) => &**nodes,
            None => &empty,
        };

        let mut output = FrameOutput::default();

        for &component_index in &self.binding.components {
            let Some(component) = description.component(component_index) else {
                continue;
            };
            let Some(source) = description.data_source(component.data_source) else {
                continue;
            };

            let raw = snapshot.get(&source.id);
            let state = self.state_machine.derive_state(source, &raw);
            if self.states[component_index] != state {
                debug!(
                    "Component {} ('{}') {} -> {}",
                    component_index, source.id, self.states[component_index], state
                );
            }
            self.states[component_index] = state;
            self.values[component_index] = raw;

            for &response_index in &component.visual_responses {
                let Some(response) = description.visual_response(response_index) else {
                    continue;
                };

                let weight = self.engine.compute_weight(response, state, &raw);
                match self.engine.resolve(response, weight, nodes) {
                    Ok(update) => output.updates.push(update),
                    Err(MappingError::MissingNode { node }) => {
                        if self.reported_missing.insert(node.clone()) {
                            warn!(
                                "Skipping visual response {} of '{}': asset node '{}' not found",
                                response_index, self.binding.identifier, node
                            );
                        }
                        output.skipped.push(SkippedResponse {
                            visual_response: response_index,
                            node,
                        });
                    }
                    Err(e) => {
                        warn!("Skipping visual response {}: {}", response_index, e);
                    }
                }
            }
        }

        output
    }

    pub fn finish(self) -> MotionControllerMachine<Ready> {
        self.transition()
    }
}

impl MotionControllerMachine<Disposed> {}

/// Coarse lifecycle state of a [`MotionController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Disposed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Uninitialized => write!(f, "Uninitialized"),
            Lifecycle::Ready => write!(f, "Ready"),
            Lifecycle::Disposed => write!(f, "Disposed"),
        }
    }
}

enum Slot {
    Uninitialized(MotionControllerMachine<Uninitialized>),
    Ready(MotionControllerMachine<Ready>),
    Disposed(MotionControllerMachine<Disposed>),
    Empty,
}

/// Runtime handle for one device's motion controller
///
/// Holds the typed machine in whatever state it is currently in and turns calls that
/// are not valid for that state into errors.
pub struct MotionController {
    slot: Slot,
}

impl MotionController {
    pub fn new(handedness: Handedness) -> Self {
        Self::with_settings(handedness, &EngineSettings::default())
    }

    pub fn with_settings(handedness: Handedness, settings: &EngineSettings) -> Self {
        Self {
            slot: Slot::Uninitialized(MotionControllerMachine::create(handedness, settings)),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.slot {
            Slot::Uninitialized(_) => Lifecycle::Uninitialized,
            Slot::Ready(_) => Lifecycle::Ready,
            Slot::Disposed(_) | Slot::Empty => Lifecycle::Disposed,
        }
    }

    /// Binds to a registered mapping; Uninitialized -> Ready
    pub fn bind(&mut self, identifier: &str, registry: &MappingRegistry) -> Result<(), MappingError> {
        match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Uninitialized(machine) => match machine.resolve_binding(identifier, registry) {
                Ok(binding) => {
                    self.slot = Slot::Ready(machine.bind_to(binding));
                    Ok(())
                }
                Err(e) => {
                    // Der Controller bleibt ungebunden
                    warn!("Failed to bind {} controller: {}", machine.handedness(), e);
                    self.slot = Slot::Uninitialized(machine);
                    Err(e)
                }
            },
            Slot::Ready(machine) => {
                let bound = machine.identifier().to_string();
                self.slot = Slot::Ready(machine);
                Err(MappingError::InvalidStateTransition(format!(
                    "controller already bound to '{}'",
                    bound
                )))
            }
            other => {
                self.slot = other;
                Err(MappingError::Disposed)
            }
        }
    }

    pub fn attach_asset(&mut self, nodes: Arc<dyn AssetNodes>) -> Result<(), MappingError> {
        match &mut self.slot {
            Slot::Uninitialized(machine) => machine.attach_asset(nodes),
            Slot::Ready(machine) => machine.attach_asset(nodes),
            Slot::Disposed(_) | Slot::Empty => return Err(MappingError::Disposed),
        }
        Ok(())
    }

    /// Runs one frame; Ready -> Updating -> Ready
    pub fn update(&mut self, snapshot: &RawSnapshot) -> Result<FrameOutput, MappingError> {
        match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Ready(machine) => {
                let (ready, output) = machine.update(snapshot);
                self.slot = Slot::Ready(ready);
                Ok(output)
            }
            Slot::Uninitialized(machine) => {
                self.slot = Slot::Uninitialized(machine);
                Err(MappingError::InvalidStateTransition(
                    "update called before bind".to_string(),
                ))
            }
            other => {
                self.slot = other;
                Err(MappingError::Disposed)
            }
        }
    }

    /// Releases the mapping; every later update fails with `Disposed`
    pub fn dispose(&mut self) {
        self.slot = match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Uninitialized(machine) => Slot::Disposed(machine.dispose()),
            Slot::Ready(machine) => Slot::Disposed(machine.dispose()),
            other => other,
        };
    }

    pub fn component_state(&self, component: usize) -> Option<ComponentState> {
        match &self.slot {
            Slot::Ready(machine) => machine.component_state(component),
            _ => None,
        }
    }

    pub fn primary_button_state(&self) -> Option<ComponentState> {
        match &self.slot {
            Slot::Ready(machine) => machine.primary_button_state(),
            _ => None,
        }
    }

    pub fn primary_axes(&self) -> Option<(f32, f32)> {
        match &self.slot {
            Slot::Ready(machine) => machine.primary_axes(),
            _ => None,
        }
    }
}
