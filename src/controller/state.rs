//! Discrete component state derivation
//!
//! Turns the raw values of one data source into `default`/`touched`/`pressed`
//! using fixed thresholds. Missing or unreported fields count as `0`, so a channel
//! that drops out for a frame falls back to `default` instead of failing the update.

use crate::config::EngineSettings;
use crate::mapping::description::{DataSource, DataSourceType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Raw button value above which a button counts as touched
pub const BUTTON_TOUCH_THRESHOLD: f32 = 0.05;

/// Axis pair distance from center above which a thumbstick/touchpad counts as touched
pub const AXIS_TOUCH_THRESHOLD: f32 = 0.1;

/// Button value at which a button counts as fully actuated
pub const BUTTON_PRESS_VALUE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    #[default]
    Default,
    Touched,
    Pressed,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentState::Default => write!(f, "default"),
            ComponentState::Touched => write!(f, "touched"),
            ComponentState::Pressed => write!(f, "pressed"),
        }
    }
}

/// Currently available raw fields of one data source
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValues {
    #[serde(default)]
    pub button: Option<f32>,
    #[serde(default)]
    pub x_axis: Option<f32>,
    #[serde(default)]
    pub y_axis: Option<f32>,
    /// Capacitive touch as reported by the device
    #[serde(default)]
    pub touched: bool,
}

impl RawValues {
    pub fn button(value: f32) -> Self {
        Self {
            button: Some(value),
            ..Default::default()
        }
    }

    pub fn axes(x: f32, y: f32) -> Self {
        Self {
            x_axis: Some(x),
            y_axis: Some(y),
            ..Default::default()
        }
    }

    pub fn button_value(&self) -> f32 {
        self.button.unwrap_or(0.0)
    }

    pub fn x_value(&self) -> f32 {
        self.x_axis.unwrap_or(0.0)
    }

    pub fn y_value(&self) -> f32 {
        self.y_axis.unwrap_or(0.0)
    }
}

/// One frame of raw input, keyed by data source id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSnapshot {
    sources: HashMap<String, RawValues>,
}

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, values: RawValues) -> Self {
        self.insert(id, values);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, values: RawValues) {
        self.sources.insert(id.into(), values);
    }

    /// Sources absent from the snapshot read as all-zero
    pub fn get(&self, id: &str) -> RawValues {
        self.sources.get(id).copied().unwrap_or_default()
    }
}

/// Derives component states from raw values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentStateMachine {
    button_touch_threshold: f32,
    axis_touch_threshold: f32,
}

impl Default for ComponentStateMachine {
    fn default() -> Self {
        Self {
            button_touch_threshold: BUTTON_TOUCH_THRESHOLD,
            axis_touch_threshold: AXIS_TOUCH_THRESHOLD,
        }
    }
}

impl ComponentStateMachine {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            button_touch_threshold: settings.button_touch_threshold,
            axis_touch_threshold: settings.axis_touch_threshold,
        }
    }

    /// Derives the state of a component backed by `source`
    ///
    /// Button sources: `pressed` at a full press, `touched` strictly above the touch
    /// threshold. Axis sources: `touched` when the stick/pad leaves the center by
    /// strictly more than the axis threshold; `pressed` only via their button field.
    pub fn derive_state(&self, source: &DataSource, raw: &RawValues) -> ComponentState {
        let touched_flag = raw.touched;

        match &source.data_source_type {
            DataSourceType::Thumbstick | DataSourceType::Touchpad => {
                let distance = raw.x_value().hypot(raw.y_value());
                let axis_touched = distance > self.axis_touch_threshold;

                if source.has_button() {
                    let state = self.button_state(source, raw.button_value());
                    if state == ComponentState::Pressed {
                        return state;
                    }
                    if state == ComponentState::Touched || axis_touched || touched_flag {
                        return ComponentState::Touched;
                    }
                    return ComponentState::Default;
                }

                if axis_touched || touched_flag {
                    ComponentState::Touched
                } else {
                    ComponentState::Default
                }
            }
            DataSourceType::Button | DataSourceType::Unknown(_) => {
                match self.button_state(source, raw.button_value()) {
                    ComponentState::Default if touched_flag => ComponentState::Touched,
                    state => state,
                }
            }
        }
    }

    fn button_state(&self, source: &DataSource, value: f32) -> ComponentState {
        if value >= BUTTON_PRESS_VALUE && !source.press_unsupported {
            ComponentState::Pressed
        } else if value > self.button_touch_threshold {
            ComponentState::Touched
        } else {
            ComponentState::Default
        }
    }
}
