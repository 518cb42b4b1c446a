//! Runtime subsystem: turns raw device input into component states and asset updates
//!
//! Implements a three-stage per-frame pipeline:
//!
//! 1. [`state`] - Raw values to discrete component state
//! 2. [`visual`] - Component values to blend weights, poses and visibility
//! 3. [`motion_controller`] - Lifecycle and per-frame orchestration for one device
//!
//! # Architecture
//!
//! ```text
//! RawSnapshot ──► ComponentStateMachine ──► VisualResponseEngine ──► FrameOutput
//!                 (per component)           (per visual response)
//! ```
//!
//! Every pass is synchronous and bounded by the size of the mapping tables, so hosts
//! simply call `update` once per render frame.

pub mod motion_controller;
pub mod state;
pub mod visual;
