use glam::Vec3;
use motion_controllers::mapping::loader::parse_mapping;
use motion_controllers::{
    AssetNodes, ComponentState, Handedness, MappingRegistry, MotionController, NodePose,
    NodeValue, RawSnapshot, RawValues,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const EPSILON: f32 = 1e-6;

const SINGLE_TRIGGER: &str = r#"{
    "dataSources": [ { "id": "trigger", "dataSourceType": "buttonSource", "buttonIndex": 0 } ],
    "components": [ { "dataSource": 0, "type": "trigger", "visualResponses": [0, 1] } ],
    "visualResponses": [
        { "componentIndex": 0, "componentProperty": "button", "targetNodeName": "TRIGGER",
          "property": "transform", "minNodeName": "TRIGGER_MIN", "maxNodeName": "TRIGGER_MAX" },
        { "componentIndex": 0, "componentProperty": "state", "targetNodeName": "TRIGGER_GLOW",
          "property": "visibility" }
    ],
    "hands": { "none": { "components": [0], "primaryButtonComponent": 0 } }
}"#;

fn trigger_controller() -> MotionController {
    let mut registry = MappingRegistry::new();
    registry
        .register("single-trigger", parse_mapping(SINGLE_TRIGGER).unwrap())
        .unwrap();

    let nodes: HashMap<String, NodePose> = HashMap::from([
        ("TRIGGER_MIN".to_string(), NodePose::from_translation(Vec3::ZERO)),
        (
            "TRIGGER_MAX".to_string(),
            NodePose::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        ),
    ]);

    let mut controller = MotionController::new(Handedness::None);
    controller.bind("single-trigger", &registry).unwrap();
    controller.attach_asset(Arc::new(nodes)).unwrap();
    controller
}

fn update_for(controller: &mut MotionController, node: &str, trigger: f32) -> (f32, NodeValue) {
    let snapshot = RawSnapshot::new().with("trigger", RawValues::button(trigger));
    let output = controller.update(&snapshot).unwrap();
    let update = output
        .updates
        .iter()
        .find(|u| u.node == node)
        .unwrap_or_else(|| panic!("no update for {}", node));
    (update.weight, update.value)
}

#[test]
fn trigger_drives_interpolated_pose() {
    let mut controller = trigger_controller();

    let (weight, value) = update_for(&mut controller, "TRIGGER", 0.4);
    assert!((weight - 0.4).abs() < EPSILON);
    match value {
        NodeValue::Pose(pose) => {
            assert!((pose.translation.y - 0.4).abs() < EPSILON);
            assert_eq!(pose.translation.x, 0.0);
            assert_eq!(pose.translation.z, 0.0);
        }
        other => panic!("expected pose, got {:?}", other),
    }
}

#[test]
fn state_drives_visibility() {
    let mut controller = trigger_controller();

    let (weight, value) = update_for(&mut controller, "TRIGGER_GLOW", 0.4);
    assert_eq!(controller.component_state(0), Some(ComponentState::Touched));
    assert_eq!(weight, 0.5);
    assert_eq!(value, NodeValue::Visible(true));

    let (weight, value) = update_for(&mut controller, "TRIGGER_GLOW", 0.0);
    assert_eq!(controller.component_state(0), Some(ComponentState::Default));
    assert_eq!(weight, 0.0);
    assert_eq!(value, NodeValue::Visible(false));
}

#[test]
fn button_threshold_boundaries() {
    let mut controller = trigger_controller();

    for (value, expected) in [
        (0.05, ComponentState::Default),
        (0.050001, ComponentState::Touched),
        (1.0, ComponentState::Pressed),
    ] {
        update_for(&mut controller, "TRIGGER", value);
        assert_eq!(controller.primary_button_state(), Some(expected), "value {}", value);
    }
}

#[test]
fn missing_source_in_snapshot_degrades_to_default() {
    let mut controller = trigger_controller();
    update_for(&mut controller, "TRIGGER", 1.0);

    let output = controller.update(&RawSnapshot::new()).unwrap();
    assert_eq!(controller.component_state(0), Some(ComponentState::Default));
    assert_eq!(output.updates.len(), 2);
    assert!(output.skipped.is_empty());
}

#[test]
fn repeated_snapshot_yields_identical_output() {
    let mut registry = MappingRegistry::new();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("mappings");
    motion_controllers::mapping::loader::load_dir(&mut registry, &dir).unwrap();

    let mut controller = MotionController::new(Handedness::Left);
    controller.bind("oculus-touch", &registry).unwrap();

    let snapshot = RawSnapshot::new()
        .with("trigger", RawValues::button(0.7))
        .with("thumbstick", RawValues::axes(0.3, -0.95))
        .with(
            "thumbrest",
            RawValues {
                touched: true,
                ..Default::default()
            },
        );

    let first = controller.update(&snapshot).unwrap();
    let second = controller.update(&snapshot).unwrap();
    assert_eq!(first, second);
    assert_eq!(controller.primary_axes(), Some((0.3, -0.95)));
}

#[test]
fn asset_nodes_trait_is_usable_by_hosts() {
    struct FlatAsset;
    impl AssetNodes for FlatAsset {
        fn node_pose(&self, _name: &str) -> Option<NodePose> {
            Some(NodePose::IDENTITY)
        }
    }

    let mut registry = MappingRegistry::new();
    registry
        .register("single-trigger", parse_mapping(SINGLE_TRIGGER).unwrap())
        .unwrap();
    let mut controller = MotionController::new(Handedness::None);
    controller.bind("single-trigger", &registry).unwrap();
    controller.attach_asset(Arc::new(FlatAsset)).unwrap();

    let output = controller
        .update(&RawSnapshot::new().with("trigger", RawValues::button(0.9)))
        .unwrap();
    assert_eq!(output.updates[0].value, NodeValue::Pose(NodePose::IDENTITY));
}
