//! Scene Snapshot Tests
//!
//! Tests for:
//! - Capture: spawn-order records, parent indices, optional components
//! - Round trip: JSON serialize/deserialize/rebuild with fresh entity ids
//! - Load: hierarchy relinking, world matrices ready, hand-written JSON

use ember::render::HeadlessDevice;
use ember::resources::Mesh;
use ember::scene::{
    Camera, Hierarchy, Light, LightKind, MeshComponent, Scene, SceneSnapshot, Tag, Transform,
};
use glam::Vec3;

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

/// Scene with a camera root and a lit child, used by the round-trip tests.
fn sample_scene() -> Scene {
    let mut scene = Scene::new();
    let root = scene.create_entity("Root");
    scene.registry.add(root, Camera::default().primary());
    scene.registry.get_mut::<Transform>(root).unwrap().position = Vec3::new(1.0, 0.0, 0.0);

    let child = scene.create_child(root, "Lamp");
    let transform = scene.registry.get_mut::<Transform>(child).unwrap();
    transform.position = Vec3::new(0.0, 2.0, 0.0);
    transform.rotation = Vec3::new(0.0, 45.0, 0.0);
    transform.scale = Vec3::splat(0.5);
    scene.registry.add(child, Light::point(Vec3::ONE, 3.0, 12.0));

    scene
}

fn entity_named(scene: &Scene, name: &str) -> ember::ecs::EntityId {
    scene
        .registry
        .view::<Tag>()
        .find(|(_, tag)| tag.name == name)
        .map(|(entity, _)| entity)
        .unwrap()
}

// ============================================================================
// Capture
// ============================================================================

#[test]
fn records_follow_spawn_order_with_parent_indices() {
    let snapshot = sample_scene().to_snapshot();

    assert_eq!(snapshot.entities.len(), 2);
    assert_eq!(snapshot.entities[0].tag, "Root");
    assert_eq!(snapshot.entities[0].parent, None);
    assert_eq!(snapshot.entities[1].tag, "Lamp");
    assert_eq!(snapshot.entities[1].parent, Some(0));
}

#[test]
fn absent_components_are_omitted_from_the_json() {
    let mut scene = Scene::new();
    scene.create_entity("Plain");

    let json = serde_json::to_string(&scene.to_snapshot()).unwrap();
    assert!(!json.contains("\"camera\""));
    assert!(!json.contains("\"light\""));
}

#[test]
fn mesh_and_material_assignments_are_not_captured() {
    let mut device = HeadlessDevice::new();
    let mut scene = Scene::new();
    let e = scene.create_entity("Geometry");
    let mesh = Mesh::cube(&mut device, 1.0).unwrap();
    scene.registry.add(e, MeshComponent::new(mesh));

    let snapshot = scene.to_snapshot();
    let loaded = Scene::from_snapshot(&snapshot);

    let restored = entity_named(&loaded, "Geometry");
    assert!(!loaded.registry.has::<MeshComponent>(restored));
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn json_round_trip_rebuilds_the_scene() {
    let snapshot = sample_scene().to_snapshot();
    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let parsed: SceneSnapshot = serde_json::from_str(&json).unwrap();
    let loaded = Scene::from_snapshot(&parsed);

    assert_eq!(loaded.registry.len(), 2);
    let root = entity_named(&loaded, "Root");
    let lamp = entity_named(&loaded, "Lamp");

    assert_eq!(loaded.registry.get::<Hierarchy>(lamp).unwrap().parent, Some(root));
    assert_eq!(loaded.tree.roots(), &[root]);

    let transform = loaded.registry.get::<Transform>(lamp).unwrap();
    assert!(vec3_approx(transform.position, Vec3::new(0.0, 2.0, 0.0)));
    assert!(vec3_approx(transform.rotation, Vec3::new(0.0, 45.0, 0.0)));
    assert!(vec3_approx(transform.scale, Vec3::splat(0.5)));

    let light = loaded.registry.get::<Light>(lamp).unwrap();
    assert!((light.intensity - 3.0).abs() < EPSILON);
    assert_eq!(light.kind, LightKind::Point { range: 12.0 });

    // The primary flag survives, on the freshly allocated root id.
    assert_eq!(loaded.primary_camera(), Some(root));
}

#[test]
fn loaded_scenes_have_world_matrices_ready() {
    let snapshot = sample_scene().to_snapshot();
    let loaded = Scene::from_snapshot(&snapshot);

    // from_snapshot runs the hierarchy update itself.
    let lamp = entity_named(&loaded, "Lamp");
    let world = loaded.registry.get::<Transform>(lamp).unwrap().world_matrix();
    assert!(vec3_approx(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0)));
}

#[test]
fn sibling_order_is_preserved_across_a_round_trip() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("Parent");
    scene.create_child(parent, "A");
    scene.create_child(parent, "B");

    let loaded = Scene::from_snapshot(&scene.to_snapshot());

    // Children re-attach in record order; prepending reverses, matching
    // the original prepend-built list.
    let parent = entity_named(&loaded, "Parent");
    let names: Vec<String> = ember::scene::children(&loaded.registry, parent)
        .map(|e| loaded.registry.get::<Tag>(e).unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["B", "A"]);
}

// ============================================================================
// Load
// ============================================================================

#[test]
fn hand_written_json_loads_without_optional_fields() {
    let json = r#"{
        "entities": [
            {
                "tag": "Anchor",
                "transform": {
                    "position": [1.0, 2.0, 3.0],
                    "rotation": [0.0, 0.0, 0.0],
                    "scale": [1.0, 1.0, 1.0]
                },
                "parent": null
            },
            {
                "tag": "Node",
                "transform": {
                    "position": [0.0, 1.0, 0.0],
                    "rotation": [0.0, 0.0, 0.0],
                    "scale": [1.0, 1.0, 1.0]
                },
                "parent": 0
            }
        ]
    }"#;

    let snapshot: SceneSnapshot = serde_json::from_str(json).unwrap();
    let loaded = Scene::from_snapshot(&snapshot);

    assert_eq!(loaded.registry.len(), 2);
    let node = entity_named(&loaded, "Node");
    let anchor = entity_named(&loaded, "Anchor");
    assert_eq!(loaded.registry.get::<Hierarchy>(node).unwrap().parent, Some(anchor));
    assert!(loaded.registry.get::<Camera>(node).is_none());
    assert!(vec3_approx(
        loaded.registry.get::<Transform>(node).unwrap().world_matrix().transform_point3(Vec3::ZERO),
        Vec3::new(1.0, 3.0, 3.0),
    ));
}

#[test]
fn empty_snapshots_load_to_empty_scenes() {
    let loaded = Scene::from_snapshot(&SceneSnapshot::default());
    assert!(loaded.registry.is_empty());
    assert!(loaded.tree.roots().is_empty());
}
