//! Scene Tree Tests
//!
//! Tests for:
//! - Linking: set_parent/detach, sibling list maintenance, root tracking
//! - Guards: self-attach, cycle detection, entities without hierarchy links
//! - Recursive destruction: subtree removal, sibling patching
//! - World propagation: parent-before-child composition, dirty cascades

use ember::ecs::{EntityId, Registry};
use ember::scene::{Hierarchy, Scene, SceneTree, Transform, ancestors, children, collect_subtree};
use glam::{Mat4, Vec3};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn world_position(scene: &Scene, entity: EntityId) -> Vec3 {
    scene
        .registry
        .get::<Transform>(entity)
        .unwrap()
        .world_matrix()
        .transform_point3(Vec3::ZERO)
}

// ============================================================================
// Linking
// ============================================================================

#[test]
fn set_parent_links_both_directions() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_entity("child");

    assert!(scene.set_parent(child, Some(parent)));

    let child_links = scene.registry.get::<Hierarchy>(child).unwrap();
    assert_eq!(child_links.parent, Some(parent));
    let parent_links = scene.registry.get::<Hierarchy>(parent).unwrap();
    assert_eq!(parent_links.first, Some(child));
}

#[test]
fn new_children_are_prepended() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let a = scene.create_child(parent, "a");
    let b = scene.create_child(parent, "b");
    let c = scene.create_child(parent, "c");

    let order: Vec<EntityId> = children(&scene.registry, parent).collect();
    assert_eq!(order, vec![c, b, a]);
}

#[test]
fn detaching_a_middle_sibling_patches_the_list() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let a = scene.create_child(parent, "a");
    let b = scene.create_child(parent, "b");
    let c = scene.create_child(parent, "c");

    // Sibling order is [c, b, a]; removing b must splice c onto a.
    assert!(scene.detach(b));

    let order: Vec<EntityId> = children(&scene.registry, parent).collect();
    assert_eq!(order, vec![c, a]);
    assert_eq!(scene.registry.get::<Hierarchy>(b).unwrap().parent, None);
    assert_eq!(scene.registry.get::<Hierarchy>(c).unwrap().next, Some(a));
    assert_eq!(scene.registry.get::<Hierarchy>(a).unwrap().prev, Some(c));
}

#[test]
fn reparenting_moves_between_child_lists() {
    let mut scene = Scene::new();
    let first = scene.create_entity("first");
    let second = scene.create_entity("second");
    let child = scene.create_child(first, "child");

    assert!(scene.set_parent(child, Some(second)));

    assert_eq!(children(&scene.registry, first).count(), 0);
    let order: Vec<EntityId> = children(&scene.registry, second).collect();
    assert_eq!(order, vec![child]);
}

#[test]
fn root_list_tracks_attach_and_detach() {
    let mut scene = Scene::new();
    let r1 = scene.create_entity("r1");
    let r2 = scene.create_entity("r2");
    let r3 = scene.create_entity("r3");
    assert_eq!(scene.tree.roots(), &[r1, r2, r3]);

    scene.set_parent(r2, Some(r1));
    assert_eq!(scene.tree.roots(), &[r1, r3]);

    // A detached entity rejoins the root set at the back.
    scene.detach(r2);
    assert_eq!(scene.tree.roots(), &[r1, r3, r2]);
}

#[test]
fn create_child_skips_the_root_list() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_child(parent, "child");
    assert_eq!(scene.tree.roots(), &[parent]);
    assert!(!scene.tree.roots().contains(&child));
}

#[test]
fn ancestors_walk_nearest_first() {
    let mut scene = Scene::new();
    let a = scene.create_entity("a");
    let b = scene.create_child(a, "b");
    let c = scene.create_child(b, "c");

    let chain: Vec<EntityId> = ancestors(&scene.registry, c).collect();
    assert_eq!(chain, vec![b, a]);
    assert_eq!(ancestors(&scene.registry, a).count(), 0);
}

#[test]
fn collect_subtree_includes_the_whole_branch() {
    let mut scene = Scene::new();
    let root = scene.create_entity("root");
    let left = scene.create_child(root, "left");
    let right = scene.create_child(root, "right");
    let leaf = scene.create_child(left, "leaf");

    let subtree = collect_subtree(&scene.registry, root);
    assert_eq!(subtree.len(), 4);
    assert_eq!(subtree[0], root);
    for id in [left, right, leaf] {
        assert!(subtree.contains(&id));
    }
}

// ============================================================================
// Guards
// ============================================================================

#[test]
fn attaching_an_entity_to_itself_is_rejected() {
    let mut scene = Scene::new();
    let e = scene.create_entity("e");
    assert!(!scene.set_parent(e, Some(e)));
    assert_eq!(scene.registry.get::<Hierarchy>(e).unwrap().parent, None);
}

#[test]
#[should_panic(expected = "cycle")]
fn attaching_under_a_descendant_asserts() {
    let mut scene = Scene::new();
    let a = scene.create_entity("a");
    let b = scene.create_child(a, "b");
    let c = scene.create_child(b, "c");
    scene.set_parent(a, Some(c));
}

#[test]
fn entities_without_hierarchy_links_cannot_be_parented() {
    let mut registry = Registry::new();
    let mut tree = SceneTree::new();
    let plain = registry.create();
    assert!(!tree.set_parent(&mut registry, plain, None));
    assert!(tree.roots().is_empty());
}

// ============================================================================
// Recursive Destruction
// ============================================================================

#[test]
fn destroy_removes_the_subtree_and_patches_siblings() {
    let mut scene = Scene::new();
    let root = scene.create_entity("root");
    let branch = scene.create_child(root, "branch");
    let leaf = scene.create_child(branch, "leaf");
    let sibling = scene.create_child(root, "sibling");

    scene.destroy_entity(branch);

    assert!(!scene.registry.contains(branch));
    assert!(!scene.registry.contains(leaf));
    assert!(scene.registry.contains(root));
    assert!(scene.registry.contains(sibling));

    let order: Vec<EntityId> = children(&scene.registry, root).collect();
    assert_eq!(order, vec![sibling]);
}

#[test]
fn destroying_a_root_clears_the_root_list() {
    let mut scene = Scene::new();
    let root = scene.create_entity("root");
    scene.create_child(root, "child");

    scene.destroy_entity(root);

    assert!(scene.registry.is_empty());
    assert!(scene.tree.roots().is_empty());
}

#[test]
fn destroying_twice_is_a_warned_no_op() {
    let mut scene = Scene::new();
    let keep = scene.create_entity("keep");
    let gone = scene.create_entity("gone");

    scene.destroy_entity(gone);
    scene.destroy_entity(gone);

    assert!(scene.registry.contains(keep));
    assert_eq!(scene.registry.len(), 1);
}

// ============================================================================
// World Propagation
// ============================================================================

#[test]
fn child_world_position_composes_with_the_parent() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_child(parent, "child");
    scene.registry.get_mut::<Transform>(parent).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
    scene.registry.get_mut::<Transform>(child).unwrap().position = Vec3::new(4.0, 0.0, 0.0);

    scene.update();

    assert!(vec3_approx(world_position(&scene, parent), Vec3::new(1.0, 2.0, 3.0)));
    assert!(vec3_approx(world_position(&scene, child), Vec3::new(5.0, 2.0, 3.0)));
}

#[test]
fn parent_rotation_swings_child_offsets() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_child(parent, "child");
    scene.registry.get_mut::<Transform>(parent).unwrap().rotation = Vec3::new(0.0, 90.0, 0.0);
    scene.registry.get_mut::<Transform>(child).unwrap().position = Vec3::X;

    scene.update();

    // +90 degrees about Y carries +X onto -Z.
    assert!(vec3_approx(world_position(&scene, child), Vec3::new(0.0, 0.0, -1.0)));
}

#[test]
fn parent_scale_compounds_down_the_chain() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_child(parent, "child");
    scene.registry.get_mut::<Transform>(parent).unwrap().scale = Vec3::splat(2.0);
    scene.registry.get_mut::<Transform>(child).unwrap().position = Vec3::X;

    scene.update();

    assert!(vec3_approx(world_position(&scene, child), Vec3::new(2.0, 0.0, 0.0)));
    let world = scene.registry.get::<Transform>(child).unwrap().world_matrix();
    assert!(vec3_approx(world.transform_point3(Vec3::X), Vec3::new(4.0, 0.0, 0.0)));
}

#[test]
fn world_matrices_are_stale_until_update_runs() {
    let mut scene = Scene::new();
    let e = scene.create_entity("e");
    scene.update();

    scene.registry.get_mut::<Transform>(e).unwrap().position = Vec3::new(9.0, 0.0, 0.0);
    assert!(vec3_approx(world_position(&scene, e), Vec3::ZERO));

    scene.update();
    assert!(vec3_approx(world_position(&scene, e), Vec3::new(9.0, 0.0, 0.0)));
}

#[test]
fn assigning_a_local_matrix_updates_the_world() {
    let mut scene = Scene::new();
    let e = scene.create_entity("e");
    scene.update();

    // The entity is settled; the matrix assignment alone must dirty it.
    scene
        .registry
        .get_mut::<Transform>(e)
        .unwrap()
        .set_local_matrix(Mat4::from_translation(Vec3::X));
    scene.update();

    assert!(vec3_approx(world_position(&scene, e), Vec3::X));
}

#[test]
fn matrix_and_trs_edits_agree_after_update() {
    let mut scene = Scene::new();
    let via_fields = scene.create_entity("fields");
    let via_matrix = scene.create_entity("matrix");
    scene.update();

    {
        let t = scene.registry.get_mut::<Transform>(via_fields).unwrap();
        t.position = Vec3::new(2.0, 1.0, 0.0);
        t.rotation = Vec3::new(0.0, 40.0, 0.0);
        t.scale = Vec3::splat(1.5);
    }
    let edited = scene
        .registry
        .get::<Transform>(via_fields)
        .unwrap()
        .local_matrix();
    scene
        .registry
        .get_mut::<Transform>(via_matrix)
        .unwrap()
        .set_local_matrix(edited);
    scene.update();

    let a = scene.registry.get::<Transform>(via_fields).unwrap().world_matrix();
    let b = scene.registry.get::<Transform>(via_matrix).unwrap().world_matrix();
    assert!(a.abs_diff_eq(b, 1e-4));
}

#[test]
fn moving_a_parent_cascades_to_clean_children() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_child(parent, "child");
    scene.registry.get_mut::<Transform>(child).unwrap().position = Vec3::Y;
    scene.update();

    // Only the parent is touched; the child's shadow state is clean.
    scene.registry.get_mut::<Transform>(parent).unwrap().position = Vec3::X;
    scene.update();

    assert!(vec3_approx(world_position(&scene, child), Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn moving_a_child_leaves_the_parent_untouched() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_child(parent, "child");
    scene.registry.get_mut::<Transform>(parent).unwrap().position = Vec3::X;
    scene.update();

    scene.registry.get_mut::<Transform>(child).unwrap().position = Vec3::Z;
    scene.update();

    assert!(vec3_approx(world_position(&scene, parent), Vec3::X));
    assert!(vec3_approx(world_position(&scene, child), Vec3::new(1.0, 0.0, 1.0)));
}

#[test]
fn reparenting_recomputes_against_the_new_parent() {
    let mut scene = Scene::new();
    let a = scene.create_entity("a");
    let b = scene.create_entity("b");
    let child = scene.create_child(a, "child");
    scene.registry.get_mut::<Transform>(a).unwrap().position = Vec3::new(10.0, 0.0, 0.0);
    scene.registry.get_mut::<Transform>(b).unwrap().position = Vec3::new(20.0, 0.0, 0.0);
    scene.registry.get_mut::<Transform>(child).unwrap().position = Vec3::X;
    scene.update();
    assert!(vec3_approx(world_position(&scene, child), Vec3::new(11.0, 0.0, 0.0)));

    // The local transform is unchanged, yet the move must dirty the child.
    scene.set_parent(child, Some(b));
    scene.update();
    assert!(vec3_approx(world_position(&scene, child), Vec3::new(21.0, 0.0, 0.0)));
}

#[test]
fn deep_chains_update_without_recursion() {
    let mut scene = Scene::new();
    let mut cursor = scene.create_entity("link");
    scene.registry.get_mut::<Transform>(cursor).unwrap().position = Vec3::X;
    for _ in 1..500 {
        cursor = scene.create_child(cursor, "link");
        scene.registry.get_mut::<Transform>(cursor).unwrap().position = Vec3::X;
    }

    scene.update();

    assert!(vec3_approx(world_position(&scene, cursor), Vec3::new(500.0, 0.0, 0.0)));
}

#[test]
fn entities_without_transforms_pass_the_parent_matrix_through() {
    let mut registry = Registry::new();
    let mut tree = SceneTree::new();

    let top = registry.create();
    registry.add(top, Transform::new());
    registry.add(top, Hierarchy::default());
    tree.set_parent(&mut registry, top, None);

    // A bare grouping entity: hierarchy links but no transform of its own.
    let group = registry.create();
    registry.add(group, Hierarchy::default());
    tree.set_parent(&mut registry, group, Some(top));

    let leaf = registry.create();
    registry.add(leaf, Transform::new());
    registry.add(leaf, Hierarchy::default());
    tree.set_parent(&mut registry, leaf, Some(group));

    registry.get_mut::<Transform>(top).unwrap().position = Vec3::X;
    registry.get_mut::<Transform>(leaf).unwrap().position = Vec3::Y;

    tree.update(&mut registry);

    let world = registry.get::<Transform>(leaf).unwrap().world_matrix();
    assert!(vec3_approx(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0)));
}
