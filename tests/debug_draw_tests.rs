//! Debug Renderer Integration Tests
//!
//! Tests for:
//! - Flush: single batched line draw over the finished frame
//! - Depth handling: lines test depth but never write it
//! - Batch lifecycle: reset after flush, re-use across frames

use ember::render::{DebugRenderer, DrawKind, HeadlessDevice, Renderer, RendererSettings};
use glam::{Mat4, Vec3};

fn renderer() -> Renderer {
    let settings = RendererSettings {
        width: 64,
        height: 64,
        ..RendererSettings::default()
    };
    Renderer::new(Box::new(HeadlessDevice::new()), settings).unwrap()
}

fn headless(renderer: &Renderer) -> &HeadlessDevice {
    renderer
        .device()
        .as_any()
        .downcast_ref::<HeadlessDevice>()
        .unwrap()
}

#[test]
fn flush_draws_the_whole_batch_in_one_call() {
    let mut r = renderer();
    let mut debug = DebugRenderer::new(r.device_mut()).unwrap();

    debug.line(Vec3::ZERO, Vec3::X, Vec3::ONE);
    debug.aabb(Vec3::splat(-1.0), Vec3::splat(1.0), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(debug.vertex_count(), 26);

    let target = r.main_framebuffer();
    debug.flush(r.device_mut(), target);

    let events = headless(&r).draw_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DrawKind::Lines { vertex_count: 26 });
    assert_eq!(events[0].target, Some(target));
    assert_eq!(debug.vertex_count(), 0);
}

#[test]
fn lines_test_depth_but_never_write_it() {
    let mut r = renderer();
    let mut debug = DebugRenderer::new(r.device_mut()).unwrap();
    debug.line(Vec3::ZERO, Vec3::Y, Vec3::ONE);

    let target = r.main_framebuffer();
    debug.flush(r.device_mut(), target);

    let event = headless(&r).draw_events()[0];
    assert!(event.depth_test);
    assert!(!event.depth_write);
}

#[test]
fn empty_batches_flush_to_nothing() {
    let mut r = renderer();
    let mut debug = DebugRenderer::new(r.device_mut()).unwrap();

    let target = r.main_framebuffer();
    debug.flush(r.device_mut(), target);

    assert!(headless(&r).draw_events().is_empty());
}

#[test]
fn overlay_draws_after_the_frame_passes() {
    let mut r = renderer();
    let mut debug = DebugRenderer::new(r.device_mut()).unwrap();

    r.begin_scene(&Mat4::IDENTITY, &Mat4::IDENTITY);
    r.end_scene();
    debug.frustum(&Mat4::IDENTITY.inverse(), Vec3::ONE);
    let target = r.main_framebuffer();
    debug.flush(r.device_mut(), target);

    // Tone map, composite, then the overlay batch.
    let events = headless(&r).draw_events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].kind, DrawKind::Lines { vertex_count: 24 });
    assert_eq!(events[2].target, Some(target));
}

#[test]
fn batches_rebuild_each_frame() {
    let mut r = renderer();
    let mut debug = DebugRenderer::new(r.device_mut()).unwrap();
    let target = r.main_framebuffer();

    debug.line(Vec3::ZERO, Vec3::X, Vec3::ONE);
    debug.flush(r.device_mut(), target);
    debug.sphere(Vec3::ZERO, 2.0, Vec3::ONE);
    debug.flush(r.device_mut(), target);

    let events = headless(&r).draw_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, DrawKind::Lines { vertex_count: 2 });
    assert_eq!(events[1].kind, DrawKind::Lines { vertex_count: 192 });
}
