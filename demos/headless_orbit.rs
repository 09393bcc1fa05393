use std::f32::consts::TAU;

use ember::render::{DebugRenderer, HeadlessDevice, Renderer, RendererSettings};
use ember::resources::Mesh;
use ember::scene::{Camera, Light, MeshComponent, Scene, Tag, Transform};
use glam::Vec3;

const FRAMES: u32 = 120;

fn main() -> ember::errors::Result<()> {
    env_logger::init();

    // === 1. Renderer over the CPU-only device ===
    let settings = RendererSettings {
        width: 640,
        height: 360,
        ..RendererSettings::default()
    };
    let mut renderer = Renderer::new(Box::new(HeadlessDevice::new()), settings)?;
    let mut debug = DebugRenderer::new(renderer.device_mut())?;

    // === 2. A ring of cubes around the origin ===
    let mut scene = Scene::new();
    let cube_mesh = Mesh::cube(renderer.device_mut(), 1.0)?;
    let ring = scene.create_entity("Ring");
    for i in 0..8 {
        let angle = TAU * i as f32 / 8.0;
        let cube = scene.create_child(ring, "Cube");
        scene.registry.add(cube, MeshComponent::new(cube_mesh.clone()));
        scene.registry.get_mut::<Transform>(cube).unwrap().position =
            Vec3::new(angle.cos() * 4.0, 0.0, angle.sin() * 4.0);
    }

    // === 3. Lights: a warm point light over a cool sun ===
    let sun = scene.create_entity("Sun");
    scene.registry.add(sun, Light::directional(Vec3::new(0.8, 0.85, 1.0), 2.0));
    scene.registry.get_mut::<Transform>(sun).unwrap().rotation = Vec3::new(-45.0, 30.0, 0.0);

    let lamp = scene.create_entity("Lamp");
    scene.registry.add(lamp, Light::point(Vec3::new(1.0, 0.6, 0.2), 5.0, 20.0));
    scene.registry.get_mut::<Transform>(lamp).unwrap().position = Vec3::new(0.0, 3.0, 0.0);

    // === 4. Orbiting camera ===
    let camera = scene.create_entity("Camera");
    scene.registry.add(
        camera,
        Camera::new_perspective(60.0, 640.0 / 360.0, 0.1, 100.0).primary(),
    );

    // === 5. Run the orbit and pick whatever crosses the crosshair ===
    for frame in 0..FRAMES {
        let angle = TAU * frame as f32 / FRAMES as f32;
        {
            let t = scene.registry.get_mut::<Transform>(camera).unwrap();
            t.position = Vec3::new(angle.cos() * 10.0, 4.0, angle.sin() * 10.0);
            t.look_at(Vec3::ZERO, Vec3::Y);
        }
        scene.registry.get_mut::<Transform>(ring).unwrap().rotation.y = frame as f32 * 3.0;

        scene.update();
        scene.render(&mut renderer);

        debug.sphere(Vec3::ZERO, 4.0, Vec3::new(0.2, 0.8, 0.2));
        let overlay_target = renderer.main_framebuffer();
        debug.flush(renderer.device_mut(), overlay_target);

        if frame % 30 == 0 {
            let (width, height) = renderer.size();
            match scene.entity_at_pixel(&renderer, width / 2, height / 2)? {
                Some(entity) => {
                    let name = scene
                        .registry
                        .get::<Tag>(entity)
                        .map_or("<unnamed>", |tag| tag.name.as_str());
                    log::info!("frame {frame}: '{name}' under the crosshair");
                }
                None => log::info!("frame {frame}: nothing under the crosshair"),
            }
        }
    }

    let stats = renderer.stats();
    println!(
        "rendered {FRAMES} frames, last frame: {} draws / {} vertices / {} indices",
        stats.draw_calls, stats.vertices, stats.indices
    );
    renderer.shutdown();
    Ok(())
}
