//! Showroom scene assembly
//!
//! A floor, three walls, a pair of glass doors in the front wall, a spinning
//! car on a plinth and a neon sign.

use std::rc::Rc;

use scene_engine::prelude::*;
use scene_engine::scene::SceneError;

const ROOM_HALF_WIDTH: f32 = 8.0;
const ROOM_DEPTH: f32 = 12.0;
const WALL_HEIGHT: f32 = 4.0;
const WALL_THICKNESS: f32 = 0.2;
const DOOR_WIDTH: f32 = 1.2;
const DOOR_HEIGHT: f32 = 2.4;

/// Handles the driver needs after assembly
pub struct Showroom {
    /// Left door of the entrance
    pub left_door: NodeId,
    /// Right door of the entrance
    pub right_door: NodeId,
    /// Spinning car group
    pub turntable: NodeId,
}

/// Build the showroom into `engine` and register its collision volumes
pub fn build(engine: &mut Engine) -> Result<Showroom, SceneError> {
    let scene = &mut engine.scene;

    scene.add_root(
        Node::primitive(Primitive::Plane)
            .scaled(Vec3::new(ROOM_HALF_WIDTH * 2.0, 1.0, ROOM_DEPTH))
            .with_material(Material::matte(0.35, 0.35, 0.4))
            .with_shadow(false),
    );

    let back = wall(scene, ROOM_HALF_WIDTH * 2.0)?;
    scene.node_mut(back)?.transform.position = Vec3::new(0.0, 0.0, -ROOM_DEPTH);

    let side = wall(scene, ROOM_DEPTH)?;
    {
        let transform = &mut scene.node_mut(side)?.transform;
        transform.position = Vec3::new(-ROOM_HALF_WIDTH, 0.0, -ROOM_DEPTH / 2.0);
        transform.rotation = Vec3::new(0.0, 90.0, 0.0);
    }
    let mirrored = scene.clone_subtree(side, Placement::Root)?;
    scene.node_mut(mirrored)?.transform.position.x = ROOM_HALF_WIDTH;

    // Front wall in two segments around the doorway
    let segment = ROOM_HALF_WIDTH - DOOR_WIDTH;
    for sign in [-1.0, 1.0] {
        let front = wall(scene, segment)?;
        scene.node_mut(front)?.transform.position = Vec3::new(sign * (DOOR_WIDTH + segment / 2.0), 0.0, 0.0);
    }

    let left_door = door(scene, -DOOR_WIDTH / 2.0, 1.0)?;
    let right_door = door(scene, DOOR_WIDTH / 2.0, -1.0)?;

    let turntable = scene.add_root(
        Node::composite()
            .at(Vec3::new(0.0, 0.0, -ROOM_DEPTH / 2.0))
            .with_animation(Animation::Spin {
                axis: Vec3::y(),
                degrees_per_second: 20.0,
            }),
    );
    scene.add_child(
        turntable,
        Node::primitive(Primitive::Cylinder)
            .at(Vec3::new(0.0, 0.15, 0.0))
            .rotated(Vec3::new(90.0, 0.0, 0.0))
            .scaled(Vec3::new(4.0, 4.0, 0.3))
            .with_material(Material::chrome()),
    )?;
    let car = engine.assets.load_model("models/car.obj");
    let scene = &mut engine.scene;
    scene.add_child(
        turntable,
        Node::imported(Rc::clone(&car))
            .at(Vec3::new(0.0, 0.3, 0.0))
            .with_material(Material::plastic(0.7, 0.1, 0.1)),
    )?;
    scene.add_child(
        turntable,
        Node::collision_volume(4.0, 1.5, 4.0).at(Vec3::new(0.0, 0.75, 0.0)),
    )?;

    scene.add_root(
        Node::text("SHOWROOM")
            .at(Vec3::new(0.0, 3.2, -ROOM_DEPTH + WALL_THICKNESS))
            .with_material(Material::neon(0.2, 0.9, 1.0)),
    );

    engine.rebuild_registry();
    engine.lights.add_point_light(PointLight::new(
        Vec3::new(0.0, 3.5, -ROOM_DEPTH / 2.0),
        Vec3::new(1.0, 0.9, 0.8),
        1.5,
    ));
    engine.lights.add_point_light(PointLight::new(
        Vec3::new(0.0, 3.2, -ROOM_DEPTH + 0.5),
        Vec3::new(0.2, 0.9, 1.0),
        0.8,
    ));

    log::info!(
        "Showroom assembled: {} node(s), {} collision entr(ies), car has {} triangle(s)",
        engine.scene.len(),
        engine.registry.len(),
        car.triangle_count()
    );
    Ok(Showroom {
        left_door,
        right_door,
        turntable,
    })
}

/// A wall of the given length along its local X, standing on the floor
fn wall(scene: &mut SceneGraph, length: f32) -> Result<NodeId, SceneError> {
    let group = scene.add_root(Node::composite());
    let centre = Vec3::new(0.0, WALL_HEIGHT / 2.0, 0.0);
    scene.add_child(
        group,
        Node::primitive(Primitive::Cube)
            .at(centre)
            .scaled(Vec3::new(length, WALL_HEIGHT, WALL_THICKNESS))
            .with_material(Material::matte(0.8, 0.8, 0.75)),
    )?;
    scene.add_child(
        group,
        Node::collision_volume(length, WALL_HEIGHT, WALL_THICKNESS).at(centre),
    )?;
    Ok(group)
}

/// A glass door hinged on its outer edge, labelled near the hinge
///
/// The labels sit apart so a viewer lined up with one door picks that door.
fn door(scene: &mut SceneGraph, x: f32, open_sign: f32) -> Result<NodeId, SceneError> {
    let hinge = Vec3::new(x * 2.0, DOOR_HEIGHT / 2.0, 0.0);
    let group = scene.add_root(
        Node::composite()
            .at(Vec3::new(x, DOOR_HEIGHT / 2.0, 0.0))
            .with_animation(Animation::Swing(SwingState::new(hinge, open_sign)))
            .with_interaction(InteractionHandler::ToggleSwing),
    );
    scene.add_child(
        group,
        Node::primitive(Primitive::Cube)
            .scaled(Vec3::new(DOOR_WIDTH, DOOR_HEIGHT, 0.05))
            .with_material(Material::glass()),
    )?;
    scene.add_child(group, Node::collision_volume(DOOR_WIDTH, DOOR_HEIGHT, 0.05))?;
    scene.add_child(
        group,
        Node::text("PUSH")
            .at(Vec3::new(-open_sign * DOOR_WIDTH / 4.0, 0.2, 0.05))
            .scaled(Vec3::new(0.2, 0.2, 0.2))
            .with_material(Material::neon(1.0, 0.3, 0.6)),
    )?;
    Ok(group)
}
