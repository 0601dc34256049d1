//! Core engine implementation

use crate::{
    assets::{AssetError, AssetLoader},
    core::config::{ApplicationConfig, ConfigError},
    foundation::{
        math::{Mat4, Vec3},
        time::FrameClock,
    },
    input::{InputState, KeyCode, Viewer},
    interaction,
    physics::{MovementOutcome, PhysicsRegistry, PlayerController},
    render::{FrameStats, LightingRig, RenderBackend, RenderError, RenderPipeline},
    scene::{NodeId, NodeKind, Placement, SceneError, SceneGraph},
};
use thiserror::Error;

/// Main engine struct
///
/// Owns the scene and every subsystem that reads or mutates it. A driver
/// feeds input, then calls [`Engine::update_frame`] and
/// [`Engine::render_frame`] once per frame.
pub struct Engine {
    /// Scene tree
    pub scene: SceneGraph,

    /// Boxes the player collides with
    pub registry: PhysicsRegistry,

    /// First-person viewer
    pub viewer: Viewer,

    /// Keyboard and mouse state
    pub input: InputState,

    /// Sun and point lights
    pub lights: LightingRig,

    /// Model importer
    pub assets: AssetLoader,

    controller: PlayerController,
    pipeline: RenderPipeline,
    clock: FrameClock,
    config: ApplicationConfig,
    interaction_pending: bool,
    exit_requested: bool,
}

impl Engine {
    /// Create an engine with an empty scene
    pub fn new(config: ApplicationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");

        Ok(Self {
            scene: SceneGraph::new(),
            registry: PhysicsRegistry::new(),
            viewer: Viewer::from_config(&config.viewer),
            input: InputState::new(),
            lights: LightingRig::new(),
            assets: AssetLoader::new(&config.assets),
            controller: PlayerController::new(config.physics),
            pipeline: RenderPipeline::new(config.shadow, config.atmosphere, config.engine.show_collision_volumes),
            clock: FrameClock::new(config.engine.max_frame_delta),
            config,
            interaction_pending: false,
            exit_requested: false,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Frame timing
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Player body
    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    /// Re-register every collision volume in the scene
    pub fn rebuild_registry(&mut self) {
        self.registry = PhysicsRegistry::from_scene(&self.scene);
    }

    /// Show or hide collision volumes
    pub fn set_show_collision_volumes(&mut self, visible: bool) {
        self.config.engine.show_collision_volumes = visible;
        self.pipeline.set_show_collision_volumes(visible);
    }

    /// Key press or release
    ///
    /// Pressing `E` queues an interaction for the next [`Engine::update_frame`];
    /// pressing `Escape` raises [`Engine::exit_requested`]. Key repeat while
    /// held does not retrigger either.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let newly_pressed = pressed && !self.input.is_pressed(key);
        self.input.handle_key_input(key, pressed);
        if !newly_pressed {
            return;
        }
        match key {
            KeyCode::E => self.interaction_pending = true,
            KeyCode::Escape => {
                log::info!("Exit requested");
                self.exit_requested = true;
            }
            _ => {}
        }
    }

    /// True once `Escape` has been pressed; the driver should stop its loop
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Mouse motion in pixels
    pub fn handle_mouse_move(&mut self, dx: f32, dy: f32) {
        self.input.handle_mouse_move(dx, dy);
    }

    /// Advance by the wall-clock time since the last tick
    pub fn tick(&mut self) -> MovementOutcome {
        let delta_time = self.clock.tick();
        self.update_frame(delta_time)
    }

    /// Advance the simulation by `delta_time` seconds
    ///
    /// Mouse look is applied and the player moves against the registered
    /// boxes. A queued interaction is then cast from the new eye position
    /// before every node's animation runs.
    pub fn update_frame(&mut self, delta_time: f32) -> MovementOutcome {
        let (dx, dy) = self.input.take_mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            self.viewer.apply_mouse_delta(dx, dy);
        }

        let outcome = self.controller.step(
            &mut self.viewer,
            self.input.movement_intent(),
            &self.scene,
            &self.registry,
            delta_time,
        );

        if std::mem::take(&mut self.interaction_pending) {
            match self.interact() {
                Ok(Some(node)) => log::info!("Interaction handled by {:?}", node),
                Ok(None) => log::debug!("Nothing to interact with"),
                Err(e) => log::warn!("Interaction failed: {}", e),
            }
        }

        let animated = self.scene.update(delta_time);
        log::trace!("Updated {} animated node(s), movement {:?}", animated, outcome);
        outcome
    }

    /// View matrix of the viewer
    pub fn view_matrix(&self) -> Mat4 {
        let eye = nalgebra::Point3::from(self.viewer.position);
        let target = nalgebra::Point3::from(self.viewer.target());
        Mat4::look_at_rh(&eye, &target, &Vec3::y())
    }

    /// Draw the scene through `backend`
    pub fn render_frame<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> Result<FrameStats, EngineError> {
        let view = self.view_matrix();
        Ok(self.pipeline.render_frame(backend, &self.scene, &self.lights, &view)?)
    }

    /// True if a player with its eye at `point` would collide
    pub fn query_collision(&self, point: Vec3) -> bool {
        self.registry.is_colliding(&self.scene, point, self.controller.shape())
    }

    /// Interact with the nearest leaf along a ray; returns the node whose
    /// handler ran
    pub fn cast_interaction_ray(&mut self, origin: Vec3, direction: Vec3) -> Result<Option<NodeId>, EngineError> {
        Ok(interaction::cast(&mut self.scene, origin, direction, &self.config.interaction)?)
    }

    /// Interact along the viewer's line of sight
    pub fn interact(&mut self) -> Result<Option<NodeId>, EngineError> {
        let origin = self.viewer.position;
        let direction = self.viewer.look_direction();
        self.cast_interaction_ray(origin, direction)
    }

    /// Deep-copy a subtree; collision volumes in the copy are registered
    /// unless an ancestor entry already covers them
    pub fn clone_node(&mut self, source: NodeId, placement: Placement) -> Result<NodeId, EngineError> {
        let copy = self.scene.clone_subtree(source, placement)?;

        let covered = self
            .scene
            .ancestors(copy)
            .any(|(id, _)| self.registry.entries().contains(&id));
        if !covered {
            let is_volume = matches!(self.scene.node(copy)?.kind(), NodeKind::CollisionVolume { .. });
            if is_volume || !self.scene.collision_volumes_under(copy).is_empty() {
                self.registry.register(copy);
            }
        }
        Ok(copy)
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Asset system error
    #[error("Asset system error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
