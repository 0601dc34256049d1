//! # Engine Configuration
//!
//! Every tunable of the scene engine in one serializable tree. Defaults
//! reproduce the stock showroom: a 1.5 m tall, 0.3 m wide player under
//! 9.8 m/s² gravity, a 10 m interaction reach and a sun-cast shadow on the
//! ground plane.
//!
//! ## Configuration Categories
//!
//! - **Engine**: logging, debug drawing, frame-delta clamp
//! - **Physics**: player body and movement
//! - **Interaction**: ray reach and hit radius
//! - **Shadow**: planar shadow light, plane and colour
//! - **Atmosphere**: clear colour, fog and global ambient light
//! - **Viewer**: starting eye position and look angles
//! - **Assets**: where models and textures live

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Core engine behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter; `RUST_LOG` overrides it
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Draw collision volumes as flat boxes
    pub show_collision_volumes: bool,
    /// Longest frame step fed to the simulation, in seconds
    pub max_frame_delta: f32,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            show_collision_volumes: false,
            max_frame_delta: 0.1,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Draw collision volumes
    pub fn with_collision_volumes(mut self, visible: bool) -> Self {
        self.show_collision_volumes = visible;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Player body and movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, units per second squared
    pub gravity: f32,
    /// Eye height above the feet
    pub player_height: f32,
    /// Horizontal radius of the player cylinder
    pub player_radius: f32,
    /// Vertical speed set by a jump
    pub jump_velocity: f32,
    /// Walking speed, units per second
    pub walk_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            player_height: 1.5,
            player_radius: 0.3,
            jump_velocity: 5.0,
            walk_speed: 6.0,
        }
    }
}

/// Interaction ray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Nodes further along the ray than this are ignored
    pub max_distance: f32,
    /// Largest miss distance that still counts as a hit
    pub hit_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            max_distance: 10.0,
            hit_radius: 1.5,
        }
    }
}

/// Planar shadow pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Homogeneous light vector; `w == 0` for a directional light
    pub light: [f32; 4],
    /// Receiving plane `(a, b, c, d)` with `ax + by + cz + d = 0`
    pub ground_plane: [f32; 4],
    /// Flat shadow colour
    pub color: [f32; 4],
    /// Polygon offset `(factor, units)` against z-fighting with the floor
    pub depth_bias: (f32, f32),
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            light: [1.0, 1.0, 1.0, 0.0],
            ground_plane: [0.0, 1.0, 0.0, 0.0],
            color: [0.0, 0.0, 0.0, 0.5],
            depth_bias: (-1.0, -1.0),
        }
    }
}

/// Scene-wide colour and fog
///
/// Defaults give a dark blue night: fog fades into the clear colour and the
/// global ambient keeps unlit faces faintly blue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Background colour
    pub clear_color: [f32; 4],
    /// Exponential-squared fog density; 0 disables fog
    pub fog_density: f32,
    /// Colour distant geometry fades to
    pub fog_color: [f32; 4],
    /// Ambient light added to every lit surface
    pub global_ambient: [f32; 4],
    /// Compute specular highlights from the eye position instead of an
    /// infinitely distant viewer
    pub local_viewer: bool,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.02, 0.02, 0.1, 1.0],
            fog_density: 0.03,
            fog_color: [0.02, 0.02, 0.1, 1.0],
            global_ambient: [0.1, 0.1, 0.25, 1.0],
            local_viewer: true,
        }
    }
}

/// Starting viewer pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Eye position
    pub position: [f32; 3],
    /// Heading in degrees
    pub yaw: f32,
    /// Elevation in degrees
    pub pitch: f32,
    /// Degrees per pixel of mouse motion
    pub mouse_sensitivity: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 5.0],
            yaw: -90.0,
            pitch: 0.0,
            mouse_sensitivity: 0.1,
        }
    }
}

/// # Asset Configuration
///
/// Where the importer looks for models and textures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for assets
    pub assets_dir: String,
}

impl AssetConfig {
    /// Create a new asset configuration
    pub fn new() -> Self {
        Self {
            assets_dir: "resources".to_string(),
        }
    }

    /// Set assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Player physics
    pub physics: PhysicsConfig,
    /// Interaction ray
    pub interaction: InteractionConfig,
    /// Planar shadow
    pub shadow: ShadowConfig,
    /// Clear colour, fog and ambient light
    pub atmosphere: AtmosphereConfig,
    /// Starting viewer
    pub viewer: ViewerConfig,
    /// Asset system configuration
    pub assets: AssetConfig,
}

impl ApplicationConfig {
    /// Smallest `|plane · light|` accepted for the shadow projection
    pub const SHADOW_EPSILON: f32 = 1e-6;

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        if physics.player_height <= 0.0 || physics.player_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "player dimensions must be positive (height {}, radius {})",
                physics.player_height, physics.player_radius
            )));
        }
        if self.interaction.hit_radius <= 0.0 || self.interaction.max_distance <= 0.0 {
            return Err(ConfigError::Invalid(
                "interaction reach and hit radius must be positive".to_string(),
            ));
        }
        let [lx, ly, lz, lw] = self.shadow.light;
        if lx == 0.0 && ly == 0.0 && lz == 0.0 && lw == 0.0 {
            return Err(ConfigError::Invalid("shadow light vector is zero".to_string()));
        }
        // A light parallel to the plane never reaches it
        let [a, b, c, d] = self.shadow.ground_plane;
        let facing = a * lx + b * ly + c * lz + d * lw;
        if facing.abs() < Self::SHADOW_EPSILON {
            return Err(ConfigError::Invalid(format!(
                "shadow light {:?} is parallel to ground plane {:?}",
                self.shadow.light, self.shadow.ground_plane
            )));
        }
        if self.atmosphere.fog_density < 0.0 {
            return Err(ConfigError::Invalid("fog_density must not be negative".to_string()));
        }
        if self.engine.max_frame_delta <= 0.0 {
            return Err(ConfigError::Invalid("max_frame_delta must be positive".to_string()));
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ApplicationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_light() {
        let mut config = ApplicationConfig::default();
        config.shadow.light = [0.0; 4];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_light_parallel_to_ground() {
        let mut config = ApplicationConfig::default();
        config.shadow.light = [1.0, 0.0, 0.0, 0.0];
        config.shadow.ground_plane = [0.0, 1.0, 0.0, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // A point light on the plane itself is just as degenerate
        config.shadow.light = [2.0, 0.0, 3.0, 1.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.shadow.light = [1.0, 0.5, 0.0, 0.0];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_fog() {
        let mut config = ApplicationConfig::default();
        config.atmosphere.fog_density = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.atmosphere.fog_density = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
[physics]
gravity = 4.0

[engine]
show_collision_volumes = true
"#;
        let config = ApplicationConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        assert_eq!(config.physics.gravity, 4.0);
        assert_eq!(config.physics.player_height, 1.5);
        assert!(config.engine.show_collision_volumes);
        assert_eq!(config.interaction, InteractionConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = ApplicationConfig::default();
        config.viewer.yaw = 45.0;
        let text = config.to_string_as(ConfigFormat::Ron).unwrap();
        let back = ApplicationConfig::from_str_as(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = ApplicationConfig::load_from_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
