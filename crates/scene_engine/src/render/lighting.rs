//! Lighting system
//!
//! One directional sun in slot 0 plus up to [`MAX_POINT_LIGHTS`] point lights in
//! slots 1..=7. Lights beyond the available slots are ignored with a warning.

use crate::foundation::math::{Vec3, Vec4};

/// Total fixed-function light slots available on the backend
pub const MAX_LIGHT_SLOTS: u32 = 8;

/// Point lights share the slots left after the sun
pub const MAX_POINT_LIGHTS: usize = (MAX_LIGHT_SLOTS - 1) as usize;

/// Light parameters as submitted to a backend slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    /// Homogeneous position; `w == 0` marks a direction
    pub position: Vec4,
    /// Diffuse colour
    pub diffuse: [f32; 4],
    /// Specular colour
    pub specular: [f32; 4],
    /// Linear attenuation factor (0 for directional)
    pub linear_attenuation: f32,
}

/// Infinite directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction towards the light
    pub direction: Vec3,
    /// Diffuse colour
    pub diffuse: [f32; 4],
    /// Specular colour
    pub specular: [f32; 4],
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(1.0, 1.0, 1.0),
            diffuse: [1.0, 0.95, 0.8, 1.0],
            specular: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl DirectionalLight {
    /// Backend light parameters
    pub fn source(&self) -> LightSource {
        LightSource {
            position: self.direction.push(0.0),
            diffuse: self.diffuse,
            specular: self.specular,
            linear_attenuation: 0.0,
        }
    }
}

/// Positional light with linear falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World position
    pub position: Vec3,
    /// Base colour
    pub color: Vec3,
    /// Multiplier applied to colour
    pub intensity: f32,
}

impl PointLight {
    /// Standard attenuation for every point light
    pub const LINEAR_ATTENUATION: f32 = 0.05;

    /// Create a point light
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }

    /// Backend light parameters
    pub fn source(&self) -> LightSource {
        let c = self.color * self.intensity;
        LightSource {
            position: self.position.push(1.0),
            diffuse: [c.x, c.y, c.z, 1.0],
            specular: [c.x, c.y, c.z, 1.0],
            linear_attenuation: Self::LINEAR_ATTENUATION,
        }
    }
}

/// Scene lights, allocated to backend slots each frame
#[derive(Debug, Clone, Default)]
pub struct LightingRig {
    /// The sun (slot 0)
    pub sun: DirectionalLight,
    point_lights: Vec<PointLight>,
}

impl LightingRig {
    /// Create a rig with the default sun and no point lights
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point light; returns its slot, or `None` when every slot is taken
    pub fn add_point_light(&mut self, light: PointLight) -> Option<u32> {
        if self.point_lights.len() >= MAX_POINT_LIGHTS {
            log::warn!(
                "Point light at {:?} ignored: all {} slots in use",
                light.position,
                MAX_POINT_LIGHTS
            );
            return None;
        }
        self.point_lights.push(light);
        Some(self.point_lights.len() as u32)
    }

    /// Registered point lights
    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// `(slot, parameters)` for every active light, sun first
    pub fn slots(&self) -> impl Iterator<Item = (u32, LightSource)> + '_ {
        std::iter::once((0, self.sun.source())).chain(
            self.point_lights
                .iter()
                .enumerate()
                .map(|(i, light)| (i as u32 + 1, light.source())),
        )
    }
}
