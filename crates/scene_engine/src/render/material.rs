//! Material system for rendering
//!
//! Fixed-function Phong material: ambient, diffuse, specular and emission
//! colours plus a shininess exponent. The diffuse alpha decides which render
//! pass a leaf belongs to.

/// RGBA colour
pub type Rgba = [f32; 4];

/// Material properties for 3D rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient reflectance (RGBA)
    pub ambient: Rgba,

    /// Diffuse reflectance (RGBA); alpha drives transparency
    pub diffuse: Rgba,

    /// Specular reflectance (RGBA)
    pub specular: Rgba,

    /// Emitted colour (RGBA)
    pub emission: Rgba,

    /// Specular exponent
    pub shininess: f32,
}

impl Material {
    /// Create a new material with default properties (light grey, no highlight)
    pub const fn new() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            emission: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
        }
    }

    /// Opacity of the material
    pub fn alpha(&self) -> f32 {
        self.diffuse[3]
    }

    /// True if the diffuse alpha is below 1
    pub fn is_transparent(&self) -> bool {
        self.alpha() < 1.0
    }

    /// Set the diffuse colour, keeping ambient at a fifth of it
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.diffuse = [r, g, b, self.diffuse[3]];
        self.ambient = [r * 0.2, g * 0.2, b * 0.2, self.ambient[3]];
        self
    }

    /// Set the alpha of both ambient and diffuse
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        self.diffuse[3] = alpha;
        self.ambient[3] = alpha;
        self
    }

    /// Transparent, dark-tinted glass with a sharp white highlight
    pub fn glass() -> Self {
        Self {
            ambient: [0.0, 0.0, 0.1, 0.2],
            diffuse: [0.0, 0.0, 0.1, 0.2],
            specular: [1.0, 1.0, 1.0, 1.0],
            shininess: 120.0,
            ..Self::new()
        }
    }

    /// Self-lit neon colour
    pub fn neon(r: f32, g: f32, b: f32) -> Self {
        Self {
            emission: [r, g, b, 1.0],
            diffuse: [0.0, 0.0, 0.0, 1.0],
            ..Self::new()
        }
    }

    /// Polished chrome
    pub fn chrome() -> Self {
        Self {
            ambient: [0.25, 0.25, 0.25, 1.0],
            diffuse: [0.4, 0.4, 0.4, 1.0],
            specular: [0.77, 0.77, 0.77, 1.0],
            shininess: 76.8,
            ..Self::new()
        }
    }

    /// Metallic gold
    pub fn gold() -> Self {
        Self {
            ambient: [0.247, 0.199, 0.074, 1.0],
            diffuse: [0.751, 0.606, 0.226, 1.0],
            specular: [0.628, 0.555, 0.366, 1.0],
            shininess: 51.2,
            ..Self::new()
        }
    }

    /// Shiny plastic with a white highlight
    pub fn plastic(r: f32, g: f32, b: f32) -> Self {
        Self {
            specular: [1.0, 1.0, 1.0, 1.0],
            shininess: 32.0,
            ..Self::new().with_color(r, g, b)
        }
    }

    /// Flat matte colour without highlight
    pub fn matte(r: f32, g: f32, b: f32) -> Self {
        Self::new().with_color(r, g, b)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}
