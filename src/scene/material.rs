//! Surface material properties read by the exporter.

use serde::{Deserialize, Serialize};

/// Default base color when a material has none.
pub const DEFAULT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
/// Default opacity.
pub const DEFAULT_OPACITY: f32 = 1.0;
/// Default metalness.
pub const DEFAULT_METALNESS: f32 = 0.0;
/// Default roughness.
pub const DEFAULT_ROUGHNESS: f32 = 0.8;

/// Which faces of a mesh are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
    /// Render both sides.
    Double,
}

/// A standard PBR-style material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Linear RGB color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metalness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
    /// Whether the material is alpha blended.
    pub transparent: bool,
    pub side: Side,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = Some(metalness);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = Some(roughness);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// RGBA base color with defaults applied.
    pub fn base_color_factor(&self) -> [f32; 4] {
        let [r, g, b] = self.color.unwrap_or(DEFAULT_COLOR);
        [r, g, b, self.opacity.unwrap_or(DEFAULT_OPACITY)]
    }

    pub fn metallic_factor(&self) -> f32 {
        self.metalness.unwrap_or(DEFAULT_METALNESS)
    }

    pub fn roughness_factor(&self) -> f32 {
        self.roughness.unwrap_or(DEFAULT_ROUGHNESS)
    }

    pub fn is_double_sided(&self) -> bool {
        self.side == Side::Double
    }
}
