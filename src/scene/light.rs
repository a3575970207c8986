use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::gfx::math::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Shines from the node's world position toward `target`.
    Directional {
        color: Color,
        intensity: f32,
        target: Vec3,
    },
}

impl Light {
    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. } | Light::Directional { intensity, .. } => *intensity,
        }
    }

    /// Colour premultiplied by intensity, as fed to the shader.
    pub fn radiance(&self) -> Vec3 {
        let (color, intensity) = match self {
            Light::Ambient { color, intensity } => (color, intensity),
            Light::Directional { color, intensity, .. } => (color, intensity),
        };
        Vec3::new(color.r, color.g, color.b) * *intensity
    }
}

/// Named lighting backdrops. Each one is reduced to a sky/ground hemisphere
/// gradient for diffuse shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    Apartment,
    #[default]
    City,
    Dawn,
    Forest,
    Lobby,
    Night,
    Park,
    Studio,
    Sunset,
    Warehouse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentLighting {
    pub sky: Vec3,
    pub ground: Vec3,
    pub intensity: f32,
}

impl EnvironmentPreset {
    pub fn lighting(self) -> EnvironmentLighting {
        let (sky, ground, intensity) = match self {
            EnvironmentPreset::Apartment => ([0.93, 0.85, 0.74], [0.42, 0.34, 0.27], 0.9),
            EnvironmentPreset::City => ([0.80, 0.84, 0.90], [0.36, 0.33, 0.31], 1.0),
            EnvironmentPreset::Dawn => ([0.98, 0.74, 0.62], [0.30, 0.26, 0.30], 0.8),
            EnvironmentPreset::Forest => ([0.70, 0.82, 0.66], [0.22, 0.26, 0.16], 0.7),
            EnvironmentPreset::Lobby => ([0.95, 0.88, 0.78], [0.50, 0.43, 0.36], 1.0),
            EnvironmentPreset::Night => ([0.18, 0.22, 0.36], [0.05, 0.05, 0.08], 0.4),
            EnvironmentPreset::Park => ([0.74, 0.86, 1.00], [0.30, 0.36, 0.22], 1.1),
            EnvironmentPreset::Studio => ([1.00, 1.00, 1.00], [0.55, 0.55, 0.55], 1.2),
            EnvironmentPreset::Sunset => ([1.00, 0.66, 0.42], [0.34, 0.22, 0.20], 0.9),
            EnvironmentPreset::Warehouse => ([0.86, 0.84, 0.80], [0.28, 0.27, 0.25], 0.9),
        };
        EnvironmentLighting {
            sky: Vec3::from_array(sky),
            ground: Vec3::from_array(ground),
            intensity,
        }
    }
}
