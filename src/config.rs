use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gfx::anim::Ease;
use crate::gfx::math::Color;
use crate::scene::light::EnvironmentPreset;
use crate::timeline::{product_keyframes, TimelineEntry, DEFAULT_SEGMENT_DURATION};

const APP_DIR: &str = "product-viewer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub lighting: LightingConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub cart: CartConfig,

    #[serde(default = "default_theme")]
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_pages")]
    pub pages: f32,
    /// Time constant of the offset smoothing, in seconds.
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Pixels scrolled per unit of pointer axis motion.
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f32,
    /// Pixels scrolled by the arrow keys.
    #[serde(default = "default_line_step")]
    pub line_step: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingConfig {
    #[serde(default = "default_ambient_intensity")]
    pub ambient_intensity: f32,
    #[serde(default = "default_directional_intensity")]
    pub directional_intensity: f32,
    #[serde(default = "default_directional_position")]
    pub directional_position: [f32; 3],
    #[serde(default)]
    pub environment: EnvironmentPreset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_segment_duration")]
    pub segment_duration: f32,
    #[serde(default)]
    pub ease: Ease,
    #[serde(default = "product_keyframes")]
    pub keyframes: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default = "default_cart_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_customer")]
    pub default_customer: String,
    #[serde(default = "default_clear_on_start")]
    pub clear_on_start: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub foreground: String,
    pub accent: String,
    pub panel: String,
    pub backdrop: String,
}

/// Parsed theme colours. Unparseable entries fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub panel: Color,
    pub backdrop: Color,
}

impl Theme {
    pub fn palette(&self) -> Palette {
        let fallback = default_theme();
        let parse = |value: &str, fallback: &str| {
            Color::from_hex(value)
                .or_else(|| {
                    warn!("Invalid theme colour {:?}", value);
                    Color::from_hex(fallback)
                })
                .unwrap_or(Color::new(0.0, 0.0, 0.0, 1.0))
        };
        Palette {
            background: parse(&self.background, &fallback.background),
            foreground: parse(&self.foreground, &fallback.foreground),
            accent: parse(&self.accent, &fallback.accent),
            panel: parse(&self.panel, &fallback.panel),
            backdrop: parse(&self.backdrop, &fallback.backdrop),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scroll: ScrollConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            model: ModelConfig::default(),
            timeline: TimelineConfig::default(),
            cart: CartConfig::default(),
            theme: default_theme(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            fps_cap: default_fps_cap(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pages: default_pages(),
            damping: default_damping(),
            wheel_multiplier: default_wheel_multiplier(),
            line_step: default_line_step(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            position: default_camera_position(),
            target: [0.0; 3],
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: default_ambient_intensity(),
            directional_intensity: default_directional_intensity(),
            directional_position: default_directional_position(),
            environment: EnvironmentPreset::City,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            segment_duration: default_segment_duration(),
            ease: Ease::Power1InOut,
            keyframes: product_keyframes(),
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            endpoint: default_cart_endpoint(),
            default_customer: default_customer(),
            clear_on_start: default_clear_on_start(),
        }
    }
}

fn default_title() -> String {
    "novafon power 2".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

fn default_fps_cap() -> u32 {
    60
}

fn default_pages() -> f32 {
    6.0
}

fn default_damping() -> f32 {
    0.1
}

fn default_wheel_multiplier() -> f32 {
    2.0
}

fn default_line_step() -> f32 {
    80.0
}

fn default_fov() -> f32 {
    65.0
}

fn default_camera_position() -> [f32; 3] {
    [2.3, 1.5, 2.3]
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_ambient_intensity() -> f32 {
    6.0
}

fn default_directional_intensity() -> f32 {
    1.0
}

fn default_directional_position() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/model_2-transformed.glb")
}

fn default_segment_duration() -> f32 {
    DEFAULT_SEGMENT_DURATION
}

fn default_cart_endpoint() -> String {
    "http://localhost:8000/cart".to_string()
}

fn default_customer() -> String {
    "C1001".to_string()
}

fn default_clear_on_start() -> bool {
    true
}

fn default_theme() -> Theme {
    Theme {
        background: "#f4f2ef".to_string(),
        foreground: "#cdcbca".to_string(),
        accent: "#1a1a1a".to_string(),
        panel: "#ffffff".to_string(),
        backdrop: "#00000080".to_string(),
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TargetPath;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scroll.pages, 6.0);
        assert_eq!(config.camera.fov, 65.0);
        assert_eq!(config.lighting.environment, EnvironmentPreset::City);
        assert_eq!(config.timeline.keyframes.len(), 16);
        assert_eq!(config.cart.default_customer, "C1001");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scroll]
            pages = 4.0

            [lighting]
            environment = "sunset"

            [[timeline.keyframes]]
            target = "position.y"
            value = 0.5
            at = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll.pages, 4.0);
        assert_eq!(config.scroll.damping, 0.1);
        assert_eq!(config.lighting.environment, EnvironmentPreset::Sunset);
        assert_eq!(config.lighting.ambient_intensity, 6.0);
        assert_eq!(
            config.timeline.keyframes,
            vec![TimelineEntry::new(TargetPath::PositionY, 0.5, 3.0)]
        );
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_file_is_default() {
        let config = Config::load_from(Path::new("/nonexistent/product-viewer.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn palette_falls_back_per_entry() {
        let mut theme = default_theme();
        theme.accent = "not a colour".into();
        let palette = theme.palette();
        assert_eq!(palette.accent, Color::from_hex("#1a1a1a").unwrap());
        assert_eq!(palette.backdrop.a, 128.0 / 255.0);
    }
}
