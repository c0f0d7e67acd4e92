//! Scene configuration.
//!
//! A [`SceneConfig`] describes everything a run needs: canvas size, clear
//! color, which solid to show and how, and the camera. It is plain serde
//! data, so it can be built in code or loaded from JSON. Every struct is
//! `#[serde(default)]`; a partial file only overrides what it names.
//!
//! ```json
//! {
//!   "viewport": { "width": 700, "height": 700 },
//!   "solid": { "kind": "cone", "segments": 32, "capped": true },
//!   "normal_mode": "flat"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::OrbitCamera;
use crate::error::{ConfigError, MeshError};
use crate::mesh::{Mesh, NormalMode};
use crate::shapes::{Cone, ConeOptions, Pyramid};

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 700, height: 700 }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Which solid to build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolidConfig {
    Pyramid,
    Cone(ConeOptions),
}

impl Default for SolidConfig {
    fn default() -> Self {
        Self::Cone(ConeOptions::default())
    }
}

impl SolidConfig {
    pub fn build(&self) -> Result<Mesh, MeshError> {
        match self {
            Self::Pyramid => Pyramid::build(),
            Self::Cone(options) => Cone::build(options),
        }
    }
}

/// Top-level configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub viewport: Viewport,
    pub clear_color: [f32; 4],
    pub solid: SolidConfig,
    /// Normal stream active on the first frame.
    pub normal_mode: NormalMode,
    pub camera: OrbitCamera,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            solid: SolidConfig::default(),
            normal_mode: NormalMode::default(),
            camera: OrbitCamera::default(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if let Some(c) = self.clear_color.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(ConfigError::Invalid(format!(
                "clear_color components must be in [0, 1], got {c}"
            )));
        }
        if let SolidConfig::Cone(options) = &self.solid {
            options
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        self.camera.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normals::SmoothStyle;

    #[test]
    fn empty_object_is_default() {
        let config = SceneConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.viewport, Viewport::new(700, 700));
        assert_eq!(config.normal_mode, NormalMode::Smooth);
    }

    #[test]
    fn partial_cone_config() {
        let config = SceneConfig::from_json_str(
            r#"{
                "solid": { "kind": "cone", "segments": 12, "capped": true },
                "normal_mode": "flat",
                "camera": { "radius": 4.0 }
            }"#,
        )
        .unwrap();

        let SolidConfig::Cone(options) = config.solid else {
            panic!("expected a cone, got {:?}", config.solid);
        };
        assert_eq!(options.segments, 12);
        assert!(options.capped);
        assert_eq!(options.radius, 0.5);
        assert_eq!(config.normal_mode, NormalMode::Flat);
        assert_eq!(config.camera.radius, 4.0);
        assert_eq!(config.camera.height, 5.0);
    }

    #[test]
    fn fixed_lift_style_parses() {
        let config = SceneConfig::from_json_str(
            r#"{ "solid": { "kind": "cone", "smooth_style": { "style": "fixed_lift", "lift": 0.25 } } }"#,
        )
        .unwrap();
        assert!(matches!(
            config.solid,
            SolidConfig::Cone(ConeOptions { smooth_style: SmoothStyle::FixedLift(l), .. }) if l == 0.25
        ));
    }

    #[test]
    fn pyramid_builds() {
        let config = SceneConfig::from_json_str(r#"{ "solid": { "kind": "pyramid" } }"#).unwrap();
        assert_eq!(config.solid.build().unwrap().vertex_count(), 18);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_segments = r#"{ "solid": { "kind": "cone", "segments": 2 } }"#;
        assert!(matches!(
            SceneConfig::from_json_str(bad_segments),
            Err(ConfigError::Invalid(_))
        ));

        let bad_viewport = r#"{ "viewport": { "width": 0 } }"#;
        assert!(matches!(
            SceneConfig::from_json_str(bad_viewport),
            Err(ConfigError::Invalid(_))
        ));

        let bad_lift = r#"{ "solid": { "kind": "cone", "smooth_style": { "style": "fixed_lift", "lift": -1.0 } } }"#;
        assert!(matches!(
            SceneConfig::from_json_str(bad_lift),
            Err(ConfigError::Invalid(msg)) if msg.contains("lift")
        ));

        let bad_color = r#"{ "clear_color": [0.0, 0.0, 2.0, 1.0] }"#;
        assert!(matches!(
            SceneConfig::from_json_str(bad_color),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SceneConfig::from_json_str("{ \"solid\": "),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SceneConfig::from_json_str(r#"{ "solid": { "kind": "torus" } }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn serialized_config_reloads() {
        let config = SceneConfig {
            solid: SolidConfig::Pyramid,
            normal_mode: NormalMode::Flat,
            ..Default::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn load_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("shadelab-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "solid": { "kind": "pyramid" } }"#).unwrap();
        let config = SceneConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.solid, SolidConfig::Pyramid);

        assert!(matches!(
            SceneConfig::load(path.with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
