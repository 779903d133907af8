use crate::editor::ClipSettings;
use crate::scene::RegistryCapacities;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SCENEDIT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "scenedit.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor settings, read from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub translate_clip: f32,
    pub rotate_clip: f32,
    pub scale_clip: f32,
    pub plane_capacity: usize,
    pub cube_capacity: usize,
    pub pointlight_capacity: usize,
    pub spotlight_capacity: usize,
    pub camera_fov_deg: f32,
    /// Width in pixels reserved for side panels on the right of the window.
    pub panel_width: f32,
    pub scene_path: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let capacities = RegistryCapacities::default();
        Self {
            translate_clip: 0.0,
            rotate_clip: 0.0,
            scale_clip: 0.0,
            plane_capacity: capacities.planes,
            cube_capacity: capacities.cubes,
            pointlight_capacity: capacities.pointlights,
            spotlight_capacity: capacities.spotlights,
            camera_fov_deg: 60.0,
            panel_width: 0.0,
            scene_path: PathBuf::from("scene.bin"),
            window_width: 1280,
            window_height: 720,
        }
    }
}

impl EditorConfig {
    pub fn clip(&self) -> ClipSettings {
        ClipSettings {
            translate: self.translate_clip,
            rotate: self.rotate_clip,
            scale: self.scale_clip,
        }
    }

    pub fn capacities(&self) -> RegistryCapacities {
        RegistryCapacities {
            planes: self.plane_capacity,
            cubes: self.cube_capacity,
            pointlights: self.pointlight_capacity,
            spotlights: self.spotlight_capacity,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `$SCENEDIT_CONFIG` or `./scenedit.json`; a missing file
    /// means defaults, a broken one is logged and also falls back.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            log::info!("No config at {:?}; using defaults", path);
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                log::warn!("Ignoring config {:?}: {}", path, err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "translate_clip": 0.25, "cube_capacity": 8 }"#)
            .unwrap();
        assert_eq!(config.clip().translate, 0.25);
        assert_eq!(config.clip().rotate, 0.0);
        assert_eq!(config.capacities().cubes, 8);
        assert_eq!(config.capacities().planes, RegistryCapacities::default().planes);
        assert_eq!(config.scene_path, PathBuf::from("scene.bin"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = EditorConfig::from_json("{ translate_clip: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn config_file_roundtrip() {
        let mut path = std::env::temp_dir();
        path.push(format!("scenedit_config_{}.json", std::process::id()));
        let config = EditorConfig {
            rotate_clip: 15.0,
            ..EditorConfig::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = EditorConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(path);
    }
}
