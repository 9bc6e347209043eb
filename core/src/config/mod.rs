//! Run configuration
//!
//! One JSON document describes the grid, plant, action set, controller
//! preset, engine tuning and pipeline options. Every section is optional and
//! falls back to the defaults below.

use crate::abstraction::EngineConfig;
use crate::actions::ActionSet;
use crate::controller::{ControllerLogicCompiler, LiveController, ThresholdPreset};
use crate::dynamics::{PlantConfig, VehiclePlant};
use crate::error::Result;
use crate::grid::{AxisBounds, GridPartition, GridPreset, DEFAULT_BOUNDS, DIMS};
use crate::pipeline::{AbstractionPipeline, PipelineOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Config parse error: {0}")]
    ParseError(String),
}

/// Per-axis bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundsConfig {
    pub position: AxisBounds,
    pub velocity: AxisBounds,
    pub acceleration: AxisBounds,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        let [position, velocity, acceleration] = DEFAULT_BOUNDS;
        Self {
            position,
            velocity,
            acceleration,
        }
    }
}

impl BoundsConfig {
    pub fn to_array(&self) -> [AxisBounds; DIMS] {
        [self.position, self.velocity, self.acceleration]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub preset: GridPreset,
    pub bounds: BoundsConfig,

    /// Explicit cell widths; overrides `preset`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<[f64; DIMS]>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            preset: GridPreset::Medium,
            bounds: BoundsConfig::default(),
            resolution: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// `null` builds the physics only
    pub preset: Option<ThresholdPreset>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            preset: Some(ThresholdPreset::Safe),
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AbstractionConfig {
    pub grid: GridConfig,
    pub dynamics: PlantConfig,
    pub actions: ActionSet,
    pub controller: ControllerConfig,
    pub engine: EngineConfig,
    pub pipeline: PipelineOptions,
}

impl AbstractionConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_json_string(&self) -> std::result::Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn build_grid(&self) -> Result<GridPartition> {
        let bounds = self.grid.bounds.to_array();
        match self.grid.resolution {
            Some(resolution) => GridPartition::new(bounds, resolution),
            None => GridPartition::from_preset(self.grid.preset, bounds),
        }
    }

    pub fn build_plant(&self) -> Result<VehiclePlant> {
        VehiclePlant::new(self.dynamics)
    }

    pub fn build_compiler(&self) -> Option<ControllerLogicCompiler> {
        self.controller.preset.map(ControllerLogicCompiler::new)
    }

    pub fn build_live_controller(&self) -> Result<Option<LiveController>> {
        self.controller
            .preset
            .map(|preset| LiveController::new(preset, &self.actions))
            .transpose()
    }

    pub fn build_pipeline(&self) -> AbstractionPipeline {
        AbstractionPipeline::new(self.actions.clone(), self.engine, self.pipeline)
    }

    /// Build every component once so that bad values fail before any work
    pub fn validate(&self) -> Result<()> {
        self.build_grid()?;
        self.build_plant()?;
        self.engine.validate()?;
        self.build_live_controller()?;
        Ok(())
    }
}

/// Load a configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> std::result::Result<AbstractionConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    AbstractionConfig::from_json_str(&contents)
}

/// Load every `.json` configuration in a directory, sorted by file name
pub fn load_configs<P: AsRef<Path>>(
    dir: P,
) -> std::result::Result<Vec<(String, AbstractionConfig)>, ConfigError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir)
        .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", dir.display(), e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConfigError::FileNotFound(e.to_string()))?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            load_config(&path).map(|config| (name, config))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::BoundaryMode;
    use crate::dynamics::Frame;

    #[test]
    fn test_empty_document_is_default() {
        let config = AbstractionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AbstractionConfig::default());
        assert_eq!(config.grid.preset, GridPreset::Medium);
        assert_eq!(config.controller.preset, Some(ThresholdPreset::Safe));
        assert_eq!(config.actions, ActionSet::default());
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "grid": { "preset": "coarse", "resolution": [1.0, 1.0, 0.5] },
            "dynamics": { "noise_std": 0.1, "frame": "world" },
            "controller": { "preset": null },
            "engine": { "boundary": "sink" }
        }"#;
        let config = AbstractionConfig::from_json_str(json).unwrap();

        assert_eq!(config.dynamics.noise_std, 0.1);
        assert_eq!(config.dynamics.lag, 0.5);
        assert_eq!(config.dynamics.frame, Frame::World);
        assert!(config.build_compiler().is_none());
        assert_eq!(config.engine.boundary, BoundaryMode::Sink);
        assert_eq!(config.engine.window_sigmas, 4.0);

        // Explicit resolution wins over the preset
        let grid = config.build_grid().unwrap();
        assert_eq!(grid.shape(), [101, 31, 31]);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            AbstractionConfig::from_json_str(r#"{ "grid": { "preset": "huge" } }"#),
            Err(ConfigError::ParseError(_))
        ));
        assert!(AbstractionConfig::from_json_str(r#"{ "actions": [] }"#).is_err());
        assert!(AbstractionConfig::from_json_str(r#"{ "gird": {} }"#).is_err());

        // Misspelled keys in every section are rejected, not defaulted
        for doc in [
            r#"{ "dynamics": { "nosie_std": 0.2 } }"#,
            r#"{ "engine": { "conservativism": 0.5 } }"#,
            r#"{ "pipeline": { "paralel": false } }"#,
        ] {
            assert!(
                matches!(AbstractionConfig::from_json_str(doc), Err(ConfigError::ParseError(_))),
                "{} should be rejected",
                doc
            );
        }
    }

    #[test]
    fn test_validate_catches_bad_values() {
        let mut config = AbstractionConfig::default();
        assert!(config.validate().is_ok());

        config.dynamics.lag = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = AbstractionConfig::default();
        config.grid.resolution = Some([2.0, 1.0, 0.5]);
        config.pipeline.parallel = false;

        let json = config.to_json_string().unwrap();
        assert_eq!(AbstractionConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/imdp.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
