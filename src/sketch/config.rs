//! Sketch configuration, loaded from JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::procgen::{Placement, TreeParams};
use crate::render::ShadowLight;

/// Everything needed to start a sketch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SketchConfig {
    /// Seed for the tree random source
    pub seed: u64,
    /// Where trees are rooted; fixed for the sketch's lifetime
    pub placement: Placement,
    /// Initial parameter set
    pub params: TreeParams,
    /// Shadow camera of the directional light
    pub light: ShadowLight,
    /// Debug server port; `None` disables the server
    pub debug_port: Option<u16>,
    /// Frames per second of the headless tick loop
    pub tick_rate: f32,
    /// Give branches separate cap materials (side, top, bottom)
    pub capped_branches: bool,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            placement: Placement::default(),
            params: TreeParams::blossom(),
            light: ShadowLight::default(),
            debug_port: Some(arbor_debug::DEFAULT_PORT),
            tick_rate: 60.0,
            capped_branches: false,
        }
    }
}

impl SketchConfig {
    /// A grid of grove trees.
    pub fn grove() -> Self {
        Self {
            placement: Placement::Grid(Default::default()),
            params: TreeParams::grove(),
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Interval between ticks. Rates whose period is zero or does not fit
    /// a `Duration` are rejected.
    pub fn tick_period(&self) -> Result<Duration> {
        let invalid = || Error::Config(format!("tickRate must be positive, got {}", self.tick_rate));
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(invalid());
        }
        match Duration::try_from_secs_f32(1.0 / self.tick_rate) {
            Ok(period) if !period.is_zero() => Ok(period),
            _ => Err(invalid()),
        }
    }

    /// Reject values the driver cannot run with. Tree parameters are never
    /// range-checked; generation clamps what it must.
    pub fn validate(&self) -> Result<()> {
        self.tick_period()?;
        self.placement.validate()?;
        if self.light.near >= self.light.far {
            return Err(Error::Config(format!(
                "light near ({}) must be less than far ({})",
                self.light.near, self.light.far
            )));
        }
        if self.light.position == self.light.target {
            return Err(Error::Config("light position equals its target".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sketch.json");
        let config = SketchConfig::grove();
        config.save(&path).unwrap();
        assert_eq!(SketchConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sketch.json");
        std::fs::write(&path, r#"{"seed": 7, "params": {"branchCount": 2}}"#).unwrap();

        let config = SketchConfig::load(&path).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.params.branch_count, 2);
        assert_eq!(config.params.leaf_count, TreeParams::blossom().leaf_count);
        assert_eq!(config.tick_rate, 60.0);
    }

    #[test]
    fn test_invalid_tick_rate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sketch.json");
        std::fs::write(&path, r#"{"tickRate": 0}"#).unwrap();
        assert!(matches!(SketchConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_tick_period() {
        let config = SketchConfig::default();
        let period = config.tick_period().unwrap();
        assert!((period.as_secs_f32() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_extreme_tick_rates_rejected() {
        for tick_rate in [1e10, 1e-45, f32::INFINITY, f32::NAN, -1.0] {
            let config = SketchConfig { tick_rate, ..Default::default() };
            assert!(config.tick_period().is_err(), "tick rate {}", tick_rate);
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let config = SketchConfig {
            placement: Placement::Grid(crate::procgen::ForestLayout {
                rows: 70_000,
                columns: 70_000,
                ..Default::default()
            }),
            ..SketchConfig::grove()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sketch.json");
        std::fs::write(&path, r#"{"placement": {"type": "grid", "rows": 70000, "columns": 70000}}"#).unwrap();
        assert!(matches!(SketchConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SketchConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_bad_color_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sketch.json");
        std::fs::write(&path, r#"{"params": {"leafColor": "pink"}}"#).unwrap();
        assert!(matches!(SketchConfig::load(&path), Err(Error::Json(_))));
    }
}
