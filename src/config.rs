// Global configuration and constants

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Files searched in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = ["windgrove.yaml", "windgrove.yml", "windgrove.json"];

// Configuration struct for forest parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    // Canvas
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub background: u8,

    // Trunks
    pub initial_branch_count: usize,
    pub anchor_jitter: f32,
    pub trunk_diameter: f32,
    pub trunk_speed: f32,

    // Growth & branching
    pub branch_start_ratio: f32,
    pub fork_probability: f32,
    pub shrink_factor: f32,
    pub min_diameter: f32,
    pub bounds_margin: f32,
    pub bump_scale: f32,
    pub damping: f32,
    pub upward_bias: f32,
    pub step_min: f32,
    pub step_max: f32,

    // Wind
    pub wind_step: f32,
    pub wind_intensity: f32,
    pub wind_min: f32,
    pub wind_max: f32,
    pub wind_increment: f32,
    pub phase_stagger: f32,
    pub wind_response_min: f32,
    pub wind_response_max: f32,
    pub flexibility_min: f32,
    pub flexibility_max: f32,

    // Pointer overlay
    pub cursor_path: String,
    pub cursor_size: f32,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            canvas_width: 465.0,
            canvas_height: 584.0,
            background: 225,
            initial_branch_count: 25,
            anchor_jitter: 10.0,
            trunk_diameter: 5.0,
            trunk_speed: 10.0,
            branch_start_ratio: 0.8,
            fork_probability: 0.2,
            shrink_factor: 0.62,
            min_diameter: 0.2,
            bounds_margin: 10.0,
            bump_scale: 0.15,
            damping: 0.8,
            upward_bias: 0.1,
            step_min: 5.0,
            step_max: 10.0,
            wind_step: 0.08,
            wind_intensity: 2.0,
            wind_min: 0.5,
            wind_max: 5.0,
            wind_increment: 0.5,
            phase_stagger: 0.1,
            wind_response_min: 0.8,
            wind_response_max: 2.0,
            flexibility_min: 0.02,
            flexibility_max: 0.05,
            cursor_path: "p1.png".to_owned(),
            cursor_size: 32.0,
        }
    }
}

impl ForestConfig {
    /// Height (in canvas units) above which forking is allowed.
    pub fn fork_line(&self) -> f32 {
        self.canvas_height * self.branch_start_ratio
    }

    /// Load a config file, picking the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let config: Self = match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&data)?,
            Some("json") => Self::from_json(&data)?,
            _ => bail!(
                "unsupported config format for {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(data: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(data).context("parsing YAML config")
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        serde_json::from_str(data).context("parsing JSON config")
    }

    /// First config found in the working directory, or the defaults.
    ///
    /// A file that exists but fails to load is reported and skipped.
    pub fn from_default_paths() -> Self {
        for candidate in DEFAULT_CONFIG_PATHS {
            if !Path::new(candidate).exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(config) => {
                    log::info!("loaded config from {}", candidate);
                    return config;
                }
                Err(e) => log::warn!("ignoring {}: {:#}", candidate, e),
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, v) in [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("anchor_jitter", self.anchor_jitter),
            ("trunk_diameter", self.trunk_diameter),
            ("trunk_speed", self.trunk_speed),
            ("branch_start_ratio", self.branch_start_ratio),
            ("fork_probability", self.fork_probability),
            ("shrink_factor", self.shrink_factor),
            ("min_diameter", self.min_diameter),
            ("bounds_margin", self.bounds_margin),
            ("bump_scale", self.bump_scale),
            ("damping", self.damping),
            ("upward_bias", self.upward_bias),
            ("step_min", self.step_min),
            ("step_max", self.step_max),
            ("wind_step", self.wind_step),
            ("wind_intensity", self.wind_intensity),
            ("wind_min", self.wind_min),
            ("wind_max", self.wind_max),
            ("wind_increment", self.wind_increment),
            ("phase_stagger", self.phase_stagger),
            ("wind_response_min", self.wind_response_min),
            ("wind_response_max", self.wind_response_max),
            ("flexibility_min", self.flexibility_min),
            ("flexibility_max", self.flexibility_max),
            ("cursor_size", self.cursor_size),
        ] {
            if !v.is_finite() {
                bail!("{} must be a finite number, got {}", name, v);
            }
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            bail!(
                "canvas must have a positive size, got {}x{}",
                self.canvas_width,
                self.canvas_height
            );
        }
        if !(self.branch_start_ratio > 0.0 && self.branch_start_ratio < 1.0) {
            bail!(
                "branch_start_ratio must be in (0, 1), got {}",
                self.branch_start_ratio
            );
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            bail!("shrink_factor must be in (0, 1), got {}", self.shrink_factor);
        }
        if !(0.0..=1.0).contains(&self.fork_probability) {
            bail!(
                "fork_probability must be in [0, 1], got {}",
                self.fork_probability
            );
        }
        if self.trunk_diameter <= self.min_diameter || self.min_diameter <= 0.0 {
            bail!(
                "trunk_diameter ({}) must exceed min_diameter ({}) and both must be positive",
                self.trunk_diameter,
                self.min_diameter
            );
        }
        for (name, lo, hi) in [
            ("step", self.step_min, self.step_max),
            ("wind", self.wind_min, self.wind_max),
            ("wind_response", self.wind_response_min, self.wind_response_max),
            ("flexibility", self.flexibility_min, self.flexibility_max),
        ] {
            if lo > hi {
                bail!("{}_min ({}) exceeds {}_max ({})", name, lo, name, hi);
            }
        }
        if self.wind_increment <= 0.0 {
            bail!("wind_increment must be positive, got {}", self.wind_increment);
        }
        Ok(())
    }
}
