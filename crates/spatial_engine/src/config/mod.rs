//! Configuration system
//!
//! Spatial index, ray query, and narrow-phase tuning. Files are TOML or RON,
//! selected by extension.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of its valid range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # LBVH Configuration
///
/// Controls how the bounding volume hierarchy is partitioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LbvhConfig {
    /// A run of at most this many objects becomes a leaf
    pub max_leaf_size: usize,
}

impl Default for LbvhConfig {
    fn default() -> Self {
        Self { max_leaf_size: 4 }
    }
}

/// # Ray Query Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayQueryConfig {
    /// Slack added to the best hit distance before a node is pruned
    pub prune_epsilon: f32,
    /// Direction components below this are treated as parallel to the slab
    pub parallel_epsilon: f32,
}

impl Default for RayQueryConfig {
    fn default() -> Self {
        Self {
            prune_epsilon: 1e-3,
            parallel_epsilon: 1e-6,
        }
    }
}

/// # Narrow-Phase Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrowPhaseConfig {
    /// Candidate SAT axes with squared length below this are skipped
    pub axis_epsilon: f32,
}

impl Default for NarrowPhaseConfig {
    fn default() -> Self {
        Self { axis_epsilon: 1e-6 }
    }
}

/// # Complete Spatial Configuration
///
/// Top-level configuration for the spatial index and collision world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Log level filter used by [`crate::foundation::logging::init_with_level`]
    pub log_level: String,
    /// Hierarchy build settings
    pub lbvh: LbvhConfig,
    /// Nearest-ray query settings
    pub ray: RayQueryConfig,
    /// Overlap test settings
    pub narrow_phase: NarrowPhaseConfig,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            lbvh: LbvhConfig::default(),
            ray: RayQueryConfig::default(),
            narrow_phase: NarrowPhaseConfig::default(),
        }
    }
}

impl SpatialConfig {
    /// Set the leaf size
    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.lbvh.max_leaf_size = max_leaf_size;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lbvh.max_leaf_size == 0 {
            return Err(ConfigError::Invalid("max_leaf_size must be at least 1".to_string()));
        }

        let epsilons = [
            ("ray.prune_epsilon", self.ray.prune_epsilon),
            ("ray.parallel_epsilon", self.ray.parallel_epsilon),
            ("narrow_phase.axis_epsilon", self.narrow_phase.axis_epsilon),
        ];
        for (name, value) in epsilons {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be finite and non-negative, got {value}")));
            }
        }

        Ok(())
    }

    /// Load from a TOML/RON file and validate
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config for SpatialConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpatialConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_leaf_size_rejected() {
        let config = SpatialConfig::default().with_max_leaf_size(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let mut config = SpatialConfig::default();
        config.ray.prune_epsilon = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SpatialConfig = toml::from_str("[lbvh]\nmax_leaf_size = 8\n").unwrap();
        assert_eq!(config.lbvh.max_leaf_size, 8);
        assert_eq!(config.ray, RayQueryConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("spatial_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = SpatialConfig::default().with_max_leaf_size(2).with_log_level("debug");
        config.save_to_file(&path).unwrap();
        let loaded = SpatialConfig::load_validated(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SpatialConfig::default().save_to_file("config.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
