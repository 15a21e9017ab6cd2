//! Configuration system
//!
//! Tunables for octree construction, loadable from TOML or RON files.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, picking the format from the file name extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Serialize configuration, picking the format from the file name extension
    fn to_string_with_format(&self, path: &str) -> Result<String, ConfigError> {
        if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_with_format(path)?;
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

    /// A value is outside the range the octree can work with
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Leaf capacity before a node splits
pub const PREFERRED_TRIANGLE_COUNT: usize = 32;

/// Growth factor applied to a child's inner faces
pub const STRETCH_RATIO: f32 = 1.05;

/// Padding added to the mesh bounding box for the root node
pub const ROOT_EPSILON: f32 = 1e-5;

/// Configuration for octree construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Triangles a leaf holds before it is split into 8 children
    pub preferred_triangle_count: usize,

    /// Ratio by which child boxes are stretched across their parent's split planes
    pub stretch_ratio: f32,

    /// Per-axis padding of the root box around the mesh bounding box
    pub root_epsilon: f32,

    /// Maximum subdivision depth; full leaves at this depth keep growing instead of splitting
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            preferred_triangle_count: PREFERRED_TRIANGLE_COUNT,
            stretch_ratio: STRETCH_RATIO,
            root_epsilon: ROOT_EPSILON,
            max_depth: 16,
        }
    }
}

impl OctreeConfig {
    /// Check that every field holds a usable value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preferred_triangle_count == 0 {
            return Err(ConfigError::Invalid {
                field: "preferred_triangle_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.stretch_ratio.is_finite() || self.stretch_ratio < 1.0 {
            return Err(ConfigError::Invalid {
                field: "stretch_ratio",
                reason: format!("must be finite and >= 1.0, got {}", self.stretch_ratio),
            });
        }
        if !self.root_epsilon.is_finite() || self.root_epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                field: "root_epsilon",
                reason: format!("must be finite and non-negative, got {}", self.root_epsilon),
            });
        }
        Ok(())
    }
}

impl Config for OctreeConfig {}
