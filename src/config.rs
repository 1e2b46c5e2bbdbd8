use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime settings, read from TOML. Every section falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub colors: ColorConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of students displayed at once
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub active: String,
    pub passive: String,
    /// Marker color for uncategorized nodes in `neutral` mode
    pub neutral: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn rankdir(self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::LeftRight => "LR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub direction: Direction,
    /// Distance between consecutive layers
    pub rank_sep: f64,
    /// Distance between nodes sharing a layer
    pub node_sep: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uncategorized {
    /// No shape is drawn, only the node text.
    Hidden,
    /// A small grey marker.
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub uncategorized: Uncategorized,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: 3 }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active: "#2ca02c".to_string(),
            passive: "#9467bd".to_string(),
            neutral: "#bbbbbb".to_string(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopBottom,
            rank_sep: 60.0,
            node_sep: 40.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            uncategorized: Uncategorized::Hidden,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.capacity == 0 {
            return Err(ConfigError::Invalid(
                "session.capacity must be at least 1".to_string(),
            ));
        }
        if !(self.layout.rank_sep > 0.0) || !(self.layout.node_sep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout spacing must be positive (rank_sep={}, node_sep={})",
                self.layout.rank_sep, self.layout.node_sep
            )));
        }
        for (key, value) in [
            ("colors.active", &self.colors.active),
            ("colors.passive", &self.colors.passive),
            ("colors.neutral", &self.colors.neutral),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// `path` wins; without one the defaults apply.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.capacity, 3);
        assert_eq!(config.render.uncategorized, Uncategorized::Hidden);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [session]
            capacity = 5

            [layout]
            direction = "LR"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.capacity, 5);
        assert_eq!(config.layout.direction, Direction::LeftRight);
        assert_eq!(config.layout.rank_sep, 60.0);
        assert_eq!(config.colors, ColorConfig::default());
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = Config::from_toml("[session]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_color() {
        let err = Config::from_toml("[colors]\nactive = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("colors.active"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Config::from_toml("[session\ncapacity = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nuncategorized = \"neutral\"").unwrap();
        let config = Config::resolve(Some(file.path())).unwrap();
        assert_eq!(config.render.uncategorized, Uncategorized::Neutral);
    }

    #[test]
    fn demo_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/config.toml");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.render.uncategorized, Uncategorized::Neutral);
        assert_eq!(config.colors, ColorConfig::default());
    }

    #[test]
    fn resolve_without_path_uses_defaults() {
        assert_eq!(Config::resolve(None).unwrap(), Config::default());
    }
}
