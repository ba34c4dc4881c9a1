use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CallmapError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source analysis settings
    pub analysis: AnalysisConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Extra directory names to ignore during the walk, in addition to the
    /// built-in ignores and anything read from .gitignore
    pub ignore_dirs: Vec<String>,

    /// Maximum file size to parse (in bytes); larger files are skipped
    pub max_file_size: usize,

    /// What to do when two definitions produce the same qualified name
    pub collision_policy: CollisionPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the report file written into the project root
    pub file_name: String,
}

/// Policy for duplicate qualified names in the definition registry.
///
/// Two definitions can map to the same qualified name (redefinition within a
/// module is the common case). The registry keeps exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep the first definition seen, ignore later ones
    KeepFirst,
    /// Keep the last definition seen, overwriting earlier ones
    KeepLast,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig {
                ignore_dirs: vec![],
                max_file_size: 1024 * 1024, // 1MB
                collision_policy: CollisionPolicy::KeepLast,
            },
            output: OutputConfig {
                file_name: "mapping.md".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CallmapError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CallmapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default() -> Result<Self> {
        // Try common config file locations
        let candidates = [
            "Callmap.toml",
            "callmap.toml",
            ".callmap.toml",
        ];

        for candidate in &candidates {
            if Path::new(candidate).exists() {
                return Self::load(candidate);
            }
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.file_name, "mapping.md");
        assert_eq!(config.analysis.collision_policy, CollisionPolicy::KeepLast);
        assert!(config.analysis.ignore_dirs.is_empty());
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Callmap.toml");

        let mut config = Config::default();
        config.analysis.ignore_dirs.push("vendor".to_string());
        config.analysis.collision_policy = CollisionPolicy::KeepFirst;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.analysis.ignore_dirs, vec!["vendor".to_string()]);
        assert_eq!(loaded.analysis.collision_policy, CollisionPolicy::KeepFirst);
    }

    #[test]
    fn test_collision_policy_parses_kebab_case() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            ignore_dirs = []
            max_file_size = 1048576
            collision_policy = "keep-first"

            [output]
            file_name = "mapping.md"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.collision_policy, CollisionPolicy::KeepFirst);
    }
}
