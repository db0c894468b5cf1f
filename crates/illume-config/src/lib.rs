//! Configuration management for illume.
//!
//! Parses `illume.toml` files with serde and auto-discovers the config in
//! parent directories of the working directory. CLI flags can override file
//! values during load via [`CliSettings`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "illume.toml";

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// CLI settings that override configuration file values.
///
/// All fields are optional; only non-None values override the loaded
/// config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the Kroki server URL.
    pub kroki_url: Option<String>,
    /// Override the remote PlantUML server URL.
    pub plantuml_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Syntax highlighting configuration.
    pub highlight: HighlightConfig,
    /// Engine-rendered diagram configuration.
    pub diagrams: DiagramsConfig,
    /// Remote PlantUML rendering configuration.
    pub plantuml: PlantUmlConfig,
    /// Shared engine settings.
    pub engines: EnginesConfig,

    /// Path the config was loaded from (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Syntax highlighting configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Registered language tokens. `None` means the built-in default set.
    pub languages: Option<Vec<String>>,
}

/// Engine-rendered diagram configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Kroki server URL. Diagram rendering stays disabled without one.
    pub kroki_url: Option<String>,
    /// Visual theme handed to the engine (`dark` or `default`).
    pub theme: String,
    /// Fit rendered diagrams to the available width.
    pub fit_to_width: bool,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            theme: "dark".to_owned(),
            fit_to_width: true,
        }
    }
}

/// Remote PlantUML rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlantUmlConfig {
    /// Rendering server URL.
    pub server_url: String,
    /// Image format path segment (`dsvg`, `svg`, `png`).
    pub format: String,
}

impl Default for PlantUmlConfig {
    fn default() -> Self {
        Self {
            server_url: "https://www.plantuml.com/plantuml".to_owned(),
            format: "dsvg".to_owned(),
        }
    }
}

/// Shared engine settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EnginesConfig {
    /// HTTP timeout for render calls, in seconds.
    pub timeout_secs: u64,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist. Otherwise `illume.toml`
    /// is searched from the working directory upward, falling back to
    /// defaults when absent. CLI settings are applied last.
    pub fn load(
        path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_owned()));
                }
                Self::from_file(path)?
            }
            None => match discover(&std::env::current_dir()?) {
                Some(found) => Self::from_file(&found)?,
                None => Self::default(),
            },
        };

        if let Some(cli) = cli_settings {
            config.apply_cli_settings(cli);
        }
        Ok(config)
    }

    /// Parse configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_owned());
        Ok(config)
    }

    fn apply_cli_settings(&mut self, cli: &CliSettings) {
        if let Some(kroki_url) = &cli.kroki_url {
            self.diagrams.kroki_url = Some(kroki_url.clone());
        }
        if let Some(plantuml_url) = &cli.plantuml_url {
            self.plantuml.server_url.clone_from(plantuml_url);
        }
    }
}

/// Search for `illume.toml` in `start` and its ancestors.
fn discover(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.highlight.languages, None);
        assert_eq!(config.diagrams.kroki_url, None);
        assert_eq!(config.diagrams.theme, "dark");
        assert!(config.diagrams.fit_to_width);
        assert_eq!(config.plantuml.server_url, "https://www.plantuml.com/plantuml");
        assert_eq!(config.plantuml.format, "dsvg");
        assert_eq!(config.engines.timeout_secs, 30);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [highlight]
            languages = ["rust", "python"]

            [diagrams]
            kroki_url = "https://kroki.example.com"
            theme = "default"
            fit_to_width = false

            [plantuml]
            server_url = "https://uml.example.com/plantuml"
            format = "svg"

            [engines]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(
            config.highlight.languages,
            Some(vec!["rust".to_owned(), "python".to_owned()])
        );
        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("https://kroki.example.com")
        );
        assert_eq!(config.diagrams.theme, "default");
        assert!(!config.diagrams.fit_to_width);
        assert_eq!(config.plantuml.format, "svg");
        assert_eq!(config.engines.timeout_secs, 5);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [diagrams]
            kroki_url = "https://kroki.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.diagrams.theme, "dark");
        assert_eq!(config.plantuml.format, "dsvg");
    }

    #[test]
    fn test_cli_settings_override_file_values() {
        let mut config: Config = toml::from_str(
            r#"
            [diagrams]
            kroki_url = "https://from-file.example.com"
            "#,
        )
        .unwrap();

        config.apply_cli_settings(&CliSettings {
            kroki_url: Some("https://from-cli.example.com".to_owned()),
            plantuml_url: Some("https://uml-cli.example.com".to_owned()),
        });

        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("https://from-cli.example.com")
        );
        assert_eq!(config.plantuml.server_url, "https://uml-cli.example.com");
    }

    #[test]
    fn test_discover_walks_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "[diagrams]\n").unwrap();

        let found = discover(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_discover_none_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover(dir.path()), None);
    }

    #[test]
    fn test_explicit_missing_path_errors() {
        let err = Config::load(Some(Path::new("/nonexistent/illume.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_from_file_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[plantuml]\nformat = \"png\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.plantuml.format, "png");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "not toml [").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
