// Appkeys Settings Module
// Where the remap file lives, how strictly to read it, and how loud to log

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;

/// File name of the remap records under the home directory's config dir
const DEFAULT_MAPPINGS: &str = ".config/xremap";

/// Settings for appkeys
///
/// Loaded from a TOML file (default: ~/.config/appkeys/settings.toml).
/// Every key is optional:
///   mappings = "/home/me/.config/xremap"
///   strict = false
///   [log]
///   level = "info"
#[derive(Debug, Clone)]
pub struct Settings {
    /// Remap record file, if set explicitly
    mappings: Option<PathBuf>,

    /// Reject the whole file on a malformed line
    strict: bool,

    /// Log level when not running with --debug
    log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    mappings: Option<PathBuf>,

    #[serde(default)]
    strict: Option<toml::Value>,

    #[serde(default)]
    log: Option<LogSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct LogSettings {
    #[serde(default)]
    level: Option<String>,
}

impl Settings {
    /// Create settings with every default
    pub fn new() -> Self {
        Self {
            mappings: None,
            strict: false,
            log_level: LevelFilter::Info,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();
        settings.mappings = toml_settings.mappings;

        if let Some(strict) = toml_settings.strict {
            settings.strict = parse_bool_value(&strict)?;
        }

        if let Some(level) = toml_settings.log.and_then(|log| log.level) {
            settings.log_level = LevelFilter::from_str(&level).map_err(|_| {
                SettingsError::InvalidValue(format!("Unknown log level '{}'", level))
            })?;
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("appkeys").join("settings.toml"))
    }

    /// Load from default location (~/.config/appkeys/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    /// The remap record file: the configured path, else ~/.config/xremap
    pub fn mappings_path(&self) -> Result<PathBuf, SettingsError> {
        if let Some(path) = &self.mappings {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_MAPPINGS))
            .ok_or_else(|| SettingsError::InvalidValue("No home directory".to_string()))
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

/// Parse a TOML value as a boolean
fn parse_bool_value(value: &toml::Value) -> Result<bool, SettingsError> {
    match value {
        toml::Value::Boolean(b) => Ok(*b),
        toml::Value::Integer(1) => Ok(true),
        toml::Value::Integer(0) => Ok(false),
        toml::Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(SettingsError::InvalidValue(format!(
                "Cannot convert '{}' to boolean",
                s
            ))),
        },
        _ => Err(SettingsError::InvalidValue(format!(
            "Cannot convert {:?} to boolean",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_settings_default() {
        let settings = Settings::new();
        assert!(!settings.strict());
        assert_eq!(settings.log_level(), LevelFilter::Info);
        assert!(settings.mappings.is_none());
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
mappings = "/tmp/remaps"
strict = true

[log]
level = "debug"
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.mappings_path().unwrap(), PathBuf::from("/tmp/remaps"));
        assert!(settings.strict());
        assert_eq!(settings.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_settings_with_string_values() {
        let settings = Settings::from_toml("strict = \"yes\"").unwrap();
        assert!(settings.strict());
        let settings = Settings::from_toml("strict = 0").unwrap();
        assert!(!settings.strict());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Settings::from_toml("strict = \"maybe\""),
            Err(SettingsError::InvalidValue(_))
        ));
        assert!(matches!(
            Settings::from_toml("[log]\nlevel = \"loud\""),
            Err(SettingsError::InvalidValue(_))
        ));
        assert!(matches!(
            Settings::from_toml("strict = "),
            Err(SettingsError::TomlParse(_))
        ));
    }

    #[test]
    fn test_default_mappings_path() {
        if let Some(home) = dirs::home_dir() {
            let settings = Settings::new();
            assert_eq!(settings.mappings_path().unwrap(), home.join(".config/xremap"));
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mappings = \"/tmp/remaps\"").unwrap();
        writeln!(file, "strict = true").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert!(settings.strict());
        assert_eq!(settings.mappings_path().unwrap(), PathBuf::from("/tmp/remaps"));
    }

    #[test]
    fn test_from_missing_file() {
        assert!(matches!(
            Settings::from_file("/nonexistent/appkeys/settings.toml"),
            Err(SettingsError::Io(_))
        ));
    }
}
