// Transcoder Settings Engine
// Manages user settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as a JSON file, by default in the working directory.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::types::errors::SettingsError;
use crate::types::settings::TranscoderSettings;

/// Config file used when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bookmark-transcoder.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<TranscoderSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &TranscoderSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: TranscoderSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise uses [`DEFAULT_CONFIG_FILE`] relative to the working directory.
    pub fn new(path_override: Option<String>) -> Self {
        Self {
            config_path: path_override.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
            settings: TranscoderSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults; a malformed one is a serialization error.
    fn load(&mut self) -> Result<TranscoderSettings, SettingsError> {
        self.settings = read_settings(Path::new(&self.config_path))?;
        Ok(self.settings.clone())
    }

    /// Writes the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        write_settings(Path::new(&self.config_path), &self.settings)
    }

    fn get_settings(&self) -> &TranscoderSettings {
        &self.settings
    }

    /// Updates one setting by dot-notation key path and saves.
    ///
    /// The settings round-trip through `serde_json::Value`, so a value of the
    /// wrong type is rejected when deserializing back into `TranscoderSettings`.
    ///
    /// # Examples
    /// - `"export.title"` → updates `settings.export.title`
    /// - `"storage.database_path"` → updates `settings.storage.database_path`
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        *leaf_at(&mut tree, key)? = value;

        self.settings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        self.save()
    }

    /// Resets all settings to defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = TranscoderSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

fn read_settings(path: &Path) -> Result<TranscoderSettings, SettingsError> {
    if !path.exists() {
        return Ok(TranscoderSettings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
    serde_json::from_str(&content).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
    })
}

fn write_settings(path: &Path, settings: &TranscoderSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SettingsError::IoError(format!("Failed to create config directory: {}", e))
        })?;
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;
    fs::write(path, json)
        .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
}

/// Resolves a dot path to an existing field of a JSON object tree.
///
/// Only keys already present can be set; every segment but the last must
/// name an object.
fn leaf_at<'v>(tree: &'v mut Value, key: &str) -> Result<&'v mut Value, SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    }

    key.split('.').try_fold(tree, |node, part| match node {
        Value::Object(map) => map
            .get_mut(part)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))),
        _ => Err(SettingsError::InvalidKey(format!(
            "Cannot navigate to key '{}': '{}' is not a section",
            key, part
        ))),
    })
}
