use crate::config::{ConfigError, Settings, VaultPaths};
use std::fs;

/// Loads vault settings. An absent file means defaults; a present but
/// unparsable file is a configuration error, never silently ignored.
pub fn load_settings(paths: &VaultPaths) -> Result<Settings, ConfigError> {
    let raw = match fs::read_to_string(&paths.settings) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadSettings {
                path: paths.settings.display().to_string(),
                source,
            });
        }
    };

    serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseSettings {
        path: paths.settings.display().to_string(),
        source,
    })
}
