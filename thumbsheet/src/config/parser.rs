//! INI parsing: `Ini` → `ConfigFile`.

use ini::Ini;

use super::file::ConfigFileError;
use super::keys::{ConfigKey, ConfigKeyError};
use super::settings::ConfigFile;

/// Parses an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays every known key found
/// in the INI. Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    for key in ConfigKey::all() {
        let Some(section) = ini.section(Some(key.section())) else {
            continue;
        };
        if let Some(value) = section.get(key.key_name()) {
            key.set(&mut config, value)
                .map_err(|e| invalid_value(*key, value, e))?;
        }
    }

    Ok(config)
}

pub(super) fn invalid_value(key: ConfigKey, value: &str, error: ConfigKeyError) -> ConfigFileError {
    let reason = match error {
        ConfigKeyError::ValidationFailed { reason, .. } => reason,
        other => other.to_string(),
    };
    ConfigFileError::InvalidValue {
        section: key.section().to_string(),
        key: key.key_name().to_string(),
        value: value.to_string(),
        reason,
    }
}
