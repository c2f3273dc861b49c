use std::path::Path;

use serde::Deserialize;

use super::config::{Location, RenderConfig};
use crate::error::ConfigError;

/// Credentials and location supplied from outside the preset catalog.
///
/// Field names match the environment variables (`OWM_KEY`, `OWM_LAT`,
/// `OWM_LON`); the YAML file may use either spelling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Secrets {
    #[serde(default, alias = "OWM_KEY")]
    pub owm_key: Option<String>,

    #[serde(default, alias = "OWM_LAT")]
    pub owm_lat: Option<f64>,

    #[serde(default, alias = "OWM_LON")]
    pub owm_lon: Option<f64>,
}

impl Secrets {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let secrets: Self = serde_yaml::from_str(yaml)?;
        Ok(secrets)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Read `OWM_KEY`, `OWM_LAT` and `OWM_LON` from the environment.
    /// Unparseable coordinates are ignored with a warning.
    pub fn from_env() -> Self {
        Self {
            owm_key: std::env::var("OWM_KEY").ok(),
            owm_lat: env_coordinate("OWM_LAT"),
            owm_lon: env_coordinate("OWM_LON"),
        }
    }

    /// File values first, environment for anything the file leaves unset.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_file = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        Ok(from_file.or(Self::from_env()))
    }

    /// Fill unset fields from `other`.
    pub fn or(self, other: Self) -> Self {
        Self {
            owm_key: self.owm_key.or(other.owm_key),
            owm_lat: self.owm_lat.or(other.owm_lat),
            owm_lon: self.owm_lon.or(other.owm_lon),
        }
    }

    /// Copy secrets into the configuration by name.
    ///
    /// A missing key leaves the configuration's placeholder in place and
    /// missing coordinates leave the location unset; validation rejects
    /// both. Coordinates must come as a pair.
    pub fn apply_to(&self, config: &mut RenderConfig) -> Result<(), ConfigError> {
        if let Some(key) = &self.owm_key {
            config.api_key = key.trim().to_string();
        }

        config.location = match (self.owm_lat, self.owm_lon) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
            }),
            (Some(_), None) => return Err(ConfigError::MissingSecret("OWM_LON")),
            (None, Some(_)) => return Err(ConfigError::MissingSecret("OWM_LAT")),
            (None, None) => config.location,
        };

        Ok(())
    }
}

fn env_coordinate(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(variable = name, value = %raw, %e, "Ignoring unparseable coordinate");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_API_KEY;

    #[test]
    fn test_apply_sets_key_and_location() {
        let secrets = Secrets {
            owm_key: Some(" abc123 ".to_string()),
            owm_lat: Some(50.45),
            owm_lon: Some(30.52),
        };
        let mut config = RenderConfig::default();
        secrets.apply_to(&mut config).unwrap();

        assert_eq!(config.api_key, "abc123");
        assert_eq!(
            config.location,
            Some(Location {
                latitude: 50.45,
                longitude: 30.52
            })
        );
    }

    #[test]
    fn test_apply_without_key_keeps_placeholder() {
        let mut config = RenderConfig::default();
        Secrets::default().apply_to(&mut config).unwrap();
        assert_eq!(config.api_key, PLACEHOLDER_API_KEY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_rejects_half_location() {
        let secrets = Secrets {
            owm_key: Some("abc".to_string()),
            owm_lat: Some(1.0),
            owm_lon: None,
        };
        let mut config = RenderConfig::default();
        assert!(matches!(
            secrets.apply_to(&mut config),
            Err(ConfigError::MissingSecret("OWM_LON"))
        ));
    }

    #[test]
    fn test_or_prefers_self() {
        let file = Secrets {
            owm_key: Some("from-file".to_string()),
            ..Default::default()
        };
        let env = Secrets {
            owm_key: Some("from-env".to_string()),
            owm_lat: Some(1.0),
            owm_lon: Some(2.0),
        };
        let merged = file.or(env);
        assert_eq!(merged.owm_key.as_deref(), Some("from-file"));
        assert_eq!(merged.owm_lat, Some(1.0));
    }

    #[test]
    fn test_deserialize_accepts_env_style_names() {
        let yaml = r#"
OWM_KEY: "abcdef"
OWM_LAT: 48.85
owm_lon: 2.35
"#;
        let secrets = Secrets::from_yaml_str(yaml).unwrap();
        assert_eq!(secrets.owm_key.as_deref(), Some("abcdef"));
        assert_eq!(secrets.owm_lat, Some(48.85));
        assert_eq!(secrets.owm_lon, Some(2.35));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Secrets::from_file(Path::new("/nonexistent/secrets.yaml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
