//! Tracker configuration.
//!
//! Read from a TOML document. Every key is optional and falls back to its default.

use serde::{Deserialize, Serialize};

use crate::form::ValidationPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrackerConfig {
    /// Local storage key holding the workout list.
    pub storage_key: String,
    pub map_zoom: f64,
    pub pan_duration_secs: f64,
    /// How long the form shakes after a rejected submit.
    pub shake_duration_ms: u32,
    /// The form is taken out of the layout while it hides, so it does not animate away.
    pub form_restore_delay_ms: u32,
    pub tile_url: String,
    pub tile_attribution: String,
    /// Negative elevation gain is accepted unless this is set.
    pub reject_negative_elevation: bool,
    /// Default log filter, `tracing` directive syntax.
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: "workouts".into(),
            map_zoom: 13.,
            pan_duration_secs: 1.,
            shake_duration_ms: 500,
            form_restore_delay_ms: 1000,
            tile_url: "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png".into(),
            tile_attribution: concat!(
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> ",
                "contributors",
            )
            .into(),
            reject_negative_elevation: false,
            log_level: "debug".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid tracker config: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

impl TrackerConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            reject_negative_elevation: self.reject_negative_elevation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(TrackerConfig::from_toml("").unwrap(), TrackerConfig::default());
    }

    #[test]
    fn overrides_selected_keys() {
        let config = TrackerConfig::from_toml(
            "storage-key = \"my-workouts\"\nmap-zoom = 15\nreject-negative-elevation = true\n",
        )
        .unwrap();

        assert_eq!(config.storage_key, "my-workouts");
        assert_eq!(config.map_zoom, 15.);
        assert!(config.validation_policy().reject_negative_elevation);
        assert_eq!(config.shake_duration_ms, 500);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(TrackerConfig::from_toml("map-zoom = \"close\"").is_err());
    }
}
