use std::fmt;
use std::path::PathBuf;

use trip_agent_openai_model::{OpenAIConfig, OpenAIConfigBuilder};

const DEFAULT_TRIP_MAP_PATH: &str = "trip_map.html";

/// Error returned when the configuration cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Credentials and settings loaded once at startup.
#[derive(Clone)]
pub struct Config {
    /// Key of the chat completions service.
    pub openai_api_key: String,
    /// Base URL of an OpenAI-compatible service.
    pub openai_base_url: Option<String>,
    /// Model to sample from.
    pub openai_model: Option<String>,
    /// Key of the Google Places API.
    pub google_maps_api_key: String,
    /// Token of the Mapbox GL JS map.
    pub mapbox_access_token: String,
    /// Where rendered maps are written.
    pub trip_map_path: PathBuf,
}

impl Config {
    /// Loads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration, reading variables with `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &'static str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };
        let required =
            |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL"),
            openai_model: optional("OPENAI_MODEL"),
            google_maps_api_key: required("GOOGLE_MAPS_API_KEY")?,
            mapbox_access_token: required("MAPBOX_ACCESS_TOKEN")?,
            trip_map_path: optional("TRIP_MAP_PATH")
                .unwrap_or_else(|| DEFAULT_TRIP_MAP_PATH.to_owned())
                .into(),
        })
    }

    /// Builds the configuration of the model provider.
    pub fn openai_config(&self) -> OpenAIConfig {
        let mut builder = OpenAIConfigBuilder::with_api_key(&self.openai_api_key);
        if let Some(base_url) = &self.openai_base_url {
            builder = builder.with_base_url(base_url);
        }
        if let Some(model) = &self.openai_model {
            builder = builder.with_model(model);
        }
        builder.build()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("google_maps_api_key", &"<redacted>")
            .field("mapbox_access_token", &"<redacted>")
            .field("trip_map_path", &self.trip_map_path)
            .finish()
    }
}
