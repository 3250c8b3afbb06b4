use crate::{env_or_default, env_parse, ConfigError, FromEnv};

/// API documentation settings (`SWAGGER_*` variables).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocsConfig {
    pub enabled: bool,
    /// Mount path without leading slash, e.g. `api/docs`.
    pub path: String,
    pub title: String,
    pub description: String,
    pub version: String,
}

impl DocsConfig {
    /// Absolute route for the Swagger UI.
    pub fn ui_route(&self) -> String {
        format!("/{}", self.path.trim_matches('/'))
    }

    /// Absolute route for the OpenAPI JSON document.
    pub fn spec_route(&self) -> String {
        format!("{}/openapi.json", self.ui_route())
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "api/docs".to_string(),
            title: "User Service API".to_string(),
            description: "User management service".to_string(),
            version: "1.0".to_string(),
        }
    }
}

impl FromEnv for DocsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            enabled: env_parse("SWAGGER_ENABLED", "true")?,
            path: env_or_default("SWAGGER_PATH", &defaults.path),
            title: env_or_default("SWAGGER_TITLE", &defaults.title),
            description: env_or_default("SWAGGER_DESCRIPTION", &defaults.description),
            version: env_or_default("SWAGGER_VERSION", &defaults.version),
        })
    }
}
