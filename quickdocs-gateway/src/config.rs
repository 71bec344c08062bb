//! Gateway configuration.
//!
//! An explicitly constructed value handed down to the server; nothing here
//! is global or mutable after startup.

use serde::Deserialize;

/// Main gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address
    pub bind_address: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://quickdocs.db".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            cors_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration builder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Build a configuration from `QUICKDOCS_DATABASE_URL` and
    /// `QUICKDOCS_BIND_ADDRESS`, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("QUICKDOCS_DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(addr) = std::env::var("QUICKDOCS_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        config
    }
}

/// Builder for GatewayConfig
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    /// Set the database URL
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// Set the bind address
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_address = addr.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> GatewayConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.database_url, "sqlite://quickdocs.db");
        assert!(config.cors_enabled);
    }

    #[test]
    fn test_builder() {
        let config = GatewayConfig::builder()
            .database("sqlite::memory:")
            .bind("127.0.0.1:9000")
            .cors(false)
            .build();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert!(!config.cors_enabled);
    }
}
