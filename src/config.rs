use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Default upload cap: 200 MiB.
const DEFAULT_MAX_UPLOAD_SIZE: u64 = 200 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Directory holding the metadata database
    pub data_dir: String,
    /// Directory holding uploaded blobs
    pub uploads_dir: String,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
    /// External base URL used for shareable links. When unset, links are
    /// built from the request's own Host header.
    pub public_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:2022".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let uploads_dir = std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string());

        let config = Config {
            bind_address,
            data_dir,
            uploads_dir,
            max_upload_size,
            public_base_url,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }

        if self.data_dir.is_empty() || self.uploads_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR and UPLOADS_DIR cannot be empty".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if let Some(ref url) = self.public_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(
                    "PUBLIC_BASE_URL must start with http:// or https://".to_string(),
                ));
            }
        }

        Ok(())
    }
}
