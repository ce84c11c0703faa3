use thiserror::Error;

/// Decoded upload limit: 20 MiB, inclusive.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 20 * 1024 * 1024;

/// Largest accepted MAX_UPLOAD_SIZE. Upload bodies are buffered in memory.
pub const MAX_UPLOAD_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

/// Longest lifetime a download link may have (GCS V4 signing caps it at 7 days).
pub const MAX_DOWNLOAD_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub metadata: MetadataConfig,
    /// Maximum decoded upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Base URL clients use to reach this process (for locally served download links)
    pub public_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Gcs,
    Local,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket name (required when backend is gcs)
    pub bucket: Option<String>,
    /// Directory for local storage backend
    pub local_storage_path: String,
    /// Path to GCS service account JSON (needed to sign download URLs)
    pub gcs_credentials_file: Option<String>,
    pub download_url_ttl_secs: u64,
    /// HMAC secret for local download links; random per process when unset
    pub signing_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub data_dir: String,
    pub table_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: None,
            local_storage_path: "./files".to_string(),
            gcs_credentials_file: None,
            download_url_ttl_secs: 3600,
            signing_secret: None,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            table_name: "files".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_defaults = ServerConfig::default();
        let storage_defaults = StorageConfig::default();
        let metadata_defaults = MetadataConfig::default();

        let backend = match var("STORAGE_BACKEND")
            .unwrap_or_else(|| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "gcs" => StorageBackend::Gcs,
            "local" => StorageBackend::Local,
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "STORAGE_BACKEND must be 'local' or 'gcs', got '{other}'"
                )))
            }
        };

        let max_upload_size = parse_number(&var, "MAX_UPLOAD_SIZE")?.unwrap_or(DEFAULT_MAX_UPLOAD_SIZE);
        let download_url_ttl_secs = parse_number(&var, "DOWNLOAD_URL_TTL")?
            .unwrap_or(storage_defaults.download_url_ttl_secs);

        let config = Config {
            server: ServerConfig {
                bind_address: var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address),
                public_base_url: var("PUBLIC_BASE_URL").unwrap_or(server_defaults.public_base_url),
            },
            storage: StorageConfig {
                backend,
                bucket: var("BUCKET_NAME").filter(|s| !s.trim().is_empty()),
                local_storage_path: var("LOCAL_STORAGE_PATH")
                    .unwrap_or(storage_defaults.local_storage_path),
                gcs_credentials_file: var("GCS_CREDENTIALS_FILE"),
                download_url_ttl_secs,
                signing_secret: var("DOWNLOAD_SIGNING_SECRET").filter(|s| !s.is_empty()),
            },
            metadata: MetadataConfig {
                data_dir: var("DATA_DIR").unwrap_or(metadata_defaults.data_dir),
                table_name: var("TABLE_NAME").unwrap_or(metadata_defaults.table_name),
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata.table_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "TABLE_NAME cannot be empty".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Gcs && self.storage.bucket.is_none() {
            return Err(ConfigError::ValidationError(
                "BUCKET_NAME is required when STORAGE_BACKEND=gcs".to_string(),
            ));
        }

        if !(1..=MAX_UPLOAD_SIZE_LIMIT).contains(&self.max_upload_size) {
            return Err(ConfigError::ValidationError(format!(
                "MAX_UPLOAD_SIZE must be between 1 and {MAX_UPLOAD_SIZE_LIMIT} bytes"
            )));
        }

        if !(1..=MAX_DOWNLOAD_URL_TTL_SECS).contains(&self.storage.download_url_ttl_secs) {
            return Err(ConfigError::ValidationError(format!(
                "DOWNLOAD_URL_TTL must be between 1 and {MAX_DOWNLOAD_URL_TTL_SECS} seconds"
            )));
        }

        if self.storage.backend == StorageBackend::Gcs && self.storage.gcs_credentials_file.is_none()
        {
            tracing::warn!(
                "GCS_CREDENTIALS_FILE is not set; download URLs cannot be signed \
                 and GET /files/{{id}} will fail."
            );
        }

        Ok(())
    }
}

fn parse_number<F>(var: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("{key} must be a non-negative integer"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.metadata.table_name, "files");
        assert_eq!(config.max_upload_size, 20 * 1024 * 1024);
        assert_eq!(config.storage.download_url_ttl_secs, 3600);
        assert!(config.storage.signing_secret.is_none());
    }

    #[test]
    fn reads_bucket_and_table() {
        let config = load(&[
            ("STORAGE_BACKEND", "GCS"),
            ("BUCKET_NAME", "uploads"),
            ("TABLE_NAME", "file-records"),
            ("DOWNLOAD_URL_TTL", "600"),
        ])
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Gcs);
        assert_eq!(config.storage.bucket.as_deref(), Some("uploads"));
        assert_eq!(config.metadata.table_name, "file-records");
        assert_eq!(config.storage.download_url_ttl_secs, 600);
    }

    #[test]
    fn gcs_requires_bucket() {
        let err = load(&[("STORAGE_BACKEND", "gcs")]).unwrap_err();
        assert!(err.to_string().contains("BUCKET_NAME"));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(load(&[("STORAGE_BACKEND", "s4")]).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(load(&[("MAX_UPLOAD_SIZE", "lots")]).is_err());
        assert!(load(&[("MAX_UPLOAD_SIZE", "0")]).is_err());
        assert!(load(&[("MAX_UPLOAD_SIZE", "18446744073709551615")]).is_err());
        assert!(load(&[("DOWNLOAD_URL_TTL", "0")]).is_err());
        assert!(load(&[("DOWNLOAD_URL_TTL", "604801")]).is_err());
    }

    #[test]
    fn upload_size_cap_is_inclusive() {
        let config = load(&[("MAX_UPLOAD_SIZE", "1073741824")]).unwrap();
        assert_eq!(config.max_upload_size, MAX_UPLOAD_SIZE_LIMIT);
        assert!(load(&[("MAX_UPLOAD_SIZE", "1073741825")]).is_err());
    }

    #[test]
    fn rejects_empty_table_name() {
        assert!(load(&[("TABLE_NAME", " ")]).is_err());
    }
}
