use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Default upload endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/upload_file";

/// Field name used by the multi-file form.
pub const MULTI_FIELD_NAME: &str = "file_uploads";

/// Field name used by the single-file form.
pub const SINGLE_FIELD_NAME: &str = "file_uploaded";

/// Per-part ceiling accepted by the receiver (10 MB).
pub const DEFAULT_MAX_PART_SIZE: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid upload endpoint '{0}': {1}")]
    InvalidEndpoint(String, url::ParseError),

    #[error("Field name cannot be empty")]
    EmptyFieldName,

    #[error("Maximum file count must be at least 1")]
    ZeroMaxFiles,

    #[error("Invalid UPLOAD_MAX_FILES '{0}': expected a positive integer")]
    InvalidMaxFiles(String),
}

/// Client-side settings for an upload form
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Where the multipart body is POSTed
    pub endpoint: Url,

    /// Name every file part is attached under
    pub field_name: String,

    /// Upper bound on the selection size; `None` means unbounded
    pub max_files: Option<usize>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::multi()
    }
}

impl UploadConfig {
    pub fn new(
        endpoint: &str,
        field_name: impl Into<String>,
        max_files: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(endpoint.to_string(), e))?;

        let field_name = field_name.into();
        if field_name.trim().is_empty() {
            return Err(ConfigError::EmptyFieldName);
        }

        if max_files == Some(0) {
            return Err(ConfigError::ZeroMaxFiles);
        }

        Ok(Self {
            endpoint,
            field_name,
            max_files,
        })
    }

    /// Multi-file form: `file_uploads`, any number of files
    pub fn multi() -> Self {
        Self {
            endpoint: default_endpoint(),
            field_name: MULTI_FIELD_NAME.to_string(),
            max_files: None,
        }
    }

    /// Single-file form: `file_uploaded`, one file
    pub fn single() -> Self {
        Self {
            endpoint: default_endpoint(),
            field_name: SINGLE_FIELD_NAME.to_string(),
            max_files: Some(1),
        }
    }

    /// Load configuration from environment variables, starting from the multi-file defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_or(Self::multi())
    }

    /// Load configuration from environment variables over the given defaults
    pub fn from_env_or(default: Self) -> Result<Self, ConfigError> {
        Self::from_lookup(default, |key| env::var(key).ok())
    }

    fn from_lookup(
        default: Self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let endpoint = lookup("UPLOAD_ENDPOINT").unwrap_or_else(|| default.endpoint.to_string());
        let field_name = lookup("UPLOAD_FIELD_NAME").unwrap_or(default.field_name);
        let max_files = match lookup("UPLOAD_MAX_FILES") {
            Some(v) => Some(
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidMaxFiles(v.clone()))?,
            ),
            None => default.max_files,
        };

        Self::new(&endpoint, field_name, max_files)
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

/// Settings for the receiving endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (default: 127.0.0.1:8000)
    pub addr: SocketAddr,

    /// Directory received files are written to (default: "uploads")
    pub upload_dir: PathBuf,

    /// Multipart field collected by `/upload_file` (default: "file_uploads")
    pub field_name: String,

    /// Largest accepted part in bytes (default: 10 MB)
    pub max_part_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            upload_dir: PathBuf::from("uploads"),
            field_name: MULTI_FIELD_NAME.to_string(),
            max_part_size: DEFAULT_MAX_PART_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let host = env::var("SERVER_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.addr.ip());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.addr.port());

        Self {
            addr: SocketAddr::new(host, port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            field_name: env::var("UPLOAD_FIELD_NAME").unwrap_or(default.field_name),

            max_part_size: env::var("MAX_PART_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_part_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_config() {
        let config = UploadConfig::multi();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.field_name, "file_uploads");
        assert_eq!(config.max_files, None);
    }

    #[test]
    fn test_single_config() {
        let config = UploadConfig::single();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.field_name, "file_uploaded");
        assert_eq!(config.max_files, Some(1));
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(
            UploadConfig::new("not a url", "file_uploads", None),
            Err(ConfigError::InvalidEndpoint(..))
        ));
        assert!(matches!(
            UploadConfig::new(DEFAULT_ENDPOINT, "  ", None),
            Err(ConfigError::EmptyFieldName)
        ));
        assert!(matches!(
            UploadConfig::new(DEFAULT_ENDPOINT, "file_uploads", Some(0)),
            Err(ConfigError::ZeroMaxFiles)
        ));
    }

    #[test]
    fn test_new_accepts_custom_endpoint() {
        let config = UploadConfig::new("http://10.0.0.5:9000/files", "docs", Some(3)).unwrap();
        assert_eq!(config.endpoint.as_str(), "http://10.0.0.5:9000/files");
        assert_eq!(config.field_name, "docs");
        assert_eq!(config.max_files, Some(3));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_env_overrides_defaults() {
        let vars = [
            ("UPLOAD_ENDPOINT", "http://uploads.internal:9000/files"),
            ("UPLOAD_FIELD_NAME", "attachments"),
            ("UPLOAD_MAX_FILES", "4"),
        ];
        let config = UploadConfig::from_lookup(UploadConfig::multi(), lookup(&vars)).unwrap();
        assert_eq!(config.endpoint.as_str(), "http://uploads.internal:9000/files");
        assert_eq!(config.field_name, "attachments");
        assert_eq!(config.max_files, Some(4));
    }

    #[test]
    fn test_env_missing_keeps_defaults() {
        let config = UploadConfig::from_lookup(UploadConfig::single(), lookup(&[])).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.field_name, "file_uploaded");
        assert_eq!(config.max_files, Some(1));
    }

    #[test]
    fn test_env_bad_max_files_is_an_error() {
        let vars = [("UPLOAD_MAX_FILES", "many")];
        assert!(matches!(
            UploadConfig::from_lookup(UploadConfig::multi(), lookup(&vars)),
            Err(ConfigError::InvalidMaxFiles(v)) if v == "many"
        ));

        let vars = [("UPLOAD_MAX_FILES", "0")];
        assert!(matches!(
            UploadConfig::from_lookup(UploadConfig::multi(), lookup(&vars)),
            Err(ConfigError::ZeroMaxFiles)
        ));
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.field_name, "file_uploads");
        assert_eq!(config.max_part_size, 10 * 1024 * 1024);
    }
}
