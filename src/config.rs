//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Download behavior configuration (directories, worker concurrency)
///
/// Groups settings related to how media files are fetched and stored.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Number of worker pool slots, i.e. extractions allowed in flight at
    /// once (default: 1)
    ///
    /// The dispatch loop still consumes insert notifications one at a time
    /// in insertion order; this only bounds how many offloaded extraction
    /// jobs may run concurrently.
    #[serde(default = "default_worker_slots")]
    pub worker_slots: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            worker_slots: default_worker_slots(),
        }
    }
}

/// Extraction capability configuration (yt-dlp binary and format selection)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractorConfig {
    /// Path to the yt-dlp executable (auto-detected from PATH if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Format selection string passed to yt-dlp
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            format: default_format(),
        }
    }
}

/// Persistence configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file (default: "./media-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// REST API server configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8093)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for [`crate::MediaDownloader`]
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — directories, worker concurrency
/// - [`extractor`](ExtractorConfig) — yt-dlp binary path and format
/// - [`persistence`](PersistenceConfig) — database location
/// - [`api`](ApiConfig) — REST server settings
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format has no nesting.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Extraction capability settings
    #[serde(flatten)]
    pub extractor: ExtractorConfig,

    /// Persistence settings
    #[serde(flatten)]
    pub persistence: PersistenceConfig,

    /// REST API settings
    #[serde(flatten)]
    pub api: ApiConfig,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_worker_slots() -> usize {
    1
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./media-dl.db")
}

// mp4-preferring selection with a best-available fallback
fn default_format() -> String {
    "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/bv*+ba/b".to_string()
}

fn default_bind_address() -> SocketAddr {
    "127.0.0.1:8093"
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8093)))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = Config::default();

        assert_eq!(config.download.download_dir, PathBuf::from("./downloads"));
        assert_eq!(config.download.worker_slots, 1);
        assert_eq!(
            config.persistence.database_path,
            PathBuf::from("./media-dl.db")
        );
        assert!(config.extractor.ytdlp_path.is_none());
        assert!(config.extractor.search_path);
        assert!(config.api.cors_enabled);
        assert!(config.api.swagger_ui);
        assert_eq!(config.api.bind_address.port(), 8093);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.download.worker_slots, 1);
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert!(config.extractor.format.contains("mp4"));
    }

    #[test]
    fn flattened_fields_deserialize_without_nesting() {
        let config: Config = serde_json::from_str(
            r#"{
                "download_dir": "/data/media",
                "worker_slots": 4,
                "ytdlp_path": "/usr/local/bin/yt-dlp",
                "bind_address": "0.0.0.0:9000"
            }"#,
        )
        .unwrap();

        assert_eq!(config.download.download_dir, PathBuf::from("/data/media"));
        assert_eq!(config.download.worker_slots, 4);
        assert_eq!(
            config.extractor.ytdlp_path,
            Some(PathBuf::from("/usr/local/bin/yt-dlp"))
        );
        assert_eq!(config.api.bind_address.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn config_round_trips_through_json() {
        let original = Config::default();
        let json = serde_json::to_string(&original).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(back.download.download_dir, original.download.download_dir);
        assert_eq!(back.download.worker_slots, original.download.worker_slots);
        assert_eq!(back.extractor.format, original.extractor.format);
        assert_eq!(back.api.bind_address, original.api.bind_address);
    }
}
