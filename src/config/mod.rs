//! Configuration management for the artifact store.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::service::ArtifactOptions;

/// Command-line arguments for the artifact store server.
#[derive(Parser, Debug, Clone)]
#[command(name = "artifact-store")]
#[command(author = "Artifact Store Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stores, fingerprints and serves project archives")]
pub struct Args {
    /// Directory holding metadata and archive blobs
    #[arg(long, env = "ARTIFACT_STORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0", env = "ARTIFACT_STORE_HOST")]
    pub host: String,

    /// HTTP port
    #[arg(short, long, default_value = "8080", env = "ARTIFACT_STORE_PORT")]
    pub port: u16,

    /// Enable debug logging
    #[arg(short, long, env = "ARTIFACT_STORE_DEBUG")]
    pub debug: bool,

    /// Lifetime of issued session tokens, in hours
    #[arg(long, default_value = "12", env = "ARTIFACT_STORE_TOKEN_TTL_HOURS")]
    pub token_ttl_hours: u32,

    /// Timeout for a single blob read or write, in seconds
    #[arg(long, default_value = "30", env = "ARTIFACT_STORE_BLOB_TIMEOUT_SECS")]
    pub blob_timeout_secs: u64,

    /// Largest accepted archive upload (bytes)
    #[arg(long, default_value = "67108864", env = "ARTIFACT_STORE_MAX_ARCHIVE_BYTES")]
    pub max_archive_bytes: usize,

    /// Re-hash archives on download and reject mismatches
    #[arg(
        long,
        default_value = "true",
        action = clap::ArgAction::Set,
        env = "ARTIFACT_STORE_VERIFY_ON_READ"
    )]
    pub verify_on_read: bool,

    /// Maximum number of requests handled at once
    #[arg(long, default_value = "256", env = "ARTIFACT_STORE_MAX_CONCURRENT_REQUESTS")]
    pub max_concurrent_requests: usize,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory
    pub data_dir: PathBuf,
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Debug mode
    pub debug: bool,
    /// Token lifetime in hours
    pub token_ttl_hours: u32,
    /// Blob I/O timeout in seconds
    pub blob_timeout_secs: u64,
    /// Upload size limit
    pub max_archive_bytes: usize,
    /// Integrity check on download
    pub verify_on_read: bool,
    /// Concurrency limit
    pub max_concurrent_requests: usize,
}

impl Config {
    /// Default data directory: the platform data dir, else `./data`.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("artifact-store"))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Directory holding one sub-directory per artifact.
    pub fn blob_root(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.token_ttl_hours))
    }

    /// Artifact service options derived from this configuration.
    pub fn artifact_options(&self) -> ArtifactOptions {
        ArtifactOptions {
            blob_timeout: Duration::from_secs(self.blob_timeout_secs),
            verify_on_read: self.verify_on_read,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            data_dir: args.data_dir.unwrap_or_else(Self::default_data_dir),
            host: args.host,
            port: args.port,
            debug: args.debug,
            token_ttl_hours: args.token_ttl_hours,
            blob_timeout_secs: args.blob_timeout_secs,
            max_archive_bytes: args.max_archive_bytes,
            verify_on_read: args.verify_on_read,
            max_concurrent_requests: args.max_concurrent_requests,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            debug: false,
            token_ttl_hours: 12,
            blob_timeout_secs: 30,
            max_archive_bytes: 64 * 1024 * 1024,
            verify_on_read: true,
            max_concurrent_requests: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert!(!config.debug);
        assert_eq!(config.token_ttl_hours, 12);
        assert_eq!(config.blob_timeout_secs, 30);
        assert_eq!(config.max_archive_bytes, 64 * 1024 * 1024);
        assert!(config.verify_on_read);
        assert_eq!(config.max_concurrent_requests, 256);
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::try_parse_from(["artifact-store", "--data-dir", "/srv/artifacts"]).unwrap();
        let config: Config = args.into();

        assert_eq!(config.data_dir, PathBuf::from("/srv/artifacts"));
        assert_eq!(config.blob_root(), PathBuf::from("/srv/artifacts/projects"));
        assert_eq!(config.port, 8080);
        assert!(config.verify_on_read);
    }

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::try_parse_from([
            "artifact-store",
            "--port",
            "9000",
            "--host",
            "127.0.0.1",
            "--debug",
            "--verify-on-read",
            "false",
            "--token-ttl-hours",
            "1",
        ])
        .unwrap();
        let config: Config = args.into();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert!(config.debug);
        assert!(!config.verify_on_read);
        assert_eq!(config.token_ttl(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_artifact_options() {
        let config = Config {
            blob_timeout_secs: 5,
            verify_on_read: false,
            ..Config::default()
        };
        let options = config.artifact_options();
        assert_eq!(options.blob_timeout, Duration::from_secs(5));
        assert!(!options.verify_on_read);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            port: 9090,
            debug: true,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"port\":9090"));
        assert!(json.contains("\"debug\":true"));
    }
}
