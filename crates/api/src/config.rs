use std::time::Duration;

use attsync_core::schedule::PollPolicy;

use crate::engine::watermark::WatermarkMode;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// When sync cycles run: a fixed interval, or named run times.
    pub poll_policy: PollPolicy,
    /// Bound on every socket operation against a terminal (default: `10`).
    pub device_timeout: Duration,
    /// How many distinct machines may sync concurrently within one cycle
    /// (default: `4`). Same-address serialization is enforced separately.
    pub sync_concurrency: usize,
    /// Which timestamp bounds the incremental fetch.
    pub watermark_mode: WatermarkMode,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SYNC_INTERVAL_SECS`   | `300`                      |
    /// | `SYNC_RUN_TIMES`       | (unset: interval polling)  |
    /// | `DEVICE_TIMEOUT_SECS`  | `10`                       |
    /// | `SYNC_CONCURRENCY`     | `4`                        |
    /// | `SYNC_WATERMARK_MODE`  | `punch-time`               |
    ///
    /// `SYNC_RUN_TIMES` is a comma-separated list of `HH:MM[:SS]` times of
    /// day; setting it switches polling from the fixed interval to the
    /// named-run-times policy.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let interval_secs: u64 = std::env::var("SYNC_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("SYNC_INTERVAL_SECS must be a valid u64");

        let run_times = std::env::var("SYNC_RUN_TIMES").ok();
        let poll_policy = PollPolicy::from_settings(interval_secs, run_times.as_deref())
            .expect("SYNC_RUN_TIMES must be comma-separated HH:MM[:SS] times");

        let device_timeout_secs: u64 = std::env::var("DEVICE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DEVICE_TIMEOUT_SECS must be a valid u64");

        let sync_concurrency: usize = std::env::var("SYNC_CONCURRENCY")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("SYNC_CONCURRENCY must be a valid usize");
        assert!(sync_concurrency > 0, "SYNC_CONCURRENCY must be at least 1");

        let watermark_mode = match std::env::var("SYNC_WATERMARK_MODE")
            .unwrap_or_else(|_| "punch-time".into())
            .as_str()
        {
            "punch-time" => WatermarkMode::PunchTime,
            "created-at" => WatermarkMode::CreatedAt,
            other => panic!("SYNC_WATERMARK_MODE must be punch-time or created-at, got {other}"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            poll_policy,
            device_timeout: Duration::from_secs(device_timeout_secs),
            sync_concurrency,
            watermark_mode,
        }
    }
}
