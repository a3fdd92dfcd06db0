//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Prediction Service
// ============================================================================

/// Base address of the prediction service.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000";

/// HTTP client timeout for prediction requests (seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

/// Path of the pre-rendered feature importance chart on the service.
pub const FEATURE_IMPORTANCE_ASSET_PATH: &str = "/static/feature_importance.png";

// ============================================================================
// Stream
// ============================================================================

/// Delay between consecutive record submissions (milliseconds).
pub const DEFAULT_PACING_MS: u64 = 1_000;

/// Records between `info`-level progress lines.
pub const PROGRESS_LOG_INTERVAL: usize = 10;

// ============================================================================
// Dashboard
// ============================================================================

/// Dashboard API bind address.
pub const DEFAULT_DASHBOARD_ADDR: &str = "127.0.0.1:8080";

/// Capacity of the dashboard's stream event broadcast channel.
///
/// Slow SSE clients that fall further behind than this miss events.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// SSE keep-alive interval (seconds).
pub const SSE_KEEP_ALIVE_SECS: u64 = 15;

// ============================================================================
// Config Files
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FAILSTREAM_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "failstream.toml";
