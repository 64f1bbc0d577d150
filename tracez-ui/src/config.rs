use std::sync::OnceLock;

use chrono::{DateTime, Local, Utc};

/// Default number of sampled spans the backend keeps per bucket
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Path every view's endpoint template is appended to
pub const DEFAULT_ENDPOINT_BASE: &str = "/tracez/get/";

/// Port the standalone tracez HTTP server listens on
const DEV_SERVER_PORT: u16 = 30000;

/// Zone span start times and the refresh stamp are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampZone {
    /// The viewer's local zone
    #[default]
    Local,
    Utc,
}

impl TimestampZone {
    /// Formats nanoseconds since the Unix epoch as an absolute date-time.
    pub fn format_nanos(self, nanos: i64) -> String {
        self.format(DateTime::from_timestamp_nanos(nanos))
    }

    pub fn format(self, instant: DateTime<Utc>) -> String {
        const PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";
        match self {
            TimestampZone::Local => instant.with_timezone(&Local).format(PATTERN).to_string(),
            TimestampZone::Utc => instant.format(PATTERN).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracezConfig {
    /// Origin of the tracez server; empty means same origin
    pub api_base: String,
    pub endpoint_base: String,
    pub timestamp_zone: TimestampZone,
    /// Quoted in detail subheadings
    pub sample_limit: usize,
}

impl Default for TracezConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            endpoint_base: DEFAULT_ENDPOINT_BASE.to_string(),
            timestamp_zone: TimestampZone::Local,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl TracezConfig {
    /// Config for the page the dashboard is served from.
    pub fn from_location() -> Self {
        Self {
            api_base: api_base().to_string(),
            ..Self::default()
        }
    }

    /// Absolute (or origin-relative) URL for an endpoint path such as `error/foo`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}{}", self.api_base, self.endpoint_base, path)
    }
}

/// Get the API base URL based on current environment
/// - In development (localhost): use the tracez server port
/// - In production: use same origin (the server serves the dashboard too)
fn get_api_base() -> String {
    let location = web_sys::window().map(|w| w.location());
    let hostname = location
        .as_ref()
        .and_then(|l| l.hostname().ok())
        .unwrap_or_default();
    let port = location
        .as_ref()
        .and_then(|l| l.port().ok())
        .unwrap_or_default();

    let is_local = hostname == "localhost" || hostname == "127.0.0.1";
    if is_local && port != DEV_SERVER_PORT.to_string() {
        format!("http://{hostname}:{DEV_SERVER_PORT}")
    } else {
        String::new()
    }
}

static API_BASE_CACHE: OnceLock<String> = OnceLock::new();

/// Get the cached API base URL
pub fn api_base() -> &'static str {
    API_BASE_CACHE.get_or_init(get_api_base).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_base_and_path() {
        let config = TracezConfig {
            api_base: "http://localhost:30000".to_string(),
            ..TracezConfig::default()
        };
        assert_eq!(
            config.endpoint_url("error/foo"),
            "http://localhost:30000/tracez/get/error/foo"
        );
        assert_eq!(
            TracezConfig::default().endpoint_url("aggregations"),
            "/tracez/get/aggregations"
        );
    }

    #[test]
    fn utc_timestamps_are_stable() {
        assert_eq!(
            TimestampZone::Utc.format_nanos(1_000_000_000),
            "1970-01-01 00:00:01.000 +00:00"
        );
        assert_eq!(
            TimestampZone::Utc.format_nanos(1_500_000_000),
            "1970-01-01 00:00:01.500 +00:00"
        );
    }
}
