//! Shared types between the tracez backend and the dashboard
//!
//! These are the records the `/tracez/get/*` endpoints return. Field names
//! follow the backend handler; camelCase aliases are accepted as well.
//!
//! Serializable with serde for JSON over HTTP

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Latency Buckets
// ============================================================================

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Number of latency buckets every aggregate carries
pub const LATENCY_BUCKET_COUNT: usize = 9;

/// One of the nine fixed duration ranges completed spans are histogrammed into.
///
/// Lower bound inclusive, upper bound exclusive. The last bucket is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LatencyBucket {
    ZeroToTenMicros,
    TenMicrosToHundredMicros,
    HundredMicrosToOneMilli,
    OneMilliToTenMillis,
    TenMillisToHundredMillis,
    HundredMillisToOneSecond,
    OneSecondToTenSeconds,
    TenSecondsToHundredSeconds,
    HundredSecondsToMax,
}

impl LatencyBucket {
    pub const ALL: [LatencyBucket; LATENCY_BUCKET_COUNT] = [
        LatencyBucket::ZeroToTenMicros,
        LatencyBucket::TenMicrosToHundredMicros,
        LatencyBucket::HundredMicrosToOneMilli,
        LatencyBucket::OneMilliToTenMillis,
        LatencyBucket::TenMillisToHundredMillis,
        LatencyBucket::HundredMillisToOneSecond,
        LatencyBucket::OneSecondToTenSeconds,
        LatencyBucket::TenSecondsToHundredSeconds,
        LatencyBucket::HundredSecondsToMax,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn lower_bound_nanos(self) -> i64 {
        match self {
            LatencyBucket::ZeroToTenMicros => 0,
            LatencyBucket::TenMicrosToHundredMicros => 10 * NANOS_PER_MICRO,
            LatencyBucket::HundredMicrosToOneMilli => 100 * NANOS_PER_MICRO,
            LatencyBucket::OneMilliToTenMillis => NANOS_PER_MILLI,
            LatencyBucket::TenMillisToHundredMillis => 10 * NANOS_PER_MILLI,
            LatencyBucket::HundredMillisToOneSecond => 100 * NANOS_PER_MILLI,
            LatencyBucket::OneSecondToTenSeconds => NANOS_PER_SECOND,
            LatencyBucket::TenSecondsToHundredSeconds => 10 * NANOS_PER_SECOND,
            LatencyBucket::HundredSecondsToMax => 100 * NANOS_PER_SECOND,
        }
    }

    /// `None` for the last, unbounded bucket.
    pub fn upper_bound_nanos(self) -> Option<i64> {
        Self::from_index(self.index() + 1).map(LatencyBucket::lower_bound_nanos)
    }

    /// Label shown in headers and subheadings, e.g. `>1ms`.
    pub const fn label(self) -> &'static str {
        match self {
            LatencyBucket::ZeroToTenMicros => ">0s",
            LatencyBucket::TenMicrosToHundredMicros => ">10µs",
            LatencyBucket::HundredMicrosToOneMilli => ">100µs",
            LatencyBucket::OneMilliToTenMillis => ">1ms",
            LatencyBucket::TenMillisToHundredMillis => ">10ms",
            LatencyBucket::HundredMillisToOneSecond => ">100ms",
            LatencyBucket::OneSecondToTenSeconds => ">1s",
            LatencyBucket::TenSecondsToHundredSeconds => ">10s",
            LatencyBucket::HundredSecondsToMax => ">100s",
        }
    }

    pub fn contains(self, duration_nanos: i64) -> bool {
        duration_nanos >= self.lower_bound_nanos()
            && self
                .upper_bound_nanos()
                .map_or(true, |upper| duration_nanos < upper)
    }

    /// Negative durations land in the first bucket.
    pub fn for_duration(duration_nanos: i64) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|bucket| duration_nanos >= bucket.lower_bound_nanos())
            .unwrap_or(LatencyBucket::ZeroToTenMicros)
    }
}

impl TryFrom<usize> for LatencyBucket {
    type Error = usize;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(index)
    }
}

impl fmt::Display for LatencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Status Codes
// ============================================================================

/// Canonical span status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    pub const ALL: [StatusCode; 17] = [
        StatusCode::Ok,
        StatusCode::Cancelled,
        StatusCode::Unknown,
        StatusCode::InvalidArgument,
        StatusCode::DeadlineExceeded,
        StatusCode::NotFound,
        StatusCode::AlreadyExists,
        StatusCode::PermissionDenied,
        StatusCode::ResourceExhausted,
        StatusCode::FailedPrecondition,
        StatusCode::Aborted,
        StatusCode::OutOfRange,
        StatusCode::Unimplemented,
        StatusCode::Internal,
        StatusCode::Unavailable,
        StatusCode::DataLoss,
        StatusCode::Unauthenticated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

/// Compares case- and underscore-insensitively so both `NOT_FOUND` and the
/// backend's `NotFound` decode.
fn fold_status_name(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '_' && !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

impl FromStr for StatusCode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let folded = fold_status_name(raw);
        if folded == "CANCELED" {
            return Ok(StatusCode::Cancelled);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|code| fold_status_name(code.as_str()) == folded)
            .ok_or_else(|| format!("unknown status code: {raw}"))
    }
}

impl Serialize for StatusCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Span Records
// ============================================================================

/// One row of the overview: counts for every span sharing `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpanAggregateRecord {
    pub name: String,

    #[serde(rename = "error", alias = "errorCount")]
    pub error_count: u64,

    #[serde(rename = "running", alias = "runningCount")]
    pub running_count: u64,

    /// Completed span counts, indexed by `LatencyBucket::index`
    #[serde(rename = "latency", alias = "latencyCounts")]
    pub latency_counts: [u64; LATENCY_BUCKET_COUNT],
}

/// A timestamped annotation recorded on a span
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SpanEvent {
    pub name: String,

    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,

    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// One sampled span, as shown by the error, running and latency detail views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SpanDetailRecord {
    #[serde(rename = "spanid", alias = "spanId")]
    pub span_id: String,

    #[serde(rename = "parentid", alias = "parentId")]
    pub parent_id: String,

    #[serde(rename = "traceid", alias = "traceId")]
    pub trace_id: String,

    /// Nanoseconds since the Unix epoch
    #[serde(rename = "start", alias = "startTimestamp")]
    pub start_timestamp: i64,

    pub description: String,

    /// Only sent for latency and error samples
    #[serde(
        rename = "duration",
        alias = "durationNanos",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_nanos: Option<i64>,

    /// Only sent for error samples
    #[serde(
        rename = "status",
        alias = "statusCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_code: Option<StatusCode>,

    pub attributes: serde_json::Map<String, serde_json::Value>,

    pub events: Vec<SpanEvent>,
}

impl SpanDetailRecord {
    pub fn start_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.start_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bucket_bounds_are_contiguous() {
        for pair in LatencyBucket::ALL.windows(2) {
            assert_eq!(
                pair[0].upper_bound_nanos(),
                Some(pair[1].lower_bound_nanos()),
                "gap between {} and {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(LatencyBucket::HundredSecondsToMax.upper_bound_nanos(), None);
    }

    #[test]
    fn test_bucket_classification() {
        assert_eq!(LatencyBucket::for_duration(0), LatencyBucket::ZeroToTenMicros);
        assert_eq!(
            LatencyBucket::for_duration(9_999),
            LatencyBucket::ZeroToTenMicros
        );
        assert_eq!(
            LatencyBucket::for_duration(1_000_000),
            LatencyBucket::OneMilliToTenMillis
        );
        assert_eq!(
            LatencyBucket::for_duration(i64::MAX),
            LatencyBucket::HundredSecondsToMax
        );
        assert!(LatencyBucket::OneMilliToTenMillis.contains(9_999_999));
        assert!(!LatencyBucket::OneMilliToTenMillis.contains(10_000_000));
    }

    #[test]
    fn test_bucket_index_lookup() {
        assert_eq!(LatencyBucket::try_from(3usize), Ok(LatencyBucket::OneMilliToTenMillis));
        assert_eq!(LatencyBucket::try_from(9usize), Err(9));
        assert_eq!(LatencyBucket::OneMilliToTenMillis.label(), ">1ms");
    }

    #[test]
    fn test_status_code_spellings() {
        assert_eq!("NOT_FOUND".parse::<StatusCode>(), Ok(StatusCode::NotFound));
        assert_eq!("NotFound".parse::<StatusCode>(), Ok(StatusCode::NotFound));
        assert_eq!("Canceled".parse::<StatusCode>(), Ok(StatusCode::Cancelled));
        assert_eq!("ok".parse::<StatusCode>(), Ok(StatusCode::Ok));
        assert!("NOPE".parse::<StatusCode>().is_err());
    }

    #[test]
    fn test_aggregate_decodes_backend_names() {
        let record: SpanAggregateRecord = serde_json::from_value(json!({
            "name": "GET /users",
            "error": 2,
            "running": 1,
            "latency": [0, 1, 2, 3, 4, 5, 6, 7, 8]
        }))
        .unwrap();
        assert_eq!(record.error_count, 2);
        assert_eq!(record.latency_counts[LatencyBucket::OneMilliToTenMillis.index()], 3);
    }

    #[test]
    fn test_aggregate_rejects_wrong_bucket_count() {
        let short = serde_json::from_value::<SpanAggregateRecord>(json!({
            "name": "x", "error": 0, "running": 0, "latency": [1, 2, 3]
        }));
        assert!(short.is_err());

        let negative = serde_json::from_value::<SpanAggregateRecord>(json!({
            "name": "x", "error": -1, "running": 0, "latency": [0, 0, 0, 0, 0, 0, 0, 0, 0]
        }));
        assert!(negative.is_err());
    }

    #[test]
    fn test_detail_decodes_camel_case_aliases() {
        let record: SpanDetailRecord = serde_json::from_value(json!({
            "spanId": "s1",
            "parentId": "",
            "traceId": "t1",
            "startTimestamp": 1_000_000_000i64,
            "description": "",
            "statusCode": "NOT_FOUND"
        }))
        .unwrap();
        assert_eq!(record.span_id, "s1");
        assert_eq!(record.status_code, Some(StatusCode::NotFound));
        assert_eq!(record.duration_nanos, None);
        assert!(record.attributes.is_empty());
        assert!(record.events.is_empty());
        assert_eq!(record.start_time().timestamp(), 1);
    }

    #[test]
    fn test_detail_serializes_backend_names() {
        let record = SpanDetailRecord {
            span_id: "s1".to_string(),
            duration_nanos: Some(42),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["spanid"], "s1");
        assert_eq!(value["duration"], 42);
        assert!(value.get("status").is_none());
    }
}
