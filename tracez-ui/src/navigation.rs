//! Drill-down state machine.
//!
//! Overview is the initial state; a click on an overview count moves to one
//! of the three detail states. Detail views have no navigable cells of their
//! own; the overview stays on the page, so a later click simply replaces the
//! current detail selection.

use shared_types::LatencyBucket;

use crate::error::{Result, TracezError};
use crate::markup::html_escape;
use crate::registry::{resolve_view, Column, DrilldownKey, ViewName};

/// The kind of overview cell a user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivatedCell {
    ErrorCount,
    RunningCount,
    Latency(LatencyBucket),
}

impl ActivatedCell {
    /// Decodes the `data-column` / `data-bucket` attributes of a clicked cell.
    pub fn from_attributes(column: &str, bucket: Option<&str>) -> Result<Self> {
        match column.parse::<Column>()? {
            Column::ErrorCount => Ok(ActivatedCell::ErrorCount),
            Column::RunningCount => Ok(ActivatedCell::RunningCount),
            Column::LatencyCounts => {
                let raw = bucket.ok_or_else(|| {
                    TracezError::InvalidConfig("latency cell without a bucket".to_string())
                })?;
                let index: usize = raw
                    .parse()
                    .map_err(|_| TracezError::InvalidConfig(format!("bad bucket: {raw}")))?;
                LatencyBucket::try_from(index)
                    .map(ActivatedCell::Latency)
                    .map_err(TracezError::InvalidBucket)
            }
            other => Err(TracezError::InvalidConfig(format!(
                "column {} is not navigable",
                other.id()
            ))),
        }
    }

    pub fn column(self) -> Column {
        match self {
            ActivatedCell::ErrorCount => Column::ErrorCount,
            ActivatedCell::RunningCount => Column::RunningCount,
            ActivatedCell::Latency(_) => Column::LatencyCounts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Navigation {
    #[default]
    Overview,
    ErrorDetail {
        span_name: String,
    },
    RunningDetail {
        span_name: String,
    },
    LatencyDetail {
        span_name: String,
        bucket: LatencyBucket,
    },
}

impl Navigation {
    /// State reached by activating `cell` on the row for `span_name`.
    pub fn drill_down(cell: ActivatedCell, span_name: &str) -> Self {
        let span_name = span_name.to_string();
        match cell {
            ActivatedCell::ErrorCount => Navigation::ErrorDetail { span_name },
            ActivatedCell::RunningCount => Navigation::RunningDetail { span_name },
            ActivatedCell::Latency(bucket) => Navigation::LatencyDetail { span_name, bucket },
        }
    }

    pub fn view(&self) -> ViewName {
        match self {
            Navigation::Overview => ViewName::Overview,
            Navigation::ErrorDetail { .. } => ViewName::Error,
            Navigation::RunningDetail { .. } => ViewName::Running,
            Navigation::LatencyDetail { .. } => ViewName::Latency,
        }
    }

    pub fn span_name(&self) -> Option<&str> {
        match self {
            Navigation::Overview => None,
            Navigation::ErrorDetail { span_name }
            | Navigation::RunningDetail { span_name }
            | Navigation::LatencyDetail { span_name, .. } => Some(span_name.as_str()),
        }
    }

    pub fn drilldown_key(&self) -> Option<DrilldownKey> {
        match self {
            Navigation::Overview => None,
            Navigation::ErrorDetail { span_name } | Navigation::RunningDetail { span_name } => {
                Some(DrilldownKey::span(span_name.as_str()))
            }
            Navigation::LatencyDetail { span_name, bucket } => {
                Some(DrilldownKey::bucket(span_name.as_str(), *bucket))
            }
        }
    }

    /// Heading shown above the detail table; `None` for the overview.
    pub fn subheading(&self, sample_limit: usize) -> Option<String> {
        let span_name = self.span_name()?;
        let title = match self {
            Navigation::LatencyDetail { bucket, .. } => {
                format!("{} Bucket", html_escape(bucket.label()))
            }
            Navigation::ErrorDetail { .. } => "Error".to_string(),
            Navigation::RunningDetail { .. } => "Running".to_string(),
            Navigation::Overview => return None,
        };
        let status = resolve_view(self.view())
            .fixed_status
            .map(|status| format!(" All of these spans have status code {status}"))
            .unwrap_or_default();
        Some(format!(
            "<h2>{}<br>{title} Spans</h2>\
             <i>Showing sampled span details (up to {sample_limit}).{status}</i>",
            html_escape(span_name),
        ))
    }
}
