//! Static table configuration for every tracez view.
//!
//! Views form a closed set; [`resolve_view`] is an exhaustive match so every
//! view is guaranteed to carry every field. Nothing here is mutated at runtime.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use shared_types::LatencyBucket;

use crate::error::{Result, TracezError};

/// Characters escaped when a span name is substituted into a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const NAME_PLACEHOLDER: &str = "{name}";
const BUCKET_PLACEHOLDER: &str = "{bucket}";

// ── View names ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewName {
    Overview,
    Error,
    Running,
    Latency,
}

impl ViewName {
    pub const ALL: [ViewName; 4] = [
        ViewName::Overview,
        ViewName::Error,
        ViewName::Running,
        ViewName::Latency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewName::Overview => "overview",
            ViewName::Error => "error",
            ViewName::Running => "running",
            ViewName::Latency => "latency",
        }
    }

    /// Overview shows bucket counts, latency shows one bucket's samples.
    pub fn is_latency_bucketed(self) -> bool {
        !matches!(self, ViewName::Error | ViewName::Running)
    }

    pub fn has_drilldown(self) -> bool {
        !resolve_view(self).navigable_columns.is_empty() || self.is_latency_bucketed()
    }
}

impl FromStr for ViewName {
    type Err = TracezError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "overview" | "all" => Ok(ViewName::Overview),
            "error" => Ok(ViewName::Error),
            "running" => Ok(ViewName::Running),
            "latency" => Ok(ViewName::Latency),
            other => Err(TracezError::UnknownView(other.to_string())),
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Columns ──────────────────────────────────────────────────────────────────

/// How a column's value turns into table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Scalar,
    Timestamp,
    NavigableCount,
    LatencyArray,
    KeyValueMap,
    EventList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    ErrorCount,
    RunningCount,
    LatencyCounts,
    SpanId,
    ParentId,
    TraceId,
    Start,
    Duration,
    Status,
    Description,
    Attributes,
    Events,
}

impl Column {
    /// Identifier used in headers and in `data-column` attributes.
    pub fn id(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::ErrorCount => "error",
            Column::RunningCount => "running",
            Column::LatencyCounts => "latency",
            Column::SpanId => "spanid",
            Column::ParentId => "parentid",
            Column::TraceId => "traceid",
            Column::Start => "start",
            Column::Duration => "duration",
            Column::Status => "status",
            Column::Description => "description",
            Column::Attributes => "attributes",
            Column::Events => "events",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Name
            | Column::SpanId
            | Column::ParentId
            | Column::TraceId
            | Column::Duration
            | Column::Status
            | Column::Description => ColumnKind::Scalar,
            Column::Start => ColumnKind::Timestamp,
            Column::ErrorCount | Column::RunningCount => ColumnKind::NavigableCount,
            Column::LatencyCounts => ColumnKind::LatencyArray,
            Column::Attributes => ColumnKind::KeyValueMap,
            Column::Events => ColumnKind::EventList,
        }
    }

    /// Detail view a click on this column opens, if any.
    pub fn drilldown_view(self) -> Option<ViewName> {
        match self {
            Column::ErrorCount => Some(ViewName::Error),
            Column::RunningCount => Some(ViewName::Running),
            Column::LatencyCounts => Some(ViewName::Latency),
            _ => None,
        }
    }

    /// Number of `<td>` cells one value of this column occupies.
    pub fn cell_span(self) -> usize {
        match self.kind() {
            ColumnKind::LatencyArray => LatencyBucket::ALL.len(),
            _ => 1,
        }
    }
}

impl FromStr for Column {
    type Err = TracezError;

    fn from_str(raw: &str) -> Result<Self> {
        const ALL: [Column; 13] = [
            Column::Name,
            Column::ErrorCount,
            Column::RunningCount,
            Column::LatencyCounts,
            Column::SpanId,
            Column::ParentId,
            Column::TraceId,
            Column::Start,
            Column::Duration,
            Column::Status,
            Column::Description,
            Column::Attributes,
            Column::Events,
        ];
        ALL.iter()
            .copied()
            .find(|column| column.id() == raw)
            .ok_or_else(|| TracezError::InvalidConfig(format!("unknown column: {raw}")))
    }
}

// ── Layout ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClass {
    Sm,
    Md,
}

impl WidthClass {
    pub fn css_class(self) -> &'static str {
        match self {
            WidthClass::Sm => "sm",
            WidthClass::Md => "md",
        }
    }
}

/// `repeats` consecutive `<col>` elements of one width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidth {
    pub class: WidthClass,
    pub repeats: usize,
}

const fn width(class: WidthClass, repeats: usize) -> ColumnWidth {
    ColumnWidth { class, repeats }
}

// ── Views ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub name: ViewName,
    /// Relative to the configured endpoint base; may hold `{name}` / `{bucket}`
    pub endpoint_template: &'static str,
    pub container_id: &'static str,
    pub column_layout: &'static [ColumnWidth],
    pub headings: &'static [Column],
    /// Header labels when they differ from `headings`
    pub cell_headings: Option<&'static [&'static str]>,
    pub navigable_columns: &'static [Column],
    pub fixed_status: Option<&'static str>,
}

/// What a drill-down scopes a detail view to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrilldownKey {
    pub span_name: String,
    pub bucket: Option<LatencyBucket>,
}

impl DrilldownKey {
    pub fn span(span_name: impl Into<String>) -> Self {
        Self {
            span_name: span_name.into(),
            bucket: None,
        }
    }

    pub fn bucket(span_name: impl Into<String>, bucket: LatencyBucket) -> Self {
        Self {
            span_name: span_name.into(),
            bucket: Some(bucket),
        }
    }
}

impl View {
    /// Endpoint path with the drill-down key substituted in. Missing parts
    /// substitute as empty strings.
    pub fn endpoint_path(&self, key: Option<&DrilldownKey>) -> String {
        let name = key
            .map(|k| utf8_percent_encode(&k.span_name, PATH_SEGMENT).to_string())
            .unwrap_or_default();
        let bucket = key
            .and_then(|k| k.bucket)
            .map(|b| b.index().to_string())
            .unwrap_or_default();
        self.endpoint_template
            .replace(NAME_PLACEHOLDER, &name)
            .replace(BUCKET_PLACEHOLDER, &bucket)
    }

    /// Labels rendered into the header row, one per `<td>` of a row.
    pub fn header_labels(&self) -> Vec<&'static str> {
        match self.cell_headings {
            Some(labels) => labels.to_vec(),
            None => self.headings.iter().map(|column| column.id()).collect(),
        }
    }

    /// Number of cells a rendered row of this view has.
    pub fn row_width(&self) -> usize {
        self.headings.iter().map(|column| column.cell_span()).sum()
    }

    pub fn layout_width(&self) -> usize {
        self.column_layout.iter().map(|w| w.repeats).sum()
    }

    pub fn is_navigable(&self, column: Column) -> bool {
        self.navigable_columns.contains(&column)
    }

    /// Element detail subheadings are written into.
    pub fn subheading_container(&self) -> String {
        format!("{}_header", self.container_id)
    }
}

pub const OVERVIEW_CONTAINER: &str = "overview_table";
pub const DETAIL_CONTAINER: &str = "name_type_detail_table";
pub const LAST_UPDATE_CONTAINER: &str = "lastUpdateTime";

const OVERVIEW_CELL_HEADINGS: [&str; 12] = [
    "name",
    "error",
    "running",
    LatencyBucket::ZeroToTenMicros.label(),
    LatencyBucket::TenMicrosToHundredMicros.label(),
    LatencyBucket::HundredMicrosToOneMilli.label(),
    LatencyBucket::OneMilliToTenMillis.label(),
    LatencyBucket::TenMillisToHundredMillis.label(),
    LatencyBucket::HundredMillisToOneSecond.label(),
    LatencyBucket::OneSecondToTenSeconds.label(),
    LatencyBucket::TenSecondsToHundredSeconds.label(),
    LatencyBucket::HundredSecondsToMax.label(),
];

static OVERVIEW: View = View {
    name: ViewName::Overview,
    endpoint_template: "aggregations",
    container_id: OVERVIEW_CONTAINER,
    column_layout: &[width(WidthClass::Md, 1), width(WidthClass::Sm, 11)],
    headings: &[
        Column::Name,
        Column::ErrorCount,
        Column::RunningCount,
        Column::LatencyCounts,
    ],
    cell_headings: Some(&OVERVIEW_CELL_HEADINGS),
    navigable_columns: &[
        Column::ErrorCount,
        Column::RunningCount,
        Column::LatencyCounts,
    ],
    fixed_status: None,
};

static ERROR: View = View {
    name: ViewName::Error,
    endpoint_template: "error/{name}",
    container_id: DETAIL_CONTAINER,
    column_layout: &[width(WidthClass::Sm, 5), width(WidthClass::Md, 3)],
    headings: &[
        Column::SpanId,
        Column::ParentId,
        Column::TraceId,
        Column::Start,
        Column::Status,
        Column::Description,
        Column::Attributes,
        Column::Events,
    ],
    cell_headings: None,
    navigable_columns: &[],
    fixed_status: None,
};

static RUNNING: View = View {
    name: ViewName::Running,
    endpoint_template: "running/{name}",
    container_id: DETAIL_CONTAINER,
    column_layout: &[width(WidthClass::Sm, 4), width(WidthClass::Md, 3)],
    headings: &[
        Column::SpanId,
        Column::ParentId,
        Column::TraceId,
        Column::Start,
        Column::Description,
        Column::Attributes,
        Column::Events,
    ],
    cell_headings: None,
    navigable_columns: &[],
    fixed_status: Some("pending"),
};

static LATENCY: View = View {
    name: ViewName::Latency,
    endpoint_template: "latency/{name}/{bucket}",
    container_id: DETAIL_CONTAINER,
    column_layout: &[width(WidthClass::Sm, 5), width(WidthClass::Md, 3)],
    headings: &[
        Column::SpanId,
        Column::ParentId,
        Column::TraceId,
        Column::Start,
        Column::Duration,
        Column::Description,
        Column::Attributes,
        Column::Events,
    ],
    cell_headings: None,
    navigable_columns: &[],
    fixed_status: Some("ok"),
};

pub fn resolve_view(name: ViewName) -> &'static View {
    match name {
        ViewName::Overview => &OVERVIEW,
        ViewName::Error => &ERROR,
        ViewName::Running => &RUNNING,
        ViewName::Latency => &LATENCY,
    }
}

pub fn resolve_view_named(name: &str) -> Result<&'static View> {
    name.parse().map(resolve_view)
}

/// Checks the structural invariants of every view: non-empty headings,
/// navigable columns drawn from the headings, and layout, header and row
/// widths that agree.
pub fn validate() -> Result<()> {
    for name in ViewName::ALL {
        let view = resolve_view(name);
        if view.headings.is_empty() {
            return Err(TracezError::InvalidConfig(format!("{name}: no headings")));
        }
        if let Some(column) = view
            .navigable_columns
            .iter()
            .find(|column| !view.headings.contains(column))
        {
            return Err(TracezError::InvalidConfig(format!(
                "{name}: navigable column {} is not a heading",
                column.id()
            )));
        }
        if let Some(column) = view
            .navigable_columns
            .iter()
            .find(|column| column.drilldown_view().is_none())
        {
            return Err(TracezError::InvalidConfig(format!(
                "{name}: column {} has no detail view",
                column.id()
            )));
        }
        let header = view.header_labels().len();
        let row = view.row_width();
        let layout = view.layout_width();
        if header != row || layout != row {
            return Err(TracezError::InvalidConfig(format!(
                "{name}: {layout} layout columns, {header} headers, {row} row cells"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_view_passes_validation() {
        validate().expect("registry should be consistent");
    }

    #[test]
    fn resolve_by_name_round_trips() {
        for name in ViewName::ALL {
            let view = resolve_view_named(name.as_str()).expect("known view");
            assert_eq!(view.name, name);
            assert!(!view.headings.is_empty(), "{name} has no headings");
        }
        assert_eq!(resolve_view_named("all").map(|v| v.name), Ok(ViewName::Overview));
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert_eq!(
            resolve_view_named("histogram"),
            Err(TracezError::UnknownView("histogram".to_string()))
        );
    }

    #[test]
    fn latency_bucketing_and_drilldown_predicates() {
        assert!(ViewName::Overview.is_latency_bucketed());
        assert!(ViewName::Latency.is_latency_bucketed());
        assert!(!ViewName::Error.is_latency_bucketed());
        assert!(!ViewName::Running.is_latency_bucketed());

        assert!(ViewName::Overview.has_drilldown());
        assert!(ViewName::Latency.has_drilldown());
        assert!(!ViewName::Error.has_drilldown());
        assert!(!ViewName::Running.has_drilldown());
    }

    #[test]
    fn endpoint_templates_substitute_keys() {
        assert_eq!(resolve_view(ViewName::Overview).endpoint_path(None), "aggregations");
        assert_eq!(
            resolve_view(ViewName::Error).endpoint_path(Some(&DrilldownKey::span("foo"))),
            "error/foo"
        );
        assert_eq!(
            resolve_view(ViewName::Latency).endpoint_path(Some(&DrilldownKey::bucket(
                "bar",
                LatencyBucket::OneMilliToTenMillis
            ))),
            "latency/bar/3"
        );
        assert_eq!(resolve_view(ViewName::Running).endpoint_path(None), "running/");
    }

    #[test]
    fn span_names_are_encoded_as_one_segment() {
        let path = resolve_view(ViewName::Error)
            .endpoint_path(Some(&DrilldownKey::span("GET /users?id=1")));
        assert_eq!(path, "error/GET%20%2Fusers%3Fid=1");
    }

    #[test]
    fn overview_headers_expand_latency_buckets() {
        let labels = resolve_view(ViewName::Overview).header_labels();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[3], ">0s");
        assert_eq!(labels[6], ">1ms");
        assert_eq!(labels[11], ">100s");
    }

    #[test]
    fn detail_views_share_one_container() {
        for name in [ViewName::Error, ViewName::Running, ViewName::Latency] {
            let view = resolve_view(name);
            assert_eq!(view.container_id, DETAIL_CONTAINER);
            assert_eq!(view.subheading_container(), "name_type_detail_table_header");
        }
    }
}
