//! Column-driven cell rendering.
//!
//! Each [`ColumnKind`] has exactly one render strategy; records only expose
//! their raw values through [`TableRecord::cell`].

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use shared_types::{LatencyBucket, SpanAggregateRecord, SpanDetailRecord, SpanEvent};

use crate::config::TimestampZone;
use crate::markup::{code_block, html_escape, text_or_not_set, EMPTY, NOT_SET};
use crate::registry::{Column, ColumnKind, View};

/// Raw value of one column of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    Text(Cow<'a, str>),
    Timestamp(DateTime<Utc>),
    Count(u64),
    Buckets(&'a [u64]),
    Map(&'a Map<String, Value>),
    Events(&'a [SpanEvent]),
    Missing,
}

/// A record a view can render as a row.
pub trait TableRecord: DeserializeOwned {
    /// Span name the row drills down on
    fn row_key(&self) -> &str;

    fn cell(&self, column: Column) -> CellValue<'_>;
}

impl TableRecord for SpanAggregateRecord {
    fn row_key(&self) -> &str {
        &self.name
    }

    fn cell(&self, column: Column) -> CellValue<'_> {
        match column {
            Column::Name => CellValue::Text(Cow::Borrowed(&self.name)),
            Column::ErrorCount => CellValue::Count(self.error_count),
            Column::RunningCount => CellValue::Count(self.running_count),
            Column::LatencyCounts => CellValue::Buckets(&self.latency_counts),
            _ => CellValue::Missing,
        }
    }
}

impl TableRecord for SpanDetailRecord {
    fn row_key(&self) -> &str {
        &self.span_id
    }

    fn cell(&self, column: Column) -> CellValue<'_> {
        match column {
            Column::SpanId => CellValue::Text(Cow::Borrowed(&self.span_id)),
            Column::ParentId => CellValue::Text(Cow::Borrowed(&self.parent_id)),
            Column::TraceId => CellValue::Text(Cow::Borrowed(&self.trace_id)),
            Column::Description => CellValue::Text(Cow::Borrowed(&self.description)),
            Column::Start => CellValue::Timestamp(self.start_time()),
            Column::Duration => self
                .duration_nanos
                .map(|nanos| CellValue::Text(Cow::Owned(nanos.to_string())))
                .unwrap_or(CellValue::Missing),
            Column::Status => self
                .status_code
                .map(|code| CellValue::Text(Cow::Borrowed(code.as_str())))
                .unwrap_or(CellValue::Missing),
            Column::Attributes => CellValue::Map(&self.attributes),
            Column::Events => CellValue::Events(&self.events),
            _ => CellValue::Missing,
        }
    }
}

fn td(content: &str) -> String {
    format!("<td>{content}</td>")
}

fn clickable_td(
    column: Column,
    row_key: &str,
    bucket: Option<LatencyBucket>,
    content: &str,
) -> String {
    let bucket_attr = bucket
        .map(|b| format!(" data-bucket='{}'", b.index()))
        .unwrap_or_default();
    format!(
        "<td class='click' data-column='{}' data-row='{}'{bucket_attr}>{content}</td>",
        column.id(),
        html_escape(row_key),
    )
}

fn event_value(event: &SpanEvent, zone: TimestampZone) -> Value {
    json!({
        "name": event.name,
        "timestamp": zone.format_nanos(event.timestamp),
        "attributes": event.attributes,
    })
}

/// Renders one column of a record as one or more `<td>` cells.
pub fn render_cells<R: TableRecord>(
    view: &View,
    column: Column,
    record: &R,
    zone: TimestampZone,
) -> String {
    let value = record.cell(column);
    match (column.kind(), value) {
        (ColumnKind::Scalar, CellValue::Text(text)) => td(&text_or_not_set(&text)),
        (ColumnKind::Timestamp, CellValue::Timestamp(instant)) => td(&zone.format(instant)),
        (ColumnKind::NavigableCount, CellValue::Count(count)) if view.is_navigable(column) => {
            clickable_td(column, record.row_key(), None, &count.to_string())
        }
        (ColumnKind::NavigableCount, CellValue::Count(count)) => td(&count.to_string()),
        (ColumnKind::LatencyArray, CellValue::Buckets(counts)) => LatencyBucket::ALL
            .iter()
            .map(|&bucket| {
                let count = counts
                    .get(bucket.index())
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| NOT_SET.to_string());
                if view.is_navigable(column) {
                    clickable_td(column, record.row_key(), Some(bucket), &count)
                } else {
                    td(&count)
                }
            })
            .collect(),
        (ColumnKind::KeyValueMap, CellValue::Map(map)) if map.is_empty() => td(EMPTY),
        (ColumnKind::KeyValueMap, CellValue::Map(map)) => {
            td(&code_block(&Value::Object(map.clone())))
        }
        (ColumnKind::EventList, CellValue::Events([])) => td(EMPTY),
        (ColumnKind::EventList, CellValue::Events(events)) => {
            let blocks: String = events
                .iter()
                .map(|event| code_block(&event_value(event, zone)))
                .collect();
            td(&blocks)
        }
        _ => std::iter::repeat(td(NOT_SET))
            .take(column.cell_span())
            .collect(),
    }
}

/// One `<tr>` for a record, columns ordered per the view's headings.
pub fn render_row<R: TableRecord>(view: &View, record: &R, zone: TimestampZone) -> String {
    let cells: String = view
        .headings
        .iter()
        .map(|&column| render_cells(view, column, record, zone))
        .collect();
    format!("<tr>{cells}</tr>")
}

pub fn render_rows<R: TableRecord>(view: &View, records: &[R], zone: TimestampZone) -> String {
    records
        .iter()
        .map(|record| render_row(view, record, zone))
        .collect()
}

/// Width specification followed by the header row.
pub fn render_header(view: &View) -> String {
    let cols: String = view
        .column_layout
        .iter()
        .map(|w| format!("<col class='{}'></col>", w.class.css_class()).repeat(w.repeats))
        .collect();
    let headings: String = view
        .header_labels()
        .iter()
        .map(|label| format!("<th>{}</th>", html_escape(label)))
        .collect();
    format!("<colgroup>{cols}</colgroup><thead><tr>{headings}</tr></thead>")
}

/// Complete contents of a view's table element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMarkup {
    pub header: String,
    pub body: String,
}

impl TableMarkup {
    pub fn render<R: TableRecord>(view: &View, records: &[R], zone: TimestampZone) -> Self {
        Self {
            header: render_header(view),
            body: render_rows(view, records, zone),
        }
    }

    pub fn to_html(&self) -> String {
        format!("{}<tbody>{}</tbody>", self.header, self.body)
    }
}
