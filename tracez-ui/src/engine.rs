//! Fetch-and-render engine behind every tracez table.
//!
//! The engine never lets a failure escape: every operation returns a
//! [`RenderOutcome`] and reports problems to the diagnostic log, leaving the
//! previously rendered content in place.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use dioxus_logger::tracing::{debug, error, info, warn};
use serde_json::Value;
use shared_types::{SpanAggregateRecord, SpanDetailRecord};

use crate::cells::{TableMarkup, TableRecord};
use crate::config::TracezConfig;
use crate::error::{Result, TracezError};
use crate::navigation::{ActivatedCell, Navigation};
use crate::registry::{
    resolve_view, resolve_view_named, DrilldownKey, View, ViewName, LAST_UPDATE_CONTAINER,
};

/// Diagnostic entries kept for inspection
pub const DIAGNOSTIC_HISTORY: usize = 64;

/// Where span records come from.
#[async_trait(?Send)]
pub trait SpanSource {
    /// GETs `url` and returns the response body. Non-2xx responses are
    /// `FetchFailure`s.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Where rendered markup goes. Containers are addressed by element id.
pub trait Surface {
    fn replace_table(&self, container: &str, table: &TableMarkup);

    /// Appends rows to the body of the table already in `container`.
    fn append_rows(&self, container: &str, rows: &str);

    fn set_html(&self, container: &str, html: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Debug,
    Note,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { rows: usize },
    Appended { rows: usize },
    /// A newer request for the same container was issued before this one
    /// completed; its response was dropped.
    Superseded,
    Failed(TracezError),
}

pub struct Engine<S, D> {
    source: S,
    surface: D,
    config: TracezConfig,
    navigation: RefCell<Navigation>,
    generations: RefCell<HashMap<&'static str, u64>>,
    diagnostics: RefCell<VecDeque<Diagnostic>>,
}

impl<S: SpanSource, D: Surface> Engine<S, D> {
    pub fn new(source: S, surface: D, config: TracezConfig) -> Self {
        Self {
            source,
            surface,
            config,
            navigation: RefCell::new(Navigation::Overview),
            generations: RefCell::new(HashMap::new()),
            diagnostics: RefCell::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &TracezConfig {
        &self.config
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation.borrow().clone()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().iter().cloned().collect()
    }

    /// Stamps the refresh time and re-renders the overview.
    pub async fn refresh_data(&self) -> RenderOutcome {
        let now = self.config.timestamp_zone.format(Utc::now());
        self.surface.set_html(LAST_UPDATE_CONTAINER, &now);
        self.render_view(ViewName::Overview, None).await
    }

    /// Replaces the view's container with a fresh header and one row per
    /// returned record.
    pub async fn render_view(&self, name: ViewName, key: Option<&DrilldownKey>) -> RenderOutcome {
        let view = resolve_view(name);
        let url = self.url_for(view, key);
        let generation = self.begin_request(view.container_id);

        let result = self.fetch_table(view, &url).await;
        if !self.is_current(view.container_id, generation) {
            self.record(
                DiagnosticLevel::Debug,
                format!("dropped stale response for {name} table from {url}"),
            );
            debug!(view = %name, url = %url, "dropping superseded response");
            return RenderOutcome::Superseded;
        }

        match result {
            Ok((table, rows)) => {
                self.surface.replace_table(view.container_id, &table);
                RenderOutcome::Rendered { rows }
            }
            Err(e) => self.fail(name, &url, e),
        }
    }

    /// String-keyed entry point; unknown names are reported, not raised.
    pub async fn render_view_named(
        &self,
        name: &str,
        key: Option<&DrilldownKey>,
    ) -> RenderOutcome {
        match resolve_view_named(name) {
            Ok(view) => self.render_view(view.name, key).await,
            Err(e) => {
                self.record(DiagnosticLevel::Failure, e.to_string());
                warn!(view = %name, "cannot render unknown view");
                RenderOutcome::Failed(e)
            }
        }
    }

    /// Appends the returned rows to the existing table body. An empty result
    /// leaves the table untouched.
    pub async fn append_view(&self, name: ViewName, key: Option<&DrilldownKey>) -> RenderOutcome {
        let view = resolve_view(name);
        let url = self.url_for(view, key);
        let generation = self.current_generation(view.container_id);

        let result = self.fetch_table(view, &url).await;
        if !self.is_current(view.container_id, generation) {
            self.record(
                DiagnosticLevel::Debug,
                format!("dropped stale rows for {name} table from {url}"),
            );
            debug!(view = %name, url = %url, "dropping rows for a replaced table");
            return RenderOutcome::Superseded;
        }

        match result {
            Ok((_, 0)) => {
                self.record(DiagnosticLevel::Note, format!("No rows added for {name} table"));
                info!(view = %name, url = %url, "no rows added");
                RenderOutcome::Appended { rows: 0 }
            }
            Ok((table, rows)) => {
                self.surface.append_rows(view.container_id, &table.body);
                RenderOutcome::Appended { rows }
            }
            Err(e) => self.fail(name, &url, e),
        }
    }

    /// Drills down from an overview cell. The navigation state and the
    /// subheading only change once the detail table has rendered.
    pub async fn on_cell_activated(&self, cell: ActivatedCell, row_key: &str) -> Navigation {
        let target = Navigation::drill_down(cell, row_key);
        let key = target.drilldown_key();
        let view = resolve_view(target.view());

        if let RenderOutcome::Rendered { .. } = self.render_view(view.name, key.as_ref()).await {
            if let Some(html) = target.subheading(self.config.sample_limit) {
                self.surface.set_html(&view.subheading_container(), &html);
            }
            *self.navigation.borrow_mut() = target;
        }
        self.navigation()
    }

    fn url_for(&self, view: &View, key: Option<&DrilldownKey>) -> String {
        self.config.endpoint_url(&view.endpoint_path(key))
    }

    async fn fetch_table(&self, view: &View, url: &str) -> Result<(TableMarkup, usize)> {
        let body = self.source.fetch(url).await?;
        match view.name {
            ViewName::Overview => decode_table::<SpanAggregateRecord>(view, &body, &self.config),
            ViewName::Error | ViewName::Running | ViewName::Latency => {
                decode_table::<SpanDetailRecord>(view, &body, &self.config)
            }
        }
    }

    fn begin_request(&self, container: &'static str) -> u64 {
        let mut generations = self.generations.borrow_mut();
        let generation = generations.entry(container).or_insert(0);
        *generation += 1;
        *generation
    }

    fn current_generation(&self, container: &'static str) -> u64 {
        self.generations
            .borrow()
            .get(container)
            .copied()
            .unwrap_or(0)
    }

    fn is_current(&self, container: &'static str, generation: u64) -> bool {
        self.current_generation(container) == generation
    }

    fn fail(&self, name: ViewName, url: &str, error: TracezError) -> RenderOutcome {
        self.record(
            DiagnosticLevel::Failure,
            format!("{name} table from {url}: {error}"),
        );
        if error.is_recoverable() {
            warn!(view = %name, url = %url, "keeping previous content: {}", error);
        } else {
            error!(view = %name, url = %url, "cannot render: {}", error);
        }
        RenderOutcome::Failed(error)
    }

    fn record(&self, level: DiagnosticLevel, message: String) {
        let mut diagnostics = self.diagnostics.borrow_mut();
        diagnostics.push_back(Diagnostic { level, message });
        while diagnostics.len() > DIAGNOSTIC_HISTORY {
            diagnostics.pop_front();
        }
    }
}

/// Decodes a response body into records and renders them for `view`.
fn decode_table<R: TableRecord>(
    view: &View,
    body: &str,
    config: &TracezConfig,
) -> Result<(TableMarkup, usize)> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TracezError::MalformedResponse(format!("invalid JSON: {e}")))?;
    if !value.is_array() {
        return Err(TracezError::MalformedResponse(
            "expected a JSON array".to_string(),
        ));
    }
    let records: Vec<R> = serde_json::from_value(value)
        .map_err(|e| TracezError::MalformedResponse(format!("invalid record: {e}")))?;
    let table = TableMarkup::render(view, &records, config.timestamp_zone);
    Ok((table, records.len()))
}
