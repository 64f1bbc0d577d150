use dioxus_logger::tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{window, Document, Element, MouseEvent};

use crate::cells::TableMarkup;
use crate::engine::Surface;
use crate::error::{Result, TracezError};
use crate::navigation::ActivatedCell;

fn document() -> Option<Document> {
    window()?.document()
}

fn element(id: &str) -> Option<Element> {
    let element = document()?.get_element_by_id(id);
    if element.is_none() {
        warn!(container = %id, "container element not found");
    }
    element
}

/// Writes rendered markup into the page's container elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomSurface;

impl Surface for DomSurface {
    fn replace_table(&self, container: &str, table: &TableMarkup) {
        if let Some(element) = element(container) {
            element.set_inner_html(&table.to_html());
        }
    }

    fn append_rows(&self, container: &str, rows: &str) {
        let Some(element) = element(container) else {
            return;
        };
        let body = match element.query_selector("tbody") {
            Ok(Some(body)) => body,
            _ => {
                warn!(container = %container, "no table body to append to");
                return;
            }
        };
        if let Err(e) = body.insert_adjacent_html("beforeend", rows) {
            warn!(container = %container, "failed to append rows: {:?}", e);
        }
    }

    fn set_html(&self, container: &str, html: &str) {
        if let Some(element) = element(container) {
            element.set_inner_html(html);
        }
    }
}

/// A click on a navigable cell, decoded from its data attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellClick {
    pub cell: ActivatedCell,
    pub row_key: String,
}

/// `None` when the click did not land inside a navigable cell.
pub fn cell_click_from_event(event: &MouseEvent) -> Option<Result<CellClick>> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let cell = target.closest("td.click").ok()??;
    let column = cell.get_attribute("data-column")?;
    let row_key = cell.get_attribute("data-row")?;
    let bucket = cell.get_attribute("data-bucket");
    Some(
        ActivatedCell::from_attributes(&column, bucket.as_deref())
            .map(|cell| CellClick { cell, row_key }),
    )
}

/// Routes clicks on navigable cells anywhere in the document to `on_click`.
pub fn install_cell_click_listener(on_click: impl Fn(CellClick) + 'static) -> Result<()> {
    let document = document().ok_or_else(|| TracezError::Dom("no document on window".into()))?;

    let click_closure = Closure::wrap(Box::new(move |e: MouseEvent| {
        match cell_click_from_event(&e) {
            Some(Ok(click)) => on_click(click),
            Some(Err(err)) => warn!("ignoring click on malformed cell: {}", err),
            None => {}
        }
    }) as Box<dyn FnMut(MouseEvent)>);

    document
        .add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())
        .map_err(|e| TracezError::Dom(format!("failed to add click listener: {e:?}")))?;

    // Lives as long as the page
    click_closure.forget();
    Ok(())
}
