use std::rc::Rc;

use dioxus::prelude::*;

use crate::api::GlooSource;
use crate::config::TracezConfig;
use crate::engine::Engine;
use crate::interop::{install_cell_click_listener, DomSurface};
use crate::registry::{
    resolve_view, validate, ViewName, DETAIL_CONTAINER, LAST_UPDATE_CONTAINER, OVERVIEW_CONTAINER,
};

use super::styles::TRACEZ_STYLES;

pub type BrowserEngine = Engine<GlooSource, DomSurface>;

fn start_engine() -> Rc<BrowserEngine> {
    if let Err(e) = validate() {
        dioxus_logger::tracing::error!("Tracez view registry is inconsistent: {}", e);
    }

    let engine = Rc::new(Engine::new(
        GlooSource,
        DomSurface,
        TracezConfig::from_location(),
    ));

    let listener_engine = engine.clone();
    let installed = install_cell_click_listener(move |click| {
        let engine = listener_engine.clone();
        wasm_bindgen_futures::spawn_local(async move {
            engine.on_cell_activated(click.cell, &click.row_key).await;
        });
    });
    if let Err(e) = installed {
        dioxus_logger::tracing::error!("Tracez drill-down disabled: {}", e);
    }

    engine
}

#[component]
pub fn TracezPage() -> Element {
    let engine = use_hook(start_engine);

    {
        let engine = engine.clone();
        use_effect(move || {
            let engine = engine.clone();
            spawn(async move {
                engine.refresh_data().await;
            });
        });
    }

    let refresh_engine = engine.clone();

    let subheading_id = resolve_view(ViewName::Error).subheading_container();

    rsx! {
        style { {TRACEZ_STYLES} }
        div {
            class: "tracez",
            header {
                class: "tracez-header",
                h1 { class: "tracez-title", "Tracez" }
                div {
                    class: "tracez-refresh",
                    button {
                        class: "tracez-refresh-button",
                        onclick: move |_| {
                            let engine = refresh_engine.clone();
                            spawn(async move {
                                engine.refresh_data().await;
                            });
                        },
                        "Refresh"
                    }
                    span { class: "tracez-refresh-label", "Last updated: " }
                    span { id: LAST_UPDATE_CONTAINER, class: "tracez-refresh-time" }
                }
            }
            table { id: OVERVIEW_CONTAINER, class: "tracez-table" }
            div { id: "{subheading_id}", class: "tracez-subheading" }
            table { id: DETAIL_CONTAINER, class: "tracez-table" }
        }
    }
}
