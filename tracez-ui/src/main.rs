use dioxus::launch;
use dioxus::prelude::*;
use dioxus_logger::tracing::{info, Level};

use tracez_ui::TracezPage;

fn main() {
    wasm_logger::init(wasm_logger::Config::default().module_prefix("tracez_ui"));
    dioxus_logger::init(Level::INFO).ok();
    info!("starting tracez dashboard");

    launch(TracezApp);
}

#[component]
fn TracezApp() -> Element {
    rsx! {
        TracezPage {}
    }
}
