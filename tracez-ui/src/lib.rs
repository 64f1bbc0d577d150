pub mod api;
pub mod cells;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod interop;
pub mod markup;
pub mod navigation;
pub mod registry;

pub use api::*;
pub use components::*;
pub use config::{TimestampZone, TracezConfig};
pub use engine::{Diagnostic, DiagnosticLevel, Engine, RenderOutcome, SpanSource, Surface};
pub use error::TracezError;
pub use interop::*;
pub use navigation::{ActivatedCell, Navigation};
pub use registry::{resolve_view, resolve_view_named, DrilldownKey, View, ViewName};
