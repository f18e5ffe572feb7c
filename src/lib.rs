pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{InMemorySource, JsonFileSource, RecordingSurface, TracingNotifier};
pub use config::MapConfig;
pub use crate::core::{
    filter::{FilterPipeline, ListScope},
    focus::{FocusTransition, ListFocusManager},
    markers::{ColorResolver, MarkerRenderer},
    polygon::{ring_contains, PolygonSelector},
    session::{Invalidation, MapSession},
    store::AddressStore,
    viewport::ViewportController,
};
pub use utils::error::{MapError, Result};
