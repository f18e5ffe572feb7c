// Adapters layer: concrete implementations of the domain ports.

pub mod json_file;
pub mod memory;
pub mod surface;

pub use json_file::JsonFileSource;
pub use memory::InMemorySource;
pub use surface::{RecordingSurface, SurfaceCommand, TracingNotifier};
