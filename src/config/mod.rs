#[cfg(feature = "cli")]
pub mod cli;
pub mod map_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use map_config::MapConfig;
