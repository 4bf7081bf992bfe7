//! Sprig Core
//!
//! Shared building blocks for the Sprig workspace: generational storage,
//! geometry primitives, logging and profiling setup.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;

pub use config::{Config, ProfilingMode};

/// Initialize logging and profiling according to `config`.
pub fn init(config: &Config) {
    match &config.log_filter {
        Some(filter) => logging::init_with_filter(filter),
        None => logging::init(),
    }

    match config.profiling {
        ProfilingMode::Off => {}
        ProfilingMode::Scopes => profiling::enable_scopes(),
        #[cfg(feature = "profiling")]
        ProfilingMode::WithWebserver => {
            profiling::init_profiling(profiling::ProfilingBackend::PuffinHttp)
        }
        #[cfg(not(feature = "profiling"))]
        ProfilingMode::WithWebserver => {
            tracing::warn!("Profiling webserver requested but the `profiling` feature is disabled");
        }
    }
}
