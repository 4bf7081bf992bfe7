/// Process-wide configuration for Sprig applications.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// `tracing` filter directives; `None` defers to `RUST_LOG` and then the
    /// built-in default.
    pub log_filter: Option<String>,
    pub profiling: ProfilingMode,
}

impl Config {
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn with_profiling(mut self, profiling: ProfilingMode) -> Self {
        self.profiling = profiling;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling scopes are disabled
    #[default]
    Off,
    /// Profiling scopes are recorded in-process
    Scopes,
    /// Profiling scopes are recorded and served to external tools such as
    /// 'puffin_viewer'
    WithWebserver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.log_filter.is_none());
        assert_eq!(config.profiling, ProfilingMode::Off);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_log_filter("sprig_ui=debug")
            .with_profiling(ProfilingMode::Scopes);
        assert_eq!(config.log_filter.as_deref(), Some("sprig_ui=debug"));
        assert_eq!(config.profiling, ProfilingMode::Scopes);
    }
}
