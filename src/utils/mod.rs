use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the global fmt subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let env_directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let filter = build_filter(env_directive.as_deref(), default_filter);

        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Picks the first parsable directive of `env_directive`, `default_filter`
/// and plain `info`.
pub fn build_filter(env_directive: Option<&str>, default_filter: &str) -> EnvFilter {
    env_directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(default_filter).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_filter_applies_without_env() {
        let filter = build_filter(None, "tally=debug");
        assert!(filter.to_string().contains("tally=debug"));
    }

    #[test]
    fn env_directive_wins_over_config() {
        let filter = build_filter(Some("tally_core=trace"), "tally=debug");
        let rendered = filter.to_string();
        assert!(rendered.contains("tally_core=trace"));
        assert!(!rendered.contains("tally=debug"));
    }
}
