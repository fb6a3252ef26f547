//! Process-wide log output.
//!
//! The member crates log through the `log` facade; records are bridged into
//! a `tracing-subscriber` fmt subscriber filtered by `RUST_LOG`, falling
//! back to `info` (or `debug` when requested).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init_logging(verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    #[cfg(feature = "logs-json")]
    let fmt_layer = tracing_subscriber::fmt::layer().json();
    #[cfg(not(feature = "logs-json"))]
    let fmt_layer = tracing_subscriber::fmt::layer();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(verbose, "logging initialised");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let _ = init_logging(true);
        assert!(!init_logging(false));
        log::info!("still logging after a repeated init");
    }

    #[test]
    fn directive_follows_verbose_flag() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "info");
    }
}
