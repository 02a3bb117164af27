//! Diagnostic logging setup for the `iv` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary. Output goes to stderr so JSON on stdout stays parseable.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "IV_LOG";

/// Filter used when `IV_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "ideavault=debug" } else { "warn" }
}

/// Install the global subscriber.
///
/// `IV_LOG` wins over `verbose`. Calling this twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "ideavault=debug");
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
