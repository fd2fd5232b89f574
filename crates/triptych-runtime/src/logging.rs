#![forbid(unsafe_code)]

//! Global `tracing` subscriber setup for applications embedding Triptych.
//!
//! The filter comes from `TRIPTYCH_LOG` using `EnvFilter` directive syntax,
//! for example `TRIPTYCH_LOG=triptych_runtime=debug,warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "TRIPTYCH_LOG";

/// Filter used when `TRIPTYCH_LOG` is unset or does not parse.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `TRIPTYCH_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a formatting subscriber as the global default.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert_eq!(EnvFilter::new(DEFAULT_FILTER).to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn second_init_is_refused() {
        init();
        assert!(!init());
        tracing::debug!("logging installed");
    }
}
