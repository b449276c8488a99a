//! Diagnostic logging.
//!
//! Events go to stderr so stdout stays clean for command output. The filter
//! comes from `PD_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`;
//! `--verbose` raises the default to `debug`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PD_LOG";

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "popdocs=debug,pd=debug" } else { "warn" }
}

/// Build the filter from `PD_LOG`, falling back to the default directive.
pub fn build_filter(verbose: bool) -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => {
            EnvFilter::try_new(&directive).unwrap_or_else(|err| {
                eprintln!("ignoring invalid {}: {}", LOG_ENV, err);
                EnvFilter::new(default_directive(verbose))
            })
        }
        _ => EnvFilter::new(default_directive(verbose)),
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
