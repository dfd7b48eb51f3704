use tracing_subscriber::{fmt, EnvFilter};

use crate::core::paths::env;

/// Install the global subscriber. `RUST_LOG` wins, `info` otherwise.
/// Pretty multi-line output by default; `FEEDWATCH_LOG_JSON=1` switches to
/// one JSON object per line.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var(env::LOG_JSON)
        .map(|value| value == "1")
        .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .pretty()
            .with_writer(std::io::stderr)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging();
        init_logging();
        tracing::info!(feed = "transfers", emitted = 2, "cycle complete");
        assert!(tracing::dispatcher::has_been_set());
    }
}
