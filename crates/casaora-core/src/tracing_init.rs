//! Tracing/logging initialization for the bridge binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is applied to the bridge crates
/// and `tower_http` so request spans show up next to turn logs
/// (e.g. `"info"` becomes `"casaora_bridge=info,casaora_core=info,tower_http=info"`).
/// With `log_json` the subscriber emits one JSON object per line for log
/// aggregation.
pub fn init_tracing(level: &str, log_json: bool) {
    let env_filter = std::env::var("RUST_LOG").map_or_else(
        |_| tracing_subscriber::EnvFilter::new(default_directives(level)),
        tracing_subscriber::EnvFilter::new,
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn default_directives(level: &str) -> String {
    format!("casaora_bridge={level},casaora_core={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_cover_bridge_crates() {
        assert_eq!(
            default_directives("debug"),
            "casaora_bridge=debug,casaora_core=debug,tower_http=debug"
        );
    }
}
