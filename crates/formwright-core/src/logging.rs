#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! All crates log through `tracing` macros. Nothing is printed unless the
//! host installs a subscriber: native hosts can call [`init_subscriber`]
//! (feature `tracing-json`), tests use `tracing_subscriber::fmt` with the test
//! writer, and the wasm front end forwards captured log lines to the console.

/// Default filter when neither the argument nor `RUST_LOG` provides one.
pub const DEFAULT_FILTER: &str =
    "formwright=info,formwright_core=info,formwright_render=info,formwright_runtime=info,formwright_web=info";

/// Error returned when a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
#[derive(Debug)]
pub struct SubscriberInitError(String);

#[cfg(feature = "tracing-json")]
impl std::fmt::Display for SubscriberInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to install tracing subscriber: {}", self.0)
    }
}

#[cfg(feature = "tracing-json")]
impl std::error::Error for SubscriberInitError {}

/// Install a JSON-formatting subscriber filtered by `filter`, `RUST_LOG`, or
/// [`DEFAULT_FILTER`], in that order.
#[cfg(feature = "tracing-json")]
pub fn init_subscriber(filter: Option<&str>) -> Result<(), SubscriberInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| SubscriberInitError(e.to_string()))
}

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    use super::*;

    #[test]
    fn second_install_fails() {
        let _ = init_subscriber(Some("debug"));
        assert!(init_subscriber(None).is_err());
    }
}
