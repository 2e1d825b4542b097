//! Console configuration, resolved from the environment with defaults.

/// Login surface the console navigates to on a sign-in request.
pub const DEFAULT_LOGIN_URL: &str = "/login";

/// Control event queue depth.
pub const DEFAULT_CONTROL_CAPACITY: usize = 64;

/// View event queue depth.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Tunables for a spawned console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Where a login request navigates to.
    pub login_url: String,
    /// Depth of the inbound control queue.
    pub control_capacity: usize,
    /// Depth of the outbound view event queue.
    pub event_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_owned(),
            control_capacity: DEFAULT_CONTROL_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ConsoleConfig {
    /// Resolve configuration from the environment.
    ///
    /// Recognized variables, all optional:
    /// - `LECTERN_LOGIN_URL`
    /// - `LECTERN_CONTROL_CAPACITY`
    /// - `LECTERN_EVENT_CAPACITY`
    ///
    /// Unset or unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            login_url: env_string("LECTERN_LOGIN_URL", DEFAULT_LOGIN_URL),
            control_capacity: env_usize("LECTERN_CONTROL_CAPACITY", DEFAULT_CONTROL_CAPACITY),
            event_capacity: env_usize("LECTERN_EVENT_CAPACITY", DEFAULT_EVENT_CAPACITY),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
