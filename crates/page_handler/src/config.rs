//! Configuration for the recolorization coordinator.
//!
//! The engine runs on fixed constants. [`RecolorConfig::default`] yields
//! them; [`RecolorConfig::from_env`] lets a developer override them without
//! rebuilding.

use core::time::Duration;
use std::env;

/// Nodes or rules processed per cooperative tick.
pub const BATCH_WIDTH: usize = 500;
/// Quiet period before a pass becomes eligible, and the merge window for a
/// pass queued behind a running one.
pub const DEBOUNCE_MS: u64 = 10_000;
/// How often a queued pass checks whether the running pass has finished.
pub const POLL_MS: u64 = 1_000;

/// Runtime configuration for the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecolorConfig {
    /// Nodes or rules processed per tick (at least 1).
    pub batch_width: usize,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Poll interval in milliseconds while a pass is queued (at least 1).
    pub poll_ms: u64,
    /// Whether stylesheet rules are rewritten in addition to nodes.
    pub stylesheets: bool,
}

impl Default for RecolorConfig {
    fn default() -> Self {
        Self {
            batch_width: BATCH_WIDTH,
            debounce_ms: DEBOUNCE_MS,
            poll_ms: POLL_MS,
            stylesheets: true,
        }
    }
}

impl RecolorConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `RECOLOR_BATCH_WIDTH`: batch width (default: 500)
    /// - `RECOLOR_DEBOUNCE_MS`: debounce window in milliseconds (default: 10000)
    /// - `RECOLOR_POLL_MS`: queued-pass poll interval in milliseconds (default: 1000)
    /// - `RECOLOR_STYLESHEETS`: set to "0" to leave stylesheets alone
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let batch_width = lookup("RECOLOR_BATCH_WIDTH")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(BATCH_WIDTH)
            .max(1);
        let debounce_ms = lookup("RECOLOR_DEBOUNCE_MS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEBOUNCE_MS);
        let poll_ms = lookup("RECOLOR_POLL_MS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(POLL_MS)
            .max(1);
        let stylesheets = lookup("RECOLOR_STYLESHEETS").as_deref() != Some("0");
        Self {
            batch_width,
            debounce_ms,
            poll_ms,
            stylesheets,
        }
    }

    #[inline]
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_the_constants() {
        let config = RecolorConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, RecolorConfig::default());
        assert_eq!(config.debounce(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn overrides_and_floors() {
        let config = RecolorConfig::from_lookup(lookup_from(&[
            ("RECOLOR_BATCH_WIDTH", "0"),
            ("RECOLOR_DEBOUNCE_MS", "250"),
            ("RECOLOR_POLL_MS", "nope"),
            ("RECOLOR_STYLESHEETS", "0"),
        ]));
        assert_eq!(config.batch_width, 1);
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.poll_ms, POLL_MS);
        assert!(!config.stylesheets);
    }
}
