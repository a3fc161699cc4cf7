//! Launch configuration.
//!
//! In the browser the flags come from the page query string
//! (`index.html?randomize&katakana`), on the command line from `clap`.

use serde::{Deserialize, Serialize};

use crate::Script;

/// Settings read once when a session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Shuffle the question order.
    pub randomize: bool,
    /// Catalog to drill.
    pub script: Script,
    /// Fixed shuffle seed, for reproducible orders.
    pub seed: Option<u64>,
}

impl LaunchConfig {
    /// Parse a query string.
    ///
    /// Accepts an optional leading `?`, bare flags (`randomize`, `katakana`),
    /// `flag=true|1|false|0` and `seed=<u64>`. Unknown or malformed entries
    /// are skipped.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            match key {
                "randomize" => {
                    if let Some(flag) = parse_flag(value) {
                        config.randomize = flag;
                    }
                }
                "katakana" => {
                    if let Some(flag) = parse_flag(value) {
                        config.script = if flag {
                            Script::Katakana
                        } else {
                            Script::Hiragana
                        };
                    }
                }
                "seed" => match value.map(str::parse::<u64>) {
                    Some(Ok(seed)) => config.seed = Some(seed),
                    _ => tracing::warn!("Ignoring malformed seed in query: {pair}"),
                },
                _ => tracing::debug!("Ignoring unknown query argument: {pair}"),
            }
        }

        config
    }

    /// Parse the query part of a full URL.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let without_fragment = url.split('#').next().unwrap_or(url);
        match without_fragment.split_once('?') {
            Some((_, query)) => Self::from_query(query),
            None => Self::default(),
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        None | Some("" | "true" | "1") => Some(true),
        Some("false" | "0") => Some(false),
        Some(other) => {
            tracing::warn!("Ignoring malformed flag value: {other}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_default() {
        assert_eq!(LaunchConfig::from_query(""), LaunchConfig::default());
        assert_eq!(LaunchConfig::from_query("?"), LaunchConfig::default());
    }

    #[test]
    fn bare_flags() {
        let config = LaunchConfig::from_query("?randomize&katakana");
        assert!(config.randomize);
        assert_eq!(config.script, Script::Katakana);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn valued_flags_and_seed() {
        let config = LaunchConfig::from_query("randomize=0&katakana=true&seed=42");
        assert!(!config.randomize);
        assert_eq!(config.script, Script::Katakana);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn unknown_and_malformed_entries_are_skipped() {
        let config = LaunchConfig::from_query("foo&randomize=maybe&seed=x&katakana");
        assert!(!config.randomize);
        assert_eq!(config.script, Script::Katakana);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn parses_from_full_url() {
        let config = LaunchConfig::from_url("https://example.org/drill/?randomize#top");
        assert!(config.randomize);
        assert_eq!(config.script, Script::Hiragana);
        assert_eq!(
            LaunchConfig::from_url("https://example.org/"),
            LaunchConfig::default()
        );
    }
}
