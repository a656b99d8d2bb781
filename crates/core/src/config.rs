//! Composition engine configuration loaded from environment variables.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Default persistence key of the homepage layout.
pub const DEFAULT_HOMEPAGE_KEY: &str = "homepage";

/// Default lifetime of the cached category restriction map.
pub const DEFAULT_RESTRICTION_CACHE_TTL_SECS: u64 = 3600;

/// Default cap on the number of items a single section may fetch dynamically.
pub const DEFAULT_MAX_FETCH_PER_SECTION: usize = 50;

/// Runtime knobs for the layout composition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Persistence key of the homepage layout (default: `homepage`).
    pub homepage_key: String,
    /// How long restriction mappings stay cached before a reload.
    pub restriction_cache_ttl: Duration,
    /// Upper bound on `perPage` for one dynamic fetch.
    pub max_fetch_per_section: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            homepage_key: DEFAULT_HOMEPAGE_KEY.to_string(),
            restriction_cache_ttl: Duration::from_secs(DEFAULT_RESTRICTION_CACHE_TTL_SECS),
            max_fetch_per_section: DEFAULT_MAX_FETCH_PER_SECTION,
        }
    }
}

impl ComposerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                                 | Default    |
    /// |-----------------------------------------|------------|
    /// | `FRONTPAGE_HOMEPAGE_KEY`                | `homepage` |
    /// | `FRONTPAGE_RESTRICTION_CACHE_TTL_SECS`  | `3600`     |
    /// | `FRONTPAGE_MAX_FETCH_PER_SECTION`       | `50`       |
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Split out of [`ComposerConfig::from_env`] so parsing can be tested
    /// without mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let homepage_key = lookup("FRONTPAGE_HOMEPAGE_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOMEPAGE_KEY.to_string());

        let ttl_secs: u64 = parse_or(
            &lookup,
            "FRONTPAGE_RESTRICTION_CACHE_TTL_SECS",
            DEFAULT_RESTRICTION_CACHE_TTL_SECS,
        )?;

        let max_fetch_per_section: usize = parse_or(
            &lookup,
            "FRONTPAGE_MAX_FETCH_PER_SECTION",
            DEFAULT_MAX_FETCH_PER_SECTION,
        )?;
        if max_fetch_per_section == 0 {
            return Err(CoreError::Validation(
                "FRONTPAGE_MAX_FETCH_PER_SECTION must be positive".to_string(),
            ));
        }

        Ok(Self {
            homepage_key,
            restriction_cache_ttl: Duration::from_secs(ttl_secs),
            max_fetch_per_section,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> CoreResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
        None => Ok(default),
    }
}
