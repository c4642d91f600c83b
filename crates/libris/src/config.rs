//! Runtime configuration.
//!
//! Loaded either from the environment (with `.env` support via `dotenvy`) or from a TOML
//! file. Every key except the database URL has a default.
//!
//! | env | toml | default |
//! |---|---|---|
//! | `DATABASE_URL` | `database_url` | required |
//! | `LIBRIS_POOL_MAX_SIZE` | `pool_max_size` | 16 |
//! | `LIBRIS_PAGE_LIMIT` | `default_page_limit` | 10 |
//! | `LIBRIS_LOAN_DAYS` | `loan_period_days` | 30 |
//! | `LIBRIS_LATE_FEE` | `late_fee_per_day` | 5 |

use crate::error::{LibError, LibResult};
use crate::model::LoanPolicy;
use crate::page::{DEFAULT_PAGE_LIMIT, PageRequest};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryConfig {
    pub database_url: String,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: usize,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u64,
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: i64,
    #[serde(default = "default_late_fee")]
    pub late_fee_per_day: i64,
}

fn default_pool_max_size() -> usize {
    16
}

fn default_page_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

fn default_loan_period_days() -> i64 {
    LoanPolicy::DEFAULT_LOAN_DAYS
}

fn default_late_fee() -> i64 {
    LoanPolicy::DEFAULT_LATE_FEE
}

impl LibraryConfig {
    /// Read from the process environment, loading `.env` first if present.
    pub fn from_env() -> LibResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read from an arbitrary key lookup (the environment, a map in tests, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LibResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| LibError::config("DATABASE_URL is not set"))?;

        let config = Self {
            database_url,
            pool_max_size: parse_var(&lookup, "LIBRIS_POOL_MAX_SIZE", default_pool_max_size())?,
            default_page_limit: parse_var(&lookup, "LIBRIS_PAGE_LIMIT", default_page_limit())?,
            loan_period_days: parse_var(&lookup, "LIBRIS_LOAN_DAYS", default_loan_period_days())?,
            late_fee_per_day: parse_var(&lookup, "LIBRIS_LATE_FEE", default_late_fee())?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> LibResult<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| LibError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> LibResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LibError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> LibResult<()> {
        if self.pool_max_size == 0 {
            return Err(LibError::config("pool_max_size must be positive"));
        }
        if self.default_page_limit == 0 {
            return Err(LibError::config("default_page_limit must be positive"));
        }
        if !(1..=LoanPolicy::MAX_LOAN_DAYS).contains(&self.loan_period_days) {
            return Err(LibError::config(format!(
                "loan_period_days must be between 1 and {}",
                LoanPolicy::MAX_LOAN_DAYS
            )));
        }
        if self.late_fee_per_day < 0 {
            return Err(LibError::config("late_fee_per_day cannot be negative"));
        }
        Ok(())
    }

    pub fn loan_policy(&self) -> LibResult<LoanPolicy> {
        LoanPolicy::new(self.loan_period_days, self.late_fee_per_day)
            .map_err(|e| LibError::config(e.to_string()))
    }

    /// A request for the page at `offset` with the configured default limit.
    pub fn page_request(&self, offset: u64) -> PageRequest {
        PageRequest::new(offset, self.default_page_limit)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> LibResult<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| LibError::config(format!("{key}={raw:?} is invalid: {e}"))),
    }
}
