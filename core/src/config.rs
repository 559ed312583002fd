//! Configuration for the alignment engine.
//!
//! Two independent knobs feed the engine: [`EqualityPolicy`] decides when two
//! lines count as equal, and [`AlignConfig`] centralizes algorithm thresholds
//! so limits are not hardcoded throughout the codebase.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do when a pane exceeds the alignment size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitBehavior {
    /// Produce a positional row-by-row table without content matching.
    FallbackToPositional,
    /// Refuse to align; the caller keeps its previous table.
    ReturnError,
}

/// The combination of active ignore-options defining line equality.
///
/// Every option is independently combinable; two lines are equal iff their
/// contents are byte-equal after applying every enabled normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualityPolicy {
    /// Compare case-insensitively.
    pub ignore_case: bool,
    /// Strip all whitespace before comparing.
    pub ignore_all_whitespace: bool,
    /// Collapse whitespace runs to a single space and trim the ends.
    pub ignore_whitespace_change: bool,
    /// Ignore the end-of-line form (a trailing carriage return).
    pub ignore_eol: bool,
    /// Treat blank lines as equal to each other (and to nothing at all).
    pub ignore_blank_lines: bool,
}

impl EqualityPolicy {
    /// Policy with every normalization disabled: exact byte equality.
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn any_whitespace_option(&self) -> bool {
        self.ignore_all_whitespace || self.ignore_whitespace_change
    }
}

/// Algorithm thresholds and behavioral knobs for alignment computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Per-pane line-count ceiling before `on_limit_exceeded` applies.
    pub max_align_lines: u32,
    /// Gap size (both sides) at or below which LCS runs directly, skipping
    /// the anchor pass.
    pub small_gap_threshold: u32,
    /// Maximum `m * n` cells the LCS dynamic program may allocate.
    pub lcs_dp_work_limit: usize,
    /// Recursion ceiling for anchor-partitioned gap alignment.
    pub max_recursion_depth: u32,
    pub on_limit_exceeded: LimitBehavior,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            max_align_lines: 500_000,
            small_gap_threshold: 4,
            lcs_dp_work_limit: 250_000,
            max_recursion_depth: 12,
            on_limit_exceeded: LimitBehavior::FallbackToPositional,
        }
    }
}

impl AlignConfig {
    pub fn fastest() -> Self {
        Self {
            small_gap_threshold: 64,
            lcs_dp_work_limit: 50_000,
            max_recursion_depth: 6,
            ..Default::default()
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    pub fn most_precise() -> Self {
        Self {
            small_gap_threshold: 1,
            lcs_dp_work_limit: 2_000_000,
            max_recursion_depth: 24,
            ..Default::default()
        }
    }

    pub fn builder() -> AlignConfigBuilder {
        AlignConfigBuilder {
            inner: AlignConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_zero(self.max_align_lines as u64, "max_align_lines")?;
        ensure_non_zero(self.small_gap_threshold as u64, "small_gap_threshold")?;
        ensure_non_zero(self.lcs_dp_work_limit as u64, "lcs_dp_work_limit")?;
        ensure_non_zero(self.max_recursion_depth as u64, "max_recursion_depth")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("[TXM_CFG_001] {field} must be greater than zero")]
    NonPositiveLimit { field: &'static str },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NonPositiveLimit { .. } => "TXM_CFG_001",
        }
    }
}

fn ensure_non_zero(value: u64, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositiveLimit { field });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct AlignConfigBuilder {
    inner: AlignConfig,
}

impl AlignConfigBuilder {
    pub fn new() -> Self {
        AlignConfig::builder()
    }

    pub fn max_align_lines(mut self, value: u32) -> Self {
        self.inner.max_align_lines = value;
        self
    }

    pub fn small_gap_threshold(mut self, value: u32) -> Self {
        self.inner.small_gap_threshold = value;
        self
    }

    pub fn lcs_dp_work_limit(mut self, value: usize) -> Self {
        self.inner.lcs_dp_work_limit = value;
        self
    }

    pub fn max_recursion_depth(mut self, value: u32) -> Self {
        self.inner.max_recursion_depth = value;
        self
    }

    pub fn on_limit_exceeded(mut self, value: LimitBehavior) -> Self {
        self.inner.on_limit_exceeded = value;
        self
    }

    pub fn build(self) -> Result<AlignConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
