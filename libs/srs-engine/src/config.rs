//! Scheduler configuration and per-deck overrides.

use serde::{Deserialize, Serialize};

use crate::algorithm::memory::{DEFAULT_WEIGHTS, MAX_STABILITY, WEIGHT_COUNT};
use crate::error::{Result, ScheduleError};

/// Global scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Target probability of recall at the due date.
    pub desired_retention: f64,
    pub minimum_interval: u32,
    /// Longest review interval in days, at most the stability ceiling.
    pub maximum_interval: u32,
    /// Learning ladder, in minutes.
    pub learning_steps: Vec<u32>,
    /// Relearning ladder, in minutes.
    pub relearning_steps: Vec<u32>,
    pub enable_fuzz: bool,
    /// Maximum relative fuzz applied to review intervals.
    pub fuzz_factor: f64,
    pub weights: [f64; WEIGHT_COUNT],
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            desired_retention: 0.9,
            minimum_interval: 1,
            maximum_interval: 365,
            learning_steps: vec![1, 10],
            relearning_steps: vec![10],
            enable_fuzz: true,
            fuzz_factor: 0.05,
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl SchedulerConfig {
    /// Reject values the scheduler cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.desired_retention > 0.0 && self.desired_retention < 1.0) {
            return Err(invalid(format!(
                "desired_retention must be in (0, 1), got {}",
                self.desired_retention
            )));
        }
        if self.minimum_interval == 0 {
            return Err(invalid("minimum_interval must be at least 1 day"));
        }
        if self.maximum_interval < self.minimum_interval {
            return Err(invalid(format!(
                "maximum_interval {} is below minimum_interval {}",
                self.maximum_interval, self.minimum_interval
            )));
        }
        if f64::from(self.maximum_interval) > MAX_STABILITY {
            return Err(invalid(format!(
                "maximum_interval must be at most {} days, got {}",
                MAX_STABILITY, self.maximum_interval
            )));
        }
        validate_steps("learning_steps", &self.learning_steps)?;
        validate_steps("relearning_steps", &self.relearning_steps)?;
        if !(0.0..0.5).contains(&self.fuzz_factor) {
            return Err(invalid(format!(
                "fuzz_factor must be in [0, 0.5), got {}",
                self.fuzz_factor
            )));
        }
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(invalid(format!("weight w{} is not finite", i)));
        }
        Ok(())
    }

    /// Merge global configuration with optional deck overrides.
    pub fn merge(&self, overrides: Option<&ConfigOverrides>) -> Self {
        match overrides {
            Some(o) => Self {
                desired_retention: o.desired_retention.unwrap_or(self.desired_retention),
                minimum_interval: o.minimum_interval.unwrap_or(self.minimum_interval),
                maximum_interval: o.maximum_interval.unwrap_or(self.maximum_interval),
                learning_steps: o
                    .learning_steps
                    .clone()
                    .unwrap_or_else(|| self.learning_steps.clone()),
                relearning_steps: o
                    .relearning_steps
                    .clone()
                    .unwrap_or_else(|| self.relearning_steps.clone()),
                enable_fuzz: o.enable_fuzz.unwrap_or(self.enable_fuzz),
                fuzz_factor: self.fuzz_factor,
                weights: self.weights,
            },
            None => self.clone(),
        }
    }
}

/// Per-deck overrides (all fields optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_retention: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_steps: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relearning_steps: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_fuzz: Option<bool>,
}

fn validate_steps(name: &str, steps: &[u32]) -> Result<()> {
    if steps.is_empty() {
        return Err(invalid(format!("{} is empty", name)));
    }
    if steps.contains(&0) {
        return Err(invalid(format!("{} contains a zero-minute step", name)));
    }
    if steps.windows(2).any(|w| w[1] < w[0]) {
        return Err(invalid(format!("{} must not decrease", name)));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ScheduleError {
    ScheduleError::InvalidConfig(message.into())
}
