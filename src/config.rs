// ⚙️ Model Configuration
// Limits and defaults consulted by every entity schema

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ISO 4217 code applied to payments that don't name one
    pub default_currency: String,

    /// Allowance for salaried employees built without one
    pub default_allowance: f64,

    /// Upper bound on hours logged by an hourly employee in one period
    pub max_hours_per_period: f64,

    /// Upper bound on an hourly rate
    pub max_hourly_rate: f64,

    /// Upper bound on a base salary and on an allowance
    pub max_salary: f64,

    /// Upper bound on a single payment amount
    pub max_payment_amount: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            default_currency: "USD".to_string(),
            default_allowance: 0.0,
            max_hours_per_period: 744.0, // 31 days × 24 hours
            max_hourly_rate: 10_000.0,
            max_salary: 10_000_000.0,
            max_payment_amount: 1_000_000.0,
        }
    }
}

impl ModelConfig {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ModelConfig =
            serde_json::from_str(json).context("Failed to parse model config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let currency = &self.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            bail!("default_currency must be a 3-letter ISO code, got '{}'", currency);
        }
        if !self.default_allowance.is_finite() || self.default_allowance < 0.0 {
            bail!("default_allowance must be 0 or greater, got {}", self.default_allowance);
        }
        if !self.max_hours_per_period.is_finite() || self.max_hours_per_period <= 0.0 {
            bail!(
                "max_hours_per_period must be greater than 0, got {}",
                self.max_hours_per_period
            );
        }
        let limits = [
            ("max_hourly_rate", self.max_hourly_rate),
            ("max_salary", self.max_salary),
            ("max_payment_amount", self.max_payment_amount),
        ];
        for (name, limit) in limits {
            if !limit.is_finite() || limit <= 0.0 {
                bail!("{} must be greater than 0, got {}", name, limit);
            }
        }
        if self.default_allowance > self.max_salary {
            bail!(
                "default_allowance must be at most max_salary ({}), got {}",
                self.max_salary,
                self.default_allowance
            );
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
