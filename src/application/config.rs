use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::domain::Cents;

/// Runtime policy for a ledger. Every field has a default, so a config file
/// only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Consecutive wrong PINs before the account locks
    pub max_attempts: u32,
    /// Largest single transfer, in cents
    pub transfer_limit: Cents,
    /// Balance a freshly registered account starts with, in cents
    pub opening_balance: Cents,
    /// Currency symbol used when rendering amounts
    pub currency: String,
    /// Counterparty recorded on recharges
    pub recharge_source: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transfer_limit: 50000,
            opening_balance: 10000,
            currency: "USD".to_string(),
            recharge_source: "EVC".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.transfer_limit <= 0 {
            bail!("transfer_limit must be positive");
        }
        if self.opening_balance < 0 {
            bail!("opening_balance cannot be negative");
        }
        if self.recharge_source.trim().is_empty() {
            bail!("recharge_source cannot be empty");
        }
        Ok(())
    }
}
