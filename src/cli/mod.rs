mod session;
mod terminal;

pub use session::*;
pub use terminal::*;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::application::{LedgerConfig, StatementFormat};
use crate::domain::parse_cents;

/// EVC Plus - mobile money wallet simulator
#[derive(Parser, Debug)]
#[command(name = "evcplus")]
#[command(about = "A PIN-authenticated mobile money wallet simulator")]
#[command(version)]
pub struct Cli {
    /// JSON config file (overridden by the flags below)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Opening balance for the new account (e.g., "100" or "100.00")
    #[arg(long)]
    pub balance: Option<String>,

    /// Consecutive wrong PINs before the account locks
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Largest amount allowed in a single transfer
    #[arg(long)]
    pub transfer_limit: Option<String>,

    /// Currency shown next to amounts
    #[arg(long)]
    pub currency: Option<String>,

    /// Statement format for history: table, json, csv
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Build the effective config: file first, then flag overrides.
    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        let mut config = LedgerConfig::load(self.config.as_deref())?;

        if let Some(balance) = &self.balance {
            config.opening_balance = parse_cents(balance)
                .with_context(|| format!("Invalid balance '{}'. Use '100.00' or '100'", balance))?;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(limit) = &self.transfer_limit {
            config.transfer_limit = parse_cents(limit)
                .with_context(|| format!("Invalid transfer limit '{}'", limit))?;
        }
        if let Some(currency) = &self.currency {
            config.currency = currency.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn run(self) -> Result<SessionOutcome> {
        let config = self.ledger_config()?;
        let format: StatementFormat = self.format.parse()?;
        info!(?config, %format, "Starting session");

        // Hidden PIN entry needs a tty; piped input is read as plain lines
        let console = Console::new().with_plain_secrets(!std::io::stdin().is_terminal());
        let mut session = Session::new(console, config).with_format(format);
        let outcome = session.run()?;
        info!(?outcome, "Session finished");
        Ok(outcome)
    }
}
