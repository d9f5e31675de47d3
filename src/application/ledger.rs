use anyhow::Result;
use tracing::{debug, info, warn};

use crate::domain::{
    AccountHolder, Cents, Pin, Transaction, TransactionKind, TransactionLog, format_cents,
};

use super::{LedgerConfig, LedgerError};

/// Outcome of checking an entered PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Rejected { attempts_remaining: u32 },
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    /// Too many wrong PINs; terminal for the session
    Locked,
}

/// Result of a balance-changing operation
#[derive(Debug, Clone)]
pub struct TransactionResult {
    pub transaction: Transaction,
    pub balance: Cents,
}

/// A single account's balance, PIN, attempt counter and transaction history.
///
/// Every mutating operation either succeeds completely or leaves the ledger
/// untouched, except for the attempt counter which moves on every PIN check.
#[derive(Debug)]
pub struct Ledger {
    holder: AccountHolder,
    pin: Pin,
    balance: Cents,
    failed_attempts: u32,
    status: AccountStatus,
    log: TransactionLog,
    config: LedgerConfig,
}

impl Ledger {
    /// Register a new account with the configured opening balance.
    /// Fails if the config does not pass [`LedgerConfig::validate`].
    pub fn open(holder: AccountHolder, pin: Pin, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        info!(
            phone = %holder.phone_number,
            opening_balance = %format_cents(config.opening_balance),
            "Registered account"
        );
        Ok(Self {
            holder,
            pin,
            balance: config.opening_balance,
            failed_attempts: 0,
            status: AccountStatus::Active,
            log: TransactionLog::new(),
            config,
        })
    }

    // ========================
    // Account state
    // ========================

    pub fn holder(&self) -> &AccountHolder {
        &self.holder
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current balance, without authentication.
    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn is_locked(&self) -> bool {
        self.status == AccountStatus::Locked
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    // ========================
    // Authentication
    // ========================

    /// Check an entered PIN, updating the attempt counter.
    pub fn authenticate(&mut self, entered_pin: &str) -> AuthOutcome {
        if self.is_locked() {
            return AuthOutcome::Locked;
        }

        if self.pin.matches(entered_pin) {
            self.failed_attempts = 0;
            return AuthOutcome::Authenticated;
        }

        self.failed_attempts += 1;
        if self.failed_attempts >= self.config.max_attempts {
            self.failed_attempts = self.config.max_attempts;
            self.status = AccountStatus::Locked;
            warn!(phone = %self.holder.phone_number, "Account locked after repeated wrong PINs");
            return AuthOutcome::Locked;
        }

        let attempts_remaining = self.config.max_attempts - self.failed_attempts;
        warn!(attempts_remaining, "Wrong PIN entered");
        AuthOutcome::Rejected { attempts_remaining }
    }

    fn require_auth(&mut self, entered_pin: &str) -> Result<(), LedgerError> {
        match self.authenticate(entered_pin) {
            AuthOutcome::Authenticated => Ok(()),
            AuthOutcome::Rejected { attempts_remaining } => {
                Err(LedgerError::AuthRejected { attempts_remaining })
            }
            AuthOutcome::Locked => Err(LedgerError::AuthLocked),
        }
    }

    fn ensure_active(&self) -> Result<(), LedgerError> {
        if self.is_locked() {
            return Err(LedgerError::AuthLocked);
        }
        Ok(())
    }

    /// Return the balance after verifying the PIN.
    pub fn checked_balance(&mut self, entered_pin: &str) -> Result<Cents, LedgerError> {
        self.require_auth(entered_pin)?;
        Ok(self.balance)
    }

    // ========================
    // Money movement
    // ========================

    /// Send money to another number.
    ///
    /// Checks run in order: amount, per-transfer limit, balance, PIN. The PIN
    /// is only consulted once every other precondition holds.
    pub fn transfer(
        &mut self,
        amount_cents: Cents,
        counterparty: &str,
        entered_pin: &str,
    ) -> Result<TransactionResult, LedgerError> {
        let counterparty = self.check_transfer(amount_cents, counterparty)?;
        self.require_auth(entered_pin)?;

        Ok(self.debit(TransactionKind::Transfer, amount_cents, counterparty))
    }

    /// Run every transfer precondition that does not need the PIN.
    /// Returns the normalized counterparty. A locked account is only
    /// reported once these pass, by the PIN check itself.
    pub fn check_transfer(
        &self,
        amount_cents: Cents,
        counterparty: &str,
    ) -> Result<String, LedgerError> {
        validate_amount(amount_cents)?;
        let counterparty = validate_recipient(counterparty)?;

        if amount_cents > self.config.transfer_limit {
            return Err(LedgerError::OverLimit {
                limit: self.config.transfer_limit,
                requested: amount_cents,
            });
        }
        self.ensure_funds(amount_cents)?;
        Ok(counterparty)
    }

    /// Buy airtime for `number`, or for the holder's own number when `None`.
    /// No per-transfer limit applies.
    pub fn top_up_airtime(
        &mut self,
        amount_cents: Cents,
        number: Option<&str>,
        entered_pin: &str,
    ) -> Result<TransactionResult, LedgerError> {
        let counterparty = self.check_airtime(amount_cents, number)?;
        self.require_auth(entered_pin)?;

        Ok(self.debit(TransactionKind::Airtime, amount_cents, counterparty))
    }

    /// Airtime counterpart of [`Ledger::check_transfer`].
    pub fn check_airtime(
        &self,
        amount_cents: Cents,
        number: Option<&str>,
    ) -> Result<String, LedgerError> {
        validate_amount(amount_cents)?;
        let counterparty = match number {
            Some(number) => validate_recipient(number)?,
            None => self.holder.phone_number.clone(),
        };
        self.ensure_funds(amount_cents)?;
        Ok(counterparty)
    }

    /// Add money to the account. No PIN is required, so lockout does not
    /// apply.
    pub fn recharge(&mut self, amount_cents: Cents) -> Result<TransactionResult, LedgerError> {
        validate_amount(amount_cents)?;
        let new_balance = self
            .balance
            .checked_add(amount_cents)
            .ok_or_else(|| LedgerError::InvalidAmount("balance would overflow".to_string()))?;

        let transaction = Transaction::new(
            TransactionKind::Recharge,
            amount_cents,
            self.config.recharge_source.clone(),
        );
        self.balance = new_balance;
        self.log.append(transaction.clone());
        debug!(amount = %format_cents(amount_cents), balance = %format_cents(self.balance), "Recharged");

        Ok(TransactionResult {
            transaction,
            balance: self.balance,
        })
    }

    fn ensure_funds(&self, amount_cents: Cents) -> Result<(), LedgerError> {
        if amount_cents > self.balance {
            return Err(LedgerError::InsufficientFunds {
                balance: self.balance,
                required: amount_cents,
            });
        }
        Ok(())
    }

    /// Deduct and record in one step. Callers have already checked funds.
    fn debit(
        &mut self,
        kind: TransactionKind,
        amount_cents: Cents,
        counterparty: String,
    ) -> TransactionResult {
        let transaction = Transaction::new(kind, amount_cents, counterparty);
        self.balance -= amount_cents;
        self.log.append(transaction.clone());
        debug!(
            %kind,
            amount = %format_cents(amount_cents),
            to = %transaction.counterparty,
            balance = %format_cents(self.balance),
            "Debited account"
        );

        TransactionResult {
            transaction,
            balance: self.balance,
        }
    }

    // ========================
    // History
    // ========================

    /// Up to `n` most recent transactions, in the order they were recorded.
    pub fn history(&self, n: usize) -> &[Transaction] {
        self.log.recent(n)
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.log.last()
    }

    pub fn last_transfer(&self) -> Option<&Transaction> {
        self.log.last_of_kind(TransactionKind::Transfer)
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.log.entries()
    }

    // ========================
    // PIN management
    // ========================

    /// Replace the PIN without re-authentication. Refused once locked.
    pub fn set_pin(&mut self, new_pin: &str) -> Result<(), LedgerError> {
        let new_pin = Pin::parse(new_pin)?;
        self.ensure_active()?;
        self.pin = new_pin;
        info!("PIN changed");
        Ok(())
    }

    /// Replace the PIN after verifying the current one. A wrong current PIN
    /// counts toward the lockout.
    pub fn change_pin(&mut self, current_pin: &str, new_pin: &str) -> Result<(), LedgerError> {
        // Validate the new PIN first so a typo does not burn an attempt
        let new_pin = Pin::parse(new_pin)?;
        self.require_auth(current_pin)?;
        self.pin = new_pin;
        info!("PIN changed");
        Ok(())
    }
}

fn validate_amount(amount_cents: Cents) -> Result<(), LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_recipient(number: &str) -> Result<String, LedgerError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(LedgerError::InvalidRecipient);
    }
    Ok(number.to_string())
}
