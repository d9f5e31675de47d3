use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money sent to another number
    Transfer,
    /// Money added to the account from the service itself
    Recharge,
    /// Airtime bought for the holder's own number or another one
    Airtime,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Transfer => "transfer",
            TransactionKind::Recharge => "recharge",
            TransactionKind::Airtime => "airtime",
        }
    }

    /// Returns true if this kind takes money out of the account.
    pub fn is_debit(&self) -> bool {
        !matches!(self, TransactionKind::Recharge)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed movement of money. Transactions are immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    /// Recipient number, or the service identifier for recharges
    pub counterparty: String,
    /// When the transaction was recorded
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction stamped with the current time.
    pub(crate) fn new(kind: TransactionKind, amount_cents: Cents, counterparty: String) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            kind,
            amount_cents,
            counterparty,
            timestamp: Utc::now(),
        }
    }

    /// Amount with its sign as seen from the account: negative for debits.
    pub fn signed_amount(&self) -> Cents {
        if self.kind.is_debit() {
            -self.amount_cents
        } else {
            self.amount_cents
        }
    }
}

/// Append-only, insertion-ordered record of an account's transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in the order they were recorded.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    /// The single most recent entry.
    pub fn last(&self) -> Option<&Transaction> {
        self.entries.last()
    }

    /// The most recent entry of the given kind.
    pub fn last_of_kind(&self, kind: TransactionKind) -> Option<&Transaction> {
        self.entries.iter().rev().find(|t| t.kind == kind)
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> &[Transaction] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}
