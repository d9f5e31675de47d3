use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::Serialize;

use crate::domain::{Transaction, format_cents};

/// How a list of transactions is rendered for the holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl StatementFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementFormat::Table => "table",
            StatementFormat::Json => "json",
            StatementFormat::Csv => "csv",
        }
    }
}

impl FromStr for StatementFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(StatementFormat::Table),
            "json" => Ok(StatementFormat::Json),
            "csv" => Ok(StatementFormat::Csv),
            other => bail!("Unknown format '{}'. Valid formats: table, json, csv", other),
        }
    }
}

impl std::fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct StatementLine<'a> {
    id: String,
    kind: &'a str,
    amount: String,
    counterparty: &'a str,
    timestamp: String,
}

impl<'a> From<&'a Transaction> for StatementLine<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            kind: tx.kind.as_str(),
            amount: format_cents(tx.amount_cents),
            counterparty: &tx.counterparty,
            timestamp: tx.timestamp.to_rfc3339(),
        }
    }
}

/// Render transactions in recorded order.
pub fn render_statement(
    transactions: &[Transaction],
    format: StatementFormat,
    currency: &str,
) -> Result<String> {
    match format {
        StatementFormat::Table => Ok(render_table(transactions, currency)),
        StatementFormat::Json => {
            let lines: Vec<StatementLine> = transactions.iter().map(StatementLine::from).collect();
            Ok(serde_json::to_string_pretty(&lines)?)
        }
        StatementFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for tx in transactions {
                writer.serialize(StatementLine::from(tx))?;
            }
            let bytes = writer.into_inner().map_err(|e| e.into_error())?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

fn render_table(transactions: &[Transaction], currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<10} {:>12} {:<16}",
        "DATE", "KIND", "AMOUNT", "COUNTERPARTY"
    );
    let _ = writeln!(out, "{}", "-".repeat(61));
    for tx in transactions {
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:>12} {:<16}",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            tx.kind.as_str(),
            format!("{} {}", format_cents(tx.signed_amount()), currency),
            tx.counterparty
        );
    }
    out
}

/// One-line summary of a transaction, used for notices.
pub fn describe_transaction(tx: &Transaction, currency: &str) -> String {
    format!(
        "{}: {} {} -> {}, {}",
        tx.kind,
        format_cents(tx.amount_cents),
        currency,
        tx.counterparty,
        tx.timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}
