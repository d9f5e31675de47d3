// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;

use evcplus::application::{Ledger, LedgerConfig};
use evcplus::cli::Terminal;
use evcplus::domain::{AccountHolder, Pin};

pub const PIN: &str = "1234";
pub const WRONG_PIN: &str = "9999";

/// Helper to open a ledger with a 100.00 balance and PIN 1234
pub fn test_ledger() -> Ledger {
    test_ledger_with(LedgerConfig::default())
}

pub fn test_ledger_with(config: LedgerConfig) -> Ledger {
    Ledger::open(
        AccountHolder::new("Ahmed", "252611000"),
        Pin::parse(PIN).unwrap(),
        config,
    )
    .unwrap()
}

/// Terminal that replays scripted input and records everything said.
#[derive(Default)]
pub struct ScriptedTerminal {
    input: VecDeque<String>,
    pub output: Vec<String>,
    pub prompts: Vec<String>,
}

impl ScriptedTerminal {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }

    pub fn said(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.input.pop_front())
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.read_line(prompt)
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        self.output.push(message.to_string());
        Ok(())
    }
}
