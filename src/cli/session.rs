use anyhow::{Context, Result};
use tracing::debug;

use crate::application::{
    Ledger, LedgerConfig, LedgerError, StatementFormat, TransactionResult, describe_transaction,
    render_statement,
};
use crate::domain::{
    AccountHolder, Cents, InvalidPin, Pin, format_cents, is_valid_pin, parse_cents,
};

use super::terminal::Terminal;

const MAIN_MENU: &str = "\
*********************************
*        EVC Plus Services      *
*********************************
* 1. Check balance              *
* 2. Airtime                    *
* 3. Transfer money             *
* 4. Recharge                   *
* 5. Transaction history        *
* 6. Settings                   *
* 7. Exit                       *
*********************************";

const AIRTIME_MENU: &str = "\
************ Airtime ************
* 1. Top up my number           *
* 2. Top up another number      *
* 3. Back                       *
*********************************";

const HISTORY_MENU: &str = "\
****** Transaction history ******
* 1. Last transaction           *
* 2. Last transfer              *
* 3. Last three                 *
* 4. Full statement             *
* 5. Back                       *
*********************************";

const SETTINGS_MENU: &str = "\
*********** Settings ************
* 1. Change PIN                 *
* 2. Back                       *
*********************************";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The holder chose to exit
    Exited,
    /// Too many wrong PINs
    Locked,
    /// Input ran out before the holder exited
    InputClosed,
}

/// Whether the menu loop keeps going after an action.
enum Flow {
    Continue,
    End(SessionOutcome),
}

/// Interactive session: registers an account, then serves menu actions
/// until the holder exits or the account locks.
pub struct Session<T: Terminal> {
    terminal: T,
    config: LedgerConfig,
    format: StatementFormat,
    ledger: Option<Ledger>,
}

impl<T: Terminal> Session<T> {
    pub fn new(terminal: T, config: LedgerConfig) -> Self {
        Self {
            terminal,
            config,
            format: StatementFormat::default(),
            ledger: None,
        }
    }

    /// Start from an already registered account, skipping registration.
    pub fn with_ledger(terminal: T, ledger: Ledger) -> Self {
        Self {
            terminal,
            config: ledger.config().clone(),
            format: StatementFormat::default(),
            ledger: Some(ledger),
        }
    }

    pub fn with_format(mut self, format: StatementFormat) -> Self {
        self.format = format;
        self
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    /// Run the session to completion.
    pub fn run(&mut self) -> Result<SessionOutcome> {
        if self.ledger.is_none() {
            match self.register()? {
                Some(ledger) => self.ledger = Some(ledger),
                None => return Ok(SessionOutcome::InputClosed),
            }
        }

        loop {
            self.say(MAIN_MENU)?;
            let Some(choice) = self.terminal.read_line("Choose an option: ")? else {
                return Ok(SessionOutcome::InputClosed);
            };

            let flow = match choice.as_str() {
                "1" => self.check_balance()?,
                "2" => self.airtime()?,
                "3" => self.transfer()?,
                "4" => self.recharge()?,
                "5" => self.history()?,
                "6" => self.settings()?,
                "7" => {
                    self.say("Goodbye. Thank you for using EVC Plus.")?;
                    Flow::End(SessionOutcome::Exited)
                }
                _ => {
                    self.say("Please choose a valid option.")?;
                    Flow::Continue
                }
            };

            if let Flow::End(outcome) = flow {
                debug!(?outcome, "Session ended");
                return Ok(outcome);
            }
        }
    }

    fn register(&mut self) -> Result<Option<Ledger>> {
        self.say("EVC Plus registration")?;
        let Some(name) = self.terminal.read_line("Your name: ")? else {
            return Ok(None);
        };

        let phone = loop {
            let Some(phone) = self.terminal.read_line("Your phone number: ")? else {
                return Ok(None);
            };
            if !phone.trim().is_empty() {
                break phone;
            }
            self.say("A phone number is required.")?;
        };

        let Some(pin) = self.prompt_new_pin("Choose a 4-digit PIN: ")? else {
            return Ok(None);
        };
        let pin = Pin::parse(&pin)?;

        let ledger = Ledger::open(AccountHolder::new(name, phone), pin, self.config.clone())?;
        self.say(&format!(
            "Registration successful, {}! Your balance is {}.",
            ledger.holder().display_name(),
            self.money(ledger.balance())
        ))?;
        Ok(Some(ledger))
    }

    /// Prompt until a well-formed PIN is entered. Returns the raw digits.
    fn prompt_new_pin(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            let Some(input) = self.terminal.read_secret(prompt)? else {
                return Ok(None);
            };
            if is_valid_pin(&input) {
                return Ok(Some(input));
            }
            self.say(&format!("{}. Please try again.", InvalidPin))?;
        }
    }

    // ========================
    // Menu actions
    // ========================

    fn check_balance(&mut self) -> Result<Flow> {
        let Some(pin) = self.terminal.read_secret("Enter your PIN: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let result = self.account_mut()?.checked_balance(&pin);
        self.report(result, |session, balance| {
            format!("[-EVCPlus-] Your balance is {}.", session.money(balance))
        })
    }

    fn airtime(&mut self) -> Result<Flow> {
        self.say(AIRTIME_MENU)?;
        let Some(choice) = self.terminal.read_line("Choose an option: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };

        let number = match choice.as_str() {
            "1" => None,
            "2" => match self.terminal.read_line("Number to top up: ")? {
                Some(number) => Some(number),
                None => return Ok(Flow::End(SessionOutcome::InputClosed)),
            },
            _ => return Ok(Flow::Continue),
        };

        let Some(amount) = self.prompt_amount("Airtime amount: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let amount = match amount {
            Ok(amount) => amount,
            Err(err) => return self.report_error(err),
        };

        let check = self.account()?.check_airtime(amount, number.as_deref());
        if let Err(err) = check {
            return self.report_error(err);
        }

        let Some(pin) = self.terminal.read_secret("Enter your PIN: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let result = self
            .account_mut()?
            .top_up_airtime(amount, number.as_deref(), &pin);
        self.report(result, |session, TransactionResult { transaction, balance }| {
            format!(
                "[-EVCPlus-] You topped up {} of airtime for {}. Your balance is {}.",
                session.money(transaction.amount_cents),
                transaction.counterparty,
                session.money(balance)
            )
        })
    }

    fn transfer(&mut self) -> Result<Flow> {
        let Some(recipient) = self.terminal.read_line("Recipient number: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let Some(amount) = self.prompt_amount("Amount to send: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let amount = match amount {
            Ok(amount) => amount,
            Err(err) => return self.report_error(err),
        };

        // Limit and balance are checked before the PIN is requested
        let check = self.account()?.check_transfer(amount, &recipient);
        if let Err(err) = check {
            return self.report_error(err);
        }

        let Some(pin) = self.terminal.read_secret("Enter your PIN: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let result = self.account_mut()?.transfer(amount, &recipient, &pin);
        self.report(result, |session, TransactionResult { transaction, balance }| {
            format!(
                "[-EVCPlus-] You sent {} to {}, {}. Your balance is {}.",
                session.money(transaction.amount_cents),
                transaction.counterparty,
                transaction.timestamp.format("%Y-%m-%d %H:%M:%S"),
                session.money(balance)
            )
        })
    }

    fn recharge(&mut self) -> Result<Flow> {
        let Some(amount) = self.prompt_amount("Amount to recharge: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let result = match amount {
            Ok(amount) => self.account_mut()?.recharge(amount),
            Err(err) => Err(err),
        };
        self.report(result, |session, TransactionResult { transaction, balance }| {
            format!(
                "[-EVCPlus-] You recharged {}. Your balance is {}.",
                session.money(transaction.amount_cents),
                session.money(balance)
            )
        })
    }

    fn history(&mut self) -> Result<Flow> {
        self.say(HISTORY_MENU)?;
        let Some(choice) = self.terminal.read_line("Choose an option: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };

        let ledger = self.account()?;
        let currency = &self.config.currency;
        let message = match choice.as_str() {
            "1" => ledger
                .last_transaction()
                .map(|tx| describe_transaction(tx, currency)),
            "2" => ledger
                .last_transfer()
                .map(|tx| describe_transaction(tx, currency)),
            "3" => non_empty(ledger.history(3))
                .map(|txs| render_statement(txs, self.format, currency))
                .transpose()?,
            "4" => non_empty(ledger.transactions())
                .map(|txs| render_statement(txs, self.format, currency))
                .transpose()?,
            _ => return Ok(Flow::Continue),
        };

        let message = message.unwrap_or_else(|| "No transactions.".to_string());
        self.say(&message)?;
        Ok(Flow::Continue)
    }

    fn settings(&mut self) -> Result<Flow> {
        self.say(SETTINGS_MENU)?;
        let Some(choice) = self.terminal.read_line("Choose an option: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        if choice != "1" {
            return Ok(Flow::Continue);
        }

        let Some(current) = self.terminal.read_secret("Current PIN: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };
        let Some(new_pin) = self.prompt_new_pin("New 4-digit PIN: ")? else {
            return Ok(Flow::End(SessionOutcome::InputClosed));
        };

        let result = self.account_mut()?.change_pin(&current, &new_pin);
        self.report(result, |_, ()| "Your PIN has been changed.".to_string())
    }

    // ========================
    // Helpers
    // ========================

    fn prompt_amount(&mut self, prompt: &str) -> Result<Option<Result<Cents, LedgerError>>> {
        Ok(self
            .terminal
            .read_line(prompt)?
            .map(|input| parse_cents(&input).map_err(LedgerError::from)))
    }

    fn report<V>(
        &mut self,
        result: Result<V, LedgerError>,
        render: impl FnOnce(&Self, V) -> String,
    ) -> Result<Flow> {
        match result {
            Ok(value) => {
                let message = render(self, value);
                self.say(&message)?;
                Ok(Flow::Continue)
            }
            Err(err) => self.report_error(err),
        }
    }

    fn report_error(&mut self, err: LedgerError) -> Result<Flow> {
        self.say(&err.to_string())?;
        if err.is_fatal() {
            self.say("Too many incorrect PIN attempts. The session will now end.")?;
            return Ok(Flow::End(SessionOutcome::Locked));
        }
        Ok(Flow::Continue)
    }

    fn money(&self, cents: Cents) -> String {
        format!("{} {}", format_cents(cents), self.config.currency)
    }

    fn say(&mut self, message: &str) -> Result<()> {
        self.terminal
            .say(message)
            .context("Failed to write to terminal")
    }

    fn account(&self) -> Result<&Ledger> {
        self.ledger.as_ref().context("No account is registered")
    }

    fn account_mut(&mut self) -> Result<&mut Ledger> {
        self.ledger.as_mut().context("No account is registered")
    }
}

fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    if items.is_empty() { None } else { Some(items) }
}
