mod common;

use anyhow::Result;
use common::{PIN, WRONG_PIN, test_ledger, test_ledger_with};
use evcplus::application::{AccountStatus, AuthOutcome, LedgerConfig, LedgerError};
use evcplus::domain::{TransactionKind, parse_cents};

#[test]
fn test_valid_transfer_debits_and_records_once() -> Result<()> {
    let mut ledger = test_ledger();

    let result = ledger.transfer(3000, "252622000", PIN)?;

    assert_eq!(result.balance, 7000);
    assert_eq!(ledger.balance(), 7000);
    assert_eq!(ledger.transactions().len(), 1);

    let tx = &ledger.transactions()[0];
    assert_eq!(tx.kind, TransactionKind::Transfer);
    assert_eq!(tx.amount_cents, 3000);
    assert_eq!(tx.counterparty, "252622000");
    assert_eq!(tx, &result.transaction);

    Ok(())
}

#[test]
fn test_transfer_of_entire_balance() -> Result<()> {
    let mut ledger = test_ledger();
    ledger.transfer(10000, "252622000", PIN)?;
    assert_eq!(ledger.balance(), 0);
    Ok(())
}

#[test]
fn test_over_limit_regardless_of_pin() {
    let mut ledger = test_ledger();
    ledger.recharge(100000).unwrap();
    let before = ledger.transactions().len();

    for pin in [PIN, WRONG_PIN] {
        let err = ledger.transfer(50001, "252622000", pin).unwrap_err();
        assert_eq!(
            err,
            LedgerError::OverLimit {
                limit: 50000,
                requested: 50001
            }
        );
    }

    assert_eq!(ledger.balance(), 110000);
    assert_eq!(ledger.transactions().len(), before);
    assert_eq!(ledger.failed_attempts(), 0, "PIN must not be consulted");
}

#[test]
fn test_insufficient_funds_leaves_state_unchanged() {
    let mut ledger = test_ledger();

    let err = ledger.transfer(10001, "252622000", PIN).unwrap_err();

    assert_eq!(
        err,
        LedgerError::InsufficientFunds {
            balance: 10000,
            required: 10001
        }
    );
    assert_eq!(ledger.balance(), 10000);
    assert!(ledger.transactions().is_empty());
}

#[test]
fn test_non_positive_transfer_is_invalid_amount() {
    let mut ledger = test_ledger();
    for amount in [0, -500] {
        assert!(matches!(
            ledger.transfer(amount, "252622000", PIN),
            Err(LedgerError::InvalidAmount(_))
        ));
    }
    assert_eq!(ledger.balance(), 10000);
}

#[test]
fn test_wrong_pin_transfer_is_rejected_without_mutation() {
    let mut ledger = test_ledger();

    let err = ledger.transfer(3000, "252622000", WRONG_PIN).unwrap_err();

    assert_eq!(err, LedgerError::AuthRejected { attempts_remaining: 2 });
    assert_eq!(ledger.balance(), 10000);
    assert!(ledger.transactions().is_empty());
}

#[test]
fn test_lockout_after_max_attempts() {
    let mut ledger = test_ledger();

    assert_eq!(
        ledger.authenticate(WRONG_PIN),
        AuthOutcome::Rejected { attempts_remaining: 2 }
    );
    assert_eq!(
        ledger.authenticate(WRONG_PIN),
        AuthOutcome::Rejected { attempts_remaining: 1 }
    );
    assert_eq!(ledger.authenticate(WRONG_PIN), AuthOutcome::Locked);

    assert_eq!(ledger.status(), AccountStatus::Locked);
    assert_eq!(ledger.failed_attempts(), 3);

    // The correct PIN is not compared any more
    assert_eq!(ledger.authenticate(PIN), AuthOutcome::Locked);
    assert_eq!(ledger.failed_attempts(), 3);
}

#[test]
fn test_locked_account_reports_other_preconditions_first() -> Result<()> {
    let mut ledger = test_ledger();
    for _ in 0..3 {
        ledger.authenticate(WRONG_PIN);
    }

    // Lockout is reported by the PIN check, which runs last
    assert!(matches!(
        ledger.transfer(60000, "252622000", PIN),
        Err(LedgerError::OverLimit { .. })
    ));
    assert!(matches!(
        ledger.top_up_airtime(20000, None, PIN),
        Err(LedgerError::InsufficientFunds { .. })
    ));
    assert!(matches!(
        ledger.recharge(-500),
        Err(LedgerError::InvalidAmount(_))
    ));
    assert_eq!(ledger.set_pin("12").unwrap_err(), LedgerError::InvalidFormat);

    assert_eq!(
        ledger.transfer(100, "252622000", PIN).unwrap_err(),
        LedgerError::AuthLocked
    );
    assert_eq!(
        ledger.top_up_airtime(100, None, PIN).unwrap_err(),
        LedgerError::AuthLocked
    );
    assert_eq!(ledger.set_pin("4321").unwrap_err(), LedgerError::AuthLocked);
    assert_eq!(ledger.checked_balance(PIN).unwrap_err(), LedgerError::AuthLocked);
    assert_eq!(ledger.balance(), 10000);
    assert!(ledger.transactions().is_empty());

    // Recharge needs no PIN, so it still goes through
    let result = ledger.recharge(500)?;
    assert_eq!(result.balance, 10500);
    assert!(ledger.is_locked());
    Ok(())
}

#[test]
fn test_transfer_that_exhausts_attempts_reports_lock() {
    let config = LedgerConfig {
        max_attempts: 1,
        ..LedgerConfig::default()
    };
    let mut ledger = test_ledger_with(config);

    let err = ledger.transfer(100, "252622000", WRONG_PIN).unwrap_err();

    assert_eq!(err, LedgerError::AuthLocked);
    assert!(err.is_fatal());
    assert!(ledger.is_locked());
}

#[test]
fn test_success_resets_failed_attempts() {
    let mut ledger = test_ledger();

    ledger.authenticate(WRONG_PIN);
    ledger.authenticate(WRONG_PIN);
    assert_eq!(ledger.authenticate(PIN), AuthOutcome::Authenticated);
    ledger.authenticate(WRONG_PIN);
    ledger.authenticate(WRONG_PIN);

    assert_eq!(ledger.status(), AccountStatus::Active);
    assert_eq!(ledger.failed_attempts(), 2);
}

#[test]
fn test_recharge_rejects_invalid_amounts() -> Result<()> {
    let mut ledger = test_ledger();

    // "-5" parses but is not positive
    let negative = parse_cents("-5")?;
    assert!(matches!(
        ledger.recharge(negative),
        Err(LedgerError::InvalidAmount(_))
    ));

    // "abc" never reaches the ledger
    let parsed: Result<i64, LedgerError> = parse_cents("abc").map_err(LedgerError::from);
    assert!(matches!(parsed, Err(LedgerError::InvalidAmount(_))));

    assert_eq!(ledger.balance(), 10000);
    assert!(ledger.transactions().is_empty());
    Ok(())
}

#[test]
fn test_recharge_needs_no_pin() -> Result<()> {
    let mut ledger = test_ledger();
    ledger.authenticate(WRONG_PIN);

    let result = ledger.recharge(2550)?;

    assert_eq!(result.balance, 12550);
    assert_eq!(result.transaction.kind, TransactionKind::Recharge);
    assert_eq!(result.transaction.counterparty, "EVC");
    assert_eq!(ledger.failed_attempts(), 1, "recharge does not touch the counter");
    Ok(())
}

#[test]
fn test_recharge_then_transfer_scenario() -> Result<()> {
    let mut ledger = test_ledger();

    ledger.recharge(5000)?;
    assert_eq!(ledger.balance(), 15000);
    assert_eq!(ledger.transactions().len(), 1);

    ledger.transfer(3000, "252xxxx", PIN)?;
    assert_eq!(ledger.balance(), 12000);

    let last_three = ledger.history(3);
    assert_eq!(last_three.len(), 2);
    assert_eq!(last_three[0].kind, TransactionKind::Recharge);
    assert_eq!(last_three[0].amount_cents, 5000);
    assert_eq!(last_three[1].kind, TransactionKind::Transfer);
    assert_eq!(last_three[1].amount_cents, 3000);
    assert_eq!(last_three[1].counterparty, "252xxxx");
    assert!(last_three[0].timestamp <= last_three[1].timestamp);

    Ok(())
}

#[test]
fn test_over_limit_scenario_keeps_history_empty() {
    let mut ledger = test_ledger();

    let result = ledger.transfer(60000, "252622000", PIN);

    assert!(matches!(result, Err(LedgerError::OverLimit { .. })));
    assert_eq!(ledger.balance(), 10000);
    assert!(ledger.history(3).is_empty());
}

#[test]
fn test_history_queries() -> Result<()> {
    let mut ledger = test_ledger();
    assert!(ledger.last_transaction().is_none());
    assert!(ledger.last_transfer().is_none());

    ledger.transfer(1000, "252600001", PIN)?;
    ledger.transfer(1100, "252600002", PIN)?;
    ledger.top_up_airtime(200, None, PIN)?;
    ledger.recharge(500)?;

    assert_eq!(
        ledger.last_transaction().map(|t| t.kind),
        Some(TransactionKind::Recharge)
    );
    assert_eq!(
        ledger.last_transfer().map(|t| t.counterparty.as_str()),
        Some("252600002")
    );

    let amounts: Vec<i64> = ledger.history(3).iter().map(|t| t.amount_cents).collect();
    assert_eq!(amounts, vec![1100, 200, 500]);
    assert_eq!(ledger.transactions().len(), 4);

    Ok(())
}

#[test]
fn test_airtime_for_self_and_others() -> Result<()> {
    let mut ledger = test_ledger();

    let own = ledger.top_up_airtime(500, None, PIN)?;
    assert_eq!(own.transaction.kind, TransactionKind::Airtime);
    assert_eq!(own.transaction.counterparty, "252611000");

    let other = ledger.top_up_airtime(700, Some(" 252633000 "), PIN)?;
    assert_eq!(other.transaction.counterparty, "252633000");
    assert_eq!(ledger.balance(), 8800);

    Ok(())
}

#[test]
fn test_airtime_has_no_transfer_limit() -> Result<()> {
    let mut ledger = test_ledger();
    ledger.recharge(100000)?;

    ledger.top_up_airtime(60000, None, PIN)?;
    assert_eq!(ledger.balance(), 50000);

    assert!(matches!(
        ledger.top_up_airtime(60000, None, PIN),
        Err(LedgerError::InsufficientFunds { .. })
    ));
    Ok(())
}

#[test]
fn test_checked_balance_requires_pin() {
    let mut ledger = test_ledger();
    assert_eq!(ledger.checked_balance(PIN), Ok(10000));
    assert_eq!(
        ledger.checked_balance(WRONG_PIN),
        Err(LedgerError::AuthRejected { attempts_remaining: 2 })
    );
}

#[test]
fn test_set_pin() -> Result<()> {
    let mut ledger = test_ledger();

    assert_eq!(ledger.set_pin("12a4"), Err(LedgerError::InvalidFormat));
    assert_eq!(ledger.set_pin("12345"), Err(LedgerError::InvalidFormat));
    assert_eq!(ledger.authenticate(PIN), AuthOutcome::Authenticated);

    ledger.set_pin("4321")?;
    assert!(matches!(
        ledger.authenticate(PIN),
        AuthOutcome::Rejected { .. }
    ));
    assert_eq!(ledger.authenticate("4321"), AuthOutcome::Authenticated);
    Ok(())
}

#[test]
fn test_change_pin_counts_wrong_current_pin() -> Result<()> {
    let mut ledger = test_ledger();

    assert_eq!(
        ledger.change_pin(WRONG_PIN, "4321"),
        Err(LedgerError::AuthRejected { attempts_remaining: 2 })
    );
    assert_eq!(ledger.failed_attempts(), 1);

    ledger.change_pin(PIN, "4321")?;
    assert_eq!(ledger.failed_attempts(), 0);
    assert_eq!(ledger.authenticate("4321"), AuthOutcome::Authenticated);
    Ok(())
}

#[test]
fn test_custom_limits_from_config() {
    let config = LedgerConfig {
        transfer_limit: 2000,
        opening_balance: 0,
        ..LedgerConfig::default()
    };
    let mut ledger = test_ledger_with(config);

    assert_eq!(ledger.balance(), 0);
    assert!(matches!(
        ledger.transfer(2001, "252622000", PIN),
        Err(LedgerError::OverLimit { limit: 2000, .. })
    ));
    assert!(matches!(
        ledger.transfer(2000, "252622000", PIN),
        Err(LedgerError::InsufficientFunds { balance: 0, .. })
    ));
}
