//! CSV format handling for account snapshots and ledger commands
//!
//! This module centralizes all CSV format concerns, providing:
//! - `AccountRecord` / `CommandRecord` structures for deserialization
//! - Conversion from CSV records to domain types
//! - Snapshot output serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Formats
//!
//! Account snapshot, used for both input and output:
//!
//! ```text
//! id,owner,kind,balance
//! 1,Ben123,Checking,110
//! ```
//!
//! Commands:
//!
//! ```text
//! type,source,dest,amount
//! transfer,1,2,50
//! payment,Ben123,Amy456,250
//! interest,,,
//! open,Cat789,Savings,100
//! close,3,,
//! ```

use crate::core::Ledger;
use crate::types::{AccountId, AccountKind, AccountSpec, LedgerCommand, LedgerError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Header written at the top of every snapshot
pub const SNAPSHOT_HEADER: [&str; 4] = ["id", "owner", "kind", "balance"];

/// Account snapshot row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub owner: String,
    pub kind: String,
    pub balance: String,
}

/// Command row
///
/// `source`, `dest` and `amount` are optional because their meaning depends
/// on the command type; `interest` uses none of them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CommandRecord {
    #[serde(rename = "type")]
    pub command: String,
    pub source: Option<String>,
    pub dest: Option<String>,
    pub amount: Option<String>,
}

/// Convert an AccountRecord into an id and the spec of the account to open
///
/// # Errors
///
/// Returns an error if the kind is unknown or the balance is not a decimal.
/// Negative balances are left for the ledger to reject.
pub fn convert_account_record(
    record: AccountRecord,
) -> Result<(AccountId, AccountSpec), LedgerError> {
    let kind = AccountKind::from_str(&record.kind)?;
    let balance = parse_amount(&record.balance)?;

    Ok((record.id, AccountSpec::new(record.owner.trim(), kind, balance)))
}

/// Convert a CommandRecord to a LedgerCommand
///
/// This function:
/// - Parses the command type case-insensitively
/// - Checks that every field the command needs is present and non-empty
/// - Parses ids, account kinds and amounts
///
/// Amounts are not range-checked here: a negative amount is a valid row that
/// the ledger will reject.
pub fn convert_command_record(record: CommandRecord) -> Result<LedgerCommand, LedgerError> {
    let command = record.command.trim().to_lowercase();

    match command.as_str() {
        "transfer" => Ok(LedgerCommand::Transfer {
            source: parse_account_id(required(&record.source, "transfer", "source")?)?,
            dest: parse_account_id(required(&record.dest, "transfer", "dest")?)?,
            amount: parse_amount(required(&record.amount, "transfer", "amount")?)?,
        }),
        "payment" => Ok(LedgerCommand::Payment {
            source: required(&record.source, "payment", "source")?.to_string(),
            dest: required(&record.dest, "payment", "dest")?.to_string(),
            amount: parse_amount(required(&record.amount, "payment", "amount")?)?,
        }),
        "interest" => Ok(LedgerCommand::Interest),
        "open" => {
            let owner = required(&record.source, "open", "source")?;
            let kind = AccountKind::from_str(required(&record.dest, "open", "dest")?)?;
            let balance = parse_amount(required(&record.amount, "open", "amount")?)?;
            Ok(LedgerCommand::Open(AccountSpec::new(owner, kind, balance)))
        }
        "close" => Ok(LedgerCommand::Close {
            id: parse_account_id(required(&record.source, "close", "source")?)?,
        }),
        _ => Err(LedgerError::invalid_command_type(&record.command)),
    }
}

/// Write every account in the ledger as a snapshot CSV
///
/// Rows are written in ascending id order with balances at four decimal
/// places.
pub fn write_accounts_csv(ledger: &Ledger, output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(SNAPSHOT_HEADER)?;

    for (id, account) in ledger.accounts() {
        writer.write_record(&[
            id.to_string(),
            account.owner().to_string(),
            account.kind().to_string(),
            format!("{:.4}", account.balance()),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Fetch a required field, treating blank values as missing
fn required<'a>(
    value: &'a Option<String>,
    command: &str,
    field: &str,
) -> Result<&'a str, LedgerError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LedgerError::missing_field(command, field)),
    }
}

fn parse_amount(value: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str(value.trim()).map_err(|_| LedgerError::invalid_amount(value))
}

fn parse_account_id(value: &str) -> Result<AccountId, LedgerError> {
    value
        .trim()
        .parse()
        .map_err(|_| LedgerError::invalid_account_id(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn command(
        command: &str,
        source: Option<&str>,
        dest: Option<&str>,
        amount: Option<&str>,
    ) -> CommandRecord {
        CommandRecord {
            command: command.to_string(),
            source: source.map(str::to_string),
            dest: dest.map(str::to_string),
            amount: amount.map(str::to_string),
        }
    }

    #[rstest]
    #[case("transfer")]
    #[case("TRANSFER")] // case insensitive
    #[case(" Transfer ")]
    fn test_convert_transfer(#[case] name: &str) {
        let result = convert_command_record(command(name, Some("1"), Some("2"), Some("50.5")));
        assert_eq!(
            result.unwrap(),
            LedgerCommand::Transfer {
                source: 1,
                dest: 2,
                amount: Decimal::new(505, 1)
            }
        );
    }

    #[test]
    fn test_convert_payment() {
        let result =
            convert_command_record(command("payment", Some("Ben123"), Some("Amy456"), Some("250")));
        assert_eq!(
            result.unwrap(),
            LedgerCommand::Payment {
                source: "Ben123".to_string(),
                dest: "Amy456".to_string(),
                amount: Decimal::from(250)
            }
        );
    }

    #[test]
    fn test_convert_interest_ignores_fields() {
        let result = convert_command_record(command("interest", None, None, Some("")));
        assert_eq!(result.unwrap(), LedgerCommand::Interest);
    }

    #[test]
    fn test_convert_open() {
        let result =
            convert_command_record(command("open", Some("Cat789"), Some("savings"), Some("100")));
        assert_eq!(
            result.unwrap(),
            LedgerCommand::Open(AccountSpec::new(
                "Cat789",
                AccountKind::Savings,
                Decimal::from(100)
            ))
        );
    }

    #[test]
    fn test_convert_close() {
        let result = convert_command_record(command("close", Some("3"), None, None));
        assert_eq!(result.unwrap(), LedgerCommand::Close { id: 3 });
    }

    #[test]
    fn test_negative_amount_is_left_to_the_ledger() {
        let result = convert_command_record(command("transfer", Some("1"), Some("2"), Some("-5")));
        assert!(matches!(
            result,
            Ok(LedgerCommand::Transfer { amount, .. }) if amount == Decimal::from(-5)
        ));
    }

    #[rstest]
    #[case::invalid_type(command("refund", Some("1"), Some("2"), Some("5")), "Invalid command type")]
    #[case::missing_amount(command("transfer", Some("1"), Some("2"), None), "missing the amount")]
    #[case::blank_amount(command("payment", Some("a"), Some("b"), Some("  ")), "missing the amount")]
    #[case::missing_dest(command("payment", Some("a"), None, Some("5")), "missing the dest")]
    #[case::bad_amount(command("transfer", Some("1"), Some("2"), Some("abc")), "Invalid amount")]
    #[case::bad_id(command("transfer", Some("one"), Some("2"), Some("5")), "Invalid account id")]
    #[case::negative_id(command("close", Some("-1"), None, None), "Invalid account id")]
    #[case::bad_kind(command("open", Some("Cat789"), Some("Gold"), Some("5")), "Invalid account kind")]
    fn test_convert_command_errors(#[case] record: CommandRecord, #[case] expected_error: &str) {
        let result = convert_command_record(record);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains(expected_error));
    }

    #[test]
    fn test_convert_account_record() {
        let record = AccountRecord {
            id: 4,
            owner: "Amy456".to_string(),
            kind: "Savings".to_string(),
            balance: "1000".to_string(),
        };

        let (id, spec) = convert_account_record(record).unwrap();
        assert_eq!(id, 4);
        assert_eq!(
            spec,
            AccountSpec::new("Amy456", AccountKind::Savings, Decimal::from(1000))
        );
    }

    #[test]
    fn test_convert_account_record_bad_balance() {
        let record = AccountRecord {
            id: 1,
            owner: "Ben123".to_string(),
            kind: "Checking".to_string(),
            balance: "lots".to_string(),
        };

        assert_eq!(
            convert_account_record(record),
            Err(LedgerError::invalid_amount("lots"))
        );
    }

    #[rstest]
    #[case::empty_ledger(vec![], "id,owner,kind,balance\n")]
    #[case::sorted_by_id(
        vec![
            (3, AccountSpec::new("Ben123", AccountKind::Checking, Decimal::from(200))),
            (1, AccountSpec::new("Ben123", AccountKind::Checking, Decimal::from(110))),
        ],
        "id,owner,kind,balance\n1,Ben123,Checking,110.0000\n3,Ben123,Checking,200.0000\n"
    )]
    #[case::four_decimal_precision(
        vec![(2, AccountSpec::new("Ben123", AccountKind::Savings, Decimal::new(1155, 1)))],
        "id,owner,kind,balance\n2,Ben123,Savings,115.5000\n"
    )]
    fn test_write_accounts_csv(
        #[case] accounts: Vec<(AccountId, AccountSpec)>,
        #[case] expected_output: &str,
    ) {
        let ledger = Ledger::new(accounts).unwrap();
        let mut output = Vec::new();

        write_accounts_csv(&ledger, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }
}
