// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Account records.
//!
//! An [`Account`] owns one ledger account: identity, balance, the last ten transaction
//! deltas and the path of its backing file. Balance and history only ever change together,
//! through [`Account::apply_transaction`].
//!
//! No file handle outlives a call: the backing file is read once when the record is built
//! and written only by [`Account::flush`].
//!
//! # Example
//!
//! ```
//! use account_ledger::{Account, AccountId};
//! use rust_decimal_macros::dec;
//!
//! let dir = std::env::temp_dir().join("account-ledger-doc");
//! std::fs::create_dir_all(&dir).unwrap();
//! let path = dir.join(AccountId(1).file_name());
//! # let _ = std::fs::remove_file(&path);
//!
//! let mut account = Account::create(AccountId(1), "Ann", "Savings", path, Some(dec!(50))).unwrap();
//! account.apply_transaction(dec!(25)).unwrap();
//! assert_eq!(account.formatted_balance(), "75.00");
//! ```

use crate::base::AccountId;
use crate::error::{AccountError, ParseError, TransactionError};
use crate::format::AccountFile;
use crate::history::TransactionHistory;
use crate::transaction::Transaction;
use log::{debug, info};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Extension of the scratch file a flush writes before renaming it into place.
pub const TMP_SUFFIX: &str = "tmp";

/// Ledger account backed by one file.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    owner_name: String,
    account_name: String,
    balance: Decimal,
    history: TransactionHistory,
    path: PathBuf,
    closed: bool,
}

impl Account {
    const DISPLAY_PRECISION: u32 = 2;

    /// Creates a record for `path`, creating the file if it does not exist yet.
    ///
    /// | File       | `opening_balance` | Balance        | History   |
    /// |------------|-------------------|----------------|-----------|
    /// | missing    | any               | opening or 0   | empty     |
    /// | present    | `None`            | from file      | from file |
    /// | present    | `Some(b)`         | `b`            | from file |
    ///
    /// The names given here win over the names stored in the file.
    ///
    /// # Errors
    ///
    /// - [`AccountError::Io`] - the file cannot be read or created.
    /// - [`AccountError::Parse`] - the existing file is corrupt.
    pub fn create(
        id: AccountId,
        owner_name: impl Into<String>,
        account_name: impl Into<String>,
        path: impl Into<PathBuf>,
        opening_balance: Option<Decimal>,
    ) -> Result<Self, AccountError> {
        let path = path.into();
        let (balance, history) = match fs::read_to_string(&path) {
            Ok(contents) => {
                let parsed = match opening_balance {
                    Some(balance) => {
                        AccountFile::parse_history(&contents).map(|history| (balance, history))
                    }
                    None => AccountFile::parse(&contents).map(|file| (file.balance, file.history)),
                };
                parsed.map_err(|source| AccountError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                OpenOptions::new().write(true).create_new(true).open(&path)?;
                info!("created account file {}", path.display());
                (
                    opening_balance.unwrap_or(Decimal::ZERO),
                    TransactionHistory::new(),
                )
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            id,
            owner_name: owner_name.into(),
            account_name: account_name.into(),
            balance,
            history,
            path,
            closed: false,
        })
    }

    /// Rebuilds a record from an existing backing file.
    ///
    /// The file is read in one go and closed before parsing.
    pub fn load(id: AccountId, path: impl Into<PathBuf>) -> Result<Self, AccountError> {
        let path = path.into();
        let contents = fs::read_to_string(&path)?;
        Self::parse(id, path.clone(), &contents).map_err(|source| AccountError::Parse {
            path,
            source,
        })
    }

    /// Rebuilds a record from file contents: balance and names from the first line,
    /// history from the rest.
    pub fn parse(id: AccountId, path: impl Into<PathBuf>, contents: &str) -> Result<Self, ParseError> {
        let file = AccountFile::parse(contents)?;
        Ok(Self {
            id,
            owner_name: file.owner_name,
            account_name: file.account_name,
            balance: file.balance,
            history: file.history,
            path: path.into(),
            closed: false,
        })
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Recent transactions, newest first.
    pub fn recent_transactions(&self) -> Vec<Transaction> {
        self.history.entries().map(Transaction::from_delta).collect()
    }

    /// Adds `delta` to the balance, records it in the history and returns the new balance.
    ///
    /// No sign check happens here; callers validate withdrawals first.
    ///
    /// # Errors
    ///
    /// [`TransactionError::AmountOutOfRange`] if the sum overflows. Nothing is changed then.
    pub fn apply_transaction(&mut self, delta: Decimal) -> Result<Decimal, TransactionError> {
        self.balance = self
            .balance
            .checked_add(delta)
            .ok_or(TransactionError::AmountOutOfRange)?;
        self.history.push(delta);
        Ok(self.balance)
    }

    /// Moves the balance to `new_balance` by recording the difference as a transaction.
    pub fn set_balance(&mut self, new_balance: Decimal) -> Result<Decimal, TransactionError> {
        let delta = new_balance
            .checked_sub(self.balance)
            .ok_or(TransactionError::AmountOutOfRange)?;
        self.apply_transaction(delta)
    }

    pub fn set_owner_name(&mut self, owner_name: impl Into<String>) {
        self.owner_name = owner_name.into();
    }

    pub fn set_account_name(&mut self, account_name: impl Into<String>) {
        self.account_name = account_name.into();
    }

    /// Balance with exactly two decimals, rounded half away from zero.
    pub fn formatted_balance(&self) -> String {
        format_amount(self.balance)
    }

    pub fn to_file(&self) -> AccountFile {
        AccountFile {
            balance: self.balance,
            owner_name: self.owner_name.clone(),
            account_name: self.account_name.clone(),
            history: self.history,
        }
    }

    /// Renders the persisted text form of this record.
    pub fn serialize(&self) -> Result<String, ParseError> {
        self.to_file().render()
    }

    /// Writes the record to its backing file.
    ///
    /// The contents go to a sibling scratch file that is renamed over the backing file, so
    /// a failed write leaves the previous contents in place.
    ///
    /// # Errors
    ///
    /// - [`AccountError::Closed`] - the record was closed.
    /// - [`AccountError::Io`] - writing or renaming failed.
    pub fn flush(&self) -> Result<(), AccountError> {
        if self.closed {
            return Err(AccountError::Closed(self.id));
        }
        let contents = self.serialize().map_err(|source| AccountError::Parse {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &contents)?;
        info!(
            "saved account {} ({}) to {}",
            self.id,
            self.formatted_balance(),
            self.path.display()
        );
        Ok(())
    }

    /// Marks the record as released. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.closed {
            debug!("closing account {}", self.id);
            self.closed = true;
        }
    }

    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            owner_name: self.owner_name.clone(),
            account_name: self.account_name.clone(),
            balance: self.balance,
            formatted_balance: self.formatted_balance(),
            recent_transactions: self.recent_transactions(),
        }
    }
}

/// Read-only snapshot of an account handed to the menu layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub owner_name: String,
    pub account_name: String,
    pub balance: Decimal,
    pub formatted_balance: String,
    pub recent_transactions: Vec<Transaction>,
}

impl fmt::Display for AccountView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account [id: {}, owner: {}, account name: {}, balance: {}]",
            self.id, self.owner_name, self.account_name, self.formatted_balance
        )
    }
}

/// Two-decimal rendering used for balances and amounts shown to users.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(
        Account::DISPLAY_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    );
    // Pads to two digits; already rounded, so nothing is lost.
    rounded.rescale(Account::DISPLAY_PRECISION);
    rounded.to_string()
}

fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    let tmp = path.with_extension(TMP_SUFFIX);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(data.as_bytes())?;
        file.sync_all()
    });
    match written.and_then(|()| fs::rename(&tmp, path)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn account_in(dir: &TempDir, opening: Decimal) -> Account {
        let path = dir.path().join(AccountId(1).file_name());
        Account::create(AccountId(1), "Ann", "Savings", path, Some(opening)).unwrap()
    }

    #[test]
    fn set_balance_records_the_difference() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, dec!(100));
        account.set_balance(dec!(60)).unwrap();
        assert_eq!(account.balance(), dec!(60));
        assert_eq!(account.history().to_vec(), vec![dec!(-40)]);
    }

    #[test]
    fn apply_transaction_does_not_check_sign() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, dec!(10));
        account.apply_transaction(dec!(-25)).unwrap();
        assert_eq!(account.balance(), dec!(-15));
        assert_eq!(account.formatted_balance(), "-15.00");
    }

    #[test]
    fn overflowing_transaction_leaves_account_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, Decimal::MAX);
        assert_eq!(
            account.apply_transaction(dec!(1)),
            Err(TransactionError::AmountOutOfRange)
        );
        assert_eq!(account.balance(), Decimal::MAX);
        assert!(account.history().is_empty());

        let other = TempDir::new().unwrap();
        let mut account = account_in(&other, Decimal::MIN);
        assert_eq!(
            account.set_balance(Decimal::MAX),
            Err(TransactionError::AmountOutOfRange)
        );
        assert_eq!(account.balance(), Decimal::MIN);
    }

    #[test]
    fn formatted_balance_rounds_half_away_from_zero() {
        assert_eq!(format_amount(dec!(1.005)), "1.01");
        assert_eq!(format_amount(dec!(-1.005)), "-1.01");
        assert_eq!(format_amount(dec!(2.5)), "2.50");
        assert_eq!(format_amount(dec!(7)), "7.00");
        assert_eq!(format_amount(dec!(0.004)), "0.00");
    }

    #[test]
    fn recent_transactions_are_classified() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, dec!(100));
        account.apply_transaction(dec!(20)).unwrap();
        account.apply_transaction(dec!(-5)).unwrap();
        assert_eq!(
            account.recent_transactions(),
            vec![Transaction::Withdrawal(dec!(5)), Transaction::Deposit(dec!(20))]
        );
    }

    #[test]
    fn flush_leaves_no_scratch_file() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, dec!(5));
        account.apply_transaction(dec!(1)).unwrap();
        account.flush().unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a1.txt")]);
        assert_eq!(
            fs::read_to_string(account.path()).unwrap(),
            "6,Ann,Savings\n1\n"
        );
    }

    #[test]
    fn close_is_idempotent_and_blocks_flush() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, dec!(5));
        account.close();
        account.close();
        assert!(account.is_closed());
        assert!(matches!(account.flush(), Err(AccountError::Closed(AccountId(1)))));
    }

    #[test]
    fn view_display_matches_listing_format() {
        let dir = TempDir::new().unwrap();
        let account = account_in(&dir, dec!(50));
        assert_eq!(
            account.view().to_string(),
            "Account [id: 1, owner: Ann, account name: Savings, balance: 50.00]"
        );
    }

    #[test]
    fn view_serializes_amounts_as_strings() {
        let dir = TempDir::new().unwrap();
        let mut account = account_in(&dir, dec!(50));
        account.apply_transaction(dec!(2.5)).unwrap();

        let json = serde_json::to_value(account.view()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["account_name"], "Savings");
        assert_eq!(json["balance"].as_str().unwrap(), "52.5");
        assert_eq!(json["formatted_balance"], "52.50");
        assert_eq!(json["recent_transactions"][0]["type"], "deposit");
    }
}
