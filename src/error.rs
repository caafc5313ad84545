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

//! Error types for account files, accounts, transactions and the store.

use crate::base::AccountId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Account file parsing errors.
///
/// Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The file has no first line
    #[error("account file is empty")]
    Empty,

    /// The first line has fewer than `balance,owner,name`
    #[error("line {line}: expected 3 fields, found {found}")]
    MissingFields { line: u64, found: usize },

    /// A balance or transaction value is not a decimal number
    #[error("line {line}: invalid amount `{value}`")]
    InvalidAmount { line: u64, value: String },

    /// The underlying reader failed (e.g. invalid UTF-8)
    #[error("unreadable account data: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv(err.to_string())
    }
}

/// Errors raised by a single account record.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("account file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt account file `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The record was closed and may not be written again
    #[error("account {0} is closed")]
    Closed(AccountId),
}

/// Deposit and withdrawal rejections.
///
/// These are ordinary outcomes; the active account is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// No account is selected
    #[error("no active account")]
    NoActiveAccount,

    /// Amount is below zero
    #[error("invalid amount (must not be negative)")]
    NegativeAmount,

    /// Withdrawal would exceed the balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The resulting balance does not fit in a decimal
    #[error("amount out of range")]
    AmountOutOfRange,
}

/// Account store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The account directory cannot be created or read. Fatal for the session.
    #[error("account directory `{}` is unusable: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The id does not belong to a loaded account
    #[error("account {0} not found")]
    UnknownAccount(AccountId),

    /// Every id up to `u32::MAX` is taken
    #[error("no account ids left")]
    IdsExhausted,

    #[error(transparent)]
    Account(#[from] AccountError),
}
