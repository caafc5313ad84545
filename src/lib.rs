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

//! # Account Ledger
//!
//! This library keeps a small set of named bank accounts, each persisted in its own
//! plain-text file: the balance and names on the first line, the ten most recent
//! transactions below it.
//!
//! ## Core Components
//!
//! - [`AccountStore`]: Loads a directory of account files and tracks the active account
//! - [`Account`]: One account's balance, bounded history and backing file
//! - [`AccountFile`]: The line-oriented file format
//! - [`TransactionError`]: Why a deposit or withdrawal was refused
//! - [`Menu`]: Interactive text menus over a store
//!
//! ## Example
//!
//! ```
//! use account_ledger::AccountStore;
//! use rust_decimal_macros::dec;
//!
//! let dir = std::env::temp_dir().join(format!("account-ledger-{}", std::process::id()));
//! # let _ = std::fs::remove_dir_all(&dir);
//! let mut store = AccountStore::open(&dir).unwrap();
//!
//! // New accounts become the active account
//! let savings = store.create_account("Ann", "Savings", dec!(50)).unwrap();
//! assert_eq!(store.deposit(dec!(25)).unwrap(), dec!(75));
//!
//! // Switching away writes the previous account to disk
//! let checking = store.create_account("Ann", "Checking", dec!(0)).unwrap();
//! let saved = std::fs::read_to_string(dir.join(savings.id.file_name())).unwrap();
//! assert_eq!(saved, "75,Ann,Savings\n25\n");
//!
//! store.delete_account(checking.id).unwrap();
//! store.close();
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```
//!
//! ## Durability
//!
//! By default an account is written only when the store switches away from it or is
//! closed. Use [`FlushPolicy::EveryMutation`] to write after every deposit and withdrawal.

pub mod account;
mod base;
mod config;
pub mod error;
mod format;
mod history;
pub mod menu;
mod store;
mod transaction;

pub use account::{Account, AccountView};
pub use base::AccountId;
pub use config::{FlushPolicy, StoreOptions};
pub use error::{AccountError, ParseError, StoreError, TransactionError};
pub use format::AccountFile;
pub use history::{HISTORY_CAPACITY, TransactionHistory};
pub use menu::Menu;
pub use store::AccountStore;
pub use transaction::Transaction;
