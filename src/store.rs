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

//! Account store.
//!
//! The [`AccountStore`] owns every account found in one directory and tracks which of them
//! is *active*, i.e. the target of [`deposit`](AccountStore::deposit) and
//! [`withdraw`](AccountStore::withdraw).
//!
//! # Active account
//!
//! ```text
//!  Unset ──set_active / create_account──► Active(a)
//!  Active(a) ──set_active / create_account──► Active(b)     (a is flushed first)
//!  Active(a) ──delete_account(a)──► Unset
//! ```
//!
//! With the default [`FlushPolicy::OnSwitch`] a record is only written when the store switches
//! away from it or is closed. Deposits and withdrawals made in between live in memory only.
//!
//! # Ids and files
//!
//! New accounts get the next id from a counter owned by the store and are stored as
//! `a<id>.txt`. Ids are never reused, not even after deletion.

use crate::account::{Account, AccountView, TMP_SUFFIX};
use crate::base::AccountId;
use crate::config::{FlushPolicy, StoreOptions};
use crate::error::{StoreError, TransactionError};
use crate::transaction::Transaction;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory-backed collection of accounts with one optional active account.
///
/// # Invariants
///
/// - Every loaded account maps to exactly one file in the directory.
/// - The active id, when set, always refers to a loaded account.
/// - `last_id` is at least the highest id ever loaded or assigned.
#[derive(Debug)]
pub struct AccountStore {
    directory: PathBuf,
    /// Accounts indexed by id; iteration order is id order.
    accounts: BTreeMap<AccountId, Account>,
    active: Option<AccountId>,
    last_id: u32,
    options: StoreOptions,
}

impl AccountStore {
    /// Opens `directory` with default options.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with(directory, StoreOptions::default())
    }

    /// Creates the directory if needed, then loads every account file in it.
    ///
    /// Files that fail to parse are skipped with a warning and left on disk.
    ///
    /// # Errors
    ///
    /// [`StoreError::Directory`] if the directory cannot be created or listed.
    pub fn open_with(
        directory: impl Into<PathBuf>,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let directory = directory.into();
        if !directory.is_dir() {
            fs::create_dir_all(&directory).map_err(|source| StoreError::Directory {
                path: directory.clone(),
                source,
            })?;
            info!("created account directory {}", directory.display());
        }

        let mut store = AccountStore {
            directory,
            accounts: BTreeMap::new(),
            active: None,
            last_id: 0,
            options,
        };
        store.load_all()?;
        Ok(store)
    }

    fn load_all(&mut self) -> Result<(), StoreError> {
        let paths = account_files(&self.directory).map_err(|source| StoreError::Directory {
            path: self.directory.clone(),
            source,
        })?;

        // Conventional names keep their id; the rest are numbered above the highest one.
        let (mut ordered, others): (Vec<_>, Vec<_>) = paths
            .into_iter()
            .map(|path| (id_from_path(&path), path))
            .partition(|(id, _)| id.is_some());
        self.last_id = ordered
            .iter()
            .filter_map(|(id, _)| id.map(|id| id.0))
            .max()
            .unwrap_or(0);
        for (_, path) in others {
            match self.bump_id() {
                Ok(id) => ordered.push((Some(id), path)),
                Err(e) => warn!("skipping account file {}: {}", path.display(), e),
            }
        }

        for (id, path) in ordered {
            let Some(id) = id else { continue };
            match Account::load(id, &path) {
                Ok(account) => {
                    debug!("loaded account {} from {}", id, path.display());
                    self.accounts.insert(id, account);
                }
                Err(e) => warn!("skipping account file {}: {}", path.display(), e),
            }
        }

        info!(
            "loaded {} account(s) from {}",
            self.accounts.len(),
            self.directory.display()
        );
        Ok(())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterates over all loaded accounts in id order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Snapshots of all loaded accounts.
    pub fn list_accounts(&self) -> Vec<AccountView> {
        self.accounts.values().map(Account::view).collect()
    }

    /// First account whose name matches `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Account> {
        let name = name.to_lowercase();
        self.accounts
            .values()
            .find(|account| account.account_name().to_lowercase() == name)
    }

    pub fn find_by_id(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// All accounts whose owner matches `owner`, ignoring case.
    pub fn search_by_owner(&self, owner: &str) -> Vec<&Account> {
        let owner = owner.to_lowercase();
        self.accounts
            .values()
            .filter(|account| account.owner_name().to_lowercase() == owner)
            .collect()
    }

    pub fn active(&self) -> Option<&Account> {
        self.active.and_then(|id| self.accounts.get(&id))
    }

    pub fn active_id(&self) -> Option<AccountId> {
        self.active
    }

    /// Creates a new account file, loads it and makes it the active account.
    ///
    /// The previously active account is flushed as part of the switch.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Account`] - the backing file cannot be created. The id is consumed
    ///   regardless.
    /// - [`StoreError::IdsExhausted`] - no unused id is left.
    pub fn create_account(
        &mut self,
        owner_name: &str,
        account_name: &str,
        opening_balance: Decimal,
    ) -> Result<AccountView, StoreError> {
        let id = self.next_id()?;
        let path = self.directory.join(id.file_name());
        let account = Account::create(id, owner_name, account_name, path, Some(opening_balance))?;
        info!("created account {} `{}` for {}", id, account_name, owner_name);

        let view = account.view();
        self.accounts.insert(id, account);
        self.set_active(id)?;
        if self.options.flush_policy == FlushPolicy::EveryMutation {
            self.flush_active();
        }
        Ok(view)
    }

    /// Next unused id. Skips ids whose file already exists on disk.
    fn next_id(&mut self) -> Result<AccountId, StoreError> {
        loop {
            let id = self.bump_id()?;
            if !self.directory.join(id.file_name()).exists() {
                return Ok(id);
            }
            debug!("id {} taken by an unloaded file, skipping", id);
        }
    }

    fn bump_id(&mut self) -> Result<AccountId, StoreError> {
        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;
        Ok(AccountId(self.last_id))
    }

    /// Makes `id` the active account, flushing the current one first.
    ///
    /// Re-selecting the active account flushes it too.
    pub fn set_active(&mut self, id: AccountId) -> Result<(), StoreError> {
        if !self.accounts.contains_key(&id) {
            return Err(StoreError::UnknownAccount(id));
        }
        self.flush_active();
        self.active = Some(id);
        debug!("active account is now {}", id);
        Ok(())
    }

    /// Closes the account, removes its file and forgets it.
    ///
    /// A file that cannot be removed is reported as a warning; the account is dropped from
    /// the store either way. Deleting the active account leaves no account active.
    pub fn delete_account(&mut self, id: AccountId) -> Result<(), StoreError> {
        let mut account = self
            .accounts
            .remove(&id)
            .ok_or(StoreError::UnknownAccount(id))?;
        account.close();

        match fs::remove_file(account.path()) {
            Ok(()) => info!("deleted account {} ({})", id, account.path().display()),
            Err(e) => warn!(
                "account {} removed, but its file {} could not be deleted: {}",
                id,
                account.path().display(),
                e
            ),
        }

        if self.active == Some(id) {
            self.active = None;
        }
        Ok(())
    }

    /// Renames the owner and/or the account. Persisted with the next flush.
    pub fn rename(
        &mut self,
        id: AccountId,
        owner_name: Option<&str>,
        account_name: Option<&str>,
    ) -> Result<(), StoreError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::UnknownAccount(id))?;
        if let Some(owner_name) = owner_name {
            account.set_owner_name(owner_name);
        }
        if let Some(account_name) = account_name {
            account.set_account_name(account_name);
        }
        Ok(())
    }

    /// Deposits `amount` into the active account and returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::NoActiveAccount`] - nothing is selected.
    /// - [`TransactionError::NegativeAmount`] - `amount` is below zero.
    /// - [`TransactionError::AmountOutOfRange`] - the new balance would overflow.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, TransactionError> {
        let account = self.active_mut()?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TransactionError::NegativeAmount);
        }
        let balance = account.apply_transaction(Transaction::Deposit(amount).delta())?;
        self.after_mutation();
        Ok(balance)
    }

    /// Withdraws `amount` from the active account and returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::NoActiveAccount`] - nothing is selected.
    /// - [`TransactionError::NegativeAmount`] - `amount` is below zero.
    /// - [`TransactionError::InsufficientFunds`] - `amount` exceeds the balance.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, TransactionError> {
        let account = self.active_mut()?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TransactionError::NegativeAmount);
        }
        if amount > account.balance() {
            return Err(TransactionError::InsufficientFunds);
        }
        let balance = account.apply_transaction(Transaction::Withdrawal(amount).delta())?;
        self.after_mutation();
        Ok(balance)
    }

    /// Flushes the active account and releases every record.
    pub fn close(mut self) {
        self.flush_active();
        for account in self.accounts.values_mut() {
            account.close();
        }
        info!("closed account store {}", self.directory.display());
    }

    fn active_mut(&mut self) -> Result<&mut Account, TransactionError> {
        self.active
            .and_then(|id| self.accounts.get_mut(&id))
            .ok_or(TransactionError::NoActiveAccount)
    }

    fn after_mutation(&self) {
        if self.options.flush_policy == FlushPolicy::EveryMutation {
            self.flush_active();
        }
    }

    /// Writes the active account to disk. A failure is logged and the in-memory state kept.
    fn flush_active(&self) {
        if let Some(account) = self.active() {
            if let Err(e) = account.flush() {
                warn!("could not save account {}: {}", account.id(), e);
            }
        }
    }
}

/// Regular files directly inside `directory`, sorted by name, minus flush leftovers.
fn account_files(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            debug!("ignoring {}: not a file", path.display());
            continue;
        }
        if path.extension().is_some_and(|ext| ext == TMP_SUFFIX) {
            debug!("ignoring leftover {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

fn id_from_path(path: &Path) -> Option<AccountId> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(AccountId::from_file_name)
}
