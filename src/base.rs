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

//! Core identifier type for accounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account.
///
/// Assigned by the [`AccountStore`](crate::AccountStore) from a counter that only moves
/// forward, so an id is never handed out twice within one account directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl AccountId {
    /// Name of the backing file for this id, e.g. `a7.txt`.
    pub fn file_name(&self) -> String {
        format!("a{}.txt", self.0)
    }

    /// Recovers the id from a file name following the `a<id>.txt` convention.
    ///
    /// Only the exact output of [`file_name`](Self::file_name) is accepted, so `a01.txt`
    /// does not map to id 1.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let digits = name.strip_prefix('a')?.strip_suffix(".txt")?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse().ok().filter(|id| *id > 0).map(AccountId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::AccountId;

    #[test]
    fn file_name_follows_convention() {
        assert_eq!(AccountId(7).file_name(), "a7.txt");
    }

    #[test]
    fn from_file_name_accepts_convention() {
        assert_eq!(AccountId::from_file_name("a12.txt"), Some(AccountId(12)));
    }

    #[test]
    fn from_file_name_accepts_largest_id() {
        assert_eq!(
            AccountId::from_file_name(&AccountId(u32::MAX).file_name()),
            Some(AccountId(u32::MAX))
        );
    }

    #[test]
    fn from_file_name_rejects_other_names() {
        assert_eq!(AccountId::from_file_name("b12.txt"), None);
        assert_eq!(AccountId::from_file_name("a12.csv"), None);
        assert_eq!(AccountId::from_file_name("a.txt"), None);
        assert_eq!(AccountId::from_file_name("a+1.txt"), None);
        assert_eq!(AccountId::from_file_name("a0.txt"), None);
        assert_eq!(AccountId::from_file_name("a01.txt"), None);
        assert_eq!(AccountId::from_file_name("a99999999999.txt"), None);
    }
}
