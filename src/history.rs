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

//! Bounded transaction history.
//!
//! Keeps the last [`HISTORY_CAPACITY`] signed deltas applied to an account, newest first.
//! A zero slot counts as unused: it is skipped by [`TransactionHistory::entries`] and is
//! never written to the account file.

use rust_decimal::Decimal;

/// Number of transactions remembered per account.
pub const HISTORY_CAPACITY: usize = 10;

/// Fixed-size ring of transaction deltas, index 0 being the most recent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHistory {
    slots: [Decimal; HISTORY_CAPACITY],
}

impl TransactionHistory {
    pub fn new() -> Self {
        Self {
            slots: [Decimal::ZERO; HISTORY_CAPACITY],
        }
    }

    /// Builds a history from deltas ordered newest first.
    ///
    /// Anything past the capacity is dropped; missing slots stay zero.
    pub fn from_newest_first<I>(deltas: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut history = Self::new();
        for (slot, delta) in history.slots.iter_mut().zip(deltas) {
            *slot = delta;
        }
        history
    }

    /// Records `delta` as the newest entry, evicting the oldest slot.
    ///
    /// A zero delta still takes a slot.
    pub fn push(&mut self, delta: Decimal) {
        self.slots.rotate_right(1);
        self.slots[0] = delta;
    }

    /// Non-zero deltas, newest first.
    pub fn entries(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.slots.iter().copied().filter(|delta| !delta.is_zero())
    }

    pub fn to_vec(&self) -> Vec<Decimal> {
        self.entries().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Sum of the remembered deltas.
    pub fn total(&self) -> Decimal {
        self.slots.iter().sum()
    }
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self::new()
    }
}
