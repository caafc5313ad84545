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

//! Deposits and withdrawals as signed deltas.
//!
//! Every change to a balance is recorded as one delta: positive for a
//! [`Deposit`](Transaction::Deposit), negative for a [`Withdrawal`](Transaction::Withdrawal).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "amount", rename_all = "lowercase")]
pub enum Transaction {
    Deposit(Decimal),
    Withdrawal(Decimal),
}

impl Transaction {
    /// Classifies a delta read back from history. Zero counts as a deposit.
    pub fn from_delta(delta: Decimal) -> Self {
        if delta.is_sign_negative() && !delta.is_zero() {
            Self::Withdrawal(-delta)
        } else {
            Self::Deposit(delta)
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Deposit(amount) | Self::Withdrawal(amount) => *amount,
        }
    }

    /// The signed change this transaction applies to a balance.
    pub fn delta(&self) -> Decimal {
        match self {
            Self::Deposit(amount) => *amount,
            Self::Withdrawal(amount) => -*amount,
        }
    }
}

/// Sign followed by the amount as stored, e.g. `+25` or `-10.5`.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit(amount) => write!(f, "+{amount}"),
            Self::Withdrawal(amount) => write!(f, "-{amount}"),
        }
    }
}
