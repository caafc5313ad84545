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

//! Account file format.
//!
//! One plain-text file per account:
//!
//! ```text
//! <balance>,<owner name>,<account name>
//! <newest delta>
//! <older delta>
//! ...
//! ```
//!
//! Amounts use a period as decimal separator. Names are written as-is: there is no quoting,
//! so a comma inside a name cannot be read back.

use crate::error::ParseError;
use crate::history::{HISTORY_CAPACITY, TransactionHistory};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Decoded contents of an account file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFile {
    pub balance: Decimal,
    pub owner_name: String,
    pub account_name: String,
    pub history: TransactionHistory,
}

impl AccountFile {
    /// Parses a whole account file.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Empty`] - no first line.
    /// - [`ParseError::MissingFields`] - first line has fewer than three fields.
    /// - [`ParseError::InvalidAmount`] - balance or a history line is not a number.
    pub fn parse(contents: &str) -> Result<Self, ParseError> {
        let mut records = reader(contents).into_records();

        let first = records.next().ok_or(ParseError::Empty)??;
        if first.len() < 3 {
            return Err(ParseError::MissingFields {
                line: line_of(&first),
                found: first.len(),
            });
        }
        let balance = parse_amount(&first[0], line_of(&first))?;
        let owner_name = first[1].to_string();
        let account_name = first[2].to_string();

        let history = parse_deltas(records)?;

        Ok(Self {
            balance,
            owner_name,
            account_name,
            history,
        })
    }

    /// Parses only the transaction lines, ignoring the first line entirely.
    ///
    /// Used when an account is opened over an existing file with an explicit balance.
    pub fn parse_history(contents: &str) -> Result<TransactionHistory, ParseError> {
        let mut records = reader(contents).into_records();
        match records.next() {
            Some(first) => {
                first?;
                parse_deltas(records)
            }
            None => Ok(TransactionHistory::new()),
        }
    }

    /// Renders the file contents. Zero history slots are omitted.
    pub fn render(&self) -> Result<String, ParseError> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let balance = self.balance.to_string();
        wtr.write_record([
            balance.as_str(),
            self.owner_name.as_str(),
            self.account_name.as_str(),
        ])?;
        for delta in self.history.entries() {
            wtr.write_record([delta.to_string()])?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| ParseError::Csv(e.error().to_string()))?;
        String::from_utf8(bytes).map_err(|e| ParseError::Csv(e.to_string()))
    }
}

fn reader(contents: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(contents.as_bytes())
}

fn parse_deltas<I>(records: I) -> Result<TransactionHistory, ParseError>
where
    I: Iterator<Item = csv::Result<StringRecord>>,
{
    let mut deltas = Vec::with_capacity(HISTORY_CAPACITY);
    // Lines past the capacity are not even validated.
    for record in records.take(HISTORY_CAPACITY) {
        let record = record?;
        let value = record.get(0).unwrap_or_default();
        deltas.push(parse_amount(value, line_of(&record))?);
    }
    Ok(TransactionHistory::from_newest_first(deltas))
}

/// Accepts plain decimals and the exponent form (`1.0E7`) older files may carry.
fn parse_amount(value: &str, line: u64) -> Result<Decimal, ParseError> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| ParseError::InvalidAmount {
            line,
            value: value.to_string(),
        })
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_header_and_history() {
        let file = AccountFile::parse("75.0,Ann,Savings\n25.0\n-10\n").unwrap();
        assert_eq!(file.balance, dec!(75));
        assert_eq!(file.owner_name, "Ann");
        assert_eq!(file.account_name, "Savings");
        assert_eq!(file.history.to_vec(), vec![dec!(25), dec!(-10)]);
    }

    #[test]
    fn header_only_has_empty_history() {
        let file = AccountFile::parse("0,Bob,Main\n").unwrap();
        assert!(file.history.is_empty());
    }

    #[test]
    fn parses_exponent_notation() {
        let file = AccountFile::parse("1.0E7,Ann,Big\n-2.5E-1\n").unwrap();
        assert_eq!(file.balance, dec!(10000000));
        assert_eq!(file.history.to_vec(), vec![dec!(-0.25)]);
    }

    #[test]
    fn extra_header_fields_are_ignored() {
        let file = AccountFile::parse("5,Ann,Main,extra\n").unwrap();
        assert_eq!(file.account_name, "Main");
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_eq!(AccountFile::parse(""), Err(ParseError::Empty));
    }

    #[test]
    fn short_header_is_rejected() {
        assert_eq!(
            AccountFile::parse("5,Ann\n"),
            Err(ParseError::MissingFields { line: 1, found: 2 })
        );
    }

    #[test]
    fn non_numeric_balance_is_rejected() {
        assert_eq!(
            AccountFile::parse("lots,Ann,Main\n"),
            Err(ParseError::InvalidAmount {
                line: 1,
                value: "lots".to_string()
            })
        );
    }

    #[test]
    fn non_numeric_history_line_is_rejected() {
        assert_eq!(
            AccountFile::parse("5,Ann,Main\n1\nabc\n"),
            Err(ParseError::InvalidAmount {
                line: 3,
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn history_beyond_capacity_is_ignored() {
        let mut contents = String::from("0,Ann,Main\n");
        for i in 1..=12 {
            contents.push_str(&format!("{i}\n"));
        }
        contents.push_str("garbage\n");

        let file = AccountFile::parse(&contents).unwrap();
        let expected: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        assert_eq!(file.history.to_vec(), expected);
    }

    #[test]
    fn render_omits_zero_slots() {
        let file = AccountFile {
            balance: dec!(75.00),
            owner_name: "Ann".to_string(),
            account_name: "Savings".to_string(),
            history: TransactionHistory::from_newest_first([
                dec!(25.00),
                Decimal::ZERO,
                dec!(-10),
            ]),
        };
        assert_eq!(file.render().unwrap(), "75.00,Ann,Savings\n25.00\n-10\n");
    }

    #[test]
    fn render_does_not_quote_names() {
        let file = AccountFile {
            balance: dec!(1),
            owner_name: "Ann \"The\" Owner".to_string(),
            account_name: "Main".to_string(),
            history: TransactionHistory::new(),
        };
        assert_eq!(file.render().unwrap(), "1,Ann \"The\" Owner,Main\n");
    }

    #[test]
    fn parse_history_skips_the_first_line() {
        let history = AccountFile::parse_history("not,a\n4\n-1\n").unwrap();
        assert_eq!(history.to_vec(), vec![dec!(4), dec!(-1)]);
        assert!(AccountFile::parse_history("").unwrap().is_empty());
    }
}
