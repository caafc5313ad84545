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

//! Interactive menus.
//!
//! Thin text front-end over an [`AccountStore`]. It reads one answer per line from any
//! [`BufRead`] and writes prompts to any [`Write`], so it runs the same on a terminal and in
//! tests. End of input is treated like choosing "exit" at every prompt.

use crate::account::{AccountView, format_amount};
use crate::base::AccountId;
use crate::error::TransactionError;
use crate::store::AccountStore;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// Answer that leaves the current menu.
const QUIT: u8 = 5;

const MAIN_MENU: &str = "What do you want to do?\n\
    1) Do something with an existing account, 2) Create a new account, or 5) Exit bank";

const ACCOUNT_MENU: &str = "What do you want to do?\n\
    1) Make a transaction\n\
    2) Edit the account\n\
    3) Delete the account\n\
    4) Show detailed info\n\
    5) Exit to main menu";

const TRANSACTION_MENU: &str =
    "What kind of transaction? 1) Deposit, 2) Withdraw, 5) Go back to previous menu";

const SELECT_PROMPT: &str = "Which account do you want to work with? To choose:\n\
    Enter the account name of one of the existing accounts above,\n\
    Or enter 'search' to search for account or account info,\n\
    Or enter 5 to go back to the previous menu:";

const SEARCH_MENU: &str =
    "Search by 1) Owner name, 2) Account name, 3) Account id (or enter 5 to exit)";

const EDIT_MENU: &str = "Change 1) Owner name, 2) Account name, 5) Cancel";

const DELETE_PROMPT: &str =
    "Are you sure that you want to delete this account?\n1) Yes, delete it, 5) Cancel";

/// Parses a numeric answer. `None` means the text is not a number.
pub fn parse_number(input: &str) -> Option<Decimal> {
    let input = input.trim();
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .ok()
}

/// Parses a whole-number menu option such as `2` or `2.0`.
pub fn parse_option(input: &str) -> Option<u8> {
    parse_number(input).and_then(option_of)
}

fn option_of(value: Decimal) -> Option<u8> {
    if value.fract().is_zero() {
        value.to_u8()
    } else {
        None
    }
}

/// Menu session driving one store.
pub struct Menu<R, W> {
    store: AccountStore,
    input: R,
    output: W,
    bank_name: String,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(store: AccountStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
            bank_name: "the bank".to_string(),
        }
    }

    pub fn with_bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = bank_name.into();
        self
    }

    /// Runs the main menu until the user exits, then closes the store.
    pub fn run(mut self) -> io::Result<()> {
        writeln!(self.output, "Hello and welcome to {}", self.bank_name)?;
        let result = self.main_menu();
        self.store.close();
        result?;
        writeln!(self.output, "Goodbye!")
    }

    fn main_menu(&mut self) -> io::Result<()> {
        while let Some(choice) = self.ask_option(MAIN_MENU)? {
            match choice {
                1 => {
                    if self.select_account()? {
                        self.account_menu()?;
                    }
                }
                2 => self.create_account()?,
                QUIT => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn account_menu(&mut self) -> io::Result<()> {
        while let Some(choice) = self.ask_option(ACCOUNT_MENU)? {
            match choice {
                1 => self.transaction_menu()?,
                2 => self.edit()?,
                3 => {
                    if self.delete()? {
                        break;
                    }
                }
                4 => self.show_details()?,
                QUIT => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn transaction_menu(&mut self) -> io::Result<()> {
        while let Some(choice) = self.ask_option(TRANSACTION_MENU)? {
            match choice {
                1 => self.transact(Kind::Deposit)?,
                2 => self.transact(Kind::Withdraw)?,
                QUIT => break,
                _ => {}
            }
        }
        Ok(())
    }

    /// Asks for amounts until one is accepted or input ends.
    fn transact(&mut self, kind: Kind) -> io::Result<()> {
        while let Some(amount) = self.ask_number("Enter an amount:")? {
            let result = match kind {
                Kind::Deposit => self.store.deposit(amount),
                Kind::Withdraw => self.store.withdraw(amount),
            };
            match result {
                Ok(balance) => {
                    let label = match kind {
                        Kind::Deposit => "Deposit",
                        Kind::Withdraw => "Withdraw",
                    };
                    return writeln!(
                        self.output,
                        "{label} OK. Current balance is {}",
                        format_amount(balance)
                    );
                }
                Err(TransactionError::NegativeAmount) => {
                    writeln!(self.output, "You tried to use a negative value.")?
                }
                Err(TransactionError::InsufficientFunds) => {
                    writeln!(self.output, "Sorry, you don't have that kind of money.")?
                }
                Err(TransactionError::AmountOutOfRange) => {
                    writeln!(self.output, "That amount is too large.")?
                }
                Err(TransactionError::NoActiveAccount) => {
                    return writeln!(self.output, "No account is selected.");
                }
            }
        }
        Ok(())
    }

    /// Lets the user pick an account by name. Returns whether one became active.
    fn select_account(&mut self) -> io::Result<bool> {
        let accounts = self.store.list_accounts();
        writeln!(self.output, "The existing {} accounts are:", accounts.len())?;
        self.print_views(&accounts)?;

        while let Some(answer) = self.ask_text(SELECT_PROMPT)? {
            if let Some(id) = self.store.find_by_name(&answer).map(|a| a.id()) {
                return self.activate(id);
            }
            if parse_option(&answer) == Some(QUIT) {
                return Ok(false);
            }
            if answer.trim().eq_ignore_ascii_case("search") {
                self.search()?;
            } else {
                writeln!(self.output, "No account with that name was found.")?;
            }
        }
        Ok(false)
    }

    fn search(&mut self) -> io::Result<()> {
        while let Some(choice) = self.ask_option(SEARCH_MENU)? {
            let found: Vec<AccountView> = match choice {
                1 => match self.ask_text("Enter the owner name:")? {
                    Some(owner) => self
                        .store
                        .search_by_owner(&owner)
                        .into_iter()
                        .map(|a| a.view())
                        .collect(),
                    None => break,
                },
                2 => match self.ask_text("Enter the account name:")? {
                    Some(name) => self
                        .store
                        .find_by_name(&name)
                        .map(|a| a.view())
                        .into_iter()
                        .collect(),
                    None => break,
                },
                3 => match self.ask_number("Enter the account id:")? {
                    Some(id) => id
                        .to_u32()
                        .and_then(|id| self.store.find_by_id(AccountId(id)))
                        .map(|a| a.view())
                        .into_iter()
                        .collect(),
                    None => break,
                },
                QUIT => break,
                _ => continue,
            };
            if found.is_empty() {
                writeln!(self.output, "No matching accounts.")?;
            } else {
                self.print_views(&found)?;
            }
        }
        Ok(())
    }

    fn create_account(&mut self) -> io::Result<()> {
        let Some(owner) = self.ask_text("Enter the name of the account owner:")? else {
            return Ok(());
        };
        let Some(name) = self.ask_text("Enter a name for the account:")? else {
            return Ok(());
        };
        let Some(choice) = self.ask_option(
            "Do you want to 1) Enter the starting amount of money first, 2) Create (empty) account now:",
        )?
        else {
            return Ok(());
        };

        let opening = if choice == 1 {
            match self.ask_number("How much should this account have to start with?")? {
                Some(amount) => amount,
                None => return Ok(()),
            }
        } else {
            Decimal::ZERO
        };

        match self.store.create_account(owner.trim(), name.trim(), opening) {
            Ok(view) => {
                writeln!(self.output, "Current account is: {view}")?;
                self.account_menu()
            }
            Err(e) => writeln!(self.output, "Could not create the account: {e}"),
        }
    }

    fn edit(&mut self) -> io::Result<()> {
        let Some(id) = self.store.active_id() else {
            return writeln!(self.output, "No account is selected.");
        };
        let Some(choice) = self.ask_option(EDIT_MENU)? else {
            return Ok(());
        };
        let result = match choice {
            1 => match self.ask_text("Enter the new owner name:")? {
                Some(owner) => self.store.rename(id, Some(owner.trim()), None),
                None => return Ok(()),
            },
            2 => match self.ask_text("Enter the new account name:")? {
                Some(name) => self.store.rename(id, None, Some(name.trim())),
                None => return Ok(()),
            },
            _ => return Ok(()),
        };
        match result {
            Ok(()) => self.show_details(),
            Err(e) => writeln!(self.output, "Could not edit the account: {e}"),
        }
    }

    /// Returns whether the active account was deleted.
    fn delete(&mut self) -> io::Result<bool> {
        let Some(view) = self.store.active().map(|a| a.view()) else {
            writeln!(self.output, "No account is selected.")?;
            return Ok(false);
        };
        writeln!(self.output, "Currently selected account is: {view}")?;

        while let Some(choice) = self.ask_option(DELETE_PROMPT)? {
            match choice {
                1 => {
                    return match self.store.delete_account(view.id) {
                        Ok(()) => {
                            writeln!(self.output, "Account {} deleted.", view.id)?;
                            Ok(true)
                        }
                        Err(e) => {
                            writeln!(self.output, "Could not delete the account: {e}")?;
                            Ok(false)
                        }
                    };
                }
                QUIT => return Ok(false),
                _ => {}
            }
        }
        Ok(false)
    }

    fn show_details(&mut self) -> io::Result<()> {
        let Some(view) = self.store.active().map(|a| a.view()) else {
            return writeln!(self.output, "No account is selected.");
        };
        writeln!(self.output, "{view}")?;
        writeln!(self.output, "Your latest transactions were:")?;
        for transaction in &view.recent_transactions {
            writeln!(self.output, "{transaction}")?;
        }
        Ok(())
    }

    fn activate(&mut self, id: AccountId) -> io::Result<bool> {
        match self.store.set_active(id) {
            Ok(()) => {
                if let Some(account) = self.store.active() {
                    writeln!(self.output, "Current account is: {}", account.view())?;
                }
                Ok(true)
            }
            Err(e) => {
                writeln!(self.output, "Could not select the account: {e}")?;
                Ok(false)
            }
        }
    }

    fn print_views(&mut self, views: &[AccountView]) -> io::Result<()> {
        for view in views {
            writeln!(self.output, "{view}")?;
        }
        Ok(())
    }

    /// Next input line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn ask_text(&mut self, prompt: &str) -> io::Result<Option<String>> {
        writeln!(self.output, "{prompt}")?;
        self.read_line()
    }

    /// Re-asks until the answer is a number.
    fn ask_number(&mut self, prompt: &str) -> io::Result<Option<Decimal>> {
        loop {
            let Some(answer) = self.ask_text(prompt)? else {
                return Ok(None);
            };
            match parse_number(&answer) {
                Some(value) => return Ok(Some(value)),
                None => writeln!(self.output, "That's not a valid input!")?,
            }
        }
    }

    /// Like [`ask_number`](Self::ask_number), for menu options. Unknown numbers map to 0.
    fn ask_option(&mut self, prompt: &str) -> io::Result<Option<u8>> {
        Ok(self
            .ask_number(prompt)?
            .map(|value| option_of(value).unwrap_or(0)))
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Deposit,
    Withdraw,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_session(dir: &TempDir, script: &str) -> String {
        let store = AccountStore::open(dir.path()).unwrap();
        let mut output = Vec::new();
        Menu::new(store, Cursor::new(script.to_string()), &mut output)
            .with_bank_name("Test Bank")
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parse_option_accepts_whole_numbers_only() {
        assert_eq!(parse_option("2"), Some(2));
        assert_eq!(parse_option(" 5.0 "), Some(5));
        assert_eq!(parse_option("2.5"), None);
        assert_eq!(parse_option("-1"), None);
        assert_eq!(parse_option("savings"), None);
    }

    #[test]
    fn parse_number_is_locale_independent() {
        assert_eq!(parse_number("12.50"), Some(dec!(12.50)));
        assert_eq!(parse_number("12,50"), None);
    }

    #[test]
    fn create_deposit_and_exit_persists_account() {
        let dir = TempDir::new().unwrap();
        // create Ann/Savings with 50, deposit 25, back out, exit
        let script = "2\nAnn\nSavings\n1\n50\n1\n1\n25\n5\n5\n5\n";
        let output = run_session(&dir, script);

        assert!(output.starts_with("Hello and welcome to Test Bank"));
        assert!(output.contains("Deposit OK. Current balance is 75.00"));
        assert!(output.trim_end().ends_with("Goodbye!"));
        assert_eq!(
            fs::read_to_string(dir.path().join("a1.txt")).unwrap(),
            "75,Ann,Savings\n25\n"
        );
    }

    #[test]
    fn invalid_input_is_asked_again() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, "hello\n5\n");
        assert!(output.contains("That's not a valid input!"));
    }

    #[test]
    fn overdraft_is_refused_until_a_valid_amount() {
        let dir = TempDir::new().unwrap();
        let script = "2\nBob\nMain\n1\n10\n1\n2\n50\n4\n5\n5\n5\n";
        let output = run_session(&dir, script);

        assert!(output.contains("Sorry, you don't have that kind of money."));
        assert!(output.contains("Withdraw OK. Current balance is 6.00"));
    }

    #[test]
    fn select_search_and_details() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a1.txt"), "40,Ann,Savings\n-10\n50\n").unwrap();

        // search by owner, then pick by name (any case), show details
        let script = "1\nsearch\n1\nann\n5\nSAVINGS\n4\n5\n5\n";
        let output = run_session(&dir, script);

        assert!(output.contains("The existing 1 accounts are:"));
        assert!(output.contains("Account [id: 1, owner: Ann, account name: Savings, balance: 40.00]"));
        assert!(output.contains("Your latest transactions were:\n-10\n+50\n"));
    }

    #[test]
    fn unknown_name_is_reported() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, "1\nnothing\n5\n5\n");
        assert!(output.contains("No account with that name was found."));
    }

    #[test]
    fn delete_removes_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a1.txt"), "40,Ann,Savings\n").unwrap();

        let output = run_session(&dir, "1\nSavings\n3\n1\n5\n");
        assert!(output.contains("Account 1 deleted."));
        assert!(!dir.path().join("a1.txt").exists());
    }

    #[test]
    fn edit_renames_account() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a1.txt"), "40,Ann,Savings\n").unwrap();

        run_session(&dir, "1\nSavings\n2\n2\nHoliday\n5\n5\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("a1.txt")).unwrap(),
            "40,Ann,Holiday\n"
        );
    }

    #[test]
    fn end_of_input_closes_the_store() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, "2\nAnn\nSavings\n2\n1\n1\n12.5");
        assert!(output.contains("Deposit OK. Current balance is 12.50"));
        assert_eq!(
            fs::read_to_string(dir.path().join("a1.txt")).unwrap(),
            "12.5,Ann,Savings\n12.5\n"
        );
    }
}
