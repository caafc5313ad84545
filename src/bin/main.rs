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

use account_ledger::{AccountStore, FlushPolicy, Menu, StoreOptions};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;

/// Account Ledger - Manage bank accounts kept as flat files
///
/// Loads every account file in the account directory, then runs an interactive menu on
/// stdin/stdout. Set `RUST_LOG=info` to see when files are created and saved.
#[derive(Parser, Debug)]
#[command(name = "account-ledger")]
#[command(about = "An interactive ledger of file-backed bank accounts", long_about = None)]
struct Args {
    /// Directory holding one `a<id>.txt` file per account
    ///
    /// Created (with parents) if it does not exist.
    #[arg(long, value_name = "DIR", env = "LEDGER_ACCOUNT_DIR", default_value = "accounts")]
    dir: PathBuf,

    /// Save the active account after every deposit and withdrawal
    #[arg(long)]
    flush_each: bool,

    /// Name shown in the welcome message
    #[arg(long, default_value = "the bank")]
    bank_name: String,
}

impl Args {
    fn store_options(&self) -> StoreOptions {
        let policy = if self.flush_each {
            FlushPolicy::EveryMutation
        } else {
            FlushPolicy::OnSwitch
        };
        StoreOptions::default().with_flush_policy(policy)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let store = match AccountStore::open_with(&args.dir, args.store_options()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening accounts: {}", e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let menu = Menu::new(store, stdin.lock(), io::stdout()).with_bank_name(args.bank_name);
    if let Err(e) = menu.run() {
        eprintln!("Error in menu session: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["account-ledger"]).unwrap();
        assert!(!args.flush_each);
        assert_eq!(args.store_options().flush_policy, FlushPolicy::OnSwitch);
    }

    #[test]
    fn flush_each_selects_every_mutation() {
        let args =
            Args::try_parse_from(["account-ledger", "--dir", "/tmp/x", "--flush-each"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("/tmp/x"));
        assert_eq!(args.store_options().flush_policy, FlushPolicy::EveryMutation);
    }
}
