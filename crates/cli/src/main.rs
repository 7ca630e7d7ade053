//! SoleStyle CLI - inspect and maintain the storefront's stored data.
//!
//! # Usage
//!
//! ```bash
//! # List visitors that have a cart or orders
//! ss-cli --data-dir data visitors
//!
//! # Show or reset one visitor's cart
//! ss-cli --data-dir data cart show --visitor 3f0c...
//! ss-cli --data-dir data cart clear --visitor 3f0c...
//!
//! # Order history
//! ss-cli --data-dir data orders list --visitor 3f0c...
//! ss-cli --data-dir data orders show --visitor 3f0c... SS-1767225600-42
//! ```
//!
//! `--data-dir` falls back to `STOREFRONT_DATA_DIR`, the same directory the
//! storefront writes to.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(author, version, about = "SoleStyle CLI tools")]
struct Cli {
    /// Storefront data directory
    #[arg(long, env = "STOREFRONT_DATA_DIR")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List visitors with stored data
    Visitors,
    /// Inspect or reset a visitor's cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect a visitor's orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart lines and totals
    Show {
        /// Visitor id (value of the `ss_visitor` cookie)
        #[arg(short, long)]
        visitor: String,
    },
    /// Replace the cart with an empty one
    Clear {
        /// Visitor id (value of the `ss_visitor` cookie)
        #[arg(short, long)]
        visitor: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// One line per order
    List {
        /// Visitor id (value of the `ss_visitor` cookie)
        #[arg(short, long)]
        visitor: String,
    },
    /// Print one order as JSON
    Show {
        /// Visitor id (value of the `ss_visitor` cookie)
        #[arg(short, long)]
        visitor: String,

        /// Order number, e.g. `SS-1767225600-42`
        order_id: String,
    },
}

fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so command output can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solestyle_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = run(cli, &mut out).and_then(|()| out.flush().map_err(CliError::from));

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let storage = commands::open_storage(&cli.data_dir)?;

    match cli.command {
        Commands::Visitors => commands::visitors::list(&storage, out),
        Commands::Cart { action } => match action {
            CartAction::Show { visitor } => commands::cart::show(&storage, &visitor, out),
            CartAction::Clear { visitor } => commands::cart::clear(&storage, &visitor, out),
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { visitor } => commands::orders::list(&storage, &visitor, out),
            OrdersAction::Show { visitor, order_id } => {
                commands::orders::show(&storage, &visitor, &order_id, out)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
