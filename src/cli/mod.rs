pub mod shell;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::application::BankService;
use crate::config::load_catalog;
use crate::domain::{Account, Cents, Ledger, ProductId, format_cents, parse_cents, quote};
use crate::io::{OutputFormat, write_history, write_stock};

use self::shell::{Console, run_bank_shell, run_inventory_shell};

/// counterdesk - bank ledger, loan EMI calculator and stock inventory
#[derive(Parser)]
#[command(name = "counterdesk")]
#[command(about = "Bank account ledger with EMI calculator, plus an in-memory stock inventory")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "COUNTERDESK_DATABASE", default_value = "counterdesk.db")]
    pub database: String,

    /// TOML file with the products the inventory starts with
    #[arg(long, env = "COUNTERDESK_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Login details for one-shot account commands.
#[derive(Args)]
pub struct Credentials {
    /// Account username
    #[arg(short, long)]
    pub user: String,

    /// Account password
    #[arg(short, long, env = "COUNTERDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new account with a zero balance
    Register {
        /// Username (must be unique)
        username: String,

        /// Password
        #[arg(short, long, env = "COUNTERDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Deposit money into an account
    Deposit {
        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Amount to withdraw (e.g., "50.00" or "50")
        amount: String,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show the current balance of an account
    Balance {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show the last transactions of an account
    History {
        #[command(flatten)]
        credentials: Credentials,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Calculate the equated monthly installment of a loan
    Emi {
        /// Loan principal (e.g., "100000" or "2500.50")
        principal: String,

        /// Annual interest rate in percent
        #[arg(short, long)]
        rate: f64,

        /// Loan tenure in months
        #[arg(short, long)]
        months: i64,
    },

    /// Start an interactive banking session
    Bank,

    /// Stock inventory commands
    #[command(subcommand)]
    Inventory(InventoryCommands),
}

#[derive(Subcommand)]
pub enum InventoryCommands {
    /// List all products and their stock
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show details of one product
    Show {
        /// Product ID
        id: ProductId,
    },

    /// Start an interactive stock management session
    Shell,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Register { username, password } => {
                let service = open_service(&self.database).await?;
                let account = service.register(&username, &password).await?;
                println!("Registered account: {}", account.username());
            }

            Commands::Deposit {
                amount,
                credentials,
            } => {
                let service = open_service(&self.database).await?;
                let amount =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let mut account = login(&service, &credentials).await?;
                let entry = service.deposit(&mut account, amount).await?;
                println!("{}", entry);
                println!("Balance: {}", format_cents(account.balance()));
            }

            Commands::Withdraw {
                amount,
                credentials,
            } => {
                let service = open_service(&self.database).await?;
                let amount =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let mut account = login(&service, &credentials).await?;
                let entry = service.withdraw(&mut account, amount).await?;
                println!("{}", entry);
                println!("Balance: {}", format_cents(account.balance()));
            }

            Commands::Balance { credentials } => {
                let service = open_service(&self.database).await?;
                let mut account = login(&service, &credentials).await?;
                let balance = service.balance(&mut account).await?;
                println!("{}: {}", account.username(), format_cents(balance));
            }

            Commands::History {
                credentials,
                format,
            } => {
                let service = open_service(&self.database).await?;
                let account = login(&service, &credentials).await?;
                write_history(service.history(&account).iter(), format, io::stdout().lock())?;
            }

            Commands::Emi {
                principal,
                rate,
                months,
            } => {
                let principal = parse_cents(&principal)
                    .context("Invalid principal. Use '100000' or '2500.50'")?;
                run_emi_command(principal, rate, months, io::stdout().lock())?;
            }

            Commands::Bank => {
                let service = open_service(&self.database).await?;
                let mut console = Console::new(io::stdin().lock(), io::stdout());
                run_bank_shell(&service, &mut console).await?;
            }

            Commands::Inventory(cmd) => {
                run_inventory_command(self.catalog, cmd)?;
            }
        }

        Ok(())
    }
}

/// Open the database, creating the file and tables if needed.
/// Failing here is fatal for the command.
async fn open_service(database: &str) -> Result<BankService> {
    let service = BankService::init(database)
        .await
        .with_context(|| format!("Failed to open database {}", database))?;
    info!(database, "database ready");
    Ok(service)
}

fn run_emi_command<W: Write>(principal: Cents, rate: f64, months: i64, mut out: W) -> Result<()> {
    let quote = quote(principal, rate, months)?;

    writeln!(out, "Principal:      {:>14}", format_cents(quote.principal))?;
    writeln!(out, "Annual rate:    {:>13}%", quote.annual_rate)?;
    writeln!(out, "Tenure:         {:>7} months", quote.months)?;
    writeln!(out, "{}", "-".repeat(30))?;
    writeln!(out, "Monthly EMI:    {:>14}", format_cents(quote.installment))?;
    writeln!(out, "Total payable:  {:>14}", format_cents(quote.total_payable))?;
    writeln!(out, "Total interest: {:>14}", format_cents(quote.total_interest))?;
    Ok(())
}

async fn login(service: &BankService, credentials: &Credentials) -> Result<Account> {
    Ok(service
        .login(&credentials.user, &credentials.password)
        .await?)
}

fn run_inventory_command(catalog_path: Option<PathBuf>, cmd: InventoryCommands) -> Result<()> {
    let mut catalog = load_catalog(catalog_path.as_deref())?;

    match cmd {
        InventoryCommands::List { format } => {
            write_stock(&catalog.all_details(), format, io::stdout().lock())?;
        }

        InventoryCommands::Show { id } => {
            let details = catalog.product_details(id)?;
            println!("{}", details);
        }

        InventoryCommands::Shell => {
            let mut console = Console::new(io::stdin().lock(), io::stdout());
            run_inventory_shell(&mut catalog, &mut console)?;
        }
    }

    Ok(())
}
