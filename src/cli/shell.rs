//! Interactive numbered-menu sessions.
//!
//! Both shells read one answer per line and never abort on bad input: an
//! unparsable answer or a rejected operation prints a message and returns to
//! the menu. End of input ends the session.

use std::fmt::Display;
use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::application::{AppError, BankService};
use crate::domain::{
    Account, Catalog, Ledger, ProductId, Quantity, format_cents, parse_cents, quote,
};

/// Line-oriented console over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

enum Answer<T> {
    Value(T),
    Invalid,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Back,
    Exit,
}

/// Ask for a value; on bad input go back to the menu, on end of input leave the session.
macro_rules! ask_or_return {
    ($console:expr, $prompt:expr, $parse:expr) => {
        match $console.ask_with($prompt, $parse)? {
            Answer::Value(value) => value,
            Answer::Invalid => return Ok(Flow::Continue),
            Answer::Closed => return Ok(Flow::Exit),
        }
    };
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    /// Print a prompt and read one line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask_with<T, E: Display>(
        &mut self,
        prompt: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<Answer<T>> {
        let Some(line) = self.ask(prompt)? else {
            return Ok(Answer::Closed);
        };
        match parse(line.trim()) {
            Ok(value) => Ok(Answer::Value(value)),
            Err(e) => {
                self.say(format!("Invalid input: {}", e))?;
                Ok(Answer::Invalid)
            }
        }
    }

    fn menu_choice(&mut self) -> Result<Answer<u32>> {
        self.ask_with("Choose an option: ", |s| s.parse::<u32>())
    }
}

fn parse_text(s: &str) -> Result<String, &'static str> {
    Ok(s.to_string())
}

// ========================
// Bank session
// ========================

/// Register / login / exit loop of the bank program.
pub async fn run_bank_shell<R: BufRead, W: Write>(
    service: &BankService,
    console: &mut Console<R, W>,
) -> Result<()> {
    loop {
        console.say("")?;
        console.say("Welcome! Please choose an option:")?;
        console.say("1. Register")?;
        console.say("2. Login")?;
        console.say("3. Exit")?;

        let flow = match console.menu_choice()? {
            Answer::Value(1) => register(service, console).await?,
            Answer::Value(2) => login(service, console).await?,
            Answer::Value(3) => {
                console.say("Exiting...")?;
                Flow::Exit
            }
            Answer::Value(_) => {
                console.say("Invalid choice.")?;
                Flow::Continue
            }
            Answer::Invalid => Flow::Continue,
            Answer::Closed => Flow::Exit,
        };

        if flow == Flow::Exit {
            return Ok(());
        }
    }
}

async fn register<R: BufRead, W: Write>(
    service: &BankService,
    console: &mut Console<R, W>,
) -> Result<Flow> {
    let username = ask_or_return!(console, "Enter a username: ", parse_text);
    let password = ask_or_return!(console, "Enter a password: ", parse_text);

    match service.register(&username, &password).await {
        Ok(_) => console.say("Registration successful!")?,
        Err(e) => report(console, &e)?,
    }
    Ok(Flow::Continue)
}

async fn login<R: BufRead, W: Write>(
    service: &BankService,
    console: &mut Console<R, W>,
) -> Result<Flow> {
    let username = ask_or_return!(console, "Enter your username: ", parse_text);
    let password = ask_or_return!(console, "Enter your password: ", parse_text);

    let mut account = match service.login(&username, &password).await {
        Ok(account) => account,
        Err(e) => {
            report(console, &e)?;
            return Ok(Flow::Continue);
        }
    };

    loop {
        console.say("")?;
        console.say("User Menu:")?;
        console.say("1. Deposit")?;
        console.say("2. Withdraw")?;
        console.say("3. View Balance")?;
        console.say("4. View Transaction History")?;
        console.say("5. Calculate EMI")?;
        console.say("6. Logout")?;

        let flow = match console.menu_choice()? {
            Answer::Value(1) => deposit(service, console, &mut account).await?,
            Answer::Value(2) => withdraw(service, console, &mut account).await?,
            Answer::Value(3) => view_balance(service, console, &mut account).await?,
            Answer::Value(4) => view_history(console, &account)?,
            Answer::Value(5) => calculate_emi(console)?,
            Answer::Value(6) => {
                console.say("Logged out successfully.")?;
                Flow::Back
            }
            Answer::Value(_) => {
                console.say("Invalid choice.")?;
                Flow::Continue
            }
            Answer::Invalid => Flow::Continue,
            Answer::Closed => Flow::Exit,
        };

        match flow {
            Flow::Continue => {}
            Flow::Back => return Ok(Flow::Continue),
            Flow::Exit => return Ok(Flow::Exit),
        }
    }
}

async fn deposit<R: BufRead, W: Write>(
    service: &BankService,
    console: &mut Console<R, W>,
    account: &mut Account,
) -> Result<Flow> {
    let amount = ask_or_return!(console, "Enter the amount to deposit: ", parse_cents);

    match service.deposit(account, amount).await {
        Ok(_) => console.say("Deposit successful!")?,
        Err(e) => report(console, &e)?,
    }
    Ok(Flow::Continue)
}

async fn withdraw<R: BufRead, W: Write>(
    service: &BankService,
    console: &mut Console<R, W>,
    account: &mut Account,
) -> Result<Flow> {
    let amount = ask_or_return!(console, "Enter the amount to withdraw: ", parse_cents);

    match service.withdraw(account, amount).await {
        Ok(_) => console.say("Withdrawal successful!")?,
        Err(e) => report(console, &e)?,
    }
    Ok(Flow::Continue)
}

async fn view_balance<R: BufRead, W: Write>(
    service: &BankService,
    console: &mut Console<R, W>,
    account: &mut Account,
) -> Result<Flow> {
    match service.balance(account).await {
        Ok(balance) => console.say(format!("Current balance: {}", format_cents(balance)))?,
        Err(e) => report(console, &e)?,
    }
    Ok(Flow::Continue)
}

fn view_history<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    account: &Account,
) -> Result<Flow> {
    console.say("Transaction History:")?;
    if account.history().is_empty() {
        console.say("No transactions yet.")?;
    }
    for entry in account.history().iter() {
        console.say(entry)?;
    }
    Ok(Flow::Continue)
}

fn calculate_emi<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Flow> {
    let principal = ask_or_return!(console, "Enter the principal amount: ", parse_cents);
    let rate = ask_or_return!(console, "Enter the annual interest rate: ", |s: &str| s
        .parse::<f64>());
    let months = ask_or_return!(console, "Enter the loan tenure in months: ", |s: &str| s
        .parse::<i64>());

    match quote(principal, rate, months) {
        Ok(quote) => {
            console.say(format!(
                "Calculated EMI: {}",
                format_cents(quote.installment)
            ))?;
            console.say(format!(
                "Total payable: {} (interest {})",
                format_cents(quote.total_payable),
                format_cents(quote.total_interest)
            ))?;
        }
        Err(e) => console.say(format!("Error calculating EMI: {}", e))?,
    }
    Ok(Flow::Continue)
}

fn report<R: BufRead, W: Write>(console: &mut Console<R, W>, error: &AppError) -> Result<()> {
    debug!(%error, "operation rejected");
    console.say(format!("Error: {}", error))
}

// ========================
// Inventory session
// ========================

/// Menu loop of the stock management program. Changes live only in `catalog`.
pub fn run_inventory_shell<R: BufRead, W: Write>(
    catalog: &mut Catalog,
    console: &mut Console<R, W>,
) -> Result<()> {
    loop {
        console.say("")?;
        console.say("Stock Management System:")?;
        console.say("1. View Stock")?;
        console.say("2. Add Stock")?;
        console.say("3. Remove Stock")?;
        console.say("4. View Product Details")?;
        console.say("5. Exit")?;

        let flow = match console.menu_choice()? {
            Answer::Value(1) => view_stock(catalog, console)?,
            Answer::Value(2) => change_stock(catalog, console, StockChange::Add)?,
            Answer::Value(3) => change_stock(catalog, console, StockChange::Remove)?,
            Answer::Value(4) => view_product_details(catalog, console)?,
            Answer::Value(5) => {
                console.say("Exiting...")?;
                Flow::Exit
            }
            Answer::Value(_) => {
                console.say("Invalid choice. Please try again.")?;
                Flow::Continue
            }
            Answer::Invalid => Flow::Continue,
            Answer::Closed => Flow::Exit,
        };

        if flow == Flow::Exit {
            return Ok(());
        }
    }
}

#[derive(Clone, Copy)]
enum StockChange {
    Add,
    Remove,
}

fn view_stock<R: BufRead, W: Write>(catalog: &Catalog, console: &mut Console<R, W>) -> Result<Flow> {
    console.say("")?;
    console.say("Current Stock:")?;
    for level in catalog.view_all() {
        console.say(level)?;
    }
    Ok(Flow::Continue)
}

fn change_stock<R: BufRead, W: Write>(
    catalog: &mut Catalog,
    console: &mut Console<R, W>,
    change: StockChange,
) -> Result<Flow> {
    let (id_prompt, quantity_prompt) = match change {
        StockChange::Add => ("Enter product ID to add stock: ", "Enter quantity to add: "),
        StockChange::Remove => (
            "Enter product ID to remove stock: ",
            "Enter quantity to remove: ",
        ),
    };
    let id = ask_or_return!(console, id_prompt, |s: &str| s.parse::<ProductId>());
    let quantity = ask_or_return!(console, quantity_prompt, |s: &str| s.parse::<Quantity>());

    let result = match change {
        StockChange::Add => catalog.add_stock(id, quantity),
        StockChange::Remove => catalog.remove_stock(id, quantity),
    };

    match (result, change) {
        (Ok(_), StockChange::Add) => console.say(format!("{} items added to stock.", quantity))?,
        (Ok(_), StockChange::Remove) => {
            console.say(format!("{} items removed from stock.", quantity))?
        }
        (Err(e), _) => {
            debug!(product_id = id, error = %e, "stock change rejected");
            console.say(format!("Error: {}", e))?
        }
    }
    Ok(Flow::Continue)
}

fn view_product_details<R: BufRead, W: Write>(
    catalog: &Catalog,
    console: &mut Console<R, W>,
) -> Result<Flow> {
    let id = ask_or_return!(console, "Enter product ID to view details: ", |s: &str| s
        .parse::<ProductId>());

    match catalog.product_details(id) {
        Ok(details) => console.say(details)?,
        Err(e) => console.say(format!("Error: {}", e))?,
    }
    Ok(Flow::Continue)
}
