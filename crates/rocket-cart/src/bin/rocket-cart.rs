//! # rocket-cart CLI
//!
//! Drives the cart store from a terminal against the configured API and the
//! local SQLite storage.
//!
//! ## Usage
//! ```bash
//! # Show the persisted cart
//! cargo run -p rocket-cart -- show
//!
//! # Add one unit of product 3, then set it to 2 units
//! cargo run -p rocket-cart -- add 3
//! cargo run -p rocket-cart -- update 3 2
//!
//! # Remove it, using an explicit API and database
//! cargo run -p rocket-cart -- --api http://localhost:3333 --db ./cart.db remove 3
//! ```
//!
//! Shopper notifications go to stderr through tracing; the process exits
//! with status 1 when the command raised one.

use rocket_cart::{
    init_tracing, CartBackends, CartConfig, CartStore, CartStoreOptions, HttpApi,
    NotificationSink, TracingNotifier,
};
use rocket_core::{Cart, NoticeKind, ProductId, UpdateProductAmount};
use rocket_db::{Database, DbConfig, LocalStorage};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update(UpdateProductAmount),
    Help,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    api: Option<String>,
    command: Option<Command>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                parsed.config = Some(PathBuf::from(option_value(args, i)?));
                i += 1;
            }
            "--db" | "-d" => {
                parsed.db = Some(PathBuf::from(option_value(args, i)?));
                i += 1;
            }
            "--api" | "-a" => {
                parsed.api = Some(option_value(args, i)?.to_string());
                i += 1;
            }
            "--help" | "-h" => parsed.command = Some(Command::Help),
            other if other.starts_with('-') => return Err(format!("unknown option '{}'", other)),
            other => positional.push(other),
        }
        i += 1;
    }

    if parsed.command.is_none() {
        parsed.command = Some(parse_command(&positional)?);
    }

    Ok(parsed)
}

fn option_value(args: &[String], i: usize) -> Result<&str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", args[i]))
}

fn parse_command(words: &[&str]) -> Result<Command, String> {
    let id = |s: &str| {
        s.parse::<ProductId>()
            .map_err(|_| format!("'{}' is not a product id", s))
    };

    match words {
        [] | ["show"] => Ok(Command::Show),
        ["add", product] => Ok(Command::Add(id(*product)?)),
        ["remove", product] => Ok(Command::Remove(id(*product)?)),
        ["update", product, amount] => {
            let amount = amount
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not an amount", amount))?;
            Ok(Command::Update(UpdateProductAmount {
                product_id: id(*product)?,
                amount,
            }))
        }
        ["help"] => Ok(Command::Help),
        other => Err(format!("unrecognized command: {}", other.join(" "))),
    }
}

fn print_help() {
    println!("RocketShoes cart");
    println!();
    println!("Usage: rocket-cart [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  show                     Print the cart (default)");
    println!("  add <ID>                 Add one unit of a product");
    println!("  remove <ID>              Remove a product from the cart");
    println!("  update <ID> <AMOUNT>     Set a product's amount");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>      Config file (default: platform config dir)");
    println!("  -d, --db <PATH>          Database file (overrides config)");
    println!("  -a, --api <URL>          API base URL (overrides config)");
    println!("  -h, --help               Show this help message");
}

// =============================================================================
// Notifications
// =============================================================================

/// Logs each notice and remembers that one was raised.
#[derive(Default)]
struct CliNotifier {
    raised: AtomicBool,
}

impl NotificationSink for CliNotifier {
    fn notify(&self, notice: NoticeKind) {
        self.raised.store(true, Ordering::SeqCst);
        TracingNotifier.notify(notice);
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>6}  {:<40}  {:>3} x R$ {:>9}  = R$ {:>10}",
            item.id.get(),
            item.title,
            item.amount,
            item.price.to_string(),
            item.subtotal().to_string()
        );
    }

    let totals = cart.totals();
    println!();
    println!(
        "{} products, {} units, subtotal R$ {}",
        totals.item_count, totals.total_quantity, totals.subtotal
    );
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'rocket-cart --help' for usage.");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let command = args.command.unwrap_or(Command::Show);
    if command == Command::Help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = CartConfig::load(args.config)?;
    if let Some(api) = args.api {
        config.api.base_url = api;
    }
    if let Some(db) = args.db {
        config.storage.database_path = Some(db);
    }
    config.validate()?;

    let db_path = config
        .database_path()
        .ok_or("no database path configured and no platform data directory")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let storage: LocalStorage = db.local_storage();
    let api = Arc::new(HttpApi::new(&config.api.base_url, config.request_timeout())?);
    let notifier = Arc::new(CliNotifier::default());

    let store = CartStore::open(
        CartBackends {
            storage: Arc::new(storage.clone()),
            stock: api.clone(),
            catalog: api,
            notifier: notifier.clone(),
        },
        CartStoreOptions::from(&config),
    )
    .await?;

    match command {
        Command::Show | Command::Help => {}
        Command::Add(product_id) => store.add_product(product_id).await,
        Command::Remove(product_id) => store.remove_product(product_id).await,
        Command::Update(request) => store.update_product_amount(request).await,
    }

    print_cart(&store.cart());
    if let Some(saved) = storage.updated_at(&config.storage.key).await? {
        println!("Last saved {}", saved.to_rfc3339());
    }

    db.close().await;

    if notifier.raised.load(Ordering::SeqCst) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
