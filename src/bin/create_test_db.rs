use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use ledger_rs::{
    Recurrence::{Daily, Monthly, No, Weekly, Yearly},
    Transaction,
    TransactionType::{Expense, Income},
    create_transaction, initialize_db,
};

/// A utility for creating a test database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test transactions...");

    let today = OffsetDateTime::now_utc().date();
    // (category, amount in cents, days ago, type, recurrence)
    let sample_transactions = [
        ("Salary", 450000, 45, Income, Monthly),
        ("Rent", 180000, 40, Expense, Monthly),
        ("Groceries", 13250, 12, Expense, Weekly),
        ("Coffee", 450, 3, Expense, Daily),
        ("Car insurance", 96000, 300, Expense, Yearly),
        ("Concert tickets", 8900, 20, Expense, No),
        ("Tax refund", 62575, 8, Income, No),
        ("Groceries", 4710, 1, Expense, No),
    ];

    for (category, cents, days_ago, kind, recurring) in sample_transactions {
        let amount = Decimal::new(cents, 2);
        let date = today - Duration::days(days_ago);
        let builder = Transaction::build(category, amount, date, kind).recurring(recurring);

        create_transaction(builder, &conn)?;
    }

    println!("Created {} transactions.", sample_transactions.len());
    println!("Success!");

    Ok(())
}
