//! IBKR CSV CLI
//!
//! Decodes a multi-table statement and prints one summary line per table.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- statement.csv > tables.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `trace` to follow table boundaries

use ibkr_csv::{write_summary, DecodeError, Result, TableReader};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(DecodeError::MissingArgument);
    }

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let mut reader = TableReader::from_reader(BufReader::new(file));

    let stdout = io::stdout();
    let handle = stdout.lock();
    write_summary(&mut reader, handle)?;

    Ok(())
}
