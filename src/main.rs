// Student Ledger - CLI
// Import a CSV into an in-memory ledger, or classify a single transaction

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use student_ledger::{config::AppConfig, intake, logging, matched_rules, Ledger};

#[derive(Parser)]
#[command(name = "student-ledger")]
#[command(about = "Student transaction ledger with anomaly flagging", long_about = None)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, default_value = student_ledger::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV (student_id,amount,type) into a fresh ledger and report anomalies
    Import {
        /// CSV file path
        csv: PathBuf,
    },

    /// Show whether a single transaction would be flagged
    Classify {
        /// Transaction type label
        #[arg(short = 't', long = "type")]
        transaction_type: String,
        /// Amount (negative allowed)
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_path(&cli.config)?;
    logging::init(&config.logging)?;

    match cli.command {
        Commands::Import { csv } => run_import(&csv),
        Commands::Classify {
            transaction_type,
            amount,
        } => run_classify(&transaction_type, &amount),
    }
}

fn run_import(csv_path: &Path) -> Result<()> {
    println!("🗄️  Import: CSV → in-memory ledger");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let rows = intake::load_csv(csv_path)?;
    println!("✓ Loaded {} transactions from CSV", rows.len());

    // 2. Record
    let ledger = Ledger::new();
    for row in rows {
        ledger.record(row);
    }
    info!(count = ledger.len(), "import complete");

    // 3. Report
    let stats = ledger.stats();
    println!("\n📊 Totals");
    println!("   Transactions: {}", stats.total_transactions);
    println!("   Flagged:      {}", stats.flagged_transactions);
    for stat in &stats.by_type {
        let total = stat
            .total_amount
            .map(|t| t.to_string())
            .unwrap_or_else(|| "overflow".to_string());
        println!(
            "   {:<12} count={:<6} flagged={:<6} total={}",
            stat.transaction_type, stat.count, stat.flagged, total
        );
    }

    let flagged = ledger.list_flagged();
    if flagged.is_empty() {
        println!("\n✅ No anomalies found");
    } else {
        println!("\n🚩 Flagged transactions");
        for tx in &flagged {
            let reasons: Vec<&str> = matched_rules(tx.transaction_type(), tx.amount())
                .iter()
                .map(|rule| rule.description())
                .collect();
            println!(
                "   {}  {:<10} {:>14} {:<10} {}",
                tx.id(),
                tx.student_id(),
                tx.amount(),
                tx.transaction_type(),
                reasons.join("; ")
            );
        }
    }

    Ok(())
}

fn run_classify(transaction_type: &str, amount: &str) -> Result<()> {
    let amount = intake::parse_amount_str(amount).context("Amount must be numeric")?;
    let rules = matched_rules(transaction_type, amount);

    if rules.is_empty() {
        println!("✅ {} {}: not flagged", transaction_type, amount);
    } else {
        println!("🚩 {} {}: flagged", transaction_type, amount);
        for rule in rules {
            println!("   - {} ({})", rule.description(), rule.as_str());
        }
    }

    Ok(())
}
