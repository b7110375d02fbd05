// Student Ledger - Core Library
// Exposes the ledger, classifier and intake layer for the CLI, API server, and tests

pub mod classifier;
pub mod config;
pub mod intake;
pub mod ledger;
pub mod logging;
pub mod transaction;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use classifier::{classify, matched_rules, AnomalyRule, GRANT_CEILING, TUITION_CEILING};
pub use config::{AppConfig, LogFormat, LoggingConfig, ServerConfig};
pub use intake::{load_csv, parse_amount, parse_amount_str, IntakeError, TransactionRequest};
pub use ledger::{Ledger, LedgerStats, TypeStat};
pub use transaction::{NewTransaction, Transaction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
