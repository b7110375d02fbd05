// Student Ledger - Web Server
// REST API with Axum over a single in-memory ledger

use anyhow::{Context, Result};
use student_ledger::api::{router, AppState};
use student_ledger::{logging, AppConfig, Ledger};
use tracing::info;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.logging)?;

    info!(version = student_ledger::VERSION, "Student Ledger - Web Server");

    // One ledger for the life of the process, handed to the router explicitly
    let ledger = Ledger::new();
    let state = AppState::new(ledger).with_default_limit(config.server.default_limit);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to address {}", config.server.bind))?;

    info!("🚀 Server running on http://{}", config.server.bind);
    info!("   API: http://{}/admin/transactions/all", config.server.bind);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
