//! Prompts for connection and listener settings, then starts the server.
//!
//! Each prompt is pre-filled from the environment, so pressing enter
//! throughout starts the server exactly as [`super::run_server`] would.

use dialoguer::{Confirm, Input};
use enforceiq_database::db::DatabaseConfig;

use crate::ServerConfig;

/// Asks for the database URL and listener, confirms, and serves.
///
/// # Errors
///
/// * If a prompt cannot read from the terminal
/// * If the server fails to bind or run
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("EnforceIQ Server");
    println!();

    let database = DatabaseConfig::from_env();
    let listener = ServerConfig::from_env();

    let database_url: String = Input::new()
        .with_prompt("Database URL")
        .default(database.url)
        .interact_text()
        .map_err(std::io::Error::other)?;

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(listener.bind_addr)
        .interact_text()
        .map_err(std::io::Error::other)?;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(listener.port)
        .interact_text()
        .map_err(std::io::Error::other)?;

    let start = Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .map_err(std::io::Error::other)?;
    if !start {
        println!("Cancelled.");
        return Ok(());
    }

    // SAFETY: nothing else reads these variables concurrently; the server
    // reads them once while building its state.
    unsafe {
        std::env::set_var("DATABASE_URL", database_url);
        std::env::set_var("BIND_ADDR", bind_addr);
        std::env::set_var("PORT", port.to_string());
    }

    super::run_server().await
}
