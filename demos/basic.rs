//! Basic usage example

use envdoc::{Cfg, Configurer};

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");

    let mut cfg = Cfg::new();

    // Required: a missing value is reported when the session ends
    let database_url = cfg.string("DATABASE_URL | database connection string", &[]);

    // With default value
    let server_addr = cfg.string("SERVER_ADDR default=127.0.0.1:8080 | address to bind", &[]);

    // Numeric type with a width limit
    let max_connections = cfg.uint("MAX_CONNECTIONS default=10 bit_size=32", &[]);

    // Boolean type
    let debug_mode = cfg.bool("DEBUG_MODE default=false", &[]);

    // Every error at once, one per line
    cfg.finish()?;

    println!("Configuration loaded:");
    println!("  Database URL: {database_url}");
    println!("  Server Address: {server_addr}");
    println!("  Max Connections: {max_connections}");
    println!("  Debug Mode: {debug_mode}");

    Ok(())
}
