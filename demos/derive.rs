//! Derive macro example

use envdoc::Configurable;
use std::time::Duration;

#[derive(Debug, Configurable)]
#[env(prefix = "APP_")]
struct Config {
    /// Application name
    pub name: String, // APP_NAME

    /// Release version, if known
    pub version: Option<String>, // APP_VERSION

    /// Port to listen on
    #[env(default = "8080")]
    pub port: u16, // APP_PORT

    /// Enables debug output when set
    #[env(has)]
    pub debug: bool, // APP_DEBUG

    #[env(name = "DATABASE_CONNECTION_STRING")]
    pub database_url: String, // APP_DATABASE_CONNECTION_STRING

    /// Semicolon separated tags
    #[env(decl = "comma=;", optional)]
    pub tags: Vec<String>, // APP_TAGS

    /// Accent color as RGB hex
    #[env(decl = "base=16", default = "ff8800")]
    pub color: u32, // APP_COLOR

    #[env(default = "1m30s")]
    pub timeout: Duration, // APP_TIMEOUT
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("APP_NAME", "demo");
    std::env::set_var("APP_DATABASE_CONNECTION_STRING", "postgres://localhost/demo");
    std::env::set_var("APP_TAGS", "blue;green");

    let config = Config::from_env()?;
    println!("{config:#?}");

    for description in Config::describe()? {
        println!("{}", description.to_declaration());
    }

    Ok(())
}
