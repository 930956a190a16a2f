//! Generate documentation for every variable a program reads
//!
//! The same function runs against a `Describer`, which reads nothing and
//! only records what would have been read.

use envdoc::{Configurer, Describer};

fn configure<C: Configurer>(c: &mut C) {
    c.int("EXAMPLE_HEX_INT base=16 default=1f | A hex int configuration value", &[]);
    c.duration(
        "REQUEST_TIMEOUT default=30s
         ---
         How long to wait for an upstream response",
        &[],
    );
    c.string_slice("ALLOWED_ORIGINS optional comma=; | Origins allowed by CORS", &[]);
    c.time(r#"NOT_BEFORE layout="%Y-%m-%d" default=2019-01-01 | Start of service"#, &[]);
    c.has("VERBOSE | Enables verbose output");
}

fn main() -> anyhow::Result<()> {
    let mut describer = Describer::new();
    configure(&mut describer);
    let descriptions = describer.finish()?;

    println!("{}", serde_json::to_string_pretty(&descriptions)?);

    println!();
    println!("# Declarations");
    for description in &descriptions {
        println!("{}", description.to_declaration());
    }

    Ok(())
}
