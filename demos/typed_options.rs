//! Programmatic options
//!
//! `Opt` values are applied after the declaration's own fields. Options a
//! type cannot take, such as `base` for strings, do not compile.

use envdoc::parser::{DurationParser, SliceParser};
use envdoc::{Cfg, Configurer, ErrorPolicy, Opt};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let mut cfg = Cfg::builder()
        .vars([
            ("COLOR", "ff8800"),
            ("PORTS", "80 443"),
            ("RETRY_DELAYS", "100ms,1s,5s"),
            ("SESSION_KEY", "c2VjcmV0"),
            ("BIND", "::1"),
        ])
        .policy(ErrorPolicy::Collect)
        .build();

    let color = cfg.int("COLOR | RGB color", &[Opt::base(16), Opt::bit_size(32)]);
    let ports = cfg.uint_slice("PORTS", &[Opt::comma(' '), Opt::bit_size(16)]);
    let timeout = cfg.duration(
        "TIMEOUT default=1h | overridden below",
        &[Opt::default(Duration::from_secs(45)), Opt::comment("request timeout")],
    );
    // any parser works through the generic accessor
    let delays = cfg.value::<SliceParser<DurationParser>>(
        "RETRY_DELAYS optional | delays between retries",
        &[],
    );

    let key = cfg.bytes("SESSION_KEY no_padding | session signing key", &[Opt::url_safe()]);
    let bind = cfg.ip("BIND optional | address to bind", &[]);

    let descriptions = cfg.finish()?;

    println!("color = {color:#08x}");
    println!("ports = {ports:?}");
    println!("timeout = {timeout:?}");
    println!("delays = {delays:?}");
    println!("key = {} bytes", key.len());
    println!("bind = {bind:?}");
    println!("{}", serde_json::to_string_pretty(&descriptions)?);

    Ok(())
}
