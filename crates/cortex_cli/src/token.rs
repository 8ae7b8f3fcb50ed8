//! `cortex token`: report the cache token carried by a name.

use cortex_cache::embedded_token;

use crate::{GlobalArgs, TokenArgs};

/// Runs the `cortex token` command. Exits with 1 when no token is present.
pub fn run(args: &TokenArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match embedded_token(&args.names) {
        Some(token) => {
            println!("{token}");
            Ok(0)
        }
        None => {
            if !global.quiet {
                let first = args.names.first().map(String::as_str).unwrap_or_default();
                eprintln!("no cache token in {first}");
            }
            Ok(1)
        }
    }
}
