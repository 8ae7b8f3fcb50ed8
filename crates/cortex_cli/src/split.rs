//! `cortex split`: show how a path divides into directory, stem and extension.

use cortex_common::PathParts;

use crate::{GlobalArgs, ReportFormat, SplitArgs};

/// Runs the `cortex split` command.
pub fn run(args: &SplitArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let parts = PathParts::split(&args.path);
    match args.format {
        ReportFormat::Text => {
            println!("directory: {}", parts.directory.display());
            println!("stem:      {}", parts.stem);
            println!("extension: {}", parts.extension);
        }
        ReportFormat::Json => {
            let value = serde_json::json!({
                "directory": parts.directory,
                "stem": parts.stem,
                "extension": parts.extension,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(0)
}
