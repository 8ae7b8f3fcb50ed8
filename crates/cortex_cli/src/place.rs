//! `cortex place`: materialize files into a working directory.

use std::fs;

use cortex_cache::{Destination, PlaceMode};
use cortex_diagnostics::DiagnosticSink;

use crate::report::render_and_report;
use crate::{GlobalArgs, PlaceArgs};

/// Runs the `cortex place` command.
///
/// A single `--dest` names a directory, created if needed, unless exactly
/// one source is given and the destination is not an existing directory, in
/// which case it is the target path itself.
pub fn run(args: &PlaceArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = crate::config::load(global)?;
    let mode = if args.copy {
        PlaceMode::Copy
    } else {
        config.materialize.mode
    };

    let destination = destination(args).ok_or("no destination given")?;
    if let Destination::Directory(dir) = &destination {
        fs::create_dir_all(dir)?;
    }

    let sink = DiagnosticSink::new();
    let result = config
        .materializer()
        .place_many(&args.sources, &destination, mode, &sink);
    render_and_report(&sink, args.format, global);
    let placed = result?;

    if !global.quiet {
        for path in &placed {
            println!("{}", path.display());
        }
    }
    Ok(0)
}

fn destination(args: &PlaceArgs) -> Option<Destination> {
    if let ([_], [target]) = (args.sources.as_slice(), args.dest.as_slice()) {
        if !target.is_dir() {
            return Some(Destination::Paths(vec![target.clone()]));
        }
    }
    Destination::from_sequence(args.dest.clone())
}
