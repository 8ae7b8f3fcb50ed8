//! `cortex clean`: remove image and text outputs from a working directory.

use cortex_cache::clean_dir;

use crate::{CleanArgs, GlobalArgs};

/// Runs the `cortex clean` command.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let extensions = if args.extensions.is_empty() {
        crate::config::load(global)?.materialize.clean_extensions
    } else {
        args.extensions.clone()
    };

    let removed = clean_dir(&args.dir, &extensions)?;
    if !global.quiet {
        for path in &removed {
            println!("removed {}", path.display());
        }
        eprintln!("   Result: {} file(s) removed", removed.len());
    }
    Ok(0)
}
