use std::path::Path;
use std::process::Command;

use anyhow::Result;
use log::debug;
use log::info;

use crate::utils::run_tool_checked;

/// Presence of this file in a build tree means the configure step already ran
pub const BUILD_MARKER: &str = "Makefile";

pub const CONFIGURE_TOOL: &str = "cmake";
pub const BUILD_TOOL: &str = "make";

/// The configure step points cmake at the synced sources inside the build tree
const CONFIGURE_SRC_ARG: &str = "src";

///////////////////////////////
/// Configure (first time only) and build the requested target inside
/// build_dir. Both tools run with build_dir as working directory and a
/// nonzero exit from either aborts with the tool's stderr in the error
pub fn configure_and_build(build_dir: &Path, target: &str, jobs: usize) -> Result<()> {
    if !build_dir.join(BUILD_MARKER).exists() {
        info!("Configuring build in {}", build_dir.display());
        let mut configure = Command::new(CONFIGURE_TOOL);
        configure.arg(CONFIGURE_SRC_ARG).current_dir(build_dir);
        run_tool_checked(&mut configure, CONFIGURE_TOOL)?;
    } else {
        debug!(
            "{} already present in {}, skipping configure",
            BUILD_MARKER,
            build_dir.display()
        );
    }

    info!("Building target {} with -j{}", target, jobs);
    let mut build = Command::new(BUILD_TOOL);
    build
        .arg(format!("-j{}", jobs))
        .arg(target)
        .current_dir(build_dir);
    run_tool_checked(&mut build, BUILD_TOOL)?;
    Ok(())
}
