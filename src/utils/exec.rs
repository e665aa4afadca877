use std::process::Command;
use std::process::Output;

use anyhow::bail;
use anyhow::Context;
use log::debug;

///////////////////////////////
/// Render a Command the way it would look typed into a shell, for logging
pub fn command_to_string(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} {}", program, args)
}

///////////////////////////////
/// Run an external utility to completion and insist that it succeeded.
/// Whatever the utility printed on stdout goes to the log at debug level;
/// a nonzero exit turns into an error carrying the utility's stderr
pub fn run_tool_checked(cmd: &mut Command, utility: &str) -> anyhow::Result<Output> {
    debug!("Running: {}", command_to_string(cmd));
    let output = cmd
        .output()
        .with_context(|| format!("Failed to execute {}", utility))?;
    if !output.status.success() {
        bail!(
            "{} failed with {}: {}",
            utility,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!("{} output:\n{}", utility, stdout.trim_end());
    }
    Ok(output)
}
