use std::process::ExitCode;

use clap::Parser;
use kforge::command::Commands;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build(mut cmd) => cmd.try_execute(),
        Commands::FilterFastq(mut cmd) => cmd.try_execute(),
        Commands::IdealReads(mut cmd) => cmd.try_execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    return ExitCode::SUCCESS;
}

///////////////////////////////
#[cfg(test)]
mod tests {
    use anyhow::Context;

    //A failure must surface the whole context chain, not only the outermost message
    #[test]
    fn test_error_rendering_keeps_the_cause() {
        let err = Err::<(), std::io::Error>(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ))
        .context("Failed to copy a file")
        .unwrap_err();
        assert_eq!(format!("Error: {:#}", err), "Error: Failed to copy a file: no such file");
    }
}
