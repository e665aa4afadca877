use clap::Subcommand;

// Module declarations (alphabetical)
pub mod build;
pub mod filter_fastq;
pub mod ideal_reads;
pub mod threadcount;

pub use build::{Builder, BuildCMD};
pub use filter_fastq::{FilterFastqCMD, FilterReport};
pub use ideal_reads::IdealReadsCMD;
pub use threadcount::determine_thread_count;

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    Build(BuildCMD),
    FilterFastq(FilterFastqCMD),
    IdealReads(IdealReadsCMD),
}
