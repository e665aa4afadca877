use std::ffi::OsString;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use log::debug;
use log::info;

use crate::idealreads::align_reads_to_reference;
use crate::idealreads::default_refseq_path;
use crate::idealreads::extract_ideal_reads;
use crate::idealreads::read_reference_fasta;
use crate::idealreads::read_sequence_lengths;
use crate::idealreads::write_refseq_fasta;
use crate::idealreads::Aligner;
use crate::idealreads::ReadTech;
use crate::utils::check_bwa;
use crate::utils::check_minimap2;
use crate::utils::check_samtools;
use crate::utils::command_to_string;

use super::determine_thread_count;

pub const DEFAULT_MIN_FRACTION: f64 = 0.8;

///////////////////////////////
/// Produce "ideal reads": for each long read, the reference substring its
/// best mapping covers. Used to feed an assembler's path aligner with reads
/// that are error free by construction but keep real lengths and positions
#[derive(Args)]
pub struct IdealReadsCMD {
    #[arg(short = 'i', long = "reads", value_parser = clap::value_parser!(PathBuf))]
    /// Long reads to map, FASTA
    pub path_reads: PathBuf,

    #[arg(short = 'r', long = "reference", value_parser = clap::value_parser!(PathBuf))]
    /// Reference genome, FASTA
    pub path_reference: PathBuf,

    #[arg(long = "tech", value_enum)]
    /// Sequencing technology of the reads
    pub tech: ReadTech,

    #[arg(long = "aligner", value_enum, default_value = "bwa")]
    /// Mapper to run
    pub aligner: Aligner,

    #[arg(short = 'o', long = "out", value_parser = clap::value_parser!(PathBuf))]
    /// Output FASTA; defaults to refseq_* next to the reads
    pub path_out: Option<PathBuf>,

    #[arg(long = "min-fraction", default_value_t = DEFAULT_MIN_FRACTION)]
    /// Keep mappings covering more than this fraction of the read
    pub min_fraction: f64,

    #[arg(long = "graph-aligner", value_parser = clap::value_parser!(PathBuf))]
    /// Assembler graph aligner binary; runs on the extracted reads when given
    pub graph_aligner: Option<PathBuf>,

    #[arg(long = "graph", value_parser = clap::value_parser!(PathBuf))]
    /// Graph pack for the graph aligner
    pub path_graph: Option<PathBuf>,

    #[arg(short = 'k', value_parser = clap::value_parser!(u32))]
    /// K the graph pack was built with
    pub k: Option<u32>,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    num_threads_total: Option<usize>,
}
impl IdealReadsCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        self.verify_input_files()?;
        self.verify_graph_aligner_args()?;
        match self.aligner {
            Aligner::Bwa => check_bwa()?,
            Aligner::Minimap2 => check_minimap2()?,
        }
        check_samtools()?;

        let num_threads_total = determine_thread_count(self.num_threads_total)?;

        let path_bam = align_reads_to_reference(
            self.aligner,
            self.tech,
            &self.path_reads,
            &self.path_reference,
            num_threads_total,
        )?;

        info!("Loading reference and read lengths");
        let reference = read_reference_fasta(&self.path_reference)?;
        let read_lengths = read_sequence_lengths(&self.path_reads)?;

        let (ideal, stats) =
            extract_ideal_reads(&path_bam, &reference, &read_lengths, self.min_fraction)?;
        info!(
            "Number of mapped reads over {:.0}% coverage: {}",
            self.min_fraction * 100.0,
            ideal.len()
        );
        info!("Number of mapped alignments: {}", stats.total_alignments);
        debug!("Accepted mappings: {}", stats.mapped_names.len());

        let path_out = self
            .path_out
            .clone()
            .unwrap_or_else(|| default_refseq_path(self.aligner, &self.path_reads));
        write_refseq_fasta(&path_out, &ideal)?;
        info!("Saved ideal reads to {}", path_out.display());

        if let (Some(bin), Some(graph), Some(k)) = (&self.graph_aligner, &self.path_graph, self.k)
        {
            run_graph_aligner(bin, k, graph, &path_out)?;
        }

        log::info!("IdealReads has finished succesfully");
        Ok(())
    }

    fn verify_input_files(&self) -> Result<()> {
        for path in [&self.path_reads, &self.path_reference] {
            if !path.exists() {
                anyhow::bail!("Input file {} does not exist", path.display());
            }
        }
        Ok(())
    }

    fn verify_graph_aligner_args(&self) -> Result<()> {
        if self.graph_aligner.is_some() && (self.path_graph.is_none() || self.k.is_none()) {
            anyhow::bail!("--graph-aligner needs both --graph and -k");
        }
        Ok(())
    }
}

/// Align the extracted reads through the assembler's own graph aligner.
/// Its stdout goes to <refseq>.log and the mapping lands in <refseq>_mapping
fn run_graph_aligner(bin: &Path, k: u32, graph: &Path, path_refseq: &Path) -> Result<()> {
    let path_mapping = append_to_filename(path_refseq, "_mapping");
    let path_log = append_to_filename(path_refseq, ".log");

    let log_file = File::create(&path_log)
        .with_context(|| format!("Could not create {}", path_log.display()))?;

    let mut cmd = Command::new(bin);
    cmd.arg(k.to_string())
        .arg(graph)
        .arg(path_refseq)
        .arg(&path_mapping)
        .stdout(Stdio::from(log_file));
    info!(
        "Running: {} (stdout to {})",
        command_to_string(&cmd),
        path_log.display()
    );

    let status = cmd
        .status()
        .with_context(|| format!("Failed to execute {}", bin.display()))?;
    if !status.success() {
        anyhow::bail!("Graph aligner exited with {}", status);
    }
    Ok(())
}

fn append_to_filename(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_filename() {
        assert_eq!(
            append_to_filename(Path::new("/x/refseq_reads.fasta"), "_mapping"),
            Path::new("/x/refseq_reads.fasta_mapping")
        );
        assert_eq!(
            append_to_filename(Path::new("/x/refseq_reads.fasta"), ".log"),
            Path::new("/x/refseq_reads.fasta.log")
        );
    }
}
