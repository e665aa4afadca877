use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use log::info;

use crate::utils::command_to_string;
use crate::utils::run_tool_checked;

///////////////////////////////
/// External aligner used to map the reads onto the reference
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Aligner {
    Bwa,
    Minimap2,
}

///////////////////////////////
/// Long-read technology of the input; selects the aligner preset
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReadTech {
    Pacbio,
    Nanopore,
}

impl Aligner {
    pub fn tool_name(&self) -> &'static str {
        match self {
            Aligner::Bwa => "bwa",
            Aligner::Minimap2 => "minimap2",
        }
    }

    pub fn preset(&self, tech: ReadTech) -> &'static str {
        match (self, tech) {
            (Aligner::Bwa, ReadTech::Pacbio) => "pacbio",
            (Aligner::Bwa, ReadTech::Nanopore) => "ont2d",
            (Aligner::Minimap2, ReadTech::Pacbio) => "map-pb",
            (Aligner::Minimap2, ReadTech::Nanopore) => "map-ont",
        }
    }

    /// Output name prefix kept from the workflows this replaces, so
    /// downstream tooling finds the file it expects
    fn refseq_prefix(&self) -> &'static str {
        match self {
            Aligner::Bwa => "refseq_bwamem_",
            Aligner::Minimap2 => "refseq_",
        }
    }
}

/// Default output FASTA: aligner specific prefix + the reads file name,
/// placed next to the reads
pub fn default_refseq_path(aligner: Aligner, path_reads: &Path) -> PathBuf {
    let name = path_reads
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reads.fasta".to_string());
    path_reads.with_file_name(format!("{}{}", aligner.refseq_prefix(), name))
}

/// The BAM lands next to the reads as <reads stem>_origin.bam
pub fn bam_output_path(path_reads: &Path) -> PathBuf {
    let stem = path_reads
        .file_stem()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reads".to_string());
    path_reads.with_file_name(format!("{}_origin.bam", stem))
}

///////////////////////////////
/// Map the reads onto the reference and convert the alignment to a BAM by
/// piping the aligner's SAM output through samtools. bwa needs an index of
/// the reference first; minimap2 builds its own on the fly.
/// Returns the path of the written BAM
pub fn align_reads_to_reference(
    aligner: Aligner,
    tech: ReadTech,
    path_reads: &Path,
    path_reference: &Path,
    threads: usize,
) -> Result<PathBuf> {
    if aligner == Aligner::Bwa {
        info!("Indexing reference {}", path_reference.display());
        let mut index = Command::new("bwa");
        index.arg("index").arg(path_reference);
        run_tool_checked(&mut index, "bwa index")?;
    }

    let path_bam = bam_output_path(path_reads);
    info!(
        "Aligning {} onto {} with {} (preset {})",
        path_reads.display(),
        path_reference.display(),
        aligner.tool_name(),
        aligner.preset(tech)
    );

    let mut align = match aligner {
        Aligner::Bwa => {
            let mut c = Command::new("bwa");
            c.arg("mem");
            c
        }
        Aligner::Minimap2 => {
            let mut c = Command::new("minimap2");
            c.arg("-a");
            c
        }
    };
    align
        .arg("-x")
        .arg(aligner.preset(tech))
        .arg("-t")
        .arg(threads.to_string())
        .arg(path_reference)
        .arg(path_reads)
        .stdout(Stdio::piped());

    debug!("Running: {}", command_to_string(&align));
    let mut align_child = align
        .spawn()
        .with_context(|| format!("Failed to spawn {}", aligner.tool_name()))?;
    let align_stdout = align_child
        .stdout
        .take()
        .context("Aligner stdout was not captured")?;

    let mut view = Command::new("samtools");
    view.arg("view")
        .arg("-b")
        .arg("-o")
        .arg(&path_bam)
        .arg("-")
        .stdin(Stdio::from(align_stdout));
    debug!("Running: {}", command_to_string(&view));
    let mut view_child = view.spawn().context("Failed to spawn samtools")?;

    let align_status = align_child.wait()?;
    let view_status = view_child.wait()?;
    if !align_status.success() {
        bail!("{} exited with {}", aligner.tool_name(), align_status);
    }
    if !view_status.success() {
        bail!("samtools view exited with {}", view_status);
    }
    Ok(path_bam)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(Aligner::Bwa.preset(ReadTech::Pacbio), "pacbio");
        assert_eq!(Aligner::Bwa.preset(ReadTech::Nanopore), "ont2d");
        assert_eq!(Aligner::Minimap2.preset(ReadTech::Pacbio), "map-pb");
        assert_eq!(Aligner::Minimap2.preset(ReadTech::Nanopore), "map-ont");
    }

    #[test]
    fn test_output_paths() {
        let reads = Path::new("/data/sim/reads.fasta");
        assert_eq!(
            bam_output_path(reads),
            Path::new("/data/sim/reads_origin.bam")
        );
        assert_eq!(
            default_refseq_path(Aligner::Bwa, reads),
            Path::new("/data/sim/refseq_bwamem_reads.fasta")
        );
        assert_eq!(
            default_refseq_path(Aligner::Minimap2, reads),
            Path::new("/data/sim/refseq_reads.fasta")
        );
    }
}
