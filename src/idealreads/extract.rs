use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use bio::alphabets::dna;
use bio::io::fasta;
use log::warn;
use rust_htslib::bam::record::Record as BamRecord;
use rust_htslib::bam::Read;

///////////////////////////////
/// Counters from one BAM traversal. mapped_names gets one entry per
/// accepted mapping, so a read whose best mapping was replaced shows up
/// more than once
#[derive(Debug, Default)]
pub struct ExtractStats {
    pub total_alignments: u64,
    pub mapped_names: Vec<String>,
}

/// True when a mapping of candidate_len should become the kept one: it has
/// to cover more than min_fraction of the read and beat the current holder
fn replaces_current(
    current: Option<&Vec<u8>>,
    candidate_len: usize,
    read_len: usize,
    min_fraction: f64,
) -> bool {
    if candidate_len as f64 <= min_fraction * read_len as f64 {
        return false;
    }
    match current {
        Some(held) => held.len() < candidate_len,
        None => true,
    }
}

///////////////////////////////
/// Walk all alignments in the BAM and keep, per read name, the reference
/// substring under the longest mapping that covers more than min_fraction
/// of the read. Substrings of reverse mappings are reverse-complemented so
/// the result reads in the read's own orientation
pub fn extract_ideal_reads(
    path_bam: &Path,
    reference: &HashMap<String, Vec<u8>>,
    read_lengths: &HashMap<String, usize>,
    min_fraction: f64,
) -> Result<(BTreeMap<String, Vec<u8>>, ExtractStats)> {
    let mut bam = rust_htslib::bam::Reader::from_path(path_bam)?;

    let mut ideal: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut stats = ExtractStats::default();

    let mut record = BamRecord::new();
    while let Some(r) = bam.read(&mut record) {
        r?;
        if record.is_unmapped() || record.tid() < 0 {
            continue;
        }

        let start = record.pos();
        let end = record.cigar().end_pos();
        if start < 0 || end <= start {
            continue;
        }
        stats.total_alignments += 1;

        let name = String::from_utf8_lossy(record.qname()).into_owned();
        let read_len = match read_lengths.get(&name) {
            Some(&len) => len,
            None => {
                warn!("Alignment of {} has no matching input read, skipping", name);
                continue;
            }
        };

        let header = bam.header();
        let chr = String::from_utf8_lossy(header.tid2name(record.tid() as u32)).into_owned();
        let refseq = match reference.get(&chr) {
            Some(seq) => seq,
            None => {
                warn!("Reference {} not present in the FASTA, skipping", chr);
                continue;
            }
        };

        //The slice must stay inside the sequence even when the reference is
        //shorter than the BAM header claims
        let start = start as usize;
        let end = (end as usize).min(refseq.len());
        if start >= end {
            continue;
        }

        if replaces_current(ideal.get(&name), end - start, read_len, min_fraction) {
            let substring = if record.is_reverse() {
                dna::revcomp(&refseq[start..end])
            } else {
                refseq[start..end].to_vec()
            };
            ideal.insert(name.clone(), substring);
            stats.mapped_names.push(name);
        }
    }

    Ok((ideal, stats))
}

///////////////////////////////
/// FASTA plumbing around the extraction

pub fn read_reference_fasta(path: &Path) -> Result<HashMap<String, Vec<u8>>> {
    let file =
        File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let reader = fasta::Reader::from_bufread(BufReader::new(file));
    let mut sequences = HashMap::new();
    for res_record in reader.records() {
        let record = res_record?;
        sequences.insert(record.id().to_string(), record.seq().to_vec());
    }
    Ok(sequences)
}

pub fn read_sequence_lengths(path: &Path) -> Result<HashMap<String, usize>> {
    let file =
        File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let reader = fasta::Reader::from_bufread(BufReader::new(file));
    let mut lengths = HashMap::new();
    for res_record in reader.records() {
        let record = res_record?;
        lengths.insert(record.id().to_string(), record.seq().len());
    }
    Ok(lengths)
}

/// Name order is the map's order, so output is deterministic
pub fn write_refseq_fasta(path: &Path, sequences: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
    let mut writer = fasta::Writer::from_bufwriter(BufWriter::new(file));
    for (name, seq) in sequences {
        writer.write(name, None, seq)?;
    }
    writer.flush()?;
    Ok(())
}
