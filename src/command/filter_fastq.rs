use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use itertools::Itertools;
use log::debug;
use log::info;
use log::warn;

/// Lines per FASTQ record: header, sequence, separator, quality
pub const FASTQ_RECORD_LINES: usize = 4;

///////////////////////////////
/// Salvage readable records from a FASTQ with corrupt stretches, such as
/// dumps recovered from failing disks
#[derive(Args)]
pub struct FilterFastqCMD {
    #[arg(short = 'i', value_parser = clap::value_parser!(PathBuf))]
    /// Damaged FASTQ file, plain or compressed
    pub path_in: PathBuf,

    #[arg(short = 'o', value_parser = clap::value_parser!(PathBuf))]
    /// Where to write the surviving records, uncompressed
    pub path_out: PathBuf,
}
impl FilterFastqCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        self.verify_input_file()?;

        let opened_handle = File::open(&self.path_in)
            .with_context(|| format!("Could not open fastq file {}", self.path_in.display()))?;
        let (reader, compression) = niffler::get_reader(Box::new(opened_handle))
            .with_context(|| format!("Could not open fastq file {}", self.path_in.display()))?;
        debug!(
            "Opened file {} with compression {:?}",
            self.path_in.display(),
            compression
        );
        let mut reader = BufReader::new(reader);

        let file_out = File::create(&self.path_out)
            .with_context(|| format!("Could not create {}", self.path_out.display()))?;
        let mut writer = BufWriter::new(file_out);

        let report = filter_broken_records(&mut reader, &mut writer)?;
        writer.flush()?;

        info!(
            "Wrote {} reads; dropped {} broken region(s)",
            report.records_written,
            report.broken_regions.len()
        );
        log::info!("FilterFastq has finished succesfully");
        Ok(())
    }

    fn verify_input_file(&self) -> Result<()> {
        if !self.path_in.exists() {
            anyhow::bail!("Input file {} does not exist", self.path_in.display());
        }
        Ok(())
    }
}

///////////////////////////////
/// One stretch of corrupt input. at_record is the ordinal the record being
/// assembled would have had (accepted records so far + 1); lines holds the
/// partial group that triggered detection and last_good the most recent
/// complete record before it
#[derive(Debug, Clone)]
pub struct BrokenRegion {
    pub at_record: u64,
    pub lines: Vec<Vec<u8>>,
    pub last_good: Option<Vec<Vec<u8>>>,
}

#[derive(Debug, Default)]
pub struct FilterReport {
    pub records_written: u64,
    pub broken_regions: Vec<BrokenRegion>,
    pub truncated_at_eof: bool,
}

///////////////////////////////
/// Scan the input as groups of four lines and write only complete groups
/// that look like FASTQ records (line 0 starting with '@', line 2 with '+').
/// On a malformed line the accumulated group is dropped and assembly
/// restarts at the next line; consecutive malformed groups collapse into
/// one reported region. Lines pass through byte for byte, so records that
/// survive are written exactly as they came in
pub fn filter_broken_records<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<FilterReport> {
    let mut report = FilterReport::default();
    let mut cur_lines: Vec<Vec<u8>> = Vec::new();
    let mut prev_record: Option<Vec<Vec<u8>>> = None;
    let mut in_broken_region = false;
    let mut i = 0;

    let mut line = Vec::new();
    loop {
        line.clear();
        let n = input
            .read_until(b'\n', &mut line)
            .context("Failed to read input")?;
        if n == 0 {
            break;
        }
        cur_lines.push(line.clone());

        let malformed =
            (i == 0 && !line.starts_with(b"@")) || (i == 2 && !line.starts_with(b"+"));
        if malformed {
            if !in_broken_region {
                warn!(
                    "Broken region at record {}; group so far: {}; last good read: {}",
                    report.records_written + 1,
                    render_lines(&cur_lines),
                    prev_record
                        .as_deref()
                        .map(render_lines)
                        .unwrap_or_else(|| "<none>".to_string())
                );
                report.broken_regions.push(BrokenRegion {
                    at_record: report.records_written + 1,
                    lines: cur_lines.clone(),
                    last_good: prev_record.clone(),
                });
            }
            in_broken_region = true;
            cur_lines.clear();
            i = 0;
            continue;
        }

        i += 1;
        if i == FASTQ_RECORD_LINES {
            in_broken_region = false;
            for l in &cur_lines {
                output.write_all(l).context("Failed to write output")?;
            }
            report.records_written += 1;
            prev_record = Some(std::mem::take(&mut cur_lines));
            i = 0;
        }
    }

    if !cur_lines.is_empty() {
        warn!(
            "Input ends mid-record; dropping {} trailing line(s)",
            cur_lines.len()
        );
        report.truncated_at_eof = true;
    }
    Ok(report)
}

fn render_lines(lines: &[Vec<u8>]) -> String {
    lines
        .iter()
        .map(|l| String::from_utf8_lossy(l).trim_end().to_string())
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_filter(input: &[u8]) -> (Vec<u8>, FilterReport) {
        let mut reader = Cursor::new(input.to_vec());
        let mut output = Vec::new();
        let report = filter_broken_records(&mut reader, &mut output).unwrap();
        (output, report)
    }

    const READ1: &[u8] = b"@read1\nACGT\n+\nIIII\n";
    const READ2: &[u8] = b"@read2\nTTAA\n+\nIIII\n";
    const READ4: &[u8] = b"@read4\nGGCC\n+\nIIII\n";

    #[test]
    fn test_clean_input_passes_through() {
        let input = [READ1, READ2].concat();
        let (output, report) = run_filter(&input);
        assert_eq!(output, input);
        assert_eq!(report.records_written, 2);
        assert!(report.broken_regions.is_empty());
        assert!(!report.truncated_at_eof);
    }

    #[test]
    fn test_filler_region_dropped_and_reported_once() {
        //Two good reads, then the kind of nul filler a dying disk leaves,
        //then a good read again
        let filler = b"\x00@\x00@\x00@\n\x00\x00\x00\n\x00@\x00\n";
        let input = [READ1, READ2, filler, READ4].concat();

        let (output, report) = run_filter(&input);
        assert_eq!(output, [READ1, READ2, READ4].concat());
        assert_eq!(report.records_written, 3);
        assert_eq!(report.broken_regions.len(), 1);

        let region = &report.broken_regions[0];
        assert_eq!(region.at_record, 3);
        assert_eq!(region.lines, vec![b"\x00@\x00@\x00@\n".to_vec()]);
        let last_good = region.last_good.as_ref().unwrap();
        assert_eq!(last_good[0], b"@read2\n".to_vec());
    }

    #[test]
    fn test_bad_separator_drops_group() {
        let bad = b"@read2\nTTAA\n*\nIIII\n";
        let input = [READ1, bad, READ4].concat();

        let (output, report) = run_filter(&input);
        assert_eq!(output, [READ1, READ4].concat());
        assert_eq!(report.records_written, 2);
        assert_eq!(report.broken_regions.len(), 1);

        //Detection fires on the separator line, with the group accumulated so far
        let region = &report.broken_regions[0];
        assert_eq!(region.at_record, 2);
        assert_eq!(
            region.lines,
            vec![b"@read2\n".to_vec(), b"TTAA\n".to_vec(), b"*\n".to_vec()]
        );
    }

    #[test]
    fn test_truncated_tail_dropped() {
        let input = [READ1, &b"@read2\nTTAA\n"[..]].concat();
        let (output, report) = run_filter(&input);
        assert_eq!(output, READ1.to_vec());
        assert_eq!(report.records_written, 1);
        assert!(report.truncated_at_eof);
    }

    #[test]
    fn test_missing_final_newline_kept() {
        let input = [READ2, &b"@read5\nACGT\n+\nII"[..]].concat();
        let (output, report) = run_filter(&input);
        assert_eq!(output, input);
        assert_eq!(report.records_written, 2);
        assert!(!report.truncated_at_eof);
    }
}
