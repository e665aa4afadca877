pub mod aligner;
pub mod extract;

pub use aligner::align_reads_to_reference;
pub use aligner::default_refseq_path;
pub use aligner::Aligner;
pub use aligner::ReadTech;
pub use extract::extract_ideal_reads;
pub use extract::read_reference_fasta;
pub use extract::read_sequence_lengths;
pub use extract::write_refseq_fasta;
pub use extract::ExtractStats;
