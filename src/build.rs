pub mod config;
pub mod header;
pub mod invoke;
pub mod lock;
pub mod sync;

pub use config::BuildConfig;
pub use header::ensure_kmer_header;
pub use invoke::configure_and_build;
pub use lock::BuildLock;
pub use sync::sync_tree;
pub use sync::SyncStats;
