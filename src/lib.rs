pub mod build;
pub mod command;
pub mod idealreads;
pub mod utils;

pub use build::BuildConfig;
pub use build::SyncStats;
