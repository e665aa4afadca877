use std::path::PathBuf;

/// Directory under the output root where per-K build trees and their
/// lock files live. Shared between concurrent invocations
pub const PRECOMPILED_DIR: &str = "precompiled";

/// Subtrees of the assembler source home that get mirrored into every
/// build tree
pub const SOURCE_SUBDIR: &str = "src";
pub const EXT_SUBDIR: &str = "ext";

///////////////////////////////
/// Everything one build run needs to know. Assembled once from the
/// command line, then read-only
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// K values to compile, in the order they will be built
    pub k_values: Vec<u32>,

    /// Assembler source home. Must contain src/ and ext/
    pub source_home: PathBuf,

    /// Root under which precompiled/ is maintained
    pub output_root: PathBuf,

    /// Build system target produced for each K
    pub target: String,

    /// Parallelism handed to the build tool
    pub jobs: usize,
}

impl BuildConfig {
    pub fn precompiled_root(&self) -> PathBuf {
        self.output_root.join(PRECOMPILED_DIR)
    }

    /// Build tree for one K, precompiled/build<K>
    pub fn build_dir(&self, k: u32) -> PathBuf {
        self.precompiled_root().join(format!("build{}", k))
    }

    /// Lock file guarding one K, precompiled/lock<K>
    pub fn lock_path(&self, k: u32) -> PathBuf {
        self.precompiled_root().join(format!("lock{}", k))
    }
}
