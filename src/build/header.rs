use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;

/// Name of the generated header. The tree synchronizer must never delete
/// a file with this name from a build tree
pub const KMER_HEADER_FILENAME: &str = "k.hpp";

/// Where the header lives inside a build tree
pub const KMER_HEADER_RELPATH: &str = "src/debruijn/k.hpp";

pub fn kmer_header_path(build_dir: &Path) -> PathBuf {
    build_dir.join(KMER_HEADER_RELPATH)
}

///////////////////////////////
/// Write the K configuration header for a build tree unless one is already
/// there. An existing header is left untouched whatever it contains, so a
/// hand-edited one survives re-runs. Returns true when the header was written
pub fn ensure_kmer_header(build_dir: &Path, k: u32) -> Result<bool> {
    let path = kmer_header_path(build_dir);
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&path, header_content(k))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

fn header_content(k: u32) -> String {
    format!(
        "#pragma once\n\nnamespace debruijn_graph {{\n  const size_t K = {};\n}}\n",
        k
    )
}
