use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use log::warn;

///////////////////////////////
/// Outcome of one tree reconciliation. All counters stay zero when the
/// destination already mirrored the source, which is what makes repeated
/// syncs of an unchanged tree observable as no-ops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub files_copied: usize,
    pub entries_removed: usize,
    pub dirs_created: usize,
}

impl SyncStats {
    pub fn is_noop(&self) -> bool {
        *self == SyncStats::default()
    }
}

///////////////////////////////
/// Mirror src into dest recursively. Files are recopied when modification
/// times differ numerically; each copy carries the source mtime forward so
/// an unchanged tree syncs to a no-op. Entries present in dest but absent
/// from src are removed, except names for which keep() returns true.
/// An entry whose kind changed between the trees is removed and recreated
pub fn sync_tree(src: &Path, dest: &Path, keep: &dyn Fn(&OsStr) -> bool) -> Result<SyncStats> {
    let mut stats = SyncStats::default();
    sync_entry(src, dest, keep, &mut stats)?;
    Ok(stats)
}

fn sync_entry(
    src: &Path,
    dest: &Path,
    keep: &dyn Fn(&OsStr) -> bool,
    stats: &mut SyncStats,
) -> Result<()> {
    if src.is_file() {
        sync_file(src, dest, stats)
    } else if src.is_dir() {
        sync_dir(src, dest, keep, stats)
    } else {
        //Sockets, fifos, dangling links. The build needs none of them
        warn!("Skipping non-regular source entry {}", src.display());
        Ok(())
    }
}

fn sync_file(src: &Path, dest: &Path, stats: &mut SyncStats) -> Result<()> {
    if dest.is_dir() {
        fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to remove directory {}", dest.display()))?;
        stats.entries_removed += 1;
    }

    let src_mtime = fs::metadata(src)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to stat {}", src.display()))?;

    let up_to_date = match fs::metadata(dest) {
        Ok(meta) => meta.modified()? == src_mtime,
        Err(_) => false,
    };
    if up_to_date {
        return Ok(());
    }

    fs::copy(src, dest).with_context(|| {
        format!("Failed to copy {} to {}", src.display(), dest.display())
    })?;

    //Change detection on the next run depends on the copy keeping the source mtime
    let dest_file = fs::OpenOptions::new()
        .write(true)
        .open(dest)
        .with_context(|| format!("Failed to reopen {}", dest.display()))?;
    dest_file
        .set_modified(src_mtime)
        .with_context(|| format!("Failed to set mtime on {}", dest.display()))?;

    stats.files_copied += 1;
    Ok(())
}

fn sync_dir(
    src: &Path,
    dest: &Path,
    keep: &dyn Fn(&OsStr) -> bool,
    stats: &mut SyncStats,
) -> Result<()> {
    if dest.exists() && !dest.is_dir() {
        fs::remove_file(dest)
            .with_context(|| format!("Failed to remove file {}", dest.display()))?;
        stats.entries_removed += 1;
    }
    if !dest.exists() {
        fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create directory {}", dest.display()))?;
        stats.dirs_created += 1;
    }

    //Sweep out entries the source no longer has, protected names excepted
    for entry in fs::read_dir(dest)
        .with_context(|| format!("Failed to list directory {}", dest.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if keep(&name) {
            continue;
        }
        if !src.join(&name).exists() {
            let stale = entry.path();
            if stale.is_dir() {
                fs::remove_dir_all(&stale)
                    .with_context(|| format!("Failed to remove directory {}", stale.display()))?;
            } else {
                fs::remove_file(&stale)
                    .with_context(|| format!("Failed to remove file {}", stale.display()))?;
            }
            stats.entries_removed += 1;
        }
    }

    for entry in fs::read_dir(src)
        .with_context(|| format!("Failed to list directory {}", src.display()))?
    {
        let entry = entry?;
        sync_entry(&entry.path(), &dest.join(entry.file_name()), keep, stats)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::PathBuf;
    use std::time::Duration;
    use std::time::SystemTime;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn set_mtime(path: &Path, mtime: SystemTime) {
        let f = fs::OpenOptions::new().write(true).open(path).unwrap();
        f.set_modified(mtime).unwrap();
    }

    fn keep_nothing(_name: &OsStr) -> bool {
        false
    }

    fn scratch() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        (dir, src, dest)
    }

    #[test]
    fn test_fresh_copy_and_idempotence() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("a.cpp"), "int main(){}\n");
        write_file(&src.join("nested/b.hpp"), "#pragma once\n");

        let first = sync_tree(&src, &dest, &keep_nothing).unwrap();
        assert_eq!(first.files_copied, 2);
        assert!(first.dirs_created >= 2);
        assert_eq!(
            fs::read_to_string(dest.join("nested/b.hpp")).unwrap(),
            "#pragma once\n"
        );

        //Same tree again: nothing to do
        let second = sync_tree(&src, &dest, &keep_nothing).unwrap();
        assert!(second.is_noop(), "expected no-op, got {:?}", second);
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("a.cpp"), "x");
        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        set_mtime(&src.join("a.cpp"), old);

        sync_tree(&src, &dest, &keep_nothing).unwrap();

        let copied = fs::metadata(dest.join("a.cpp")).unwrap().modified().unwrap();
        assert_eq!(copied, old);
    }

    #[test]
    fn test_recopy_on_mtime_change() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("a.cpp"), "v1");
        sync_tree(&src, &dest, &keep_nothing).unwrap();

        write_file(&src.join("a.cpp"), "v2");
        set_mtime(
            &src.join("a.cpp"),
            SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000),
        );

        let stats = sync_tree(&src, &dest, &keep_nothing).unwrap();
        assert_eq!(stats.files_copied, 1);
        assert_eq!(fs::read_to_string(dest.join("a.cpp")).unwrap(), "v2");
    }

    #[test]
    fn test_stale_entries_removed() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("keep.cpp"), "k");
        write_file(&dest.join("gone.cpp"), "g");
        fs::create_dir_all(dest.join("gone_dir/inner")).unwrap();

        let stats = sync_tree(&src, &dest, &keep_nothing).unwrap();
        assert_eq!(stats.entries_removed, 2);
        assert!(dest.join("keep.cpp").exists());
        assert!(!dest.join("gone.cpp").exists());
        assert!(!dest.join("gone_dir").exists());
    }

    #[test]
    fn test_protected_name_survives() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("debruijn/graph.cpp"), "g");
        write_file(&dest.join("debruijn/k.hpp"), "const size_t K = 55;\n");
        write_file(&dest.join("debruijn/stale.cpp"), "s");

        let keep = |name: &OsStr| name == OsStr::new("k.hpp");
        sync_tree(&src, &dest, &keep).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("debruijn/k.hpp")).unwrap(),
            "const size_t K = 55;\n"
        );
        assert!(!dest.join("debruijn/stale.cpp").exists());
        assert!(dest.join("debruijn/graph.cpp").exists());
    }

    #[test]
    fn test_kind_change_file_to_dir() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("thing/part.cpp"), "p");
        write_file(&dest.join("thing"), "was a file");

        let stats = sync_tree(&src, &dest, &keep_nothing).unwrap();
        assert_eq!(stats.entries_removed, 1);
        assert!(dest.join("thing").is_dir());
        assert_eq!(fs::read_to_string(dest.join("thing/part.cpp")).unwrap(), "p");
    }

    #[test]
    fn test_kind_change_dir_to_file() {
        let (_dir, src, dest) = scratch();
        write_file(&src.join("thing"), "now a file");
        fs::create_dir_all(dest.join("thing/old")).unwrap();
        File::create(dest.join("thing/old/x.cpp")).unwrap();

        let stats = sync_tree(&src, &dest, &keep_nothing).unwrap();
        assert_eq!(stats.entries_removed, 1);
        assert!(dest.join("thing").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("thing")).unwrap(),
            "now a file"
        );
    }
}
