use std::io;
use std::path::Path;
use std::path::PathBuf;

use path_clean::PathClean;

/// Absolute, lexically cleaned form of a possibly relative path.
/// Paths handed to child processes running in another working directory
/// must go through this first
pub fn to_absolute_path(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    }
    .clean();

    Ok(absolute_path)
}
