use std::fs::DirBuilder;
use std::io;
use std::path::Path;

/// Makes sure `path` exists as a directory, creating missing parents.
///
/// New directories get mode `0755` on unix. An existing directory is left
/// untouched and is not an error.
pub fn ensure_log_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}
