use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes each `(name, source)` pair into a fresh directory
pub fn sources(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("could not create directory");
    let paths = files
        .iter()
        .map(|(name, src)| {
            let path = dir.path().join(name);
            fs::write(&path, src).expect("could not write source");
            path
        })
        .collect();
    (dir, paths)
}
