//! Temp-file writer for downloads.
//!
//! Bytes go to `<destination>.part`; only a complete transfer is renamed onto
//! the destination. A `PartFile` dropped without `finalize` removes its temp
//! file, so a failed fetch never leaves anything that looks like a result.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix of in-progress downloads.
pub const PART_SUFFIX: &str = ".part";

/// Returns `<destination>.part`.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Sequential writer for one in-progress download.
#[derive(Debug)]
pub struct PartFile {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) the part file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = part_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PartFile {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    /// Append a chunk.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "part file already closed"))?;
        file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync and atomically rename onto the final path. Returns bytes written.
    pub fn finalize(mut self) -> Result<u64> {
        if let Some(file) = self.file.take() {
            file.sync_all().context("part file sync failed")?;
        }
        std::fs::rename(&self.temp_path, &self.final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                self.temp_path.display(),
                self.final_path.display()
            )
        })?;
        // Renamed: nothing left for Drop to clean up.
        self.temp_path = PathBuf::new();
        Ok(self.written)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        self.file.take();
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::debug!(path = %self.temp_path.display(), "removed partial download"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.temp_path.display(), "could not remove partial download: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("patti/patto_42.pdf")),
            PathBuf::from("patti/patto_42.pdf.part")
        );
    }

    #[test]
    fn finalize_renames_and_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        let mut part = PartFile::create(&dest).unwrap();
        part.write_chunk(b"%PDF-").unwrap();
        part.write_chunk(b"1.4").unwrap();
        assert!(part.temp_path().exists());
        let n = part.finalize().unwrap();
        assert_eq!(n, 8);
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4");
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn drop_without_finalize_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        {
            let mut part = PartFile::create(&dest).unwrap();
            part.write_chunk(b"half").unwrap();
        }
        assert!(!part_path(&dest).exists());
        assert!(!dest.exists());
    }

    #[test]
    fn failed_rewrite_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        std::fs::write(&dest, b"old").unwrap();
        {
            let mut part = PartFile::create(&dest).unwrap();
            part.write_chunk(b"new but incomplete").unwrap();
        }
        assert_eq!(std::fs::read(&dest).unwrap(), b"old");
    }
}
