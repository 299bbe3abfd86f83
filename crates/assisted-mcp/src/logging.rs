//! File logging with size-based rotation.
//!
//! All tracing output goes to `<directory>/<file_name>`. When a write would
//! push the file past `max_bytes`, the file is renamed to `<file_name>.1`,
//! existing backups shift up by one, and the oldest beyond `max_backups` is
//! dropped.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

pub const LOG_FILTER_ENV: &str = "ASSISTED_MCP_LOG";

pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: PathBuf, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            max_backups,
            file,
            written,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_backups == 0 {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
        } else {
            let oldest = self.backup_path(self.max_backups);
            if oldest.exists() {
                std::fs::remove_file(&oldest)?;
            }
            for index in (1..self.max_backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    std::fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            std::fs::rename(&self.path, self.backup_path(1))?;
            self.file = open_append(&self.path)?;
        }

        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0 && self.written > 0 && self.written + buf.len() as u64 > self.max_bytes
        {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Install the global subscriber, writing to the rotating log file.
///
/// The filter comes from `ASSISTED_MCP_LOG` and defaults to `info`.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let file = RotatingFile::open(config.path(), config.max_bytes, config.max_backups)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn creates_directory_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("mcp.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "old\n").unwrap();

        let mut file = RotatingFile::open(path.clone(), 1024, 2).unwrap();
        file.write_all(b"new\n").unwrap();
        file.flush().unwrap();

        assert_eq!(read(path), "old\nnew\n");
    }

    #[test]
    fn rotates_and_caps_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("mcp.log");
        let mut file = RotatingFile::open(path.clone(), 10, 2).unwrap();

        for line in ["first...\n", "second..\n", "third...\n", "fourth..\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(read(path.clone()), "fourth..\n");
        assert_eq!(read(file.backup_path(1)), "third...\n");
        assert_eq!(read(file.backup_path(2)), "second..\n");
        assert!(!file.backup_path(3).exists());
    }

    #[test]
    fn zero_backups_truncates_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mcp.log");
        let mut file = RotatingFile::open(path.clone(), 8, 0).unwrap();

        file.write_all(b"aaaaaa\n").unwrap();
        file.write_all(b"bbbbbb\n").unwrap();
        file.flush().unwrap();

        assert_eq!(read(path), "bbbbbb\n");
        assert!(!file.backup_path(1).exists());
    }
}
