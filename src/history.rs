// history.rs

use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cell::Grid;
use crate::config::HistoryConfig;
use crate::encoder::RowEncoder;
use crate::error::HistoryError;

const DEFAULT_NAME: &str = "st";

/// The rotating on-disk scrollback log.
///
/// Holds at most `max_rows` rows: once that many rows have been written the
/// file is truncated and writing restarts at offset zero. When the storage
/// could not be set up the log is disabled and every operation is a no-op.
#[derive(Debug)]
pub struct HistoryLog {
    file: Option<File>,
    path: Option<PathBuf>,
    rows: usize,
    max_rows: usize,
    encoder: RowEncoder,
}

impl HistoryLog {
    /// Create `<dir>/<program>.<pid>` and open it for writing. Failures are
    /// logged and produce a disabled log.
    pub fn open(config: &HistoryConfig, program: &str) -> Self {
        let mut log = Self::disabled(config);

        if let Err(e) = ensure_dir(&config.dir) {
            warn!("history disabled: {}", e);
            return log;
        }

        let path = history_path(&config.dir, program);
        match open_truncated(&path) {
            Ok(file) => {
                debug!(path = %path.display(), max_rows = log.max_rows, "history log opened");
                log.file = Some(file);
            }
            Err(e) => warn!("history disabled: {}", e),
        }
        log.path = Some(path);
        log
    }

    pub fn disabled(config: &HistoryConfig) -> Self {
        Self {
            file: None,
            path: None,
            rows: 0,
            max_rows: config.max_rows.max(1),
            encoder: RowEncoder::new(config.color),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the backing file, if the storage directory was usable.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows written since the file was last emptied.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Append row `y` of `grid`, rotating the file when it is full.
    pub fn write_row<G: Grid + ?Sized>(&mut self, grid: &G, y: usize) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        if let Err(e) = self.encoder.encode_row(grid, y, file) {
            warn!("{}", HistoryError::Write(e));
        }

        self.rows += 1;
        if self.rows >= self.max_rows {
            debug!(rows = self.rows, "history full, rotating");
            self.reset();
        }
    }

    /// Empty the file and start over.
    pub fn reset(&mut self) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        self.rows = 0;
        self.encoder.reset();
        if let Err(e) = truncate(file) {
            warn!("{}", HistoryError::Truncate(e));
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), HistoryError> {
    match DirBuilder::new().recursive(true).mode(0o700).create(dir) {
        Ok(()) if dir.is_dir() => Ok(()),
        Ok(()) => Err(HistoryError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && !dir.is_dir() => {
            Err(HistoryError::NotADirectory(dir.to_path_buf()))
        }
        Err(source) => Err(HistoryError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

fn history_path(dir: &Path, program: &str) -> PathBuf {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_NAME);
    dir.join(format!("{}.{}", name, std::process::id()))
}

fn open_truncated(path: &Path) -> Result<File, HistoryError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|source| HistoryError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

fn truncate(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(())
}
