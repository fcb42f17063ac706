// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};

/// `strftime` layout of the backup suffix: fixed width, lexically sortable, minute resolution.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Result of a flush whose canonical write succeeded.
///
/// The backup write is reported separately: a failed backup does not undo the canonical save.
#[derive(Debug)]
pub struct FlushOutcome {
    pub bytes_written: usize,
    pub backup_path: PathBuf,
    pub backup_error: Option<StoreError>,
}

impl FlushOutcome {
    pub fn backup_written(&self) -> bool {
        self.backup_error.is_none()
    }
}

/// The canonical on-disk location of the shared document.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `<path>_<YYYYMMDDHHMM>` for the given instant.
    ///
    /// Two instants inside the same local minute map to the same backup path.
    pub fn backup_path_at(&self, at: DateTime<Local>) -> PathBuf {
        let mut raw = OsString::from(self.path.as_os_str());
        raw.push("_");
        raw.push(at.format(BACKUP_TIMESTAMP_FORMAT).to_string());
        PathBuf::from(raw)
    }

    /// Reads the whole document, creating an empty file when none exists yet.
    ///
    /// A symlinked document path is followed; the link's target is read (or created).
    pub fn load(&self) -> Result<Vec<u8>, StoreError> {
        let target = resolve_target(&self.path)?;
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        match fs::read(&target) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                match fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&target)
                {
                    Ok(_) => Ok(Vec::new()),
                    // Lost a creation race; whoever won owns the content now.
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                        fs::read(&target).map_err(io_err)
                    }
                    Err(source) => Err(io_err(source)),
                }
            }
            Err(source) => Err(io_err(source)),
        }
    }

    /// Writes `contents` to the canonical path, then to the backup path for the current minute.
    ///
    /// The canonical write goes through a symlinked path to its target and keeps the existing
    /// file's permissions. Backups always sit next to the configured path.
    pub fn flush(&self, contents: &[u8]) -> Result<FlushOutcome, StoreError> {
        self.flush_at(contents, Local::now())
    }

    pub fn flush_at(
        &self,
        contents: &[u8],
        at: DateTime<Local>,
    ) -> Result<FlushOutcome, StoreError> {
        let target = resolve_target(&self.path)?;
        // Backups inherit the canonical file's mode so a private document stays private.
        let permissions = fs::metadata(&target).ok().map(|md| md.permissions());
        write_atomic(&target, contents, permissions.as_ref(), self.durability)?;

        let backup_path = self.backup_path_at(at);
        let backup_error =
            write_atomic(&backup_path, contents, permissions.as_ref(), self.durability).err();
        if let Some(err) = &backup_error {
            tracing::warn!(path = ?backup_path, error = %err, "backup write failed");
        }

        Ok(FlushOutcome {
            bytes_written: contents.len(),
            backup_path,
            backup_error,
        })
    }
}

include!("document_file/helpers.rs");

#[cfg(test)]
mod tests;
