// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The shared in-memory document.
//!
//! One `Document` owns the authoritative copy of the edited file plus a dirty flag, all behind a
//! single read/write lock. HTTP handlers read and replace it; the autosave loop flushes it.
//!
//! Flushing snapshots the content under the shared lock, releases it, and writes to disk without
//! holding any lock. A write that lands while the disk write is in flight bumps the revision, so
//! the flush leaves the document dirty and the next tick persists the newer content.
//!
//! Flushes themselves are serialized, so an older snapshot can never reach the disk after a
//! newer one.

use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;

use crate::store::{DocumentFile, FlushOutcome, StoreError};

#[derive(Debug, Default)]
struct DocumentState {
    content: Bytes,
    dirty: bool,
    revision: u64,
}

/// What a call to [`Document::flush_if_dirty`] did.
#[derive(Debug)]
pub enum FlushStatus {
    /// Nothing changed since the last successful flush; no I/O was performed.
    Clean,
    /// The snapshot was persisted and the document is clean again.
    Flushed(FlushOutcome),
    /// The snapshot was persisted, but a newer write arrived meanwhile; still dirty.
    Superseded(FlushOutcome),
}

impl FlushStatus {
    pub fn outcome(&self) -> Option<&FlushOutcome> {
        match self {
            Self::Clean => None,
            Self::Flushed(outcome) | Self::Superseded(outcome) => Some(outcome),
        }
    }
}

#[derive(Debug)]
pub struct Document {
    file: DocumentFile,
    state: RwLock<DocumentState>,
    flush_lock: Mutex<()>,
}

impl Document {
    /// Creates an empty, clean document bound to `file` without touching the disk.
    pub fn new(file: DocumentFile) -> Self {
        Self::with_content(file, Bytes::new())
    }

    pub fn with_content(file: DocumentFile, content: impl Into<Bytes>) -> Self {
        Self {
            file,
            state: RwLock::new(DocumentState {
                content: content.into(),
                dirty: false,
                revision: 0,
            }),
            flush_lock: Mutex::new(()),
        }
    }

    /// Loads the canonical file (creating it when absent) into a clean document.
    pub fn open(file: DocumentFile) -> Result<Self, StoreError> {
        let content = file.load()?;
        Ok(Self::with_content(file, content))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read(&self) -> Bytes {
        self.read_state().content.clone()
    }

    /// Runs `f` over the current content while holding the shared lock.
    pub fn read_with<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let state = self.read_state();
        f(&state.content)
    }

    pub fn len(&self) -> usize {
        self.read_state().content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.read_state().dirty
    }

    pub fn revision(&self) -> u64 {
        self.read_state().revision
    }

    /// Discards the previous content entirely and marks the document dirty.
    pub fn replace(&self, content: impl Into<Bytes>) {
        let content = content.into();
        let mut state = self.write_state();
        state.content = content;
        state.dirty = true;
        state.revision = state.revision.wrapping_add(1);
    }

    /// Persists the document if it changed since the last successful flush.
    ///
    /// A failed canonical write leaves the document dirty so the next call retries. Concurrent
    /// callers wait for each other; readers and writers are never blocked by a flush.
    pub fn flush_if_dirty(&self) -> Result<FlushStatus, StoreError> {
        self.flush_if_dirty_with(|file, content| file.flush(content))
    }

    fn flush_if_dirty_with(
        &self,
        persist: impl FnOnce(&DocumentFile, &[u8]) -> Result<FlushOutcome, StoreError>,
    ) -> Result<FlushStatus, StoreError> {
        let _flushing = self.flush_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (content, revision) = {
            let state = self.read_state();
            if !state.dirty {
                return Ok(FlushStatus::Clean);
            }
            (state.content.clone(), state.revision)
        };

        let outcome = persist(&self.file, &content[..])?;

        let mut state = self.write_state();
        if state.revision == revision {
            state.dirty = false;
            Ok(FlushStatus::Flushed(outcome))
        } else {
            Ok(FlushStatus::Superseded(outcome))
        }
    }

    // Every critical section leaves the state consistent, so a poisoned lock is still usable.
    fn read_state(&self) -> RwLockReadGuard<'_, DocumentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DocumentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
