// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for the shared document on disk.
//!
//! The store module reads the canonical document file at startup and writes it back (plus a
//! timestamped backup copy) whenever the autosave loop flushes a dirty document.

pub mod document_file;

pub use document_file::{DocumentFile, FlushOutcome, StoreError, WriteDurability};
