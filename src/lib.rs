// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Specpad: a shared API-spec document served over HTTP and autosaved to disk.
//!
//! One in-memory [`document::Document`] is edited through `GET/PUT /backend`, flushed by the
//! [`autosave`] loop every couple of seconds when dirty, and written to its canonical file plus
//! a minute-stamped backup by the [`store`].

pub mod autosave;
pub mod browser;
pub mod config;
pub mod document;
pub mod gateway;
pub mod logging;
pub mod server;
pub mod store;
