// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Logging setup.
//!
//! Logs go to stderr through `tracing-subscriber`. `RUST_LOG` selects the filter; the default
//! is `info`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
