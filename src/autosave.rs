// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Periodic background persistence of the shared document.
//!
//! One task ticks at a fixed interval and flushes the document when it is dirty. Flushes run on
//! the blocking pool and are awaited before the next tick, so they never overlap; a slow flush
//! delays the following tick instead of dropping it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::document::{Document, FlushStatus};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(2);
const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(1);

/// Owns the running autosave task.
#[derive(Debug)]
pub struct AutosaveHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl AutosaveHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stops the loop and waits for its final flush.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.join.await {
            tracing::error!(error = %err, "autosave task failed");
        }
    }
}

/// Spawns the autosave loop on the current tokio runtime.
pub fn start(document: Arc<Document>, interval: Duration) -> AutosaveHandle {
    let token = CancellationToken::new();
    let join = tokio::spawn(run(document, interval, token.clone()));
    AutosaveHandle { token, join }
}

async fn run(document: Arc<Document>, interval: Duration, token: CancellationToken) {
    let interval = interval.max(MIN_AUTOSAVE_INTERVAL);
    tracing::info!(path = ?document.path(), interval_ms = interval.as_millis() as u64, "autosave started");

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => flush_once(&document).await,
        }
    }

    flush_once(&document).await;
    tracing::info!(path = ?document.path(), "autosave stopped");
}

async fn flush_once(document: &Arc<Document>) {
    let document = document.clone();
    let result = tokio::task::spawn_blocking(move || document.flush_if_dirty()).await;

    match result {
        Ok(Ok(FlushStatus::Clean)) => tracing::debug!("document clean; nothing to save"),
        Ok(Ok(FlushStatus::Flushed(outcome))) => {
            tracing::info!(
                bytes = outcome.bytes_written,
                backup = ?outcome.backup_path,
                "document saved"
            );
        }
        Ok(Ok(FlushStatus::Superseded(outcome))) => {
            tracing::debug!(
                bytes = outcome.bytes_written,
                "document saved; newer edits pending for the next tick"
            );
        }
        Ok(Err(err)) => tracing::error!(error = %err, "document save failed; retrying next tick"),
        Err(err) => tracing::error!(error = %err, "document save task failed"),
    }
}
