// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wires the document, the autosave loop, and the HTTP gateway into one running server.

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::autosave::{self, AutosaveHandle};
use crate::config::ServerConfig;
use crate::document::Document;
use crate::gateway::{self, AppState};
use crate::store::DocumentFile;

/// Loads the document and starts autosave for it.
///
/// A load failure is logged and leaves autosave disabled; the returned document is then empty
/// and the HTTP side keeps working against it.
pub fn start_sync(
    file: DocumentFile,
    config: &ServerConfig,
) -> (Arc<Document>, Option<AutosaveHandle>) {
    match Document::open(file.clone()) {
        Ok(document) => {
            tracing::info!(path = ?document.path(), bytes = document.len(), "document loaded");
            let document = Arc::new(document);
            let autosave = autosave::start(document.clone(), config.autosave_interval);
            (document, Some(autosave))
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load document; autosave disabled");
            (Arc::new(Document::new(file)), None)
        }
    }
}

/// Serves on `listener` until `shutdown` fires, then stops autosave after its final flush.
pub async fn serve(
    listener: TcpListener,
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let credentials = config
        .credentials()
        .map_err(|err| io::Error::other(format!("cannot hash password: {err}")))?;
    let (document, autosave) = start_sync(config.document_file(), config);

    let state = AppState::new(document, credentials, config.asset_source());
    let app = gateway::router(state, config.max_body_bytes);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await;

    if let Some(autosave) = autosave {
        autosave.shutdown().await;
    }
    result
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn run(config: ServerConfig) -> io::Result<()> {
    let listener = TcpListener::bind((config.bind_address, config.port)).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, document = ?config.document_path, "specpad listening");

    if config.open_browser {
        let url = format!("http://localhost:{}", local_addr.port());
        if let Err(err) = crate::browser::open_url(&url) {
            tracing::warn!(url = %url, error = %err, "could not open browser");
        }
    }

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("shutting down");
                    shutdown.cancel();
                }
                Err(err) => tracing::warn!(error = %err, "cannot listen for shutdown signal"),
            }
        }
    });

    serve(listener, &config, shutdown).await
}
