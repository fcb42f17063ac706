// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP access gateway.
//!
//! `GET /backend` returns the shared document verbatim and `PUT /backend` replaces it wholesale.
//! Every other GET is answered from the editor UI assets. All routes require HTTP Basic auth.

mod assets;
mod auth;
mod backend;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Router};

use crate::document::Document;

pub use assets::{sniff_content_type, AssetSource};
pub use auth::{Credentials, AUTH_REALM};

pub const BACKEND_ROUTE: &str = "/backend";

/// Shared handler state; cloned per request.
#[derive(Debug, Clone)]
pub struct AppState {
    document: Arc<Document>,
    credentials: Arc<Credentials>,
    assets: Arc<AssetSource>,
}

impl AppState {
    pub fn new(document: Arc<Document>, credentials: Credentials, assets: AssetSource) -> Self {
        Self {
            document,
            credentials: Arc::new(credentials),
            assets: Arc::new(assets),
        }
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            BACKEND_ROUTE,
            get(backend::read_document).put(backend::replace_document),
        )
        .fallback(assets::serve_asset)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .with_state(state)
}
