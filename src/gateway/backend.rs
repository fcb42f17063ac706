// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::assets::sniff_content_type;
use super::AppState;

pub(super) async fn read_document(State(state): State<AppState>) -> Response {
    let content = state.document.read();
    let content_type = sniff_content_type(&content);
    ([(header::CONTENT_TYPE, content_type)], content).into_response()
}

/// Replaces the whole document with the request body.
///
/// A body that cannot be read completely is rejected without touching the document.
pub(super) async fn replace_document(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => {
            let len = body.len();
            state.document.replace(body);
            tracing::debug!(bytes = len, "document replaced");
            StatusCode::OK.into_response()
        }
        Err(rejection) => {
            tracing::warn!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "failed to read document body"
            );
            rejection.into_response()
        }
    }
}
