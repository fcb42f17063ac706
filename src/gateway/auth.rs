// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHashString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};

use super::AppState;

pub const AUTH_REALM: &str = "Swagger Web";

/// The single username/password pair accepted by the server.
///
/// The password is kept only as a salted Argon2id hash (PHC string); presented passwords are
/// checked against it with the same parameters.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    username_digest: [u8; 32],
    password_hash: PasswordHashString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Hashes `password` with a fresh random salt.
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self, password_hash::Error> {
        let username = username.into();
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .serialize();

        Ok(Self {
            username_digest: digest(username.as_bytes()),
            username,
            password_hash,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = digest(username.as_bytes()).ct_eq(&self.username_digest);
        // Always run the password check so a wrong username costs the same as a wrong password.
        let password_ok = Argon2::default()
            .verify_password(password.as_bytes(), &self.password_hash.password_hash())
            .is_ok();
        (username_ok & Choice::from(u8::from(password_ok))).into()
    }

    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(parse_basic_authorization)
            .is_some_and(|(username, password)| self.verify(&username, &password))
    }
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Decodes an `Authorization: Basic <base64(user:pass)>` header value.
pub(super) fn parse_basic_authorization(value: &HeaderValue) -> Option<(String, String)> {
    let value = value.to_str().ok()?.trim();
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

pub(super) async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = state.credentials.clone();
    let headers = request.headers().clone();
    let verified = tokio::task::spawn_blocking(move || credentials.verify_headers(&headers)).await;
    match verified {
        Ok(true) => return next.run(request).await,
        Ok(false) => {}
        Err(err) => tracing::error!(error = %err, "credential check task failed"),
    }

    tracing::debug!(path = %request.uri().path(), "rejecting unauthenticated request");
    unauthorized()
}

fn unauthorized() -> Response {
    let challenge = format!("Basic realm=\"{AUTH_REALM}\"");
    let mut response = (StatusCode::UNAUTHORIZED, "401 Unauthorized\n").into_response();
    if let Ok(value) = HeaderValue::from_str(&challenge) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    response
}
