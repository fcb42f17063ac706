// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use super::AppState;

const BUILTIN_EDITOR_PATH: &str = "builtin";
const INDEX_FILE: &str = "index.html";
const SNIFF_LEN: usize = 512;

static BUILTIN_ASSETS: &[(&str, &[u8])] = &[
    ("index.html", include_bytes!("../../assets/editor/index.html")),
    ("editor.js", include_bytes!("../../assets/editor/editor.js")),
    ("editor.css", include_bytes!("../../assets/editor/editor.css")),
];

/// Where the editor UI files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// The small editor bundled into the binary.
    Builtin,
    /// An editor installation directory on disk.
    Directory(PathBuf),
}

impl AssetSource {
    /// Maps the `--editor-path` value; the literal `builtin` selects the bundled editor.
    pub fn from_editor_path(raw: &str) -> Self {
        if raw == BUILTIN_EDITOR_PATH {
            Self::Builtin
        } else {
            Self::Directory(PathBuf::from(raw))
        }
    }

    /// Returns the asset for a request path, or `None` when it does not exist or is not servable.
    pub fn load(&self, request_path: &str) -> io::Result<Option<(String, Cow<'static, [u8]>)>> {
        let Some(relative) = normalize_request_path(request_path) else {
            return Ok(None);
        };

        match self {
            Self::Builtin => Ok(BUILTIN_ASSETS
                .iter()
                .find(|(name, _)| *name == relative)
                .map(|(name, bytes)| ((*name).to_owned(), Cow::Borrowed(*bytes)))),
            Self::Directory(root) => load_from_directory(root, &relative),
        }
    }
}

/// Percent-decodes the request path and reduces it to a safe relative path.
///
/// `/` and directory paths resolve to their `index.html`; anything that is not a plain
/// sequence of normal components (`..`, drive prefixes, NUL bytes) is refused.
fn normalize_request_path(request_path: &str) -> Option<String> {
    let decoded = percent_decode(request_path)?;
    if decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }

    let mut parts = Vec::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() || decoded.ends_with('/') {
        parts.push(INDEX_FILE.to_owned());
    }
    Some(parts.join("/"))
}

fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let hex = bytes.get(idx + 1..idx + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            idx += 3;
        } else {
            out.push(bytes[idx]);
            idx += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn load_from_directory(
    root: &Path,
    relative: &str,
) -> io::Result<Option<(String, Cow<'static, [u8]>)>> {
    let root = match fs::canonicalize(root) {
        Ok(root) => root,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut candidate = match fs::canonicalize(root.join(relative)) {
        Ok(candidate) => candidate,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    // Symlinks may not lead outside the installation directory.
    if !candidate.starts_with(&root) {
        return Ok(None);
    }

    let mut name = relative.to_owned();
    if candidate.is_dir() {
        candidate.push(INDEX_FILE);
        name = format!("{relative}/{INDEX_FILE}");
        if !candidate.is_file() {
            return Ok(None);
        }
    }

    match fs::read(&candidate) {
        Ok(bytes) => Ok(Some((name, Cow::Owned(bytes)))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Content type for an asset: sniffed from its bytes, then overridden by file extension.
pub(super) fn asset_content_type(name: &str, bytes: &[u8]) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("js" | "mjs") => "application/javascript",
        Some("css") => "text/css",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("svg") => "image/svg+xml",
        _ => sniff_content_type(bytes),
    }
}

/// Guesses a MIME type from the leading bytes of a payload.
///
/// Covers the markup, image, font, and archive signatures an editor bundle ships; anything else
/// is plain text unless it contains binary control bytes.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];

    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b\x08", "application/x-gzip"),
    ];
    for (signature, content_type) in SIGNATURES {
        if head.starts_with(signature) {
            return *content_type;
        }
    }
    if head.len() >= 14 && head.starts_with(b"RIFF") && &head[8..14] == b"WEBPVP" {
        return "image/webp";
    }

    let trimmed = trim_leading_whitespace(head);
    const HTML_TAGS: &[&[u8]] = &[
        b"<!DOCTYPE HTML",
        b"<HTML",
        b"<HEAD",
        b"<SCRIPT",
        b"<IFRAME",
        b"<H1",
        b"<DIV",
        b"<FONT",
        b"<TABLE",
        b"<A",
        b"<STYLE",
        b"<TITLE",
        b"<B",
        b"<BODY",
        b"<BR",
        b"<P",
        b"<!--",
    ];
    for tag in HTML_TAGS {
        if starts_with_html_tag(trimmed, tag) {
            return "text/html; charset=utf-8";
        }
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if head.starts_with(b"\xef\xbb\xbf") || !head.iter().any(|&b| is_binary_byte(b)) {
        return "text/plain; charset=utf-8";
    }
    "application/octet-stream"
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(bytes.len());
    &bytes[start..]
}

// The tag must be followed by a space or `>` so `<Bold>` does not count as `<B`.
fn starts_with_html_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() < tag.len() + 1 || !data[..tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    tag == b"<!--" || matches!(data[tag.len()], b' ' | b'>')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}

pub(super) async fn serve_asset(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let request_path = uri.path().to_owned();
    let assets = state.assets.clone();
    let lookup_path = request_path.clone();
    let loaded = tokio::task::spawn_blocking(move || assets.load(&lookup_path)).await;

    match loaded {
        Ok(Ok(Some((name, bytes)))) => {
            let content_type = asset_content_type(&name, &bytes);
            let body = match bytes {
                Cow::Borrowed(bytes) => axum::body::Bytes::from_static(bytes),
                Cow::Owned(bytes) => axum::body::Bytes::from(bytes),
            };
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Ok(Ok(None)) => {
            tracing::info!(path = %request_path, "asset not found");
            not_found(&request_path)
        }
        Ok(Err(err)) => {
            tracing::warn!(path = %request_path, error = %err, "failed to read asset");
            not_found(&request_path)
        }
        Err(err) => {
            tracing::error!(path = %request_path, error = %err, "asset lookup task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn not_found(request_path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("resource not found {request_path}\n"),
    )
        .into_response()
}
