// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone};
use rstest::{fixture, rstest};

use super::{DocumentFile, StoreError, WriteDurability};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("specpad-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct DocumentFileTestCtx {
    tmp: TempDir,
    doc_path: PathBuf,
    file: DocumentFile,
}

impl DocumentFileTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let doc_path = tmp.path().join("api-spec.yaml");
        let file = DocumentFile::new(&doc_path);
        Self { tmp, doc_path, file }
    }

    fn leftover_temp_files(&self) -> Vec<String> {
        std::fs::read_dir(self.tmp.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".specpad.tmp."))
            .collect()
    }
}

#[fixture]
fn ctx() -> DocumentFileTestCtx {
    DocumentFileTestCtx::new("document-file")
}

fn local_time(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 5, hour, minute, second).single().unwrap()
}

#[rstest]
fn load_creates_missing_file_and_returns_empty_content(ctx: DocumentFileTestCtx) {
    assert!(!ctx.doc_path.exists());

    let content = ctx.file.load().unwrap();

    assert!(content.is_empty());
    assert!(ctx.doc_path.is_file());
    assert_eq!(std::fs::metadata(&ctx.doc_path).unwrap().len(), 0);
}

#[rstest]
fn load_returns_existing_bytes_verbatim(ctx: DocumentFileTestCtx) {
    let bytes = b"openapi: 3.0.0\n\xff\x00binary tail".to_vec();
    std::fs::write(&ctx.doc_path, &bytes).unwrap();

    assert_eq!(ctx.file.load().unwrap(), bytes);
}

#[rstest]
fn load_reports_io_error_when_parent_dir_is_missing(ctx: DocumentFileTestCtx) {
    let missing = ctx.tmp.path().join("no-such-dir").join("doc.yaml");
    let file = DocumentFile::new(&missing);

    match file.load() {
        Err(StoreError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[rstest]
fn backup_path_uses_minute_resolution_suffix(ctx: DocumentFileTestCtx) {
    let backup = ctx.file.backup_path_at(local_time(7, 9, 30));

    assert_eq!(backup, ctx.tmp.path().join("api-spec.yaml_202403050709"));
}

#[rstest]
fn backup_path_sorts_with_time(ctx: DocumentFileTestCtx) {
    let earlier = ctx.file.backup_path_at(local_time(9, 59, 59));
    let later = ctx.file.backup_path_at(local_time(10, 0, 0));

    assert!(earlier < later);
}

#[rstest]
fn flush_writes_canonical_and_backup_copies(ctx: DocumentFileTestCtx) {
    let at = local_time(12, 30, 0);

    let outcome = ctx.file.flush_at(b"a: 2\n", at).unwrap();

    assert_eq!(outcome.bytes_written, 5);
    assert!(outcome.backup_written());
    assert_eq!(outcome.backup_path, ctx.file.backup_path_at(at));
    assert_eq!(std::fs::read(&ctx.doc_path).unwrap(), b"a: 2\n");
    assert_eq!(std::fs::read(&outcome.backup_path).unwrap(), b"a: 2\n");
    assert!(ctx.leftover_temp_files().is_empty());
}

#[rstest]
fn flush_replaces_longer_previous_content(ctx: DocumentFileTestCtx) {
    std::fs::write(&ctx.doc_path, b"a much longer previous document body").unwrap();

    ctx.file.flush_at(b"short", local_time(12, 0, 0)).unwrap();

    assert_eq!(std::fs::read(&ctx.doc_path).unwrap(), b"short");
}

#[rstest]
fn flushes_in_the_same_minute_overwrite_one_backup(ctx: DocumentFileTestCtx) {
    let first = ctx.file.flush_at(b"first", local_time(8, 15, 1)).unwrap();
    let second = ctx.file.flush_at(b"second", local_time(8, 15, 59)).unwrap();

    assert_eq!(first.backup_path, second.backup_path);
    assert_eq!(std::fs::read(&second.backup_path).unwrap(), b"second");
}

#[rstest]
fn flushes_in_different_minutes_keep_both_backups(ctx: DocumentFileTestCtx) {
    let first = ctx.file.flush_at(b"first", local_time(8, 15, 0)).unwrap();
    let second = ctx.file.flush_at(b"second", local_time(8, 16, 0)).unwrap();

    assert_ne!(first.backup_path, second.backup_path);
    assert_eq!(std::fs::read(&first.backup_path).unwrap(), b"first");
    assert_eq!(std::fs::read(&second.backup_path).unwrap(), b"second");
}

#[rstest]
fn canonical_write_failure_skips_backup(ctx: DocumentFileTestCtx) {
    // A directory at the canonical path makes the rename fail.
    std::fs::create_dir_all(&ctx.doc_path).unwrap();
    let at = local_time(13, 0, 0);

    let err = ctx.file.flush_at(b"content", at).unwrap_err();

    assert!(matches!(err, StoreError::Io { .. }));
    assert!(!ctx.file.backup_path_at(at).exists());
    assert!(ctx.leftover_temp_files().is_empty());
}

#[rstest]
fn backup_write_failure_is_reported_but_not_fatal(ctx: DocumentFileTestCtx) {
    let at = local_time(14, 0, 0);
    std::fs::create_dir_all(ctx.file.backup_path_at(at)).unwrap();

    let outcome = ctx.file.flush_at(b"kept", at).unwrap();

    assert!(!outcome.backup_written());
    assert_eq!(outcome.bytes_written, 4);
    assert_eq!(std::fs::read(&ctx.doc_path).unwrap(), b"kept");
}

#[rstest]
fn durable_writes_produce_the_same_files(ctx: DocumentFileTestCtx) {
    let file = DocumentFile::new(&ctx.doc_path).with_durability(WriteDurability::Durable);
    assert_eq!(file.durability(), WriteDurability::Durable);

    let outcome = file.flush_at(b"durable", local_time(15, 0, 0)).unwrap();

    assert_eq!(std::fs::read(&ctx.doc_path).unwrap(), b"durable");
    assert_eq!(std::fs::read(&outcome.backup_path).unwrap(), b"durable");
}

#[rstest]
fn relative_paths_flush_next_to_the_working_directory_file() {
    let file = DocumentFile::new("api-spec.yaml");

    assert_eq!(
        file.backup_path_at(local_time(6, 5, 0)),
        PathBuf::from("api-spec.yaml_202403050605")
    );
}

#[cfg(unix)]
#[rstest]
fn symlinked_document_is_read_and_written_through(ctx: DocumentFileTestCtx) {
    let target = ctx.tmp.path().join("real.yaml");
    std::fs::write(&target, b"a: 1").unwrap();
    std::os::unix::fs::symlink(&target, &ctx.doc_path).unwrap();

    assert_eq!(ctx.file.load().unwrap(), b"a: 1");

    let at = local_time(16, 0, 0);
    let outcome = ctx.file.flush_at(b"a: 2", at).unwrap();

    assert!(std::fs::symlink_metadata(&ctx.doc_path).unwrap().file_type().is_symlink());
    assert_eq!(std::fs::read(&target).unwrap(), b"a: 2");
    assert_eq!(outcome.backup_path, ctx.file.backup_path_at(at));
    assert_eq!(std::fs::read(&outcome.backup_path).unwrap(), b"a: 2");
    assert!(ctx.leftover_temp_files().is_empty());
}

#[cfg(unix)]
#[rstest]
fn dangling_symlink_creates_its_target(ctx: DocumentFileTestCtx) {
    std::os::unix::fs::symlink("created.yaml", &ctx.doc_path).unwrap();

    assert!(ctx.file.load().unwrap().is_empty());
    assert!(ctx.tmp.path().join("created.yaml").is_file());
    assert!(std::fs::symlink_metadata(&ctx.doc_path).unwrap().file_type().is_symlink());
}

#[cfg(unix)]
#[rstest]
fn flush_keeps_the_document_file_mode(ctx: DocumentFileTestCtx) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(&ctx.doc_path, b"secret: 1").unwrap();
    std::fs::set_permissions(&ctx.doc_path, std::fs::Permissions::from_mode(0o600)).unwrap();

    let outcome = ctx.file.flush_at(b"secret: 2", local_time(17, 0, 0)).unwrap();

    let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
    assert_eq!(std::fs::read(&ctx.doc_path).unwrap(), b"secret: 2");
    assert_eq!(mode(&ctx.doc_path), 0o600);
    assert_eq!(mode(&outcome.backup_path), 0o600);
}

#[cfg(unix)]
#[rstest]
fn load_reports_io_error_when_permission_is_denied(ctx: DocumentFileTestCtx) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(&ctx.doc_path, b"locked").unwrap();
    std::fs::set_permissions(&ctx.doc_path, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read(&ctx.doc_path).is_ok() {
        // Running with privileges that bypass file modes (root).
        return;
    }

    match ctx.file.load() {
        Err(StoreError::Io { path, source }) => {
            assert_eq!(path, ctx.doc_path);
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected permission error, got {other:?}"),
    }
}
