// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Specpad CLI entrypoint.
//!
//! Loads the document file, starts the autosave loop, and serves the editor plus the
//! `/backend` read/write endpoint over HTTP (Basic auth) on `http://localhost:<port>`.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use specpad::config::{ServerConfig, DEFAULT_DOCUMENT_PATH, DEFAULT_PORT};
use specpad::store::WriteDurability;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--file <path>] [--port <port>] [--bind <addr>] [--editor-path <dir|builtin>]\n  {program} [--user <name>] [--password <password>] [--autosave-interval-ms <ms>]\n  {program} [--max-body-bytes <n>] [--durable-writes] [--no-browser]\n\n-f/--file selects the edited document (default {DEFAULT_DOCUMENT_PATH}); it is created if missing.\n-p/--port selects the HTTP port (0 = ephemeral; default {DEFAULT_PORT}).\n-se/--editor-path serves an editor installation directory instead of the bundled editor.\n-u/--user and -k/--password set the HTTP Basic credentials (default admin/admin).\n\nEach flag falls back to SPECPAD_FILE, SPECPAD_PORT, SPECPAD_BIND, SPECPAD_EDITOR_PATH,\nSPECPAD_USER, SPECPAD_PASSWORD when omitted.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    file: Option<String>,
    port: Option<u16>,
    bind: Option<std::net::IpAddr>,
    editor_path: Option<String>,
    user: Option<String>,
    password: Option<String>,
    autosave_interval_ms: Option<u64>,
    max_body_bytes: Option<usize>,
    durable_writes: bool,
    no_browser: bool,
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-f" | "--file" => {
                let path = args.next().ok_or(())?;
                set_once(&mut options.file, path)?;
            }
            "-p" | "--port" => {
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                set_once(&mut options.port, port)?;
            }
            "--bind" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.bind, raw.parse().map_err(|_| ())?)?;
            }
            "-se" | "--editor-path" => {
                let path = args.next().ok_or(())?;
                set_once(&mut options.editor_path, path)?;
            }
            "-u" | "--user" => {
                let user = args.next().ok_or(())?;
                set_once(&mut options.user, user)?;
            }
            "-k" | "--password" => {
                let password = args.next().ok_or(())?;
                set_once(&mut options.password, password)?;
            }
            "--autosave-interval-ms" => {
                let raw = args.next().ok_or(())?;
                let millis: u64 = raw.parse().map_err(|_| ())?;
                if millis == 0 {
                    return Err(());
                }
                set_once(&mut options.autosave_interval_ms, millis)?;
            }
            "--max-body-bytes" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.max_body_bytes, raw.parse().map_err(|_| ())?)?;
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--no-browser" => {
                if options.no_browser {
                    return Err(());
                }
                options.no_browser = true;
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn apply_options(mut config: ServerConfig, options: CliOptions) -> ServerConfig {
    if let Some(file) = options.file {
        config.document_path = PathBuf::from(file);
    }
    if let Some(port) = options.port {
        config.port = port;
    }
    if let Some(bind) = options.bind {
        config.bind_address = bind;
    }
    if let Some(editor_path) = options.editor_path {
        config.editor_path = editor_path;
    }
    if let Some(user) = options.user {
        config.username = user;
    }
    if let Some(password) = options.password {
        config.password = password;
    }
    if let Some(millis) = options.autosave_interval_ms {
        config.autosave_interval = Duration::from_millis(millis);
    }
    if let Some(max_body_bytes) = options.max_body_bytes {
        config.max_body_bytes = max_body_bytes;
    }
    if options.durable_writes {
        config.durability = WriteDurability::Durable;
    }
    if options.no_browser {
        config.open_browser = false;
    }
    config
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "specpad".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        specpad::logging::init();

        let config = apply_options(ServerConfig::from_env()?, options);

        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(specpad::server::run(config))?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("specpad: {err}");
        std::process::exit(1);
    }
}
