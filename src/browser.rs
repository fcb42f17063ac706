// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Best-effort launch of the user's web browser pointed at the editor.

use std::process::{Command, Stdio};

/// Picks the browser launcher: `$BROWSER` when set, otherwise the platform opener.
pub fn resolve_browser_command(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("BROWSER")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_opener().to_owned())
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Opens `url` without waiting for the browser to exit.
pub fn open_url(url: &str) -> Result<(), String> {
    let command = resolve_browser_command(|name| std::env::var(name).ok());
    launch_browser_command(&command, url)
}

fn launch_browser_command(command: &str, url: &str) -> Result<(), String> {
    if url.starts_with('-') {
        return Err("invalid browser url".to_owned());
    }

    let mut child = shell_command(command, url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| format!("failed to run browser command `{command}`: {err}"))?;

    // Reap the launcher so it does not linger as a zombie.
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

#[cfg(not(windows))]
fn shell_command(command: &str, url: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("{command} {}", shell_single_quote(url)));
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str, url: &str) -> Command {
    let mut cmd = Command::new(command);
    cmd.arg(url);
    cmd
}

fn shell_single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
