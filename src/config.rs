// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Specpad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Specpad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration: built-in defaults, overlaid by `SPECPAD_*` environment variables,
//! overlaid by command-line flags (applied in `main`).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::autosave::DEFAULT_AUTOSAVE_INTERVAL;
use crate::gateway::{AssetSource, Credentials};
use crate::store::{DocumentFile, WriteDurability};

pub const DEFAULT_DOCUMENT_PATH: &str = "api-spec.yaml";
pub const DEFAULT_PORT: u16 = 8765;
pub const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_EDITOR_PATH: &str = "builtin";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub const ENV_FILE: &str = "SPECPAD_FILE";
pub const ENV_PORT: &str = "SPECPAD_PORT";
pub const ENV_BIND: &str = "SPECPAD_BIND";
pub const ENV_EDITOR_PATH: &str = "SPECPAD_EDITOR_PATH";
pub const ENV_USER: &str = "SPECPAD_USER";
pub const ENV_PASSWORD: &str = "SPECPAD_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEnv { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { name, value } => {
                write!(f, "invalid value for environment variable {name}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub document_path: PathBuf,
    pub bind_address: IpAddr,
    pub port: u16,
    /// Editor installation directory, or `builtin` for the bundled editor.
    pub editor_path: String,
    pub username: String,
    pub password: String,
    pub autosave_interval: Duration,
    pub max_body_bytes: usize,
    pub durability: WriteDurability,
    pub open_browser: bool,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("document_path", &self.document_path)
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("editor_path", &self.editor_path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("autosave_interval", &self.autosave_interval)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("durability", &self.durability)
            .field("open_browser", &self.open_browser)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from(DEFAULT_DOCUMENT_PATH),
            bind_address: DEFAULT_BIND_ADDRESS,
            port: DEFAULT_PORT,
            editor_path: DEFAULT_EDITOR_PATH.to_owned(),
            username: DEFAULT_USERNAME.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            durability: WriteDurability::default(),
            open_browser: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Builds a config from defaults plus whatever `lookup` returns for the `SPECPAD_*` names.
    ///
    /// Empty values are treated as unset.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_FILE) {
            config.document_path = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_PORT) {
            config.port = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PORT,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = get(ENV_BIND) {
            config.bind_address = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_BIND,
                value: raw.clone(),
            })?;
        }
        if let Some(editor_path) = get(ENV_EDITOR_PATH) {
            config.editor_path = editor_path;
        }
        if let Some(username) = get(ENV_USER) {
            config.username = username;
        }
        if let Some(password) = get(ENV_PASSWORD) {
            config.password = password;
        }

        Ok(config)
    }

    pub fn document_file(&self) -> DocumentFile {
        DocumentFile::new(&self.document_path).with_durability(self.durability)
    }

    pub fn asset_source(&self) -> AssetSource {
        AssetSource::from_editor_path(&self.editor_path)
    }

    /// Hashes the configured password; this is deliberately slow, so call it once at startup.
    pub fn credentials(&self) -> Result<Credentials, argon2::password_hash::Error> {
        Credentials::new(&self.username, &self.password)
    }
}
