//! CLI command handlers

pub mod account;
pub mod book;
pub mod config;

use anyhow::{Context, Result};

use shelf_core::{Config, CredentialStore, HttpGateway, LibraryContext};

/// Build a context talking to the configured backend
pub fn open_context(config: &Config) -> Result<LibraryContext<HttpGateway>> {
    let gateway = HttpGateway::new(config).context("Failed to create HTTP client")?;
    let store = CredentialStore::new(config.credentials_path());
    Ok(LibraryContext::new(gateway).with_credential_store(store, config.remember_login))
}
