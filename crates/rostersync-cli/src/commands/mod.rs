pub mod auth;
pub mod config;
pub mod snapshot;
pub mod watch;

use std::io::{BufRead, IsTerminal, Write};

use rostersync_core::credentials::{self, KeySource};
use rostersync_core::{Config, CredentialError, FactionId, SyncError, TornClient};

/// Faction to watch: the flag, else the configured default.
pub fn resolve_faction(flag: Option<String>, config: &Config) -> Result<FactionId, SyncError> {
    flag.as_deref()
        .and_then(FactionId::parse)
        .or_else(|| config.default_faction.as_deref().and_then(FactionId::parse))
        .ok_or(SyncError::MissingIdentity)
}

/// Resolve the API key, asking once on an interactive stdin when none is stored.
pub fn api_key() -> Result<String, Box<dyn std::error::Error>> {
    match credentials::resolve_api_key() {
        Ok((key, source)) => {
            tracing::debug!(source = ?source, "api key resolved");
            Ok(key)
        }
        Err(CredentialError::Missing) if std::io::stdin().is_terminal() => {
            let key = prompt_api_key()?;
            credentials::store_api_key(&key)?;
            tracing::info!(source = ?KeySource::Keyring, "api key stored");
            Ok(key.trim().to_string())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn prompt_api_key() -> Result<String, Box<dyn std::error::Error>> {
    eprint!("Torn API key: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let key = line.trim().to_string();
    if key.is_empty() {
        return Err(CredentialError::Missing.into());
    }
    Ok(key)
}

pub fn client(config: &Config) -> Result<TornClient, Box<dyn std::error::Error>> {
    let key = api_key()?;
    Ok(TornClient::new(
        &config.api.base_url,
        &key,
        config.request_timeout(),
    )?)
}

/// Current-thread runtime for the async commands.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
