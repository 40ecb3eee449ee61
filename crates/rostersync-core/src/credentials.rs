//! API key resolution.
//!
//! The key is looked up in `ROSTERSYNC_API_KEY` first, then in the OS
//! keyring. A missing key is fatal at startup: nothing can be polled
//! without it.

use crate::error::CredentialError;
use crate::integrations::keyring_store;

pub const API_KEY_ENV: &str = "ROSTERSYNC_API_KEY";
const KEYRING_KEY: &str = "torn_api_key";

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

/// Pick the first usable key out of an env value and a stored value.
pub fn choose_api_key(
    env_value: Option<String>,
    stored: Option<String>,
) -> Result<(String, KeySource), CredentialError> {
    if let Some(key) = env_value.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        return Ok((key, KeySource::Environment));
    }
    if let Some(key) = stored.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        return Ok((key, KeySource::Keyring));
    }
    Err(CredentialError::Missing)
}

/// Resolve the API key from the environment or the keyring.
pub fn resolve_api_key() -> Result<(String, KeySource), CredentialError> {
    let env_value = std::env::var(API_KEY_ENV).ok();
    if env_value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        return choose_api_key(env_value, None);
    }
    choose_api_key(None, keyring_store::get(KEYRING_KEY)?)
}

/// Persist a key supplied by the user. Blank input is rejected.
pub fn store_api_key(key: &str) -> Result<(), CredentialError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CredentialError::Missing);
    }
    keyring_store::set(KEYRING_KEY, key)
}

pub fn clear_api_key() -> Result<(), CredentialError> {
    keyring_store::delete(KEYRING_KEY)
}

/// Whether a key is stored in the keyring (the environment is not consulted).
pub fn has_stored_api_key() -> bool {
    matches!(keyring_store::get(KEYRING_KEY), Ok(Some(k)) if !k.trim().is_empty())
}
