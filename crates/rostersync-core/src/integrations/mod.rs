pub mod torn;
pub mod traits;

pub use torn::TornClient;
pub use traits::{RosterSource, StatusSink};

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::CredentialError;

    const SERVICE: &str = "rostersync";

    pub fn get(key: &str) -> Result<Option<String>, CredentialError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
