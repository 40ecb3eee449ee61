use clap::Subcommand;
use rostersync_core::credentials::{self, KeySource, API_KEY_ENV};
use rostersync_core::CredentialError;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the Torn API key in the OS keyring
    Login {
        /// API key (prompted on stdin when omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove the stored API key
    Logout,
    /// Show where the API key comes from
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login { key } => {
            let key = match key {
                Some(key) => key,
                None => super::prompt_api_key()?,
            };
            credentials::store_api_key(&key)?;
            println!("API key stored");
        }
        AuthAction::Logout => {
            credentials::clear_api_key()?;
            println!("API key removed");
        }
        AuthAction::Status => match credentials::resolve_api_key() {
            Ok((_, KeySource::Environment)) => println!("authenticated (from {API_KEY_ENV})"),
            Ok((_, KeySource::Keyring)) => println!("authenticated (keyring)"),
            Err(CredentialError::Missing) => println!("not authenticated"),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}
