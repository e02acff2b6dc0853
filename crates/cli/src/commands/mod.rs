//! Command implementations and the wiring they share.

pub mod auth;
pub mod cart;
pub mod favorites;
pub mod products;

use std::sync::Arc;

use mid_shop_client::{
    ApiClient, ApiError, CartStore, ClientConfig, ClientError, ConfigError, FavoritesStore,
    FileStorage, Navigator, SessionStore, SessionVault,
};
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The command needs a signed-in user.
    #[error("Not signed in. Run `mid-shop login` first")]
    NotSignedIn,
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::Client(err.into())
    }
}

impl CliError {
    /// Message to show on the terminal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            Self::Config(_) | Self::NotSignedIn => self.to_string(),
        }
    }
}

/// Navigator for a terminal: there is no screen to switch to, so tell the
/// user how to get back in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Session ended, pointing user at login");
        crate::output::session_expired();
    }
}

/// Stores wired to one persisted session.
pub struct Context {
    pub api: ApiClient,
    pub session: SessionStore,
    pub cart: CartStore,
    pub favorites: FavoritesStore,
}

impl Context {
    /// Build the client from environment configuration, restoring the
    /// session persisted in the state directory.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the environment is invalid.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        Ok(Self::new(&config))
    }

    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let storage = Arc::new(FileStorage::new(config.session_file()));
        tracing::debug!(path = %storage.path().display(), "Using session file");

        let vault = Arc::new(SessionVault::open(storage));
        let api = ApiClient::new(config, vault, Arc::new(TerminalNavigator));

        Self {
            session: SessionStore::new(api.clone()),
            cart: CartStore::new(api.clone()),
            favorites: FavoritesStore::new(api.clone()),
            api,
        }
    }

    /// Fail fast for commands that only make sense when signed in.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotSignedIn` if no session is present.
    pub fn require_session(&self) -> Result<(), CliError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn)
        }
    }
}
