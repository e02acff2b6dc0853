//! Sign-in state: login, registration and logout.

use mid_shop_core::{AuthPayload, Credentials, Identity, Registration};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Owner of the sign-in flow.
///
/// The identity itself lives in the shared [`SessionVault`](crate::SessionVault),
/// so every clone of this store and every other store sharing the same
/// [`ApiClient`] sees the same value.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
}

impl SessionStore {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.api.vault().identity()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.vault().is_authenticated()
    }

    /// Watch sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.api.vault().subscribe()
    }

    /// Sign in with a username and password.
    ///
    /// On success the token and identity are persisted and the identity is
    /// published. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` if either field is empty, the API
    /// error if the server refuses the credentials, or `ClientError::Storage`
    /// if the session cannot be persisted.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(ClientError::InvalidInput(
                "Username and password are required".to_string(),
            ));
        }

        let payload = self.api.login(credentials).await?;
        self.establish(payload)
    }

    /// Create an account and sign in as the new user.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` if a required field is empty, the
    /// server's rejection (e.g. username taken), or `ClientError::Storage` if
    /// the session cannot be persisted.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<Identity> {
        if registration.username.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(ClientError::InvalidInput(
                "Username, email and password are required".to_string(),
            ));
        }

        let payload = self.api.register(registration).await?;
        self.establish(payload)
    }

    /// Sign out locally. Never fails and never contacts the server.
    pub fn logout(&self) {
        if self.api.vault().teardown() {
            info!("Signed out");
        }
    }

    fn establish(&self, payload: AuthPayload) -> Result<Identity> {
        let (token, identity) = payload.into_parts();
        let token = SecretString::from(token);

        self.api.vault().establish(&token, &identity)?;
        info!(username = %identity.username, "Signed in");
        Ok(identity)
    }
}
