//! Authentication endpoints.

use mid_shop_core::{AuthPayload, Credentials, Registration};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Exchange credentials for a session token and identity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Rejected` for bad
    /// credentials, or a transport error.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        let url = self.endpoint("auth/login")?;
        self.execute_required(self.request(Method::POST, url).json(credentials), "session")
            .await
    }

    /// Create an account. The response carries a session, so the new user
    /// is signed in straight away.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the server's message for validation
    /// failures (e.g. username taken), or a transport error.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthPayload, ApiError> {
        let url = self.endpoint("auth/register")?;
        self.execute_required(self.request(Method::POST, url).json(registration), "session")
            .await
    }
}
