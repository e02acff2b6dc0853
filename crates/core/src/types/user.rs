//! Authentication request bodies, the session payload and user profiles.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};

/// Body of `POST /auth/login`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// The signed-in user as views see it: the session payload minus the token.
///
/// This is also exactly what gets persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Identity {
    /// Full name when both parts are known, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_owned(),
            _ => self.username.clone(),
        }
    }
}

/// Data of a successful login or registration: a bearer token plus identity.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(flatten)]
    pub identity: Identity,
}

impl AuthPayload {
    /// Split into the token and the token-free identity projection.
    #[must_use]
    pub fn into_parts(self) -> (String, Identity) {
        (self.token, self.identity)
    }
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("token", &"[REDACTED]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Profile returned by `GET /users/me` and the favorites endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub favorite_product_ids: Vec<ProductId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_auth_payload_splits_token_from_identity() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "token": "t1",
            "username": "jane",
            "email": "j@x.com"
        }))
        .unwrap();

        let (token, identity) = payload.into_parts();
        assert_eq!(token, "t1");
        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            json!({ "username": "jane", "email": "j@x.com" })
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::new("jane", "hunter2");
        let debug_output = format!("{credentials:?}");
        assert!(debug_output.contains("jane"));
        assert!(!debug_output.contains("hunter2"));

        let payload = AuthPayload {
            token: "super_secret_token".to_owned(),
            identity: Identity {
                username: "jane".to_owned(),
                email: "j@x.com".to_owned(),
                first_name: None,
                last_name: None,
            },
        };
        assert!(!format!("{payload:?}").contains("super_secret_token"));
    }

    #[test]
    fn test_registration_omits_missing_names() {
        let registration = Registration {
            username: "jane".to_owned(),
            email: "j@x.com".to_owned(),
            password: "secret".to_owned(),
            first_name: Some("Jane".to_owned()),
            last_name: None,
        };
        assert_eq!(
            serde_json::to_value(&registration).unwrap(),
            json!({
                "username": "jane",
                "email": "j@x.com",
                "password": "secret",
                "firstName": "Jane"
            })
        );
    }

    #[test]
    fn test_display_name() {
        let mut identity = Identity {
            username: "jane".to_owned(),
            email: "j@x.com".to_owned(),
            first_name: None,
            last_name: None,
        };
        assert_eq!(identity.display_name(), "jane");
        identity.first_name = Some("Jane".to_owned());
        identity.last_name = Some("Doe".to_owned());
        assert_eq!(identity.display_name(), "Jane Doe");
    }

    #[test]
    fn test_profile_favorites_default_empty() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 1,
            "username": "jane",
            "email": "j@x.com"
        }))
        .unwrap();
        assert!(profile.favorite_product_ids.is_empty());
    }
}
