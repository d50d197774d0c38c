//! The authenticated principal as issued by the identity provider.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_types::Email;

/// Bearer credential attached to authenticated backend requests.
///
/// `Debug` is redacted so identities can be logged freely.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider-side user id.
    pub uid: String,
    pub email: Email,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(skip)]
    pub credential: Credential,
}

impl Identity {
    /// Display name, falling back to the local part of the email.
    pub fn name_or_email(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }

    pub fn apply_profile(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(photo) = &update.photo_url {
            self.photo_url = Some(photo.clone());
        }
    }
}

/// Fields a signed-in user may change on their own identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            uid: "uid-1".into(),
            email: Email::new("rafi@example.com").unwrap(),
            display_name: None,
            photo_url: None,
            credential: Credential::new("secret-token"),
        }
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let rendered = format!("{:?}", identity());
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("Credential(***)"));
    }

    #[test]
    fn test_credential_not_serialized() {
        let json = serde_json::to_value(identity()).unwrap();
        assert!(json.get("credential").is_none());
        assert_eq!(json["email"], "rafi@example.com");
    }

    #[test]
    fn test_name_falls_back_to_email() {
        let mut id = identity();
        assert_eq!(id.name_or_email(), "rafi");

        id.apply_profile(&ProfileUpdate {
            display_name: Some("Rafi Ahmed".into()),
            photo_url: None,
        });
        assert_eq!(id.name_or_email(), "Rafi Ahmed");
        assert!(id.photo_url.is_none());
    }
}
