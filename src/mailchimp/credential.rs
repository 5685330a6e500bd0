use base64::{engine::general_purpose, Engine as _};
use md5::{Digest, Md5};
use std::fmt;
use thiserror::Error;

/// Reasons an encoded API key cannot be turned into an upstream credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Invalid Mailchimp API key encoding")]
    NotBase64,

    #[error("Invalid Mailchimp API key encoding")]
    NotUtf8,

    #[error("Missing Mailchimp API key")]
    Empty,

    #[error("Invalid Mailchimp API key: missing data center suffix")]
    MissingDataCenter,
}

/// A decoded Mailchimp API key plus the data center it lives in.
///
/// The secret only ever leaves this type through [`Credential::secret`]; the
/// `Debug` impl redacts it so it cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    secret: String,
    data_center: String,
}

impl Credential {
    /// Decode the base64 path segment and derive the data center.
    ///
    /// Standard and URL-safe alphabets are both accepted, padded or not, since
    /// frontends differ in how they put the key into a path.
    pub fn from_encoded(encoded: &str) -> Result<Self, CredentialError> {
        let encoded = encoded.trim();
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .or_else(|_| general_purpose::URL_SAFE.decode(encoded))
            .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(encoded))
            .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|_| CredentialError::NotBase64)?;
        let secret = String::from_utf8(bytes).map_err(|_| CredentialError::NotUtf8)?;
        Self::from_secret(secret)
    }

    /// Build a credential from a raw key such as `0123abcd-us6`.
    pub fn from_secret(secret: impl Into<String>) -> Result<Self, CredentialError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(CredentialError::Empty);
        }

        // Second hyphen-delimited segment, e.g. "us6" in "<hex>-us6"
        let data_center = secret
            .split('-')
            .nth(1)
            .filter(|dc| !dc.is_empty() && dc.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or(CredentialError::MissingDataCenter)?
            .to_string();

        Ok(Self { secret, data_center })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn data_center(&self) -> &str {
        &self.data_center
    }

    /// The inverse of [`Credential::from_encoded`], used by the CLI.
    pub fn encode(secret: &str) -> String {
        general_purpose::STANDARD.encode(secret.as_bytes())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"<redacted>")
            .field("data_center", &self.data_center)
            .finish()
    }
}

/// Mailchimp identifies list members by the MD5 of the lower-cased email.
pub fn subscriber_hash(email: &str) -> String {
    let digest = Md5::digest(email.to_lowercase().as_bytes());
    format!("{:x}", digest)
}
