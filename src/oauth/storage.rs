use super::AccessToken;
use crate::api::DirectError;
use keyring::Entry;
use serde::{Deserialize, Serialize};

const KEYRING_SERVICE: &str = "directctl";
const KEYRING_USER: &str = "OAuth2 Token";

/// The format of our JSON within our credential storage.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: AccessToken,
    /// The account this token was issued for, if known.
    #[serde(default)]
    pub login: Option<String>,
}

impl StoredToken {
    pub fn from_json(contents: &str) -> Result<Self, DirectError> {
        serde_json::from_str(contents).map_err(DirectError::StoredCredentials)
    }

    pub fn to_json(&self) -> Result<String, DirectError> {
        serde_json::to_string(self).map_err(DirectError::StoredCredentials)
    }
}

/// Persists our access token within the user's keyring.
pub struct TokenStorage {
    entry: Entry,
}

impl TokenStorage {
    pub fn open() -> Result<Self, DirectError> {
        Ok(Self {
            entry: Entry::new(KEYRING_SERVICE, KEYRING_USER)?,
        })
    }

    /// Returns `None` if nothing has been stored yet.
    pub fn load(&self) -> Result<Option<StoredToken>, DirectError> {
        match self.entry.get_password() {
            Ok(contents) => StoredToken::from_json(&contents).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store(&self, token: &StoredToken) -> Result<(), DirectError> {
        self.entry.set_password(&token.to_json()?)?;
        Ok(())
    }

    /// Forgets the stored token. Clearing an empty storage is not an error.
    pub fn clear(&self) -> Result<(), DirectError> {
        match self.entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
