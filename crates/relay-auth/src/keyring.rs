use relay_core::ClientIdentity;

use crate::{ApiKeyHash, AuthError, hash_api_key};

/// Configured API keys, held as digests only
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: Vec<(String, ApiKeyHash)>,
}

impl KeyRing {
    pub fn new(keys: impl IntoIterator<Item = (String, ApiKeyHash)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve a presented key to the caller it belongs to
    ///
    /// Every configured key is compared, so timing does not reveal which
    /// entry matched.
    pub fn authenticate(&self, raw_key: &str) -> Result<ClientIdentity, AuthError> {
        let presented = hash_api_key(raw_key);

        let mut matched = None;
        for (name, stored) in &self.keys {
            if crate::constant_time_eq(stored.as_str(), presented.as_str()) && matched.is_none() {
                matched = Some(name);
            }
        }

        let Some(client_id) = matched else {
            tracing::debug!(key = ?presented, "presented API key matched no configured key");
            return Err(AuthError::InvalidKey);
        };

        Ok(ClientIdentity {
            client_id: client_id.clone(),
            key_hash: presented.to_string(),
        })
    }
}
