/// Runtime context for a single API request
///
/// Built by the server middleware and handed to translation and agent
/// client code.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP request parts (method, URI, headers, extensions)
    pub parts: http::request::Parts,
    /// Authenticated caller, absent when auth is disabled or the path is public
    pub client_identity: Option<ClientIdentity>,
}

impl RequestContext {
    /// Create a minimal context for embedded (non-HTTP) use
    ///
    /// Contains empty headers and no client identity
    pub fn empty() -> Self {
        let (parts, ()) = http::Request::new(()).into_parts();

        Self {
            parts,
            client_identity: None,
        }
    }

    /// Access request headers
    pub fn headers(&self) -> &http::HeaderMap {
        &self.parts.headers
    }

    /// Hash of the caller's API key, used as the tenant key
    pub fn owner_hash(&self) -> Option<&str> {
        self.client_identity.as_ref().map(|identity| identity.key_hash.as_str())
    }
}

/// Identified caller
///
/// Only the hash of the presented key is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Configured name of the matching key
    pub client_id: String,
    /// SHA-256 hex digest of the presented key
    pub key_hash: String,
}
