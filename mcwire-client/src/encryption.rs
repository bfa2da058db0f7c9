//! Encryption handoff.
//!
//! The RSA exchange and the stream cipher live outside this crate. During
//! login the session hands the server's challenge to an
//! [`EncryptionHandler`], sends the encrypted values it returns, and passes
//! the plaintext shared secret to the transport.

use crate::auth::Credentials;
use bytes::Bytes;
use std::future::Future;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Contents of an encryption request, plus the credentials the session
/// logged in with (needed to register the join with the session service).
#[derive(Debug, Clone)]
pub struct EncryptionChallenge {
    pub server_id: String,
    /// DER-encoded public key.
    pub public_key: Bytes,
    pub verify_token: Bytes,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone)]
pub struct EncryptionReply {
    /// Plaintext shared secret; keys the stream cipher.
    pub shared_secret: Bytes,
    pub encrypted_shared_secret: Bytes,
    pub encrypted_verify_token: Bytes,
}

pub trait EncryptionHandler {
    fn respond(
        &mut self,
        challenge: &EncryptionChallenge,
    ) -> impl Future<Output = Result<EncryptionReply, HandlerError>> + Send;
}

/// Handler for offline play. Any encryption request fails the login.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOnly;

impl EncryptionHandler for OfflineOnly {
    async fn respond(
        &mut self,
        _challenge: &EncryptionChallenge,
    ) -> Result<EncryptionReply, HandlerError> {
        Err("server requires encryption (online mode), client is offline only".into())
    }
}
