//! # mcwire-client
//!
//! Client library for mcwire.
//!
//! This crate provides:
//! - A protocol sequencer ([`Session`]) for the handshake, status and login
//!   exchanges
//! - Transport, encryption and credential collaborator traits
//! - A tokio TCP transport and connection settings
//! - Account authentication against the account service, over `reqwest`

pub mod auth;
pub mod connection;
pub mod encryption;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;

pub use auth::{AuthConfig, AuthError, CredentialSource, Credentials, HttpPost, YggdrasilAuth};
pub use connection::{connect, ConnectionConfig};
pub use encryption::{EncryptionChallenge, EncryptionHandler, EncryptionReply, OfflineOnly};
pub use error::{ClientError, Phase};
pub use http::ReqwestPost;
pub use session::Session;
pub use transport::{StreamTransport, TcpTransport, Transport};
