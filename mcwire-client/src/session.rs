//! Protocol sequencer.
//!
//! A [`Session`] owns one transport and walks it through the connection
//! states: handshake, then either the status exchange or login, then play.
//! Every step waits for the packet it needs before moving on, and the state
//! only advances after the step succeeded.

use crate::auth::{CredentialSource, Credentials};
use crate::connection::ConnectionConfig;
use crate::encryption::{EncryptionChallenge, EncryptionHandler};
use crate::error::{ClientError, Phase};
use crate::transport::Transport;
use bytes::BytesMut;
use mcwire_protocol::packets::{
    login, EncryptionRequest, EncryptionResponse, Handshake, LoginDisconnect,
    LoginStart, LoginSuccess, NextState, Ping, Pong, ServerStatus, SetCompression,
    StatusRequest, StatusResponse,
};
use mcwire_protocol::{
    ConnectionState, Direction, FrameDecoder, Packet, PacketSchema, ProtocolError, TypedPacket,
};
use std::time::{Duration, Instant};

const LOGIN_DISCONNECT: i32 = login::LOGIN_DISCONNECT.id;
const ENCRYPTION_REQUEST: i32 = login::ENCRYPTION_REQUEST.id;
const LOGIN_SUCCESS: i32 = login::LOGIN_SUCCESS.id;
const SET_COMPRESSION: i32 = login::SET_COMPRESSION.id;

static LOGIN_REPLIES: [&PacketSchema; 4] = [
    &login::LOGIN_DISCONNECT,
    &login::ENCRYPTION_REQUEST,
    &login::LOGIN_SUCCESS,
    &login::SET_COMPRESSION,
];

static LOGIN_REPLIES_AFTER_ENCRYPTION: [&PacketSchema; 3] = [
    &login::LOGIN_DISCONNECT,
    &login::LOGIN_SUCCESS,
    &login::SET_COMPRESSION,
];

/// One client connection and its protocol state.
pub struct Session<T> {
    transport: T,
    config: ConnectionConfig,
    state: ConnectionState,
    decoder: FrameDecoder,
    credentials: Option<Credentials>,
    compression_threshold: Option<i32>,
    encrypted: bool,
}

impl<T: Transport> Session<T> {
    /// Wraps a connected transport. The session starts in
    /// [`ConnectionState::Handshaking`].
    pub fn new(transport: T, config: ConnectionConfig) -> Self {
        let decoder = FrameDecoder::with_max_frame_size(config.max_frame_size);
        Self {
            transport,
            config,
            state: ConnectionState::Handshaking,
            decoder,
            credentials: None,
            compression_threshold: None,
            encrypted: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Threshold negotiated during login, if any.
    pub fn compression_threshold(&self) -> Option<i32> {
        self.compression_threshold
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn require_state(&self, expected: ConnectionState) -> Result<(), ClientError> {
        if self.state != expected {
            return Err(ClientError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::info!("Connection state {} -> {}", self.state, next);
        self.state = next;
    }

    // =========================================================================
    // Packet I/O
    // =========================================================================

    /// Sends a server-bound packet valid in the current state.
    pub async fn send_packet(&mut self, packet: &Packet) -> Result<(), ClientError> {
        self.require_state(packet.state())?;
        if packet.direction() != Direction::Serverbound {
            return Err(ClientError::protocol(
                self.state.into(),
                ProtocolError::UnexpectedPacketId {
                    id: packet.id(),
                    state: self.state,
                    direction: Direction::Serverbound,
                },
            ));
        }

        let frame = packet.serialize();
        tracing::debug!(
            "Sending {} (id={:#04x}, {} bytes)",
            packet.name(),
            packet.id(),
            frame.len()
        );
        self.transport.send(&frame).await?;
        Ok(())
    }

    pub async fn send<P: TypedPacket>(&mut self, packet: &P) -> Result<(), ClientError> {
        self.send_packet(&packet.to_packet()).await
    }

    /// Returns the next complete frame, reading from the transport as
    /// needed. Each read is bounded by the configured read timeout.
    pub async fn receive_frame(&mut self) -> Result<BytesMut, ClientError> {
        let phase = Phase::from(self.state);
        loop {
            if let Some(frame) = self
                .decoder
                .next_frame()
                .map_err(|e| ClientError::protocol(phase, e))?
            {
                return Ok(frame);
            }

            let chunk = tokio::time::timeout(self.config.read_timeout, self.transport.receive())
                .await
                .map_err(|_| {
                    tracing::debug!("Read timeout after {:?}", self.config.read_timeout);
                    ClientError::Timeout
                })??;

            if chunk.is_empty() {
                tracing::debug!(
                    "Connection closed ({} bytes left unparsed)",
                    self.decoder.buffered()
                );
                return Err(ClientError::ConnectionClosed);
            }
            tracing::trace!("Read {} bytes", chunk.len());
            self.decoder.extend_bytes(chunk);
        }
    }

    /// Receives the next packet and parses it against `expected`, which
    /// must all be client-bound schemas of the current state.
    pub async fn receive(
        &mut self,
        expected: &[&'static PacketSchema],
    ) -> Result<Packet, ClientError> {
        let phase = Phase::from(self.state);
        self.receive_in(phase, expected).await
    }

    /// Receives the next packet against every schema registered for the
    /// current state.
    pub async fn receive_registered(&mut self) -> Result<Packet, ClientError> {
        let expected = mcwire_protocol::packets::schemas(self.state, Direction::Clientbound);
        self.receive(expected).await
    }

    async fn receive_in(
        &mut self,
        phase: Phase,
        expected: &[&'static PacketSchema],
    ) -> Result<Packet, ClientError> {
        let frame = self.receive_frame().await?;
        let (packet, _) = Packet::parse(self.state, Direction::Clientbound, expected, &frame)
            .map_err(|e| {
                tracing::debug!("Failed to parse {} byte frame: {}", frame.len(), e);
                ClientError::protocol(phase, e)
            })?;
        tracing::debug!("Received {} (id={:#04x})", packet.name(), packet.id());
        Ok(packet)
    }

    async fn receive_typed<P: TypedPacket>(&mut self, phase: Phase) -> Result<P, ClientError> {
        let packet = self.receive_in(phase, &[P::SCHEMA]).await?;
        P::from_packet(&packet).map_err(|e| ClientError::protocol(phase, e))
    }

    // =========================================================================
    // Handshake
    // =========================================================================

    /// Sends the handshake and switches to `next`. The server does not
    /// reply to it.
    pub async fn handshake(&mut self, next: NextState) -> Result<(), ClientError> {
        self.require_state(ConnectionState::Handshaking)?;
        let handshake = Handshake {
            protocol_version: self.config.protocol_version,
            server_address: self.config.host.clone(),
            server_port: self.config.port,
            next_state: next,
        };
        self.send(&handshake).await?;
        self.transition(next.into());
        Ok(())
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Requests the server list information.
    pub async fn status(&mut self) -> Result<ServerStatus, ClientError> {
        self.require_state(ConnectionState::Status)?;
        self.send(&StatusRequest).await?;
        let response: StatusResponse = self.receive_typed(Phase::Status).await?;
        response
            .status()
            .map_err(|e| ClientError::protocol(Phase::Status, e))
    }

    /// Sends a ping and waits for the matching pong. Returns the round
    /// trip time.
    pub async fn ping(&mut self, payload: i64) -> Result<Duration, ClientError> {
        self.require_state(ConnectionState::Status)?;
        let started = Instant::now();
        self.send(&Ping { payload }).await?;
        let pong: Pong = self.receive_typed(Phase::Status).await?;
        if pong.payload != payload {
            return Err(ClientError::PingMismatch {
                sent: payload,
                received: pong.payload,
            });
        }
        Ok(started.elapsed())
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Runs the login exchange for `username`.
    ///
    /// An encryption request is handed to `encryption` exactly once; a
    /// compression threshold is handed to the transport. The session
    /// switches to [`ConnectionState::Play`] only when login success
    /// arrives.
    pub async fn login<E>(
        &mut self,
        username: &str,
        encryption: &mut E,
    ) -> Result<LoginSuccess, ClientError>
    where
        E: EncryptionHandler,
    {
        self.require_state(ConnectionState::Login)?;
        tracing::info!("Logging in as {}", username);
        self.send(&LoginStart::new(username)).await?;

        let mut expected: &[&'static PacketSchema] = &LOGIN_REPLIES;
        loop {
            let packet = self.receive_in(Phase::Login, expected).await?;
            match packet.id() {
                LOGIN_DISCONNECT => {
                    let disconnect = LoginDisconnect::from_packet(&packet)
                        .map_err(|e| ClientError::protocol(Phase::Login, e))?;
                    tracing::warn!("Disconnected during login: {}", disconnect.reason);
                    return Err(ClientError::Disconnected {
                        reason: disconnect.reason,
                    });
                }
                ENCRYPTION_REQUEST => {
                    let request = EncryptionRequest::from_packet(&packet)
                        .map_err(|e| ClientError::protocol(Phase::Encryption, e))?;
                    self.begin_encryption(request, encryption).await?;
                    expected = &LOGIN_REPLIES_AFTER_ENCRYPTION;
                }
                SET_COMPRESSION => {
                    let SetCompression { threshold } = SetCompression::from_packet(&packet)
                        .map_err(|e| ClientError::protocol(Phase::Login, e))?;
                    tracing::debug!("Compression threshold set to {}", threshold);
                    self.transport.enable_compression(threshold)?;
                    self.compression_threshold = Some(threshold);
                }
                LOGIN_SUCCESS => {
                    let success = LoginSuccess::from_packet(&packet)
                        .map_err(|e| ClientError::protocol(Phase::Login, e))?;
                    tracing::info!("Logged in as {} ({})", success.username, success.uuid);
                    self.transition(ConnectionState::Play);
                    return Ok(success);
                }
                id => {
                    return Err(ClientError::protocol(
                        Phase::Login,
                        ProtocolError::UnexpectedPacketId {
                            id,
                            state: ConnectionState::Login,
                            direction: Direction::Clientbound,
                        },
                    ))
                }
            }
        }
    }

    /// Authenticates with `source`, then logs in under the account's
    /// display name. The credentials are passed on to the encryption
    /// handler.
    pub async fn login_with_credentials<C, E>(
        &mut self,
        source: &C,
        username: &str,
        password: &str,
        encryption: &mut E,
    ) -> Result<LoginSuccess, ClientError>
    where
        C: CredentialSource,
        E: EncryptionHandler,
    {
        self.require_state(ConnectionState::Login)?;
        let credentials = source.authenticate(username, password).await?;
        let display_name = credentials.display_name.clone();
        self.credentials = Some(credentials);
        self.login(&display_name, encryption).await
    }

    async fn begin_encryption<E>(
        &mut self,
        request: EncryptionRequest,
        encryption: &mut E,
    ) -> Result<(), ClientError>
    where
        E: EncryptionHandler,
    {
        tracing::debug!(
            "Server requested encryption ({} byte key)",
            request.public_key.len()
        );
        let challenge = EncryptionChallenge {
            server_id: request.server_id,
            public_key: request.public_key,
            verify_token: request.verify_token,
            credentials: self.credentials.clone(),
        };
        let reply = encryption
            .respond(&challenge)
            .await
            .map_err(|e| ClientError::Encryption(e.to_string()))?;

        self.send(&EncryptionResponse {
            shared_secret: reply.encrypted_shared_secret,
            verify_token: reply.encrypted_verify_token,
        })
        .await?;

        // Anything buffered now was read before the cipher existed
        if self.decoder.buffered() > 0 {
            return Err(ClientError::Encryption(format!(
                "{} plaintext bytes buffered past the encryption point",
                self.decoder.buffered()
            )));
        }
        self.transport
            .enable_encryption(&reply.shared_secret)
            .map_err(|e| ClientError::Encryption(e.to_string()))?;
        self.encrypted = true;
        tracing::info!("Encryption enabled");
        Ok(())
    }
}
