//! Command execution.

use crate::config::Config;
use crate::Commands;
use colored::Colorize;
use mcwire_client::{connect, CredentialSource, OfflineOnly, ReqwestPost, YggdrasilAuth};
use mcwire_protocol::packets::{self, NextState};
use mcwire_protocol::varint::{decode_varint, decode_varlong, put_varint, put_varlong};
use mcwire_protocol::{ConnectionState, Direction, Packet, ProtocolError, Value};
use std::time::Duration;

/// Executes a command and returns the formatted output.
pub async fn execute(config: &Config, cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Status => {
            let mut session = connect(config.connection_config()).await?;
            session.handshake(NextState::Status).await?;
            let status = session.status().await?;

            let mut output = format!(
                "{} {} (protocol {})\n",
                "Version:".bold(),
                status.version.name.cyan(),
                status.version.protocol
            );
            if let Some(players) = &status.players {
                output.push_str(&format!(
                    "{} {}/{}\n",
                    "Players:".bold(),
                    players.online.to_string().yellow(),
                    players.max
                ));
            }
            output.push_str(&format!("{} {}", "MOTD:".bold(), status.description_text()));
            Ok(output)
        }

        Commands::Ping { count } => {
            let mut session = connect(config.connection_config()).await?;
            session.handshake(NextState::Status).await?;

            let mut lines = Vec::new();
            for seq in 0..count {
                let rtt = session.ping(i64::from(seq)).await?;
                lines.push(format!(
                    "{} seq={} time={:.2} ms",
                    "PONG".green(),
                    seq,
                    rtt.as_secs_f64() * 1000.0
                ));
            }
            Ok(lines.join("\n"))
        }

        Commands::Login { packets, password } => {
            let connection = config.connection_config();
            let username = connection.username.clone();
            let mut session = connect(connection).await?;
            session.handshake(NextState::Login).await?;
            let success = match password {
                Some(password) => {
                    let auth = account_service(config)?;
                    session
                        .login_with_credentials(&auth, &username, &password, &mut OfflineOnly)
                        .await?
                }
                None => session.login(&username, &mut OfflineOnly).await?,
            };

            let mut lines = vec![format!(
                "{} as {} ({})",
                "Logged in".green(),
                success.username.cyan(),
                success.uuid
            )];
            if let Some(threshold) = session.compression_threshold() {
                lines.push(format!("compression threshold: {}", threshold));
            }
            for _ in 0..packets {
                let frame = session.receive_frame().await?;
                lines.push(describe_frame(session.state(), &frame));
            }
            Ok(lines.join("\n"))
        }

        Commands::EncodeVarint { value, long } => {
            let mut buf = Vec::new();
            if long {
                put_varlong(&mut buf, value);
            } else {
                let value = i32::try_from(value)
                    .map_err(|_| format!("{} does not fit in a VarInt, use --long", value))?;
                put_varint(&mut buf, value);
            }
            Ok(hex::encode(buf))
        }

        Commands::DecodeVarint { hex: input, long } => {
            let bytes = hex::decode(input.trim())?;
            let (value, consumed) = if long {
                decode_varlong(&bytes, 0)?
            } else {
                decode_varint(&bytes, 0).map(|(v, n)| (i64::from(v), n))?
            };
            let mut output = value.to_string();
            if consumed < bytes.len() {
                output.push_str(&format!(
                    " {}",
                    format!("({} trailing bytes)", bytes.len() - consumed).dimmed()
                ));
            }
            Ok(output)
        }

        Commands::Auth { account, password } => {
            let auth = account_service(config)?;
            let credentials = auth.authenticate(&account, &password).await?;

            let mut output = format!(
                "{} {} ({})",
                "Authenticated".green(),
                credentials.display_name.cyan(),
                credentials.profile_id.hyphenated()
            );
            if let Some(token) = &credentials.client_token {
                output.push_str(&format!("\n{} {}", "Client token:".bold(), token));
            }
            Ok(output)
        }

        Commands::Config { output } => match output {
            Some(path) => {
                config.save(&path)?;
                Ok(format!("Wrote {}", path.display()))
            }
            None => Ok(config.to_yaml()?),
        },
    }
}

fn account_service(
    config: &Config,
) -> Result<YggdrasilAuth<ReqwestPost>, Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.connection.connect_timeout_secs);
    Ok(YggdrasilAuth::new(ReqwestPost::new(timeout)?, config.auth.clone()))
}

/// One-line summary of a client-bound frame.
fn describe_frame(state: ConnectionState, frame: &[u8]) -> String {
    match packets::parse_registered(state, Direction::Clientbound, frame) {
        Ok((packet, _)) => format_packet(&packet),
        Err(ProtocolError::UnexpectedPacketId { id, .. }) => format!(
            "{} {:#04x} ({} bytes)",
            "unknown".dimmed(),
            id,
            frame.len()
        ),
        Err(e) => format!("{}: {}", "malformed".red(), e),
    }
}

fn format_packet(packet: &Packet) -> String {
    let fields: Vec<String> = packet
        .schema()
        .fields
        .iter()
        .zip(packet.fields())
        .map(|(spec, value)| format!("{}={}", spec.name, format_value(value)))
        .collect();
    format!(
        "{} {:#04x} {}",
        packet.name().cyan(),
        packet.id(),
        fields.join(" ")
    )
}

fn format_value(value: &Value) -> String {
    const PREVIEW: usize = 32;
    match value {
        Value::String(s) => format!("{:?}", s),
        Value::ByteArray(b) | Value::Remaining(b) if b.len() > PREVIEW => {
            format!("{}.. ({} bytes)", hex::encode(&b[..PREVIEW]), b.len())
        }
        Value::ByteArray(b) | Value::Remaining(b) => hex::encode(b),
        Value::Position(p) => p.to_string(),
        other => format!("{:?}", other),
    }
}
