//! End-to-end session benchmarks against an in-process server.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mcwire_client::{ConnectionConfig, OfflineOnly, Session, StreamTransport};
use mcwire_protocol::packets::{
    parse_registered, Handshake, LoginStart, LoginSuccess, NextState, Ping, Pong, StatusResponse,
};
use mcwire_protocol::{ConnectionState, Direction, FrameDecoder, TypedPacket};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::runtime::Runtime;
use uuid::Uuid;

const STATUS_JSON: &str = r#"{"version":{"name":"1.12.2","protocol":340},"players":{"max":20,"online":1},"description":{"text":"bench"}}"#;

/// Answers handshake, status, ping and offline login until the client hangs up.
async fn serve(mut stream: DuplexStream) {
    let mut decoder = FrameDecoder::new();
    let mut state = ConnectionState::Handshaking;
    let mut buf = vec![0u8; 4096];

    loop {
        while let Some(frame) = decoder.next_frame().unwrap() {
            let (packet, _) = parse_registered(state, Direction::Serverbound, &frame).unwrap();
            let reply = match state {
                ConnectionState::Handshaking => {
                    state = Handshake::from_packet(&packet).unwrap().next_state.into();
                    None
                }
                ConnectionState::Status => match Ping::from_packet(&packet) {
                    Ok(ping) => Some(Pong { payload: ping.payload }.to_packet()),
                    Err(_) => Some(
                        StatusResponse {
                            json: STATUS_JSON.to_string(),
                        }
                        .to_packet(),
                    ),
                },
                ConnectionState::Login => {
                    let start = LoginStart::from_packet(&packet).unwrap();
                    state = ConnectionState::Play;
                    Some(
                        LoginSuccess {
                            uuid: Uuid::nil(),
                            username: start.name,
                        }
                        .to_packet(),
                    )
                }
                ConnectionState::Play => None,
            };
            if let Some(reply) = reply {
                stream.write_all(&reply.serialize()).await.unwrap();
            }
        }

        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        decoder.extend(&buf[..n]);
    }
}

fn open_session(rt: &Runtime) -> Session<StreamTransport<DuplexStream>> {
    let (client, server) = duplex(64 * 1024);
    rt.spawn(serve(server));
    Session::new(StreamTransport::new(client, 8 * 1024), ConnectionConfig::default())
}

fn bench_ping_latency(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut session = open_session(&rt);
    rt.block_on(session.handshake(NextState::Status)).unwrap();

    let mut group = c.benchmark_group("e2e_ping");
    group.throughput(Throughput::Elements(1));

    let mut payload = 0i64;
    group.bench_function("ping", |b| {
        b.iter(|| {
            payload += 1;
            black_box(rt.block_on(session.ping(payload)).unwrap())
        });
    });

    group.finish();
}

fn bench_status(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("e2e_status");
    group.throughput(Throughput::Elements(1));

    group.bench_function("handshake_and_status", |b| {
        b.iter(|| {
            let mut session = open_session(&rt);
            rt.block_on(async {
                session.handshake(NextState::Status).await.unwrap();
                black_box(session.status().await.unwrap())
            })
        });
    });

    group.finish();
}

fn bench_offline_login(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("e2e_login");
    group.throughput(Throughput::Elements(1));

    group.bench_function("offline", |b| {
        b.iter(|| {
            let mut session = open_session(&rt);
            rt.block_on(async {
                session.handshake(NextState::Login).await.unwrap();
                black_box(session.login("bench", &mut OfflineOnly).await.unwrap())
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ping_latency,
    bench_status,
    bench_offline_login,
);

criterion_main!(benches);
