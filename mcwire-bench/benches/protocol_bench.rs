//! Codec and packet benchmarks.

use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mcwire_protocol::packets::play::PluginMessage;
use mcwire_protocol::packets::{parse_registered, Handshake, JoinGame, NextState};
use mcwire_protocol::varint::{decode_varint, put_varint};
use mcwire_protocol::{ConnectionState, Direction, FrameDecoder, Position, TypedPacket};

fn login_handshake() -> Handshake {
    Handshake {
        protocol_version: 340,
        server_address: "example.com".to_string(),
        server_port: 25565,
        next_state: NextState::Login,
    }
}

fn join_game() -> JoinGame {
    JoinGame {
        entity_id: 1234,
        gamemode: 1,
        dimension: 0,
        difficulty: 2,
        max_players: 100,
        level_type: "default".to_string(),
        reduced_debug_info: false,
    }
}

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");

    for value in [0, 300, 25565, i32::MAX, -1] {
        let mut encoded = BytesMut::new();
        put_varint(&mut encoded, value);

        group.bench_with_input(BenchmarkId::new("encode", value), &value, |b, &value| {
            let mut buf = BytesMut::with_capacity(8);
            b.iter(|| {
                buf.clear();
                black_box(put_varint(&mut buf, black_box(value)))
            });
        });
        group.bench_with_input(BenchmarkId::new("decode", value), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_varint(encoded, 0).unwrap()));
        });
    }

    group.finish();
}

fn bench_position(c: &mut Criterion) {
    let position = Position::new(-33_554_432, -2048, 33_554_431);
    let packed = position.to_packed();

    c.bench_function("position_pack", |b| {
        b.iter(|| black_box(black_box(position).to_packed()))
    });
    c.bench_function("position_unpack", |b| {
        b.iter(|| black_box(Position::from_packed(black_box(packed))))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    group.throughput(Throughput::Elements(1));

    let handshake = login_handshake().to_packet();
    group.bench_function("handshake", |b| b.iter(|| black_box(handshake.serialize())));

    let join = join_game().to_packet();
    group.bench_function("join_game", |b| b.iter(|| black_box(join.serialize())));

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    let join = join_game().to_packet().serialize();
    group.bench_function("join_game", |b| {
        b.iter(|| {
            black_box(parse_registered(ConnectionState::Play, Direction::Clientbound, &join).unwrap())
        })
    });

    for size in [100, 1000, 10000] {
        let message = PluginMessage::new("MC|Brand", Bytes::from(vec![0x42u8; size]));
        let frame = message.to_packet().serialize();

        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::new("plugin_message", size), &frame, |b, frame| {
            b.iter(|| {
                black_box(
                    parse_registered(ConnectionState::Play, Direction::Clientbound, frame).unwrap(),
                )
            })
        });
    }

    group.finish();
}

fn bench_frame_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decoder");

    let frame = join_game().to_packet().serialize();
    let stream: Vec<u8> = frame.iter().copied().cycle().take(frame.len() * 64).collect();

    for chunk_size in [16, 256, 4096] {
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut decoder = FrameDecoder::new();
                    let mut frames = 0;
                    for chunk in stream.chunks(chunk_size) {
                        decoder.extend(chunk);
                        while let Some(frame) = decoder.next_frame().unwrap() {
                            black_box(&frame);
                            frames += 1;
                        }
                    }
                    assert_eq!(frames, 64);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_varint,
    bench_position,
    bench_serialize,
    bench_parse,
    bench_frame_decoder,
);

criterion_main!(benches);
