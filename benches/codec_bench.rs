//! Performance benchmarks for BusCodec and the stream parser.
//!
//! A node at 115200 baud sees at most ~11 kB/s, so these mostly guard
//! against regressions in the per-byte deframing loop.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use doorkey_core::{DeviceAddress, constants::PROTOCOL_VERSION};
use doorkey_protocol::{BusCodec, Command, PingRequest, StreamParser, encode_frame};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

/// Request bytes of a ping whose echo data must be stuffed.
fn stuffed_ping() -> Vec<u8> {
    Command::Ping(PingRequest::new([0x7E, 0x7D])).encode_request(PROTOCOL_VERSION, DeviceAddress::new(3))
}

/// Request bytes of a status query.
fn status_request() -> Vec<u8> {
    Command::GetStatus.encode_request(PROTOCOL_VERSION, DeviceAddress::new(3))
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    for (name, request) in [("status", status_request()), ("stuffed_ping", stuffed_ping())] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &request, |b, request| {
            b.iter(|| {
                let mut codec = BusCodec::new();
                let mut buffer = BytesMut::new();
                codec.encode(black_box(request.clone()), &mut buffer).unwrap();
                black_box(buffer);
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    for (name, request) in [("status", status_request()), ("stuffed_ping", stuffed_ping())] {
        let wire = encode_frame(&request);
        group.bench_with_input(BenchmarkId::from_parameter(name), &wire, |b, wire| {
            b.iter(|| {
                let mut codec = BusCodec::new();
                let mut buffer = BytesMut::from(&wire[..]);
                black_box(codec.decode(&mut buffer).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark decoding many back-to-back frames.
fn bench_decode_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_batch");

    for batch_size in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(batch_size as u64));

        let mut wire = Vec::new();
        for _ in 0..batch_size {
            wire.extend_from_slice(&encode_frame(&stuffed_ping()));
        }

        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &wire, |b, wire| {
            b.iter(|| {
                let mut parser = StreamParser::new();
                parser.feed(black_box(wire));
                black_box(parser.drain_frames().count());
            });
        });
    }

    group.finish();
}

/// Benchmark a node-like byte-at-a-time receive loop.
fn bench_byte_at_a_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_at_a_time");
    group.throughput(Throughput::Elements(1));

    let wire = encode_frame(&stuffed_ping());

    group.bench_function("feed_byte", |b| {
        b.iter(|| {
            let mut parser = StreamParser::new();
            let mut completed = false;
            for &byte in &wire {
                completed |= parser.feed_byte(black_box(byte));
            }
            black_box(completed);
        });
    });

    group.finish();
}

/// Benchmark recovery when noise precedes every frame.
fn bench_noisy_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("noisy_line");
    group.throughput(Throughput::Elements(100));

    let mut wire = Vec::new();
    for i in 0..100u8 {
        wire.extend_from_slice(&[0x00, i, 0xFF, 0x7D]);
        wire.extend_from_slice(&encode_frame(&status_request()));
    }

    group.bench_function("100_frames", |b| {
        b.iter(|| {
            let mut parser = StreamParser::new();
            parser.feed(black_box(&wire));
            black_box(parser.frames_available());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_decode_batch,
    bench_byte_at_a_time,
    bench_noisy_line,
);

criterion_main!(benches);
