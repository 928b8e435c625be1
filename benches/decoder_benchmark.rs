//! Decoder benchmark: bytes to frames at typical and worst-case chunk sizes.
//!
//! Target: decoding never dominates a 100 tokens/s stream

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fadestream::{parse_line, LineDecoder};

fn body(frames: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..frames {
        body.push_str("data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\" tök");
        body.push_str(&i.to_string());
        body.push_str("\"}}]}\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn decode_chunked(c: &mut Criterion) {
    let bytes = body(1_000);
    let mut group = c.benchmark_group("decode_1000_frames");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    for size in [1, 16, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| {
                let mut decoder = LineDecoder::new();
                let mut lines = Vec::new();
                let mut deltas = 0usize;
                for piece in bytes.chunks(size) {
                    decoder.feed_into(piece, &mut lines);
                    for line in lines.drain(..) {
                        if parse_line(&line).delta().is_some() {
                            deltas += 1;
                        }
                    }
                }
                black_box(deltas)
            });
        });
    }
    group.finish();
}

fn parse_single(c: &mut Criterion) {
    let line = "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}";
    c.bench_function("parse_line_delta", |b| {
        b.iter(|| parse_line(black_box(line)));
    });
}

criterion_group!(benches, decode_chunked, parse_single);
criterion_main!(benches);
