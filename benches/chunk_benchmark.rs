//! Chunking benchmark: full re-chunk versus the incremental chunker.
//!
//! Target: the incremental path stays flat as the reply grows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fadestream::{chunk, Chunker};

/// A reply of roughly `words` words spread over short lines.
fn reply(words: usize) -> String {
    let mut text = String::new();
    for i in 0..words {
        text.push_str("token");
        text.push(if i % 12 == 11 { '\n' } else { ' ' });
    }
    text
}

fn chunk_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_full");
    for words in [100, 1_000, 10_000] {
        let text = reply(words);
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| chunk(black_box(text)));
        });
    }
    group.finish();
}

/// Stream a reply three bytes at a time, re-chunking after every delta.
fn chunk_streaming(c: &mut Criterion) {
    let text = reply(1_000);
    let prefixes: Vec<&str> = (0..=text.len())
        .step_by(3)
        .filter(|&i| text.is_char_boundary(i))
        .map(|i| &text[..i])
        .collect();

    let mut group = c.benchmark_group("chunk_streaming_1000_words");
    group.bench_function("full_rechunk", |b| {
        b.iter(|| {
            for prefix in &prefixes {
                black_box(chunk(prefix));
            }
        });
    });
    group.bench_function("incremental", |b| {
        b.iter(|| {
            let mut chunker = Chunker::new();
            for prefix in &prefixes {
                black_box(chunker.update(prefix));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, chunk_full, chunk_streaming);
criterion_main!(benches);
