use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use memail::mime::walk::{walk_message, WalkOptions};

fn bench_walk_nested(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("nested.eml");
    let raw = std::fs::read(&fixture_path).unwrap();

    c.bench_function("walk_nested_eml", |b| {
        b.iter(|| walk_message(&raw, &WalkOptions::default()).count())
    });
}

fn bench_walk_many_parts(c: &mut Criterion) {
    let mut raw = b"Content-Type: multipart/mixed; boundary=\"sep\"\r\n\r\n".to_vec();
    for i in 0..1_000 {
        raw.extend_from_slice(b"--sep\r\nContent-Type: text/plain; charset=utf-8\r\n");
        raw.extend_from_slice(b"Content-Transfer-Encoding: base64\r\n\r\n");
        raw.extend_from_slice(b"aGVsbG8gd29ybGQ=\r\n");
        if i % 10 == 0 {
            raw.extend_from_slice(b"--sep\r\nContent-Type: application/pdf\r\n");
            raw.extend_from_slice(b"Content-Disposition: attachment; filename=\"r.pdf\"\r\n\r\nJVBERi0=\r\n");
        }
    }
    raw.extend_from_slice(b"--sep--\r\n");

    c.bench_function("walk_1000_base64_parts", |b| {
        b.iter(|| walk_message(&raw, &WalkOptions::default()).count())
    });
}

fn bench_walk_deep_nesting(c: &mut Criterion) {
    let depth = 200;
    let mut raw = Vec::new();
    for level in 0..depth {
        raw.extend_from_slice(
            format!("Content-Type: multipart/mixed; boundary=\"b{level}\"\n\n--b{level}\n").as_bytes(),
        );
    }
    raw.extend_from_slice(b"Content-Type: text/plain\n\nleaf\n");
    for level in (0..depth).rev() {
        raw.extend_from_slice(format!("--b{level}--\n").as_bytes());
    }
    let options = WalkOptions { max_depth: depth };

    c.bench_function("walk_200_levels", |b| {
        b.iter(|| walk_message(&raw, &options).count())
    });
}

criterion_group!(
    benches,
    bench_walk_nested,
    bench_walk_many_parts,
    bench_walk_deep_nesting
);
criterion_main!(benches);
