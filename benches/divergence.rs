//! Performance measurement for pairwise divergence computation at
//! varying collection sizes

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ndarray::Array2;
use std::hint::black_box;
use tilesig::analysis::DivergenceMatrix;
use tilesig::signature::extract::extract_signatures;
use tilesig::signature::{MissingPolicy, SignatureCollection};

const DIMENSIONS: usize = 12;

// Deterministic pseudo-random composition vectors, no RNG dependency
fn synthetic_collection(tiles: usize, salt: usize) -> Option<SignatureCollection> {
    let mut vectors = Vec::with_capacity(tiles);
    for tile in 0..tiles {
        let raw: Vec<f64> = (0..DIMENSIONS)
            .map(|k| ((tile * 31 + k * 17 + salt * 7) % 97 + 1) as f64)
            .collect();
        let total: f64 = raw.iter().sum();
        vectors.push(raw.into_iter().map(|value| value / total).collect());
    }
    SignatureCollection::from_vectors(vectors, MissingPolicy::ExcludeTile).ok()
}

/// Measures matrix computation cost as both collections grow
fn bench_divergence_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("divergence_matrix");

    for &tiles in &[50, 100, 200] {
        let Some(left) = synthetic_collection(tiles, 1) else {
            group.finish();
            return;
        };
        let Some(right) = synthetic_collection(tiles, 2) else {
            group.finish();
            return;
        };

        group.bench_with_input(BenchmarkId::from_parameter(tiles), &tiles, |b, _| {
            b.iter(|| {
                let matrix = DivergenceMatrix::compute(black_box(&left), black_box(&right));
                black_box(matrix)
            });
        });
    }

    group.finish();
}

/// Measures signature extraction over a synthetic categorical grid
fn bench_extraction(c: &mut Criterion) {
    let grid = Array2::from_shape_fn((512, 512), |(row, col)| ((row * 7 + col * 13) % 9) as u32);
    let categories: Vec<u32> = (0..9).collect();

    c.bench_function("extract_signatures_512", |b| {
        b.iter(|| {
            let result = extract_signatures(black_box(&grid), &categories, 32, None);
            black_box(result)
        });
    });
}

criterion_group!(benches, bench_divergence_matrix, bench_extraction);
criterion_main!(benches);
