//! Ranking Pass Performance Benchmark
//!
//! Measures a full ranking pass (profile building + scoring + tagging) over a
//! library-sized set of playlists.
//!
//! **Goal:** Ranking must stay negligible next to the data fetch phase
//! **Target:** < 5 ms for 200 playlists × 100 tracks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use triage_common::matching::{build_profile, rank_playlists, score, FeatureVector, PlaylistCandidate, PlaylistRef};

/// Deterministic pseudo-random feature vector
fn synthetic_vector(seed: u64) -> FeatureVector {
    let mut rng = StdRng::seed_from_u64(seed);

    FeatureVector::from_values([
        rng.gen::<f64>(),
        rng.gen::<f64>(),
        f64::from(rng.gen_range(0u8..12)),
        rng.gen::<f64>(),
        rng.gen::<f64>(),
        rng.gen::<f64>() * 0.5,
        rng.gen::<f64>() * 0.4,
        rng.gen::<f64>() * 0.2,
        rng.gen_range(60.0..180.0),
    ])
}

fn synthetic_library(playlists: usize, tracks: usize) -> Vec<PlaylistCandidate> {
    (0..playlists)
        .map(|p| {
            let vectors = (0..tracks)
                .map(|t| synthetic_vector((p * tracks + t) as u64))
                .collect();
            PlaylistCandidate::new(PlaylistRef::new(format!("pl{}", p), format!("Playlist {}", p)), vectors)
        })
        .collect()
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");
    let track = synthetic_vector(u64::MAX);

    for playlists in [10usize, 50, 200] {
        let library = synthetic_library(playlists, 100);
        group.bench_with_input(BenchmarkId::new("rank_playlists", playlists), &library, |b, lib| {
            b.iter(|| black_box(rank_playlists(&track, lib.iter().cloned())));
        });
    }

    group.finish();
}

fn bench_profile_and_score(c: &mut Criterion) {
    let vectors: Vec<FeatureVector> = (0..1000).map(synthetic_vector).collect();
    let track = synthetic_vector(42_000);

    c.bench_function("build_profile_1000", |b| {
        b.iter(|| black_box(build_profile(black_box(&vectors))));
    });

    let profile = build_profile(&vectors).expect("1000 tracks build a profile");
    assert!(score(&track, &profile).is_ok());
    c.bench_function("score", |b| {
        b.iter(|| black_box(score(black_box(&track), black_box(&profile))));
    });
}

criterion_group!(benches, bench_ranking, bench_profile_and_score);
criterion_main!(benches);
