//! Benchmarks for the strategy cascade and candidate filtering.
//!
//! Run with: cargo bench --bench strategy_planner

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pickcore::filter::CandidateFilter;
use pickcore::models::media::{Kind, MediaItem};
use pickcore::planner::{StrategyPlanner, ThreadRandom};
use std::collections::HashSet;

fn sample_item(catalog_id: i64) -> MediaItem {
    MediaItem {
        catalog_id,
        kind: Kind::Movie,
        title: format!("item-{catalog_id}"),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        release_date: Some("2020".to_string()),
        rating: Some(7.0),
        vote_count: Some(500),
        genre_ids: vec![28],
        original_language: "en".to_string(),
    }
}

/// Benchmark: building the full 13-strategy cascade for a typical profile.
fn bench_plan_cascade(c: &mut Criterion) {
    let planner = StrategyPlanner::<ThreadRandom>::new();
    let genres = vec![28, 12, 16, 35];
    let languages = vec!["en".to_string(), "ja".to_string()];

    c.bench_function("plan_movie_cascade", |b| {
        b.iter(|| {
            let strategies = planner.plan(
                black_box(Kind::Movie),
                black_box(&genres),
                black_box(&languages),
                black_box(6.5),
            );
            black_box(strategies);
        })
    });

    c.bench_function("plan_anime_cascade", |b| {
        b.iter(|| {
            let strategies = planner.plan(
                black_box(Kind::Anime),
                black_box(&genres),
                black_box(&languages),
                black_box(6.5),
            );
            black_box(strategies);
        })
    });
}

/// Benchmark: genre-count sensitivity of the cascade (more genres means
/// more "Single genre" strategies).
fn bench_plan_by_genre_count(c: &mut Criterion) {
    let planner = StrategyPlanner::<ThreadRandom>::new();
    let languages = vec!["en".to_string()];

    let mut group = c.benchmark_group("plan_by_genre_count");
    for genre_count in [1, 3, 8, 20].iter() {
        let genres: Vec<i64> = (0..*genre_count).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(genre_count),
            &genres,
            |b, genres| {
                b.iter(|| {
                    let strategies = planner.plan(black_box(Kind::Series), genres, black_box(&languages), black_box(6.0));
                    black_box(strategies);
                })
            },
        );
    }
    group.finish();
}

/// Benchmark: candidate filtering over the 20-item sampling window.
fn bench_candidate_filter(c: &mut Criterion) {
    let random = ThreadRandom;
    let filter = CandidateFilter::new(&random);
    let items: Vec<MediaItem> = (0..100).map(sample_item).collect();

    c.bench_function("filter_choose_from_100", |b| {
        b.iter(|| {
            let choice = filter.choose(black_box(&items));
            black_box(choice);
        })
    });

    c.bench_function("filter_exclude_blacklisted_from_100", |b| {
        let mut blacklist = HashSet::new();
        for id in (0..100).step_by(3) {
            blacklist.insert((id, Kind::Movie));
        }
        b.iter(|| {
            let survivors = CandidateFilter::<ThreadRandom>::exclude_blacklisted(
                black_box(items.clone()),
                black_box(&blacklist),
            );
            black_box(survivors);
        })
    });
}

criterion_group!(
    benches,
    bench_plan_cascade,
    bench_plan_by_genre_count,
    bench_candidate_filter
);
criterion_main!(benches);
