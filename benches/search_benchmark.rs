//! Benchmarks for ARIMAX fitting and the parallel order search.

use amara::core::{Column, DateIndexedTable};
use amara::models::{Forecaster, ARIMAX};
use amara::search::{ForecastModelSearch, SearchConfig};
use amara::utils::Metric;
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn series(n: usize) -> (Vec<f64>, Vec<f64>) {
    let promo: Vec<f64> = (0..n).map(|i| if i % 7 >= 5 { 1.0 } else { 0.0 }).collect();
    let mut error = 0.0;
    let target = (0..n)
        .map(|i| {
            error = 0.6 * error + (i as f64 * 1.37).sin();
            100.0 + 0.2 * i as f64 + 12.0 * promo[i] + error
        })
        .collect();
    (target, promo)
}

fn bench_fit(c: &mut Criterion) {
    let sizes = [100, 365, 1000];
    let mut group = c.benchmark_group("arimax_fit");

    for size in sizes {
        let (target, promo) = series(size);
        let exog = vec![promo];

        for (p, d, q) in [(1, 0, 0), (1, 1, 1), (2, 1, 2)] {
            let label = format!("({p},{d},{q})");
            group.bench_with_input(BenchmarkId::new(label, size), &target, |b, y| {
                b.iter(|| {
                    let mut model = ARIMAX::new(p, d, q);
                    model.fit(black_box(y), &exog).ok();
                    black_box(model)
                })
            });
        }
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (target, promo) = series(400);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = start.iter_days().take(target.len()).collect();
    let table = DateIndexedTable::from_columns(
        dates,
        vec![("Demand", Column::Float(target)), ("Promo", Column::Float(promo))],
    )
    .unwrap();
    let train = table.take(&(0..365).collect::<Vec<_>>());
    let forecast = table.take(&(365..400).collect::<Vec<_>>());

    let mut group = c.benchmark_group("exhaustive_search");
    group.sample_size(10);

    for threads in [1, 4] {
        let search = ForecastModelSearch::new(&train, &forecast, "Demand")
            .unwrap()
            .with_config(SearchConfig::default().with_num_threads(threads));
        group.bench_with_input(BenchmarkId::new("threads", threads), &search, |b, s| {
            b.iter(|| {
                black_box(
                    s.exhaustive_search(&[0, 1, 2], &[0, 1], &[0, 1, 2], &[Metric::MAE], None)
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit, bench_search);
criterion_main!(benches);
