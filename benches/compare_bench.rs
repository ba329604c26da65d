//! Criterion benchmarks for similarity scoring and diff marking.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sheet_compare::mark::mark;
use sheet_compare::models::{Metric, Table};
use sheet_compare::similarity::similarity;

fn bench_similarity(c: &mut Criterion) {
    let pairs = [
        ("short", "Ana", "Ana Maria"),
        ("address", "Rua das Flores, 120 - Apto 302", "Rua das Flôres 120 apto 320"),
        (
            "long",
            "Condomínio Edifício São Jorge - taxa ordinária referente a março",
            "Condominio Edificio Sao Jorge - taxa extraordinaria referente a marco",
        ),
    ];

    let mut group = c.benchmark_group("similarity");

    for (name, a, b) in pairs {
        group.bench_with_input(BenchmarkId::new("characters", name), &(a, b), |bench, &(a, b)| {
            bench.iter(|| similarity(black_box(a), black_box(b), Metric::CharacterOverlap))
        });
        group.bench_with_input(BenchmarkId::new("levenshtein", name), &(a, b), |bench, &(a, b)| {
            bench.iter(|| similarity(black_box(a), black_box(b), Metric::EditDistance))
        });
    }

    group.finish();
}

/// Synthetic table; `variant` changes every 7th cell.
fn create_table(rows: usize, cols: usize, variant: bool) -> Table {
    let mut data = vec![(0..cols).map(|c| format!("Coluna {}", c + 1)).collect::<Vec<_>>()];
    for r in 0..rows {
        data.push(
            (0..cols)
                .map(|c| {
                    let shift = if variant && (r * cols + c) % 7 == 0 { 3 } else { 0 };
                    format!("Unidade {} bloco {}", r + shift, c)
                })
                .collect(),
        );
    }
    Table::from_rows(data)
}

fn bench_mark(c: &mut Criterion) {
    let sizes = [100, 1000];

    let mut group = c.benchmark_group("mark");

    for rows in sizes {
        let table_a = create_table(rows, 10, false);
        let table_b = create_table(rows, 10, true);
        // Ragged: B is 20% shorter
        let table_short = create_table(rows * 4 / 5, 10, true);

        group.bench_with_input(BenchmarkId::new("characters", rows), &rows, |b, _| {
            b.iter(|| mark(black_box(&table_a), black_box(&table_b), 80, Metric::CharacterOverlap))
        });

        group.bench_with_input(BenchmarkId::new("levenshtein", rows), &rows, |b, _| {
            b.iter(|| mark(black_box(&table_a), black_box(&table_b), 80, Metric::EditDistance))
        });

        group.bench_with_input(BenchmarkId::new("ragged", rows), &rows, |b, _| {
            b.iter(|| mark(black_box(&table_a), black_box(&table_short), 80, Metric::EditDistance))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_similarity, bench_mark);
criterion_main!(benches);
