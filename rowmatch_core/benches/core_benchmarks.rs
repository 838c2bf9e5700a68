use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rowmatch_common::SourceId;
use rowmatch_core::{compare_sources, rows_from_path, CsvOptions, RowSeq};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to wrap in-memory rows as a lazy sequence
fn seq_of(rows: Vec<Vec<String>>) -> RowSeq {
    Box::new(rows.into_iter().map(Ok))
}

// Helper to build row content shared by every source
fn shared_rows(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| vec![format!("id-{}", i), format!("value-{}", i)])
        .collect()
}

// Helper to build row content unique to one source
fn unique_rows(tag: &str, count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| vec![format!("{}-{}", tag, i), format!("value-{}", i)])
        .collect()
}

// Helper to write a CSV fixture file
fn write_csv(dir: &TempDir, name: &str, rows: &[Vec<String>]) -> PathBuf {
    let path = dir.path().join(name);
    let mut content = String::new();
    for row in rows {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path
}

fn bench_identical_pair(c: &mut Criterion) {
    c.bench_function("compare_identical_2x1000", |b| {
        b.iter_batched(
            || {
                vec![
                    (SourceId::from("a"), seq_of(shared_rows(1000))),
                    (SourceId::from("b"), seq_of(shared_rows(1000))),
                ]
            },
            |sources| {
                let report = compare_sources(sources).unwrap();
                black_box(report);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_disjoint_pair(c: &mut Criterion) {
    // Worst case for memory: no content ever matches, every bucket stays
    c.bench_function("compare_disjoint_2x1000", |b| {
        b.iter_batched(
            || {
                vec![
                    (SourceId::from("a"), seq_of(unique_rows("a", 1000))),
                    (SourceId::from("b"), seq_of(unique_rows("b", 1000))),
                ]
            },
            |sources| {
                let report = compare_sources(sources).unwrap();
                black_box(report);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_many_sources(c: &mut Criterion) {
    c.bench_function("compare_identical_8x200", |b| {
        b.iter_batched(
            || {
                (0..8)
                    .map(|i| {
                        (
                            SourceId::new(format!("source-{}", i)),
                            seq_of(shared_rows(200)),
                        )
                    })
                    .collect::<Vec<_>>()
            },
            |sources| {
                let report = compare_sources(sources).unwrap();
                black_box(report);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_csv_files(c: &mut Criterion) {
    c.bench_function("compare_csv_files_2x500", |b| {
        let dir = TempDir::new().unwrap();
        let mut left_rows = shared_rows(500);
        left_rows.push(vec!["only".to_string(), "left".to_string()]);
        let left = write_csv(&dir, "left.csv", &left_rows);
        let right = write_csv(&dir, "right.csv", &shared_rows(500));
        let options = CsvOptions::default();

        b.iter_batched(
            || {
                vec![
                    (
                        SourceId::from("left"),
                        rows_from_path(&left, &options).unwrap(),
                    ),
                    (
                        SourceId::from("right"),
                        rows_from_path(&right, &options).unwrap(),
                    ),
                ]
            },
            |sources| {
                let report = compare_sources(sources).unwrap();
                black_box(report);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_identical_pair,
    bench_disjoint_pair,
    bench_many_sources,
    bench_csv_files
);
criterion_main!(benches);
