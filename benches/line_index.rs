use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rlpager::file_handler::{IndexedFile, LineScanner, LineSource, SharedLineIndex};
use std::io::Write;
use tempfile::NamedTempFile;

fn log_bytes(size_kb: usize) -> Vec<u8> {
    let target = size_kb * 1024;
    let mut content = Vec::with_capacity(target + 128);
    let mut line_num = 0usize;
    while content.len() < target {
        let line = format!(
            "[2024-09-02T10:{:02}:{:02}] INFO api: Request {} processed\tuser_{}\n",
            (line_num / 60) % 60,
            line_num % 60,
            line_num,
            line_num % 1000
        );
        content.extend_from_slice(line.as_bytes());
        line_num += 1;
    }
    content
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_scan");
    group.sample_size(20);

    for &size_kb in &[100usize, 1_000, 10_000] {
        let content = log_bytes(size_kb);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("64k_chunks", format!("{}KB", size_kb)),
            &content,
            |b, content| {
                b.iter(|| {
                    let index = SharedLineIndex::new(2048);
                    let mut scanner = LineScanner::new();
                    for chunk in content.chunks(64 * 1024) {
                        index.append(&scanner.feed(chunk));
                    }
                    black_box(index.line_count())
                })
            },
        );
    }
    group.finish();
}

fn bench_read_line(c: &mut Criterion) {
    let content = log_bytes(5_000);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&content).unwrap();
    file.flush().unwrap();

    let index = SharedLineIndex::new(2048);
    let mut scanner = LineScanner::new();
    index.append(&scanner.feed(&content));
    let source = IndexedFile::new(file.reopen().unwrap(), index.clone(), 256);
    let lines = index.line_count();

    let mut group = c.benchmark_group("read_line");
    group.bench_function("page_cached", |b| {
        b.iter(|| {
            for n in 1..25 {
                black_box(source.read_line(n));
            }
        })
    });
    group.bench_function("page_scattered", |b| {
        let mut top = 1u64;
        b.iter(|| {
            top = (top * 7919) % (lines - 30) + 1;
            for n in top..top + 24 {
                black_box(source.read_line(n));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_scan, bench_read_line);
criterion_main!(benches);
