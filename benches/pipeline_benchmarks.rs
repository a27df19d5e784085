use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use snapraid_dupls::classify::LineClassifier;
use snapraid_dupls::engine::{DupResolver, PathFilter};
use snapraid_dupls::input::InputSource;
use snapraid_dupls::pipeline::Pipeline;
use std::io::{self, Cursor};

// Helper to build a synthetic report with `disks` declarations and `pairs` duplicate lines
fn synthetic_report(disks: usize, pairs: usize) -> String {
    let mut report = String::new();
    for d in 0..disks {
        report.push_str(&format!("data:d{d}:/mnt/disk{d}/\n"));
    }
    for i in 0..pairs {
        let kept = i % disks;
        let removal = (i + 1) % disks;
        report.push_str(&format!(
            "dup:d{kept}:photos/{i}.jpg:d{removal}:backup/photos/{i}.jpg:{}: dup\n",
            (i as u64 + 1) * 4096
        ));
    }
    report
}

// 1. Classification Benchmarks
fn bench_classifier(c: &mut Criterion) {
    let classifier = LineClassifier::new();
    let dup: &[u8] = b"dup:d1:photos/2019/IMG_0001.jpg:d2:backup/photos/2019/IMG_0001.jpg:3145728: dup";
    let data: &[u8] = b"data:d1:/mnt/disk1/";
    let other: &[u8] = b"Loading state from /var/snapraid/content...";

    let mut group = c.benchmark_group("classify");
    group.bench_function("dup_line", |b| {
        b.iter(|| black_box(classifier.classify(black_box(dup), 1).unwrap()))
    });
    group.bench_function("data_line", |b| {
        b.iter(|| black_box(classifier.classify(black_box(data), 1).unwrap()))
    });
    group.bench_function("ignored_line", |b| {
        b.iter(|| black_box(classifier.classify(black_box(other), 1).unwrap()))
    });
    group.finish();
}

// 2. Full Pass Benchmarks
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for pairs in [1_000, 100_000] {
        let report = synthetic_report(8, pairs);
        group.throughput(Throughput::Bytes(report.len() as u64));

        group.bench_function(format!("match_all_{pairs}"), |b| {
            b.iter(|| {
                let resolver = DupResolver::new(PathFilter::match_all());
                let result = Pipeline::new(resolver)
                    .run(Cursor::new(report.as_bytes()), &mut io::sink(), &InputSource::Stdin)
                    .unwrap();
                black_box(result);
            })
        });

        group.bench_function(format!("regex_filter_{pairs}"), |b| {
            let filter = PathFilter::new(r"^/mnt/disk[0-3]/photos/\d+5\.jpg$", 8192).unwrap();
            b.iter(|| {
                let resolver = DupResolver::new(filter.clone());
                let result = Pipeline::new(resolver)
                    .run(Cursor::new(report.as_bytes()), &mut io::sink(), &InputSource::Stdin)
                    .unwrap();
                black_box(result);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classifier, bench_pipeline);
criterion_main!(benches);
