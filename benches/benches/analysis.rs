use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depcache::DependencyCache;
use parsers::parse_java;
use std::path::PathBuf;
use std::{fs, io};

const FIXTURE_PATH: &str = "/src/bench/store/Inventory.java";

fn fixture() -> String {
    let file = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/Inventory.java");
    fs::read_to_string(&file).expect("read fixture")
}

fn bench_parse(c: &mut Criterion) {
    let content = fixture();
    c.bench_function("parse_java", |b| {
        b.iter(|| parse_java(black_box(&content), FIXTURE_PATH).unwrap())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let parsed = parse_java(&fixture(), FIXTURE_PATH).expect("parse fixture");
    c.bench_function("resolve_java", |b| b.iter(|| black_box(&parsed).resolve(&[])));
}

fn bench_build(c: &mut Criterion) {
    let parsed = parse_java(&fixture(), FIXTURE_PATH).expect("parse fixture");
    let resolver = parsed.resolve(&[]);
    c.bench_function("build_model", |b| {
        b.iter(|| builder::build_model(black_box(&parsed.tree), &resolver, FIXTURE_PATH))
    });
}

fn bench_render(c: &mut Criterion) {
    let parsed = parse_java(&fixture(), FIXTURE_PATH).expect("parse fixture");
    let resolver = parsed.resolve(&[]);
    let model = builder::build_model(&parsed.tree, &resolver, FIXTURE_PATH);
    c.bench_function("render_document", |b| {
        b.iter(|| writer::render(&mut io::sink(), black_box(&model)).unwrap())
    });
}

fn bench_cache_merge(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("src");
    let cache_path = dir.path().join("incdeps.txt");
    let mut lines = String::new();
    for i in 0..500 {
        lines.push_str(&format!("{}/pkg/File{i}.java|java/util/;List.java;\n", root.display()));
    }
    fs::write(&cache_path, lines).expect("seed cache");

    let parsed = parse_java(&fixture(), FIXTURE_PATH).expect("parse fixture");
    let resolver = parsed.resolve(&[]);
    let model = builder::build_model(&parsed.tree, &resolver, FIXTURE_PATH);
    let src = root.join("bench/store/Inventory.java");
    let src = src.to_string_lossy().into_owned();
    let cache = DependencyCache::new(&cache_path);
    c.bench_function("merge_dependency_cache", |b| {
        b.iter(|| {
            cache
                .merge(black_box(&src), black_box(&model.module.imports), &root)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_resolve,
    bench_build,
    bench_render,
    bench_cache_merge
);
criterion_main!(benches);
