//! Performance benchmarks for outline building
//!
//! - Outline construction from long heading sequences
//! - Markup rendering of the resulting forest
//! - Markdown post extraction end to end
//! - Active heading lookup for a scroll position
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sky_toc::{
    config::Selectors,
    extract::{Post, PostFormat},
    heading::HeadingRecord,
    render::to_markup,
    tracker::active_heading,
    Outline,
};

// Levels wander like a real post: mostly h2/h3, occasional h1 and deeper sections.
fn headings(len: usize) -> Vec<HeadingRecord> {
    let pattern = [1u8, 2, 3, 3, 2, 3, 4, 4, 2, 1, 2, 5, 6, 2];
    (0..len)
        .map(|index| {
            HeadingRecord::new(pattern[index % pattern.len()], &format!("Section {index}"))
                .unwrap()
        })
        .collect()
}

fn markdown_post(len: usize) -> String {
    headings(len)
        .iter()
        .map(|heading| {
            format!(
                "{} {}\n\nA paragraph of body text under the heading.\n\n",
                "#".repeat(usize::from(heading.level.get())),
                heading.text
            )
        })
        .collect()
}

fn bench_outline_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_build");
    for len in [10, 100, 1000] {
        let source = headings(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &source, |b, source| {
            b.iter(|| {
                let mut headings = source.clone();
                Outline::build(black_box(&mut headings)).map(|outline| outline.len())
            });
        });
    }
    group.finish();
}

fn bench_render_markup(c: &mut Criterion) {
    let mut source = headings(1000);
    let outline = Outline::build(&mut source).unwrap();

    c.bench_function("render_markup_1000", |b| {
        b.iter(|| to_markup(black_box(outline.roots())).len());
    });
}

fn bench_markdown_extraction(c: &mut Criterion) {
    let content = markdown_post(200);
    let selectors = Selectors::default();

    c.bench_function("markdown_extraction_200", |b| {
        b.iter(|| {
            let mut post =
                Post::parse(black_box(&content), PostFormat::Markdown, &selectors).unwrap();
            post.build_outline();
            post.to_html().len()
        });
    });
}

fn bench_active_lookup(c: &mut Criterion) {
    let mut source = headings(1000);
    let outline = Outline::build(&mut source).unwrap();
    let position = |id: &str| {
        id.strip_prefix("heading-")
            .and_then(|index| index.parse::<f64>().ok())
            .map(|index| 500.0 + index * 400.0)
    };

    c.bench_function("active_lookup_1000", |b| {
        b.iter(|| {
            active_heading(outline.entries(), black_box(200_000.0), 150.0, position)
                .map(|entry| entry.level)
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_outline_build,
        bench_render_markup,
        bench_markdown_extraction,
        bench_active_lookup
}

criterion_main!(benches);
