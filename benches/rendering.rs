//! Benchmarks for preview output.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use marklive::render::RenderedView;

fn bench_visible_lines(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/sample.md");
    let view = RenderedView::new(md, 60, 0);

    c.bench_function("visible_lines", |b| {
        b.iter(|| view.document().visible_lines(black_box(0), black_box(24)))
    });
}

fn bench_to_html(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/sample.md");
    let view = RenderedView::new(md, 60, 0);

    c.bench_function("to_html", |b| b.iter(|| black_box(&view).to_html()));
}

criterion_group!(benches, bench_visible_lines, bench_to_html);
criterion_main!(benches);
