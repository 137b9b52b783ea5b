use criterion::{Criterion, criterion_group, criterion_main};
use listmark_engine::{Cmd, Document, LivePipeline, ProcessingConfig, render_markdown};

fn generate_document(sections: usize) -> String {
    let base = "# Section\n\n1. first\n2. second\n   a. nested\n   b. nested\n\n(@) example\n\n(claim) A labelled claim\n\nSee \\ref{claim} and H~2~O.\n\nTerm\n: definition\n\n```\n1. not a list\n```\n\n";
    base.repeat(sections)
}

fn bench_reading_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading");
    group.sample_size(10);

    let content = generate_document(200);
    let config = ProcessingConfig::default();
    group.bench_function("render_markdown", |b| {
        b.iter(|| render_markdown(std::hint::black_box(&content), &config));
    });

    group.finish();
}

fn bench_live_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("live");
    group.sample_size(10);

    let content = generate_document(200);
    let doc = Document::from_bytes(content.as_bytes()).unwrap();

    group.bench_function("first_pass", |b| {
        b.iter(|| {
            let mut pipeline = LivePipeline::default();
            std::hint::black_box(pipeline.process(&doc).unwrap());
        });
    });

    group.bench_function("edit_at_top_with_viewport", |b| {
        let mut d = doc.clone();
        let mut pipeline = LivePipeline::default();
        pipeline.set_viewport(0..40);
        pipeline.process(&d).unwrap();
        b.iter(|| {
            d.apply(Cmd::InsertText {
                at: std::hint::black_box(13),
                text: "x".to_string(),
            });
            std::hint::black_box(pipeline.process(&d).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_reading_mode, bench_live_pipeline);
criterion_main!(benches);
