use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use investigator::{
    NoMatting, PostProcessor, RedactOp, Rect, RegionEditor, SegmentOptions,
    SegmentationPipeline, SelectionSet,
};

/// 200x200 light scene with a dark disc in the middle
fn scene() -> RgbaImage {
    RgbaImage::from_fn(200, 200, |x, y| {
        let (dx, dy) = (x as i32 - 100, y as i32 - 100);
        if dx * dx + dy * dy < 40 * 40 {
            Rgba([150, 40, 30, 255])
        } else {
            Rgba([230, 228, 220, 255])
        }
    })
}

fn bench_segment(c: &mut Criterion) {
    let image = scene();
    let selections = SelectionSet::from(vec![Rect::new(40, 40, 120, 120)]);
    let pipeline = SegmentationPipeline::new(Arc::new(NoMatting), &SegmentOptions::default());

    c.bench_function("select_object_120x120", |b| {
        b.iter(|| pipeline.select_object(black_box(&image), black_box(&selections)))
    });
}

fn bench_editor(c: &mut Criterion) {
    let image = scene();
    let selections = SelectionSet::from(vec![Rect::new(20, 20, 100, 100), Rect::new(80, 80, 100, 100)]);
    let editor = RegionEditor::default();

    c.bench_function("blur_two_regions", |b| {
        b.iter(|| editor.apply(RedactOp::Blur, black_box(&image), black_box(&selections)))
    });
}

fn bench_enhance(c: &mut Criterion) {
    let image = scene();
    let post = PostProcessor::default();

    c.bench_function("enhance_200x200", |b| b.iter(|| post.enhance(black_box(&image))));
}

criterion_group!(benches, bench_segment, bench_editor, bench_enhance);
criterion_main!(benches);
