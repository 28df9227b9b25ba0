//! Benchmarks for pagemark conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks convert synthetic page geometry: a heading, two columns
//! of body text and a ruled table per page.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pagemark::{BBox, ConvertOptions, DrawingPrimitive, PageGeometry, RenderOptions, TextRun};

/// Creates a synthetic page with the given index.
fn create_test_page(index: usize) -> PageGeometry {
    let mut page = PageGeometry::letter(index);

    page.push_run(TextRun::new(
        format!("Section {}", index + 1),
        BBox::new(72.0, 60.0, 220.0, 76.0),
        "Helvetica-Bold",
        16.0,
    ));

    // Two columns of body text
    for (x0, column) in [(72.0, "left"), (318.0, "right")] {
        for line in 0..30 {
            let y = 100.0 + line as f32 * 12.0;
            for word in 0..4 {
                let x = x0 + word as f32 * 55.0;
                page.push_run(TextRun::new(
                    format!("{}{}w{}", column, line, word),
                    BBox::new(x, y, x + 52.0, y + 10.0),
                    "Times-Roman",
                    10.0,
                ));
            }
        }
    }

    // A ruled 4 x 3 table
    let top = 500.0;
    for row in 0..=4 {
        let y = top + row as f32 * 20.0;
        page.push_primitive(DrawingPrimitive::line(72.0, y, 372.0, y));
    }
    for col in 0..=3 {
        let x = 72.0 + col as f32 * 100.0;
        page.push_primitive(DrawingPrimitive::line(x, top, x, top + 80.0));
    }
    for row in 0..4 {
        for col in 0..3 {
            let x = 82.0 + col as f32 * 100.0;
            let y = top + 5.0 + row as f32 * 20.0;
            page.push_run(TextRun::new(
                format!("r{}c{}", row, col),
                BBox::new(x, y, x + 30.0, y + 10.0),
                "Helvetica",
                9.0,
            ));
        }
    }

    page
}

fn create_test_document(page_count: usize) -> Vec<PageGeometry> {
    (0..page_count).map(create_test_page).collect()
}

/// Benchmark conversion at various sizes, parallel and sequential.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    for page_count in [1, 10, 50].iter() {
        let pages = create_test_document(*page_count);

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            b.iter(|| pagemark::convert(black_box(&pages)).unwrap());
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            b.iter(|| {
                pagemark::convert_with_options(black_box(&pages), ConvertOptions::new().sequential())
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark Markdown rendering of an already converted document.
fn bench_rendering(c: &mut Criterion) {
    let doc = pagemark::convert(&create_test_document(10)).unwrap();
    let options = RenderOptions::new().with_cleanup_preset(pagemark::CleanupPreset::Standard);

    c.bench_function("render_markdown_10_pages", |b| {
        b.iter(|| pagemark::render::to_markdown(black_box(&doc), &options).unwrap());
    });
}

criterion_group!(benches, bench_conversion, bench_rendering);
criterion_main!(benches);
