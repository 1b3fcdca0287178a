use std::io::Cursor;

use batch_resize::processing::fit_dimensions;
use batch_resize::{ImageResizer, Size};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut buf = Vec::new();
    image
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .unwrap();
    buf
}

fn benchmark_fit(c: &mut Criterion) {
    let size = Size::new(500, 500).unwrap();
    let mut group = c.benchmark_group("fit");
    group.sample_size(20);

    for (width, height) in [(800, 600), (1920, 1080), (3000, 2000)] {
        let input = sample_jpeg(width, height);
        for (name, filter) in [("lanczos3", FilterType::Lanczos3), ("triangle", FilterType::Triangle)] {
            let resizer = ImageResizer::with_filter(filter);
            group.bench_with_input(
                BenchmarkId::new(name, format!("{width}x{height}")),
                &input,
                |b, input| {
                    b.iter(|| {
                        let mut output = Vec::new();
                        resizer
                            .fit(size, Cursor::new(input.as_slice()), &mut output)
                            .unwrap();
                        output
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_fit_dimensions(c: &mut Criterion) {
    let size = Size::new(500, 500).unwrap();
    c.bench_function("fit_dimensions", |b| {
        b.iter(|| fit_dimensions(black_box(4032), black_box(3024), black_box(size)));
    });
}

criterion_group!(benches, benchmark_fit, benchmark_fit_dimensions);
criterion_main!(benches);
