//! Per-frame pipeline throughput

use chew_detect::{ChewPipeline, DetectorConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use face_landmarks::{index, Landmark, LandmarkFrame};

fn frame(ratio: f64) -> LandmarkFrame {
    let mut points = vec![Landmark::new(0.5, 0.5, 0.0); index::FACE_MESH_POINTS];
    points[index::GLABELLA] = Landmark::new(0.5, 0.3, 0.0);
    points[index::CHIN] = Landmark::new(0.5, 0.3 + 0.4 * ratio, 0.0);
    points[index::LEFT_CHEEK] = Landmark::new(0.3, 0.5, 0.0);
    points[index::RIGHT_CHEEK] = Landmark::new(0.7, 0.5, 0.0);
    LandmarkFrame::new(points)
}

fn bench_strategies(c: &mut Criterion) {
    // One second of 30fps chewing at roughly 1.5 chews per second
    let frames: Vec<LandmarkFrame> = (0..30)
        .map(|i| frame(1.0 + 0.08 * (i as f64 * std::f64::consts::PI / 10.0).sin().abs()))
        .collect();

    for (name, config) in [
        ("hysteresis", DetectorConfig::hysteresis()),
        ("peak", DetectorConfig::peak()),
    ] {
        c.bench_function(&format!("pipeline_{}_30_frames", name), |b| {
            let mut pipeline = ChewPipeline::new(config.clone()).unwrap();
            pipeline.observe(Some(&frames[0]));
            pipeline.calibrate().unwrap();
            let mut t = 0u64;

            b.iter(|| {
                for f in &frames {
                    t += 33;
                    black_box(pipeline.process(Some(black_box(f)), t));
                }
            })
        });
    }
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
