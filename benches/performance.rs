// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for the piano
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Tone synthesis for held and replayed notes
//! - Mixer rendering in the audio callback
//! - WAV export of a recorded take

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use piano::audio::Mixer;
use piano::music::Note;
use piano::recording::WavExporter;
use piano::synth::synthesize;

/// Benchmark tone synthesis at the lengths the engine uses
fn bench_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");

    for duration in [0.5f64, 5.0].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(duration),
            duration,
            |b, &duration| b.iter(|| black_box(synthesize(Note::A, 0, black_box(duration)))),
        );
    }

    group.finish();
}

/// Benchmark one audio callback's worth of mixing
fn bench_mixer_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer_render");
    let tone: Arc<[i16]> = Arc::from(synthesize(Note::C, 0, 5.0));

    for voices in [1usize, 8, 16].iter() {
        group.bench_with_input(BenchmarkId::new("voices", voices), voices, |b, &voices| {
            let mut mixer = Mixer::new();
            for _ in 0..voices {
                mixer.start(Arc::clone(&tone), true, 0.5);
            }
            let mut buffer = vec![0.0f32; 512 * 2];
            b.iter(|| {
                mixer.render(&mut buffer, 2);
                black_box(buffer[0])
            })
        });
    }

    group.finish();
}

/// Benchmark exporting a short take
fn bench_export(c: &mut Criterion) {
    let segments: Vec<Vec<i16>> = [Note::C, Note::E, Note::G, Note::CHigh]
        .iter()
        .map(|&note| synthesize(note, 0, 0.5))
        .collect();
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("skipping export bench: {}", e);
            return;
        }
    };
    let path = dir.path().join("take.wav");
    let exporter = WavExporter::new();

    c.bench_function("export_four_notes", |b| {
        b.iter(|| black_box(exporter.export(&segments, &path).is_ok()))
    });
}

criterion_group!(benches, bench_synthesis, bench_mixer_render, bench_export);

criterion_main!(benches);
