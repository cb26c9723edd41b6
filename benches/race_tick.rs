use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rice_racer::{
    config::GameConfig,
    graphics::{Canvas, ImageCatalogue, RaceRenderer, RenderDepth},
    simulation::{Car, InputSnapshot, Race},
};
use std::sync::Arc;

fn load_race(track_index: usize, players: &[String]) -> Race {
    let config = GameConfig::load_from_files("tracks.toml", "race.toml")
        .expect("Failed to load configuration");
    let track = config.tracks.tracks[track_index]
        .build()
        .expect("Failed to build track");
    let names = if players.is_empty() { &config.race.roster.players[..] } else { players };

    Race::new(Car::roster(names), Arc::new(track), Some(42))
}

fn throttle() -> InputSnapshot {
    InputSnapshot {
        accelerate: true,
        ..InputSnapshot::default()
    }
}

fn benchmark_race_tick(c: &mut Criterion) {
    let mut race = load_race(0, &[]);

    // Get the field spread out before measuring
    for _ in 0..300 {
        race.apply_input(&throttle());
        race.tick(1.0 / 60.0);
    }

    c.bench_function("race_tick", |b| {
        b.iter(|| {
            race.apply_input(&throttle());
            black_box(race.tick(black_box(1.0 / 60.0)));
        })
    });
}

fn benchmark_render_frame(c: &mut Criterion) {
    let mut race = load_race(0, &[]);
    let mut renderer = RaceRenderer::new(race.track(), Canvas::new(800.0, 600.0), RenderDepth::default());
    let images = ImageCatalogue::with_default((64, 64));

    for _ in 0..300 {
        race.apply_input(&throttle());
        race.tick(1.0 / 60.0);
    }

    c.bench_function("render_frame", |b| {
        b.iter(|| {
            race.add_car_sprites();
            renderer.follow_car(&race, 1.0 / 60.0);
            let list = renderer.render(&race, black_box(&images));
            race.clear_frame_sprites();
            black_box(list);
        })
    });
}

fn benchmark_field_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_size");

    for car_count in [5, 20, 50].iter() {
        let players: Vec<String> = (0..*car_count).map(|i| format!("Driver {}", i)).collect();
        let mut race = load_race(4, &players);

        for _ in 0..300 {
            race.tick(1.0 / 60.0);
        }

        group.bench_with_input(
            format!("tick_{}_cars", car_count),
            car_count,
            |b, _car_count| {
                b.iter(|| {
                    black_box(race.tick(black_box(1.0 / 60.0)));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_race_tick,
    benchmark_render_frame,
    benchmark_field_size
);
criterion_main!(benches);
