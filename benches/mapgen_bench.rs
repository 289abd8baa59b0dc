use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nexus::core::{mapgen, GameConfig, GameState, Loc, Realm, Side, UnitKind};
use rand::{rngs::StdRng, SeedableRng};

fn mapgen_benchmark(c: &mut Criterion) {
    let config = GameConfig::default();

    c.bench_function("map generation", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| mapgen::generate(black_box(&config), &mut rng))
    });
}

fn reachable_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut state = GameState::generate(GameConfig::default(), &mut rng);
    let center = Loc::all()
        .filter(|loc| state.board.is_free(loc, Realm::Overworld))
        .min_by_key(|loc| loc.manhattan(&Loc::new(5, 5)))
        .unwrap();
    let id = state
        .place_unit(UnitKind::Scout, Side::P1, center, Realm::Overworld)
        .unwrap();
    state.board.find_unit_mut(id).unwrap().state.move_bonus = 2;

    c.bench_function("scout reachability", |b| {
        b.iter(|| state.reachable(black_box(id)))
    });
}

criterion_group!(benches, mapgen_benchmark, reachable_benchmark);
criterion_main!(benches);
