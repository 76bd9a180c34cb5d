use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use coup_engine::simulate;

fn complete_game(num_players: usize, seed: u64) {
    let stats = simulate(num_players, seed).unwrap();
    black_box(stats);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 2..=6usize {
        let mut seed = 0u64;
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| {
                seed += 1;
                complete_game(num_players, seed)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
