use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use criterion::Throughput;
use enskog_dsmc::binning::BinnedIndex;
use enskog_dsmc::grid::Grid;
use enskog_dsmc::particle::Ensemble;
use enskog_dsmc::particle::InitialLayout;
use enskog_dsmc::random::StdRandomEngine;
use enskog_dsmc::species::Species;

const N_PARTICLES: usize = 50_000;
const N_CELLS: i32 = 64;

fn get_grid_and_ensemble() -> (Grid, Ensemble) {
    let grid = Grid::new(N_CELLS, N_CELLS, -32.0, 32.0, -32.0, 32.0, 1.0);
    let species = Species::new(1.0, 1.0);
    let mut rng = StdRandomEngine::from_seed(1234);
    let ensemble = Ensemble::populate(N_PARTICLES, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
    (grid, ensemble)
}

pub fn binning_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("binning");
    group.noise_threshold(0.05);
    group.throughput(Throughput::Elements(N_PARTICLES as u64));
    group.bench_with_input("build", &get_grid_and_ensemble(), |b, (grid, ensemble)| {
        b.iter(|| BinnedIndex::build(ensemble, grid));
    });
    group.finish();
}

criterion_group!(benches, binning_benchmark);
criterion_main!(benches);
