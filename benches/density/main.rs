use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use enskog_dsmc::density::DensityKernel;
use enskog_dsmc::grid::Grid;
use enskog_dsmc::particle::Ensemble;
use enskog_dsmc::particle::InitialLayout;
use enskog_dsmc::random::StdRandomEngine;
use enskog_dsmc::species::Species;

const N_PARTICLES: usize = 50_000;
const N_CELLS: i32 = 64;

fn get_grid_species_and_ensemble() -> (Grid, Species, Ensemble) {
    let grid = Grid::new(N_CELLS, N_CELLS, -32.0, 32.0, -32.0, 32.0, 1.0);
    let species = Species::new(1.0, 1.0);
    let mut rng = StdRandomEngine::from_seed(99);
    let ensemble = Ensemble::populate(N_PARTICLES, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
    (grid, species, ensemble)
}

pub fn density_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("density");
    group.noise_threshold(0.05);
    group.throughput(Throughput::Elements(N_PARTICLES as u64));
    group.bench_with_input(
        "update",
        &get_grid_species_and_ensemble(),
        |b, (grid, species, ensemble)| {
            b.iter_batched(
                || DensityKernel::new(grid, species, 3, 3),
                |mut kernel| kernel.update(ensemble, grid),
                BatchSize::SmallInput,
            );
        },
    );
    group.finish();
}

criterion_group!(benches, density_benchmark);
criterion_main!(benches);
