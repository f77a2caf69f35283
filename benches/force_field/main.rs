use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use criterion::Throughput;
use enskog_dsmc::density::DensityKernel;
use enskog_dsmc::force_field::ForceField;
use enskog_dsmc::grid::Grid;
use enskog_dsmc::particle::Ensemble;
use enskog_dsmc::particle::InitialLayout;
use enskog_dsmc::potential::SutherlandMie;
use enskog_dsmc::random::StdRandomEngine;
use enskog_dsmc::species::Species;

const N_PARTICLES: usize = 50_000;
const N_CELLS: i32 = 64;
const CUTOFF: i32 = 4;

fn get_inputs() -> (Grid, DensityKernel) {
    let grid = Grid::new(N_CELLS, N_CELLS, -32.0, 32.0, -32.0, 32.0, 1.0);
    let species = Species::new(1.0, 1.0);
    let mut rng = StdRandomEngine::from_seed(5);
    let ensemble = Ensemble::populate(N_PARTICLES, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
    let mut density = DensityKernel::new(&grid, &species, CUTOFF, CUTOFF);
    density.update(&ensemble, &grid);
    (grid, density)
}

pub fn force_field_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_field");
    group.noise_threshold(0.05);
    group.throughput(Throughput::Elements((N_CELLS * N_CELLS) as u64));

    let potential = SutherlandMie {
        phi: 1.0,
        sigma: 1.0,
        gamma: 6.0,
    };
    let (grid, density) = get_inputs();

    group.bench_function("kernel_construction", |b| {
        b.iter(|| ForceField::new(&grid, &potential, 1.0, CUTOFF, CUTOFF));
    });

    let mut field = ForceField::new(&grid, &potential, 1.0, CUTOFF, CUTOFF);
    group.bench_function("compute", |b| {
        b.iter(|| field.compute(density.num_density(), &grid));
    });

    group.finish();
}

criterion_group!(benches, force_field_benchmark);
criterion_main!(benches);
