use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use enskog_dsmc::binning::BinnedIndex;
use enskog_dsmc::collision::CollisionEngine;
use enskog_dsmc::correlation::CarnahanStarling;
use enskog_dsmc::density::DensityKernel;
use enskog_dsmc::grid::Grid;
use enskog_dsmc::particle::Ensemble;
use enskog_dsmc::particle::InitialLayout;
use enskog_dsmc::random::StdRandomEngine;
use enskog_dsmc::species::Species;

const N_PARTICLES: usize = 50_000;
const N_CELLS: i32 = 64;

struct Fixture {
    grid: Grid,
    species: Species,
    density: DensityKernel,
    correlation: CarnahanStarling,
}

fn get_fixture() -> Fixture {
    let grid = Grid::new(N_CELLS, N_CELLS, -32.0, 32.0, -32.0, 32.0, 1.0);
    let species = Species::new(1.0, 1.0);
    let mut rng = StdRandomEngine::from_seed(3);
    let ensemble = Ensemble::populate(N_PARTICLES, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
    let mut density = DensityKernel::new(&grid, &species, 3, 3);
    density.update(&ensemble, &grid);
    Fixture {
        grid,
        species,
        density,
        correlation: CarnahanStarling,
    }
}

pub fn collision_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision");
    group.noise_threshold(0.05);
    group.throughput(Throughput::Elements(N_PARTICLES as u64));

    let fixture = get_fixture();
    let mut rng = StdRandomEngine::from_seed(3);
    let ensemble = Ensemble::populate(N_PARTICLES, InitialLayout::Uniform, &fixture.grid, &fixture.species, 1.0, &mut rng);
    let index = BinnedIndex::build(&ensemble, &fixture.grid);

    group.bench_function("estimate_majorants", |b| {
        b.iter_batched(
            || CollisionEngine::new(&fixture.grid),
            |mut engine| {
                engine.estimate_majorants(
                    &ensemble,
                    &fixture.grid,
                    &index,
                    &fixture.density,
                    &fixture.correlation,
                    &fixture.species,
                    &mut rng,
                )
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("step", |b| {
        b.iter_batched(
            || {
                let mut engine = CollisionEngine::new(&fixture.grid);
                engine.estimate_majorants(
                    &ensemble,
                    &fixture.grid,
                    &index,
                    &fixture.density,
                    &fixture.correlation,
                    &fixture.species,
                    &mut rng,
                );
                (engine, ensemble.clone())
            },
            |(mut engine, mut ensemble)| {
                engine.step(
                    &mut ensemble,
                    &fixture.grid,
                    &index,
                    &fixture.density,
                    &fixture.correlation,
                    &fixture.species,
                    1e-3,
                    &mut rng,
                )
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, collision_benchmark);
criterion_main!(benches);
