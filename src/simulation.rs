//! The simulation context object and driver loop. A plain owning struct,
//! not an ECS, holding every subsystem and advanced one step at a time by
//! a method on `&mut self`.

use std::f64::consts::PI;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::debug;
use log::info;
use log::trace;

use crate::binning::BinnedIndex;
use crate::collision::CollisionEngine;
use crate::collision::CollisionStats;
use crate::config::Config;
use crate::correlation;
use crate::correlation::Correlation;
use crate::density::DensityKernel;
use crate::force_field::ForceField;
use crate::grid::Grid;
use crate::output;
use crate::output::ScalarSeriesWriter;
use crate::particle::Ensemble;
use crate::particle::InitialLayout;
use crate::potential;
use crate::random::RandomEngine;
use crate::random::StdRandomEngine;
use crate::sampler::CellAverages;
use crate::sampler::Sampler;
use crate::field::HaloField;
use crate::species::Species;
use crate::thermostat::Thermostat;
use crate::advection;

/// Owns every subsystem for one run and advances them in lockstep: force
/// field, advection, binning + density, collisions, samples.
pub struct Simulation {
    config: Config,
    grid: Grid,
    species: Species,
    ensemble: Ensemble,
    density: DensityKernel,
    force_field: Option<ForceField>,
    collision: CollisionEngine,
    correlation: Box<dyn Correlation>,
    thermostat: Thermostat,
    sampler: Sampler,
    rng: StdRandomEngine,
    step: u64,
}

impl Simulation {
    /// Builds every subsystem from a validated `Config` and runs the
    /// initial population and majorant estimation once at startup.
    pub fn new(config: Config) -> Self {
        let (channel_section, layout) = initial_layout(&config);
        let grid = Grid::new(
            config.n_cells_x,
            config.n_cells_y,
            -config.x_min,
            config.x_max,
            -config.y_min,
            config.y_max,
            channel_section,
        );
        let species = Species::new(config.mass_fluid, config.diam_fluid);
        let mut rng = StdRandomEngine::from_seed(config.seed);
        let ensemble = Ensemble::populate(config.n_part, layout, &grid, &species, config.initial_temperature, &mut rng);

        let (cutoff_x, cutoff_y) = config.mean_field_cutoff_cells(grid.dx, grid.dy);
        let mut density = DensityKernel::new(&grid, &species, cutoff_x, cutoff_y);
        let correlation = correlation::selected();

        let force_field = if config.mean_field_enabled {
            let potential = potential::selected(config.phi11, config.diam_fluid, config.gamma11);
            Some(ForceField::new(&grid, potential.as_ref(), config.diam_fluid, cutoff_x, cutoff_y))
        } else {
            None
        };

        let index = density.update(&ensemble, &grid);
        let mut collision = CollisionEngine::new(&grid);
        collision.estimate_majorants(&ensemble, &grid, &index, &density, correlation.as_ref(), &species, &mut rng);

        let thermostat = Thermostat::new(config.target_temperature, config.niter_thermo);
        let sampler = Sampler::new(&grid);

        Simulation {
            config,
            grid,
            species,
            ensemble,
            density,
            force_field,
            collision,
            correlation,
            thermostat,
            sampler,
            rng,
            step: 0,
        }
    }

    pub fn n_steps(&self) -> u64 {
        self.config.n_steps()
    }

    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// One pass through the pipeline: force field is already current from
    /// the previous step's density (or the initial estimation on step 0);
    /// advect -> rebuild the binned index and density -> recompute the
    /// force field -> collide -> sample -> (maybe) thermostat.
    pub fn step(&mut self) -> CollisionStats {
        debug!("step {}: advection", self.step);
        advection::advance(&mut self.ensemble, &self.grid, self.force_field.as_ref(), self.species.mass, self.config.delta_t);

        debug!("step {}: binning + density", self.step);
        let index: BinnedIndex = self.density.update(&self.ensemble, &self.grid);

        if let Some(force_field) = self.force_field.as_mut() {
            debug!("step {}: force field", self.step);
            force_field.compute(self.density.num_density(), &self.grid);
        }

        debug!("step {}: collisions", self.step);
        let stats = self.collision.step(
            &mut self.ensemble,
            &self.grid,
            &index,
            &self.density,
            self.correlation.as_ref(),
            &self.species,
            self.config.delta_t,
            &mut self.rng,
        );
        trace!("step {}: majorants_replaced = {}", self.step, stats.majorants_replaced);

        if self.thermostat.is_due(self.step) {
            debug!("step {}: thermostat", self.step);
            self.thermostat.apply(&mut self.ensemble);
        }

        self.sampler.sample(&self.ensemble, self.force_field.as_ref());

        self.step += 1;
        stats
    }

    /// Flushes the sampler's accumulated moments, if this is a sampling-flush
    /// step (every `niter_sampling` steps); resets the accumulators either
    /// way it returns `Some`.
    pub fn maybe_flush_samples(&mut self) -> Option<Vec<CellAverages>> {
        if self.step % self.config.niter_sampling.max(1) == 0 {
            Some(self.sampler.flush(&self.grid))
        } else {
            None
        }
    }

    /// Runs the full step count implied by the configuration (or
    /// `max_steps` if lower), writing scalar diagnostics and periodic field
    /// dumps to `output_dir`. Checks `cancel` between stages: cancellation
    /// is cooperative, observed only at stage boundaries.
    pub fn run(&mut self, output_dir: &Path, max_steps: Option<u64>, cancel: &AtomicBool) {
        let total = max_steps.unwrap_or_else(|| self.n_steps());

        if let Err(err) = output::ensure_output_dir(output_dir) {
            log::error!("could not create output directory {}: {err}", output_dir.display());
        }
        let real_series = ScalarSeriesWriter::new(output_dir, "collisions_real");
        let fake_series = ScalarSeriesWriter::new(output_dir, "collisions_fake");
        let out_of_range_series = ScalarSeriesWriter::new(output_dir, "collisions_out_of_range");

        for _ in 0..total {
            if cancel.load(Ordering::Relaxed) {
                info!("cancellation requested at step {}, stopping", self.step);
                break;
            }
            let stats = self.step();
            real_series.append(stats.n_real as f64);
            fake_series.append(stats.n_fake as f64);
            out_of_range_series.append(stats.n_out_of_range as f64);

            if self.step % self.config.niter_sampling.max(1) == 0 {
                info!(
                    "step {}: real={} fake={} out_of_range={}",
                    self.step, stats.n_real, stats.n_fake, stats.n_out_of_range
                );
                if let Some(averages) = self.maybe_flush_samples() {
                    let time_tag = self.config.t_start + self.step as f64 * self.config.delta_t;
                    let number_density = field_from_averages(&averages, &self.grid, |a| a.number_density);
                    let temperature = field_from_averages(&averages, &self.grid, |a| a.temperature);
                    output::write_field(output_dir, "number_density", Some(time_tag), &number_density);
                    output::write_field(output_dir, "temperature", Some(time_tag), &temperature);
                }
            }
        }
    }
}

/// Repacks the sampler's flat per-cell averages into an interior-only
/// `HaloField<f64>` for the output writer.
fn field_from_averages(averages: &[CellAverages], grid: &Grid, pick: impl Fn(&CellAverages) -> f64) -> HaloField<f64> {
    let mut field = HaloField::new_interior(grid.n_cells_x, grid.n_cells_y, 0.0);
    for (i, j) in field.iter_interior() {
        let idx = grid.lexico(i, j) as usize;
        field.set(i, j, pick(&averages[idx]));
    }
    field
}

/// Mirrors `original_source/configuration.cpp`'s
/// `setup_initial_configuration`: derives the effective channel thickness
/// (`channel_section`) so that `n_part` particles reproduce the configured
/// reduced density, and — for the two slab layouts — the particle split
/// between phases that keeps each phase's number density at its configured
/// target (`npart1 = n_part * (rho1*A1) / (rho0*A0 + rho1*A1)`).
fn initial_layout(config: &Config) -> (f64, InitialLayout) {
    let width = config.domain_width();
    let height = config.domain_height();
    let homogeneous_density = |eta: f64| 6.0 * eta / (PI * config.diam_fluid.powi(3));

    match config.liq_interf {
        0 => {
            let density = homogeneous_density(config.eta_liq0);
            let area = width * height;
            let volume = config.n_part as f64 / density;
            (volume / area, InitialLayout::Uniform)
        }
        5 => {
            let area0 = width * (height - config.y_liq_interf);
            let area1 = width * config.y_liq_interf;
            let density0 = homogeneous_density(config.eta_liq0);
            let density1 = homogeneous_density(config.eta_liq1);
            let n_liquid = phase_split(config.n_part, density0, area0, density1, area1);
            let volume0 = (config.n_part - n_liquid) as f64 / density0;
            let volume1 = n_liquid as f64 / density1;
            let channel_section = (volume0 + volume1) / (area0 + area1);
            (
                channel_section,
                InitialLayout::HorizontalSlab {
                    liquid_fraction: n_liquid as f64 / config.n_part as f64,
                    half_thickness: config.y_liq_interf / 2.0,
                },
            )
        }
        6 => {
            let area0 = (width - config.x_liq_interf) * height;
            let area1 = config.x_liq_interf * height;
            let density0 = homogeneous_density(config.eta_liq0);
            let density1 = homogeneous_density(config.eta_liq1);
            let n_liquid = phase_split(config.n_part, density0, area0, density1, area1);
            let volume0 = (config.n_part - n_liquid) as f64 / density0;
            let volume1 = n_liquid as f64 / density1;
            let channel_section = (volume0 + volume1) / (area0 + area1);
            (
                channel_section,
                InitialLayout::VerticalSlab {
                    liquid_fraction: n_liquid as f64 / config.n_part as f64,
                    half_thickness: config.x_liq_interf / 2.0,
                },
            )
        }
        other => unreachable!("Config::validate rejects liq_interf = {other}"),
    }
}

fn phase_split(n_part: usize, density0: f64, area0: f64, density1: f64, area1: f64) -> usize {
    let tmp0 = 1.0 / (density0 * area0);
    let tmp1 = 1.0 / (density1 * area1);
    ((n_part as f64) * tmp0 / (tmp0 + tmp1)).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        // Field-for-field equivalent of config::tests::sample_file, parsed
        // through the same reader so this stays in sync with the schema.
        let rows: &[(&str, &str)] = &[
            ("mass_fluid", "1.0"),
            ("diam_fluid", "1.0"),
            ("phi11", "1.0"),
            ("gamma11", "6.0"),
            ("mean_f_gg", "y"),
            ("T_ini", "1.0"),
            ("T_ref", "1.0"),
            ("eta_liq0", "0.01"),
            ("eta_liq1", "0.3"),
            ("liq_interf", "0"),
            ("x_liq_interf", "0.0"),
            ("y_liq_interf", "0.0"),
            ("wall_cond[0]", "p"),
            ("wall_cond[1]", "p"),
            ("wall_cond[2]", "p"),
            ("wall_cond[3]", "p"),
            ("p_e[0]", "0.0"),
            ("p_e[1]", "0.0"),
            ("p_e[2]", "0.0"),
            ("p_e[3]", "0.0"),
            ("x_min", "5.0"),
            ("x_max", "5.0"),
            ("y_min", "5.0"),
            ("y_max", "5.0"),
            ("x_extra", "2.0"),
            ("y_extra", "2.0"),
            ("n_cells_x", "10"),
            ("n_cells_y", "10"),
            ("n_part", "2000"),
            ("delta_t", "0.001"),
            ("t_ini", "0.0"),
            ("t_max", "0.01"),
            ("seed", "7"),
            ("niter_thermo", "5"),
            ("niter_sampling", "5"),
        ];
        let mut text = String::new();
        for (label, value) in rows {
            text.push_str(&format!("{label:<45}{value}\n"));
        }
        let dir = std::env::temp_dir();
        let path = dir.join(format!("enskog-dsmc-sim-test-{}.txt", std::process::id()));
        std::fs::write(&path, text).unwrap();
        let config = Config::load(&path).expect("well-formed inline config must load");
        std::fs::remove_file(&path).ok();
        config
    }

    #[test]
    fn a_handful_of_steps_runs_without_panicking() {
        let config = sample_config();
        let mut sim = Simulation::new(config);
        for _ in 0..5 {
            let stats = sim.step();
            assert_eq!(stats.n_total, stats.n_real + stats.n_fake);
        }
    }

    #[test]
    fn uniform_layout_places_every_particle() {
        let config = sample_config();
        let sim = Simulation::new(config.clone());
        assert_eq!(sim.ensemble.len(), config.n_part);
    }
}
