//! Direct Simulation Monte Carlo engine for the Enskog-Vlasov kinetic
//! equation: a 2-D dense-gas/liquid-vapor flow solver built around a
//! binned particle ensemble, a halo-backed mean-field force kernel, and a
//! majorant-based Enskog collision step.

pub mod advection;
pub mod binning;
pub mod collision;
pub mod command_line_options;
pub mod config;
pub mod correlation;
pub mod density;
pub mod error;
pub mod field;
pub mod force_field;
pub mod grid;
pub mod integration;
pub mod logging;
pub mod output;
pub mod particle;
pub mod potential;
pub mod random;
pub mod sampler;
pub mod simulation;
pub mod species;
pub mod thermostat;

pub use crate::command_line_options::CommandLineOptions;
pub use crate::config::Config;
pub use crate::error::ConfigError;
pub use crate::error::RunError;
pub use crate::simulation::Simulation;
