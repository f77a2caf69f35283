//! Command-line entry point options: a `clap`-derived struct with a
//! handful of scalar overrides, scoped to what this core's driver needs.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about = "Enskog-Vlasov DSMC engine", long_about = None)]
pub struct CommandLineOptions {
    /// Path to the fixed-width configuration file.
    #[clap(long)]
    pub config: PathBuf,

    /// Increase log verbosity; may be repeated (-v, -vv).
    #[clap(short, parse(from_occurrences))]
    pub verbosity: usize,

    /// Size of the worker thread pool used for data-parallel stages.
    /// Defaults to the platform's available parallelism when unset.
    #[clap(long)]
    pub num_worker_threads: Option<usize>,

    /// Overrides the number of steps derived from `t_ini`/`t_max`/`delta_t`,
    /// useful for smoke tests without editing the configuration file.
    #[clap(long)]
    pub max_steps: Option<usize>,
}
