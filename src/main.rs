use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use enskog_dsmc::{CommandLineOptions, Config, RunError, Simulation};
use log::{error, info};

fn main() -> ExitCode {
    let options = CommandLineOptions::parse();
    enskog_dsmc::logging::init(options.verbosity);

    if let Some(num_threads) = options.num_worker_threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            error!("failed to configure a {num_threads}-thread worker pool: {e}");
            return ExitCode::FAILURE;
        }
    }

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: CommandLineOptions) -> Result<(), RunError> {
    let config = Config::load(&options.config)?;
    info!(
        "loaded configuration from {}: {} particles, {}x{} cells, {} steps",
        options.config.display(),
        config.n_part,
        config.n_cells_x,
        config.n_cells_y,
        options.max_steps.map(|n| n as u64).unwrap_or_else(|| config.n_steps())
    );

    let cancel = install_cancel_handler();
    let output_dir = output_directory(&options.config);
    let mut simulation = Simulation::new(config);
    simulation.run(&output_dir, options.max_steps.map(|n| n as u64), &cancel);

    if cancel.load(Ordering::SeqCst) {
        info!("run cancelled after {} steps", simulation.current_step());
    } else {
        info!("run complete after {} steps", simulation.current_step());
    }
    Ok(())
}

/// Derives an output directory next to the configuration file, the way the
/// original writes its `output_*` files alongside the input deck.
fn output_directory(config_path: &std::path::Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .join("output")
}

/// Wires SIGINT/Ctrl-C to the cooperative cancellation flag the driver loop
/// polls between pipeline stages.
fn install_cancel_handler() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    }) {
        error!("failed to install Ctrl-C handler: {e}; cooperative cancellation is unavailable");
    }
    cancel
}
