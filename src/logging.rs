//! Logger bring-up, mirroring `simulation_builder.rs`'s `log_setup` /
//! `get_log_level`, stripped of the multi-rank bookkeeping this
//! single-process core has no use for.

use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;

/// Maps `-v` occurrence count to a log level.
pub fn level_for_verbosity(verbosity: usize) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: usize) {
    let level = level_for_verbosity(verbosity);
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .expect("failed to initialize terminal logger");
}
