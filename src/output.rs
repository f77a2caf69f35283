//! Whitespace-delimited field/scalar output writer.
//! Grounded on `original_source/output.hpp`/`output.cpp`
//! (`output_sample`/`output_vector`); directory-creation failure handling
//! follows the `io/output/mod.rs` `make_output_dirs_system` pattern,
//! adapted from panic to a log-and-skip policy: a failed sample
//! write should not take down a run that has already computed a whole
//! step's worth of physics.

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use log::error;

use crate::field::HaloField;

/// Ensures `dir` exists, logging and returning the error rather than
/// panicking — a missing output directory should not take down a run that
/// has already computed a whole step's worth of physics.
pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Writes the interior of `field` as whitespace-separated text, one row per
/// `i`.
pub fn write_field(dir: &Path, stem: &str, time_tag: Option<f64>, field: &HaloField<f64>) {
    let path = output_path(dir, stem, time_tag);
    if let Err(err) = write_field_inner(&path, field) {
        error!("failed to write field output {}: {err}", path.display());
    }
}

fn write_field_inner(path: &Path, field: &HaloField<f64>) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    let mut line = String::new();
    for i in 0..field.nx() {
        line.clear();
        for j in 0..field.ny() {
            if j > 0 {
                line.push('\t');
            }
            line.push_str(&field.get(i, j).to_string());
        }
        line.push('\n');
        file.write_all(line.as_bytes())?;
    }
    Ok(())
}

fn output_path(dir: &Path, stem: &str, time_tag: Option<f64>) -> PathBuf {
    match time_tag {
        Some(t) => dir.join(format!("{stem}_t={t}.txt")),
        None => dir.join(format!("{stem}.txt")),
    }
}

/// Appends one value per line to a single accumulating file per quantity,
/// mirroring `output_vector`'s one-value-per-line format.
pub struct ScalarSeriesWriter {
    path: PathBuf,
}

impl ScalarSeriesWriter {
    pub fn new(dir: &Path, stem: &str) -> Self {
        ScalarSeriesWriter {
            path: dir.join(format!("{stem}.txt")),
        }
    }

    pub fn append(&self, value: f64) {
        if let Err(err) = self.append_inner(value) {
            error!("failed to append scalar sample to {}: {err}", self.path.display());
        }
    }

    fn append_inner(&self, value: f64) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{value}")
    }
}
