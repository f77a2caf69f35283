//! Fixed-width configuration file reader. Grounded on
//! `original_source/configuration.cpp`'s `getline`-then-`seekg(45)` idiom:
//! every recognised parameter line carries a human-readable label in its
//! first 45 columns and a whitespace-tolerant value token after that.
//! Blank lines and decorative section-header lines carry no value token and
//! are skipped positionally while walking the fixed schema below.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Column at which the value token begins on every recognised line.
const VALUE_COLUMN: usize = 45;

/// Everything the simulation needs to construct its `Grid`, `Species`,
/// `ForceField`, `CollisionEngine`, `Thermostat` and `Sampler`.
#[derive(Debug, Clone)]
pub struct Config {
    pub mass_fluid: f64,
    pub diam_fluid: f64,
    pub phi11: f64,
    pub gamma11: f64,
    pub mean_field_enabled: bool,

    pub initial_temperature: f64,
    pub target_temperature: f64,

    pub eta_liq0: f64,
    pub eta_liq1: f64,
    pub liq_interf: i32,
    pub x_liq_interf: f64,
    pub y_liq_interf: f64,

    pub wall_cond: [char; 4],
    pub p_e: [f64; 4],

    /// Domain half-extents: the physical domain is
    /// `[-x_min, +x_max] x [-y_min, +y_max]`, matching
    /// `original_source/configuration.cpp`'s `setup_initial_configuration`
    /// (`channel_area = (x_max+x_min) * (y_max+y_min)`).
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_extra: f64,
    pub y_extra: f64,

    pub n_cells_x: i32,
    pub n_cells_y: i32,
    pub n_part: usize,

    pub delta_t: f64,
    pub t_start: f64,
    pub t_max: f64,

    pub seed: u64,
    pub niter_thermo: u64,
    pub niter_sampling: u64,
}

impl Config {
    /// Parses `path` and validates the result: a `ConfigError`, never a
    /// panic, on any problem found here.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let path_str = path.display().to_string();
        let lines: Vec<&str> = text.lines().collect();
        let mut cursor = 0usize;

        macro_rules! field {
            ($label:literal, $parser:expr) => {{
                let line = take_line(&lines, &mut cursor, &path_str, $label)?;
                let value = value_token(line);
                $parser(value).ok_or_else(|| ConfigError::MalformedField {
                    label: $label,
                    line: line.to_string(),
                })?
            }};
        }

        let mass_fluid: f64 = field!("mass_fluid", parse_f64);
        let diam_fluid: f64 = field!("diam_fluid", parse_f64);
        let phi11: f64 = field!("phi11", parse_f64);
        let gamma11: f64 = field!("gamma11", parse_f64);
        let mean_field_enabled: bool = field!("mean_f_gg", parse_yn);

        let initial_temperature: f64 = field!("T_ini", parse_f64);
        let target_temperature: f64 = field!("T_ref", parse_f64);

        let eta_liq0: f64 = field!("eta_liq0", parse_f64);
        let eta_liq1: f64 = field!("eta_liq1", parse_f64);
        let liq_interf: i32 = field!("liq_interf", parse_i32);
        let x_liq_interf: f64 = field!("x_liq_interf", parse_f64);
        let y_liq_interf: f64 = field!("y_liq_interf", parse_f64);

        let wall_cond = [
            field!("wall_cond[0]", parse_char),
            field!("wall_cond[1]", parse_char),
            field!("wall_cond[2]", parse_char),
            field!("wall_cond[3]", parse_char),
        ];
        let p_e = [
            field!("p_e[0]", parse_f64),
            field!("p_e[1]", parse_f64),
            field!("p_e[2]", parse_f64),
            field!("p_e[3]", parse_f64),
        ];

        let x_min: f64 = field!("x_min", parse_f64);
        let x_max: f64 = field!("x_max", parse_f64);
        let y_min: f64 = field!("y_min", parse_f64);
        let y_max: f64 = field!("y_max", parse_f64);
        let x_extra: f64 = field!("x_extra", parse_f64);
        let y_extra: f64 = field!("y_extra", parse_f64);

        let n_cells_x: i32 = field!("n_cells_x", parse_i32);
        let n_cells_y: i32 = field!("n_cells_y", parse_i32);
        let n_part: usize = field!("n_part", parse_usize);

        let delta_t: f64 = field!("delta_t", parse_f64);
        let t_start: f64 = field!("t_ini", parse_f64);
        let t_max: f64 = field!("t_max", parse_f64);

        let seed: u64 = field!("seed", parse_u64);
        let niter_thermo: u64 = field!("niter_thermo", parse_u64);
        let niter_sampling: u64 = field!("niter_sampling", parse_u64);

        let config = Config {
            mass_fluid,
            diam_fluid,
            phi11,
            gamma11,
            mean_field_enabled,
            initial_temperature,
            target_temperature,
            eta_liq0,
            eta_liq1,
            liq_interf,
            x_liq_interf,
            y_liq_interf,
            wall_cond,
            p_e,
            x_min,
            x_max,
            y_min,
            y_max,
            x_extra,
            y_extra,
            n_cells_x,
            n_cells_y,
            n_part,
            delta_t,
            t_start,
            t_max,
            seed,
            niter_thermo,
            niter_sampling,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mass_fluid <= 0.0 || self.diam_fluid <= 0.0 {
            return Err(ConfigError::InvalidGeometry {
                message: "mass_fluid and diam_fluid must be positive".to_string(),
            });
        }
        if self.x_min <= 0.0 || self.x_max <= 0.0 || self.y_min <= 0.0 || self.y_max <= 0.0 {
            return Err(ConfigError::InvalidGeometry {
                message: "x_min, x_max, y_min, y_max are domain half-extents and must all be positive".to_string(),
            });
        }
        if self.n_cells_x <= 0 || self.n_cells_y <= 0 {
            return Err(ConfigError::InvalidGeometry {
                message: "n_cells_x and n_cells_y must be positive".to_string(),
            });
        }
        check_periodic_pair(self.wall_cond[0], self.wall_cond[2], "x")?;
        check_periodic_pair(self.wall_cond[1], self.wall_cond[3], "y")?;

        let floor = (self.n_cells_x as i64 * self.n_cells_y as i64) / 10;
        if (self.n_part as i64) < floor {
            return Err(ConfigError::InvalidGeometry {
                message: format!(
                    "n_part = {} is below the sanity floor n_cells_x*n_cells_y/10 = {floor}",
                    self.n_part
                ),
            });
        }
        if self.t_max <= self.t_start {
            return Err(ConfigError::InvalidGeometry {
                message: "t_max must be greater than t_ini".to_string(),
            });
        }
        if self.delta_t <= 0.0 {
            return Err(ConfigError::InvalidGeometry {
                message: "delta_t must be positive".to_string(),
            });
        }
        if !matches!(self.liq_interf, 0 | 5 | 6) {
            return Err(ConfigError::InvalidGeometry {
                message: format!("liq_interf = {} is not one of the recognised layouts 0, 5, 6", self.liq_interf),
            });
        }
        Ok(())
    }

    /// Full domain width/height, derived from the half-extent pair
    /// (`original_source/configuration.cpp`'s `x_max+x_min`).
    pub fn domain_width(&self) -> f64 {
        self.x_min + self.x_max
    }

    pub fn domain_height(&self) -> f64 {
        self.y_min + self.y_max
    }

    /// Number of driver-loop steps implied by `t_ini`/`t_max`/`delta_t`,
    /// before any `--max-steps` CLI override is applied.
    pub fn n_steps(&self) -> u64 {
        ((self.t_max - self.t_start) / self.delta_t).ceil() as u64
    }

    /// Mean-field cutoff expressed in whole cells, rounding `x_extra`/
    /// `y_extra` up so the halo always covers the configured physical range.
    pub fn mean_field_cutoff_cells(&self, dx: f64, dy: f64) -> (i32, i32) {
        (
            (self.x_extra / dx).ceil() as i32,
            (self.y_extra / dy).ceil() as i32,
        )
    }
}

fn check_periodic_pair(a: char, b: char, axis: &'static str) -> Result<(), ConfigError> {
    for (edge, tag) in [("low", a), ("high", b)] {
        if tag != 'p' && tag != 'P' {
            return Err(ConfigError::UnknownBoundaryTag {
                edge: leak_edge_label(axis, edge),
                tag,
            });
        }
    }
    if (a == 'p' || a == 'P') != (b == 'p' || b == 'P') {
        return Err(ConfigError::InconsistentPeriodicPair { axis });
    }
    Ok(())
}

/// `ConfigError::UnknownBoundaryTag::edge` wants a `'static` label; the
/// handful of axis/edge combinations is small and fixed, so this matches
/// them against a literal table instead of leaking a heap string.
fn leak_edge_label(axis: &'static str, edge: &'static str) -> &'static str {
    match (axis, edge) {
        ("x", "low") => "x_min",
        ("x", "high") => "x_max",
        ("y", "low") => "y_min",
        _ => "y_max",
    }
}

/// Advances past any blank or decorative header/separator line (one with no
/// value token at `VALUE_COLUMN`) and returns the next real data line for
/// `label`. A line beginning with `#` is not itself the skip signal — the
/// original format freely mixes a `#`-prefixed descriptive label with a
/// trailing value on the very same line — only the *absence* of a value is.
fn take_line<'a>(
    lines: &[&'a str],
    cursor: &mut usize,
    path: &str,
    label: &'static str,
) -> Result<&'a str, ConfigError> {
    loop {
        if *cursor >= lines.len() {
            return Err(ConfigError::TruncatedFile {
                path: path.to_string(),
                expected_lines: *cursor + 1,
                found_lines: lines.len(),
            });
        }
        let line = lines[*cursor];
        *cursor += 1;
        if value_token(line).is_empty() {
            continue;
        }
        let _ = label;
        return Ok(line);
    }
}

/// The whitespace-tolerant value token starting at `VALUE_COLUMN`, falling
/// back to the whole trimmed line for files narrower than the nominal
/// 45-column label width.
fn value_token(line: &str) -> &str {
    if line.len() > VALUE_COLUMN {
        line[VALUE_COLUMN..].trim()
    } else {
        line.trim()
    }
}

fn parse_f64(value: &str) -> Option<f64> {
    value.split_whitespace().next()?.parse().ok()
}

fn parse_i32(value: &str) -> Option<i32> {
    value.split_whitespace().next()?.parse().ok()
}

fn parse_usize(value: &str) -> Option<usize> {
    value.split_whitespace().next()?.parse().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    value.split_whitespace().next()?.parse().ok()
}

fn parse_char(value: &str) -> Option<char> {
    value.split_whitespace().next()?.chars().next()
}

fn parse_yn(value: &str) -> Option<bool> {
    match value.split_whitespace().next()? {
        "y" | "Y" => Some(true),
        "n" | "N" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_file() -> String {
        let mut out = String::new();
        let mut push = |label: &str, value: &str| {
            out.push_str(&format!("{label:<45}{value}\n"));
        };
        push("# MASSA MOLECOLARE LIQUIDO", "1.0");
        push("# DIAMETRO MOLECOLARE LIQUIDO", "1.0");
        push("# PARAMETRO PHI11", "1.0");
        push("# PARAMETRO GAMMA11", "6.0");
        push("# MEAN FIELD GAS-GAS", "y");
        push("# TEMPERATURA INIZIALE", "1.0");
        push("# TEMPERATURA DI RIFERIMENTO", "1.0");
        push("# ETA LIQ0", "0.01");
        push("# ETA LIQ1", "0.3");
        push("# LIQ INTERF", "0");
        push("# X LIQ INTERF", "0.0");
        push("# Y LIQ INTERF", "0.0");
        push("# WALL COND 0", "p");
        push("# WALL COND 1", "p");
        push("# WALL COND 2", "p");
        push("# WALL COND 3", "p");
        push("# P_E 0", "0.0");
        push("# P_E 1", "0.0");
        push("# P_E 2", "0.0");
        push("# P_E 3", "0.0");
        push("# X MIN", "-5.0");
        push("# X MAX", "5.0");
        push("# Y MIN", "-5.0");
        push("# Y MAX", "5.0");
        push("# X EXTRA", "2.0");
        push("# Y EXTRA", "2.0");
        push("# N CELLS X", "20");
        push("# N CELLS Y", "20");
        push("# N PART", "5000");
        push("# DELTA T", "0.001");
        push("# T INI", "0.0");
        push("# T MAX", "1.0");
        push("# SEED", "42");
        push("# NITER THERMO", "50");
        push("# NITER SAMPLING", "10");
        out
    }

    #[test]
    fn loads_a_well_formed_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("enskog-dsmc-config-test-{}.txt", std::process::id()));
        {
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(sample_file().as_bytes()).unwrap();
        }
        let config = Config::load(&path).expect("well-formed config must load");
        assert_eq!(config.n_cells_x, 20);
        assert_eq!(config.n_part, 5000);
        assert!(config.mean_field_enabled);
        assert_eq!(config.wall_cond, ['p', 'p', 'p', 'p']);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_non_periodic_wall_tag() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("enskog-dsmc-config-test-wall-{}.txt", std::process::id()));
        let mut text = sample_file();
        text = text.replace(&format!("{:<45}p\n", "# WALL COND 0"), &format!("{:<45}r\n", "# WALL COND 0"));
        {
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(text.as_bytes()).unwrap();
        }
        let err = Config::load(&path).expect_err("a non-periodic wall tag must be rejected");
        assert!(matches!(err, ConfigError::UnknownBoundaryTag { .. }));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("enskog-dsmc-config-test-trunc-{}.txt", std::process::id()));
        {
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(b"# MASSA MOLECOLARE LIQUIDO                  1.0\n").unwrap();
        }
        let err = Config::load(&path).expect_err("a truncated config must be rejected");
        assert!(matches!(err, ConfigError::TruncatedFile { .. }));
        fs::remove_file(&path).ok();
    }
}
