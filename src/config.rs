use crate::diagnostics::Region;
use crate::error::Error;
use crate::geometry::Point;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How the initial concentration field is produced: a fresh spill seeded at
/// a point, or a replay of a written checkpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum InitMode {
    Spill(Point),
    Restart(PathBuf),
}

/// The validated parameter record the simulation core consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub n_steps: u64,
    pub t_start: f64,
    pub t_end: f64,
    pub fishing_grounds: Region,
    pub write_frequency: Option<u64>,
}

/// A validated run configuration: the core parameters plus the file
/// references the driver needs to assemble a run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub mesh_file: PathBuf,
    pub init: InitMode,
    pub parameters: Parameters,
    pub frame_dir: Option<PathBuf>,
    pub solution_file: Option<PathBuf>,
}

// The raw TOML shape. Everything is optional here so that validation can
// name the exact key it is unhappy about.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    geometry: RawGeometry,
    settings: RawSettings,
    io: RawIo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGeometry {
    mesh_file: Option<PathBuf>,
    oil_spill_center: Option<[f64; 2]>,
    fishing_grounds: Option<[[f64; 2]; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    n_steps: Option<u64>,
    t_start: Option<f64>,
    t_end: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIo {
    write_frequency: Option<u64>,
    restart_file: Option<PathBuf>,
    frame_dir: Option<PathBuf>,
    solution_file: Option<PathBuf>,
}

fn missing(key: &'static str) -> Error {
    Error::ConfigInconsistent {
        key,
        reason: "required key is missing".into(),
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> Error {
    Error::ConfigInconsistent {
        key,
        reason: reason.into(),
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| invalid("config", e.to_string()))?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, Error> {
        let mesh_file = raw.geometry.mesh_file.ok_or_else(|| missing("mesh_file"))?;

        let grounds = raw
            .geometry
            .fishing_grounds
            .ok_or_else(|| missing("fishing_grounds"))?;
        if grounds[0][0] > grounds[0][1] || grounds[1][0] > grounds[1][1] {
            return Err(invalid("fishing_grounds", "bounds are reversed"));
        }
        let fishing_grounds = Region::new(
            (grounds[0][0], grounds[0][1]),
            (grounds[1][0], grounds[1][1]),
        );

        let n_steps = raw.settings.n_steps.ok_or_else(|| missing("n_steps"))?;
        if n_steps == 0 {
            return Err(invalid("n_steps", "must be positive"));
        }

        let t_start = raw.settings.t_start.unwrap_or(0.0);
        if t_start < 0.0 {
            return Err(invalid("t_start", "must be non-negative"));
        }
        let t_end = raw.settings.t_end.ok_or_else(|| missing("t_end"))?;
        if !(t_end > t_start) {
            return Err(invalid("t_end", "must exceed t_start"));
        }

        if raw.io.write_frequency == Some(0) {
            return Err(invalid("write_frequency", "must be positive when set"));
        }

        let init = match raw.io.restart_file {
            Some(restart_file) => {
                if t_start == 0.0 {
                    return Err(invalid(
                        "restart_file",
                        "restart runs must start at a non-zero t_start",
                    ));
                }
                InitMode::Restart(restart_file)
            }
            None => {
                if t_start != 0.0 {
                    return Err(invalid(
                        "t_start",
                        "must be zero unless a restart_file is given",
                    ));
                }
                let center = raw
                    .geometry
                    .oil_spill_center
                    .ok_or_else(|| missing("oil_spill_center"))?;
                InitMode::Spill(Point::new(center[0], center[1]))
            }
        };

        Ok(Self {
            mesh_file,
            init,
            parameters: Parameters {
                n_steps,
                t_start,
                t_end,
                fishing_grounds,
                write_frequency: raw.io.write_frequency,
            },
            frame_dir: raw.io.frame_dir,
            solution_file: raw.io.solution_file,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{InitMode, RunConfig};
    use crate::error::Error;
    use crate::geometry::Point;
    use std::path::PathBuf;

    const FULL: &str = r#"
        [geometry]
        mesh_file = "data/bay.msh"
        oil_spill_center = [0.35, 0.45]
        fishing_grounds = [[0.0, 0.45], [0.0, 0.2]]

        [settings]
        n_steps = 500
        t_start = 0.0
        t_end = 0.5

        [io]
        write_frequency = 10
        frame_dir = "frames"
        solution_file = "solution.txt"
    "#;

    fn expect_inconsistent(text: &str, expected_key: &str) {
        match RunConfig::from_toml_str(text) {
            Err(Error::ConfigInconsistent { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInconsistent, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn a_full_config_validates() {
        let config = RunConfig::from_toml_str(FULL).unwrap();

        assert_eq!(config.mesh_file, PathBuf::from("data/bay.msh"));
        assert_eq!(config.init, InitMode::Spill(Point::new(0.35, 0.45)));
        assert_eq!(config.parameters.n_steps, 500);
        assert_eq!(config.parameters.write_frequency, Some(10));
        assert_eq!(config.parameters.fishing_grounds.x_max, 0.45);
    }

    #[test]
    fn t_start_defaults_to_zero_and_write_frequency_to_none() {
        let text = r#"
            [geometry]
            mesh_file = "bay.msh"
            oil_spill_center = [0.1, 0.1]
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]

            [settings]
            n_steps = 10
            t_end = 1.0
        "#;
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.parameters.t_start, 0.0);
        assert_eq!(config.parameters.write_frequency, None);
    }

    #[test]
    fn required_keys_are_named_when_missing() {
        expect_inconsistent("", "mesh_file");
        expect_inconsistent(
            r#"
            [geometry]
            mesh_file = "bay.msh"
            oil_spill_center = [0.1, 0.1]
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            t_end = 1.0
            "#,
            "n_steps",
        );
    }

    #[test]
    fn a_spill_centre_is_required_without_a_restart() {
        expect_inconsistent(
            r#"
            [geometry]
            mesh_file = "bay.msh"
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            n_steps = 10
            t_end = 1.0
            "#,
            "oil_spill_center",
        );
    }

    #[test]
    fn restart_and_t_start_must_agree() {
        expect_inconsistent(
            r#"
            [geometry]
            mesh_file = "bay.msh"
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            n_steps = 10
            t_end = 1.0
            [io]
            restart_file = "solution.txt"
            "#,
            "restart_file",
        );
        expect_inconsistent(
            r#"
            [geometry]
            mesh_file = "bay.msh"
            oil_spill_center = [0.1, 0.1]
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            n_steps = 10
            t_start = 0.5
            t_end = 1.0
            "#,
            "t_start",
        );
    }

    #[test]
    fn restart_runs_take_the_restart_path() {
        let text = r#"
            [geometry]
            mesh_file = "bay.msh"
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            n_steps = 10
            t_start = 0.5
            t_end = 1.0
            [io]
            restart_file = "solution.txt"
        "#;
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(
            config.init,
            InitMode::Restart(PathBuf::from("solution.txt"))
        );
    }

    #[test]
    fn degenerate_windows_and_frequencies_are_rejected() {
        expect_inconsistent(
            r#"
            [geometry]
            mesh_file = "bay.msh"
            oil_spill_center = [0.1, 0.1]
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            n_steps = 10
            t_end = 0.0
            "#,
            "t_end",
        );
        expect_inconsistent(
            r#"
            [geometry]
            mesh_file = "bay.msh"
            oil_spill_center = [0.1, 0.1]
            fishing_grounds = [[0.0, 1.0], [0.0, 1.0]]
            [settings]
            n_steps = 10
            t_end = 1.0
            [io]
            write_frequency = 0
            "#,
            "write_frequency",
        );
    }
}
