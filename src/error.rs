use std::error;
use std::fmt;
use std::io;

/**
 * Error to represent an unusable mesh, configuration, restart snapshot, or
 * solution state. Construction of the topology and the initial condition
 * surface these immediately; the orchestrator aborts the run on any of them.
 */
#[derive(Debug)]
pub enum Error {
    MeshIllFormed(MeshDefect),
    DegenerateTriangle { triangle: usize },
    InvalidConcentration { cell: usize, step: u64, value: f64 },
    RestartMismatch(RestartDefect),
    ConfigInconsistent { key: &'static str, reason: String },
    Io(io::Error),
}

/**
 * The ways a parsed mesh can fail to form a valid topology.
 */
#[derive(Debug)]
pub enum MeshDefect {
    /// More than two cells reference the same edge.
    SharedEdgeOverflow { edge: (usize, usize), cells: usize },
    /// A boundary segment adjoins no triangle.
    DanglingLine { line: usize },
    /// A cell references a point index outside the point table.
    PointOutOfRange { cell: usize, point: usize },
}

/**
 * The ways a restart snapshot can disagree with the mesh or the
 * configuration it is replayed against.
 */
#[derive(Debug)]
pub enum RestartDefect {
    IndexOutOfRange { cell: usize, total: usize },
    TimeMismatch { header: f64, configured: f64 },
    MalformedLine { line: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            MeshIllFormed(defect) => match defect {
                MeshDefect::SharedEdgeOverflow { edge, cells } => write!(
                    fmt,
                    "ill-formed mesh: edge ({}, {}) is shared by {} cells",
                    edge.0, edge.1, cells
                ),
                MeshDefect::DanglingLine { line } => write!(
                    fmt,
                    "ill-formed mesh: boundary segment {} adjoins no triangle",
                    line
                ),
                MeshDefect::PointOutOfRange { cell, point } => write!(
                    fmt,
                    "ill-formed mesh: cell {} references missing point {}",
                    cell, point
                ),
            },
            DegenerateTriangle { triangle } => {
                write!(fmt, "triangle {} has zero area", triangle)
            }
            InvalidConcentration { cell, step, value } => write!(
                fmt,
                "invalid concentration {} in cell {} at step {}",
                value, cell, step
            ),
            RestartMismatch(defect) => match defect {
                RestartDefect::IndexOutOfRange { cell, total } => write!(
                    fmt,
                    "restart mismatch: cell index {} outside mesh of {} cells",
                    cell, total
                ),
                RestartDefect::TimeMismatch { header, configured } => write!(
                    fmt,
                    "restart mismatch: snapshot written at t = {} but t_start = {}",
                    header, configured
                ),
                RestartDefect::MalformedLine { line } => {
                    write!(fmt, "restart mismatch: unreadable entry on line {}", line)
                }
            },
            ConfigInconsistent { key, reason } => {
                write!(fmt, "inconsistent config key '{}': {}", key, reason)
            }
            Io(e) => write!(fmt, "i/o failure: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
