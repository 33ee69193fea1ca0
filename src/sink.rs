use crate::geometry::Point;
use crate::mesh::Mesh;
use crate::restart;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// A per-step observer of the solution state. The orchestrator fans every
/// snapshot out to zero or more sinks; sinks see a read-only view of the
/// triangle concentrations and must not retain it beyond the call. `on_step`
/// fires at policy-selected steps, `on_final` exactly once after the last
/// step. A sink failure is reported by the orchestrator but never halts the
/// integration.
pub trait SnapshotSink {
    fn on_step(&mut self, step: u64, time: f64, oil: &[f64], oil_in_grounds: f64)
        -> io::Result<()>;

    fn on_final(&mut self, step: u64, time: f64, oil: &[f64], oil_in_grounds: f64)
        -> io::Result<()>;
}

/// Discards every snapshot.
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn on_step(&mut self, _: u64, _: f64, _: &[f64], _: f64) -> io::Result<()> {
        Ok(())
    }

    fn on_final(&mut self, _: u64, _: f64, _: &[f64], _: f64) -> io::Result<()> {
        Ok(())
    }
}

/// One frame record handed to an external renderer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
    pub step: u64,
    pub time: f64,
    pub oil_in_fishing_grounds: f64,
    pub oil: Vec<f64>,
}

/// The mesh geometry a renderer needs to draw frames, written once next to
/// them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderGeometry {
    pub points: Vec<Point>,
    pub triangles: Vec<[usize; 3]>,
}

/// Writes one CBOR-encoded `Frame` per snapshot into a directory, plus the
/// mesh geometry at construction, for the out-of-process frame renderer.
pub struct FrameWriter {
    dir: PathBuf,
    frames_written: u64,
}

impl FrameWriter {
    pub fn new(dir: &Path, mesh: &Mesh) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let geometry = RenderGeometry {
            points: mesh.points().to_vec(),
            triangles: mesh.triangles().iter().map(|t| t.points).collect(),
        };
        write_cbor(&dir.join("mesh.cbor"), &geometry)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            frames_written: 0,
        })
    }

    fn write_frame(&mut self, name: &str, frame: &Frame) -> io::Result<()> {
        write_cbor(&self.dir.join(name), frame)
    }
}

impl SnapshotSink for FrameWriter {
    fn on_step(
        &mut self,
        step: u64,
        time: f64,
        oil: &[f64],
        oil_in_grounds: f64,
    ) -> io::Result<()> {
        let frame = Frame {
            step,
            time,
            oil_in_fishing_grounds: oil_in_grounds,
            oil: oil.to_vec(),
        };
        let name = format!("frame_{:05}.cbor", self.frames_written);
        self.write_frame(&name, &frame)?;
        self.frames_written += 1;
        Ok(())
    }

    fn on_final(
        &mut self,
        step: u64,
        time: f64,
        oil: &[f64],
        oil_in_grounds: f64,
    ) -> io::Result<()> {
        let frame = Frame {
            step,
            time,
            oil_in_fishing_grounds: oil_in_grounds,
            oil: oil.to_vec(),
        };
        self.write_frame("final.cbor", &frame)
    }
}

fn write_cbor<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let file = BufWriter::new(File::create(path)?);
    ciborium::ser::into_writer(value, file)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// Rewrites the solution checkpoint on every snapshot, so the newest state
/// survives whatever ends the process. The checkpoint covers the global
/// cell index space; boundary segments carry no oil and are written as
/// zero.
pub struct RestartWriter {
    path: PathBuf,
    num_lines: usize,
}

impl RestartWriter {
    pub fn new(path: &Path, mesh: &Mesh) -> Self {
        Self {
            path: path.to_path_buf(),
            num_lines: mesh.num_lines(),
        }
    }

    fn write_checkpoint(&self, time: f64, oil: &[f64], oil_in_grounds: f64) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(&self.path)?);
        let amounts = std::iter::repeat(0.0)
            .take(self.num_lines)
            .chain(oil.iter().copied());
        restart::write(&mut file, time, oil_in_grounds, amounts)
    }
}

impl SnapshotSink for RestartWriter {
    fn on_step(
        &mut self,
        _step: u64,
        time: f64,
        oil: &[f64],
        oil_in_grounds: f64,
    ) -> io::Result<()> {
        self.write_checkpoint(time, oil, oil_in_grounds)
    }

    fn on_final(
        &mut self,
        _step: u64,
        time: f64,
        oil: &[f64],
        oil_in_grounds: f64,
    ) -> io::Result<()> {
        self.write_checkpoint(time, oil, oil_in_grounds)
    }
}

#[cfg(test)]
mod test {
    use super::{Frame, FrameWriter, RenderGeometry, RestartWriter, SnapshotSink};
    use crate::geometry::Point;
    use crate::mesh::{Mesh, MeshData};
    use crate::restart;
    use std::fs::File;

    fn unit_square_mesh() -> Mesh {
        Mesh::build(MeshData {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
            ],
            triangles: vec![[0, 1, 2], [1, 3, 2]],
            lines: vec![[0, 1], [1, 3], [3, 2], [2, 0]],
        })
        .unwrap()
    }

    #[test]
    fn frames_and_geometry_land_in_the_directory() {
        let mesh = unit_square_mesh();
        let dir = tempfile::tempdir().unwrap();

        let mut sink = FrameWriter::new(dir.path(), &mesh).unwrap();
        sink.on_step(0, 0.0, &[1.0, 0.0], 0.5).unwrap();
        sink.on_step(10, 0.1, &[0.6, 0.4], 0.5).unwrap();
        sink.on_final(10, 0.1, &[0.6, 0.4], 0.5).unwrap();

        let geometry: RenderGeometry =
            ciborium::de::from_reader(File::open(dir.path().join("mesh.cbor")).unwrap()).unwrap();
        assert_eq!(geometry.triangles.len(), 2);

        let frame: Frame =
            ciborium::de::from_reader(File::open(dir.path().join("frame_00001.cbor")).unwrap())
                .unwrap();
        assert_eq!(frame.step, 10);
        assert_eq!(frame.oil, vec![0.6, 0.4]);

        assert!(dir.path().join("final.cbor").exists());
    }

    #[test]
    fn the_checkpoint_covers_every_global_cell() {
        let mesh = unit_square_mesh();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.txt");

        let mut sink = RestartWriter::new(&path, &mesh);
        sink.on_step(3, 0.3, &[0.25, 0.75], 0.5).unwrap();

        let snapshot = restart::read_file(&path).unwrap();
        assert_eq!(snapshot.time, Some(0.3));
        assert_eq!(snapshot.amounts.len(), 6);
        assert_eq!(snapshot.amounts[&0], 0.0);
        assert_eq!(snapshot.amounts[&4], 0.25);
        assert_eq!(snapshot.amounts[&5], 0.75);
    }
}
