use super::MeshData;
use crate::geometry::Point;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

// Gmsh ASCII v2.2 element type codes.
const ELEMENT_LINE: u32 = 1;
const ELEMENT_TRIANGLE: u32 = 2;

/**
 * Error raised while turning a mesh file into the parsed triple.
 */
#[derive(Debug)]
pub enum ReadError {
    Io(io::Error),
    Unsupported(String),
    Parse { line: usize, reason: String },
}

impl fmt::Display for ReadError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ReadError::Io(e) => write!(fmt, "cannot read mesh file: {}", e),
            ReadError::Unsupported(what) => write!(fmt, "unsupported mesh file: {}", what),
            ReadError::Parse { line, reason } => {
                write!(fmt, "mesh file line {}: {}", line, reason)
            }
        }
    }
}

impl error::Error for ReadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ReadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        ReadError::Io(e)
    }
}

/// Read a Gmsh ASCII v2.2 file into the parsed triple. Only line and
/// triangle elements are kept; points, quads and higher-order elements are
/// skipped the way the original tool chain skipped them.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<MeshData, ReadError> {
    parse(BufReader::new(File::open(path)?))
}

/// Parse Gmsh ASCII v2.2 from any buffered reader. Node ids may be sparse;
/// they are remapped to dense 0-based point indices in order of appearance.
pub fn parse<R: BufRead>(reader: R) -> Result<MeshData, ReadError> {
    let mut data = MeshData::default();
    let mut node_ids: HashMap<u64, usize> = HashMap::new();
    let mut section = Section::Preamble;

    for (number, line) in reader.lines().enumerate() {
        let number = number + 1;
        let line = line?;
        let text = line.trim();

        if text.is_empty() {
            continue;
        }
        if let Some(name) = text.strip_prefix('$') {
            section = match (section, name) {
                (Section::Preamble, "MeshFormat") => Section::Format,
                (Section::Format, "EndMeshFormat") => Section::Preamble,
                (Section::Preamble, "Nodes") => Section::Nodes { header: true },
                (Section::Nodes { .. }, "EndNodes") => Section::Preamble,
                (Section::Preamble, "Elements") => Section::Elements { header: true },
                (Section::Elements { .. }, "EndElements") => Section::Preamble,
                // Physical names and other sections carry nothing we need.
                (_, name) if name.starts_with("End") => Section::Preamble,
                _ => Section::Skipped,
            };
            continue;
        }

        match section {
            Section::Preamble | Section::Skipped => {}
            Section::Format => {
                let mut fields = text.split_whitespace();
                let version = fields.next().unwrap_or("");
                let file_type = fields.next().unwrap_or("");
                if !version.starts_with("2.") {
                    return Err(ReadError::Unsupported(format!(
                        "msh format version {}",
                        version
                    )));
                }
                if file_type != "0" {
                    return Err(ReadError::Unsupported("binary msh encoding".into()));
                }
            }
            Section::Nodes { header } => {
                if header {
                    section = Section::Nodes { header: false };
                    continue;
                }
                let fields: Vec<&str> = text.split_whitespace().collect();
                if fields.len() < 3 {
                    return Err(parse_error(number, "expected 'id x y [z]'"));
                }
                let id = parse_field(fields[0], number)?;
                let x = parse_field(fields[1], number)?;
                let y = parse_field(fields[2], number)?;
                node_ids.insert(id, data.points.len());
                data.points.push(Point::new(x, y));
            }
            Section::Elements { header } => {
                if header {
                    section = Section::Elements { header: false };
                    continue;
                }
                let fields: Vec<&str> = text.split_whitespace().collect();
                if fields.len() < 3 {
                    return Err(parse_error(number, "expected 'id type ntags ...'"));
                }
                let kind: u32 = parse_field(fields[1], number)?;
                let ntags: usize = parse_field(fields[2], number)?;
                if fields.len() < 3 + ntags {
                    return Err(parse_error(number, "too few element tags"));
                }
                let nodes = &fields[3 + ntags..];

                match kind {
                    ELEMENT_LINE => {
                        let [a, b] = element_nodes(nodes, &node_ids, number)?;
                        data.lines.push([a, b]);
                    }
                    ELEMENT_TRIANGLE => {
                        let [a, b, c] = element_nodes(nodes, &node_ids, number)?;
                        data.triangles.push([a, b, c]);
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(data)
}

#[derive(Clone, Copy)]
enum Section {
    Preamble,
    Format,
    Nodes { header: bool },
    Elements { header: bool },
    Skipped,
}

fn parse_error(line: usize, reason: &str) -> ReadError {
    ReadError::Parse {
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, line: usize) -> Result<T, ReadError> {
    field
        .parse()
        .map_err(|_| parse_error(line, &format!("unreadable field '{}'", field)))
}

fn element_nodes<const N: usize>(
    fields: &[&str],
    node_ids: &HashMap<u64, usize>,
    line: usize,
) -> Result<[usize; N], ReadError> {
    if fields.len() < N {
        return Err(parse_error(line, "too few element nodes"));
    }
    let mut nodes = [0; N];
    for (node, field) in nodes.iter_mut().zip(fields) {
        let id: u64 = parse_field(field, line)?;
        *node = *node_ids
            .get(&id)
            .ok_or_else(|| parse_error(line, &format!("unknown node id {}", id)))?;
    }
    Ok(nodes)
}
