use crate::error::{Error, RestartDefect};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// A parsed solution checkpoint. The header values are advisory; the cell
/// amounts are authoritative, with unlisted cells defaulting to zero.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Simulation time recorded in the header, when one was readable.
    pub time: Option<f64>,
    /// Diagnostic value recorded in the header.
    pub total_oil: Option<f64>,
    /// Oil amount per global cell index.
    pub amounts: HashMap<usize, f64>,
}

/// Write a checkpoint in the solution text format: one advisory header line
/// followed by one `Cell <index>: <amount>` line per global cell index, in
/// index order. Amounts print in round-trip form, so a written snapshot
/// reloads to identical bits.
pub fn write<W: Write>(
    w: &mut W,
    time: f64,
    total_oil: f64,
    amounts: impl IntoIterator<Item = f64>,
) -> io::Result<()> {
    writeln!(
        w,
        "t = {}, total_oil_in_fishing_grounds = {}",
        time, total_oil
    )?;
    for (cell, amount) in amounts.into_iter().enumerate() {
        writeln!(w, "Cell {}: {}", cell, amount)?;
    }
    Ok(())
}

/// Parse a checkpoint. Every `Cell <index>: <amount>` line is read; the
/// header is parsed when it is readable and skipped otherwise; anything else
/// is ignored.
pub fn read<R: BufRead>(reader: R) -> Result<Snapshot, Error> {
    let mut snapshot = Snapshot::default();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();

        if let Some(rest) = text.strip_prefix("Cell ") {
            let (cell, amount) = rest
                .split_once(':')
                .and_then(|(cell, amount)| {
                    let cell = cell.trim().parse::<usize>().ok()?;
                    let amount = amount.trim().parse::<f64>().ok()?;
                    Some((cell, amount))
                })
                .ok_or(Error::RestartMismatch(RestartDefect::MalformedLine {
                    line: number + 1,
                }))?;
            snapshot.amounts.insert(cell, amount);
        } else if text.starts_with("t =") || text.starts_with("t=") {
            let (time, total_oil) = parse_header(text);
            snapshot.time = time;
            snapshot.total_oil = total_oil;
        }
    }
    Ok(snapshot)
}

/// Read a checkpoint file from disk.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Snapshot, Error> {
    read(BufReader::new(File::open(path)?))
}

// The header is advisory, so an unreadable one degrades to absent values
// rather than failing the load.
fn parse_header(text: &str) -> (Option<f64>, Option<f64>) {
    let mut time = None;
    let mut total_oil = None;

    for part in text.split(',') {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim().parse::<f64>().ok();
            match key.trim() {
                "t" => time = value,
                "total_oil_in_fishing_grounds" => total_oil = value,
                _ => {}
            }
        }
    }
    (time, total_oil)
}

#[cfg(test)]
mod test {
    use super::{read, write};
    use crate::error::Error;
    use std::io::Cursor;

    #[test]
    fn written_snapshots_read_back_exactly() {
        let amounts = [0.1, 0.0, 1.0 / 3.0, 6.02e23];
        let mut buffer = Vec::new();
        write(&mut buffer, 0.35, 1.25e-3, amounts.iter().copied()).unwrap();

        let snapshot = read(Cursor::new(buffer)).unwrap();
        assert_eq!(snapshot.time, Some(0.35));
        assert_eq!(snapshot.total_oil, Some(1.25e-3));
        for (cell, &amount) in amounts.iter().enumerate() {
            assert_eq!(snapshot.amounts[&cell].to_bits(), amount.to_bits());
        }
    }

    #[test]
    fn missing_cells_are_simply_absent() {
        let text = "t = 0.5, total_oil_in_fishing_grounds = 0.2\nCell 3: 0.75\n";
        let snapshot = read(Cursor::new(text)).unwrap();
        assert_eq!(snapshot.amounts.len(), 1);
        assert_eq!(snapshot.amounts[&3], 0.75);
    }

    #[test]
    fn the_header_is_advisory() {
        let text = "t = nonsense\nCell 0: 1.0\n";
        let snapshot = read(Cursor::new(text)).unwrap();
        assert_eq!(snapshot.time, None);
        assert_eq!(snapshot.amounts[&0], 1.0);

        let headerless = "Cell 0: 1.0\n";
        assert!(read(Cursor::new(headerless)).unwrap().time.is_none());
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let text = "# comment\n\nCell 1: 0.5\ntrailing noise\n";
        let snapshot = read(Cursor::new(text)).unwrap();
        assert_eq!(snapshot.amounts.len(), 1);
    }

    #[test]
    fn malformed_cell_lines_are_an_error() {
        let text = "Cell 0: 1.0\nCell two: 0.5\n";
        match read(Cursor::new(text)) {
            Err(Error::RestartMismatch(_)) => {}
            other => panic!("expected RestartMismatch, got {:?}", other),
        }
    }
}
