//! Output collaborator seam.
//!
//! The loop hands per-tick positions and the append-only event logs to a
//! `TickSink`; the visualization and plotting collaborators live on the far
//! side of this trait. Writers buffer internally so a tick never waits on
//! an unbuffered syscall.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use na::Vector3;

use crate::{body::BodyId, units::Timestamp};

pub trait TickSink {
    /// All body positions for one tick, in population order.
    fn positions(&mut self, time: Timestamp, rows: &[(BodyId, Vector3<f64>)]) -> io::Result<()>;

    /// One detected collision, after fragmentation was applied.
    fn collision(&mut self, time: Timestamp, first: BodyId, second: BodyId) -> io::Result<()>;

    /// One periodic background-injection event.
    fn injection(&mut self, time: Timestamp, count: usize) -> io::Result<()>;
}

/// CSV writers for the three output streams:
/// `positions.csv`, `collisions.csv`, `injections.csv`.
pub struct CsvSink {
    positions: BufWriter<File>,
    collisions: BufWriter<File>,
    injections: BufWriter<File>,
}

impl CsvSink {
    pub fn create<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut positions = BufWriter::new(File::create(dir.join("positions.csv"))?);
        writeln!(positions, "TIME,ID,X,Y,Z")?;
        let mut collisions = BufWriter::new(File::create(dir.join("collisions.csv"))?);
        writeln!(collisions, "ID_A,ID_B,TIME")?;
        let mut injections = BufWriter::new(File::create(dir.join("injections.csv"))?);
        writeln!(injections, "COUNT,TIME")?;

        Ok(CsvSink {
            positions,
            collisions,
            injections,
        })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.positions.flush()?;
        self.collisions.flush()?;
        self.injections.flush()
    }
}

impl TickSink for CsvSink {
    fn positions(&mut self, time: Timestamp, rows: &[(BodyId, Vector3<f64>)]) -> io::Result<()> {
        let t = time.as_secs();
        for (id, pos) in rows {
            writeln!(self.positions, "{t},{id},{},{},{}", pos.x, pos.y, pos.z)?;
        }
        Ok(())
    }

    fn collision(&mut self, time: Timestamp, first: BodyId, second: BodyId) -> io::Result<()> {
        writeln!(self.collisions, "{first},{second},{}", time.as_secs())
    }

    fn injection(&mut self, time: Timestamp, count: usize) -> io::Result<()> {
        writeln!(self.injections, "{count},{}", time.as_secs())
    }
}

/// In-memory sink for tests and for callers that post-process a whole run.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub ticks: Vec<(Timestamp, Vec<(BodyId, Vector3<f64>)>)>,
    pub collisions: Vec<(BodyId, BodyId, Timestamp)>,
    pub injections: Vec<(usize, Timestamp)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSink for MemorySink {
    fn positions(&mut self, time: Timestamp, rows: &[(BodyId, Vector3<f64>)]) -> io::Result<()> {
        self.ticks.push((time, rows.to_vec()));
        Ok(())
    }

    fn collision(&mut self, time: Timestamp, first: BodyId, second: BodyId) -> io::Result<()> {
        self.collisions.push((first, second, time));
        Ok(())
    }

    fn injection(&mut self, time: Timestamp, count: usize) -> io::Result<()> {
        self.injections.push((count, time));
        Ok(())
    }
}
