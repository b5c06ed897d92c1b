//! Output sinks for rendered frames

use std::io::{self, Write};

use glam::DVec2;
use particle_physics::Frame;

/// Destination for frames emitted by the renderer.
///
/// `sequence` is the 1-based number of the frame in the output.
pub trait FrameSink {
    fn emit(&mut self, sequence: u64, frame: &Frame) -> io::Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Plain-text frame listing.
///
/// ```text
/// frame 1:
///     object 0:
///         felec: (x, y)
///         fgrav: (x, y)
///         acc: (x, y)
///         vel: (x, y)
///         loc: (x, y)
/// ```
///
/// Components are printed with 17 fractional digits in scientific notation,
/// enough to round-trip an `f64`.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn write_vector(out: &mut impl Write, label: &str, v: DVec2) -> io::Result<()> {
    writeln!(out, "\t\t{label}: ({:.17e}, {:.17e})", v.x, v.y)
}

impl<W: Write> FrameSink for TextSink<W> {
    fn emit(&mut self, sequence: u64, frame: &Frame) -> io::Result<()> {
        writeln!(self.out, "frame {sequence}:")?;
        for (i, s) in frame.snapshots().iter().enumerate() {
            writeln!(self.out, "\tobject {i}:")?;
            write_vector(&mut self.out, "felec", s.electrostatic)?;
            write_vector(&mut self.out, "fgrav", s.gravitational)?;
            write_vector(&mut self.out, "acc", s.acceleration)?;
            write_vector(&mut self.out, "vel", s.velocity)?;
            write_vector(&mut self.out, "loc", s.location)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Keeps a copy of every emitted frame in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<(u64, Frame)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for RecordingSink {
    fn emit(&mut self, sequence: u64, frame: &Frame) -> io::Result<()> {
        self.frames.push((sequence, frame.clone()));
        Ok(())
    }
}
