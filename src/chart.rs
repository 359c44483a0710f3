//! Charting collaborator.
//!
//! The session never draws anything itself. It hands numeric payloads to a
//! [`Chart`]: the full set of runs after every sample, one fitted line per
//! run after a fit, and a reset after a clear. Whether an implementation
//! redraws incrementally or from scratch is its own business.

use std::io::Write;

use crate::error::Result;
use crate::regression::LinearFit;
use crate::session::Run;

/// Fixed plot axes of the speed-current characteristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartAxes {
    /// Armature current range (A).
    pub current: (f64, f64),
    /// Speed range (r/min).
    pub speed: (f64, f64),
}

impl Default for ChartAxes {
    fn default() -> Self {
        Self {
            current: (0.0, 200.0),
            speed: (1600.0, 3800.0),
        }
    }
}

/// A regression line ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedLine {
    /// Index of the run the line was fitted to, in session order.
    pub run: usize,
    pub fit: LinearFit,
    /// Current interval the line is drawn over (A).
    pub domain: (f64, f64),
    pub label: String,
}

impl FittedLine {
    pub fn new(run: usize, fit: LinearFit, domain: (f64, f64)) -> Self {
        let label = format!("n = {:.2} · Ia + {:.2}", fit.slope, fit.intercept);
        Self {
            run,
            fit,
            domain,
            label,
        }
    }

    /// `count` evenly spaced `(Ia, n)` points across the domain, ends included.
    pub fn points(&self, count: usize) -> Vec<(f64, f64)> {
        let (start, stop) = self.domain;
        if count <= 1 {
            return vec![(start, self.fit.eval(start))];
        }
        let step = (stop - start) / (count - 1) as f64;
        (0..count)
            .map(|i| {
                let x = start + step * i as f64;
                (x, self.fit.eval(x))
            })
            .collect()
    }
}

/// Receiver of everything the session wants plotted.
pub trait Chart {
    /// Draw every run as its own scatter series.
    fn render_scatter(&mut self, runs: &[&Run]) -> Result<()>;

    /// Draw one fitted line with its legend label.
    fn render_line(&mut self, line: &FittedLine) -> Result<()>;

    /// Back to empty axes.
    fn reset(&mut self) -> Result<()>;
}

impl<C: Chart + ?Sized> Chart for Box<C> {
    fn render_scatter(&mut self, runs: &[&Run]) -> Result<()> {
        (**self).render_scatter(runs)
    }

    fn render_line(&mut self, line: &FittedLine) -> Result<()> {
        (**self).render_line(line)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}

/// Number of points a fitted line is sampled at across its domain.
pub const LINE_POINTS: usize = 201;

/// Writes chart payloads as CSV blocks.
///
/// Format:
/// ```csv
/// # scatter
/// run,Ia,n
/// 0,89.29,3000
/// 0,95.10,2975.4
/// # fit
/// run,slope,intercept,label
/// 0,-4.37,3390.0,n = -4.37 · Ia + 3390.00
/// # line
/// run,Ia,n
/// 0,0,3390
/// 0,1,3385.63
/// ...
/// 0,200,2516
/// # reset
/// ```
pub struct CsvChart<W> {
    writer: W,
}

impl<W: Write> CsvChart<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Chart for CsvChart<W> {
    fn render_scatter(&mut self, runs: &[&Run]) -> Result<()> {
        writeln!(self.writer, "# scatter")?;
        writeln!(self.writer, "run,Ia,n")?;
        for (i, run) in runs.iter().enumerate() {
            for s in run.samples() {
                writeln!(self.writer, "{},{},{}", i, s.current, s.speed)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    fn render_line(&mut self, line: &FittedLine) -> Result<()> {
        writeln!(self.writer, "# fit")?;
        writeln!(self.writer, "run,slope,intercept,label")?;
        writeln!(
            self.writer,
            "{},{},{},{}",
            line.run, line.fit.slope, line.fit.intercept, line.label
        )?;
        writeln!(self.writer, "# line")?;
        writeln!(self.writer, "run,Ia,n")?;
        for (current, speed) in line.points(LINE_POINTS) {
            writeln!(self.writer, "{},{},{}", line.run, current, speed)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        writeln!(self.writer, "# reset")?;
        self.writer.flush()?;
        Ok(())
    }
}
