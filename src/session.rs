//! Session bookkeeping: runs, sampling, fitting.
//!
//! A run collects samples taken under one circuit configuration, so that
//! only the load torque varies inside it. Moving the series-resistance,
//! field-resistance or voltage slider closes the open run (if it holds any
//! samples) and starts a new one. Fits are made per run, never across runs,
//! since each run is a different straight line.
//!
//! The controller keeps one reading per refresh: the displayed `(n, Ia)` is
//! drawn once after start-up and after every slider move, and `sample()`
//! records exactly what is on display. Pressing sample twice without moving
//! a slider therefore records the same point twice.

use std::fmt;
use std::io::Write;

use crate::chart::{Chart, ChartAxes, FittedLine};
use crate::error::{ArmatureError, Result};
use crate::ir::{Command, Parameter};
use crate::motor::DcMotor;
use crate::noise::NoiseSource;
use crate::regression::{fit_line, LinearFit};

/// One recorded operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Speed (r/min).
    pub speed: f64,
    /// Armature current reading (A).
    pub current: f64,
}

/// Samples taken under one fixed `R_Omega`, `Rf`, `U`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    samples: Vec<Sample>,
}

impl Run {
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn currents(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.current).collect()
    }

    pub fn speeds(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.speed).collect()
    }

    /// Least-squares `n = a·Ia + b` over this run's samples.
    pub fn fit(&self) -> Result<LinearFit> {
        fit_line(&self.currents(), &self.speeds())
    }
}

/// Closed runs plus the one open run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    closed: Vec<Run>,
    open: Run,
}

impl Session {
    pub fn closed_runs(&self) -> &[Run] {
        &self.closed
    }

    pub fn open_run(&self) -> &Run {
        &self.open
    }

    /// Closed runs in order, then the open run.
    pub fn runs(&self) -> Vec<&Run> {
        self.closed.iter().chain(std::iter::once(&self.open)).collect()
    }

    pub fn sample_count(&self) -> usize {
        self.closed.iter().map(Run::len).sum::<usize>() + self.open.len()
    }

    fn record(&mut self, sample: Sample) {
        self.open.push(sample);
    }

    /// Close the open run if it holds samples. Returns whether a split happened.
    fn split_if_non_empty(&mut self) -> bool {
        if self.open.is_empty() {
            return false;
        }
        self.closed.push(std::mem::take(&mut self.open));
        true
    }

    fn clear(&mut self) {
        self.closed.clear();
        self.open = Run::default();
    }
}

/// The values shown next to the sliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    /// Speed (r/min).
    pub speed: f64,
    /// Armature current reading (A).
    pub current: f64,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n = {:.0} r/min, Ia = {:.2} A", self.speed, self.current)
    }
}

/// Outcome of a fit over all runs.
#[derive(Debug, Default)]
pub struct FitReport {
    /// Lines that were drawn, in run order.
    pub lines: Vec<FittedLine>,
    /// Runs that had samples but could not be fitted.
    pub skipped: Vec<(usize, ArmatureError)>,
}

/// Owns the motor, the recorded runs and the chart, and reacts to UI events.
pub struct SessionController<N, C> {
    motor: DcMotor<N>,
    chart: C,
    session: Session,
    axes: ChartAxes,
    readout: Readout,
}

impl<N: NoiseSource, C: Chart> SessionController<N, C> {
    pub fn new(mut motor: DcMotor<N>, chart: C) -> Self {
        let readout = read(&mut motor);
        Self {
            motor,
            chart,
            session: Session::default(),
            axes: ChartAxes::default(),
            readout,
        }
    }

    pub fn motor(&self) -> &DcMotor<N> {
        &self.motor
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    /// The reading currently on display.
    pub fn readout(&self) -> Readout {
        self.readout
    }

    /// Write the slider positions and the displayed reading as one line.
    pub fn write_status<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        let state = self.motor.state();
        writeln!(
            out,
            "T2 = {:.1} N·m, R_Omega = {:.3} Ω, Rf = {:.1} Ω, U = {:.1} V | {}",
            state.t2, state.r_omega, state.rf, state.u, self.readout
        )?;
        Ok(())
    }

    /// Set load torque. Never starts a new run.
    pub fn set_t2(&mut self, value: f64) -> Result<()> {
        self.update(Parameter::LoadTorque, value)
    }

    pub fn set_r_omega(&mut self, value: f64) -> Result<()> {
        self.update(Parameter::SeriesResistance, value)
    }

    pub fn set_rf(&mut self, value: f64) -> Result<()> {
        self.update(Parameter::FieldResistance, value)
    }

    pub fn set_u(&mut self, value: f64) -> Result<()> {
        self.update(Parameter::SupplyVoltage, value)
    }

    /// Apply `value` to the motor, then start a new run if `parameter` is part
    /// of the circuit configuration and its value moved.
    fn update(&mut self, parameter: Parameter, value: f64) -> Result<()> {
        let state = self.motor.state();
        let previous = match parameter {
            Parameter::LoadTorque => state.t2,
            Parameter::SeriesResistance => state.r_omega,
            Parameter::FieldResistance => state.rf,
            Parameter::SupplyVoltage => state.u,
        };
        match parameter {
            Parameter::LoadTorque => self.motor.set_t2(value)?,
            Parameter::SeriesResistance => self.motor.set_r_omega(value)?,
            Parameter::FieldResistance => self.motor.set_rf(value)?,
            Parameter::SupplyVoltage => self.motor.set_u(value)?,
        }
        if parameter.splits_run() && previous != value && self.session.split_if_non_empty() {
            tracing::debug!(
                parameter = parameter.symbol(),
                closed_runs = self.session.closed.len(),
                "started new run"
            );
        }
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.readout = read(&mut self.motor);
        tracing::trace!(speed = self.readout.speed, current = self.readout.current, "refreshed");
    }

    /// Move a slider: the value is clamped into the slider range and snapped
    /// to its resolution before it reaches the motor.
    pub fn set(&mut self, parameter: Parameter, raw: f64) -> Result<()> {
        if !raw.is_finite() {
            return Err(ArmatureError::Domain(format!(
                "{} must be finite, got {}",
                parameter.symbol(),
                raw
            )));
        }
        let value = parameter.snap(raw);
        let (lo, hi) = parameter.range();
        if raw < lo || raw > hi {
            tracing::warn!(
                parameter = parameter.symbol(),
                requested = raw,
                applied = value,
                "value outside slider range, clamped"
            );
        }
        self.update(parameter, value)
    }

    /// Dispatch one UI event. `Show` and `Quit` belong to the front end and
    /// are no-ops here.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Set(parameter, value) => self.set(parameter, value),
            Command::Sample => self.sample().map(|_| ()),
            Command::Fit => self.fit().map(|_| ()),
            Command::Clear => self.clear(),
            Command::Show | Command::Quit => Ok(()),
        }
    }

    /// Record the displayed reading into the open run and redraw the scatter.
    pub fn sample(&mut self) -> Result<Sample> {
        let sample = Sample {
            speed: self.readout.speed,
            current: self.readout.current,
        };
        self.session.record(sample);
        let _span = tracing::info_span!(
            "sample",
            run = self.session.closed.len(),
            points = self.session.open.len()
        )
        .entered();
        tracing::debug!(speed = sample.speed, current = sample.current, "recorded");
        self.chart.render_scatter(&self.session.runs())?;
        Ok(sample)
    }

    /// Fit and draw one line per run that has enough distinct currents.
    pub fn fit(&mut self) -> Result<FitReport> {
        let runs = self.session.runs();
        let _span = tracing::info_span!("fit", runs = runs.len()).entered();
        let mut report = FitReport::default();

        for (index, run) in runs.into_iter().enumerate() {
            if run.is_empty() {
                continue;
            }
            match run.fit() {
                Ok(fit) => {
                    let line = FittedLine::new(index, fit, self.axes.current);
                    tracing::info!(run = index, label = %line.label, "fitted");
                    self.chart.render_line(&line)?;
                    report.lines.push(line);
                }
                Err(e) => {
                    tracing::warn!(run = index, error = %e, "skipping run");
                    report.skipped.push((index, e));
                }
            }
        }

        Ok(report)
    }

    /// Discard every run and reset the chart.
    pub fn clear(&mut self) -> Result<()> {
        tracing::debug!(samples = self.session.sample_count(), "clearing session");
        self.session.clear();
        self.chart.reset()
    }
}

fn read<N: NoiseSource>(motor: &mut DcMotor<N>) -> Readout {
    Readout {
        speed: motor.speed(),
        current: motor.armature_current(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(current: f64, speed: f64) -> Sample {
        Sample { speed, current }
    }

    #[test]
    fn test_split_skips_empty_run() {
        let mut s = Session::default();
        assert!(!s.split_if_non_empty());
        assert!(s.closed_runs().is_empty());
    }

    #[test]
    fn test_split_closes_non_empty_run() {
        let mut s = Session::default();
        s.record(sample(10.0, 3000.0));
        s.record(sample(20.0, 2950.0));
        assert!(s.split_if_non_empty());
        assert_eq!(s.closed_runs().len(), 1);
        assert_eq!(s.closed_runs()[0].len(), 2);
        assert!(s.open_run().is_empty());
        assert_eq!(s.sample_count(), 2);
    }

    #[test]
    fn test_runs_lists_open_run_last() {
        let mut s = Session::default();
        s.record(sample(10.0, 3000.0));
        s.split_if_non_empty();
        s.record(sample(30.0, 2800.0));
        let runs = s.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].samples()[0].current, 10.0);
        assert_eq!(runs[1].samples()[0].current, 30.0);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut s = Session::default();
        s.record(sample(10.0, 3000.0));
        s.split_if_non_empty();
        s.record(sample(30.0, 2800.0));
        s.clear();
        assert_eq!(s, Session::default());
    }

    #[test]
    fn test_run_fit() {
        let mut run = Run::default();
        for x in [1.0, 2.0, 3.0] {
            run.push(sample(x, 2.0 * x + 5.0));
        }
        let fit = run.fit().unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_readout_format() {
        let r = Readout {
            speed: 2999.6,
            current: 89.287,
        };
        assert_eq!(r.to_string(), "n = 3000 r/min, Ia = 89.29 A");
    }
}
