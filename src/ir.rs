//! UI event representation.
//!
//! The parser turns each input line into a `Command`; the session controller
//! consumes commands one at a time. Each slider of the bench panel maps to a
//! `Parameter` with the same range and resolution the panel offers.

/// One adjustable circuit quantity, i.e. one slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// Load torque T2 (N·m).
    LoadTorque,
    /// Series armature resistance RΩ (Ω), speed control.
    SeriesResistance,
    /// Field-circuit resistance Rf (Ω), field weakening.
    FieldResistance,
    /// Supply voltage U (V), speed control.
    SupplyVoltage,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::LoadTorque,
        Parameter::SeriesResistance,
        Parameter::FieldResistance,
        Parameter::SupplyVoltage,
    ];

    /// Slider range, inclusive.
    pub fn range(self) -> (f64, f64) {
        match self {
            Parameter::LoadTorque => (30.0, 100.0),
            Parameter::SeriesResistance => (0.0, 0.8),
            Parameter::FieldResistance => (160.0, 210.0),
            Parameter::SupplyVoltage => (150.0, 300.0),
        }
    }

    /// Slider step.
    pub fn resolution(self) -> f64 {
        match self {
            Parameter::LoadTorque => 0.1,
            Parameter::SeriesResistance => 0.001,
            Parameter::FieldResistance => 0.1,
            Parameter::SupplyVoltage => 0.1,
        }
    }

    /// Whether changing this quantity starts a new run.
    ///
    /// Only the load torque is swept within a run.
    pub fn splits_run(self) -> bool {
        !matches!(self, Parameter::LoadTorque)
    }

    /// Snap a raw value onto the slider: clamp into range, then round to the
    /// nearest step counted from the lower end.
    pub fn snap(self, value: f64) -> f64 {
        let (lo, hi) = self.range();
        let step = self.resolution();
        let steps = ((value.clamp(lo, hi) - lo) / step).round();
        // Re-round in decimal so 0.1-steps don't accumulate binary error.
        let decimals = (-step.log10()).ceil().max(0.0) as i32;
        let scale = 10f64.powi(decimals);
        ((lo + steps * step) * scale).round() / scale
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Parameter::LoadTorque => "T2",
            Parameter::SeriesResistance => "R_Omega",
            Parameter::FieldResistance => "Rf",
            Parameter::SupplyVoltage => "U",
        }
    }
}

/// One user action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move a slider to a value.
    Set(Parameter, f64),
    /// Record the current reading into the open run.
    Sample,
    /// Fit a line to every run.
    Fit,
    /// Discard all runs.
    Clear,
    /// Print the current operating point and reading.
    Show,
    /// End the session.
    Quit,
}
