//! Steady-state model of a separately-excited DC motor.
//!
//! The machine constants are derived once from the nameplate so that the
//! model reproduces rated speed and rated armature current at rated
//! conditions:
//!
//! ```text
//! k  = 1 + Ra/Rf - IN·Ra/UN
//! Ce = Rf/nN · k
//! CT = 60·Ce / 2π
//! T0 = 60/(2π·nN) · (UN·(IN - UN/Rf)·k - PN)
//! ```
//!
//! With the field flux taken as proportional to `If = U/Rf`, the operating
//! point for load torque `T2` is
//!
//! ```text
//! n  = Rf/Ce - R·Rf²/(Ce·CT·U²) · (T2 + T0)
//! Ia = (U - Ce·If·n) / R
//! ```
//!
//! where `R = Ra + RΩ` is the total armature-circuit resistance.
//!
//! Setters reject values for which these expressions are undefined, so the
//! computed quantities never divide by zero.

use std::f64::consts::PI;

use crate::config::MotorConfig;
use crate::error::{ArmatureError, Result};
use crate::noise::NoiseSource;

/// Machine constants derived from the nameplate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorConstants {
    /// Back-EMF constant.
    pub ce: f64,
    /// Torque constant.
    pub ct: f64,
    /// No-load (friction and windage) torque (N·m).
    pub t0: f64,
    /// Armature resistance (Ω).
    pub ra: f64,
    /// Rated field-circuit resistance (Ω).
    pub rf_rated: f64,
    /// Rated voltage (V).
    pub u_rated: f64,
    /// Rated load torque `PN / ωN` (N·m).
    pub t2_rated: f64,
    /// Standard deviation of the armature current reading (A).
    pub error_sigma: f64,
}

impl MotorConstants {
    pub fn from_config(config: &MotorConfig) -> Result<Self> {
        let k = 1.0 + config.ra / config.rf - config.i_n * config.ra / config.u_n;
        let ce = config.rf / config.n_n * k;
        if !ce.is_finite() || ce <= 0.0 {
            return Err(ArmatureError::Config(format!(
                "nameplate yields a non-positive back-EMF constant ({}); check Ra, IN and UN",
                ce
            )));
        }
        let ct = 60.0 * ce / (2.0 * PI);
        let t0 = 60.0 / (2.0 * PI * config.n_n)
            * (config.u_n * (config.i_n - config.u_n / config.rf) * k - config.p_n);
        let t2_rated = config.p_n / (config.n_n * 2.0 * PI / 60.0);

        Ok(Self {
            ce,
            ct,
            t0,
            ra: config.ra,
            rf_rated: config.rf,
            u_rated: config.u_n,
            t2_rated,
            error_sigma: config.error_sigma,
        })
    }
}

/// Adjustable circuit quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingState {
    /// Armature resistance (Ω).
    pub ra: f64,
    /// Series resistance added to the armature circuit (Ω).
    pub r_omega: f64,
    /// Field-circuit resistance (Ω).
    pub rf: f64,
    /// Supply voltage (V).
    pub u: f64,
    /// Load torque (N·m).
    pub t2: f64,
}

impl OperatingState {
    /// Rated operating point: no series resistance, rated field, voltage and torque.
    pub fn rated(constants: &MotorConstants) -> Self {
        Self {
            ra: constants.ra,
            r_omega: 0.0,
            rf: constants.rf_rated,
            u: constants.u_rated,
            t2: constants.t2_rated,
        }
    }

    /// Total armature-circuit resistance.
    pub fn r(&self) -> f64 {
        self.ra + self.r_omega
    }
}

/// DC motor with an injected measurement-noise source.
#[derive(Debug, Clone)]
pub struct DcMotor<N> {
    constants: MotorConstants,
    state: OperatingState,
    noise: N,
}

impl<N: NoiseSource> DcMotor<N> {
    /// Build a motor at its rated operating point.
    pub fn new(config: &MotorConfig, noise: N) -> Result<Self> {
        let constants = MotorConstants::from_config(config)?;
        Ok(Self::from_constants(constants, noise))
    }

    pub fn from_constants(constants: MotorConstants, noise: N) -> Self {
        Self {
            constants,
            state: OperatingState::rated(&constants),
            noise,
        }
    }

    pub fn constants(&self) -> &MotorConstants {
        &self.constants
    }

    pub fn state(&self) -> &OperatingState {
        &self.state
    }

    /// Steady-state speed (r/min).
    pub fn speed(&self) -> f64 {
        let MotorConstants { ce, ct, t0, .. } = self.constants;
        let OperatingState { rf, u, t2, .. } = self.state;
        rf / ce - self.state.r() * rf * rf / (ce * ct * u * u) * (t2 + t0)
    }

    /// Field current `If = U/Rf` (A).
    pub fn field_current(&self) -> f64 {
        self.state.u / self.state.rf
    }

    /// Noise-free armature current (A).
    pub fn ideal_armature_current(&self) -> f64 {
        let back_emf = self.constants.ce * self.field_current() * self.speed();
        (self.state.u - back_emf) / self.state.r()
    }

    /// Armature current reading (A), with a fresh noise draw on every call.
    pub fn armature_current(&mut self) -> f64 {
        self.ideal_armature_current() + self.noise.draw()
    }

    pub fn set_t2(&mut self, t2: f64) -> Result<()> {
        require_finite("T2", t2)?;
        self.state.t2 = t2;
        Ok(())
    }

    pub fn set_r_omega(&mut self, r_omega: f64) -> Result<()> {
        require_finite("R_Omega", r_omega)?;
        if self.state.ra + r_omega <= 0.0 {
            return Err(ArmatureError::Domain(format!(
                "R_Omega = {} leaves no armature-circuit resistance (Ra = {})",
                r_omega, self.state.ra
            )));
        }
        self.state.r_omega = r_omega;
        Ok(())
    }

    pub fn set_rf(&mut self, rf: f64) -> Result<()> {
        require_positive("Rf", rf)?;
        self.state.rf = rf;
        Ok(())
    }

    pub fn set_u(&mut self, u: f64) -> Result<()> {
        require_positive("U", u)?;
        self.state.u = u;
        Ok(())
    }
}

fn require_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ArmatureError::Domain(format!("{} must be finite, got {}", name, value)))
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ArmatureError::Domain(format!("{} must be positive, got {}", name, value)))
    }
}
