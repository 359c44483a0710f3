//! Steady-state speed-current characteristic of a separately-excited DC motor.
//!
//! The crate models the motor bench used in the electrical-machines lab:
//! the load torque, series armature resistance, field resistance and supply
//! voltage are adjusted, readings of speed and armature current are sampled
//! into runs, and a straight line `n = a·Ia + b` is fitted to every run.
//!
//! Drawing is left to a [`chart::Chart`] implementation; the crate only
//! prepares the numbers.

pub mod chart;
pub mod config;
pub mod error;
pub mod ir;
pub mod motor;
pub mod noise;
pub mod parser;
pub mod regression;
pub mod session;
