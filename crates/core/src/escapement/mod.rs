//! Stylised escapement: a stepped escape wheel with the pallet fork and the
//! balance oscillating in phase with the same beat.

use std::f64::consts::TAU;

use crate::config::KinematicsConfig;

/// Angles produced by the escapement for one instant of simulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EscapementPose {
    pub step_index: u64,
    pub escape_angle: f32,
    pub anchor_angle: f32,
    pub balance_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapementStepper {
    quantum: f32,
    anchor_amplitude: f32,
    anchor_frequency: f32,
    balance_amplitude: f32,
    balance_frequency: f32,
}

impl EscapementStepper {
    pub fn from_config(config: &KinematicsConfig) -> Self {
        Self {
            quantum: config.escape_quantum,
            anchor_amplitude: config.anchor_amplitude,
            anchor_frequency: config.anchor_frequency,
            balance_amplitude: config.balance_amplitude,
            balance_frequency: config.balance_frequency,
        }
    }

    /// Number of teeth released after `time` seconds at `rate` steps/s.
    #[inline]
    pub fn step_index(time: f64, rate: f32) -> u64 {
        let beats = time * f64::from(rate);
        if beats.is_finite() && beats > 0.0 {
            beats.floor() as u64
        } else {
            0
        }
    }

    /// Time is taken as `f64` so long sessions keep sub-frame resolution;
    /// angles are narrowed to `f32` only after the phase is reduced.
    pub fn pose(&self, time: f64, rate: f32) -> EscapementPose {
        let step_index = Self::step_index(time, rate);
        let beat = time * f64::from(rate);
        let escape_angle = (step_index as f64 * f64::from(self.quantum)).rem_euclid(TAU) as f32;
        EscapementPose {
            step_index,
            escape_angle,
            anchor_angle: oscillation(beat, self.anchor_frequency, self.anchor_amplitude),
            balance_angle: oscillation(beat, self.balance_frequency, self.balance_amplitude),
        }
    }
}

#[inline]
fn oscillation(beat: f64, frequency: f32, amplitude: f32) -> f32 {
    (beat * f64::from(frequency)).rem_euclid(TAU).sin() as f32 * amplitude
}

impl Default for EscapementStepper {
    fn default() -> Self {
        Self::from_config(&KinematicsConfig::default())
    }
}
