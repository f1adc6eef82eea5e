//! Angular velocity propagation through meshed gear pairs.
//!
//! Every external mesh reverses the direction of rotation, so the speed of
//! the driven gear is `-ω_driver * (driver_teeth / driven_teeth)`. The sign
//! flips at every link of a chain.

use serde::{Deserialize, Serialize};

use crate::{config::GearTrainConfig, ClockError, Result};

/// Static description of a single wheel or pinion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearSpec {
    pub teeth: u32,
    pub pitch_radius: f32,
}

impl GearSpec {
    pub const fn new(teeth: u32, pitch_radius: f32) -> Self {
        Self {
            teeth,
            pitch_radius,
        }
    }

    pub fn validate(&self, name: &'static str) -> Result<()> {
        if self.teeth == 0 {
            return Err(ClockError::InvalidGear {
                name,
                reason: "tooth count must be at least 1".into(),
            });
        }
        if !(self.pitch_radius.is_finite() && self.pitch_radius > 0.0) {
            return Err(ClockError::InvalidGear {
                name,
                reason: format!("pitch radius must be positive, got {}", self.pitch_radius),
            });
        }
        Ok(())
    }
}

/// A driver meshing with a driven gear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearChainLink {
    pub driver: GearSpec,
    pub driven: GearSpec,
}

impl GearChainLink {
    pub const fn new(driver: GearSpec, driven: GearSpec) -> Self {
        Self { driver, driven }
    }

    /// Signed speed ratio of the driven gear relative to the driver.
    #[inline]
    pub fn ratio(&self) -> f32 {
        -(self.driver.teeth as f32 / self.driven.teeth as f32)
    }

    #[inline]
    pub fn drive(&self, driver_speed: f32) -> f32 {
        driver_speed * self.ratio()
    }
}

/// Returns the speed of every driven gear along `chain`, in chain order.
///
/// Tooth counts are assumed non-zero; [`GearSpec::validate`] enforces this
/// when the configuration is loaded.
pub fn propagate(input_speed: f32, chain: &[GearChainLink]) -> Vec<f32> {
    chain
        .iter()
        .scan(input_speed, |speed, link| {
            *speed = link.drive(*speed);
            Some(*speed)
        })
        .collect()
}

/// Angular speeds of the going train for one barrel speed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainSpeeds {
    pub barrel: f32,
    pub center: f32,
    pub third: f32,
    pub fourth: f32,
    pub escape: f32,
}

/// The fixed barrel → center → third → fourth → escape chain.
#[derive(Debug, Clone, Copy)]
pub struct GoingTrain {
    links: [GearChainLink; 4],
}

impl GoingTrain {
    pub fn from_config(gears: &GearTrainConfig) -> Result<Self> {
        gears.validate()?;
        Ok(Self {
            links: [
                GearChainLink::new(gears.barrel, gears.center_wheel),
                GearChainLink::new(gears.center_pinion, gears.third_wheel),
                GearChainLink::new(gears.third_pinion, gears.fourth_wheel),
                GearChainLink::new(gears.fourth_pinion, gears.escape_wheel),
            ],
        })
    }

    pub fn links(&self) -> &[GearChainLink] {
        &self.links
    }

    pub fn speeds(&self, barrel_speed: f32) -> TrainSpeeds {
        let center = self.links[0].drive(barrel_speed);
        let third = self.links[1].drive(center);
        let fourth = self.links[2].drive(third);
        let escape = self.links[3].drive(fourth);
        TrainSpeeds {
            barrel: barrel_speed,
            center,
            third,
            fourth,
            escape,
        }
    }

    /// Overall signed ratio from barrel to escape wheel.
    pub fn total_ratio(&self) -> f32 {
        self.links.iter().map(GearChainLink::ratio).product()
    }
}
