use std::{f32::consts::PI, path::Path};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{gears::GearSpec, ClockError, Result};

/// Top-level configuration structure for a clock session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub gears: GearTrainConfig,
    pub kinematics: KinematicsConfig,
    pub camera: CameraConfig,
    pub playback: PlaybackConfig,
    pub scene: SceneConfig,
}

impl ClockConfig {
    /// Parses and validates a JSON document. Missing sections fall back to
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every section. A session refuses to start on any error here.
    pub fn validate(&self) -> Result<()> {
        self.gears.validate()?;
        self.kinematics.validate()?;
        self.camera.validate()?;
        self.playback.validate()?;
        self.scene.validate()
    }
}

/// Tooth counts and pitch radii for the going train, barrel to escape wheel.
///
/// Each wheel is driven by the pinion of the arbor before it; the barrel's
/// own toothing drives the center wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearTrainConfig {
    pub barrel: GearSpec,
    pub center_wheel: GearSpec,
    pub center_pinion: GearSpec,
    pub third_wheel: GearSpec,
    pub third_pinion: GearSpec,
    pub fourth_wheel: GearSpec,
    pub fourth_pinion: GearSpec,
    pub escape_wheel: GearSpec,
}

impl Default for GearTrainConfig {
    fn default() -> Self {
        Self {
            barrel: GearSpec::new(28, 0.74),
            center_wheel: GearSpec::new(64, 1.7),
            center_pinion: GearSpec::new(24, 0.68),
            third_wheel: GearSpec::new(48, 1.35),
            third_pinion: GearSpec::new(20, 0.62),
            fourth_wheel: GearSpec::new(32, 1.0),
            fourth_pinion: GearSpec::new(16, 0.8),
            escape_wheel: GearSpec::new(15, 0.75),
        }
    }
}

impl GearTrainConfig {
    pub fn named(&self) -> [(&'static str, &GearSpec); 8] {
        [
            ("barrel", &self.barrel),
            ("center-wheel", &self.center_wheel),
            ("center-pinion", &self.center_pinion),
            ("third-wheel", &self.third_wheel),
            ("third-pinion", &self.third_pinion),
            ("fourth-wheel", &self.fourth_wheel),
            ("fourth-pinion", &self.fourth_pinion),
            ("escape-wheel", &self.escape_wheel),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        self.named()
            .into_iter()
            .try_for_each(|(name, spec)| spec.validate(name))
    }
}

/// Constants of the stylised kinematic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Barrel angular speed in rad/s before the segment multiplier.
    pub base_speed: f32,
    /// Motion works speed as a fraction of barrel speed.
    pub motion_works_ratio: f32,
    /// Escape wheel rotation per released tooth, in radians.
    pub escape_quantum: f32,
    pub anchor_amplitude: f32,
    pub anchor_frequency: f32,
    pub balance_amplitude: f32,
    pub balance_frequency: f32,
    /// Keep the movement running while narration playback is paused.
    pub animate_while_paused: bool,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.4,
            motion_works_ratio: 0.18,
            escape_quantum: PI / 6.0,
            anchor_amplitude: 0.4,
            anchor_frequency: 0.5,
            balance_amplitude: 0.8,
            balance_frequency: 0.6,
            animate_while_paused: true,
        }
    }
}

impl KinematicsConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("base_speed", self.base_speed),
            ("motion_works_ratio", self.motion_works_ratio),
            ("escape_quantum", self.escape_quantum),
            ("anchor_frequency", self.anchor_frequency),
            ("balance_frequency", self.balance_frequency),
        ];
        for (name, value) in positive {
            require_positive(name, value)?;
        }
        for (name, value) in [
            ("anchor_amplitude", self.anchor_amplitude),
            ("balance_amplitude", self.balance_amplitude),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ClockError::InvalidConfig(format!(
                    "kinematics.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Orbit camera limits, input sensitivities and the initial pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub initial_azimuth: f32,
    pub initial_polar: f32,
    pub initial_radius: f32,
    pub initial_position: Vec3,
    pub initial_target: Vec3,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radians of orbit per pixel of pointer travel.
    pub drag_sensitivity: f32,
    /// Radius change per unit of wheel delta.
    pub zoom_sensitivity: f32,
    /// Fraction of the remaining distance covered each tick.
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_azimuth: 0.5,
            initial_polar: 0.9,
            initial_radius: 12.0,
            initial_position: Vec3::new(8.0, 6.0, 12.0),
            initial_target: Vec3::new(0.0, 0.6, 0.0),
            min_polar: 0.3,
            max_polar: 1.4,
            min_radius: 8.0,
            max_radius: 18.0,
            drag_sensitivity: 0.005,
            zoom_sensitivity: 0.01,
            damping: 0.1,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_polar > 0.0 && self.min_polar < self.max_polar && self.max_polar < PI) {
            return Err(ClockError::InvalidConfig(format!(
                "camera polar range [{}, {}] must lie strictly inside (0, pi)",
                self.min_polar, self.max_polar
            )));
        }
        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius)
            || !self.max_radius.is_finite()
        {
            return Err(ClockError::InvalidConfig(format!(
                "camera radius range [{}, {}] must be positive and ordered",
                self.min_radius, self.max_radius
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ClockError::InvalidConfig(format!(
                "camera.damping must be in (0, 1], got {}",
                self.damping
            )));
        }
        require_positive("initial_radius", self.initial_radius)?;
        require_positive("drag_sensitivity", self.drag_sensitivity)?;
        require_positive("zoom_sensitivity", self.zoom_sensitivity)?;
        if !self.initial_azimuth.is_finite()
            || !self.initial_polar.is_finite()
            || !self.initial_position.is_finite()
            || !self.initial_target.is_finite()
        {
            return Err(ClockError::InvalidConfig(
                "camera initial pose must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Playback speed options offered to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub speed_options: Vec<f32>,
    pub default_speed: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_options: vec![0.5, 1.0, 1.5, 2.0],
            default_speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.speed_options.is_empty() {
            return Err(ClockError::InvalidConfig(
                "playback.speed_options must not be empty".into(),
            ));
        }
        for speed in &self.speed_options {
            require_positive("speed_options", *speed)?;
        }
        if !self.allows(self.default_speed) {
            return Err(ClockError::InvalidConfig(format!(
                "playback.default_speed {} is not one of the speed options",
                self.default_speed
            )));
        }
        Ok(())
    }

    pub fn allows(&self, speed: f32) -> bool {
        self.speed_options
            .iter()
            .any(|option| (option - speed).abs() <= 1e-6)
    }
}

/// Presentation constants for the case, x-ray and exploded view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub shell_lift: f32,
    pub exploded_distance: f32,
    pub explode_rate: f32,
    pub collapse_rate: f32,
    pub xray_opacity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shell_lift: 3.5,
            exploded_distance: 0.6,
            explode_rate: 0.1,
            collapse_rate: 0.2,
            xray_opacity: 0.2,
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("shell_lift", self.shell_lift)?;
        require_positive("exploded_distance", self.exploded_distance)?;
        for (name, value) in [
            ("explode_rate", self.explode_rate),
            ("collapse_rate", self.collapse_rate),
            ("xray_opacity", self.xray_opacity),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ClockError::InvalidConfig(format!(
                    "scene.{name} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ClockError::InvalidConfig(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ClockConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            ClockConfig::from_json_str(r#"{ "playback": { "default_speed": 2.0 } }"#).unwrap();
        assert_eq!(config.playback.default_speed, 2.0);
        assert_eq!(config.gears.center_wheel.teeth, 64);
        assert_eq!(config.camera.initial_position, Vec3::new(8.0, 6.0, 12.0));
    }

    #[test]
    fn zero_teeth_is_fatal() {
        let json = r#"{ "gears": { "third_wheel": { "teeth": 0, "pitch_radius": 1.0 } } }"#;
        let err = ClockConfig::from_json_str(json).unwrap_err();
        assert!(format!("{err}").contains("third-wheel"));
    }

    #[test]
    fn default_speed_must_be_an_option() {
        let mut config = ClockConfig::default();
        config.playback.default_speed = 3.0;
        assert!(matches!(
            config.validate(),
            Err(ClockError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_inverted_polar_range() {
        let mut config = ClockConfig::default();
        config.camera.min_polar = 1.5;
        config.camera.max_polar = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_survives_json() {
        let config = ClockConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(ClockConfig::from_json_str(&json).unwrap(), config);
    }
}
