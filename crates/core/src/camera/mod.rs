//! Orbit camera around a look-at point.
//!
//! The orbit is parameterised by azimuth (around +Y, measured from +X toward
//! +Z), polar angle (from +Y) and radius. User input nudges the orbit
//! directly; segment changes replace it outright. The rendered position
//! always eases toward the orbit, so both kinds of change read as a glide.

use glam::{Mat4, Vec2, Vec3};
use serde::Serialize;

use crate::{config::CameraConfig, ClockError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitState {
    /// Unbounded; only its sine and cosine are used.
    pub azimuth: f32,
    pub polar: f32,
    pub radius: f32,
}

impl OrbitState {
    /// Orbit that places the camera at `offset` from its target.
    pub fn from_offset(offset: Vec3) -> Result<Self> {
        let radius = offset.length();
        if !radius.is_finite() || radius <= 1e-6 {
            return Err(ClockError::DegenerateCamera);
        }
        Ok(Self {
            azimuth: offset.z.atan2(offset.x),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
        })
    }

    /// Spherical to cartesian, relative to the target.
    pub fn to_offset(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Vec3::new(
            self.radius * sin_polar * cos_azimuth,
            self.radius * cos_polar,
            self.radius * sin_polar * sin_azimuth,
        )
    }
}

/// Camera transform handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    /// World-to-view transform. A pose with no viewing direction yields the
    /// identity rather than a NaN matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = (self.look_at - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return Mat4::IDENTITY;
        }
        // Looking straight up or down: fall back to +Z as the up hint.
        let up = if forward.cross(Vec3::Y).length_squared() <= 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.look_at, up)
    }
}

#[derive(Debug, Clone)]
pub struct CameraChoreographer {
    config: CameraConfig,
    orbit: OrbitState,
    target: Vec3,
    position: Vec3,
    drag_anchor: Option<Vec2>,
}

impl CameraChoreographer {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            orbit: OrbitState {
                azimuth: config.initial_azimuth,
                polar: config.initial_polar,
                radius: config.initial_radius,
            },
            target: config.initial_target,
            position: config.initial_position,
            drag_anchor: None,
            config,
        }
    }

    pub fn orbit(&self) -> OrbitState {
        self.orbit
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Jumps the orbit to an authored pose. The rendered camera then eases
    /// toward it over the following ticks.
    pub fn retarget(&mut self, position: Vec3, look_at: Vec3) -> Result<()> {
        let orbit = OrbitState::from_offset(position - look_at)?;
        self.target = look_at;
        self.orbit = orbit;
        tracing::debug!(
            azimuth = orbit.azimuth,
            polar = orbit.polar,
            radius = orbit.radius,
            "camera retargeted"
        );
        Ok(())
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.drag_anchor = Some(pointer);
    }

    /// Orbits by the pointer travel since the previous move event.
    pub fn drag_to(&mut self, pointer: Vec2) {
        let Some(last) = self.drag_anchor else {
            return;
        };
        self.orbit_by(pointer - last);
        self.drag_anchor = Some(pointer);
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Applies a pointer travel in pixels to the orbit.
    pub fn orbit_by(&mut self, travel: Vec2) {
        if !travel.is_finite() {
            return;
        }
        let delta = travel * self.config.drag_sensitivity;
        self.orbit.azimuth += delta.x;
        self.orbit.polar = (self.orbit.polar + delta.y)
            .clamp(self.config.min_polar, self.config.max_polar);
    }

    pub fn zoom(&mut self, wheel_delta: f32) {
        if !wheel_delta.is_finite() {
            return;
        }
        self.orbit.radius = (self.orbit.radius + wheel_delta * self.config.zoom_sensitivity)
            .clamp(self.config.min_radius, self.config.max_radius);
    }

    /// Where the camera is heading: the orbit expressed in world space.
    pub fn desired_position(&self) -> Vec3 {
        self.target + self.orbit.to_offset()
    }

    /// One damping step toward the orbit. Runs every frame, paused or not.
    pub fn update(&mut self) {
        self.position = self
            .position
            .lerp(self.desired_position(), self.config.damping);
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            look_at: self.target,
        }
    }
}
