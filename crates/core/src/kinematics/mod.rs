use std::f32::consts::TAU;

use glam::Vec3;
use serde::Serialize;

use crate::{
    config::{GearTrainConfig, KinematicsConfig},
    escapement::{EscapementPose, EscapementStepper},
    gears::{GoingTrain, TrainSpeeds},
    scene::ComponentId,
    script::SegmentDescriptor,
    Result,
};

/// Euler rotation (radians) of every component, indexed by [`ComponentId`].
///
/// Written only by [`KinematicAnimator`]; renderers read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRotations {
    angles: [Vec3; ComponentId::COUNT],
}

impl ComponentRotations {
    pub fn get(&self, id: ComponentId) -> Vec3 {
        self.angles[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = PartRotation> + '_ {
        ComponentId::ALL.into_iter().map(|id| PartRotation {
            id,
            rotation: self.get(id),
        })
    }

    fn slot(&mut self, id: ComponentId) -> &mut Vec3 {
        &mut self.angles[id.index()]
    }

    /// Accumulates a spin about the vertical axis, kept within one turn.
    fn spin_y(&mut self, id: ComponentId, angle: f32) {
        let slot = self.slot(id);
        slot.y = (slot.y + angle).rem_euclid(TAU);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartRotation {
    pub id: ComponentId,
    pub rotation: Vec3,
}

/// Drives the movement from the active segment's demo parameters.
#[derive(Debug, Clone)]
pub struct KinematicAnimator {
    train: GoingTrain,
    escapement: EscapementStepper,
    base_speed: f32,
    motion_works_ratio: f32,
    sim_time: f64,
    last_speeds: TrainSpeeds,
    last_escapement: EscapementPose,
    rotations: ComponentRotations,
}

impl KinematicAnimator {
    pub fn new(gears: &GearTrainConfig, kinematics: &KinematicsConfig) -> Result<Self> {
        Ok(Self {
            train: GoingTrain::from_config(gears)?,
            escapement: EscapementStepper::from_config(kinematics),
            base_speed: kinematics.base_speed,
            motion_works_ratio: kinematics.motion_works_ratio,
            sim_time: 0.0,
            last_speeds: TrainSpeeds::default(),
            last_escapement: EscapementPose::default(),
            rotations: ComponentRotations::default(),
        })
    }

    /// Advances the movement by one frame.
    ///
    /// The four going-train wheels and the motion works integrate their
    /// angle, so this must run exactly once per frame. The escapement is
    /// derived from the accumulated simulated time instead.
    pub fn update(&mut self, delta: f32, segment: &SegmentDescriptor, playback_speed: f32) {
        self.sim_time += f64::from(delta) * f64::from(playback_speed);

        let barrel_speed = self.base_speed * segment.demo.speed_multiplier;
        let speeds = self.train.speeds(barrel_speed);

        self.rotations.spin_y(ComponentId::Barrel, speeds.barrel * delta);
        self.rotations.spin_y(ComponentId::CenterWheel, speeds.center * delta);
        self.rotations.spin_y(ComponentId::ThirdWheel, speeds.third * delta);
        self.rotations.spin_y(ComponentId::FourthWheel, speeds.fourth * delta);

        let pose = self
            .escapement
            .pose(self.sim_time, segment.demo.escapement_steps);
        self.rotations.slot(ComponentId::EscapeWheel).y = pose.escape_angle;
        self.rotations.slot(ComponentId::Anchor).z = pose.anchor_angle;
        self.rotations.slot(ComponentId::Balance).y = pose.balance_angle;

        let motion_works_speed = barrel_speed * self.motion_works_ratio;
        self.rotations
            .spin_y(ComponentId::MotionWorks, motion_works_speed * delta);

        self.last_speeds = speeds;
        self.last_escapement = pose;
    }

    pub fn rotations(&self) -> &ComponentRotations {
        &self.rotations
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Train speeds used by the most recent update.
    pub fn speeds(&self) -> TrainSpeeds {
        self.last_speeds
    }

    pub fn escapement(&self) -> EscapementPose {
        self.last_escapement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::default_segments;

    fn animator() -> KinematicAnimator {
        KinematicAnimator::new(&GearTrainConfig::default(), &KinematicsConfig::default()).unwrap()
    }

    #[test]
    fn sim_time_scales_with_playback_speed() {
        let segments = default_segments();
        let segment = &segments[0];
        let mut anim = animator();
        anim.update(0.5, segment, 2.0);
        anim.update(0.25, segment, 0.5);
        assert!((anim.sim_time() - 1.125).abs() < 1e-6);
    }

    #[test]
    fn wheels_integrate_train_speeds() {
        let segments = default_segments();
        let segment = &segments[2];
        let mut anim = animator();
        anim.update(0.1, segment, 1.0);

        let speeds = anim.speeds();
        assert!((speeds.barrel - 0.4).abs() < 1e-6);
        let barrel = anim.rotations().get(ComponentId::Barrel).y;
        assert!((barrel - 0.04).abs() < 1e-6);
        // The center wheel runs backwards, so its wrapped angle sits just below a full turn.
        let center = anim.rotations().get(ComponentId::CenterWheel).y;
        assert!((center - (TAU + speeds.center * 0.1)).abs() < 1e-5);
        let motion = anim.rotations().get(ComponentId::MotionWorks).y;
        assert!((motion - 0.4 * 0.18 * 0.1).abs() < 1e-6);
    }

    #[test]
    fn escapement_follows_segment_rate() {
        let segments = default_segments();
        let segment = &segments[4];
        let mut anim = animator();
        for _ in 0..4 {
            anim.update(0.25, segment, 1.0);
        }
        // One second at five releases per second.
        assert_eq!(anim.escapement().step_index, 5);
        let escape = anim.rotations().get(ComponentId::EscapeWheel).y;
        assert!((escape - 5.0 * std::f32::consts::PI / 6.0).abs() < 1e-5);
        let anchor = anim.rotations().get(ComponentId::Anchor);
        assert!((anchor.z - (5.0f32 * 0.5).sin() * 0.4).abs() < 1e-5);
        assert_eq!(anchor.y, 0.0);
    }

    #[test]
    fn zero_delta_leaves_wheels_in_place() {
        let segments = default_segments();
        let segment = &segments[3];
        let mut anim = animator();
        anim.update(0.2, segment, 1.0);
        let before = anim.rotations().clone();
        anim.update(0.0, segment, 1.0);
        assert_eq!(anim.rotations(), &before);
    }

    #[test]
    fn dial_is_static() {
        let segments = default_segments();
        let segment = &segments[7];
        let mut anim = animator();
        anim.update(1.0, segment, 1.0);
        assert_eq!(anim.rotations().get(ComponentId::Dial), Vec3::ZERO);
        let parts: Vec<_> = anim.rotations().iter().collect();
        assert_eq!(parts.len(), ComponentId::COUNT);
        assert_eq!(parts[8].id, ComponentId::Dial);
    }

    #[test]
    fn sim_time_keeps_frame_resolution_after_a_week() {
        let segments = default_segments();
        let segment = &segments[4];
        let mut anim = animator();
        anim.sim_time = 7.0 * 24.0 * 3600.0;
        anim.update(0.0, segment, 1.0);
        let start = anim.escapement();

        for _ in 0..600 {
            anim.update(1.0 / 60.0, segment, 1.0);
        }
        assert!((anim.sim_time() - (604_800.0 + 10.0)).abs() < 1e-4);
        // Ten seconds at five releases per second.
        let released = anim.escapement().step_index - start.step_index;
        assert!((49..=51).contains(&released), "{released}");
        assert_ne!(anim.escapement().anchor_angle, start.anchor_angle);
    }
}
