//! One viewing session: the timeline, the movement, the camera and the
//! presentation toggles, advanced together once per frame.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::{
    camera::{CameraChoreographer, CameraPose},
    config::ClockConfig,
    kinematics::KinematicAnimator,
    math::sanitize_delta,
    scene::{Appearance, ComponentId, ComponentLabel, SceneState, ShellPose},
    script::{default_segments, SegmentDescriptor},
    timeline::{Progress, SegmentSequencer, SequencerEvent},
    ClockError, Result,
};

/// Per-component state handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentFrame {
    pub id: ComponentId,
    /// Euler angles in radians.
    pub rotation: Vec3,
    pub position: Vec3,
    pub appearance: Appearance,
    /// Present only while labels are shown.
    pub label: Option<ComponentLabel>,
}

/// Everything a renderer or UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub segment_id: String,
    pub progress: Progress,
    pub playing: bool,
    pub speed: f32,
    pub sim_time: f64,
    pub camera: CameraPose,
    pub shell: ShellPose,
    pub xray: bool,
    pub exploded: bool,
    pub labels_visible: bool,
    pub components: Vec<ComponentFrame>,
}

#[derive(Debug, Clone)]
pub struct ClockSession {
    config: ClockConfig,
    sequencer: SegmentSequencer,
    animator: KinematicAnimator,
    camera: CameraChoreographer,
    scene: SceneState,
}

impl ClockSession {
    /// Validates the configuration and timeline and frames the first segment.
    pub fn new(config: ClockConfig, segments: Vec<SegmentDescriptor>) -> Result<Self> {
        config.validate()?;
        let sequencer = SegmentSequencer::new(segments, config.playback.default_speed)?;
        let animator = KinematicAnimator::new(&config.gears, &config.kinematics)?;
        let camera = CameraChoreographer::new(config.camera.clone());
        let scene = SceneState::new(config.scene.clone());

        let mut session = Self {
            config,
            sequencer,
            animator,
            camera,
            scene,
        };
        session.apply_segment();
        tracing::info!(
            segments = session.sequencer.len(),
            duration = session.sequencer.total_duration(),
            "clock session started"
        );
        Ok(session)
    }

    /// Session over the built-in tour with default settings.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClockConfig::default(), default_segments())
    }

    /// Advances one frame by `delta` wall-clock seconds.
    pub fn tick(&mut self, delta: f32) -> FrameSnapshot {
        let delta = sanitize_delta(delta);

        if let Some(SequencerEvent::Entered(_)) = self.sequencer.advance(delta) {
            self.apply_segment();
        }

        let segment = self.sequencer.current();
        let shell_open = segment.shell.open_amount(self.sequencer.segment_progress());
        self.scene.set_shell_open(shell_open);

        if self.sequencer.is_playing() || self.config.kinematics.animate_while_paused {
            self.animator
                .update(delta, segment, self.sequencer.speed());
        }

        self.camera.update();
        self.scene.update();
        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let rotations = self.animator.rotations();
        let components = ComponentId::ALL
            .into_iter()
            .map(|id| ComponentFrame {
                id,
                rotation: rotations.get(id),
                position: self.scene.position(id),
                appearance: self.scene.appearance(id),
                label: self.scene.label(id),
            })
            .collect();

        FrameSnapshot {
            segment_id: self.sequencer.current().id.clone(),
            progress: self.sequencer.progress(),
            playing: self.sequencer.is_playing(),
            speed: self.sequencer.speed(),
            sim_time: self.animator.sim_time(),
            camera: self.camera.pose(),
            shell: self.scene.shell_pose(),
            xray: self.scene.xray(),
            exploded: self.scene.exploded(),
            labels_visible: self.scene.labels_visible(),
            components,
        }
    }

    fn apply_segment(&mut self) {
        let segment = self.sequencer.current();
        if let Err(err) = self
            .camera
            .retarget(segment.camera_position, segment.camera_target)
        {
            // Timelines are validated up front, so this only fires on a logic error.
            tracing::warn!(id = %segment.id, %err, "keeping previous camera orbit");
        }
        self.scene.set_focus(&segment.focus);
    }

    pub fn play(&mut self) {
        self.sequencer.set_playing(true);
    }

    pub fn pause(&mut self) {
        self.sequencer.set_playing(false);
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.sequencer.set_playing(playing);
    }

    pub fn toggle_play(&mut self) -> bool {
        self.sequencer.toggle_playing()
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    pub fn next_segment(&mut self) -> usize {
        let index = self.sequencer.next();
        self.apply_segment();
        index
    }

    pub fn previous_segment(&mut self) -> usize {
        let index = self.sequencer.previous();
        self.apply_segment();
        index
    }

    /// Jumps to a segment, clamped into range, and frames it immediately.
    pub fn jump_to(&mut self, index: usize) -> usize {
        let index = self.sequencer.jump_to(index);
        self.apply_segment();
        index
    }

    pub fn reset(&mut self) {
        self.sequencer.reset();
        self.apply_segment();
        tracing::info!("session reset");
    }

    /// Changes playback speed to one of the configured options.
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !self.config.playback.allows(speed) {
            tracing::warn!(speed, "rejected playback speed");
            return Err(ClockError::UnsupportedSpeed(speed));
        }
        self.sequencer.set_speed(speed)?;
        tracing::debug!(speed, "playback speed changed");
        Ok(())
    }

    /// Jumps to the first segment that features `id`, if any.
    pub fn select_component(&mut self, id: ComponentId) -> Option<usize> {
        let index = self.sequencer.find_focus(id)?;
        Some(self.jump_to(index))
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.camera.begin_drag(Vec2::new(x, y));
    }

    pub fn drag_to(&mut self, x: f32, y: f32) {
        self.camera.drag_to(Vec2::new(x, y));
    }

    pub fn end_drag(&mut self) {
        self.camera.end_drag();
    }

    pub fn zoom(&mut self, wheel_delta: f32) {
        self.camera.zoom(wheel_delta);
    }

    pub fn set_xray(&mut self, enabled: bool) {
        self.scene.set_xray(enabled);
    }

    pub fn toggle_xray(&mut self) -> bool {
        self.scene.toggle_xray()
    }

    pub fn set_exploded(&mut self, enabled: bool) {
        self.scene.set_exploded(enabled);
    }

    pub fn toggle_exploded(&mut self) -> bool {
        self.scene.toggle_exploded()
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        self.scene.set_labels_visible(visible);
    }

    pub fn toggle_labels(&mut self) -> bool {
        self.scene.toggle_labels()
    }

    pub fn progress(&self) -> Progress {
        self.sequencer.progress()
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &SegmentSequencer {
        &self.sequencer
    }

    pub fn animator(&self) -> &KinematicAnimator {
        &self.animator
    }

    pub fn camera(&self) -> &CameraChoreographer {
        &self.camera
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ShellBehavior;

    fn session() -> ClockSession {
        ClockSession::with_defaults().unwrap()
    }

    #[test]
    fn starts_framed_on_the_intro() {
        let session = session();
        let intro = &session.sequencer().segments()[0];
        assert_eq!(session.camera().target(), intro.camera_target);
        let desired = session.camera().desired_position();
        assert!(desired.distance(intro.camera_position) < 1e-4);
        assert_eq!(session.scene().focus(), intro.focus.as_slice());
        assert!(!session.is_playing());
    }

    #[test]
    fn invalid_config_refuses_to_start() {
        let mut config = ClockConfig::default();
        config.gears.escape_wheel.teeth = 0;
        assert!(matches!(
            ClockSession::new(config, default_segments()),
            Err(ClockError::InvalidGear { .. })
        ));
        assert!(matches!(
            ClockSession::new(ClockConfig::default(), Vec::new()),
            Err(ClockError::EmptyTimeline)
        ));
    }

    #[test]
    fn segment_change_retargets_camera() {
        let mut session = session();
        session.play();
        for _ in 0..16 {
            session.tick(0.5);
        }
        let shell = &session.sequencer().segments()[1];
        assert_eq!(session.sequencer().current_index(), 1);
        assert_eq!(session.camera().target(), shell.camera_target);
        assert_eq!(session.scene().focus(), shell.focus.as_slice());
    }

    #[test]
    fn shell_follows_segment_behaviour() {
        let mut session = session();
        assert_eq!(session.tick(0.1).shell.open, 0.0);

        session.jump_to(1);
        assert_eq!(session.sequencer().current().shell, ShellBehavior::Opening);
        session.play();
        let halfway = session.tick(3.0);
        assert!((halfway.shell.open - 0.5).abs() < 1e-6);

        session.jump_to(4);
        assert_eq!(session.tick(0.1).shell.open, 1.0);
    }

    #[test]
    fn runs_to_the_end_and_stops() {
        let mut session = session();
        session.set_speed(2.0).unwrap();
        session.play();
        let mut frames = 0;
        while session.is_playing() {
            session.tick(0.25);
            frames += 1;
            assert!(frames < 10_000);
        }
        let last = session.snapshot();
        assert_eq!(last.segment_id, "summary");
        assert_eq!(last.progress.index, last.progress.count - 1);
        assert!((last.progress.overall - 1.0).abs() < 1e-6);
        assert!(last
            .components
            .iter()
            .all(|c| c.rotation.is_finite() && c.position.is_finite()));
        assert!(last.camera.position.is_finite());
    }

    #[test]
    fn rejects_speeds_outside_the_options() {
        let mut session = session();
        assert!(matches!(
            session.set_speed(3.0),
            Err(ClockError::UnsupportedSpeed(_))
        ));
        assert_eq!(session.sequencer().speed(), 1.0);
        session.set_speed(0.5).unwrap();
        assert_eq!(session.snapshot().speed, 0.5);
    }

    #[test]
    fn selecting_a_component_jumps_to_its_segment() {
        let mut session = session();
        assert_eq!(session.select_component(ComponentId::Anchor), Some(4));
        assert_eq!(session.sequencer().current().id, "escapement");
        assert_eq!(session.select_component(ComponentId::Barrel), Some(0));
    }

    #[test]
    fn reset_rewinds_and_reframes() {
        let mut session = session();
        session.play();
        session.jump_to(5);
        session.tick(1.0);
        session.reset();
        session.reset();
        let clock = session.sequencer().clock();
        assert_eq!(clock.segment_index, 0);
        assert_eq!(clock.segment_elapsed, 0.0);
        assert_eq!(clock.total_elapsed, 0.0);
        assert!(!clock.playing);
        assert_eq!(
            session.camera().target(),
            session.sequencer().segments()[0].camera_target
        );
    }

    #[test]
    fn paused_movement_respects_config() {
        let mut session = session();
        session.tick(0.5);
        assert!(session.animator().sim_time() > 0.0);

        let mut config = ClockConfig::default();
        config.kinematics.animate_while_paused = false;
        let mut frozen = ClockSession::new(config, default_segments()).unwrap();
        frozen.tick(0.5);
        assert_eq!(frozen.animator().sim_time(), 0.0);
    }

    #[test]
    fn camera_keeps_easing_while_paused() {
        let mut session = session();
        let before = session.camera().pose().position;
        session.tick(0.016);
        assert_ne!(session.camera().pose().position, before);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut session = session();
        session.play();
        session.tick(f32::NAN);
        session.tick(-1.0);
        assert_eq!(session.sequencer().clock().total_elapsed, 0.0);
    }

    #[test]
    fn snapshot_serialises() {
        let mut session = session();
        session.toggle_xray();
        let json = serde_json::to_value(session.tick(0.016)).unwrap();
        assert_eq!(json["segment_id"], "intro");
        assert_eq!(json["components"].as_array().unwrap().len(), ComponentId::COUNT);
        assert_eq!(json["components"][5]["appearance"]["mode"], "ghosted");
    }

    #[test]
    fn set_playing_drives_the_transport() {
        let mut session = session();
        session.set_playing(true);
        assert!(session.is_playing());
        assert!(session.tick(0.5).playing);
        session.set_playing(false);
        let paused = session.tick(0.5);
        assert!(!paused.playing);
        assert_eq!(session.sequencer().clock().total_elapsed, 0.5);
        assert!(session.toggle_play());
    }

    #[test]
    fn labels_are_attached_only_when_shown() {
        let mut session = session();
        assert!(session.tick(0.016).components.iter().all(|c| c.label.is_none()));

        session.toggle_labels();
        let frame = session.tick(0.016);
        assert!(frame.labels_visible);
        let escape = &frame.components[ComponentId::EscapeWheel.index()];
        let label = escape.label.unwrap();
        assert_eq!(label.name_en, "Escape Wheel");
        assert_eq!(label.anchor, ComponentId::EscapeWheel.info().label_anchor);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["components"][4]["label"]["name_en"], "Escape Wheel");
        assert!(json["components"][4]["label"]["anchor"].is_array());
    }
}
