//! Core library for the narrated mechanical clock explainer.
//!
//! The crate owns everything that changes from frame to frame: the segment
//! timeline, the kinematic model of the going train and escapement, the
//! orbit camera and the presentation toggles. Geometry, materials and the
//! UI are left to the host, which reads a [`FrameSnapshot`] every frame.

pub mod camera;
pub mod config;
pub mod error;
pub mod escapement;
pub mod gears;
pub mod kinematics;
pub mod math;
pub mod record;
pub mod scene;
pub mod script;
pub mod session;
pub mod timeline;

pub use camera::{CameraChoreographer, CameraPose, OrbitState};
pub use config::{
    CameraConfig, ClockConfig, GearTrainConfig, KinematicsConfig, PlaybackConfig, SceneConfig,
};
pub use error::{ClockError, Result};
pub use escapement::{EscapementPose, EscapementStepper};
pub use gears::{propagate, GearChainLink, GearSpec, GoingTrain, TrainSpeeds};
pub use kinematics::{ComponentRotations, KinematicAnimator, PartRotation};
pub use record::{Recorder, RecordingSettings};
pub use scene::{Appearance, ComponentId, ComponentInfo, ComponentLabel, SceneState, ShellPose};
pub use script::{default_segments, DemoParams, Narrative, SegmentDescriptor, ShellBehavior};
pub use session::{ClockSession, ComponentFrame, FrameSnapshot};
pub use timeline::{PlaybackClock, Progress, SegmentSequencer, SequencerEvent};
