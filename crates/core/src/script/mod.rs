//! The authored tour: an ordered list of narrated segments, each with a
//! camera pose, a duration and the demo parameters for the movement.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{math::smoothstep, scene::ComponentId, ClockError, Result};

/// Narrative content shown alongside a segment. Opaque to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Narrative {
    pub title_cn: String,
    pub title_en: String,
    pub body_cn: String,
    pub body_en: String,
    pub formula: String,
    pub caption_cn: String,
    pub caption_en: String,
}

/// Kinematic parameters applied while a segment is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemoParams {
    pub speed_multiplier: f32,
    /// Escapement releases per second.
    pub escapement_steps: f32,
}

/// What the glass case does during a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellBehavior {
    Closed,
    /// Opens over the course of the segment.
    Opening,
    #[default]
    Open,
}

impl ShellBehavior {
    /// Shell opening for a given intra-segment progress in `[0, 1]`.
    pub fn open_amount(self, segment_progress: f32) -> f32 {
        match self {
            ShellBehavior::Closed => 0.0,
            ShellBehavior::Opening => smoothstep(0.0, 1.0, segment_progress),
            ShellBehavior::Open => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub id: String,
    #[serde(default)]
    pub narrative: Narrative,
    pub focus: Vec<ComponentId>,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    /// Seconds of playback time.
    pub duration: f32,
    pub demo: DemoParams,
    #[serde(default)]
    pub shell: ShellBehavior,
}

impl SegmentDescriptor {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ClockError::InvalidSegment {
            id: self.id.clone(),
            reason,
        };
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(invalid(format!("duration must be positive, got {}", self.duration)));
        }
        if !(self.demo.speed_multiplier.is_finite() && self.demo.speed_multiplier > 0.0) {
            return Err(invalid(format!(
                "speed multiplier must be positive, got {}",
                self.demo.speed_multiplier
            )));
        }
        if !(self.demo.escapement_steps.is_finite() && self.demo.escapement_steps > 0.0) {
            return Err(invalid(format!(
                "escapement steps must be positive, got {}",
                self.demo.escapement_steps
            )));
        }
        if !self.camera_position.is_finite() || !self.camera_target.is_finite() {
            return Err(invalid("camera pose must be finite".into()));
        }
        if self.camera_position.distance_squared(self.camera_target) <= f32::EPSILON {
            return Err(invalid("camera position coincides with its target".into()));
        }
        Ok(())
    }
}

/// Rejects empty timelines and any invalid segment.
pub fn validate_timeline(segments: &[SegmentDescriptor]) -> Result<()> {
    if segments.is_empty() {
        return Err(ClockError::EmptyTimeline);
    }
    segments.iter().try_for_each(SegmentDescriptor::validate)
}

pub fn timeline_from_json_str(json: &str) -> Result<Vec<SegmentDescriptor>> {
    let segments: Vec<SegmentDescriptor> = serde_json::from_str(json)?;
    validate_timeline(&segments)?;
    Ok(segments)
}

pub fn load_timeline(path: impl AsRef<Path>) -> Result<Vec<SegmentDescriptor>> {
    let contents = std::fs::read_to_string(path)?;
    timeline_from_json_str(&contents)
}

/// Every part that takes part in the overview segments.
const WHOLE_MOVEMENT: &[ComponentId] = &[
    ComponentId::Barrel,
    ComponentId::CenterWheel,
    ComponentId::ThirdWheel,
    ComponentId::FourthWheel,
    ComponentId::EscapeWheel,
    ComponentId::Balance,
    ComponentId::MotionWorks,
    ComponentId::Dial,
];

struct Entry {
    id: &'static str,
    title: (&'static str, &'static str),
    body: (&'static str, &'static str),
    formula: &'static str,
    caption: (&'static str, &'static str),
    focus: &'static [ComponentId],
    camera: ([f32; 3], [f32; 3]),
    duration: f32,
    demo: (f32, f32),
    shell: ShellBehavior,
}

const TOUR: &[Entry] = &[
    Entry {
        id: "intro",
        title: ("开场：发条驱动机械钟概览", "Intro: Spring-Driven Mechanical Clock"),
        body: (
            "这台桌面机械钟以发条储能，通过轮系、擒纵与摆轮游丝释放能量，最终驱动指针走时。",
            "This desk clock stores energy in a mainspring, sends it through the gear train, regulates it with the escapement and balance, and finally drives the hands.",
        ),
        formula: r"\omega_{out} = \omega_{in} \prod \frac{Z_{driver}}{Z_{driven}}",
        caption: ("齿轮链条决定角速度传递。", "The gear train sets the angular speed ratio."),
        focus: WHOLE_MOVEMENT,
        camera: ([10.0, 7.0, 12.0], [0.0, 0.8, 0.0]),
        duration: 8.0,
        demo: (0.6, 2.0),
        shell: ShellBehavior::Closed,
    },
    Entry {
        id: "shell",
        title: ("外壳移除", "Case Opening"),
        body: (
            "玻璃罩上升，露出机芯框架，便于观察内部的传动链路。",
            "The glass cover lifts to reveal the movement frame for inspection.",
        ),
        formula: r"\Delta h = h_{open} - h_{close}",
        caption: ("外壳上升距离控制视线。", "The cover translates upward for a clear view."),
        focus: &[
            ComponentId::Barrel,
            ComponentId::CenterWheel,
            ComponentId::ThirdWheel,
            ComponentId::FourthWheel,
        ],
        camera: ([7.0, 6.0, 9.0], [0.0, 0.8, 0.0]),
        duration: 6.0,
        demo: (0.6, 2.0),
        shell: ShellBehavior::Opening,
    },
    Entry {
        id: "mainspring",
        title: ("发条储能", "Mainspring Energy Storage"),
        body: (
            "发条在条盒内卷紧，释放扭矩驱动中心轮。",
            "The mainspring coils in the barrel and releases torque to the center wheel.",
        ),
        formula: r"\tau_{out} = \tau_{in} \cdot \eta",
        caption: ("理想情况下扭矩经效率系数传递。", "Torque is transferred with efficiency."),
        focus: &[ComponentId::Barrel],
        camera: ([4.0, 4.0, 8.0], [-3.2, 0.2, 0.0]),
        duration: 8.0,
        demo: (1.0, 2.0),
        shell: ShellBehavior::Open,
    },
    Entry {
        id: "gear-train",
        title: ("轮系传动", "Gear Train Transmission"),
        body: (
            "中心轮、三轮、四轮交替啮合，方向反转并提升转速，为擒纵轮提供能量。",
            "The center, third, and fourth wheels mesh alternately, reversing direction and increasing speed to feed the escape wheel.",
        ),
        formula: r"\frac{\omega_2}{\omega_1} = -\frac{Z_1}{Z_2}",
        caption: ("齿轮啮合导致方向反转与速比变化。", "Meshed gears reverse direction and change speed."),
        focus: &[
            ComponentId::CenterWheel,
            ComponentId::ThirdWheel,
            ComponentId::FourthWheel,
        ],
        camera: ([6.0, 4.5, 5.5], [1.2, 0.4, 0.4]),
        duration: 10.0,
        demo: (1.3, 3.0),
        shell: ShellBehavior::Open,
    },
    Entry {
        id: "escapement",
        title: ("擒纵机构", "Escapement"),
        body: (
            "擒纵轮被擒纵叉间歇释放，每一次释放都推动摆轮游丝振荡。",
            "The escape wheel releases in steps, each tick impulses the balance spring.",
        ),
        formula: r"\Delta t = \frac{1}{f_{esc}}",
        caption: ("擒纵的节拍决定释放间隔。", "The escapement beat defines the interval."),
        focus: &[ComponentId::EscapeWheel, ComponentId::Anchor],
        camera: ([5.5, 3.5, 6.5], [3.4, 0.2, 1.3]),
        duration: 10.0,
        demo: (1.2, 5.0),
        shell: ShellBehavior::Open,
    },
    Entry {
        id: "balance",
        title: ("摆轮游丝振荡", "Balance & Hairspring Oscillation"),
        body: (
            "摆轮游丝构成振子，周期决定走时基准，与擒纵节拍锁定。",
            "The balance and hairspring form an oscillator whose period regulates timekeeping.",
        ),
        formula: r"T = 2\pi\sqrt{\frac{I}{k}}",
        caption: ("振荡周期由转动惯量与游丝刚度决定。", "Period depends on inertia and spring stiffness."),
        focus: &[ComponentId::Balance],
        camera: ([6.2, 4.2, 10.5], [4.1, 0.2, 3.1]),
        duration: 10.0,
        demo: (0.9, 6.0),
        shell: ShellBehavior::Open,
    },
    Entry {
        id: "motion-works",
        title: ("走针机构", "Motion Works"),
        body: (
            "轮系的输出经走针机构减速，确保分针与时针有正确的速比。",
            "The motion works reduce speed so the minute and hour hands keep correct ratios.",
        ),
        formula: r"\omega_{hour} = \frac{1}{12} \omega_{minute}",
        caption: ("时针速度为分针的 1/12。", "Hour hand speed is 1/12 of the minute hand."),
        focus: &[ComponentId::MotionWorks],
        camera: ([4.5, 3.8, 7.2], [-0.6, 0.9, 0.0]),
        duration: 8.0,
        demo: (0.8, 3.0),
        shell: ShellBehavior::Open,
    },
    Entry {
        id: "dial",
        title: ("表盘呈现", "Dial & Hands"),
        body: (
            "最终通过表盘与指针展示时间，秒针（若存在）直接来自四轮输出。",
            "The dial and hands show the time, with the seconds driven by the fourth wheel.",
        ),
        formula: r"\omega_{second} = 60\,\omega_{minute}",
        caption: ("秒针与分针的速度关系。", "Seconds hand moves 60x the minute hand."),
        focus: &[ComponentId::Dial],
        camera: ([3.5, 4.5, 5.5], [0.0, 1.3, 0.0]),
        duration: 8.0,
        demo: (0.9, 2.0),
        shell: ShellBehavior::Open,
    },
    Entry {
        id: "summary",
        title: ("总结链路", "Summary"),
        body: (
            "能量储存 → 轮系传递 → 擒纵调速 → 指针显示，形成完整走时链路。",
            "Energy storage → gear transmission → escapement regulation → hand display completes the chain.",
        ),
        formula: r"\text{Chain: } E \rightarrow \tau \rightarrow \omega \rightarrow \theta",
        caption: ("能量、扭矩、角速度与角位移相互关联。", "Energy, torque, angular speed, and displacement connect."),
        focus: WHOLE_MOVEMENT,
        camera: ([10.0, 7.0, 12.0], [0.0, 0.8, 0.0]),
        duration: 8.0,
        demo: (0.6, 2.0),
        shell: ShellBehavior::Open,
    },
];

impl Entry {
    fn build(&self) -> SegmentDescriptor {
        SegmentDescriptor {
            id: self.id.to_string(),
            narrative: Narrative {
                title_cn: self.title.0.to_string(),
                title_en: self.title.1.to_string(),
                body_cn: self.body.0.to_string(),
                body_en: self.body.1.to_string(),
                formula: self.formula.to_string(),
                caption_cn: self.caption.0.to_string(),
                caption_en: self.caption.1.to_string(),
            },
            focus: self.focus.to_vec(),
            camera_position: Vec3::from_array(self.camera.0),
            camera_target: Vec3::from_array(self.camera.1),
            duration: self.duration,
            demo: DemoParams {
                speed_multiplier: self.demo.0,
                escapement_steps: self.demo.1,
            },
            shell: self.shell,
        }
    }
}

/// The built-in nine segment tour of the movement.
pub fn default_segments() -> Vec<SegmentDescriptor> {
    TOUR.iter().map(Entry::build).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tour_is_valid() {
        let segments = default_segments();
        validate_timeline(&segments).unwrap();
        assert_eq!(segments.len(), 9);
        assert_eq!(segments[0].shell, ShellBehavior::Closed);
        assert_eq!(segments[1].shell, ShellBehavior::Opening);
        let total: f32 = segments.iter().map(|s| s.duration).sum();
        assert_eq!(total, 76.0);
    }

    #[test]
    fn empty_timeline_is_rejected() {
        assert!(matches!(validate_timeline(&[]), Err(ClockError::EmptyTimeline)));
    }

    #[test]
    fn degenerate_camera_is_rejected() {
        let mut segment = default_segments().remove(2);
        segment.camera_position = segment.camera_target;
        let err = segment.validate().unwrap_err();
        assert!(format!("{err}").contains("mainspring"));
    }

    #[test]
    fn loads_json_timeline_with_defaults() {
        let json = r#"[{
            "id": "only",
            "focus": ["balance", "anchor"],
            "camera_position": [1.0, 2.0, 3.0],
            "camera_target": [0.0, 0.0, 0.0],
            "duration": 4.0,
            "demo": { "speed_multiplier": 1.0, "escapement_steps": 5.0 }
        }]"#;
        let segments = timeline_from_json_str(json).unwrap();
        assert_eq!(segments[0].focus, vec![ComponentId::Balance, ComponentId::Anchor]);
        assert_eq!(segments[0].shell, ShellBehavior::Open);
        assert!(segments[0].narrative.title_en.is_empty());
    }

    #[test]
    fn unknown_focus_id_fails_to_load() {
        let json = r#"[{
            "id": "bad",
            "focus": ["pendulum"],
            "camera_position": [1.0, 2.0, 3.0],
            "camera_target": [0.0, 0.0, 0.0],
            "duration": 4.0,
            "demo": { "speed_multiplier": 1.0, "escapement_steps": 5.0 }
        }]"#;
        assert!(matches!(timeline_from_json_str(json), Err(ClockError::Json(_))));
    }

    #[test]
    fn opening_shell_uses_smoothstep() {
        assert_eq!(ShellBehavior::Closed.open_amount(0.7), 0.0);
        assert_eq!(ShellBehavior::Open.open_amount(0.1), 1.0);
        let half = ShellBehavior::Opening.open_amount(0.5);
        assert!((half - 0.5).abs() < 1e-6);
        assert!(ShellBehavior::Opening.open_amount(0.25) < 0.25);
    }
}
