use std::{fmt, str::FromStr};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    config::SceneConfig,
    math::{ease_in_out_cubic, lerp},
    ClockError,
};

/// Every named part of the movement the core knows how to animate or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentId {
    Barrel,
    CenterWheel,
    ThirdWheel,
    FourthWheel,
    EscapeWheel,
    Anchor,
    Balance,
    MotionWorks,
    Dial,
}

impl ComponentId {
    pub const COUNT: usize = 9;

    pub const ALL: [ComponentId; Self::COUNT] = [
        ComponentId::Barrel,
        ComponentId::CenterWheel,
        ComponentId::ThirdWheel,
        ComponentId::FourthWheel,
        ComponentId::EscapeWheel,
        ComponentId::Anchor,
        ComponentId::Balance,
        ComponentId::MotionWorks,
        ComponentId::Dial,
    ];

    /// Dense index into per-component arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentId::Barrel => "barrel",
            ComponentId::CenterWheel => "center-wheel",
            ComponentId::ThirdWheel => "third-wheel",
            ComponentId::FourthWheel => "fourth-wheel",
            ComponentId::EscapeWheel => "escape-wheel",
            ComponentId::Anchor => "anchor",
            ComponentId::Balance => "balance",
            ComponentId::MotionWorks => "motion-works",
            ComponentId::Dial => "dial",
        }
    }

    pub fn info(self) -> &'static ComponentInfo {
        &CATALOGUE[self.index()]
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentId {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ClockError::UnknownComponent(s.to_string()))
    }
}

/// Static layout data for a component: display names and where it sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub name_cn: &'static str,
    pub name_en: &'static str,
    pub home: Vec3,
    pub label_anchor: Vec3,
}

const fn info(
    id: ComponentId,
    name_cn: &'static str,
    name_en: &'static str,
    home: [f32; 3],
    label_anchor: [f32; 3],
) -> ComponentInfo {
    ComponentInfo {
        id,
        name_cn,
        name_en,
        home: Vec3::new(home[0], home[1], home[2]),
        label_anchor: Vec3::new(label_anchor[0], label_anchor[1], label_anchor[2]),
    }
}

/// Ordered to match [`ComponentId::ALL`].
static CATALOGUE: [ComponentInfo; ComponentId::COUNT] = [
    info(ComponentId::Barrel, "发条盒", "Mainspring Barrel", [-3.2, 0.2, 0.0], [-3.2, 1.6, 0.0]),
    info(ComponentId::CenterWheel, "中心轮", "Center Wheel", [-0.8, 0.2, 0.0], [-0.8, 1.6, 0.0]),
    info(ComponentId::ThirdWheel, "三轮", "Third Wheel", [1.5, 0.15, 0.8], [1.5, 1.6, 0.8]),
    info(ComponentId::FourthWheel, "四轮", "Fourth Wheel", [2.9, 0.1, -0.4], [2.9, 1.4, -0.4]),
    info(ComponentId::EscapeWheel, "擒纵轮", "Escape Wheel", [3.8, 0.1, 1.1], [3.8, 1.3, 1.1]),
    info(ComponentId::Anchor, "擒纵叉", "Pallet Fork", [3.2, 0.2, 1.7], [3.2, 1.4, 1.7]),
    info(ComponentId::Balance, "摆轮游丝", "Balance & Hairspring", [4.1, 0.2, 3.1], [4.1, 1.6, 3.1]),
    info(ComponentId::MotionWorks, "走针机构", "Motion Works", [-0.6, 0.8, 0.0], [-0.6, 2.0, 0.0]),
    info(ComponentId::Dial, "表盘与指针", "Dial & Hands", [0.0, 1.4, 0.0], [0.0, 1.4, 0.0]),
];

pub fn catalogue() -> &'static [ComponentInfo] {
    &CATALOGUE
}

/// Caption the host draws next to a component while labels are shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentLabel {
    pub name_cn: &'static str,
    pub name_en: &'static str,
    /// World-space point the caption is pinned to.
    pub anchor: Vec3,
}

/// How the renderer should shade a component this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Appearance {
    Normal,
    Highlighted,
    Ghosted { opacity: f32 },
}

/// Height and opacity of the glass case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShellPose {
    /// Raw opening progress in `[0, 1]` before easing.
    pub open: f32,
    pub lift: f32,
    pub opacity: f32,
}

/// Presentation toggles and the exploded-view interpolation.
#[derive(Debug, Clone)]
pub struct SceneState {
    config: SceneConfig,
    focus: Vec<ComponentId>,
    xray: bool,
    exploded: bool,
    labels_visible: bool,
    shell_open: f32,
    offsets: [Vec3; ComponentId::COUNT],
}

impl SceneState {
    pub fn new(config: SceneConfig) -> Self {
        let mut offsets = [Vec3::ZERO; ComponentId::COUNT];
        for info in catalogue() {
            offsets[info.id.index()] = info.home;
        }
        Self {
            config,
            focus: Vec::new(),
            xray: false,
            exploded: false,
            labels_visible: false,
            shell_open: 0.0,
            offsets,
        }
    }

    pub fn set_focus(&mut self, focus: &[ComponentId]) {
        self.focus.clear();
        self.focus.extend_from_slice(focus);
    }

    pub fn focus(&self) -> &[ComponentId] {
        &self.focus
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focus.contains(&id)
    }

    pub fn set_xray(&mut self, enabled: bool) {
        self.xray = enabled;
    }

    pub fn toggle_xray(&mut self) -> bool {
        self.xray = !self.xray;
        self.xray
    }

    pub fn xray(&self) -> bool {
        self.xray
    }

    pub fn set_exploded(&mut self, enabled: bool) {
        self.exploded = enabled;
    }

    pub fn toggle_exploded(&mut self) -> bool {
        self.exploded = !self.exploded;
        self.exploded
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        self.labels_visible = visible;
    }

    pub fn toggle_labels(&mut self) -> bool {
        self.labels_visible = !self.labels_visible;
        self.labels_visible
    }

    pub fn labels_visible(&self) -> bool {
        self.labels_visible
    }

    pub fn appearance(&self, id: ComponentId) -> Appearance {
        if self.is_focused(id) {
            Appearance::Highlighted
        } else if self.xray {
            Appearance::Ghosted {
                opacity: self.config.xray_opacity,
            }
        } else {
            Appearance::Normal
        }
    }

    pub fn set_shell_open(&mut self, progress: f32) {
        self.shell_open = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn shell_pose(&self) -> ShellPose {
        let eased = ease_in_out_cubic(self.shell_open);
        ShellPose {
            open: self.shell_open,
            lift: lerp(0.0, self.config.shell_lift, eased),
            opacity: lerp(1.0, 0.0, eased),
        }
    }

    /// Caption for `id`, or `None` while labels are hidden. The anchor moves
    /// with the component when the view is exploded.
    pub fn label(&self, id: ComponentId) -> Option<ComponentLabel> {
        if !self.labels_visible {
            return None;
        }
        let info = id.info();
        Some(ComponentLabel {
            name_cn: info.name_cn,
            name_en: info.name_en,
            anchor: info.label_anchor + (self.position(id) - info.home),
        })
    }

    /// Current rendered position of a component.
    pub fn position(&self, id: ComponentId) -> Vec3 {
        self.offsets[id.index()]
    }

    /// Where the exploded view pushes a component: outward from the origin
    /// along its home direction.
    pub fn exploded_position(&self, id: ComponentId) -> Vec3 {
        let home = id.info().home;
        home + home.normalize_or_zero() * self.config.exploded_distance
    }

    /// Eases every component toward its exploded or home position. Runs on
    /// every frame, paused or not.
    pub fn update(&mut self) {
        for id in ComponentId::ALL {
            let (target, rate) = if self.exploded {
                (self.exploded_position(id), self.config.explode_rate)
            } else {
                (id.info().home, self.config.collapse_rate)
            };
            let slot = &mut self.offsets[id.index()];
            *slot = slot.lerp(target, rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_ids() {
        assert_eq!("center-wheel".parse::<ComponentId>().unwrap(), ComponentId::CenterWheel);
        assert_eq!(ComponentId::MotionWorks.to_string(), "motion-works");
    }

    #[test]
    fn unknown_id_fails_fast() {
        let err = "pendulum".parse::<ComponentId>().unwrap_err();
        assert!(matches!(err, ClockError::UnknownComponent(ref id) if id == "pendulum"));
    }

    #[test]
    fn catalogue_is_indexed_by_id() {
        for id in ComponentId::ALL {
            assert_eq!(id.info().id, id);
        }
    }

    #[test]
    fn serde_uses_string_ids() {
        let json = serde_json::to_string(&ComponentId::EscapeWheel).unwrap();
        assert_eq!(json, "\"escape-wheel\"");
        assert!(serde_json::from_str::<ComponentId>("\"hands\"").is_err());
    }

    #[test]
    fn focus_beats_xray() {
        let mut scene = SceneState::new(SceneConfig::default());
        scene.set_focus(&[ComponentId::Balance]);
        scene.set_xray(true);
        assert_eq!(scene.appearance(ComponentId::Balance), Appearance::Highlighted);
        assert_eq!(
            scene.appearance(ComponentId::Barrel),
            Appearance::Ghosted { opacity: 0.2 }
        );
        scene.set_xray(false);
        assert_eq!(scene.appearance(ComponentId::Barrel), Appearance::Normal);
    }

    #[test]
    fn shell_pose_follows_progress() {
        let mut scene = SceneState::new(SceneConfig::default());
        scene.set_shell_open(0.0);
        assert_eq!(scene.shell_pose().lift, 0.0);
        assert_eq!(scene.shell_pose().opacity, 1.0);
        scene.set_shell_open(1.0);
        assert!((scene.shell_pose().lift - 3.5).abs() < 1e-6);
        assert!(scene.shell_pose().opacity.abs() < 1e-6);
        scene.set_shell_open(4.0);
        assert_eq!(scene.shell_pose().open, 1.0);
    }

    #[test]
    fn exploded_view_converges_and_returns() {
        let mut scene = SceneState::new(SceneConfig::default());
        scene.set_exploded(true);
        for _ in 0..200 {
            scene.update();
        }
        let id = ComponentId::Barrel;
        assert!(scene.position(id).distance(scene.exploded_position(id)) < 1e-3);

        scene.set_exploded(false);
        for _ in 0..200 {
            scene.update();
        }
        assert!(scene.position(id).distance(id.info().home) < 1e-3);
    }

    #[test]
    fn labels_follow_visibility_and_explosion() {
        let mut scene = SceneState::new(SceneConfig::default());
        assert_eq!(scene.label(ComponentId::Balance), None);

        scene.toggle_labels();
        let label = scene.label(ComponentId::Balance).unwrap();
        assert_eq!(label.name_en, "Balance & Hairspring");
        assert_eq!(label.name_cn, "摆轮游丝");
        assert_eq!(label.anchor, ComponentId::Balance.info().label_anchor);

        scene.set_exploded(true);
        for _ in 0..200 {
            scene.update();
        }
        let id = ComponentId::Balance;
        let moved = scene.label(id).unwrap().anchor;
        let expected = id.info().label_anchor + (scene.exploded_position(id) - id.info().home);
        assert!(moved.distance(expected) < 1e-3);
    }
}
