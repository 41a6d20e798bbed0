//! Tween descriptions for the host's animation layer.
//!
//! Nothing here animates. A plan only says which element moves where, when
//! and how; durations are in seconds, distances in pixels.

use serde::{Deserialize, Serialize};

use crate::types::PlacementOffset;

const DURATION_SHORT: f32 = 0.6;
const DURATION_LONG: f32 = 1.2;
const LINE_ENTRANCE: f32 = 0.8;
const STAGGER: f32 = 0.1;
const LABEL_NUDGE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default = "default_short")]
    pub short: f32,
    #[serde(default = "default_long")]
    pub long: f32,
    #[serde(default = "default_line_entrance")]
    pub line_entrance: f32,
    #[serde(default = "default_stagger")]
    pub stagger: f32,
    /// Extra horizontal shift for every label but the first
    #[serde(default = "default_label_nudge")]
    pub label_nudge: f32,
}

fn default_short() -> f32 {
    DURATION_SHORT
}
fn default_long() -> f32 {
    DURATION_LONG
}
fn default_line_entrance() -> f32 {
    LINE_ENTRANCE
}
fn default_stagger() -> f32 {
    STAGGER
}
fn default_label_nudge() -> f32 {
    LABEL_NUDGE
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            short: DURATION_SHORT,
            long: DURATION_LONG,
            line_entrance: LINE_ENTRANCE,
            stagger: STAGGER,
            label_nudge: LABEL_NUDGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ease {
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "power4.out")]
    Power4Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum Target {
    Line(usize),
    Label(usize),
}

/// Animated properties. Unset ones are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl Pose {
    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn slide(y_percent: f32, opacity: f32) -> Self {
        Self {
            y_percent: Some(y_percent),
            opacity: Some(opacity),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tween {
    pub target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Pose>,
    pub to: Pose,
    pub duration: f32,
    pub delay: f32,
    pub ease: Ease,
}

/// Everything the host plays for one page visit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotionPlan {
    pub entrance: Vec<Tween>,
    pub labels: Vec<Tween>,
    /// Played together when the page is left
    pub exit: Vec<Tween>,
}

impl MotionPlan {
    pub fn new(config: &MotionConfig, line_count: usize, offsets: &[PlacementOffset]) -> Self {
        let entrance = (0..line_count)
            .map(|line| Tween {
                target: Target::Line(line),
                from: Some(Pose::slide(100.0, 0.0)),
                to: Pose::slide(0.0, 1.0),
                duration: config.line_entrance,
                delay: config.short + line as f32 * config.stagger,
                ease: Ease::Power4Out,
            })
            .collect();

        let labels = offsets
            .iter()
            .map(|offset| {
                let nudge = if offset.marker_index == 0 {
                    0.0
                } else {
                    config.label_nudge
                };
                Tween {
                    target: Target::Label(offset.marker_index),
                    from: None,
                    to: Pose::translate(offset.dx + nudge, offset.dy),
                    duration: config.long,
                    delay: offset.marker_index as f32 * config.stagger,
                    ease: Ease::Power2InOut,
                }
            })
            .collect();

        let line_exit = (0..line_count).map(|line| Tween {
            target: Target::Line(line),
            from: None,
            to: Pose::slide(-100.0, 0.0),
            duration: config.short,
            delay: line as f32 * config.stagger,
            ease: Ease::Power4Out,
        });
        let label_exit = offsets.iter().enumerate().map(|(order, offset)| Tween {
            target: Target::Label(offset.marker_index),
            from: None,
            to: Pose::translate(0.0, 0.0),
            duration: config.short,
            delay: order as f32 * config.stagger,
            ease: Ease::Power2InOut,
        });

        Self {
            entrance,
            labels,
            exit: line_exit.chain(label_exit).collect(),
        }
    }

    /// Seconds until the last entrance or label tween settles
    pub fn settle_time(&self) -> f32 {
        self.entrance
            .iter()
            .chain(&self.labels)
            .map(|tween| tween.delay + tween.duration)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets() -> Vec<PlacementOffset> {
        vec![
            PlacementOffset {
                marker_index: 0,
                dx: 10.0,
                dy: -4.0,
            },
            PlacementOffset {
                marker_index: 2,
                dx: 30.0,
                dy: 8.0,
            },
        ]
    }

    #[test]
    fn lines_enter_staggered_after_the_short_delay() {
        let plan = MotionPlan::new(&MotionConfig::default(), 3, &[]);

        assert_eq!(plan.entrance.len(), 3);
        assert_eq!(plan.entrance[0].from, Some(Pose::slide(100.0, 0.0)));
        assert!((plan.entrance[2].delay - 0.8).abs() < 1e-6);
    }

    #[test]
    fn every_label_but_the_first_is_nudged() {
        let plan = MotionPlan::new(&MotionConfig::default(), 1, &offsets());

        assert_eq!(plan.labels[0].to, Pose::translate(10.0, -4.0));
        assert_eq!(plan.labels[1].to, Pose::translate(35.0, 8.0));
        assert_eq!(plan.labels[1].target, Target::Label(2));
        assert!((plan.labels[1].delay - 0.2).abs() < 1e-6);
    }

    #[test]
    fn exit_sends_lines_up_and_labels_home() {
        let plan = MotionPlan::new(&MotionConfig::default(), 2, &offsets());

        assert_eq!(plan.exit.len(), 4);
        assert_eq!(plan.exit[1].to, Pose::slide(-100.0, 0.0));
        assert_eq!(plan.exit[3].to, Pose::translate(0.0, 0.0));
        assert_eq!(plan.exit[3].target, Target::Label(2));
    }

    #[test]
    fn serialises_with_host_property_names() {
        let plan = MotionPlan::new(&MotionConfig::default(), 1, &[]);
        let json = serde_json::to_value(&plan.entrance[0]).unwrap();

        assert_eq!(json["target"]["kind"], "line");
        assert_eq!(json["from"]["yPercent"], 100.0);
        assert_eq!(json["ease"], "power4.out");
        assert!(json["to"].get("x").is_none());
    }
}
