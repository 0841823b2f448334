//! Animation primitives and their time-coefficient math.
//!
//! Every primitive maps a step to a coefficient in `[0, 1]` and folds a
//! partial transform, scaled by that coefficient, onto the shape's running
//! transform.

use euclid::default::{Point2D, Vector2D};
use euclid::Angle;

use super::Transform;

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationKind {
    /// Travel from the shape's center towards an absolute canvas point.
    Move { x: f64, y: f64 },
    /// Rotate by `angle` degrees on top of the shape's base angle.
    Rotate { angle: f64 },
    /// Uniform scale towards `factor`.
    Scale { factor: f64 },
}

impl AnimationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            AnimationKind::Move { .. } => "move",
            AnimationKind::Rotate { .. } => "rotate",
            AnimationKind::Scale { .. } => "scale",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    /// Ticks for one stroke. Always greater than zero.
    pub period: u32,
    /// Cyclic primitives swing forward then back forever; one-shot primitives
    /// settle on their target after `period` ticks.
    pub cyclic: bool,
}

/// How a primitive constrains the document's playable length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingContribution {
    /// Full forward-and-back cycle length.
    Cycle(u64),
    /// Ticks until the primitive holds at its target.
    OneShot(u64),
}

impl Animation {
    pub fn new(kind: AnimationKind, period: u32, cyclic: bool) -> Self {
        debug_assert!(period > 0, "animation period must be positive");
        Animation {
            kind,
            period,
            cyclic,
        }
    }

    pub fn coefficient_at(&self, step: usize) -> f64 {
        let period = self.period.max(1) as usize;
        if self.cyclic {
            let stroke = step / period;
            let r = (step % period) as f64 / period as f64;
            if stroke % 2 == 1 { 1.0 - r } else { r }
        } else {
            (step as f64 / period as f64).clamp(0.0, 1.0)
        }
    }

    pub fn timing(&self) -> TimingContribution {
        let period = u64::from(self.period);
        if self.cyclic {
            TimingContribution::Cycle(period * 2)
        } else {
            TimingContribution::OneShot(period)
        }
    }

    /// Compose this primitive, evaluated at `coefficient`, onto `transform`.
    ///
    /// `center` is the owning shape's anchor; moves are expressed relative
    /// to it.
    pub fn apply(&self, transform: Transform, center: Point2D<f64>, coefficient: f64) -> Transform {
        match self.kind {
            AnimationKind::Move { x, y } => transform.pre_translate(Vector2D::new(
                (x - center.x) * coefficient,
                (y - center.y) * coefficient,
            )),
            AnimationKind::Rotate { angle } => {
                transform.pre_rotate(Angle::degrees(angle * coefficient))
            }
            AnimationKind::Scale { factor } => {
                let k = factor * coefficient;
                transform.pre_scale(k, k)
            }
        }
    }
}
