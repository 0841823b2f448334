use euclid::default::Point2D;
use euclid::Angle;

use crate::types::{ColorToken, ShapeDraw};

use super::animation::Animation;
use super::geometry::Outline;
use super::Transform;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rectangle { width: f64, height: f64, angle: f64 },
    /// Rotation-invariant, so it carries no base angle.
    Circle { radius: f64 },
    Triangle { radius: f64, angle: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub center: Point2D<f64>,
    pub color: ColorToken,
    pub animations: Vec<Animation>,
}

impl Shape {
    pub fn new(kind: ShapeKind, center: Point2D<f64>, color: ColorToken) -> Self {
        Shape {
            kind,
            center,
            color,
            animations: Vec::new(),
        }
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animations.push(animation);
        self
    }

    pub fn keyword(&self) -> &'static str {
        match self.kind {
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Triangle { .. } => "triangle",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Rectangle { .. } => "Rectangle",
            ShapeKind::Circle { .. } => "Circle",
            ShapeKind::Triangle { .. } => "Triangle",
        }
    }

    /// Static orientation in degrees; always zero for circles.
    pub fn base_angle(&self) -> f64 {
        match self.kind {
            ShapeKind::Rectangle { angle, .. } | ShapeKind::Triangle { angle, .. } => angle,
            ShapeKind::Circle { .. } => 0.0,
        }
    }

    pub fn outline(&self) -> Outline {
        match self.kind {
            ShapeKind::Rectangle { width, height, .. } => Outline::rect(width, height),
            ShapeKind::Circle { radius } => Outline::disk(radius),
            ShapeKind::Triangle { radius, .. } => Outline::triangle(radius),
        }
    }

    /// World transform at `step`: translate to the center, turn by the base
    /// angle, then fold in every animation in declared order.
    pub fn pose_at(&self, step: usize) -> Transform {
        let start = Transform::translation(self.center.x, self.center.y)
            .pre_rotate(Angle::degrees(self.base_angle()));

        self.animations.iter().fold(start, |transform, animation| {
            animation.apply(transform, self.center, animation.coefficient_at(step))
        })
    }

    pub fn draw_at(&self, step: usize, selected: bool) -> ShapeDraw {
        ShapeDraw {
            outline: self.outline(),
            transform: self.pose_at(step),
            fill: self.color.clone(),
            stroke: self.color.clone(),
            selected,
        }
    }
}
