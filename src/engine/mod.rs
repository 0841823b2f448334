//! Engine — the animation interpreter.
//!
//! Turns a `Document` (shapes plus their animations) into `ResolvedScene`s:
//! one transform per shape for a given step, ready for the renderer.
//!
//! The engine understands steps, timing and composition order.
//! It never deals with terminals, cells or colors beyond passing tokens on.

pub mod animation;
pub mod document;
pub mod geometry;
pub mod script;
pub mod shape;

pub use animation::{Animation, AnimationKind};
pub use document::{checked_duration, compute_duration, Document, StepSignal};
pub use script::FormatError;
pub use shape::{Shape, ShapeKind};

use crate::types::ResolvedScene;

/// Affine transform in canvas space, y axis pointing down.
pub type Transform = euclid::default::Transform2D<f64>;

pub struct Engine;

impl Engine {
    /// Resolve every playable step of the document, in order, one scene at a
    /// time as the iterator is driven.
    pub fn compile(
        doc: &Document,
        selected: Option<usize>,
    ) -> impl Iterator<Item = ResolvedScene> + '_ {
        (0..doc.duration()).map(move |step| Self::resolve_step(doc, step, selected))
    }

    /// Resolve all shapes, in document order, at `step`.
    pub fn resolve_step(doc: &Document, step: usize, selected: Option<usize>) -> ResolvedScene {
        let shapes = doc
            .shapes()
            .iter()
            .enumerate()
            .map(|(i, shape)| shape.draw_at(step, selected == Some(i)))
            .collect();

        ResolvedScene {
            width: doc.width(),
            height: doc.height(),
            step,
            shapes,
        }
    }
}
