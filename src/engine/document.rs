//! The loaded scene: canvas extents, shapes, and the playback position.

use tracing::{debug, warn};

use super::animation::TimingContribution;
use super::script::{self, FormatError};
use super::shape::Shape;
use super::Transform;

/// What the playback driver should do after a step change.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSignal {
    Continue,
    /// The requested step ran past the end; auto-advance should halt.
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    width: u32,
    height: u32,
    shapes: Vec<Shape>,
    step: usize,
    duration: usize,
}

impl Document {
    /// An empty canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_shapes(width, height, Vec::new())
    }

    pub fn from_shapes(width: u32, height: u32, shapes: Vec<Shape>) -> Self {
        let duration = compute_duration(&shapes);
        Document {
            width,
            height,
            shapes,
            step: 0,
            duration,
        }
    }

    /// Parse a script into a fresh document.
    ///
    /// A failed load returns the error and leaves any existing document
    /// untouched, since the result only replaces it on success.
    pub fn load(text: &str) -> Result<Self, FormatError> {
        let scene = script::parse(text)?;
        if checked_duration(&scene.shapes).is_none() {
            return Err(FormatError::DurationOverflow);
        }
        let doc = Self::from_shapes(scene.width, scene.height, scene.shapes);
        debug!(
            shapes = doc.shapes.len(),
            duration = doc.duration,
            "loaded scene {}x{}",
            doc.width,
            doc.height
        );
        Ok(doc)
    }

    pub fn save(&self) -> String {
        script::serialize(self)
    }

    /// Drop every shape, keeping the canvas extents.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.step = 0;
        self.duration = compute_duration(&self.shapes);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of distinct playable steps; always at least one.
    pub fn duration(&self) -> usize {
        self.duration
    }

    /// Move the playback position, clamping into `[0, duration - 1]`.
    pub fn set_step(&mut self, step: i64) -> StepSignal {
        match usize::try_from(step) {
            Ok(s) => self.seek(s),
            Err(_) if step < 0 => self.seek(0),
            Err(_) => self.seek(usize::MAX),
        }
    }

    /// Unsigned counterpart of `set_step`, valid across the whole duration.
    pub fn seek(&mut self, step: usize) -> StepSignal {
        let last = self.last_step();
        if step <= last {
            self.step = step;
            StepSignal::Continue
        } else {
            self.step = last;
            StepSignal::Stop
        }
    }

    pub fn last_step(&self) -> usize {
        self.duration.saturating_sub(1)
    }

    pub fn next_step(&mut self) -> StepSignal {
        self.seek(self.step.saturating_add(1))
    }

    pub fn prev_step(&mut self) -> StepSignal {
        self.seek(self.step.saturating_sub(1))
    }

    /// World transform of the shape at `index` for an arbitrary step.
    pub fn pose_at(&self, index: usize, step: usize) -> Option<Transform> {
        self.shapes.get(index).map(|shape| shape.pose_at(step))
    }
}

/// Playable length of a set of shapes.
///
/// Long enough for every one-shot animation to settle and for every cyclic
/// animation to complete a whole number of cycles: the largest one-shot
/// length or the LCM of all cycle lengths, whichever is greater.
///
/// An LCM too large for `usize` is capped at `usize::MAX`; cyclic state no
/// longer repeats exactly after such a duration. `Document::load` rejects
/// those scripts up front.
pub fn compute_duration(shapes: &[Shape]) -> usize {
    checked_duration(shapes).unwrap_or_else(|| {
        warn!("animation cycles overflow the step counter, capping duration");
        usize::MAX
    })
}

/// Exact playable length, or `None` when the cycle LCM does not fit `usize`.
pub fn checked_duration(shapes: &[Shape]) -> Option<usize> {
    let mut cycles: u64 = 1;
    let mut longest_one_shot: u64 = 0;

    for animation in shapes.iter().flat_map(|s| &s.animations) {
        match animation.timing() {
            TimingContribution::Cycle(len) => cycles = lcm(cycles, len)?,
            TimingContribution::OneShot(len) => longest_one_shot = longest_one_shot.max(len),
        }
    }

    usize::try_from(cycles.max(longest_one_shot)).ok()
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(a.max(b));
    }
    (a / gcd(a, b)).checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animation::{Animation, AnimationKind};
    use crate::engine::shape::ShapeKind;
    use crate::types::ColorToken;
    use euclid::default::Point2D;

    fn circle(animations: Vec<Animation>) -> Shape {
        let mut shape = Shape::new(
            ShapeKind::Circle { radius: 5.0 },
            Point2D::new(10.0, 10.0),
            ColorToken::new("red"),
        );
        shape.animations = animations;
        shape
    }

    fn mv(period: u32, cyclic: bool) -> Animation {
        Animation::new(AnimationKind::Move { x: 20.0, y: 10.0 }, period, cyclic)
    }

    fn rot(period: u32, cyclic: bool) -> Animation {
        Animation::new(AnimationKind::Rotate { angle: 90.0 }, period, cyclic)
    }

    #[test]
    fn empty_scene_lasts_one_step() {
        assert_eq!(compute_duration(&[]), 1);
        assert_eq!(Document::new(10, 10).duration(), 1);
    }

    #[test]
    fn one_shot_sets_duration() {
        assert_eq!(compute_duration(&[circle(vec![mv(10, false)])]), 10);
    }

    #[test]
    fn longer_cycle_wins_over_one_shot() {
        let shapes = [circle(vec![mv(10, false)]), circle(vec![rot(6, true)])];
        assert_eq!(compute_duration(&shapes), 12);
    }

    #[test]
    fn cycles_combine_by_lcm() {
        // Cycle lengths 8 and 12 line up after 24 steps.
        let shapes = [circle(vec![rot(4, true), mv(6, true)]), circle(vec![mv(3, false)])];
        assert_eq!(compute_duration(&shapes), 24);
    }

    #[test]
    fn step_clamps_at_both_ends() {
        let mut doc = Document::from_shapes(100, 100, vec![circle(vec![mv(10, false)])]);

        assert_eq!(doc.set_step(-5), StepSignal::Continue);
        assert_eq!(doc.step(), 0);

        assert_eq!(doc.set_step(4), StepSignal::Continue);
        assert_eq!(doc.step(), 4);

        assert_eq!(doc.set_step(doc.duration() as i64 + 100), StepSignal::Stop);
        assert_eq!(doc.step(), doc.duration() - 1);

        assert_eq!(doc.set_step(10), StepSignal::Stop);
        assert_eq!(doc.step(), 9);
    }

    #[test]
    fn stepping_walks_and_stops_at_the_end() {
        let mut doc = Document::from_shapes(100, 100, vec![circle(vec![mv(3, false)])]);
        assert_eq!(doc.prev_step(), StepSignal::Continue);
        assert_eq!(doc.step(), 0);
        assert_eq!(doc.next_step(), StepSignal::Continue);
        assert_eq!(doc.next_step(), StepSignal::Continue);
        assert_eq!(doc.step(), 2);
        assert_eq!(doc.next_step(), StepSignal::Stop);
        assert_eq!(doc.step(), 2);
    }

    #[test]
    fn clear_recomputes_duration() {
        let mut doc = Document::from_shapes(100, 100, vec![circle(vec![mv(10, false)])]);
        let _ = doc.set_step(5);
        doc.clear();
        assert!(doc.shapes().is_empty());
        assert_eq!(doc.step(), 0);
        assert_eq!(doc.duration(), 1);
        assert_eq!((doc.width(), doc.height()), (100, 100));
    }

    #[test]
    fn failed_load_keeps_previous_document() {
        let doc = Document::load("100 100\n1\ncircle 1 2 3 red\n1\nmove 5 5 10\n").unwrap();
        let before = doc.clone();

        let result = Document::load("100 100\n2\ncircle 1 2 3 red\n0\n");
        assert!(matches!(result, Err(FormatError::UnexpectedEnd { .. })));
        assert_eq!(doc, before);
        assert_eq!(doc.duration(), 10);
    }

    #[test]
    fn pose_lookup_by_index() {
        let doc = Document::from_shapes(100, 100, vec![circle(vec![mv(2, false)])]);
        let end = doc.pose_at(0, 2).unwrap().transform_point(Point2D::origin());
        assert_eq!(end, Point2D::new(20.0, 10.0));
        assert!(doc.pose_at(1, 0).is_none());
    }

    #[test]
    fn huge_cycles_still_reach_the_last_step() {
        // Doubled periods 2·(2^31-1) and 2·(2^32-5) share no odd factor, so the
        // duration lands above i64::MAX but within u64.
        let shapes = vec![circle(vec![rot(2_147_483_647, true), rot(4_294_967_291, true)])];
        let mut doc = Document::from_shapes(100, 100, shapes);
        assert_eq!(doc.duration() as u64, 18_446_744_043_644_780_554);

        assert_eq!(doc.seek(doc.last_step()), StepSignal::Continue);
        assert_eq!(doc.step(), doc.duration() - 1);
        assert_eq!(doc.next_step(), StepSignal::Stop);
        assert_eq!(doc.step(), doc.duration() - 1);

        assert_eq!(doc.set_step(i64::MAX), StepSignal::Continue);
        assert_eq!(doc.step() as i64, i64::MAX);
    }

    #[test]
    fn overflowing_cycles_are_rejected_at_load() {
        let text = "100 100\n1\ncircle 1 2 3 red\n3\nrotate 1 2147483647 cycle\nrotate 1 2147483629 cycle\nrotate 1 2147483587 cycle\n";
        assert_eq!(Document::load(text), Err(FormatError::DurationOverflow));

        let shapes = script::parse(text).unwrap().shapes;
        assert_eq!(checked_duration(&shapes), None);
        assert_eq!(compute_duration(&shapes), usize::MAX);
    }
}
