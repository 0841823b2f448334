//! Playback state shared by the live player: play/pause, tick interval,
//! selection, and step navigation over a `Document`.

use std::time::Duration;

use tracing::debug;

use crate::engine::{Document, StepSignal};

/// Slowest tick interval reachable with the slow-down control.
const MAX_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    NextStep,
    PrevStep,
    FirstStep,
    LastStep,
    /// Jump to a 0-based step, clamped to the last one.
    GoTo(usize),
    Faster,
    Slower,
    SelectNext,
    Clear,
}

pub struct Playback {
    pub doc: Document,
    playing: bool,
    interval_ms: u64,
    selected: Option<usize>,
}

impl Playback {
    pub fn new(doc: Document, interval_ms: u64) -> Self {
        Playback {
            doc,
            playing: false,
            interval_ms: interval_ms.clamp(1, MAX_INTERVAL_MS),
            selected: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Advance one step if playing. Returns whether the step changed.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let before = self.doc.step();
        let signal = self.doc.next_step();
        self.follow(signal);
        self.doc.step() != before
    }

    /// Apply a user command. Returns whether the canvas needs redrawing.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::TogglePlay => {
                self.playing = !self.playing;
                false
            }
            Command::NextStep => {
                let signal = self.doc.next_step();
                self.follow(signal);
                true
            }
            Command::PrevStep => {
                let signal = self.doc.prev_step();
                self.follow(signal);
                true
            }
            Command::FirstStep => {
                let signal = self.doc.set_step(0);
                self.follow(signal);
                true
            }
            Command::LastStep => {
                let signal = self.doc.seek(self.doc.last_step());
                self.follow(signal);
                true
            }
            Command::GoTo(step) => {
                let signal = self.doc.seek(step);
                self.follow(signal);
                true
            }
            Command::Faster => {
                self.interval_ms = self.interval_ms / 2 + 1;
                debug!(interval_ms = self.interval_ms, "playback sped up");
                false
            }
            Command::Slower => {
                self.interval_ms = (self.interval_ms * 2).min(MAX_INTERVAL_MS);
                debug!(interval_ms = self.interval_ms, "playback slowed down");
                false
            }
            Command::SelectNext => {
                let count = self.doc.shapes().len();
                self.selected = match self.selected {
                    _ if count == 0 => None,
                    None => Some(0),
                    Some(i) if i + 1 < count => Some(i + 1),
                    Some(_) => None,
                };
                true
            }
            Command::Clear => {
                self.doc.clear();
                self.selected = None;
                self.playing = false;
                true
            }
        }
    }

    fn follow(&mut self, signal: StepSignal) {
        if signal == StepSignal::Stop {
            self.playing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playback() -> Playback {
        let doc = Document::load("100 100\n2\ncircle 1 1 3 red\n1\nmove 10 10 3\ntriangle 50 50 5 0 blue\n0\n")
            .unwrap();
        Playback::new(doc, 40)
    }

    #[test]
    fn paused_ticks_do_nothing() {
        let mut p = playback();
        assert!(!p.tick());
        assert_eq!(p.doc.step(), 0);
    }

    #[test]
    fn playing_stops_at_the_end() {
        let mut p = playback();
        p.apply(Command::TogglePlay);
        assert!(p.tick());
        assert!(p.tick());
        assert_eq!(p.doc.step(), 2);
        assert!(p.is_playing());
        assert!(!p.tick());
        assert_eq!(p.doc.step(), 2);
        assert!(!p.is_playing());
    }

    #[test]
    fn manual_steps_clamp() {
        let mut p = playback();
        p.apply(Command::PrevStep);
        assert_eq!(p.doc.step(), 0);
        p.apply(Command::LastStep);
        assert_eq!(p.doc.step(), 2);
        p.apply(Command::NextStep);
        assert_eq!(p.doc.step(), 2);
        p.apply(Command::FirstStep);
        assert_eq!(p.doc.step(), 0);
    }

    #[test]
    fn speed_controls() {
        let mut p = playback();
        p.apply(Command::Faster);
        assert_eq!(p.interval(), Duration::from_millis(21));
        p.apply(Command::Slower);
        assert_eq!(p.interval(), Duration::from_millis(42));

        let mut fast = Playback::new(Document::new(1, 1), 1);
        fast.apply(Command::Faster);
        assert_eq!(fast.interval(), Duration::from_millis(1));
    }

    #[test]
    fn selection_cycles_through_shapes_and_back_to_none() {
        let mut p = playback();
        assert_eq!(p.selected(), None);
        p.apply(Command::SelectNext);
        assert_eq!(p.selected(), Some(0));
        p.apply(Command::SelectNext);
        assert_eq!(p.selected(), Some(1));
        p.apply(Command::SelectNext);
        assert_eq!(p.selected(), None);
    }

    #[test]
    fn clear_empties_the_scene() {
        let mut p = playback();
        p.apply(Command::SelectNext);
        p.apply(Command::TogglePlay);
        p.apply(Command::Clear);
        assert!(p.doc.shapes().is_empty());
        assert_eq!(p.doc.duration(), 1);
        assert_eq!(p.selected(), None);
        assert!(!p.is_playing());
    }

    #[test]
    fn go_to_jumps_and_clamps() {
        let mut p = playback();
        p.apply(Command::GoTo(1));
        assert_eq!(p.doc.step(), 1);

        p.apply(Command::TogglePlay);
        p.apply(Command::GoTo(50));
        assert_eq!(p.doc.step(), 2);
        assert!(!p.is_playing());
    }

    #[test]
    fn last_step_reaches_durations_beyond_i64() {
        let text = "100 100\n1\ncircle 1 1 3 red\n2\nrotate 90 2147483647 cycle\nrotate 90 4294967291 cycle\n";
        let mut p = Playback::new(Document::load(text).unwrap(), 40);
        assert!(p.doc.duration() as u64 > i64::MAX as u64);

        p.apply(Command::LastStep);
        assert_eq!(p.doc.step(), p.doc.duration() - 1);
        p.apply(Command::PrevStep);
        assert_eq!(p.doc.step(), p.doc.duration() - 2);
    }
}
