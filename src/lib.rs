//! Shape animator — a deterministic interpreter for scripted 2D shape
//! animations.
//!
//! Pipeline: script text → `engine` (document, poses per step) → `renderer`
//! (terminal cell grids) → `player` (tick-driven playback).

pub mod engine;
pub mod player;
pub mod renderer;
pub mod types;
