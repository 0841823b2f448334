//! Shared boundary types for the shape animator.
//!
//! This module defines the two key data contracts:
//! - Engine → Renderer (in-memory): `ResolvedScene` containing `ShapeDraw`s
//! - Renderer → Player / export file: `PlayablePresentation` containing `Frame`s

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::geometry::Outline;
use crate::engine::Transform;

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl NamedColor {
    fn from_name(name: &str) -> Option<Self> {
        let named = match name.to_ascii_lowercase().as_str() {
            "black" => NamedColor::Black,
            "red" => NamedColor::Red,
            "green" => NamedColor::Green,
            "yellow" => NamedColor::Yellow,
            "blue" => NamedColor::Blue,
            "magenta" | "fuchsia" => NamedColor::Magenta,
            "cyan" | "aqua" => NamedColor::Cyan,
            "white" => NamedColor::White,
            _ => return None,
        };
        Some(named)
    }

    /// Channel values following the SVG color keywords.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            NamedColor::Black => (0, 0, 0),
            NamedColor::Red => (255, 0, 0),
            NamedColor::Green => (0, 128, 0),
            NamedColor::Yellow => (255, 255, 0),
            NamedColor::Blue => (0, 0, 255),
            NamedColor::Magenta => (255, 0, 255),
            NamedColor::Cyan => (0, 255, 255),
            NamedColor::White => (255, 255, 255),
        }
    }
}

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Named(n) => n.rgb(),
            Color::Rgb { r, g, b } => (r, g, b),
        }
    }

    /// Channel-wise inverse, used to highlight the selected shape.
    pub fn inverted(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::Rgb {
            r: 255 - r,
            g: 255 - g,
            b: 255 - b,
        }
    }
}

/// A color exactly as written in a script.
///
/// The engine never interprets the token; it is carried through to the
/// renderer and written back verbatim on save. Resolution to a concrete
/// `Color` accepts the basic color names and `#rgb` / `#rrggbb` hex forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorToken(String);

impl ColorToken {
    pub fn new(token: impl Into<String>) -> Self {
        ColorToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self) -> Option<Color> {
        match self.0.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => NamedColor::from_name(&self.0).map(Color::Named),
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            let r = it.next()??;
            let g = it.next()??;
            let b = it.next()??;
            Some(Color::Rgb { r, g, b })
        }
        6 => Some(Color::Rgb {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        }),
        _ => None,
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
}

impl Style {
    pub fn is_default(&self) -> bool {
        self.fg.is_none() && !self.bold
    }
}

// ---------------------------------------------------------------------------
// Engine → Renderer boundary (in-memory only, never serialized)
// ---------------------------------------------------------------------------

/// Everything the renderer needs to paint one shape at one step.
#[derive(Debug, Clone)]
pub struct ShapeDraw {
    pub outline: Outline,
    pub transform: Transform,
    pub fill: ColorToken,
    pub stroke: ColorToken,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedScene {
    pub width: u32,
    pub height: u32,
    pub step: usize,
    pub shapes: Vec<ShapeDraw>,
}

// ---------------------------------------------------------------------------
// Renderer → Player boundary (serialized to the export file)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default, skip_serializing_if = "Style::is_default")]
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Full { cells: Vec<Vec<Cell>> },
    Diff { changes: Vec<CellChange> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayablePresentation {
    pub contract: TerminalContract,
    pub frames: Vec<Frame>,
}
