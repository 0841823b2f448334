//! Scene script codec — the human-authored text format.
//!
//! ```text
//! <width> <height>
//! <shape count>
//! <kind> <fields...> <color>
//! <animation count>
//! <animation kind> <params...> <period> [cycle marker]
//! ```
//!
//! Every record sits on its own line with whitespace-separated tokens.
//! Indentation and blank lines are ignored. The trailing cycle marker of an
//! animation only matters by its presence.

use std::fmt::Write as _;
use std::iter::Enumerate;
use std::str::Lines;

use euclid::default::Point2D;

use crate::types::ColorToken;

use super::animation::{Animation, AnimationKind};
use super::document::Document;
use super::shape::{Shape, ShapeKind};

/// Marker written after cyclic animations.
pub const CYCLE_MARKER: &str = "cycle";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: unexpected end of script, expected {expected}")]
    UnexpectedEnd { line: usize, expected: &'static str },

    #[error("line {line}: `{record}` expects {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        record: String,
        expected: String,
        found: usize,
    },

    #[error("line {line}: `{token}` is not a valid {what}")]
    InvalidNumber {
        line: usize,
        token: String,
        what: &'static str,
    },

    #[error("line {line}: unknown shape kind `{kind}`")]
    UnknownShape { line: usize, kind: String },

    #[error("line {line}: unknown animation kind `{kind}`")]
    UnknownAnimation { line: usize, kind: String },

    #[error("line {line}: {what} must be greater than zero")]
    NotPositive { line: usize, what: &'static str },

    #[error("line {line}: unexpected content after the last declared shape")]
    TrailingContent { line: usize },

    #[error("animation cycles never realign within a representable number of steps")]
    DurationOverflow,
}

/// A scene as read from a script, before any timing analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScene {
    pub width: u32,
    pub height: u32,
    pub shapes: Vec<Shape>,
}

pub fn parse(text: &str) -> Result<ParsedScene, FormatError> {
    let mut records = Records::new(text);

    let (line, header) = records.next_record("canvas size")?;
    expect_fields(line, "canvas size", &header, 2)?;
    let width = positive_int(line, header[0], "canvas width")?;
    let height = positive_int(line, header[1], "canvas height")?;

    let shape_count = records.count("shape count")?;
    let mut shapes = Vec::with_capacity(shape_count.min(1024));
    for _ in 0..shape_count {
        let mut shape = parse_shape(&mut records)?;
        let animation_count = records.count("animation count")?;
        for _ in 0..animation_count {
            shape.animations.push(parse_animation(&mut records)?);
        }
        shapes.push(shape);
    }

    if let Some((line, _)) = records.peek() {
        return Err(FormatError::TrailingContent { line: *line });
    }

    Ok(ParsedScene {
        width,
        height,
        shapes,
    })
}

fn parse_shape(records: &mut Records<'_>) -> Result<Shape, FormatError> {
    let (line, tokens) = records.next_record("shape")?;
    let (kind, fields) = split_keyword(&tokens);

    let (cx, cy, kind, color) = match kind {
        "rectangle" => {
            expect_fields(line, kind, fields, 6)?;
            let [cx, cy, width, height, angle] = floats::<5>(line, &fields[..5])?;
            let kind = ShapeKind::Rectangle {
                width,
                height,
                angle,
            };
            (cx, cy, kind, fields[5])
        }
        "circle" => {
            expect_fields(line, kind, fields, 4)?;
            let [cx, cy, radius] = floats::<3>(line, &fields[..3])?;
            (cx, cy, ShapeKind::Circle { radius }, fields[3])
        }
        "triangle" => {
            expect_fields(line, kind, fields, 5)?;
            let [cx, cy, radius, angle] = floats::<4>(line, &fields[..4])?;
            (cx, cy, ShapeKind::Triangle { radius, angle }, fields[4])
        }
        other => {
            return Err(FormatError::UnknownShape {
                line,
                kind: other.to_string(),
            });
        }
    };

    Ok(Shape::new(kind, Point2D::new(cx, cy), ColorToken::new(color)))
}

fn parse_animation(records: &mut Records<'_>) -> Result<Animation, FormatError> {
    let (line, tokens) = records.next_record("animation")?;
    let (keyword, fields) = split_keyword(&tokens);

    let arity = match keyword {
        "move" => 2,
        "rotate" | "scale" => 1,
        other => {
            return Err(FormatError::UnknownAnimation {
                line,
                kind: other.to_string(),
            });
        }
    };

    // Target values, the period, then an optional cycle marker.
    if fields.len() != arity + 1 && fields.len() != arity + 2 {
        return Err(FormatError::FieldCount {
            line,
            record: keyword.to_string(),
            expected: format!("{} or {}", arity + 1, arity + 2),
            found: fields.len(),
        });
    }

    let kind = match keyword {
        "move" => {
            let [x, y] = floats::<2>(line, &fields[..2])?;
            AnimationKind::Move { x, y }
        }
        "rotate" => AnimationKind::Rotate {
            angle: float(line, fields[0])?,
        },
        _ => AnimationKind::Scale {
            factor: float(line, fields[0])?,
        },
    };
    let period = positive_int(line, fields[arity], "animation period")?;
    let cyclic = fields.len() == arity + 2;

    Ok(Animation::new(kind, period, cyclic))
}

/// Write a document back out in script form.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", doc.width(), doc.height());
    let _ = writeln!(out, "{}", doc.shapes().len());

    for shape in doc.shapes() {
        let (cx, cy) = (shape.center.x, shape.center.y);
        let _ = match shape.kind {
            ShapeKind::Rectangle {
                width,
                height,
                angle,
            } => writeln!(
                out,
                "rectangle {cx} {cy} {width} {height} {angle} {}",
                shape.color
            ),
            ShapeKind::Circle { radius } => {
                writeln!(out, "circle {cx} {cy} {radius} {}", shape.color)
            }
            ShapeKind::Triangle { radius, angle } => {
                writeln!(out, "triangle {cx} {cy} {radius} {angle} {}", shape.color)
            }
        };

        let _ = writeln!(out, "{}", shape.animations.len());
        for animation in &shape.animations {
            let _ = match animation.kind {
                AnimationKind::Move { x, y } => write!(out, "move {x} {y} {}", animation.period),
                AnimationKind::Rotate { angle } => {
                    write!(out, "rotate {angle} {}", animation.period)
                }
                AnimationKind::Scale { factor } => {
                    write!(out, "scale {factor} {}", animation.period)
                }
            };
            if animation.cyclic {
                out.push(' ');
                out.push_str(CYCLE_MARKER);
            }
            out.push('\n');
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Record reader
// ---------------------------------------------------------------------------

/// Non-blank lines of a script, tokenized, with 1-based line numbers.
struct Records<'a> {
    lines: Enumerate<Lines<'a>>,
    peeked: Option<(usize, Vec<&'a str>)>,
    last_line: usize,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Records {
            lines: text.lines().enumerate(),
            peeked: None,
            last_line: 0,
        }
    }

    fn advance(&mut self) -> Option<(usize, Vec<&'a str>)> {
        if let Some(record) = self.peeked.take() {
            return Some(record);
        }
        for (index, raw) in self.lines.by_ref() {
            let tokens: Vec<&str> = raw.split_whitespace().collect();
            if !tokens.is_empty() {
                return Some((index + 1, tokens));
            }
        }
        None
    }

    fn peek(&mut self) -> Option<&(usize, Vec<&'a str>)> {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.as_ref()
    }

    fn next_record(&mut self, expected: &'static str) -> Result<(usize, Vec<&'a str>), FormatError> {
        match self.advance() {
            Some(record) => {
                self.last_line = record.0;
                Ok(record)
            }
            None => Err(FormatError::UnexpectedEnd {
                line: self.last_line + 1,
                expected,
            }),
        }
    }

    fn count(&mut self, what: &'static str) -> Result<usize, FormatError> {
        let (line, tokens) = self.next_record(what)?;
        expect_fields(line, what, &tokens, 1)?;
        tokens[0]
            .parse::<usize>()
            .map_err(|_| FormatError::InvalidNumber {
                line,
                token: tokens[0].to_string(),
                what,
            })
    }
}

fn split_keyword<'t, 'a>(tokens: &'t [&'a str]) -> (&'a str, &'t [&'a str]) {
    match tokens.split_first() {
        Some((keyword, rest)) => (*keyword, rest),
        None => ("", tokens),
    }
}

fn expect_fields(line: usize, record: &str, fields: &[&str], expected: usize) -> Result<(), FormatError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(FormatError::FieldCount {
            line,
            record: record.to_string(),
            expected: expected.to_string(),
            found: fields.len(),
        })
    }
}

fn float(line: usize, token: &str) -> Result<f64, FormatError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormatError::InvalidNumber {
            line,
            token: token.to_string(),
            what: "number",
        }),
    }
}

fn floats<const N: usize>(line: usize, tokens: &[&str]) -> Result<[f64; N], FormatError> {
    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = float(line, token)?;
    }
    Ok(values)
}

fn positive_int(line: usize, token: &str, what: &'static str) -> Result<u32, FormatError> {
    let value = token.parse::<u32>().map_err(|_| FormatError::InvalidNumber {
        line,
        token: token.to_string(),
        what,
    })?;
    if value == 0 {
        return Err(FormatError::NotPositive { line, what });
    }
    Ok(value)
}
