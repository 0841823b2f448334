//! Renderer — the deterministic rasterizer.
//!
//! Takes `ResolvedScene`s (in-memory, from the engine) and produces terminal
//! cell grids, either one at a time for the live player or as a
//! `PlayablePresentation` for export.
//!
//! The renderer is pure. Given the same input, it always produces the same
//! output. It knows nothing about steps, timing or animation semantics.

use anyhow::{bail, Result};
use euclid::default::Point2D;

use crate::engine::{Document, Engine};
use crate::types::{
    Cell, CellChange, Color, ColorToken, Frame, PlayablePresentation, ResolvedScene, ShapeDraw,
    Style, TerminalContract,
};

const SHAPE_CHAR: char = '█';

pub struct Renderer {
    /// Canvas units covered by one terminal cell, horizontally.
    cell_width: f64,
    /// Canvas units covered by one terminal cell, vertically.
    cell_height: f64,
}

impl Renderer {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Renderer {
            cell_width: cell_width.max(f64::EPSILON),
            cell_height: cell_height.max(f64::EPSILON),
        }
    }

    /// Terminal grid needed to show a canvas of the given extents.
    pub fn contract(&self, width: u32, height: u32) -> TerminalContract {
        let cells = |extent: u32, per_cell: f64| {
            (f64::from(extent) / per_cell).ceil().clamp(1.0, f64::from(u16::MAX)) as u16
        };
        TerminalContract {
            width: cells(width, self.cell_width),
            height: cells(height, self.cell_height),
        }
    }

    /// Render a sequence of resolved scenes into a playable presentation.
    ///
    /// The first frame is always a full frame. Subsequent frames are diffs
    /// against the previous frame.
    pub fn render(&self, scenes: impl IntoIterator<Item = ResolvedScene>) -> PlayablePresentation {
        let mut contract = TerminalContract { width: 0, height: 0 };
        let mut frames = Vec::new();
        let mut prev_grid: Option<Vec<Vec<Cell>>> = None;

        for scene in scenes {
            if prev_grid.is_none() {
                contract = self.contract(scene.width, scene.height);
            }
            let grid = self.rasterize(&scene);
            let frame = match &prev_grid {
                None => Frame::Full {
                    cells: grid.clone(),
                },
                Some(prev) => Frame::Diff {
                    changes: Self::diff(prev, &grid),
                },
            };
            frames.push(frame);
            prev_grid = Some(grid);
        }

        PlayablePresentation { contract, frames }
    }

    /// Render every step of `doc`, refusing documents longer than `max_steps`.
    pub fn render_document(&self, doc: &Document, max_steps: usize) -> Result<PlayablePresentation> {
        if doc.duration() > max_steps {
            bail!(
                "scene lasts {} steps, more than the {} an export can hold",
                doc.duration(),
                max_steps
            );
        }
        Ok(self.render(Engine::compile(doc, None)))
    }

    /// Rasterize a resolved scene onto a cell grid.
    ///
    /// Each cell is sampled at its center. Shapes are painted in document
    /// order, so later shapes cover earlier ones.
    pub fn rasterize(&self, scene: &ResolvedScene) -> Vec<Vec<Cell>> {
        let contract = self.contract(scene.width, scene.height);
        let w = contract.width as usize;
        let h = contract.height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];

        for shape in &scene.shapes {
            self.paint(shape, &mut grid, w, h);
        }

        grid
    }

    fn paint(&self, shape: &ShapeDraw, grid: &mut [Vec<Cell>], w: usize, h: usize) {
        // A collapsed transform (zero scale) covers no area.
        let Some(inverse) = shape.transform.inverse() else {
            return;
        };

        let mut inside = vec![vec![false; w]; h];
        for (y, row) in inside.iter_mut().enumerate() {
            for (x, hit) in row.iter_mut().enumerate() {
                let sample = Point2D::new(
                    (x as f64 + 0.5) * self.cell_width,
                    (y as f64 + 0.5) * self.cell_height,
                );
                *hit = shape.outline.contains(inverse.transform_point(sample));
            }
        }

        let fill = fill_style(shape);
        let stroke = color_style(&shape.stroke);

        for y in 0..h {
            for x in 0..w {
                if !inside[y][x] {
                    continue;
                }
                let edge = (x > 0 && !inside[y][x - 1])
                    || (x + 1 < w && !inside[y][x + 1])
                    || (y > 0 && !inside[y - 1][x])
                    || (y + 1 < h && !inside[y + 1][x]);
                grid[y][x] = Cell {
                    ch: SHAPE_CHAR,
                    style: if edge { stroke.clone() } else { fill.clone() },
                };
            }
        }
    }

    /// Compute a cell-level diff between two grids.
    pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}

fn color_style(token: &ColorToken) -> Style {
    Style {
        fg: token.resolve(),
        ..Default::default()
    }
}

/// The selected shape is filled with the inverse of its color; its outline
/// keeps the original.
fn fill_style(shape: &ShapeDraw) -> Style {
    let fg = shape.fill.resolve().map(|c: Color| {
        if shape.selected { c.inverted() } else { c }
    });
    Style {
        fg,
        bold: shape.selected,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedColor;

    fn scene(text: &str, step: usize, selected: Option<usize>) -> ResolvedScene {
        let doc = Document::load(text).unwrap();
        Engine::resolve_step(&doc, step, selected)
    }

    fn painted(grid: &[Vec<Cell>]) -> usize {
        grid.iter().flatten().filter(|c| c.ch == SHAPE_CHAR).count()
    }

    #[test]
    fn contract_rounds_up() {
        let r = Renderer::new(10.0, 20.0);
        assert_eq!(r.contract(801, 600), TerminalContract { width: 81, height: 30 });
    }

    #[test]
    fn rectangle_covers_its_cells() {
        let r = Renderer::new(1.0, 1.0);
        let grid = r.rasterize(&scene("10 10\n1\nrectangle 5 5 4 4 0 red\n0\n", 0, None));
        assert_eq!(grid.len(), 10);
        assert_eq!(grid[0].len(), 10);
        // Cells 3..=6 have centers within [3, 7].
        assert_eq!(painted(&grid), 16);
        assert_eq!(grid[5][5].ch, SHAPE_CHAR);
        assert_eq!(grid[5][5].style.fg, Some(Color::Named(NamedColor::Red)));
        assert_eq!(grid[0][0], Cell::default());
    }

    #[test]
    fn zero_scale_draws_nothing() {
        let text = "10 10\n1\nrectangle 5 5 4 4 0 red\n1\nscale 1 4\n";
        let r = Renderer::new(1.0, 1.0);
        assert_eq!(painted(&r.rasterize(&scene(text, 0, None))), 0);
        assert_eq!(painted(&r.rasterize(&scene(text, 4, None))), 16);
    }

    #[test]
    fn selected_fill_is_inverted() {
        let text = "10 10\n1\nrectangle 5 5 6 6 0 #ff0000\n0\n";
        let r = Renderer::new(1.0, 1.0);
        let grid = r.rasterize(&scene(text, 0, Some(0)));
        let interior = &grid[5][5];
        let edge = &grid[2][5];
        assert_eq!(interior.style.fg, Some(Color::Rgb { r: 0, g: 255, b: 255 }));
        assert_eq!(edge.style.fg, Some(Color::Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn later_shapes_paint_over_earlier_ones() {
        let text = "10 10\n2\nrectangle 5 5 10 10 0 red\n0\nrectangle 5 5 2 2 0 blue\n0\n";
        let r = Renderer::new(1.0, 1.0);
        let grid = r.rasterize(&scene(text, 0, None));
        assert_eq!(grid[5][5].style.fg, Some(Color::Named(NamedColor::Blue)));
        assert_eq!(grid[1][1].style.fg, Some(Color::Named(NamedColor::Red)));
    }

    #[test]
    fn render_starts_full_then_diffs() {
        let text = "10 10\n1\nrectangle 2 5 2 2 0 red\n1\nmove 8 5 3\n";
        let doc = Document::load(text).unwrap();
        let r = Renderer::new(1.0, 1.0);
        let presentation = r.render(Engine::compile(&doc, None));
        assert_eq!(presentation.frames.len(), 3);
        assert!(matches!(presentation.frames[0], Frame::Full { .. }));
        match &presentation.frames[1] {
            Frame::Diff { changes } => assert!(!changes.is_empty()),
            Frame::Full { .. } => panic!("expected a diff frame"),
        }
    }

    #[test]
    fn export_refuses_overlong_scenes() {
        let r = Renderer::new(1.0, 1.0);
        let short = Document::load("10 10\n1\nrectangle 2 5 2 2 0 red\n1\nmove 8 5 3\n").unwrap();
        assert_eq!(r.render_document(&short, 3).unwrap().frames.len(), 3);
        assert!(r.render_document(&short, 2).is_err());

        let endless = "10 10\n1\ncircle 5 5 2 red\n2\nrotate 1 2147483647 cycle\nrotate 1 2147483646 cycle\n";
        let doc = Document::load(endless).unwrap();
        assert_eq!(doc.duration(), 9_223_372_023_969_873_924);
        let err = r.render_document(&doc, 100_000).unwrap_err();
        assert!(err.to_string().contains("9223372023969873924"));
    }
}
