use std::io::Write;

use anyhow::Result;
use crossterm::{cursor, queue, style, terminal};

/// Draw a row of menu items at the top of the screen.
pub fn render_menubar<W: Write>(out: &mut W, items: &[String]) -> Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        for (text, key) in split_item(item) {
            let attr = if key {
                style::Attribute::Bold
            } else {
                style::Attribute::Dim
            };
            queue!(
                out,
                style::SetAttribute(attr),
                style::Print(text),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Split a menu item into runs, flagging the `[...]` key hints.
/// An unterminated bracket is treated as plain text.
fn split_item(item: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            runs.push((rest, false));
            break;
        };
        if open > 0 {
            runs.push((&rest[..open], false));
        }
        rest = &rest[open..];
        match rest.find(']') {
            Some(close) => {
                runs.push((&rest[..=close], true));
                rest = &rest[close + 1..];
            }
            None => {
                runs.push((rest, false));
                break;
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_become_key_runs() {
        assert_eq!(
            split_item("[Space] play"),
            vec![("[Space]", true), (" play", false)]
        );
        assert_eq!(
            split_item("step [←][→]"),
            vec![("step ", false), ("[←]", true), ("[→]", true)]
        );
        assert_eq!(split_item("open [end"), vec![("open ", false), ("[end", false)]);
    }
}
