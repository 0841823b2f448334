use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Initial delay between automatic steps, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Canvas units per terminal column.
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,
    /// Canvas units per terminal row.
    #[serde(default = "default_cell_height")]
    pub cell_height: f64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub toggle_play: String,
    pub next_step: String,
    pub prev_step: String,
    pub first_step: String,
    pub last_step: String,
    pub faster: String,
    pub slower: String,
    pub select_next: String,
    pub clear: String,
    pub quit: String,
}

fn default_tick_ms() -> u64 { 40 }
fn default_cell_width() -> f64 { 10.0 }
fn default_cell_height() -> f64 { 20.0 }

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            toggle_play: "Space".into(),
            next_step: "Right".into(),
            prev_step: "Left".into(),
            first_step: "Home".into(),
            last_step: "End".into(),
            faster: "+".into(),
            slower: "-".into(),
            select_next: "Tab".into(),
            clear: "Ctrl-l".into(),
            quit: "q".into(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            tick_ms: default_tick_ms(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl PlayerConfig {
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                warn!(path = %config_path.display(), "invalid player config ({e}), using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("shape-animator");
        path.push("player.json");
        path
    }
}

/// Split a binding string such as `"Ctrl-l"` or `"F5"` into a key code and
/// the modifiers it requires.
pub fn parse_binding(binding: &str) -> Option<(KeyCode, KeyModifiers)> {
    let (modifiers, key) = if let Some(rest) = binding.strip_prefix("Ctrl-") {
        (KeyModifiers::CONTROL, rest)
    } else if let Some(rest) = binding.strip_prefix("Alt-") {
        (KeyModifiers::ALT, rest)
    } else {
        (KeyModifiers::NONE, binding)
    };

    let code = match key {
        "Right" => KeyCode::Right,
        "Left" => KeyCode::Left,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Enter" => KeyCode::Enter,
        "Esc" => KeyCode::Esc,
        "Space" => KeyCode::Char(' '),
        "Tab" => KeyCode::Tab,
        "Backspace" => KeyCode::Backspace,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                (Some('F'), Some(_)) => KeyCode::F(s[1..].parse().ok()?),
                _ => return None,
            }
        }
    };

    Some((code, modifiers))
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
///
/// Shift is ignored so bindings like `"+"` fire however the terminal reports
/// the shifted key; Ctrl and Alt must match exactly.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    let Some((code, required)) = parse_binding(binding) else {
        return false;
    };
    let held = event.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
    code == event.code && held == required
}
