use std::{fs, process};

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shape_animator::{
    engine::Document,
    player::{config::PlayerConfig, Player},
    renderer::Renderer,
};

fn main() {
    // The player owns stdout, so logs go to stderr and stay quiet by default.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "shape-animator play <script.txt>";
const CHECK_USAGE: &str = "shape-animator check <script.txt>";
const FMT_USAGE: &str = "shape-animator fmt <script.txt> [output.txt]";
const EXPORT_USAGE: &str = "shape-animator export <script.txt> <frames.json>";

/// Longest scene `export` will write out frame by frame.
const MAX_EXPORT_STEPS: usize = 100_000;

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path)
        }
        Some("check") => {
            let path = args.next().context(CHECK_USAGE)?;
            check(&path)
        }
        Some("fmt") => {
            let path = args.next().context(FMT_USAGE)?;
            format(&path, args.next().as_deref())
        }
        Some("export") => {
            let path = args.next().context(EXPORT_USAGE)?;
            let output = args.next().context(EXPORT_USAGE)?;
            export(&path, &output)
        }
        _ => bail!(
            "Shape Animator — scripted 2D shape animation player\n\nUsage:\n  {PLAY_USAGE}\n  {CHECK_USAGE}\n  {FMT_USAGE}\n  {EXPORT_USAGE}"
        ),
    }
}

fn load(path: &str) -> Result<Document> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    Document::load(&text).with_context(|| format!("Failed to parse {path}"))
}

fn play(path: &str) -> Result<()> {
    let doc = load(path)?;
    let mut player = Player::new(doc, PlayerConfig::load());
    player.play()
}

fn check(path: &str) -> Result<()> {
    let doc = load(path)?;
    println!("{path}: {}x{} canvas", doc.width(), doc.height());
    for (i, shape) in doc.shapes().iter().enumerate() {
        println!(
            "  {:>3}. {:<9} at ({}, {}) {} ({} animations)",
            i + 1,
            shape.display_name(),
            shape.center.x,
            shape.center.y,
            shape.color,
            shape.animations.len(),
        );
    }
    println!("duration: {} steps", doc.duration());
    Ok(())
}

fn format(path: &str, output: Option<&str>) -> Result<()> {
    let text = load(path)?.save();
    match output {
        Some(out) => fs::write(out, text).with_context(|| format!("Failed to write {out}")),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn export(path: &str, output: &str) -> Result<()> {
    let doc = load(path)?;
    let config = PlayerConfig::load();
    let renderer = Renderer::new(config.cell_width, config.cell_height);

    let presentation = renderer.render_document(&doc, MAX_EXPORT_STEPS)?;

    let json = serde_json::to_string_pretty(&presentation)?;
    fs::write(output, &json).with_context(|| format!("Failed to write {output}"))?;

    info!(frames = presentation.frames.len(), "exported {path} -> {output}");
    eprintln!(
        "Exported {} steps from {} -> {}",
        presentation.frames.len(),
        path,
        output,
    );

    Ok(())
}
