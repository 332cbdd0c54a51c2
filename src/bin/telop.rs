use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use telop_overlay::{
    FontResolver, HttpFontFetcher, OverlayCompositor, Theme, TextLayoutEngine, load_tasks,
    overlay_tasks, theme_by_key, theme_for_scene,
};

#[derive(Parser, Debug)]
#[command(name = "telop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Directory for the bundled fallback font.
    #[arg(long, global = true, default_value = "fonts")]
    fonts_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a telop overlay onto a single background image.
    Overlay(OverlayArgs),
    /// Overlay every task in a scene task list onto its background.
    Batch(BatchArgs),
    /// List the built-in themes.
    Themes,
}

#[derive(Parser, Debug)]
struct OverlayArgs {
    /// Background image path.
    #[arg(long)]
    bg: PathBuf,

    /// Output image path (.png, or .jpg for JPEG at quality 95).
    #[arg(long)]
    out: PathBuf,

    /// Telop text to overlay.
    #[arg(long)]
    text: String,

    /// Scene id whose mapped theme to use.
    #[arg(long, conflicts_with = "theme")]
    scene: Option<String>,

    /// Theme key, e.g. `manga_dark`.
    #[arg(long)]
    theme: Option<String>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Scene task list (JSON array).
    #[arg(long)]
    tasks: PathBuf,

    /// Directory holding one background per task output name.
    #[arg(long)]
    backgrounds: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolver = FontResolver::new(&cli.fonts_dir, Box::new(HttpFontFetcher));
    let mut compositor = OverlayCompositor::new(TextLayoutEngine::new(resolver));

    match cli.cmd {
        Command::Overlay(args) => cmd_overlay(&mut compositor, args),
        Command::Batch(args) => cmd_batch(&mut compositor, args),
        Command::Themes => cmd_themes(),
    }
}

fn cmd_overlay(compositor: &mut OverlayCompositor, args: OverlayArgs) -> anyhow::Result<()> {
    let theme = pick_theme(args.scene.as_deref(), args.theme.as_deref())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    compositor.composite_file(&args.bg, &args.out, &args.text, theme)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(compositor: &mut OverlayCompositor, args: BatchArgs) -> anyhow::Result<()> {
    let tasks = load_tasks(&args.tasks)?;
    let summary = overlay_tasks(compositor, &tasks, &args.backgrounds, &args.out)?;

    eprintln!(
        "composited {} of {} tasks ({} skipped, {} failed)",
        summary.written,
        tasks.len(),
        summary.skipped,
        summary.failed,
    );
    if summary.failed > 0 {
        anyhow::bail!("{} task(s) failed", summary.failed);
    }
    Ok(())
}

fn cmd_themes() -> anyhow::Result<()> {
    for theme in telop_overlay::THEMES {
        println!(
            "{:<14} primary {} text ({},{},{}) panel ({},{},{},{})",
            theme.name,
            theme.primary,
            theme.text_color.r,
            theme.text_color.g,
            theme.text_color.b,
            theme.panel_bg.r,
            theme.panel_bg.g,
            theme.panel_bg.b,
            theme.panel_bg.a,
        );
    }
    Ok(())
}

fn pick_theme(scene: Option<&str>, theme: Option<&str>) -> anyhow::Result<&'static Theme> {
    match (scene, theme) {
        (Some(scene), _) => Ok(theme_for_scene(scene)),
        (None, Some(key)) => {
            theme_by_key(key).with_context(|| format!("unknown theme '{key}'"))
        }
        (None, None) => Ok(telop_overlay::DEFAULT_THEME),
    }
}
