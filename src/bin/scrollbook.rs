use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scrollbook::geometry::{DeviceClass, TouchTarget, place_hotspot};
use scrollbook::{
    DirFetcher, Events, Gallery, GalleryConfig, ImageMetrics, InMemoryView, OverlayConfigs,
    PageNumber, Size, TracingSink, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "scrollbook", version)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover and render every page of an asset tree headlessly.
    Discover(DiscoverArgs),
    /// Validate a gallery config and overlay files.
    CheckConfig(CheckConfigArgs),
    /// Print hotspot placements for one page at a given size.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct DiscoverArgs {
    /// Gallery config JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the asset paths are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Hotspot definitions.
    #[arg(long)]
    hotspots: Option<PathBuf>,

    /// Animation definitions.
    #[arg(long)]
    animations: Option<PathBuf>,

    /// Viewport used for layout, as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size, default_value = "1280x800")]
    viewport: Size,

    /// Navigate to this page (number or `#page-N` link) while discovery runs.
    #[arg(long)]
    goto: Option<String>,
}

#[derive(Parser, Debug)]
struct CheckConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    hotspots: Option<PathBuf>,

    #[arg(long)]
    animations: Option<PathBuf>,

    /// Fail when any overlay line was skipped.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    hotspots: PathBuf,

    #[arg(long)]
    page: u32,

    /// Natural image size, WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    natural: Size,

    /// Rendered image size, WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    rendered: Size,

    /// Viewport width used for device classification (defaults to the rendered width).
    #[arg(long)]
    viewport_width: Option<f64>,
}

#[derive(serde::Serialize)]
struct DiscoverReport {
    summary: scrollbook::PipelineSummary,
    pages: Vec<PageLine>,
    attempts: u64,
    navigation: Option<String>,
}

#[derive(serde::Serialize)]
struct PageLine {
    page: u32,
    state: scrollbook::RenderState,
    hotspots: usize,
    animations: usize,
}

#[derive(serde::Serialize)]
struct LayoutLine {
    target: String,
    device: DeviceClass,
    bounds: scrollbook::PercentBox,
    touch_scale: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Discover(args) => cmd_discover(args),
        Command::CheckConfig(args) => cmd_check_config(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_size(raw: &str) -> Result<Size, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(format!("size must be positive, got '{raw}'"));
    }
    Ok(Size::new(w, h))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GalleryConfig> {
    match path {
        Some(p) => GalleryConfig::from_path(p)
            .with_context(|| format!("load gallery config '{}'", p.display())),
        None => Ok(GalleryConfig::default()),
    }
}

fn load_overlays(
    hotspots: Option<&Path>,
    animations: Option<&Path>,
) -> anyhow::Result<(OverlayConfigs, usize)> {
    let mut out = OverlayConfigs::default();
    let mut skipped = 0;
    if let Some(p) = hotspots {
        let report = scrollbook::load_hotspots(p)
            .with_context(|| format!("load hotspots '{}'", p.display()))?;
        skipped += report.skipped.len();
        out.hotspots = report.records;
    }
    if let Some(p) = animations {
        let report = scrollbook::load_animations(p)
            .with_context(|| format!("load animations '{}'", p.display()))?;
        skipped += report.skipped.len();
        out.animations = report.records;
    }
    Ok((out, skipped))
}

#[tokio::main(flavor = "current_thread")]
async fn cmd_discover(args: DiscoverArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let (overlays, _) = load_overlays(args.hotspots.as_deref(), args.animations.as_deref())?;
    let view = Rc::new(InMemoryView::new(Viewport::new(
        args.viewport.width,
        args.viewport.height,
    )));
    let gallery = Gallery::new(
        &cfg,
        DirFetcher::new(&args.assets),
        Rc::clone(&view),
        overlays,
        Events::new(Rc::new(TracingSink)),
    )?;

    let navigate = async {
        match &args.goto {
            Some(link) => gallery.navigate_link(link).await.map(Some),
            None => Ok(None),
        }
    };
    let (summary, navigation) = tokio::join!(gallery.run(), navigate);
    let summary = summary?;
    let navigation = navigation?.map(|o| format!("{o:?}"));

    let state = gallery.state().snapshot();
    let pages = state
        .pages
        .iter()
        .map(|r| PageLine {
            page: r.page.get(),
            state: r.state,
            hotspots: gallery.hotspots().overlays(r.page).len(),
            animations: gallery.animations().instances(r.page).len(),
        })
        .collect();
    let report = DiscoverReport {
        summary,
        pages,
        attempts: gallery.discovery_stats().map_or(0, |s| s.attempts),
        navigation,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(msg) = view.gallery_fallback() {
        eprintln!("{msg}");
    }
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let (overlays, skipped) = load_overlays(args.hotspots.as_deref(), args.animations.as_deref())?;
    eprintln!(
        "config ok: {} format(s), max {} pages",
        cfg.formats.len(),
        cfg.max_pages
    );
    eprintln!(
        "{} hotspot(s), {} animation(s), {} line(s) skipped",
        overlays.hotspots.len(),
        overlays.animations.len(),
        skipped
    );
    if args.strict && skipped > 0 {
        anyhow::bail!("{skipped} overlay line(s) were skipped");
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let page = PageNumber::new(args.page)?;
    let report = scrollbook::load_hotspots(&args.hotspots)
        .with_context(|| format!("load hotspots '{}'", args.hotspots.display()))?;

    let metrics = ImageMetrics {
        natural: args.natural,
        rendered: args.rendered,
    };
    let device = DeviceClass::classify(
        args.viewport_width.unwrap_or(args.rendered.width),
        cfg.mobile_breakpoint_px,
    );
    let touch = TouchTarget {
        min_px: cfg.min_touch_px,
        min_scale: cfg.min_touch_scale,
    };
    let lines: Vec<_> = report
        .records
        .iter()
        .filter(|h| h.page == page)
        .map(|h| {
            let p = place_hotspot(h.authored_box(), metrics, device, touch);
            LayoutLine {
                target: h.target.to_string(),
                device: p.device,
                bounds: p.bounds,
                touch_scale: p.touch_scale,
            }
        })
        .collect();
    if lines.is_empty() {
        eprintln!("no hotspots on page {page}");
    }
    println!("{}", serde_json::to_string_pretty(&lines)?);
    Ok(())
}
