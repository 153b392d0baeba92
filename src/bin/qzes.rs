use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qzes::{
    AppConfig, ContentRecord, CpuRenderer, ExportFormat, FontBook, HttpFetcher, JsonFileStore,
    LogoLoad, LogoLoader, Preset, Rgba8, StyleFlag, StyleRecord,
};

const DEFAULT_SESSION: &str = "qzes_session.json";

#[derive(Parser, Debug)]
#[command(name = "qzes", version, about = "Render leave notes (出行条)")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the stored note (with overrides) and export it.
    Render(RenderArgs),
    /// Apply a preset to the stored session.
    Preset(PresetArgs),
    /// Print the stored records as JSON.
    Show(SessionArg),
}

#[derive(Args, Debug)]
struct SessionArg {
    /// Session file (JSON key/value).
    #[arg(long, default_value = DEFAULT_SESSION)]
    session: PathBuf,
}

#[derive(Args, Debug)]
struct PresetArgs {
    /// `daily` or `weekend`.
    preset: Preset,

    #[command(flatten)]
    session: SessionArg,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    session: SessionArg,

    /// Preset applied before the explicit overrides below.
    #[arg(long)]
    preset: Option<Preset>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long = "class")]
    class_id: Option<String>,

    #[arg(long)]
    dormitory: Option<String>,

    /// Leave time, e.g. "2024-05-01 08:00".
    #[arg(long, value_parser = parse_when, conflicts_with = "no_leave")]
    leave: Option<NaiveDateTime>,

    /// Return time, e.g. "2024-05-03 18:00".
    #[arg(long, value_parser = parse_when, conflicts_with = "no_back")]
    back: Option<NaiveDateTime>,

    /// Clear the leave time.
    #[arg(long)]
    no_leave: bool,

    /// Clear the return time.
    #[arg(long)]
    no_back: bool,

    #[arg(long)]
    header: Option<String>,

    /// Paper color as CSS hex (`#fff`, `#fff0`, `#ffffff`, `#ffffffff`).
    #[arg(long)]
    background: Option<Rgba8>,

    /// Horizontal logo nudge, clamped to [-15, 15].
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<i32>,

    /// Vertical logo nudge, clamped to [-15, 15].
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<i32>,

    /// Turn a toggle on (`noLogo`, `noComma`, `withSign`, `noDate`). Repeatable.
    #[arg(long = "flag")]
    flags: Vec<StyleFlag>,

    /// Start from an empty toggle set before applying `--flag`.
    #[arg(long)]
    clear_flags: bool,

    /// Output format (defaults to the configured one).
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Output directory (defaults to the configured one).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Render without fetching the logo.
    #[arg(long)]
    no_logo_fetch: bool,
}

fn parse_when(raw: &str) -> Result<NaiveDateTime, String> {
    qzes::parse_timestamp(raw)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preset(args) => cmd_preset(args),
        Command::Show(args) => cmd_show(args),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = AppConfig::load(args.config.as_deref()).context("load configuration")?;
    let mut store = JsonFileStore::new(&args.session.session);
    let started = now();
    let (mut content, mut style) = qzes::load_session(&store, started);

    if let Some(preset) = args.preset {
        (style, content) = qzes::apply_preset(preset, &style, &content);
    }
    apply_overrides(&args, &mut content, &mut style);

    let logo = if args.no_logo_fetch || style.has(StyleFlag::NoLogo) {
        None
    } else {
        let base = args
            .config
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        let url = cfg.logo.url_for_background(style.background).to_string();
        fetch_logo(&url, base)?
    };

    let fonts = FontBook::load(cfg.fonts.serif.as_deref(), cfg.fonts.sans.as_deref())
        .context("load fonts")?;
    let mut renderer = CpuRenderer::new(&fonts)?;
    let bitmap = qzes::render_note(&mut renderer, &content, &style, logo.as_deref());

    let format = args.format.unwrap_or(cfg.export.format);
    let out_dir = args.out_dir.clone().unwrap_or(cfg.export.dir);
    let path = qzes::write_bitmap(&bitmap, &out_dir, &content.name, started, format)?;

    qzes::save_session(&mut store, &content, &style)
        .with_context(|| format!("save session '{}'", store.path().display()))?;

    println!("{}", path.display());
    Ok(())
}

fn apply_overrides(args: &RenderArgs, content: &mut ContentRecord, style: &mut StyleRecord) {
    if let Some(name) = &args.name {
        content.name = name.clone();
    }
    if let Some(class_id) = &args.class_id {
        content.class_id = class_id.clone();
    }
    if let Some(dormitory) = &args.dormitory {
        content.dormitory = dormitory.clone();
    }
    if args.no_leave {
        content.leave_date = None;
    } else if let Some(at) = args.leave {
        content.leave_date = Some(at);
    }
    if args.no_back {
        content.back_date = None;
    } else if let Some(at) = args.back {
        content.back_date = Some(at);
    }

    if let Some(header) = &args.header {
        style.header = header.clone();
    }
    if let Some(bg) = args.background {
        style.background = bg;
    }
    style.set_logo_offset(
        args.offset_x.unwrap_or(style.logo_offset_x),
        args.offset_y.unwrap_or(style.logo_offset_y),
    );
    if args.clear_flags {
        style.flags = Default::default();
    }
    for &flag in &args.flags {
        style.flags.insert(flag);
    }
}

fn fetch_logo(url: &str, base: &Path) -> anyhow::Result<Option<std::sync::Arc<qzes::LogoAsset>>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let loader = LogoLoader::new(HttpFetcher::new()?.with_base_dir(base));
    let loaded = runtime.block_on(loader.load(url));
    Ok(match loaded {
        LogoLoad::Ready(asset) => Some(asset),
        LogoLoad::Unavailable | LogoLoad::Superseded => None,
    })
}

fn cmd_preset(args: PresetArgs) -> anyhow::Result<()> {
    let mut store = JsonFileStore::new(&args.session.session);
    let (content, style) = qzes::load_session(&store, now());
    let (style, content) = qzes::apply_preset(args.preset, &style, &content);
    qzes::save_session(&mut store, &content, &style)
        .with_context(|| format!("save session '{}'", store.path().display()))?;
    eprintln!("applied {} preset", args.preset);
    Ok(())
}

fn cmd_show(args: SessionArg) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&args.session);
    let (content, style) = qzes::load_session(&store, now());
    let mut out = serde_json::Map::new();
    out.insert(qzes::CONTENT_KEY.to_string(), serde_json::to_value(&content)?);
    out.insert(qzes::STYLE_KEY.to_string(), serde_json::to_value(&style)?);
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
