use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "weaver", version)]
struct Cli {
    /// Log per-block scheduling decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a story descriptor and report every schema problem.
    Validate(ValidateArgs),
    /// Synthesize a timeline and write it as JSON.
    Plan(PlanArgs),
    /// List the events of a timeline that are live at a frame.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Story descriptor JSON.
    #[arg(long)]
    story: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Story descriptor JSON.
    #[arg(long)]
    story: PathBuf,

    /// Duration manifest JSON (`{ "<asset key>": seconds }`).
    #[arg(long, conflicts_with = "assets")]
    durations: Option<PathBuf>,

    /// Local asset root; speech files are probed from `<assets>/<bucket>/<key>`.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Synthesis config JSON. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the timeline fingerprint to stderr.
    #[arg(long)]
    fingerprint: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Timeline JSON written by `plan`.
    #[arg(long)]
    timeline: PathBuf,

    /// Absolute frame.
    #[arg(long)]
    frame: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let story = weaver::StoryDescriptor::from_path(&args.story)?;
    story.validate()?;
    eprintln!(
        "ok: {} ({} blocks)",
        args.story.display(),
        story.blocks.len()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let story = weaver::StoryDescriptor::from_path(&args.story)?;
    let cfg = match &args.config {
        Some(path) => weaver::SynthesisConfig::from_path(path)?,
        None => weaver::SynthesisConfig::default(),
    };
    let catalog = load_catalog(&args, &story, &cfg)?;

    let synthesis = weaver::synthesize(&story, &catalog, &cfg)?;
    if !synthesis.warnings.is_empty() {
        eprintln!("{} scheduling warning(s)", synthesis.warnings.len());
    }
    if args.fingerprint {
        eprintln!("fingerprint: {}", weaver::fingerprint(&synthesis.timeline));
    }

    let json = synthesis.timeline.to_json_pretty()?;
    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json.as_bytes())
                .with_context(|| format!("write timeline '{}'", out.display()))?;
            eprintln!(
                "wrote {} ({} frames, {} events)",
                out.display(),
                synthesis.timeline.total_frames,
                synthesis.timeline.events.len()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write timeline to stdout")?;
        }
    }
    Ok(())
}

fn load_catalog(
    args: &PlanArgs,
    story: &weaver::StoryDescriptor,
    cfg: &weaver::SynthesisConfig,
) -> anyhow::Result<weaver::AssetCatalog> {
    if let Some(path) = &args.durations {
        return Ok(weaver::AssetCatalog::from_path(path)?);
    }
    let root: &Path = match &args.assets {
        Some(root) => root,
        None => anyhow::bail!("either --durations or --assets is required"),
    };
    if !weaver::is_ffprobe_on_path() {
        anyhow::bail!("--assets needs `ffprobe` on PATH; use --durations instead");
    }
    let fetcher = weaver::LocalDirFetcher::new(root);
    let catalog = weaver::AssetCatalog::prepare(
        story,
        &cfg.asset_bucket,
        &fetcher,
        &weaver::FfprobeProbe,
    )?;
    Ok(catalog)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let timeline = weaver::Timeline::from_path(&args.timeline)?;
    let mut binding = weaver::InMemoryBinding::new();
    weaver::drive(&timeline, &mut binding)?;

    let frame = weaver::FrameIndex(args.frame);
    let mut stdout = std::io::stdout().lock();
    for e in binding.live_at(frame) {
        let block = e.block.as_deref().unwrap_or("-");
        let kind = serde_json::to_string(&e.kind).context("serialize event kind")?;
        writeln!(
            stdout,
            "{:?}/{} [{}, {}) {block} {kind}",
            e.track, e.channel, e.window.start.0, e.window.end.0
        )
        .context("write to stdout")?;
    }
    Ok(())
}
