use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use evocity::{
    AttributeDiff, EvolutionEvent, EvolutionRenderer, EvolutionSettings, GraphDiff, GraphSeries,
    HeadlessScene, SnapshotId,
};

#[derive(Parser, Debug)]
#[command(name = "evocity", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a whole series headlessly and print every finished transition.
    Play(PlayArgs),
    /// Print the differences between two snapshots of a series.
    Diff(DiffArgs),
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Graph series JSON (an array of snapshots).
    #[arg(long)]
    series: PathBuf,

    /// Settings JSON; defaults apply to missing fields.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Play from the last snapshot back to the first.
    #[arg(long)]
    reverse: bool,
}

#[derive(Parser, Debug)]
struct DiffArgs {
    /// Graph series JSON (an array of snapshots).
    #[arg(long)]
    series: PathBuf,

    /// Settings JSON, used for the compared attributes.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Index of the current snapshot.
    #[arg(long)]
    from: usize,

    /// Index of the next snapshot.
    #[arg(long)]
    to: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Diff(args) => cmd_diff(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_series(path: &Path) -> anyhow::Result<GraphSeries> {
    let series = GraphSeries::from_path(path)
        .with_context(|| format!("load series '{}'", path.display()))?;
    anyhow::ensure!(!series.is_empty(), "series '{}' is empty", path.display());
    Ok(series)
}

fn read_settings(path: Option<&Path>) -> anyhow::Result<EvolutionSettings> {
    match path {
        Some(p) => EvolutionSettings::from_path(p)
            .with_context(|| format!("load settings '{}'", p.display())),
        None => Ok(EvolutionSettings::default()),
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.fps > 0, "--fps must be positive");
    let series = read_series(&args.series)?;
    let settings = read_settings(args.settings.as_deref())?;

    let mut renderer = EvolutionRenderer::new(settings, HeadlessScene::new())
        .context("configure renderer")?;
    renderer.precompute(&series).context("lay out series")?;

    let start = if args.reverse { series.len() - 1 } else { 0 };
    let req = renderer.show_index(start);
    anyhow::ensure!(req.is_accepted(), "cannot show snapshot {start}: {req:?}");

    let dt = 1.0 / f64::from(args.fps);
    let mut auto_play_requested = false;
    // Upper bound on simulated frames so a misconfigured duration cannot spin forever.
    let per_transition = {
        let a = &renderer.settings().animation;
        (a.transition_time().max(a.removal_duration()) / dt).ceil() as usize + 16
    };
    let max_frames = per_transition * (series.len() + 1) * 2;

    for _ in 0..max_frames {
        renderer.tick(dt);
        for event in renderer.take_events() {
            if let EvolutionEvent::TransitionFinished { index, changes } = event {
                let name = series.get(index).map_or("", |g| g.name());
                println!(
                    "revision {} ({name}): +{} ~{} -{}",
                    index.0,
                    changes.added.len(),
                    changes.changed.len(),
                    changes.removed.len()
                );
            }
        }
        if renderer.is_animating() || renderer.is_auto_play() || renderer.is_auto_play_reverse() {
            continue;
        }
        if auto_play_requested || series.len() == 1 {
            let scene = renderer.factory();
            eprintln!(
                "done: {} visible nodes, {} edges, {} line updates",
                scene.visible_nodes().len(),
                scene.edges().len(),
                scene.line_updates()
            );
            return Ok(());
        }
        auto_play_requested = true;
        let req = if args.reverse {
            renderer.set_auto_play_reverse(true)
        } else {
            renderer.set_auto_play(true)
        };
        anyhow::ensure!(req.is_accepted(), "cannot start auto-play: {req:?}");
    }
    anyhow::bail!("playback did not finish within {max_frames} frames")
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<()> {
    let series = read_series(&args.series)?;
    let settings = read_settings(args.settings.as_deref())?;
    let get = |i: usize| {
        series
            .get(SnapshotId(i))
            .with_context(|| format!("no snapshot {i} (series has {})", series.len()))
    };
    let current = get(args.from)?;
    let next = get(args.to)?;

    let attrs = AttributeDiff::new(settings.diff_attributes.iter().cloned());
    let diff = GraphDiff::compute(Some(&**current), next, &attrs);
    for id in diff.added_nodes() {
        println!("+ node {id}");
    }
    for id in diff.changed_nodes() {
        println!("~ node {id}");
    }
    for id in diff.removed_nodes() {
        println!("- node {id}");
    }
    for id in diff.added_edges() {
        println!("+ edge {id}");
    }
    for id in diff.removed_edges() {
        println!("- edge {id}");
    }
    Ok(())
}
