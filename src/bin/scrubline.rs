use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scrubline::{RegionPlan, SequenceConfig, Timeline};

#[derive(Parser, Debug)]
#[command(name = "scrubline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a sequence config and print a summary.
    Check(CheckArgs),
    /// Print the pinned-region plan for a media duration as JSON.
    Plan(PlanArgs),
    /// Print every target's state at a raw scroll progress as JSON.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Sequence config JSON.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Sequence config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Media duration in seconds.
    #[arg(long)]
    duration: f64,

    /// Viewport height in scroll units.
    #[arg(long, default_value_t = 1000.0)]
    viewport: f64,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    #[command(flatten)]
    plan: PlanArgs,

    /// Raw region progress in [0,1], tail included.
    #[arg(long)]
    progress: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn read_config(path: &std::path::Path) -> anyhow::Result<SequenceConfig> {
    SequenceConfig::from_json_path(path)
        .with_context(|| format!("load sequence config '{}'", path.display()))
}

fn make_plan(cfg: &SequenceConfig, args: &PlanArgs) -> anyhow::Result<RegionPlan> {
    let tail = cfg.tail_fraction_for(args.duration);
    Ok(RegionPlan::new(args.duration, args.viewport, tail)?)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config)?;
    println!(
        "ok: {} group(s), trigger {}, start '{}'",
        cfg.groups.len(),
        cfg.trigger,
        cfg.start
    );
    for group in &cfg.groups {
        let kind = match &group.animation {
            scrubline::Animation::Band(b) => {
                format!("band {}..{} fade {}", b.appear_at, b.disappear_at, b.fade)
            }
            scrubline::Animation::Keyframes(keys) => format!("{} keyframe(s)", keys.len()),
        };
        println!("  {}: {kind}", group.target);
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config)?;
    let plan = make_plan(&cfg, &args)?;
    let out = serde_json::json!({
        "plan": plan,
        "video_end_fraction": plan.video_end_fraction(),
        "has_tail": plan.has_tail(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.plan.config)?;
    let plan = make_plan(&cfg, &args.plan)?;
    let timeline = Timeline::compile(&cfg.groups, plan.duration_secs)?;

    let content = plan.content_progress(args.progress);
    let out = serde_json::json!({
        "raw_progress": args.progress,
        "content_progress": content,
        "media_position": content * plan.duration_secs,
        "targets": timeline.sample(content),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
