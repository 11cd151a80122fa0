use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stagehand::{Director, DirectorOpts, RecordingRenderer, Registry};

#[derive(Parser, Debug)]
#[command(name = "stagehand", version)]
struct Cli {
    /// Log filter level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the objects, then play an action script against a recording renderer.
    Check(CheckArgs),
    /// Build the objects and list them.
    Objects(ObjectsArgs),
    /// List the supported actions.
    Actions,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Object-spec JSON.
    #[arg(long)]
    objects: PathBuf,

    /// Action-script JSON.
    #[arg(long)]
    actions: PathBuf,

    /// Play only this scene.
    #[arg(long)]
    scene: Option<String>,

    /// Treat warnings as errors.
    #[arg(long)]
    deny_warnings: bool,

    /// Print recorded calls as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ObjectsArgs {
    /// Object-spec JSON.
    #[arg(long)]
    objects: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Objects(args) => cmd_objects(args),
        Command::Actions => {
            for name in stagehand::action_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn build_registry(path: &std::path::Path) -> anyhow::Result<Registry> {
    stagehand::load_objects(path).with_context(|| format!("build objects '{}'", path.display()))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let registry = build_registry(&args.objects)?;

    let opts = DirectorOpts {
        deny_warnings: args.deny_warnings,
    };
    let mut director = Director::with_opts(&registry, opts);
    director
        .load_actions(&args.actions)
        .with_context(|| format!("load actions '{}'", args.actions.display()))?;
    director.set_target(RecordingRenderer::finishing())?;

    match &args.scene {
        Some(name) => director
            .play_scene(name)
            .with_context(|| format!("play scene '{name}'"))?,
        None => director.play().context("play scenes")?,
    }

    let warnings = director.warnings().to_vec();
    let calls = director
        .into_target()
        .map(|mut r| r.take_calls())
        .unwrap_or_default();

    if args.json {
        let out = serde_json::json!({
            "calls": calls.iter().map(|c| c.describe()).collect::<Vec<_>>(),
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for call in &calls {
            println!("{}", call.describe());
        }
        for w in &warnings {
            eprintln!("warning: {w}");
        }
    }
    eprintln!("ok: {} renderer call(s), {} warning(s)", calls.len(), warnings.len());
    Ok(())
}

fn cmd_objects(args: ObjectsArgs) -> anyhow::Result<()> {
    let registry = build_registry(&args.objects)?;
    for name in registry.names() {
        let entity = registry.entity(name)?;
        let entity = entity.borrow();
        let center = entity.center();
        println!(
            "{name}\t{}\tcenter=({:.3}, {:.3})\tsize={:.3}x{:.3}",
            entity.kind().name(),
            center.x,
            center.y,
            entity.width(),
            entity.height()
        );
    }
    Ok(())
}
