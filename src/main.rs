use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use motion_controllers::controller::visual::NodeValue;
use motion_controllers::mapping::{loader, validation};
use motion_controllers::{
    Handedness, MappingRegistry, MotionController, NodePose, RawSnapshot, RawValues, Settings,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "motion-controllers", version, about = "XR motion controller mapping tool")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate every mapping description in a directory
    Validate { dir: Option<PathBuf> },
    /// List the identifiers that register successfully
    List { dir: Option<PathBuf> },
    /// Run a single frame for one mapping and print the result
    Simulate {
        identifier: String,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long, default_value = "none")]
        hand: Handedness,
        /// Raw input as `<dataSource>=<button>[,<x>,<y>]`, repeatable
        #[arg(long = "input", value_parser = parse_input)]
        inputs: Vec<(String, RawValues)>,
        /// JSON object of asset node name to `{ "translation": [..], "rotation": [..] }`
        #[arg(long)]
        asset: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_or_default()?,
    };
    setup(&settings)?;

    match cli.command {
        Command::Validate { dir } => validate(&mappings_dir(dir, &settings)),
        Command::List { dir } => list(&mappings_dir(dir, &settings)),
        Command::Simulate {
            identifier,
            dir,
            hand,
            inputs,
            asset,
        } => simulate(
            &settings,
            &mappings_dir(dir, &settings),
            &identifier,
            hand,
            inputs,
            asset.as_deref(),
        ),
    }
}

fn setup(settings: &Settings) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|l| l.parse::<Level>().ok())
        .or_else(|| settings.log_level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn mappings_dir(arg: Option<PathBuf>, settings: &Settings) -> PathBuf {
    arg.or_else(|| settings.mappings_dir.clone())
        .unwrap_or_else(|| PathBuf::from("mappings"))
}

fn validate(dir: &Path) -> Result<()> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| eyre!("Failed to read mapping directory {}: {}", dir.display(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut failures = 0;
    for path in &paths {
        let identifier = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mapping = match loader::load_file(path) {
            Ok(mapping) => mapping,
            Err(e) => {
                failures += 1;
                println!("FAIL {}: {}", identifier, e);
                continue;
            }
        };

        let violations = validation::violations(&mapping);
        if violations.is_empty() {
            println!("ok   {}", identifier);
        } else {
            failures += 1;
            for violation in violations {
                println!(
                    "FAIL {}: invariant #{}: {}",
                    identifier,
                    violation.invariant(),
                    violation
                );
            }
        }
    }

    info!("Validated {} mappings, {} failed", paths.len(), failures);
    if failures > 0 {
        return Err(eyre!("{} of {} mappings failed validation", failures, paths.len()));
    }
    Ok(())
}

fn list(dir: &Path) -> Result<()> {
    let mut registry = MappingRegistry::new();
    loader::load_dir(&mut registry, dir)?;
    for identifier in registry.list() {
        println!("{}", identifier);
    }
    Ok(())
}

fn simulate(
    settings: &Settings,
    dir: &Path,
    identifier: &str,
    hand: Handedness,
    inputs: Vec<(String, RawValues)>,
    asset: Option<&Path>,
) -> Result<()> {
    let mut registry = MappingRegistry::new();
    loader::load_dir(&mut registry, dir)?;

    let mut controller = MotionController::with_settings(hand, &settings.engine);
    controller.bind(identifier, &registry)?;

    if let Some(path) = asset {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read asset nodes {}: {}", path.display(), e))?;
        let nodes: HashMap<String, NodePose> = serde_json::from_str(&content)
            .map_err(|e| eyre!("Failed to parse asset nodes {}: {}", path.display(), e))?;
        debug!("Loaded {} asset nodes", nodes.len());
        controller.attach_asset(Arc::new(nodes))?;
    }

    let snapshot = inputs
        .into_iter()
        .fold(RawSnapshot::new(), |snapshot, (id, values)| snapshot.with(id, values));
    let output = controller.update(&snapshot)?;

    let mapping = registry.lookup(identifier)?;
    if let Some(hand_entry) = mapping.hand(hand) {
        for &index in &hand_entry.components {
            let (Some(component), Some(state)) =
                (mapping.component(index), controller.component_state(index))
            else {
                continue;
            };
            let source = mapping
                .data_source(component.data_source)
                .map(|s| s.id.as_str())
                .unwrap_or("?");
            println!("component {} ({:?}, {}): {}", index, component.component_type, source, state);
        }
    }

    for update in &output.updates {
        match update.value {
            NodeValue::Pose(pose) => println!(
                "node {} weight {:.3} translation {} rotation {}",
                update.node, update.weight, pose.translation, pose.rotation
            ),
            NodeValue::Visible(visible) => println!(
                "node {} weight {:.3} visible {}",
                update.node, update.weight, visible
            ),
        }
    }
    for skipped in &output.skipped {
        println!(
            "skipped visual response {}: missing node {}",
            skipped.visual_response, skipped.node
        );
    }

    controller.dispose();
    Ok(())
}

fn parse_input(s: &str) -> Result<(String, RawValues), String> {
    let (id, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <dataSource>=<values>, got '{}'", s))?;

    let numbers = values
        .split(',')
        .map(|v| {
            let v = v.trim();
            if v.is_empty() {
                Ok(None)
            } else {
                v.parse::<f32>()
                    .map(Some)
                    .map_err(|e| format!("invalid number '{}': {}", v, e))
            }
        })
        .collect::<Result<Vec<Option<f32>>, String>>()?;

    let raw = RawValues {
        button: numbers.first().copied().flatten(),
        x_axis: numbers.get(1).copied().flatten(),
        y_axis: numbers.get(2).copied().flatten(),
        touched: false,
    };
    Ok((id.to_string(), raw))
}
