use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use fitroom_contracts::catalog::{BACKGROUND_CATALOG, POSE_CATALOG};
use fitroom_contracts::chat::{parse_command, Intent, STUDIO_HELP_COMMANDS};
use fitroom_contracts::studio::{
    BackgroundMode, InspireTarget, PoseMode, PoseSpec, ProductStatus, Slot, DEFAULT_POSE_DESCRIPTION,
};
use fitroom_contracts::theme::Theme;
use fitroom_engine::{EngineConfig, StudioEngine};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "fitroom=info";

#[derive(Debug, Parser)]
#[command(name = "fitroom", version, about = "Virtual try-on studio")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    provider: Option<String>,
    #[arg(long, global = true)]
    image_model: Option<String>,
    #[arg(long, global = true)]
    text_model: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session driven by slash commands.
    Studio(StudioArgs),
    /// One-shot try-on with automatic product approval.
    Run(RunArgs),
    Gallery(GalleryArgs),
    Theme(ThemeArgs),
    /// List the pose and background catalogs.
    Catalog,
}

#[derive(Debug, Parser)]
struct StudioArgs {
    /// Directory that `/download` writes into.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct RunArgs {
    #[arg(long)]
    face: PathBuf,
    #[arg(long)]
    product: PathBuf,
    #[arg(long)]
    pose: Option<u32>,
    #[arg(long)]
    pose_text: Option<String>,
    #[arg(long)]
    pose_image: Option<PathBuf>,
    #[arg(long)]
    background: Option<u32>,
    #[arg(long)]
    background_text: Option<String>,
    #[arg(long)]
    background_image: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    variations: u8,
    #[arg(long)]
    out: PathBuf,
    /// Also store every result in the gallery.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Parser)]
struct GalleryArgs {
    #[command(subcommand)]
    action: GalleryAction,
}

#[derive(Debug, Subcommand)]
enum GalleryAction {
    List,
    /// Remove one entry, 1-based.
    Delete { position: usize },
    Clear,
    /// Write entries as PNG files; all of them unless a position is given.
    Export {
        #[arg(long)]
        out: PathBuf,
        position: Option<usize>,
    },
}

#[derive(Debug, Parser)]
struct ThemeArgs {
    /// light, dark or toggle; prints the current theme when omitted.
    value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("fitroom error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = resolve_config(&cli.global);
    tracing::debug!(provider = %config.provider, data_dir = %config.data_dir.display(), "config resolved");
    match cli.command {
        Command::Studio(args) => {
            run_studio(&config, &args)?;
            Ok(0)
        }
        Command::Run(args) => run_once(&config, &args),
        Command::Gallery(args) => run_gallery(&config, args.action),
        Command::Theme(args) => run_theme(&config, args.value.as_deref()),
        Command::Catalog => {
            print_catalog();
            Ok(0)
        }
    }
}

fn resolve_config(global: &GlobalArgs) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(data_dir) = global.data_dir.clone() {
        config.data_dir = data_dir;
    }
    if let Some(provider) = global.provider.as_deref() {
        config.provider = provider.trim().to_ascii_lowercase();
    }
    if let Some(model) = global.image_model.clone() {
        config.image_model = model;
    }
    if let Some(model) = global.text_model.clone() {
        config.text_model = model;
    }
    config
}

fn run_studio(config: &EngineConfig, args: &StudioArgs) -> Result<()> {
    let mut engine = StudioEngine::open(config)?;
    let stdin = io::stdin();
    let mut line = String::new();

    println!(
        "Fitroom studio ({}) started. Type /help for commands.",
        engine.service_name()
    );

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let intent = parse_command(line.trim_end_matches(['\n', '\r']));
        if intent.action == "noop" {
            continue;
        }
        engine.studio_mut().clear_error();
        match handle_intent(&mut engine, &intent, &args.out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => println!("{err:#}"),
        }
        if let Some(banner) = engine.studio().error() {
            println!("Error: {banner}");
        }
    }
    Ok(())
}

fn handle_intent(engine: &mut StudioEngine, intent: &Intent, out_dir: &Path) -> Result<Flow> {
    match intent.action.as_str() {
        "help" => println!("Commands: {}", STUDIO_HELP_COMMANDS.join(" ")),
        "quit" => return Ok(Flow::Quit),
        "status" => print_status(engine),
        "list_poses" | "list_backgrounds" => print_catalog(),
        "upload_face" => {
            let path = required_path(intent, "/face")?;
            report_upload(engine.upload_face(&path)?, "Face", &path);
        }
        "upload_product" => {
            let path = required_path(intent, "/product")?;
            if engine.upload_product(&path)? {
                if engine.studio().product_status() == ProductStatus::PendingApproval {
                    println!("Rendered product ready. Use /approve to accept it or /reject to start over.");
                }
            } else {
                report_upload(false, "Product", &path);
            }
        }
        "approve_product" => {
            engine.approve_product()?;
            println!("Product approved.");
        }
        "reset_product" => {
            engine.reset_product()?;
            println!("Product cleared.");
        }
        "set_pose_mode" => {
            let raw = text_arg(intent, "mode");
            let Some(mode) = PoseMode::parse(&raw) else {
                bail!("/pose_mode expects select, describe or upload");
            };
            engine.studio_mut().set_pose_mode(mode)?;
            println!("Pose mode: {}", mode.as_str());
        }
        "select_pose" => {
            let id = u32_arg(intent, "/pose <id>")?;
            engine.studio_mut().select_pose(id)?;
            println!("Pose {id} selected.");
        }
        "set_pose_text" => {
            let text = text_arg(intent, "text");
            engine.studio_mut().set_pose_text(text);
            println!("Pose description set.");
        }
        "upload_pose" => {
            let path = required_path(intent, "/pose_image")?;
            if engine.upload_pose(&path)? {
                println!("Pose: {}", engine.studio().pose().text());
            } else {
                report_upload(false, "Pose", &path);
            }
        }
        "set_background_mode" => {
            let raw = text_arg(intent, "mode");
            let Some(mode) = BackgroundMode::parse(&raw) else {
                bail!("/background_mode expects none, select, upload or describe");
            };
            engine.studio_mut().set_background_mode(mode);
            println!("Background mode: {}", mode.as_str());
        }
        "select_background" => {
            let id = u32_arg(intent, "/background <id>")?;
            engine.studio_mut().select_background(id)?;
            println!("Background {id} selected.");
        }
        "set_background_text" => {
            let text = text_arg(intent, "text");
            engine.studio_mut().set_background_text(text);
            println!("Background description set.");
        }
        "upload_background" => {
            let path = required_path(intent, "/background_image")?;
            report_upload(engine.upload_background(&path)?, "Background", &path);
        }
        "set_variations" => {
            let requested = u32_arg(intent, "/variations <1-4>")?;
            let applied = engine
                .studio_mut()
                .set_variations(u8::try_from(requested).unwrap_or(u8::MAX));
            println!("Variations: {applied}");
        }
        "inspire_pose" => {
            engine.inspire(InspireTarget::Pose)?;
            if engine.studio().error().is_none() {
                println!("Pose idea: {}", engine.studio().pose().text());
            }
        }
        "inspire_background" => {
            engine.inspire(InspireTarget::Background)?;
            if engine.studio().error().is_none() {
                println!("Background idea: {}", engine.studio().background().text());
            }
        }
        "generate" => {
            let count = engine.generate()?;
            if count > 0 {
                println!("Generated {count} image(s). Use /save <n> or /download <n>.");
            }
        }
        "save_result" => {
            let index = position_arg(intent, "/save <n>")?;
            if engine.save_result(index)? {
                println!("Saved result {} to the gallery.", index + 1);
            } else {
                println!("Result {} is already saved ✓", index + 1);
            }
        }
        "download_result" => {
            let index = position_arg(intent, "/download <n>")?;
            let path = engine.download_result(index, out_dir)?;
            println!("Downloaded {}", path.display());
        }
        "show_gallery" => print_gallery(engine),
        "gallery_delete" => {
            let index = position_arg(intent, "/gallery_delete <n>")?;
            if engine.studio_mut().gallery_mut().delete(index).is_none() {
                bail!("no gallery entry at position {}", index + 1);
            }
            println!("Deleted gallery entry {}.", index + 1);
        }
        "gallery_clear" => {
            engine.studio_mut().gallery_mut().clear_all();
            println!("Gallery cleared.");
        }
        "set_theme" => {
            let theme = apply_theme(engine, &text_arg(intent, "theme"))?;
            println!("Theme: {}", theme.as_str());
        }
        "unknown" => {
            let command = text_arg(intent, "command");
            println!("Unknown command /{command}. Type /help for commands.");
        }
        other => println!("Unsupported action {other}"),
    }
    Ok(Flow::Continue)
}

fn run_once(config: &EngineConfig, args: &RunArgs) -> Result<i32> {
    let mut engine = StudioEngine::open(config)?;
    if !engine.upload_face(&args.face)? {
        bail!("{} is not an image", args.face.display());
    }
    if !engine.upload_product(&args.product)? {
        bail!("{} is not an image", args.product.display());
    }
    if let Some(banner) = engine.studio().error() {
        bail!("product render failed: {banner}");
    }
    engine.approve_product()?;

    let studio = engine.studio_mut();
    studio.set_variations(args.variations);
    if let Some(text) = args.pose_text.as_deref() {
        studio.set_pose_text(text);
    }
    if let Some(id) = args.pose {
        studio.select_pose(id)?;
    }
    if let Some(id) = args.background {
        studio.select_background(id)?;
    }
    if let Some(text) = args.background_text.as_deref() {
        studio.set_background_text(text);
    }
    if let Some(path) = args.background_image.as_deref() {
        engine.upload_background(path)?;
    }
    if let Some(path) = args.pose_image.as_deref() {
        engine.studio_mut().set_pose_mode(PoseMode::Upload)?;
        engine.upload_pose(path)?;
    }
    if matches!(engine.studio().pose().spec(), PoseSpec::Catalog(None)) {
        engine.studio_mut().set_pose_text(DEFAULT_POSE_DESCRIPTION);
    }

    let count = engine.generate()?;
    if let Some(banner) = engine.studio().error() {
        eprintln!("Generation failed: {banner}");
        return Ok(1);
    }
    for index in 0..count {
        let path = engine.download_result(index, &args.out)?;
        println!("{}", path.display());
        if args.save {
            engine.save_result(index)?;
        }
    }
    Ok(0)
}

fn run_gallery(config: &EngineConfig, action: GalleryAction) -> Result<i32> {
    let mut engine = StudioEngine::open(config)?;
    match action {
        GalleryAction::List => print_gallery(&engine),
        GalleryAction::Delete { position } => {
            let index = one_based(position)?;
            if engine.studio_mut().gallery_mut().delete(index).is_none() {
                bail!("no gallery entry at position {position}");
            }
            println!("Deleted gallery entry {position}.");
        }
        GalleryAction::Clear => {
            engine.studio_mut().gallery_mut().clear_all();
            println!("Gallery cleared.");
        }
        GalleryAction::Export { out, position } => {
            let indexes: Vec<usize> = match position {
                Some(position) => vec![one_based(position)?],
                None => (0..engine.studio().gallery().len()).collect(),
            };
            for index in indexes {
                let path = engine.export_gallery_entry(index, &out)?;
                println!("{}", path.display());
            }
        }
    }
    Ok(0)
}

fn run_theme(config: &EngineConfig, value: Option<&str>) -> Result<i32> {
    let mut engine = StudioEngine::open(config)?;
    let theme = match value {
        Some(raw) => apply_theme(&mut engine, raw)?,
        None => engine.studio().theme(),
    };
    println!("{}", theme.as_str());
    Ok(0)
}

fn apply_theme(engine: &mut StudioEngine, raw: &str) -> Result<Theme> {
    let preference = engine.studio_mut().theme_mut();
    if raw.trim().eq_ignore_ascii_case("toggle") || raw.trim().is_empty() {
        return Ok(preference.toggle());
    }
    let Some(theme) = Theme::parse(raw) else {
        bail!("theme must be light, dark or toggle");
    };
    preference.set(theme);
    Ok(theme)
}

fn print_status(engine: &StudioEngine) {
    let studio = engine.studio();
    println!("Service: {}", engine.service_name());
    println!(
        "Face: {}",
        if studio.face().is_some() { "loaded" } else { "missing" }
    );
    println!("Product: {}", studio.product_status().as_str());
    println!(
        "Pose: {} ({})",
        studio.pose().mode().as_str(),
        non_empty_or(studio.pose().text(), "no description")
    );
    println!(
        "Background: {} ({})",
        studio.background().mode().as_str(),
        non_empty_or(studio.background().text(), "no description")
    );
    println!("Variations: {}", studio.variations());
    let busy: Vec<&str> = [
        Slot::ProductRender,
        Slot::PoseDescription,
        Slot::Inspire,
        Slot::Generation,
    ]
    .into_iter()
    .filter(|slot| studio.is_busy(*slot))
    .map(Slot::label)
    .collect();
    if !busy.is_empty() {
        println!("Busy: {}", busy.join(", "));
    }
    match studio.results() {
        Some(results) => {
            for index in 0..results.len() {
                let mark = if studio.is_result_saved(index) { " saved ✓" } else { "" };
                println!("Result {}{mark}", index + 1);
            }
        }
        None => println!("Results: none"),
    }
    match studio.can_generate() {
        Ok(()) => println!("Ready to generate."),
        Err(reason) => println!("Not ready: {reason}"),
    }
    println!("Gallery: {} saved", studio.gallery().len());
    println!("Theme: {}", studio.theme().as_str());
}

fn print_gallery(engine: &StudioEngine) {
    let entries = engine.studio().gallery().entries();
    if entries.is_empty() {
        println!("Gallery is empty.");
        return;
    }
    for (idx, entry) in entries.iter().enumerate() {
        println!("{}. {} bytes of encoded image", idx + 1, entry.len());
    }
}

fn print_catalog() {
    println!("Poses:");
    for entry in POSE_CATALOG {
        println!("  {}. {}: {}", entry.id, entry.name, entry.description);
    }
    println!("Backgrounds:");
    for entry in BACKGROUND_CATALOG {
        println!("  {}. {}: {}", entry.id, entry.name, entry.description);
    }
}

fn report_upload(accepted: bool, label: &str, path: &Path) {
    if accepted {
        println!("{label} loaded from {}", path.display());
    } else {
        println!("Ignored {}: not an image file", path.display());
    }
}

fn required_path(intent: &Intent, usage: &str) -> Result<PathBuf> {
    let path = text_arg(intent, "path");
    if path.is_empty() {
        bail!("{usage} requires a path");
    }
    Ok(PathBuf::from(path))
}

fn text_arg(intent: &Intent, key: &str) -> String {
    intent
        .command_args
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn u32_arg(intent: &Intent, usage: &str) -> Result<u32> {
    intent
        .command_args
        .get("index")
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| anyhow::anyhow!("usage: {usage}"))
}

fn position_arg(intent: &Intent, usage: &str) -> Result<usize> {
    let position = intent
        .command_args
        .get("index")
        .and_then(Value::as_u64)
        .and_then(|value| usize::try_from(value).ok())
        .ok_or_else(|| anyhow::anyhow!("usage: {usage}"))?;
    one_based(position)
}

fn one_based(position: usize) -> Result<usize> {
    if position == 0 {
        bail!("positions start at 1");
    }
    Ok(position - 1)
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use fitroom_contracts::chat::parse_command;
    use fitroom_contracts::studio::{PoseMode, ProductStatus};
    use fitroom_contracts::theme::Theme;
    use fitroom_engine::{EngineConfig, StudioEngine};

    use super::{handle_intent, one_based, resolve_config, Flow, GlobalArgs};

    fn dryrun_engine(dir: &Path) -> anyhow::Result<StudioEngine> {
        StudioEngine::open(&EngineConfig {
            provider: "dryrun".to_string(),
            data_dir: dir.join("data"),
            ..EngineConfig::default()
        })
    }

    fn send(engine: &mut StudioEngine, line: &str, out: &Path) -> anyhow::Result<Flow> {
        handle_intent(engine, &parse_command(line), out)
    }

    #[test]
    fn positions_are_one_based() -> anyhow::Result<()> {
        assert_eq!(one_based(1)?, 0);
        assert_eq!(one_based(4)?, 3);
        assert!(one_based(0).is_err());
        Ok(())
    }

    #[test]
    fn flags_override_environment_config() {
        let config = resolve_config(&GlobalArgs {
            data_dir: Some("/tmp/fitroom-flags".into()),
            provider: Some(" DryRun ".to_string()),
            image_model: Some("img-x".to_string()),
            text_model: None,
        });
        assert_eq!(config.provider, "dryrun");
        assert_eq!(config.image_model, "img-x");
        assert_eq!(config.data_dir, Path::new("/tmp/fitroom-flags"));
    }

    #[test]
    fn slash_commands_drive_a_full_session() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let face = temp.path().join("face.png");
        let product = temp.path().join("shirt.png");
        fs::write(&face, b"face")?;
        fs::write(&product, b"shirt")?;
        let out = temp.path().join("out");
        let mut engine = dryrun_engine(temp.path())?;

        send(&mut engine, &format!("/face {}", face.display()), &out)?;
        send(&mut engine, &format!("/product {}", product.display()), &out)?;
        assert_eq!(engine.studio().product_status(), ProductStatus::PendingApproval);
        send(&mut engine, "/approve", &out)?;
        send(&mut engine, "/variations 2", &out)?;
        assert_eq!(engine.studio().pose().mode(), PoseMode::Describe);
        send(&mut engine, "striking a confident pose", &out)?;
        send(&mut engine, "/generate", &out)?;
        assert_eq!(engine.studio().results().map(<[String]>::len), Some(2));

        send(&mut engine, "/save 2", &out)?;
        assert!(engine.studio().is_result_saved(1));
        send(&mut engine, "/download 1", &out)?;
        assert!(out.join("virtual-try-on-1.png").exists());

        send(&mut engine, "/theme dark", &out)?;
        assert_eq!(engine.studio().theme(), Theme::Dark);
        assert_eq!(send(&mut engine, "/quit", &out)?, Flow::Quit);
        Ok(())
    }

    #[test]
    fn invalid_arguments_are_reported_as_errors() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let out = temp.path().join("out");
        let mut engine = dryrun_engine(temp.path())?;
        assert!(send(&mut engine, "/save 0", &out).is_err());
        assert!(send(&mut engine, "/pose_mode sideways", &out).is_err());
        assert!(send(&mut engine, "/face", &out).is_err());
        assert!(send(&mut engine, "/generate", &out).is_err());
        assert_eq!(send(&mut engine, "/teleport", &out)?, Flow::Continue);
        Ok(())
    }
}
