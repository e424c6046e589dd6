use anyhow::{Context, bail};
use annolens::config::{AnnolensConfig, OutputConfig};
use annolens::engine::{NormalizationEngine, NormalizeError};
use annolens::features::{ALL_FEATURES, FeatureSet};
use annolens::geometry::{OverlayBox, OverlayKind};
use annolens::present::{self, Scored};
use annolens::schema::{AnnotationResult, ImageDimensions};
use annolens::session::{Completion, DisplaySession, ImageSource};
use clap::{Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use serde_json::{Value, json};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "annolens",
    about = "Normalize image-annotation responses and place detection overlays",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Read configuration from PATH instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw annotation response
    Normalize(NormalizeArgs),
    /// Compute overlay rectangles for detected regions
    Overlay(OverlayArgs),
    /// List the feature kinds that can be requested
    Features,
    /// Print the JSON schema of the normalized result
    Schema,
}

#[derive(Args, Clone)]
struct NormalizeArgs {
    /// Response JSON file, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Comma-separated features that were requested
    #[arg(long, value_name = "list")]
    features: Option<String>,

    /// Output JSON (stable schema)
    #[arg(long)]
    json: bool,

    /// Plain `key = value` lines without colors/headers
    #[arg(long, conflicts_with = "json")]
    raw: bool,
}

#[derive(Args, Clone)]
struct OverlayArgs {
    /// Response JSON file, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Natural image width in pixels
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Natural image height in pixels
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Comma-separated features that were requested
    #[arg(long, value_name = "list")]
    features: Option<String>,

    /// Highlight the entry at this list index
    #[arg(long, value_name = "INDEX")]
    select: Option<usize>,

    /// Place face regions instead of objects
    #[arg(long)]
    faces: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

const EXIT_MALFORMED: i32 = 1;
const EXIT_USAGE: i32 = 2;
/// Output could not be serialized.
const EXIT_INTERNAL: i32 = 3;

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, i32> {
    serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error: failed to serialize output: {}", e);
        EXIT_INTERNAL
    })
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnnolensConfig, i32> {
    match path {
        Some(path) => AnnolensConfig::load_from(path).map_err(|e| {
            eprintln!("Error: {}", e);
            EXIT_USAGE
        }),
        None => Ok(AnnolensConfig::load()),
    }
}

fn resolve_features(flag: Option<&str>, config: &AnnolensConfig) -> Result<FeatureSet, i32> {
    match flag {
        Some(list) => FeatureSet::parse_list(list).map_err(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Known features: {}",
                ALL_FEATURES
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            EXIT_USAGE
        }),
        None => Ok(config.normalize.features.clone()),
    }
}

fn read_payload(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let stdin = std::io::stdin();
            if input.is_none() && stdin.is_terminal() {
                bail!("no input: pass a FILE or pipe JSON on stdin");
            }
            let mut text = String::new();
            stdin
                .lock()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Parse the payload text; invalid JSON counts as a malformed payload.
fn parse_payload(input: Option<&Path>) -> Result<Value, i32> {
    let text = read_payload(input).map_err(|e| {
        eprintln!("Error: {:#}", e);
        EXIT_USAGE
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: {}", NormalizeError::from(e));
        EXIT_MALFORMED
    })
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

fn push_line(out: &mut String, line: impl AsRef<str>) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(line.as_ref());
}

fn render_scored_rows(out: &mut String, rows: &[(String, f64)], color: bool) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, confidence) in rows {
        let value = format!("{:.2}", confidence);
        let value = if color {
            value.green().to_string()
        } else {
            value
        };
        push_line(out, format!("  {:<width$}  {}", label, value, width = width));
    }
}

fn ordered<T: Scored>(entries: &[T], sort: bool) -> Vec<&T> {
    present::display_order(entries, sort)
        .into_iter()
        .filter_map(|index| entries.get(index))
        .collect()
}

fn render_human(result: &AnnotationResult, output: &OutputConfig, color: bool) -> String {
    let mut out = String::new();
    let sort = output.sort_by_confidence;

    if let Some(objects) = &result.objects {
        push_line(&mut out, heading("Objects:", color));
        if objects.is_empty() {
            push_line(&mut out, "  No objects detected.");
        } else {
            let rows: Vec<(String, f64)> = ordered(objects, sort)
                .into_iter()
                .map(|o| (o.label.clone(), o.confidence))
                .collect();
            render_scored_rows(&mut out, &rows, color);
            if output.show_top_result
                && let Some(summary) = present::top_result(objects)
            {
                push_line(&mut out, format!("  {}", summary));
            }
        }
    }

    if let Some(labels) = &result.labels {
        push_line(&mut out, heading("Labels:", color));
        if labels.is_empty() {
            push_line(&mut out, "  No labels detected.");
        } else {
            let rows: Vec<(String, f64)> = ordered(labels, sort)
                .into_iter()
                .map(|l| (l.label.clone(), l.confidence))
                .collect();
            render_scored_rows(&mut out, &rows, color);
        }
    }

    if let Some(faces) = &result.faces {
        push_line(&mut out, heading("Faces:", color));
        if faces.is_empty() {
            push_line(&mut out, "  No faces detected.");
        } else {
            let rows: Vec<(String, f64)> = ordered(faces, sort)
                .into_iter()
                .enumerate()
                .map(|(i, f)| (present::face_label(i), f.detection_confidence))
                .collect();
            render_scored_rows(&mut out, &rows, color);
        }
    }

    if let Some(scores) = &result.safe_search {
        push_line(&mut out, heading("Safe search:", color));
        for row in present::safe_search_rows(scores) {
            push_line(
                &mut out,
                format!("  {:<8}  {} ({:.0}%)", row.category, row.level, row.percent),
            );
        }
    }

    if let Some(profile) = &result.image_properties {
        push_line(&mut out, heading("Image properties:", color));
        if profile.colors.is_empty() {
            push_line(&mut out, "  No dominant colors.");
        }
        for row in present::color_rows(profile) {
            let swatch = if color {
                let c = row.color;
                format!("{} ", "██".truecolor(c.red, c.green, c.blue))
            } else {
                String::new()
            };
            push_line(
                &mut out,
                format!("  {}{}  {}  border {}", swatch, row.rgb, row.percent, row.border),
            );
        }
    }

    out
}

fn render_raw(result: &AnnotationResult) -> String {
    let mut out = String::new();
    for (i, o) in result.objects().iter().enumerate() {
        push_line(&mut out, format!("objects.{}.label = {}", i, o.label));
        push_line(&mut out, format!("objects.{}.confidence = {}", i, o.confidence));
    }
    for (i, l) in result.labels().iter().enumerate() {
        push_line(&mut out, format!("labels.{}.label = {}", i, l.label));
        push_line(&mut out, format!("labels.{}.confidence = {}", i, l.confidence));
    }
    for (i, f) in result.faces().iter().enumerate() {
        push_line(
            &mut out,
            format!("faces.{}.detection_confidence = {}", i, f.detection_confidence),
        );
    }
    if let Some(scores) = &result.safe_search {
        for (category, likelihood) in scores.categories() {
            push_line(
                &mut out,
                format!("safe_search.{} = {}", category.to_lowercase(), likelihood.level()),
            );
        }
    }
    if let Some(profile) = &result.image_properties {
        for (i, c) in profile.colors.iter().enumerate() {
            push_line(
                &mut out,
                format!(
                    "image_properties.{}.rgb = {},{},{}",
                    i, c.color.red, c.color.green, c.color.blue
                ),
            );
            push_line(
                &mut out,
                format!("image_properties.{}.pixel_fraction = {}", i, c.pixel_fraction),
            );
        }
    }
    out
}

fn want_color(choice: ColorChoice, config: &AnnolensConfig) -> bool {
    !matches!(choice, ColorChoice::Never)
        && config.output.color
        && supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn run_normalize(args: NormalizeArgs, config: &AnnolensConfig, color: ColorChoice) -> Result<(), i32> {
    let requested = resolve_features(args.features.as_deref(), config)?;
    let raw = parse_payload(args.input.as_deref())?;
    let (result, report) = NormalizationEngine::standard()
        .normalize_with_report(&raw, &requested)
        .map_err(|e| {
            eprintln!("Error: {}", e);
            EXIT_MALFORMED
        })?;
    if report.dropped() > 0 {
        log::info!("{} malformed entries dropped", report.dropped());
    }

    if args.json {
        let rendered = to_pretty_json(&result)?;
        println!("{}", rendered);
    } else if args.raw {
        println!("{}", render_raw(&result));
    } else {
        println!(
            "{}",
            render_human(&result, &config.output, want_color(color, config))
        );
    }
    Ok(())
}

fn describe_overlay(b: &OverlayBox) -> String {
    format!(
        "left={:.2}% top={:.2}% width={:.2}% height={:.2}%",
        b.rect.left_percent, b.rect.top_percent, b.rect.width_percent, b.rect.height_percent
    )
}

fn run_overlay(args: OverlayArgs, config: &AnnolensConfig) -> Result<(), i32> {
    let requested = resolve_features(args.features.as_deref(), config)?;
    let raw = parse_payload(args.input.as_deref())?;
    let kind = if args.faces {
        OverlayKind::Face
    } else {
        OverlayKind::Object
    };

    let mut session = DisplaySession::new();
    session.set_sort_by_confidence(config.output.sort_by_confidence);
    let file_name = args
        .input
        .as_ref()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string());
    session.set_image_source(ImageSource::Upload { file_name });
    session.set_image_dimensions(ImageDimensions::new(args.width, args.height));
    session.show_overlays_for(kind);
    let ticket = session.begin_request(requested);
    let result = match session.complete(&ticket, &raw) {
        Ok(Completion::Displayed(result)) => result,
        Ok(Completion::Stale) => return Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(EXIT_MALFORMED);
        }
    };
    if let Some(row) = args.select {
        session.hover(row);
    }
    let boxes = session.overlays();

    if args.json {
        let v = json!({
            "dimensions": session.dimensions(),
            "highlight": session.highlight(),
            "order": session.display_order(),
            "overlays": boxes,
        });
        let rendered = to_pretty_json(&v)?;
        println!("{}", rendered);
        return Ok(());
    }

    let order = session.display_order();
    let name = match kind {
        OverlayKind::Object => "object",
        OverlayKind::Face => "face",
    };
    if order.is_empty() {
        println!("No {} regions.", name);
    }
    for (row, index) in order.into_iter().enumerate() {
        let marker = if session.highlight().is_highlighted(row) {
            "*"
        } else {
            " "
        };
        let title = match kind {
            OverlayKind::Object => result
                .objects()
                .get(index)
                .map_or_else(String::new, |o| o.label.clone()),
            OverlayKind::Face => present::face_label(row),
        };
        let placement = boxes
            .iter()
            .find(|b| b.index == row)
            .map_or_else(|| "(no renderable region)".to_string(), describe_overlay);
        println!("{} {} {} {}  {}", marker, name, row, title, placement);
    }
    Ok(())
}

fn list_features() {
    let width = ALL_FEATURES
        .iter()
        .map(|f| f.as_str().len())
        .max()
        .unwrap_or(0);
    for feature in ALL_FEATURES {
        println!("{:<width$}  {}", feature.as_str(), feature.label(), width = width);
    }
}

fn print_schema() -> Result<(), i32> {
    let schema = schemars::schema_for!(AnnotationResult);
    let rendered = to_pretty_json(&schema)?;
    println!("{}", rendered);
    Ok(())
}

fn detect_color_choice() -> ColorChoice {
    // Scan args before clap so help/errors honor `--no-color`.
    // Mirror clap's parsing by stopping at `--` which terminates flags.
    let mut args = std::env::args_os();
    args.next();
    let mut flag = false;
    for arg in args {
        if arg == "--" {
            break;
        }
        if arg == "--no-color" {
            flag = true;
            break;
        }
    }
    if flag || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn run(cli: Cli, color: ColorChoice) -> Result<(), i32> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Some(Commands::Normalize(args)) => run_normalize(args, &config, color),
        Some(Commands::Overlay(args)) => run_overlay(args, &config),
        Some(Commands::Features) => {
            list_features();
            Ok(())
        }
        Some(Commands::Schema) => print_schema(),
        None => Ok(()),
    }
}

fn main() {
    let color = detect_color_choice();
    let matches = Cli::command().color(color).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(cli.verbose);
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        color
    };
    if let Err(code) = run(cli, color) {
        std::process::exit(code);
    }
}
