use rackdraw::render::raster::{self, RasterError, RasterOptions};
use rackdraw::render::{
    Diagram, HeadlessError, HeadlessRenderer, SvgRenderOptions, render_svg, sanitize_svg_id,
};
use rackdraw::{
    Classification, DeviceKind, Diagnostic, HeightClass, HeightClassifier, Inventory, RackConfig,
    parse_position,
};
use serde::Serialize;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Inventory(rackdraw::Error),
    Render(HeadlessError),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Inventory(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rackdraw::Error> for CliError {
    fn from(value: rackdraw::Error) -> Self {
        Self::Inventory(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Parse,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl RenderFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    content_width: Option<f64>,
    content_height: Option<f64>,
    diagram_id: Option<String>,
    out: Option<String>,
}

/// One row of `parse` output: what the position parser and height classifier made of a device.
#[derive(Serialize)]
struct ParsedDevice<'a> {
    kind: DeviceKind,
    id: &'a str,
    model: &'a str,
    position: &'a str,
    top_unit: Option<u8>,
    position_error: Option<String>,
    height: HeightClass,
    height_defaulted: bool,
}

#[derive(Serialize)]
struct ParseOut<'a> {
    rack_name: Option<&'a str>,
    devices: Vec<ParsedDevice<'a>>,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    #[serde(flatten)]
    diagram: &'a Diagram,
    asset_diagnostics: &'a [Diagnostic],
}

fn usage() -> &'static str {
    "rackdraw-cli\n\
\n\
USAGE:\n\
  rackdraw-cli [parse] [--pretty] [--config <path>] [<path>|-]\n\
  rackdraw-cli layout [--pretty] [--assets <dir>] [--config <path>] [--width <w>] [--height <h>] [<path>|-]\n\
  rackdraw-cli render [--format svg|png|jpg|pdf] [--scale <n>] [--background <css-color>] [--assets <dir>] [--config <path>] [--width <w>] [--height <h>] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the inventory (JSON or YAML) is read from stdin.\n\
  - parse prints the parsed position and height of every device as JSON.\n\
  - layout prints the finished diagram (placements, primitives, diagnostics) as JSON.\n\
  - --width/--height fit the diagram into that content area, keeping its aspect ratio.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG/PDF output defaults to writing next to the input file (or ./out.<ext> for stdin).\n\
  - Set RUST_LOG (e.g. RUST_LOG=rackdraw=debug) to see diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_length(raw: &str) -> Result<f64, CliError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(CliError::Usage(usage())),
    }
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Parse,
        render_format: RenderFormat::Svg,
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--assets" => args.assets = Some(PathBuf::from(next_value(&mut it)?)),
            "--config" => args.config = Some(PathBuf::from(next_value(&mut it)?)),
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--width" => args.content_width = Some(parse_length(next_value(&mut it)?)?),
            "--height" => args.content_height = Some(parse_length(next_value(&mut it)?)?),
            "--id" => args.diagram_id = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => Path::new(path).with_extension(ext),
        _ => PathBuf::from(format!("out.{ext}")),
    }
}

fn load_config(path: Option<&Path>) -> Result<RackConfig, CliError> {
    Ok(match path {
        Some(path) => RackConfig::load_overrides(path)?,
        None => RackConfig::default(),
    })
}

fn parse_inventory<'a>(inventory: &'a Inventory, classifier: &HeightClassifier) -> ParseOut<'a> {
    let devices = inventory
        .devices()
        .map(|(kind, dev)| {
            let parsed = parse_position(&dev.position);
            let classification = classifier.classify(&dev.model);
            ParsedDevice {
                kind,
                id: &dev.id,
                model: &dev.model,
                position: &dev.position,
                top_unit: parsed.as_ref().ok().map(|u| u.get()),
                position_error: parsed.err().map(|e| e.to_string()),
                height: classification.height(),
                height_defaulted: matches!(classification, Classification::Defaulted),
            }
        })
        .collect();
    ParseOut {
        rack_name: inventory.rack_name.as_deref(),
        devices,
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let inventory = Inventory::from_str_auto(&text)?;
    tracing::debug!(
        compute = inventory.compute.len(),
        storage = inventory.storage.len(),
        "inventory loaded"
    );

    match args.command {
        Command::Parse => {
            let config = load_config(args.config.as_deref())?;
            let classifier = HeightClassifier::from_config(&config);
            write_json(&parse_inventory(&inventory, &classifier), args.pretty)
        }
        Command::Layout => {
            let renderer =
                HeadlessRenderer::from_paths(args.assets.as_deref(), args.config.as_deref())?
                    .with_content_area(args.content_width, args.content_height);
            let diagram = renderer.layout(&inventory);
            let out = LayoutOut {
                diagram: &diagram,
                asset_diagnostics: renderer.engine.asset_diagnostics(),
            };
            write_json(&out, args.pretty)
        }
        Command::Render => {
            let renderer =
                HeadlessRenderer::from_paths(args.assets.as_deref(), args.config.as_deref())?
                    .with_content_area(args.content_width, args.content_height);
            let diagram = renderer.layout(&inventory);

            let diagram_id = args
                .diagram_id
                .as_deref()
                .or(inventory.rack_name.as_deref())
                .map(sanitize_svg_id);
            let svg_options = SvgRenderOptions {
                diagram_id,
                background: args
                    .background
                    .clone()
                    .or_else(|| renderer.svg.background.clone()),
                ..renderer.svg.clone()
            };
            let svg = render_svg(&diagram, &svg_options);

            let raster_options = RasterOptions {
                scale: args.render_scale,
                background: args.background.clone(),
                ..Default::default()
            };
            let bytes = match args.render_format {
                RenderFormat::Svg => return write_text(&svg, args.out.as_deref()),
                RenderFormat::Png => raster::svg_to_png(&svg, &raster_options)?,
                RenderFormat::Jpeg => raster::svg_to_jpeg(&svg, &raster_options)?,
                RenderFormat::Pdf => raster::svg_to_pdf(&svg)?,
            };
            let out = args.out.clone().unwrap_or_else(|| {
                default_raster_out_path(args.input.as_deref(), args.render_format.extension())
                    .to_string_lossy()
                    .to_string()
            });
            tracing::debug!(out = out.as_str(), bytes = bytes.len(), "writing output");
            write_bytes(&bytes, &out)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
