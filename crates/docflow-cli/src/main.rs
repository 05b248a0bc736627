use docflow_layout::LayoutOptions;
use docflow_layout::config::LayoutConfig;
use docflow_layout::text::{MeasurerKind, TextMeasurer, measurer_for, wrap_text};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DOCFLOW_LOG";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(&'static str),
    #[error("cannot read `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Layout(#[from] docflow_layout::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Measure,
    Wrap,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    text: Option<String>,
    pretty: bool,
    verbose: bool,
    measurer: Option<MeasurerKind>,
    size_px: Option<f64>,
    bold: bool,
    family: Option<String>,
    max_width: Option<f64>,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WrapOut<'a> {
    max_width: f64,
    lines: &'a [docflow_layout::model::Line],
}

fn usage() -> &'static str {
    "docflow\n\
\n\
USAGE:\n\
  docflow [layout] [--pretty] [--measurer glyph|heuristic] [--out <path>] [--verbose] [<path>|-]\n\
  docflow measure [--text <s>] [--size <px>] [--bold] [--family <css-family>] [--measurer glyph|heuristic] [--pretty] [<path>|-]\n\
  docflow wrap --max-width <px> [--text <s>] [--size <px>] [--bold] [--family <css-family>] [--measurer glyph|heuristic] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - layout reads a JSON layout request and prints the layouted document as JSON.\n\
  - A `measurer` key in the request config wins over --measurer.\n\
  - measure and wrap take the text from --text, or from the input.\n\
  - Logging goes to stderr; set DOCFLOW_LOG (e.g. `debug`) or pass --verbose.\n\
"
}

/// Reads the value of a width-like flag: a finite number > 0.
fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let Some(raw) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    let value = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(value.is_finite() && value > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(value)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "measure" => args.command = Command::Measure,
            "wrap" => args.command = Command::Wrap,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--bold" => args.bold = true,
            "--measurer" => {
                let Some(kind) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.measurer = Some(
                    kind.parse::<MeasurerKind>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--size" => args.size_px = Some(next_f64(&mut it)?),
            "--max-width" => args.max_width = Some(next_f64(&mut it)?),
            "--family" => {
                let Some(family) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.family = Some(family.clone());
            }
            "--text" => {
                let Some(text) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.text = Some(text.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Wrap) && args.max_width.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Reads the input file, or stdin when no path (or `-`) is given.
fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input.filter(|path| *path != "-") {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        }),
        None => Ok(std::io::read_to_string(std::io::stdin())?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
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

/// Font flags layered over the library defaults.
fn flag_config(args: &Args) -> LayoutConfig {
    let mut cfg = LayoutConfig::defaults();
    if let Some(size) = args.size_px {
        cfg.set_value("font.sizePx", json!(size));
    }
    if args.bold {
        cfg.set_value("font.bold", json!(true));
    }
    if let Some(family) = &args.family {
        cfg.set_value("font.family", json!(family));
    }
    cfg
}

fn build_text_measurer(kind: Option<MeasurerKind>) -> Arc<dyn TextMeasurer + Send + Sync> {
    measurer_for(kind.unwrap_or_default())
}

/// Text for `measure`/`wrap`; a single trailing newline from a file or pipe is not content.
fn input_text(args: &Args) -> Result<String, CliError> {
    match &args.text {
        Some(text) => Ok(text.clone()),
        None => {
            let mut text = read_input(args.input.as_deref())?;
            if text.ends_with('\n') {
                text.pop();
                if text.ends_with('\r') {
                    text.pop();
                }
            }
            Ok(text)
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    tracing::debug!(command = ?args.command, input = ?args.input, "docflow");
    match args.command {
        Command::Layout => {
            let input = read_input(args.input.as_deref())?;
            let options = LayoutOptions::with_measurer(build_text_measurer(args.measurer));
            let document = docflow_layout::layout_document_json(&input, &options)?;
            write_json(&document, args.pretty, args.out.as_deref())
        }
        Command::Measure => {
            let text = input_text(&args)?;
            let style = flag_config(&args).font()?;
            let measured = build_text_measurer(args.measurer).measure(&text, &style);
            write_json(&measured, args.pretty, args.out.as_deref())
        }
        Command::Wrap => {
            let text = input_text(&args)?;
            let style = flag_config(&args).font()?;
            let max_width = args.max_width.ok_or(CliError::Usage(usage()))?;
            let measurer = build_text_measurer(args.measurer);
            let lines = wrap_text(&text, measurer.as_ref(), &style, max_width)?;
            write_json(
                &WrapOut {
                    max_width,
                    lines: &lines,
                },
                args.pretty,
                args.out.as_deref(),
            )
        }
    }
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
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
