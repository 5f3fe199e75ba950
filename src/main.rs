use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use ctxconf::{ConfigValue, Context, Key, Layers, Settings};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Query and edit layered configuration documents
///
/// Key paths are given as separate arguments: `5` is a point, `a:b` or
/// `a:b:c` a span, `1,2,3` a list of points, anything else a name (or a
/// `begin-end` label inside range-keyed tables).
#[derive(Parser, Debug)]
#[command(name = "ctxconf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration document (.toml or .json); repeat to stack layers,
    /// later layers overriding earlier ones
    #[arg(short = 'L', long = "layer", global = true)]
    layers: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log to file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Settings file (defaults to the usual search locations)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value a key path resolves to
    Get {
        #[arg(required = true)]
        path: Vec<String>,
    },
    /// Assign a value through a key path and save the affected layers
    Set {
        #[arg(required = true)]
        path: Vec<String>,
        /// JSON value; anything that isn't valid JSON is stored as a string
        #[arg(short, long)]
        value: String,
    },
    /// Delete through a key path and save the affected layers
    Delete {
        #[arg(required = true)]
        path: Vec<String>,
    },
    /// List the keys of the top scope, or of the config a key path names
    Keys { path: Vec<String> },
    /// Print the (begin, end, value) triples of a range-keyed config
    Snapshot {
        #[arg(required = true)]
        path: Vec<String>,
    },
}

/// Level from `--log-level`, then settings, then `warn`. Unparseable names
/// fall back to `warn`.
fn resolve_level(cli: Option<&str>, settings: &Settings) -> Level {
    cli.or(settings.log_level.as_deref())
        .and_then(|raw| raw.parse::<Level>().ok())
        .unwrap_or(Level::WARN)
}

/// `RUST_LOG` directives win over `level` when set
fn setup_logging(level: Level, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = fmt().with_env_filter(filter).with_target(true);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn parse_path(tokens: &[String]) -> Result<Vec<Key>> {
    tokens
        .iter()
        .map(|t| t.parse::<Key>().map_err(Into::into))
        .collect()
}

fn parse_value(raw: &str) -> Result<ConfigValue> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Ok(ConfigValue::from_json(json)?),
        Err(_) => Ok(ConfigValue::from(raw)),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}

fn run(args: Args, settings: Settings) -> Result<()> {
    let mut paths = settings.layers.clone();
    paths.extend(args.layers);
    if paths.is_empty() {
        bail!("No configuration documents given (use --layer or list layers in settings)");
    }

    let mut layers = Layers::open(&paths)?;
    let top = layers.top();
    debug!("Opened layers: {:?}", layers);

    match args.command {
        Command::Get { path } => {
            let keys = parse_path(&path)?;
            let value = top.borrow().get(&keys)?;
            print_json(&value.to_json(), settings.pretty)?;
        }
        Command::Set { path, value } => {
            let keys = parse_path(&path)?;
            let value = parse_value(&value)?;
            top.borrow_mut().set(&keys, value)?;
            for written in layers.save_changed()? {
                info!("Wrote {}", written.display());
            }
        }
        Command::Delete { path } => {
            let keys = parse_path(&path)?;
            top.borrow_mut().delete(&keys)?;
            for written in layers.save_changed()? {
                info!("Wrote {}", written.display());
            }
        }
        Command::Keys { path } => {
            let keys = parse_path(&path)?;
            let listed = if keys.is_empty() {
                top.borrow().keys()
            } else {
                let value = top.borrow().get(&keys)?;
                match value.as_context() {
                    Some(nested) => nested.keys(),
                    None => bail!("{} is a {}, not a config", path.join(" "), value.type_name()),
                }
            };
            for key in listed {
                println!("{}", key);
            }
        }
        Command::Snapshot { path } => {
            let keys = parse_path(&path)?;
            let value = top.borrow().get(&keys)?;
            let ranges = value
                .as_ranges()
                .with_context(|| format!("{} is not a range-keyed config", path.join(" ")))?;
            print_json(&serde_json::to_value(ranges.snapshot())?, settings.pretty)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::from_path(path)?,
        None => Settings::discover()?,
    };

    let level = resolve_level(args.log_level.as_deref(), &settings);
    setup_logging(level, args.log_file.as_deref())?;

    info!("Starting ctxconf v{}", env!("CARGO_PKG_VERSION"));

    run(args, settings)
}
