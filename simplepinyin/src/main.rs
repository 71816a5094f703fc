use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use simplepinyin::{Context, Conversion, PinyinConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simplepinyin")]
#[command(about = "Convert pinyin input into ranked Hanzi candidates")]
#[command(version)]
struct Cli {
    /// Directory holding lexicon.fst and lexicon.bincode
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Text phrase table, used when no data directory is given
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert pinyin given as arguments, or one input per stdin line
    Convert {
        /// Text already committed before this input
        #[arg(long, default_value = "")]
        prefix: String,
        /// Print one JSON object per input
        #[arg(long)]
        json: bool,
        /// Show at most this many candidates per input
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        inputs: Vec<String>,
    },
    /// Build lexicon.fst and lexicon.bincode from a text phrase table
    Build {
        /// Input phrase table
        #[arg(short, long)]
        input: PathBuf,
        /// Output data directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct JsonLine<'a> {
    input: &'a str,
    #[serde(flatten)]
    conversion: &'a Conversion,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<PinyinConfig> {
    let Some(path) = path else {
        return Ok(PinyinConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    PinyinConfig::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_context(cli: &Cli) -> Result<Context> {
    let config = load_config(cli.config.as_deref())?;
    let source = cli
        .data_dir
        .as_deref()
        .or(cli.table.as_deref())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "demo lexicon".into());
    Context::open(cli.data_dir.as_deref(), cli.table.as_deref(), config)
        .with_context(|| format!("loading {source}"))
}

fn print_conversion(
    out: &mut impl Write,
    input: &str,
    conv: &Conversion,
    json: bool,
    limit: Option<usize>,
) -> Result<()> {
    if json {
        let line = JsonLine {
            input,
            conversion: conv,
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "{input}")?;
    if conv.is_empty() {
        writeln!(out, "  (no candidates)")?;
    }
    for (i, (text, len)) in conv.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
        writeln!(out, "  {}. {} [{}]", i + 1, text, len)?;
    }
    Ok(())
}

fn convert(
    cli: &Cli,
    prefix: &str,
    json: bool,
    limit: Option<usize>,
    inputs: &[String],
) -> Result<()> {
    let ctx = load_context(cli)?;
    let mut instance = ctx.new_instance();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut run = |input: &str| -> Result<()> {
        let conv = instance
            .convert(input, prefix)
            .with_context(|| format!("converting {input:?}"))?;
        print_conversion(&mut out, input, &conv, json, limit)
    };

    if !inputs.is_empty() {
        for input in inputs {
            run(input)?;
        }
        return Ok(());
    }
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        run(input)?;
    }
    Ok(())
}

fn build(input: &Path, output: &Path) -> Result<()> {
    let keys = simplepinyin::build_artifacts(input, output).with_context(|| {
        format!("building {} from {}", output.display(), input.display())
    })?;
    eprintln!("wrote {} keys to {}", keys, output.display());
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Convert {
            prefix,
            json,
            limit,
            inputs,
        } => convert(&cli, prefix, *json, *limit, inputs),
        Commands::Build { input, output } => build(input, output),
    }
}
