use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use skimmer_core::config_file;
use skimmer_core::{
    Diagnostics, DigestPayload, OutlineConfig, OutlineConfigBuilder, WhitespaceCounter,
};
use skimmer_digest::build_digest;
use skimmer_outline::OutlineParser;

mod output;

use output::ColorMode;

/// Document structure recovery - outlines and digests for noisy extracted text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recover the outline and sections of a text/markdown file
    Outline {
        /// Path to the extracted text or markdown file
        file_path: PathBuf,

        /// Emit machine-readable JSON instead of the human summary
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Assemble a token-bounded digest of a text/markdown file
    Digest {
        /// Path to the extracted text or markdown file
        file_path: PathBuf,

        /// Emit machine-readable JSON instead of the human summary
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Token budget ceiling
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Token budget floor
        #[arg(long)]
        min_tokens: Option<usize>,
    },
}

/// Digest output with the routing diagnostics attached, for `--json`.
#[derive(Debug, Serialize)]
struct DigestReport {
    digest: DigestPayload,
    diagnostics: Diagnostics,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Outline {
            file_path,
            json,
            no_color,
        } => outline(file_path, json, no_color),
        Command::Digest {
            file_path,
            json,
            no_color,
            max_tokens,
            min_tokens,
        } => digest(file_path, json, no_color, max_tokens, min_tokens),
    }
}

/// Resolve configuration: CLI flags > config file > defaults.
fn resolve_config(
    max_tokens: Option<usize>,
    min_tokens: Option<usize>,
) -> anyhow::Result<OutlineConfig> {
    let file = config_file::load_config();
    let mut builder = file.apply(OutlineConfigBuilder::new());
    if let Some(n) = max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(n) = min_tokens {
        builder = builder.min_tokens(n);
    }
    builder.build().context("invalid configuration")
}

fn outline(file_path: PathBuf, json: bool, no_color: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let config = resolve_config(None, None)?;
    let structure = OutlineParser::with_config(config).parse(&text);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &structure)?;
        writeln!(out)?;
    } else {
        output::print_structure(&mut out, &structure, ColorMode(!no_color))?;
    }
    Ok(())
}

fn digest(
    file_path: PathBuf,
    json: bool,
    no_color: bool,
    max_tokens: Option<usize>,
    min_tokens: Option<usize>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let config = resolve_config(max_tokens, min_tokens)?;
    let structure = OutlineParser::with_config(config.clone()).parse(&text);
    let digest = build_digest(&structure.sections, &config, &WhitespaceCounter);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        let report = DigestReport {
            digest,
            diagnostics: structure.diagnostics,
        };
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        output::print_digest(&mut out, &digest, ColorMode(!no_color))?;
    }
    Ok(())
}
