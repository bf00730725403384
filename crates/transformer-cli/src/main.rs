//! Transformer CLI - formula evaluation and a JSON-lines transform service
//!
//! `serve` protocol: one JSON object per line.
//! - Reads `Request` objects from stdin
//! - Writes `Response` objects to stdout
//! - Diagnostic messages go to stderr (never stdout)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use transformer::formula::evaluate;
use transformer::{handle_line, Registry, Transform};

#[derive(Parser)]
#[command(name = "transformer")]
#[command(author, version, about = "Excel-style formula transforms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula and print the result
    Eval {
        /// Formula, e.g. "=MAX(1,5,3)*2"
        formula: String,

        /// Print the result (or error payload) as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List available transforms
    List {
        /// Only list transforms in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show the fields a transform accepts
    Fields {
        /// Transform key (category.name), or name with --category
        transform: String,

        #[arg(short, long)]
        category: Option<String>,
    },

    /// Serve transform requests as JSON lines on stdin/stdout
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = Registry::with_defaults();

    match cli.command {
        Commands::Eval { formula, json } => eval(&formula, json),
        Commands::List { category } => list(&registry, category.as_deref()),
        Commands::Fields {
            transform,
            category,
        } => fields(&registry, &transform, category.as_deref()),
        Commands::Serve => serve(&registry),
    }
}

fn eval(formula: &str, json: bool) -> Result<()> {
    let result = evaluate(formula);

    if json {
        let value = match &result {
            Ok(scalar) => serde_json::json!({ "outputs": scalar }),
            Err(e) => transformer::ApiError::from(e.clone()).to_payload(),
        };
        println!("{}", value);
        return Ok(());
    }

    let value = result.with_context(|| format!("Failed to evaluate '{}'", formula))?;
    println!("{}", value);
    Ok(())
}

fn list(registry: &Registry, category: Option<&str>) -> Result<()> {
    for transform in registry.all(category) {
        println!("{}\t{}", transform.key(), transform.label());
    }
    Ok(())
}

fn fields(registry: &Registry, name: &str, category: Option<&str>) -> Result<()> {
    let Some(transform) = registry.lookup(name, category) else {
        bail!("Transform \"{}\" not found", name);
    };

    let fields = serde_json::to_string_pretty(&transform.fields())
        .context("Failed to serialize fields")?;
    println!("{}", fields);
    Ok(())
}

fn serve(registry: &Registry) -> Result<()> {
    eprintln!(
        "[transformer] Serving {} transform(s) on stdin/stdout",
        registry.len()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut handled = 0usize;

    for line in stdin.lock().lines() {
        let line = line.context("stdin read error")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(registry, line);
        if response.is_error() {
            eprintln!("[transformer] Request failed: {}", line);
        }

        writeln!(out, "{}", response.to_json()).context("Failed to write to stdout")?;
        out.flush().context("Failed to flush stdout")?;
        handled += 1;
    }

    eprintln!("[transformer] stdin closed after {} request(s), exiting.", handled);
    Ok(())
}
