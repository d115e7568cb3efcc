//! Command-line interface around the anonymizer core: subcommands, file
//! input/output, mapping persistence and a small interactive loop.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use sql_query_anonymizer::store;
use sql_query_anonymizer::{Anonymizer, Category, OnConflict};

#[derive(Parser)]
#[command(name = "sql-query-anonymizer", version, about)]
struct Cli {
    /// Mapping file to load before and save after the command
    #[arg(short = 'm', long, global = true)]
    mapping_file: Option<PathBuf>,

    /// Do not write the mapping file back after the command
    #[arg(long, global = true)]
    no_auto_save: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace tables, identifiers and literals with placeholders
    Anonymize {
        /// Query text; omit when reading from --file
        query: Option<String>,
        /// Read the query from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Substitute original values back into anonymized text
    Deanonymize {
        query: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the current mappings and per-category counts
    ShowMappings,
    /// Drop all mappings and reset the counters
    ClearMappings,
    /// Write the current mappings to a snapshot file
    ExportMappings { path: PathBuf },
    /// Merge mappings from a snapshot file
    ImportMappings {
        path: PathBuf,
        /// Let incoming pairs replace conflicting placeholders
        #[arg(long)]
        overwrite: bool,
    },
    /// Interactive loop: anonymize each line, `\d` to reverse, `\q` to quit
    Repl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let mapping_path = cli
        .mapping_file
        .clone()
        .unwrap_or_else(store::default_mapping_path);

    let snapshot = store::load_or_default(&mapping_path)
        .with_context(|| format!("loading mappings from {}", mapping_path.display()))?;
    let mut anonymizer = Anonymizer::from_snapshot(&snapshot)
        .with_context(|| format!("mapping file {} is damaged", mapping_path.display()))?;

    let mutated = run(&cli.command, &mut anonymizer)?;

    if mutated && !cli.no_auto_save {
        store::save(&mapping_path, &anonymizer.export())
            .with_context(|| format!("saving mappings to {}", mapping_path.display()))?;
    }
    Ok(())
}

/// Execute one subcommand; returns whether the mapping state may have
/// changed and should be written back.
fn run(command: &Command, anonymizer: &mut Anonymizer) -> anyhow::Result<bool> {
    match command {
        Command::Anonymize {
            query,
            file,
            output,
        } => {
            let text = input_text(query.as_deref(), file.as_deref())?;
            let result = anonymizer.anonymize(&text)?;
            emit(&result, output.as_deref())?;
            Ok(true)
        }
        Command::Deanonymize {
            query,
            file,
            output,
        } => {
            let text = input_text(query.as_deref(), file.as_deref())?;
            let result = anonymizer.deanonymize(&text)?;
            emit(&result, output.as_deref())?;
            Ok(false)
        }
        Command::ShowMappings => {
            let stats = anonymizer.stats();
            println!(
                "tables: {}, identifiers: {}, literals: {} ({} total)",
                stats.tables,
                stats.identifiers,
                stats.literals,
                stats.total()
            );
            for category in Category::ALL {
                for (original, placeholder) in anonymizer.state().forward_pairs(category) {
                    println!("  {} = {}", placeholder, original);
                }
            }
            Ok(false)
        }
        Command::ClearMappings => {
            anonymizer.clear();
            println!("mappings cleared");
            Ok(true)
        }
        Command::ExportMappings { path } => {
            store::save(path, &anonymizer.export())
                .with_context(|| format!("exporting mappings to {}", path.display()))?;
            println!("mappings exported to {}", path.display());
            Ok(false)
        }
        Command::ImportMappings { path, overwrite } => {
            let snapshot = store::load(path)
                .with_context(|| format!("importing mappings from {}", path.display()))?;
            let on_conflict = if *overwrite {
                OnConflict::Overwrite
            } else {
                OnConflict::Abort
            };
            anonymizer.import(&snapshot, on_conflict)?;
            println!("mappings imported from {}", path.display());
            Ok(true)
        }
        Command::Repl => {
            repl(anonymizer)?;
            Ok(true)
        }
    }
}

fn input_text(query: Option<&str>, file: Option<&Path>) -> anyhow::Result<String> {
    match (query, file) {
        (Some(q), None) => Ok(q.to_string()),
        (None, Some(path)) => {
            read_sql_file(path).with_context(|| format!("reading {}", path.display()))
        }
        (Some(_), Some(_)) => anyhow::bail!("pass either a query or --file, not both"),
        (None, None) => anyhow::bail!("no query given; pass text or --file"),
    }
}

/// Read a query file, dropping full-line `--` comments and folding the rest
/// onto one line. Inline comments still flow through the tokenizer.
fn read_sql_file(path: &Path) -> io::Result<String> {
    let raw = fs::read_to_string(path)?;
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .collect();
    Ok(lines.join(" "))
}

fn emit(result: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, result)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", result),
    }
    Ok(())
}

fn repl(anonymizer: &mut Anonymizer) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("sql-query-anonymizer repl: enter a query, \\d <text> to reverse, \\s for stats, \\q to quit");
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "\\q" {
            return Ok(());
        }
        if line == "\\s" {
            let stats = anonymizer.stats();
            println!(
                "tables: {}, identifiers: {}, literals: {}",
                stats.tables, stats.identifiers, stats.literals
            );
            continue;
        }
        let result = if let Some(rest) = line.strip_prefix("\\d ") {
            anonymizer.deanonymize(rest)
        } else {
            anonymizer.anonymize(line)
        };
        match result {
            Ok(text) => println!("{}", text),
            Err(err) => eprintln!("error: {}", err),
        }
    }
}
