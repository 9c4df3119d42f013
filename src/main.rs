/*!
# Complexity Analyzer CLI

Command-line front end: reads a snippet from a file or standard input and
prints its estimated time and space complexity.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use complexity_analyzer::cli_common::{self, OutputFormat, OutputWriter, Verbosity};
use complexity_analyzer::core::read_source_file;
use complexity_analyzer::parser::Lexer;
use complexity_analyzer::{analyze_directory, AnalyzerConfig, ComplexityEngine, GrammarChoice};

/// Line that ends interactive input
const END_MARKER: &str = "END";

#[derive(Parser)]
#[command(
    name = "complexity-analyzer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Estimates asymptotic time and space complexity of C-like and Java-like snippets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (TOML or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate time and space complexity
    Analyze {
        /// Source file; reads standard input until EOF or an `END` line when omitted
        file: Option<PathBuf>,

        /// Grammar: auto, c or java
        #[arg(short, long)]
        grammar: Option<GrammarChoice>,

        /// Output format: text or json
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the token stream and token statistics
    Tokens {
        file: Option<PathBuf>,

        #[arg(short, long)]
        grammar: Option<GrammarChoice>,
    },

    /// Print the syntax tree outline
    Tree {
        file: Option<PathBuf>,

        #[arg(short, long)]
        grammar: Option<GrammarChoice>,
    },

    /// Analyze every .c, .h and .java file under a directory
    Batch {
        dir: PathBuf,

        #[arg(short, long)]
        grammar: Option<GrammarChoice>,

        #[arg(short, long)]
        format: Option<OutputFormat>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default configuration file
    InitConfig {
        #[arg(short, long, default_value = "complexity.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli_common::init_logging(Verbosity::from_flags(cli.verbose, cli.quiet))?;

    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load_from_file(path)?,
        None => AnalyzerConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            file,
            grammar,
            format,
            output,
        } => {
            if let Some(grammar) = grammar {
                config.analysis.grammar = grammar;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            analyze_command(file.as_deref(), output.as_deref(), &config)
        }
        Commands::Tokens { file, grammar } => {
            tokens_command(file.as_deref(), grammar.unwrap_or(config.analysis.grammar))
        }
        Commands::Tree { file, grammar } => tree_command(
            file.as_deref(),
            grammar.unwrap_or(config.analysis.grammar),
            &config,
        ),
        Commands::Batch {
            dir,
            grammar,
            format,
            output,
        } => {
            if let Some(grammar) = grammar {
                config.analysis.grammar = grammar;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            batch_command(&dir, output.as_deref(), &config)
        }
        Commands::InitConfig { output } => {
            AnalyzerConfig::default().save_to_file(&output)?;
            cli_common::print_success(&format!(
                "Configuration written to {}",
                output.display()
            ));
            Ok(())
        }
    }
}

/// Reads the snippet from `file`, or from stdin up to EOF or an `END` line
fn read_input(file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        cli_common::validate_path(path, "Input file")?;
        return read_source_file(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!(
            "{}",
            format!("Enter code, finish with a line containing only {}:", END_MARKER).dimmed()
        );
    }

    let mut source = String::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read standard input")?;
        if line.trim() == END_MARKER {
            break;
        }
        source.push_str(&line);
        source.push('\n');
    }
    Ok(source)
}

fn writer_for(output: Option<&Path>, config: &AnalyzerConfig) -> Result<OutputWriter> {
    let writer = match output {
        Some(path) => OutputWriter::file(path, config.output.format)
            .with_context(|| format!("Failed to create {}", path.display()))?,
        None => OutputWriter::stdout(config.output.format),
    };
    Ok(writer.with_pretty(config.output.pretty))
}

fn analyze_command(file: Option<&Path>, output: Option<&Path>, config: &AnalyzerConfig) -> Result<()> {
    let source = read_input(file)?;
    let grammar = config.analysis.grammar.resolve(&source, file)?;
    info!("Analyzing as {} source", grammar);

    let report = ComplexityEngine::from_config(grammar, config).analyze(&source)?;

    let mut writer = writer_for(output, config)?;
    writer.write_report(&report)?;
    writer.flush()?;

    if let Some(path) = output {
        cli_common::print_success(&format!("Report written to {}", path.display()));
    }
    Ok(())
}

fn tokens_command(file: Option<&Path>, grammar: GrammarChoice) -> Result<()> {
    let source = read_input(file)?;
    let grammar = grammar.resolve(&source, file)?;
    let lexer = Lexer::new(grammar.spec());
    let tokens = lexer.tokenize(&source);

    for token in &tokens {
        println!("{}", token);
    }
    println!();
    print!("{}", lexer.token_stats(&tokens));
    Ok(())
}

fn tree_command(file: Option<&Path>, grammar: GrammarChoice, config: &AnalyzerConfig) -> Result<()> {
    let source = read_input(file)?;
    let grammar = grammar.resolve(&source, file)?;
    let engine = ComplexityEngine::from_config(grammar, config);
    let tree = engine.parser().parse_text(&source)?;

    print!("{}", tree.render());
    if tree.unclosed_scopes() > 0 {
        cli_common::print_warning(&format!(
            "{} scope(s) left open at end of input",
            tree.unclosed_scopes()
        ));
    }
    Ok(())
}

fn batch_command(dir: &Path, output: Option<&Path>, config: &AnalyzerConfig) -> Result<()> {
    cli_common::validate_path(dir, "Directory")?;
    let start = Instant::now();

    let batch = analyze_directory(dir, config);

    let mut writer = writer_for(output, config)?;
    writer.write_batch(&batch)?;
    writer.flush()?;

    info!(
        "Analyzed {} files in {}",
        batch.files.len(),
        cli_common::format_duration(start.elapsed())
    );
    if batch.failed() > 0 {
        cli_common::print_warning(&format!("{} file(s) could not be analyzed", batch.failed()));
    }
    Ok(())
}
