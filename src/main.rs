use clap::{Parser, Subcommand};
use compdb_index::compdb::{self, CommandLexer, ParseOptions};
use compdb_index::log_timing;
use compdb_index::logging::{LogConfig, init_logging};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{Level, info};

/// CLI arguments for the compilation database indexer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log file path (overrides COMPDB_LOG_FILE env var)
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize include directories, headers, definitions and compilers
    Parse {
        /// Compilation database (compile_commands.json, comments allowed)
        database: PathBuf,

        /// Do not collect -D definitions
        #[arg(long)]
        disable_definitions: bool,

        /// Do not collect -I directories or enumerate their headers
        #[arg(long)]
        disable_includes: bool,

        /// Split commands on whitespace only, ignoring shell quoting
        #[arg(long)]
        whitespace_split: bool,

        /// Resolve relative paths against this directory instead of the current one
        #[arg(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,

        /// Write the index here instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Write a copy of a compilation database without entries whose command matches a pattern
    Filter {
        /// Compilation database to read
        input: PathBuf,

        /// Where to write the filtered database (overwritten)
        output: PathBuf,

        /// Regular expression searched for in each entry's command
        #[arg(allow_hyphen_values = true)]
        pattern: String,
    },
}

fn run_parse(
    database: PathBuf,
    options: ParseOptions,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let index = compdb::parse(&database, &options)?;
    log_timing!(Level::DEBUG, "parse", started.elapsed());

    info!(
        "Indexed {} source files, {} include directories, {} definitions from {}",
        index.source_file_count(),
        index.all_include_dirs().len(),
        index.all_definitions().len(),
        database.display()
    );

    let mut json = if pretty {
        serde_json::to_string_pretty(&index)?
    } else {
        serde_json::to_string(&index)?
    };
    json.push('\n');

    match output {
        Some(path) => std::fs::write(&path, json)?,
        None => print!("{json}"),
    }

    Ok(())
}

fn run_filter(
    input: PathBuf,
    output: PathBuf,
    pattern: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = compdb::filter(&input, &output, &pattern)?;

    for record in &result.removed {
        info!("Removed {}: {}", record.file, record.command);
    }
    info!(
        "Kept {} entries, removed {}; wrote {}",
        result.kept.len(),
        result.removed.len(),
        output.display()
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging with configuration from env vars and CLI args
    let log_config = LogConfig::from_env().with_overrides(args.log_level, args.log_file);

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let outcome = match args.command {
        Command::Parse {
            database,
            disable_definitions,
            disable_includes,
            whitespace_split,
            base_dir,
            output,
            pretty,
        } => {
            let mut options = ParseOptions::new()
                .with_definitions(!disable_definitions)
                .with_includes(!disable_includes);
            if whitespace_split {
                options = options.with_lexer(CommandLexer::Whitespace);
            }
            if let Some(base_dir) = base_dir {
                options = options.with_base_dir(base_dir);
            }
            run_parse(database, options, output, pretty)
        }
        Command::Filter {
            input,
            output,
            pattern,
        } => run_filter(input, output, pattern),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
