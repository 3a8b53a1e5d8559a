//! CLI entry point for `memail`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use memail::config::Config;
use memail::error::MimeError;
use memail::mime::walk::{walk, WalkOptions};
use memail::model::outcome::Outcome;
use memail::parser::message::{read_message, split_message, MessageSummary};
use memail::render;

#[derive(Parser)]
#[command(
    name = "memail",
    version,
    about = "Inspect the MIME structure and text content of an email message"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a message and print its text, attachments and warnings
    Parse {
        /// Message file (.eml)
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Stop at the first structural error
        #[arg(long)]
        strict: bool,
        /// Maximum multipart nesting depth
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,
        /// Do not print the From/To/Subject summary
        #[arg(long)]
        no_summary: bool,
    },
    /// Show the configuration file path and the effective settings
    Config {
        /// Write the effective settings to the configuration file
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

/// Options for a single `parse` invocation after merging CLI and config.
struct ParseOptions {
    json: bool,
    strict: bool,
    summary: bool,
    separate_parts: bool,
    max_message_size: u64,
    walk: WalkOptions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = memail::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Parse {
            file,
            json,
            strict,
            max_depth,
            no_summary,
        } => {
            let mut walk_options = config.walk.options();
            if let Some(depth) = max_depth {
                walk_options.max_depth = depth;
            }
            let options = ParseOptions {
                json,
                strict: strict || config.walk.strict,
                summary: !no_summary && config.display.show_summary,
                separate_parts: config.display.separate_parts,
                max_message_size: config.walk.max_message_size,
                walk: walk_options,
            };
            cmd_parse(&file, &options)
        }
        Commands::Config { init } => cmd_config(&config, init),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = memail::config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "memail.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Read, walk and print one message.
fn cmd_parse(path: &Path, options: &ParseOptions) -> anyhow::Result<()> {
    let raw = read_message(path, options.max_message_size)?;
    let (headers, body) = split_message(&raw);
    let summary = MessageSummary::from_headers(&headers);

    let items: Vec<Result<Outcome, MimeError>> = if options.strict {
        walk(headers, body, &options.walk)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(Ok)
            .collect()
    } else {
        walk(headers, body, &options.walk).collect()
    };

    let errors = items.iter().filter(|item| item.is_err()).count();
    let warnings = items
        .iter()
        .filter(|item| matches!(item, Ok(o) if o.is_warning()))
        .count();
    tracing::info!(
        path = %path.display(),
        parts = items.len(),
        warnings,
        errors,
        "Walked message"
    );

    let summary = options.summary.then_some(&summary);
    let output = if options.json {
        let mut s = serde_json::to_string_pretty(&render::render_json(summary, &items))?;
        s.push('\n');
        s
    } else {
        render::render_text(summary, &items, options.separate_parts)
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Print the configuration path and settings, optionally saving them.
fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    let path = memail::config::config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    if init {
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        memail::config::save_config(config)?;
    }
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "memail", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}
