use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use colored::Colorize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use send_input::{BindingTable, KeyboardHook};

#[derive(Parser, Debug)]
#[command(
    name = "send_input",
    version,
    about = "Type configured text into the focused window when a global shortcut is pressed",
    disable_help_flag = true,
    after_help = "Config file format, one binding per line:\n\n  \
                  # comment\n  \
                  LCtrl+LShift+LAlt+0x50|my-secret-password\n\n\
                  Modifiers: LCtrl, RCtrl, LShift, RShift, LAlt, RAlt (at least one).\n\
                  The last token is a virtual key code from 0x01 to 0xFE.\n\
                  Everything after the first '|' is typed verbatim."
)]
struct Cli {
    /// Path to the shortcut binding file
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate the binding file, print a summary and exit
    #[arg(long)]
    check: bool,

    /// Output format for --check
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "check")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

const HELP_FLAGS: [&str; 3] = ["/?", "-h", "--help"];
const STOP_RETRY_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| HELP_FLAGS.contains(&arg.as_str())) {
        println!("{}", Cli::command().render_help());
        return ExitCode::FAILURE;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(print_err) = e.print() {
                eprintln!("failed to print usage error: {print_err}");
            }
            return match e.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let bindings = BindingTable::from_file(&cli.config)?;

    if cli.check {
        return print_summary(&bindings, cli.format);
    }

    info!(
        config = %cli.config.display(),
        bindings = bindings.len(),
        "send_input starting"
    );

    let hook = KeyboardHook::new(bindings);
    let stop = hook.stop_handle();
    let mut listener = tokio::task::spawn_blocking(move || hook.run());

    tokio::select! {
        result = &mut listener => {
            result.map_err(|e| anyhow::anyhow!("keyboard hook thread panicked: {}", e))??;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("interrupt received, shutting down");
        }
    }

    // The hook thread may not have published its id yet.
    let result = loop {
        stop.stop();
        tokio::select! {
            result = &mut listener => break result,
            _ = tokio::time::sleep(STOP_RETRY_INTERVAL) => {}
        }
    };

    match result.map_err(|e| anyhow::anyhow!("keyboard hook thread panicked: {}", e))? {
        Ok(()) => {
            info!("send_input stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "keyboard hook failed during shutdown");
            Err(e.into())
        }
    }
}

fn print_summary(bindings: &BindingTable, format: OutputFormat) -> Result<()> {
    let summaries = bindings.summaries();
    match format {
        OutputFormat::Json => {
            println!("{}", bindings.summaries_json()?);
        }
        OutputFormat::Text => {
            println!(
                "{} {} shortcut key(s) configured",
                "OK".green().bold(),
                summaries.len()
            );
            for summary in &summaries {
                println!(
                    "  #{:<3} line {:<4} {} {} chars",
                    summary.entry,
                    summary.line,
                    format!("{:<32}", summary.shortcut).cyan(),
                    summary.payload_chars
                );
            }
        }
    }
    Ok(())
}
