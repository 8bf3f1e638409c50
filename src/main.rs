use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use logsift::commands;
use logsift::commands::report::ReportOptions;
use logsift::geo::DEFAULT_GEO_URL;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logsift")]
#[command(about = "sshd/fail2ban log address aggregation and block-list reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(short = 'L', long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report addresses found in log files, minus white and black listed ones
    ///
    /// Reads standard input when neither --input nor --logdir is given.
    Report {
        /// Log file(s) to read (.gz and .zst are decompressed)
        #[arg(short, long = "input", value_name = "FILE")]
        inputs: Vec<String>,

        /// Directories searched recursively for files with "log" in their name
        #[arg(short = 'l', long = "logdir", value_name = "DIR")]
        logdirs: Vec<String>,

        /// White list file(s): addresses never reported
        #[arg(short, long, value_name = "FILE")]
        white: Vec<String>,

        /// Black list file(s): addresses already blocked
        #[arg(short, long, value_name = "FILE")]
        black: Vec<String>,

        /// Report level: -r adds counts, -rr adds per-category details
        #[arg(short = 'r', action = ArgAction::Count)]
        report_level: u8,

        /// Add country and city for each reported address
        #[arg(short, long)]
        demographics: bool,

        /// Omit the opened/unreadable/empty source sections
        #[arg(short, long)]
        quiet: bool,

        /// Explain which known addresses were removed and why
        #[arg(short, long)]
        verbose: bool,

        /// Order by frequency (most frequent first) instead of by address
        #[arg(short, long)]
        frequency: bool,

        /// Report destination (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Export the final block-list to a file
        #[arg(long, value_name = "FILE")]
        export: Option<String>,

        /// Export format: json or csv (auto-detected from file extension if not specified)
        #[arg(long, value_parser = ["json", "csv"])]
        format: Option<String>,

        /// Demographic lookup endpoint (ip-api compatible)
        #[arg(long, env = "LOGSIFT_GEO_URL", default_value = DEFAULT_GEO_URL)]
        geo_url: String,

        /// Timeout per demographic lookup in milliseconds
        #[arg(long, default_value = "3000")]
        geo_timeout_ms: u64,

        /// Concurrent demographic lookups
        #[arg(long, default_value = "8")]
        geo_concurrency: usize,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Report {
            inputs,
            logdirs,
            white,
            black,
            report_level,
            demographics,
            quiet,
            verbose,
            frequency,
            output,
            export,
            format,
            geo_url,
            geo_timeout_ms,
            geo_concurrency,
        } => {
            let options = ReportOptions {
                inputs,
                logdirs,
                white,
                black,
                level: report_level.min(2),
                demographics,
                quiet,
                verbose,
                frequency,
                output,
                export,
                format,
                geo_url: Some(geo_url),
                geo_timeout_ms,
                geo_concurrency,
                year: None,
            };
            commands::report::run(&options).await
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "logsift", &mut std::io::stdout());
            Ok(())
        }
    }
}
