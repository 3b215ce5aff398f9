use cd_session::{
    LogOptions, ReplayScript, SessionError, SessionOutcome, SessionResult, init_logging,
    install_panic_hook, log_session_end, log_startup, read_rows, summarize,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "cd-cli")]
#[command(about = "Curve digitizer CLI - replay digitization scripts and inspect exported curves", long_about = None)]
struct Cli {
    /// Append log lines to this file (default: run.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long, global = true)]
    no_log_file: bool,

    /// Log debug-level detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted digitization session without a window
    Replay {
        /// Path to the YAML replay script
        script: PathBuf,
        /// CSV path to export to (without it, the save step is treated as cancelled)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize an exported CSV per IGV setting
    Inspect {
        /// Path to the exported CSV file
        csv_path: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> SessionResult<()> {
    let cli = Cli::parse();

    let log_file = if cli.no_log_file {
        None
    } else {
        Some(cli.log_file.clone().unwrap_or_else(|| PathBuf::from(cd_session::DEFAULT_LOG_FILE)))
    };
    init_logging(&LogOptions {
        file: log_file.clone(),
        level: if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        },
        console: true,
    })?;
    install_panic_hook();
    log_startup("headless replay", log_file.as_deref());

    match cli.command {
        Commands::Replay { script, output } => cmd_replay(&script, output),
        Commands::Inspect { csv_path, json } => cmd_inspect(&csv_path, json),
    }
}

fn cmd_replay(script_path: &Path, output: Option<PathBuf>) -> SessionResult<()> {
    println!("Replaying script: {}", script_path.display());
    let script = ReplayScript::load(script_path)?;
    let (mut session, advisories) = script.into_session(output);
    for advisory in &advisories {
        println!("  note: {advisory}");
    }

    let config = session.config();
    info!(igvs = ?config.igvs, num_points = config.num_points, design_flow = config.design_flow, "configuration");

    let result = session.run();
    log_session_end(session.context().stage(), &result);
    let report = result?;

    match &report.outcome {
        SessionOutcome::Exported { path, rows } => {
            println!("✓ Exported {rows} rows to {}", path.display());
        }
        SessionOutcome::NotExported { rows } => {
            println!("✓ Session finished; {rows} rows not exported (no output path)");
        }
    }
    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report.skipped.iter().map(|v| v.to_string()).collect();
        println!("  Skipped IGV settings: {}", skipped.join(", "));
    }
    Ok(())
}

fn cmd_inspect(csv_path: &Path, json: bool) -> SessionResult<()> {
    let rows = read_rows(csv_path)?;
    let summary = summarize(&rows);

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| SessionError::InvalidInput(format!("cannot encode summary: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    if summary.is_empty() {
        println!("No rows found in {}", csv_path.display());
        return Ok(());
    }

    println!("Curves in {} ({} rows):", csv_path.display(), rows.len());
    for s in &summary {
        let design = s
            .design_point
            .map(|q| format!(", design point at {q}"))
            .unwrap_or_default();
        println!(
            "  IGV {:>5}: {} rows, flow {} - {}{}",
            s.igv, s.rows, s.flow_min, s.flow_max, design
        );
    }
    Ok(())
}
