//! `formcoach` – FormCoach Command Line Interface
//!
//! Entry point for running the coaching engine outside a phone.  It:
//!
//! 1. Installs the tracing pipeline (`RUST_LOG`, `FORMCOACH_LOG_FORMAT`,
//!    `OTEL_EXPORTER_OTLP_ENDPOINT`).
//! 2. Loads `~/.formcoach/config.toml`, falling back to defaults.
//! 3. Dispatches one of the subcommands below.
//! 4. Intercepts **Ctrl-C** during a replay and cancels the session so no
//!    further cue is emitted.
//!
//! ```text
//! formcoach replay <recording.jsonl> [--json]
//! formcoach schema
//! formcoach config
//! formcoach init
//! ```

mod config;
mod replay;

use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

use formcoach_runtime::{CoachSession, FrameDriver, SessionStats, init_tracing};

use crate::replay::{ConsoleSink, ReplayRecord};

enum Command {
    Replay { path: PathBuf, json: bool },
    Schema,
    ShowConfig,
    Init,
    Help,
}

fn main() -> ExitCode {
    let _telemetry = init_tracing("formcoach");

    let command = match parse_args(std::env::args().skip(1).collect()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            print_usage();
            return ExitCode::from(2);
        }
    };

    let result = match command {
        Command::Replay { path, json } => run_replay(&path, json),
        Command::Schema => print_schema(),
        Command::ShowConfig => show_config(),
        Command::Init => init_config(),
        Command::Help => {
            print_banner();
            print_usage();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Command, String> {
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(Command::Help);
    };
    match cmd.as_str() {
        "replay" => {
            let mut path = None;
            let mut json = false;
            for arg in args {
                match arg.as_str() {
                    "--json" => json = true,
                    flag if flag.starts_with("--") => {
                        return Err(format!("unknown flag '{flag}'"));
                    }
                    _ if path.is_none() => path = Some(PathBuf::from(arg)),
                    _ => return Err(format!("unexpected argument '{arg}'")),
                }
            }
            let path = path.ok_or("replay needs a recording file")?;
            Ok(Command::Replay { path, json })
        }
        "schema" => Ok(Command::Schema),
        "config" => Ok(Command::ShowConfig),
        "init" => Ok(Command::Init),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => Err(format!("unknown command '{other}'")),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn run_replay(path: &std::path::Path, json: bool) -> Result<(), String> {
    let cfg = config::load_or_default()?;
    let (mut source, detector) = replay::load_recording(path, cfg.replay_fps)?;

    let mut session = CoachSession::new(cfg.random_source());
    let cancel = session.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – ending session …".yellow().bold());
        cancel.cancel();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the replay can only end at end of file");
    }

    if !json {
        print_banner();
        println!(
            "  Replaying {} ({} frame(s) at {} fps)\n",
            path.display().to_string().bold(),
            source.remaining(),
            cfg.replay_fps
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;

    let mut driver = FrameDriver::with_config(detector, ConsoleSink::default(), cfg.driver_config());
    let stats = runtime
        .block_on(driver.run(&mut session, &mut source))
        .map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| format!("Failed to serialize stats: {}", e))?;
        println!("{out}");
    } else {
        print_stats(&stats, session.is_cancelled());
    }
    Ok(())
}

fn print_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(ReplayRecord);
    let out = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("Failed to serialize schema: {}", e))?;
    println!("{out}");
    Ok(())
}

fn show_config() -> Result<(), String> {
    let cfg = config::load_or_default()?;
    let raw =
        toml::to_string_pretty(&cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    println!("# {}", config::config_path().display());
    print!("{raw}");
    Ok(())
}

fn init_config() -> Result<(), String> {
    let path = config::config_path();
    if config::load()?.is_some() {
        println!(
            "  Config already present at {}",
            path.display().to_string().bold()
        );
        return Ok(());
    }
    config::save(&config::Config::default())?;
    println!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_stats(stats: &SessionStats, cancelled: bool) {
    println!();
    let title = if cancelled { "Session cancelled" } else { "Session complete" };
    println!("  {}", title.bold());
    println!("    frames            {}", stats.frames);
    println!("    no person         {}", stats.frames_without_person);
    println!(
        "    detector failures {}",
        if stats.detector_failures > 0 {
            stats.detector_failures.to_string().red().to_string()
        } else {
            "0".to_string()
        }
    );
    println!("    corrections       {}", stats.corrections.to_string().yellow());
    println!("    encouragements    {}", stats.encouragements.to_string().green());
    println!();
}

fn print_banner() {
    println!();
    println!("{}", r#"   ____                   _____                 _     "#.bold().cyan());
    println!("{}", r#"  / __/__  ______ _  ___ / ___/__  ___ _____ __ / /    "#.bold().cyan());
    println!("{}", r#" / _// _ \/ __/  ' \/___/ /__/ _ \/ _ `/ __/ _ \/ _ \ "#.bold().cyan());
    println!("{}", r#"/_/  \___/_/ /_/_/_/    \___/\___/\_,_/\__/_//_/_//_/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "FormCoach".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Real-time squat form coaching");
    println!();
}

fn print_usage() {
    println!("  {}", "Usage:".bold());
    println!("    formcoach replay <recording.jsonl> [--json]   replay a recorded session");
    println!("    formcoach schema                              print the recording JSON schema");
    println!("    formcoach config                              print the effective configuration");
    println!("    formcoach init                                write a default config file");
    println!();
}
