mod batch;
mod browser;
mod dispatch;
mod error;
mod failure_log;
mod phone;
mod run;
mod session;
mod timings;

use crate::browser::LaunchOptions;
use crate::run::RunOptions;
use crate::timings::Timings;
use clap::{CommandFactory, Parser};
use env_logger::Env;
use log::error;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

/// The run finished; individual contacts may still have failed.
const EXIT_OK: u8 = 0;
/// Config, spreadsheet or browser problem; nothing was sent.
const EXIT_FATAL: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Sends one templated WhatsApp message per spreadsheet row through WhatsApp Web.
#[derive(Parser, Debug)]
#[command(name = "sender", version)]
struct Cli {
    /// JSON configuration written by the form.
    config: Option<PathBuf>,

    /// Directory for error screenshots and failed_messages.log
    /// [default: directory of this executable]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Chrome or Chromium executable to launch.
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Browser profile directory; reusing it keeps the WhatsApp login.
    #[arg(long)]
    profile_dir: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn wait_for_enter(prompt: &str) {
    println!("{}", prompt);
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

fn rule() -> String {
    "=".repeat(70)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    println!("{}", rule());
    println!("WHATSAPP AUTOMATION");
    println!("{}", rule());
    println!(
        "Start Time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", rule());

    let Some(config_path) = cli.config else {
        println!("{}", Cli::command().render_usage());
        wait_for_enter("\nPress Enter to exit...");
        return ExitCode::from(EXIT_USAGE);
    };

    let options = RunOptions {
        config_path,
        output_dir: cli.output_dir.unwrap_or_else(default_output_dir),
        launch: LaunchOptions {
            chrome: cli.chrome,
            profile_dir: cli.profile_dir,
        },
        timings: Timings::default(),
    };

    let code = match run::run(&options).await {
        Ok(summary) => {
            println!("\n{}", rule());
            println!("COMPLETE");
            println!("{}", rule());
            println!("Total: {}", summary.total);
            println!("Success: {}", summary.success);
            println!("Failed: {}", summary.failed);
            println!("Skipped (empty phone): {}", summary.skipped);
            println!("\nSent {}/{}", summary.success, summary.total);
            EXIT_OK
        }
        Err(e) => {
            error!("{}", e);
            println!("\nRun aborted: {}", e);
            EXIT_FATAL
        }
    };

    println!("\n{}", rule());
    wait_for_enter("Press Enter to close...");
    ExitCode::from(code)
}
