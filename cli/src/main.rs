use clap::Parser;
use colored::*;
use log::{debug, error, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::process;

use kestrel_core::{read_lines, Console, ConsoleConfig, ModuleRegistry, TerminalSink};

#[derive(Parser, Debug)]
#[command(
    name = "kestrel",
    version,
    about = "Modular security-assessment console",
    after_help = "\x1b[1;36mEXAMPLES:\x1b[0m
  Interactive console:            kestrel
  Custom config:                  kestrel -c lab.json
  Replay a resource file:         kestrel -r scan.rc
  One-shot commands:              kestrel -x \"use auxiliary/headers; set URL http://target.com; run; exit\"
  Quiet + verbose logging:        kestrel -q -v"
)]
pub struct Args {
    #[arg(short = 'c', long, default_value = ConsoleConfig::DEFAULT_PATH, help = "Console configuration file (JSON)")]
    pub config: String,

    #[arg(short = 'r', long, help = "Run commands from a resource file before the prompt")]
    pub resource: Option<String>,

    #[arg(short = 'x', long, help = "Semicolon-separated commands to run before the prompt")]
    pub execute: Option<String>,

    #[arg(short = 'q', long, default_value_t = false, help = "Do not print the banner")]
    pub quiet: bool,

    #[arg(short = 'v', long, default_value_t = false, help = "Enable debug logging")]
    pub verbose: bool,
}

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // SIGINT outside the line editor, e.g. during a module run, must not end the session.
    if let Err(e) = ctrlc::set_handler(|| {
        println!("\n{}", "[*] Interrupt ignored, use 'exit' to quit".yellow());
    }) {
        warn!("Failed to install interrupt handler: {}", e);
    }

    let config = match ConsoleConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", format!("[!] {:#}", e).red());
            process::exit(1);
        }
    };

    if !args.quiet && config.show_banner {
        println!("{}", kestrel_core::banner().red().bold());
    }

    let history_file = config.history_file.clone();
    let mut console = Console::new(ModuleRegistry::new(), config, TerminalSink::new_ref());

    if let Some(ref path) = args.resource {
        match read_lines(path) {
            Ok(lines) => run_batch(&mut console, lines.iter().map(String::as_str)),
            Err(e) => {
                eprintln!("{}", format!("[!] Failed to read '{}': {}", path, e).red());
                process::exit(1);
            }
        }
    }

    if let Some(ref commands) = args.execute {
        run_batch(&mut console, commands.split(';'));
    }

    if console.is_running() {
        interactive_loop(&mut console, history_file.as_deref());
    }
}

/// Feeds scripted commands to the console, skipping comments.
fn run_batch<'a>(console: &mut Console, lines: impl Iterator<Item = &'a str>) {
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !console.is_running() {
            break;
        }
        debug!("Batch command: {}", line);
        console.execute(line);
    }
}

fn interactive_loop(console: &mut Console, history_file: Option<&str>) {
    let mut editor = match DefaultEditor::new() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("{}", format!("[!] Failed to initialise line editor: {}", e).red());
            process::exit(1);
        }
    };

    if let Some(path) = history_file {
        if let Err(e) = editor.load_history(path) {
            debug!("No history loaded from {}: {}", path, e);
        }
    }

    while console.is_running() {
        match editor.readline(&console.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                console.execute(&line);
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "[*] Interrupt ignored, use 'exit' to quit".yellow());
            }
            Err(ReadlineError::Eof) => console.shutdown(),
            Err(e) => {
                error!("Failed to read input: {}", e);
                console.shutdown();
            }
        }
    }

    if let Some(path) = history_file {
        if let Err(e) = editor.save_history(path) {
            debug!("Failed to save history to {}: {}", path, e);
        }
    }
}
