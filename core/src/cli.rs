use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;

use crate::config::Config;
use crate::executor::{
    CallScoping, Interpreter, LogEntry, LogKind, MemorySurface, SurfaceRef,
};

#[derive(Parser)]
#[command(name = "stepjs")]
#[command(about = "stepjs - run JavaScript one explained step at a time", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Step through a script, printing each step and its log output
    Run {
        /// Script to run
        file: PathBuf,

        /// JSON fixture describing the document (elements, globals, answers)
        #[arg(long)]
        dom: Option<PathBuf>,

        /// Fire an event once the script settles, as `element-id:event`
        #[arg(long = "fire", value_name = "ID:EVENT")]
        fire: Vec<String>,

        /// Answer handed to the next `prompt` call
        #[arg(long = "answer")]
        answers: Vec<String>,

        /// Stop after this many steps (overrides config)
        #[arg(long)]
        max_steps: Option<usize>,

        /// Start call frames with parameters only instead of a global snapshot
        #[arg(long)]
        chained: bool,

        /// Print the final state as JSON instead of step output
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a script without running it
    Check {
        /// Script to check
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run CLI with custom args (for embedding in other tools)
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn run_cli_with_args(cli: Cli) -> Result<()> {
    let config_path = cli.config.map(PathBuf::from);

    match cli.command {
        Commands::Run {
            file,
            dom,
            fire,
            answers,
            max_steps,
            chained,
            json,
        } => {
            let mut builder = Config::builder().config_path(config_path);
            if let Some(max_steps) = max_steps {
                builder = builder.max_steps(max_steps);
            }
            if chained {
                builder = builder.call_scoping(CallScoping::Chained);
            }
            let config = builder.build().context("Failed to load configuration")?;

            let options = RunOptions {
                dom,
                fire,
                answers,
                json,
            };
            run_script(&file, &options, &config)?;
        }

        Commands::Check { file } => {
            let source = read_source(&file)?;
            let interp = Interpreter::new(&source, None)
                .with_context(|| format!("{} failed to load", file.display()))?;

            for warning in interp.warnings() {
                println!("{}", warning);
            }
            println!(
                "✓ {} is valid ({} warning(s))",
                file.display(),
                interp.warnings().len()
            );
        }

        Commands::Config => {
            let config = Config::builder()
                .config_path(config_path)
                .build()
                .context("Failed to load configuration")?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/* ===================== Run ===================== */

struct RunOptions {
    dom: Option<PathBuf>,
    fire: Vec<String>,
    answers: Vec<String>,
    json: bool,
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn load_surface(options: &RunOptions) -> Result<MemorySurface> {
    let mut surface = match &options.dom {
        Some(path) => {
            let json = read_source(path)?;
            MemorySurface::from_json(&json)
                .with_context(|| format!("Invalid document fixture {}", path.display()))?
        }
        None => MemorySurface::new(),
    };
    surface.answers.extend(options.answers.iter().cloned());
    Ok(surface)
}

fn run_script(file: &Path, options: &RunOptions, config: &Config) -> Result<()> {
    let source = read_source(file)?;
    let surface = Arc::new(Mutex::new(load_surface(options)?));
    let shared: SurfaceRef = surface.clone();

    let mut interp = Interpreter::with_config(&source, Some(shared), config.interpreter.clone())
        .with_context(|| format!("{} failed to load", file.display()))?;

    for warning in interp.warnings() {
        eprintln!("{}", warning);
    }

    let mut printer = Printer {
        logs_seen: 0,
        quiet: options.json,
        show_logs: config.cli.show_logs,
    };
    let max_steps = config.cli.max_steps;

    let mut completed = drive(&mut interp, &mut printer, max_steps);

    for target in &options.fire {
        if !completed {
            break;
        }
        let Some((id, event)) = target.split_once(':') else {
            bail!("Invalid --fire value '{}', expected ID:EVENT", target);
        };
        let count = interp.fire_event_by_id(id, event);
        if count == 0 {
            eprintln!("No {} listeners on #{}", event, id);
            continue;
        }
        printer.flush_logs(&interp);
        completed = drive(&mut interp, &mut printer, max_steps);
    }

    let state = interp.state();
    if options.json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        println!("\nFinished after {} step(s)", state.steps);
        for (name, value) in state.global_scope().values() {
            println!("  {} = {}", name, value.repr());
        }
        let surface = surface.lock();
        for alert in &surface.alerts {
            println!("  alert: {}", alert);
        }
    }

    if !completed {
        eprintln!("Stopped after {} steps (max_steps)", max_steps);
    }
    if let Some(error) = &state.error {
        bail!(
            "Runtime error at line {}: {}",
            state.current_line.unwrap_or(0),
            error
        );
    }

    Ok(())
}

/// Step until finished. Returns false if the step limit was reached first.
fn drive(interp: &mut Interpreter, printer: &mut Printer, max_steps: usize) -> bool {
    while !interp.state().finished {
        if interp.state().steps >= max_steps {
            return false;
        }
        interp.step();
        printer.print_step(interp);
    }
    true
}

/* ===================== Output ===================== */

struct Printer {
    logs_seen: usize,
    quiet: bool,
    show_logs: bool,
}

impl Printer {
    fn print_step(&mut self, interp: &Interpreter) {
        let state = interp.state();
        if !self.quiet {
            match state.current_line {
                Some(line) => println!("[{:>3}] line {}: {}", state.steps, line, state.explanation),
                None => println!("[{:>3}] {}", state.steps, state.explanation),
            }
        }
        self.flush_logs(interp);
    }

    fn flush_logs(&mut self, interp: &Interpreter) {
        let logs = &interp.state().logs;
        if !self.quiet && self.show_logs {
            for entry in &logs[self.logs_seen.min(logs.len())..] {
                println!("      {}", format_log(entry));
            }
        }
        self.logs_seen = logs.len();
    }
}

fn format_log(entry: &LogEntry) -> String {
    let kind = match entry.kind {
        LogKind::Console => "console",
        LogKind::Binding => "binding",
        LogKind::Return => "return",
        LogKind::Event => "event",
        LogKind::Diagnostic => "skipped",
    };
    format!("{:<8} {}", kind, entry.message)
}
