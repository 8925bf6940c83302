//! eventvm - CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use eventvm::util::config::{load_config, InterpreterConfig};
use eventvm::util::logger::{self, LogLevel};
use eventvm::{check_program, dump_program, run_bundle, Bundle, NAME, VERSION};
use std::path::PathBuf;

/// Event command interpreter for 2D RPG runtimes
#[derive(Parser, Debug)]
#[command(name = "eventvm")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a bundle on the headless host
    Run {
        /// Bundle file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Interpreter configuration (RON)
        #[arg(short, long, value_name = "RON")]
        config: Option<PathBuf>,

        /// Give up after this many frames
        #[arg(long, default_value_t = 36_000)]
        max_ticks: usize,
    },

    /// Report unknown codes and broken block structure
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the program with indentation and command names
    Dump {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logger::init_debug();
        eprintln!("eventvm version: {}", VERSION);
    } else {
        logger::init_with_level(LogLevel::Warn);
    }

    match args.command {
        Commands::Run {
            file,
            config,
            max_ticks,
        } => {
            let config = match config {
                Some(path) => load_config(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => InterpreterConfig::default().with_env_overrides()?,
            };
            let bundle = Bundle::load(&file)?;
            let report = run_bundle(&bundle, config, max_ticks)
                .with_context(|| format!("Failed to run: {}", file.display()))?;
            for page in &report.pages {
                println!("{}", page);
            }
            if !report.finished {
                eprintln!("Stopped after {} ticks", report.ticks);
            }
        }
        Commands::Check { file } => {
            let bundle = Bundle::load(&file)?;
            let mut failed = false;
            let programs = std::iter::once(("program".to_string(), &bundle.program[..])).chain(
                bundle
                    .common_events
                    .iter()
                    .map(|e| (format!("common event {}", e.id), &e.list[..])),
            );
            for (name, program) in programs {
                let report = check_program(program);
                for (index, code) in &report.unknown_codes {
                    eprintln!("{} #{}: unknown code {}", name, index, code);
                }
                for problem in &report.problems {
                    eprintln!("{} {}", name, problem);
                }
                failed |= !report.is_clean();
                println!("{}: {} instructions", name, report.instructions);
            }
            if failed {
                bail!("Check failed: {}", file.display());
            }
            eprintln!("Check passed!");
        }
        Commands::Dump { file } => {
            let bundle = Bundle::load(&file)?;
            print!("{}", dump_program(&bundle.program));
            for event in &bundle.common_events {
                println!("\n=== Common event {} {} ===", event.id, event.name);
                print!("{}", dump_program(&event.list));
            }
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
