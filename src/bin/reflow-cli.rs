use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use reflow_wm::common::config::{self, Config};
use reflow_wm::common::log;
use reflow_wm::layout_engine::finalize_frame;
use reflow_wm::sys::geometry::Rect;
use reflow_wm::sys::screen::{ScreenId, ScreenInfo};
use serde_json::json;

#[derive(Parser)]
#[command(name = "reflow-cli")]
#[command(about = "Inspect how reflow resolves screens, frames and settings")]
struct Cli {
    /// Config file to read instead of ~/.reflow.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the usable region of a screen after menu bar, margins and padding
    Screen {
        /// Full screen frame as x,y,w,h
        #[arg(long)]
        frame: Rect,
        /// Frame excluding dock and menu bar as x,y,w,h
        #[arg(long)]
        visible: Rect,
        /// Resolve as if window margins were turned off
        #[arg(long)]
        no_margins: bool,
    },
    /// Print the frame a window would actually receive for a tiled frame
    FinalFrame {
        /// Tiled frame as x,y,w,h
        #[arg(long)]
        frame: Rect,
    },
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Check the config file for invalid values
    Validate {
        /// Write the file back with invalid values replaced
        #[arg(long)]
        fix: bool,
    },
    /// Print the built-in default config
    Default,
}

fn main() {
    log::init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(config::config_file);

    let output = match cli.command {
        Commands::Screen { frame, visible, no_margins } => {
            let config = Config::read_or_default(&config_path)?;
            let screen = ScreenInfo::new(ScreenId(0), frame, visible);
            let adjusted = screen.adjusted_frame_with(&config.settings, no_margins);
            serde_json::to_value(adjusted)?
        }
        Commands::FinalFrame { frame } => {
            let config = Config::read_or_default(&config_path)?;
            serde_json::to_value(finalize_frame(frame, &config.settings))?
        }
        Commands::Config { config_cmd } => match config_cmd {
            ConfigCommands::Validate { fix } => {
                let mut config = Config::read(&config_path)?;
                let issues = config.validate();
                let fixes = if fix && !issues.is_empty() {
                    let fixes = config.auto_fix_values();
                    config.save(&config_path)?;
                    fixes
                } else {
                    0
                };
                json!({
                    "path": config_path,
                    "valid": issues.is_empty(),
                    "issues": issues,
                    "fixes": fixes,
                })
            }
            ConfigCommands::Default => {
                print!("{}", Config::default_toml());
                return Ok(());
            }
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
