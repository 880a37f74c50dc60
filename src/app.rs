//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands::{self, PlayOptions};
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// A terminal audio player with a live amplitude-reactive waveform
#[derive(Parser)]
#[command(name = "oscillo")]
#[command(version)]
#[command(about = "Terminal audio player with live waveform visualization")]
#[command(
    long_about = "A terminal audio player that renders a live, amplitude-reactive waveform\nsynchronized to the playing track.\n\nDEFAULT COMMAND:\n    If a file path is given without a command, 'play' is used by default.\n\nEXAMPLES:\n    # Play a track with live visualization\n    $ oscillo song.mp3\n    $ oscillo play song.mp3\n\n    # Faster sampling and a red waveform\n    $ oscillo play song.mp3 --cadence 50 --color \"#FF0000\"\n\n    # Dump the final rendered frame to a PNG\n    $ oscillo play song.mp3 --dump frame.png\n\n    # List audio output devices\n    $ oscillo list-devices\n\n    # Edit configuration file\n    $ oscillo config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/oscillo/oscillo.toml\n    Logs:               ~/.local/state/oscillo/oscillo.log.*\n\nDuring playback: Space pauses/resumes, 'r' resets, 'q' or Escape quits.\nSIGUSR1 triggers the same reset as the 'r' key."
)]
struct Cli {
    /// Track to play (shorthand for the play command)
    #[arg(value_name = "TRACK")]
    track: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a track with live waveform visualization (default)
    ///
    /// Space pauses/resumes, 'r' resets, 'q' or Escape quits.
    /// Options override the corresponding config file values.
    #[command(visible_alias = "p")]
    Play {
        /// Path to the audio file to play
        #[arg(value_name = "TRACK")]
        track: PathBuf,

        /// Sampling cadence in milliseconds
        #[arg(long, value_name = "MS")]
        cadence: Option<u64>,

        /// Horizontal resolution divisor (>= 1)
        #[arg(long)]
        smoothness: Option<u32>,

        /// Waveform stroke color as "#RRGGBB"
        #[arg(long, value_name = "COLOR")]
        color: Option<String>,

        /// Waveform stroke width in pixels
        #[arg(long, value_name = "PX")]
        line_width: Option<f32>,

        /// Vertical amplitude scale factor
        #[arg(long, value_name = "FACTOR")]
        scale: Option<f32>,

        /// Write the final rendered frame as PNG on exit
        #[arg(long, value_name = "FILE")]
        dump: Option<PathBuf>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit visualizer settings: cadence, smoothness, colors, surface size.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio output devices
    ///
    /// Shows device IDs, names, and configurations.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   oscillo completions bash > oscillo.bash
    ///   oscillo completions zsh > _oscillo
    ///   oscillo completions fish > oscillo.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "oscillo", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        Some(Commands::Play {
            track,
            cadence,
            smoothness,
            color,
            line_width,
            scale,
            dump,
        }) => {
            let opts = PlayOptions {
                cadence_ms: cadence,
                smoothness,
                line_color: color,
                line_width,
                amplitude_scale: scale,
                dump,
            };
            commands::handle_play(track, opts)?;
        }
        None => {
            // Default command is play when a bare track path is given
            match cli.track {
                Some(track) => commands::handle_play(track, PlayOptions::default())?,
                None => {
                    Cli::command().print_help()?;
                    process::exit(2);
                }
            }
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
