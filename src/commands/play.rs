//! Play a track with live waveform visualization.
//!
//! Drives the cooperative render loop: lifecycle control, frame
//! sampling, surface rendering and the terminal preview all tick on
//! this thread. SIGUSR1 from outside triggers the same reset path as
//! the 'r' key.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::OscilloConfig;
use crate::player::{shared_window, AudioPipeline, LifecycleController, SharedWindow, TimeTracker};
use crate::ui::{DisplayState, PlayerCommand, PlayerTui};
use crate::viz::VizSession;

/// Command-line overrides for the visualizer configuration.
#[derive(Debug, Default)]
pub struct PlayOptions {
    pub cadence_ms: Option<u64>,
    pub smoothness: Option<u32>,
    pub line_color: Option<String>,
    pub line_width: Option<f32>,
    pub amplitude_scale: Option<f32>,
    /// Write the final rendered frame as PNG on exit
    pub dump: Option<PathBuf>,
}

/// Plays the given track with live visualization until it ends or the
/// user quits.
///
/// # Errors
/// - If the track cannot be opened or decoded
/// - If the platform has no audio output
/// - If the visualizer configuration is invalid
pub fn handle_play(track: PathBuf, opts: PlayOptions) -> anyhow::Result<()> {
    let mut config = OscilloConfig::load()?;
    apply_overrides(&mut config, &opts);

    let window = shared_window();
    let pipeline = AudioPipeline::new(window.clone());
    let mut controller = LifecycleController::new(pipeline);
    let mut session = VizSession::new(&config.visualizer)?;

    // External reset collaborator: SIGUSR1 flips the flag, the loop
    // picks it up on the next tick.
    let reset_flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, reset_flag.clone())?;

    controller.set_track(&track)?;
    controller.play()?;
    tracing::info!("Playing {}", track.display());

    let mut tui = PlayerTui::new()?;
    let result = run_player_loop(
        &mut tui,
        &mut controller,
        &mut session,
        &window,
        &reset_flag,
        &track,
    );
    tui.cleanup()?;
    result?;

    if let Some(path) = &opts.dump {
        session
            .pixmap()
            .save_png(path)
            .map_err(|e| anyhow::anyhow!("Failed to write frame dump: {e}"))?;
        println!("Final frame written to {}", path.display());
    }

    Ok(())
}

fn apply_overrides(config: &mut OscilloConfig, opts: &PlayOptions) {
    let viz = &mut config.visualizer;
    if let Some(v) = opts.cadence_ms {
        viz.sampling_cadence_ms = v;
    }
    if let Some(v) = opts.smoothness {
        viz.smoothness = v;
    }
    if let Some(v) = &opts.line_color {
        viz.line_color = v.clone();
    }
    if let Some(v) = opts.line_width {
        viz.line_width = v;
    }
    if let Some(v) = opts.amplitude_scale {
        viz.amplitude_scale = v;
    }
}

fn run_player_loop(
    tui: &mut PlayerTui,
    controller: &mut LifecycleController<AudioPipeline>,
    session: &mut VizSession,
    window: &SharedWindow,
    reset_flag: &Arc<AtomicBool>,
    track: &std::path::Path,
) -> anyhow::Result<()> {
    let track_name = track
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| track.display().to_string());

    let mut tracker = TimeTracker::new();
    let start = Instant::now();

    loop {
        if session.is_cancelled() {
            break;
        }

        if reset_flag.swap(false, Ordering::Relaxed) {
            tracing::info!("External reset received");
            reset_all(controller, session, &mut tracker)?;
            break;
        }

        tracker.update(controller.position(), controller.duration(), tui);

        let display = DisplayState {
            state: controller.state(),
            track: track_name.clone(),
        };

        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        let frame = session.render_tick(now_ms, window)?;
        tui.render(&display, frame)?;

        match tui.handle_input()? {
            PlayerCommand::Continue => {}
            PlayerCommand::TogglePause => controller.toggle()?,
            PlayerCommand::Reset => {
                reset_all(controller, session, &mut tracker)?;
                break;
            }
            PlayerCommand::Quit => session.cancel(),
        }

        // natural end hands control to the reset path immediately
        if controller.poll_ended() {
            reset_all(controller, session, &mut tracker)?;
            break;
        }
    }

    Ok(())
}

fn reset_all(
    controller: &mut LifecycleController<AudioPipeline>,
    session: &mut VizSession,
    tracker: &mut TimeTracker,
) -> anyhow::Result<()> {
    controller.reset();
    session.reset()?;
    tracker.reset();
    Ok(())
}
