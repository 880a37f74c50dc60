//! Terminal user interface for playback with waveform preview.
//!
//! The TUI is the display collaborator: it renders a terminal-sized
//! preview of the blended frame, shows lifecycle state and elapsed /
//! remaining time, and turns key presses into playback commands.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::Sparkline,
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use crate::player::time::{format_time, TimeObserver};
use crate::player::PlaybackState;

/// User input command during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Keep playing (no key pressed)
    Continue,
    /// Pause/resume playback (Space key)
    TogglePause,
    /// Reset playback to idle ('r' key)
    Reset,
    /// Exit the player (Escape or 'q')
    Quit,
}

/// Snapshot of what the display shows this tick.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub state: PlaybackState,
    pub track: String,
}

/// Terminal UI for audio playback with waveform preview.
pub struct PlayerTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    terminal_width: usize,
    current: Duration,
    duration: Option<Duration>,
}

impl PlayerTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let terminal_width = size.width as usize;

        Ok(PlayerTui {
            terminal,
            terminal_width,
            current: Duration::ZERO,
            duration: None,
        })
    }

    /// Renders the mirrored waveform preview and the playback footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, display: &DisplayState, frame: &[f32]) -> anyhow::Result<()> {
        let size = self.terminal.size()?;
        self.terminal_width = size.width as usize;

        let preview = downsample_peaks(frame, self.terminal_width);
        let inverted: Vec<u64> = preview.iter().map(|&v| 100_u64.saturating_sub(v)).collect();

        let indicator = match display.state {
            PlaybackState::Playing => {
                ratatui::text::Span::styled("▶ ", Style::default().fg(Color::Green))
            }
            PlaybackState::Paused => {
                ratatui::text::Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            }
            PlaybackState::Loading => {
                ratatui::text::Span::styled("… ", Style::default().fg(Color::Blue))
            }
            PlaybackState::Ended => {
                ratatui::text::Span::styled("■ ", Style::default().fg(Color::Red))
            }
            _ => ratatui::text::Span::raw("  "),
        };

        let elapsed_span = ratatui::text::Span::raw(format_time(self.current));
        let total_span = match self.duration {
            Some(d) => ratatui::text::Span::raw(format!(
                " / {} (-{})",
                format_time(d),
                format_time(d.saturating_sub(self.current))
            )),
            None => ratatui::text::Span::raw(" / -:--"),
        };
        let track_span = ratatui::text::Span::raw(format!("  {}", display.track));

        self.terminal.draw(|frame_ctx| {
            let area = frame_ctx.area();

            let footer_height = 1;

            let content_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let top_height = content_area.height / 2;

            let top_area = Rect {
                x: content_area.x,
                y: content_area.y,
                width: content_area.width,
                height: top_height,
            };

            // upper half grows downward toward the center: inverted data
            let top_sparkline = Sparkline::default().data(&inverted).max(100).style(
                Style::default()
                    .bg(Color::Rgb(0, 80, 0))
                    .fg(Color::Rgb(0, 0, 0)),
            );
            frame_ctx.render_widget(top_sparkline, top_area);

            let bottom_area = Rect {
                x: content_area.x,
                y: content_area.y + top_height,
                width: content_area.width,
                height: content_area.height.saturating_sub(top_height),
            };

            let bottom_sparkline = Sparkline::default().data(&preview).max(100).style(
                Style::default()
                    .bg(Color::Rgb(0, 0, 0))
                    .fg(Color::Rgb(0, 200, 0)),
            );
            frame_ctx.render_widget(bottom_sparkline, bottom_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let help_text = ratatui::text::Line::from(vec![
                indicator,
                elapsed_span,
                total_span,
                track_span,
            ]);

            let footer = ratatui::widgets::Paragraph::new(help_text).style(
                Style::default()
                    .fg(Color::Rgb(185, 212, 185))
                    .bg(Color::Rgb(0, 0, 0)),
            );

            frame_ctx.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Processes user input and returns the appropriate player command.
    ///
    /// # Returns
    /// - `Continue` if no key or unrecognized key was pressed
    /// - `TogglePause` if Space was pressed
    /// - `Reset` if 'r' was pressed
    /// - `Quit` if Escape, 'q' or Ctrl+C was pressed
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<PlayerCommand> {
        if event::poll(std::time::Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: toggling pause");
                        PlayerCommand::TogglePause
                    }
                    KeyCode::Char('r') => {
                        tracing::debug!("'r' pressed: resetting playback");
                        PlayerCommand::Reset
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: quitting");
                        PlayerCommand::Quit
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: quitting");
                        PlayerCommand::Quit
                    }
                    _ => PlayerCommand::Continue,
                });
            }
        }
        Ok(PlayerCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl TimeObserver for PlayerTui {
    fn time_changed(&mut self, current: Duration, duration: Option<Duration>) {
        self.current = current;
        self.duration = duration;
    }
}

/// Buckets the blended frame into `width` columns, keeping the peak
/// absolute amplitude per bucket scaled to 0-100.
fn downsample_peaks(frame: &[f32], width: usize) -> Vec<u64> {
    if frame.is_empty() || width == 0 {
        return vec![0; width];
    }
    let chunk = frame.len().div_ceil(width);
    frame
        .chunks(chunk)
        .map(|c| {
            let peak = c.iter().fold(0.0f32, |acc, &v| acc.max(v.abs()));
            (peak.min(1.0) * 100.0) as u64
        })
        .chain(std::iter::repeat(0))
        .take(width)
        .collect()
}
