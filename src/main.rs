mod app;
mod commands;
mod config;
mod error;
mod logging;
mod player;
mod ui;
mod viz;

fn main() {
    if let Err(e) = app::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
