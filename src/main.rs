use clap::Parser;

mod app;
mod cli;
mod commands;
mod core;
mod display;
mod format;
mod input;
mod persist;
mod providers;
mod session;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::handler;
use crate::session::{SAVE_FILE, SessionState};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let mut state = SessionState::new(&args.model);

    match handler::acquire_api_key(args.api_key.as_deref().unwrap_or("")) {
        Some(key) => {
            state.api_key = Some(key);
            state.build(false);
        }
        None => {
            eprintln!("Sorry, an API key is required to run this program!");
            std::process::exit(1);
        }
    }

    let session_file = args.session.as_deref().unwrap_or(SAVE_FILE);
    let session_path = persist::adjust_pathname(session_file);
    if session_path.exists() {
        match persist::load(&mut state, &session_path) {
            Ok(()) => display::show_history(&state),
            Err(_) => display::emit(
                &format!(
                    "\n\nError reading program state from {}.\n",
                    session_path.display()
                ),
                &state.prefs.debug,
            ),
        }
    }

    display::emit(
        &format!("\n\nGChat version {}\n", env!("CARGO_PKG_VERSION")),
        &state.prefs.code,
    );

    let mut application = Application::new(state);
    if let Err(e) = application.run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
