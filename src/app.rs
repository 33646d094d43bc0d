use crate::commands::{self, Recognized, dispatcher, dispatcher::Outcome};
use crate::core::error::GchatError;
use crate::display;
use crate::input;
use crate::persist;
use crate::session::{SAVE_FILE, SessionState};

/// The single in-flight request slot. Submission is gated on `Idle`; the
/// slot is reset unconditionally when a send settles, failure included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendSlot {
    Idle,
    Sending,
}

pub struct Application {
    pub state: SessionState,
    send_slot: SendSlot,
}

impl Application {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            send_slot: SendSlot::Idle,
        }
    }

    /// The interactive event loop: one read, one recognize, one dispatch
    /// or send, repeated until quit.
    pub async fn run(&mut self) -> Result<(), GchatError> {
        let mut editor = input::create_editor()?;

        loop {
            let line = match input::read_input(&mut editor)? {
                Some(line) => line,
                None => {
                    // Closing the prompt acts as a confirmed /quit.
                    persist::save(&mut self.state, &persist::adjust_pathname(SAVE_FILE))?;
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match commands::recognize(&line) {
                Recognized::Command(command) => {
                    display::render(
                        &format!("\n\nCommand \"`/{}`\" running.", command.name),
                        &self.state.prefs.help,
                        &display::help_accent(&self.state.prefs),
                    );
                    match dispatcher::dispatch(&command, &mut self.state) {
                        Ok(Outcome::Quit) => break,
                        Ok(Outcome::Continue) => {}
                        Err(fatal @ GchatError::Fatal(_)) => return Err(fatal),
                        Err(e) => display::emit(
                            &format!("\n{}\n", e),
                            &self.state.prefs.debug,
                        ),
                    }
                }
                Recognized::Message(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    self.submit(&text).await;
                }
            }
        }

        input::save_history(&mut editor)?;
        Ok(())
    }

    /// Forwards one message to the model and renders the exchange. A
    /// transport failure is reported debug-styled and never escapes; the
    /// session stays usable.
    async fn submit(&mut self, text: &str) {
        if self.send_slot != SendSlot::Idle {
            return;
        }
        self.send_slot = SendSlot::Sending;
        let result = self.state.chat.send(text).await;
        self.send_slot = SendSlot::Idle;

        if self.state.prefs.clear_first {
            display::clear_screen();
        }
        display::render(
            &format!("\n\n{}", text),
            &self.state.prefs.user,
            &self.state.prefs.code,
        );
        match result {
            Ok(reply) => display::render(
                &format!("\n\n{}", reply),
                &self.state.prefs.reply,
                &self.state.prefs.code,
            ),
            Err(e) => display::render(
                &format!(
                    "\n\nThere was an error. Make sure you are online and if needed, \
                     do a \"/api\" Command. The reported error is {}",
                    e
                ),
                &self.state.prefs.debug,
                &self.state.prefs.code,
            ),
        }
    }
}
