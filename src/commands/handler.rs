use super::CommandKind;
use super::dispatcher::Outcome;
use super::editor;
use crate::core::error::GchatError;
use crate::display;
use crate::persist;
use crate::session::{SAVE_FILE, SessionState};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Legacy environment variables tried, in order, when no explicit key is
/// supplied.
const API_KEY_VARS: [&str; 3] = ["Gemini_API_Key", "Bard_API_Key", "API_Key"];

/// Resolves a filename from the command parameter, falling back to an
/// interactive prompt. An empty answer cancels. Save-style operations
/// force their default extension; load-style ones take the name as given.
fn resolve_file(
    param: &str,
    prompt: &str,
    force_ext: Option<&str>,
) -> Result<Option<PathBuf>, GchatError> {
    let name = param.trim().to_string();
    let name = if name.is_empty() {
        display::prompt_line(prompt)?
    } else {
        name
    };
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    let path = persist::adjust_pathname(name);
    Ok(Some(match force_ext {
        Some(ext) => path.with_extension(ext),
        None => path,
    }))
}

pub fn quit(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    if display::confirm("Quit the program")? {
        persist::save(state, &persist::adjust_pathname(SAVE_FILE))?;
        return Ok(Outcome::Quit);
    }
    Ok(Outcome::Continue)
}

pub fn help(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    if state.prefs.clear_first {
        display::clear_screen();
    }
    let mut text = String::from("\n\nHelp!\n\n");
    text.push_str("Type a query or a Command at the prompt and press Enter to submit it.\n");
    text.push_str("The model's replies appear below your queries.\n\n");
    text.push_str("Here are your Commands available:");
    for name in CommandKind::NAMES {
        if let Some(description) = CommandKind::describe(name) {
            text.push_str(&format!("\n`/{}`: {}", name, description));
            if let Some(hint) = CommandKind::parameter_hint(name) {
                text.push_str(&format!("  Parameter: `{}`", hint));
            }
        }
    }
    text.push_str("\n\nAs you can see, all Commands begin with the forward slash.\n");
    display::render(&text, &state.prefs.help, &display::help_accent(&state.prefs));
    Ok(Outcome::Continue)
}

pub fn new(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    state.clear_history();
    Ok(Outcome::Continue)
}

pub fn safe(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    if let Some(safety) = editor::edit_safety(&state.safety)? {
        state.safety = safety;
        state.build(true);
    }
    Ok(Outcome::Continue)
}

pub fn save(param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    let Some(path) = resolve_file(
        param,
        "Save conversation to file: ",
        Some(persist::CONVERSATION_EXT),
    )?
    else {
        return Ok(Outcome::Continue);
    };
    persist::save(state, &path)?;
    display::emit(
        &format!("\nConversation saved to {}\n", path.display()),
        &state.prefs.help,
    );
    Ok(Outcome::Continue)
}

pub fn load(param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    let Some(path) = resolve_file(param, "Load conversation from file: ", None)? else {
        return Ok(Outcome::Continue);
    };
    match persist::load(state, &path) {
        Ok(()) => display::show_history(state),
        Err(_) => display::emit(
            &format!("\n\nError reading program state from {}.\n", path.display()),
            &state.prefs.debug,
        ),
    }
    Ok(Outcome::Continue)
}

pub fn params(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    if let Some(params) = editor::edit_params(&state.params)? {
        state.params = params;
        state.build(true);
    }
    Ok(Outcome::Continue)
}

pub fn clear(_param: &str, _state: &mut SessionState) -> Result<Outcome, GchatError> {
    display::clear_screen();
    Ok(Outcome::Continue)
}

pub fn settings(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    if let Some(edit) = editor::edit_settings(&state.prefs, state.api_key.as_deref())? {
        let key_changed = edit.api_key != state.api_key;
        state.prefs = edit.prefs;
        state.api_key = edit.api_key;
        if key_changed {
            state.build(true);
        }
        display::show_history(state);
    }
    Ok(Outcome::Continue)
}

pub fn export(param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    let Some(path) = resolve_file(
        param,
        "Export conversation to file: ",
        Some(persist::TEXT_EXT),
    )?
    else {
        return Ok(Outcome::Continue);
    };
    fs::write(&path, persist::export_history(&state.chat.history))?;
    display::emit(
        &format!("\nConversation exported to {}\n", path.display()),
        &state.prefs.help,
    );
    Ok(Outcome::Continue)
}

pub fn import(param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    let Some(path) = resolve_file(param, "Import conversation from file: ", None)? else {
        return Ok(Outcome::Continue);
    };
    match fs::read_to_string(&path) {
        Ok(text) => {
            let messages = persist::import_history(&text);
            state.history = messages.clone();
            state.chat.history = messages;
            display::show_history(state);
        }
        Err(_) => display::emit(
            &format!("\n\nError reading conversation from {}.\n", path.display()),
            &state.prefs.debug,
        ),
    }
    Ok(Outcome::Continue)
}

pub fn show(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    display::show_history(state);
    Ok(Outcome::Continue)
}

/// Key resolution order: explicit parameter, then the legacy environment
/// variables, then an interactive prompt. `None` means every source was
/// exhausted.
pub fn acquire_api_key(param: &str) -> Option<String> {
    let param = param.trim();
    if !param.is_empty() {
        return Some(param.to_string());
    }
    for var in API_KEY_VARS {
        if let Ok(value) = env::var(var) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    let entered = display::prompt_line("An API key is needed. Please enter it here: ").ok()?;
    let entered = entered.trim();
    if entered.is_empty() {
        None
    } else {
        Some(entered.to_string())
    }
}

pub fn api(param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    match acquire_api_key(param) {
        Some(key) => {
            state.api_key = Some(key);
            state.build(true);
            Ok(Outcome::Continue)
        }
        None => Err(GchatError::Fatal(
            "Sorry, an API key is required to run this program!".to_string(),
        )),
    }
}

pub fn version(_param: &str, state: &mut SessionState) -> Result<Outcome, GchatError> {
    display::emit(
        &format!("\n\nGChat version {}\n", env!("CARGO_PKG_VERSION")),
        &state.prefs.code,
    );
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{PendingCommand, dispatcher};
    use crate::providers::{Message, Role, SendMessage};
    use crate::session::DEFAULT_MODEL;
    use async_trait::async_trait;

    struct StubSend(&'static str);

    #[async_trait]
    impl SendMessage for StubSend {
        async fn send(&self, _history: &[Message], _text: &str) -> Result<String, GchatError> {
            Ok(self.0.to_string())
        }
    }

    fn command(kind: CommandKind, name: &str, param: &str) -> PendingCommand {
        PendingCommand {
            kind,
            name: name.to_string(),
            param: param.to_string(),
        }
    }

    #[test]
    fn new_clears_both_histories() {
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.history.push(Message::new(Role::User, "Hello"));
        state.chat.history.push(Message::new(Role::User, "Hello"));

        let outcome =
            dispatcher::dispatch(&command(CommandKind::New, "new", ""), &mut state).unwrap();
        assert_eq!(outcome, Outcome::Continue);
        assert!(state.history.is_empty());
        assert!(state.chat.history.is_empty());
    }

    #[tokio::test]
    async fn submitted_message_then_export_produces_two_lines() {
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.build_with(false, Box::new(StubSend("Hi there")));

        state.chat.send("Hello").await.unwrap();
        assert_eq!(
            state.chat.history,
            vec![
                Message::new(Role::User, "Hello"),
                Message::new(Role::Model, "Hi there"),
            ]
        );

        let path = std::env::temp_dir().join(format!("gchat-export-{}.txt", std::process::id()));
        let param = path.to_string_lossy().to_string();
        dispatcher::dispatch(&command(CommandKind::Export, "export", &param), &mut state).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "user: Hello\nmodel: Hi there\n"
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn api_with_parameter_rebuilds_with_the_new_key() {
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.chat.history.push(Message::new(Role::User, "Hello"));

        dispatcher::dispatch(&command(CommandKind::Api, "api", "fresh-key"), &mut state).unwrap();
        assert_eq!(state.api_key.as_deref(), Some("fresh-key"));
        // build(true) snapshots the live history before reconstruction.
        assert_eq!(state.history, state.chat.history);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn acquire_key_prefers_the_explicit_parameter() {
        assert_eq!(acquire_api_key("  abc  ").as_deref(), Some("abc"));
    }
}
