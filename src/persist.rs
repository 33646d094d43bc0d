use crate::core::error::GchatError;
use crate::providers::{Message, Role};
use crate::session::{GenerationParams, PresentationPrefs, SafetySettings, SessionState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONVERSATION_EXT: &str = "conversation";
pub const SETTINGS_EXT: &str = "chatsettings";
pub const TEXT_EXT: &str = "txt";

/// One history entry as stored in a conversation file. Matches the Gemini
/// Content shape so saved files round-trip through the API types.
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

/// The persisted half of a session: everything except the live handle and
/// the history, which go to the conversation file.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSettings {
    pub api_key: Option<String>,
    pub params: GenerationParams,
    pub safety: SafetySettings,
    pub prefs: PresentationPrefs,
}

pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gchat")
}

/// Bare filenames resolve under the application directory; anything with a
/// path separator is used as-is.
pub fn adjust_pathname(filename: &str) -> PathBuf {
    if filename.contains(std::path::MAIN_SEPARATOR) || filename.contains('/') {
        PathBuf::from(filename)
    } else {
        app_dir().join(filename)
    }
}

fn settings_path(path: &Path) -> PathBuf {
    path.with_extension(SETTINGS_EXT)
}

pub fn serialize_history(history: &[Message]) -> Result<String, GchatError> {
    let contents: Vec<Content> = history
        .iter()
        .map(|m| Content {
            role: m.role.as_str().to_string(),
            parts: vec![ContentPart {
                text: m.text.clone(),
            }],
        })
        .collect();
    Ok(serde_json::to_string_pretty(&contents)?)
}

pub fn deserialize_history(json: &str) -> Result<Vec<Message>, GchatError> {
    let contents: Vec<Content> = serde_json::from_str(json)?;
    Ok(contents
        .into_iter()
        .map(|c| {
            let text = c.parts.into_iter().next().map(|p| p.text).unwrap_or_default();
            Message::new(Role::from_str(&c.role), text)
        })
        .collect())
}

/// Writes the conversation to `path` and the rest of the session to the
/// companion file next to it.
pub fn save(state: &mut SessionState, path: &Path) -> Result<(), GchatError> {
    state.snapshot();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let settings = SessionSettings {
        api_key: state.api_key.clone(),
        params: state.params.clone(),
        safety: state.safety.clone(),
        prefs: state.prefs.clone(),
    };
    fs::write(
        settings_path(path),
        serde_json::to_string_pretty(&settings)?,
    )?;
    fs::write(path, serialize_history(&state.history)?)?;
    Ok(())
}

/// Restores a whole session from `path` and its companion file. Both files
/// are parsed before anything is touched, so a failure leaves the current
/// session exactly as it was.
pub fn load(state: &mut SessionState, path: &Path) -> Result<(), GchatError> {
    let settings_json = fs::read_to_string(settings_path(path))?;
    let settings: SessionSettings = serde_json::from_str(&settings_json)?;
    let history = deserialize_history(&fs::read_to_string(path)?)?;

    state.api_key = settings.api_key;
    state.params = settings.params;
    state.safety = settings.safety;
    state.prefs = settings.prefs;
    state.history = history;
    state.build(false);
    Ok(())
}

/// Renders the history as one `role: text` line per message.
pub fn export_history(history: &[Message]) -> String {
    let mut out = String::new();
    for message in history {
        out.push_str(message.role.as_str());
        out.push_str(": ");
        out.push_str(&message.text);
        out.push('\n');
    }
    out
}

/// Parses the line-oriented export format back into a history. A line with
/// a single colon delimiter starts a new message; other lines append (with
/// their newline) to the message being built. `user` is the role until a
/// delimiter has been seen.
pub fn import_history(text: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::new();
    for line in text.lines() {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() == 2 {
            messages.push(Message::new(Role::from_str(parts[0].trim()), parts[1].trim()));
        } else if let Some(last) = messages.last_mut() {
            last.text.push_str(line);
            last.text.push('\n');
        } else {
            messages.push(Message::new(Role::User, format!("{}\n", line)));
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{BlockThreshold, DEFAULT_MODEL, HarmCategory};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gchat-test-{}-{}", std::process::id(), name))
    }

    fn sample_history() -> Vec<Message> {
        vec![
            Message::new(Role::User, "Hello"),
            Message::new(Role::Model, "Hi there"),
            Message::new(Role::Other, "imported note"),
        ]
    }

    #[test]
    fn history_round_trips_through_json() {
        for len in 0..=3 {
            let history: Vec<Message> = sample_history().into_iter().take(len).collect();
            let json = serialize_history(&history).unwrap();
            assert_eq!(deserialize_history(&json).unwrap(), history);
        }
    }

    #[test]
    fn conversation_file_uses_parts_shape() {
        let json = serialize_history(&[Message::new(Role::User, "Hello")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["role"], "user");
        assert_eq!(value[0]["parts"][0]["text"], "Hello");
    }

    #[test]
    fn unknown_roles_collapse_to_other() {
        let json = r#"[{"role": "System", "parts": [{"text": "x"}]}]"#;
        let history = deserialize_history(json).unwrap();
        assert_eq!(history[0].role, Role::Other);
    }

    #[test]
    fn save_then_load_restores_the_session() {
        let path = temp_path("roundtrip.conversation");
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.api_key = Some("key".to_string());
        state.params.top_k = 7;
        state
            .safety
            .set(HarmCategory::Harassment, BlockThreshold::BlockNone);
        state.chat.history = sample_history();
        save(&mut state, &path).unwrap();

        let mut restored = SessionState::new(DEFAULT_MODEL);
        load(&mut restored, &path).unwrap();
        assert_eq!(restored.api_key.as_deref(), Some("key"));
        assert_eq!(restored.params.top_k, 7);
        assert_eq!(
            restored.safety.get(HarmCategory::Harassment),
            BlockThreshold::BlockNone
        );
        assert_eq!(restored.history, sample_history());
        assert_eq!(restored.chat.history, restored.history);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(settings_path(&path));
    }

    #[test]
    fn load_failure_leaves_state_untouched() {
        let path = temp_path("missing.conversation");
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.api_key = Some("keep".to_string());
        state.params.temperature = 0.42;
        state.history = sample_history();
        state.chat.history = sample_history();

        assert!(load(&mut state, &path).is_err());
        assert_eq!(state.api_key.as_deref(), Some("keep"));
        assert_eq!(state.params.temperature, 0.42);
        assert_eq!(state.history, sample_history());
        assert_eq!(state.chat.history, sample_history());
    }

    #[test]
    fn load_rejects_malformed_history_without_mutating() {
        let path = temp_path("malformed.conversation");
        let mut state = SessionState::new(DEFAULT_MODEL);
        save(&mut state, &path).unwrap();
        fs::write(&path, "not json").unwrap();

        let mut other = SessionState::new(DEFAULT_MODEL);
        other.history = sample_history();
        other.chat.history = sample_history();
        assert!(load(&mut other, &path).is_err());
        assert_eq!(other.history, sample_history());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(settings_path(&path));
    }

    #[test]
    fn export_writes_one_line_per_message() {
        let history = vec![
            Message::new(Role::User, "Hello"),
            Message::new(Role::Model, "Hi there"),
        ];
        assert_eq!(export_history(&history), "user: Hello\nmodel: Hi there\n");
    }

    #[test]
    fn import_reverses_export() {
        let history = import_history("user: Hello\nmodel: Hi there\n");
        assert_eq!(
            history,
            vec![
                Message::new(Role::User, "Hello"),
                Message::new(Role::Model, "Hi there"),
            ]
        );
    }

    #[test]
    fn import_appends_continuation_lines_to_current_message() {
        let history = import_history("model: first\nsecond line\nthird");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::Model);
        assert_eq!(history[0].text, "firstsecond line\nthird\n");
    }

    #[test]
    fn import_defaults_to_user_before_any_role() {
        let history = import_history("no role here\nstill none");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "no role here\nstill none\n");
    }

    #[test]
    fn bare_filenames_resolve_under_the_app_dir() {
        assert_eq!(
            adjust_pathname("lastchat.conversation"),
            app_dir().join("lastchat.conversation")
        );
        let explicit = format!("some{}dir{}file.conversation", '/', '/');
        assert_eq!(adjust_pathname(&explicit), PathBuf::from(explicit.clone()));
    }
}
