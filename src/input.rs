use crate::commands::CommandKind;
use crate::core::error::GchatError;
use crate::persist;
use console::style;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::path::PathBuf;

/// Completes slash commands at the start of the line and falls back to
/// filename completion elsewhere (useful for /save, /load and friends).
pub struct ChatHelper {
    filename_completer: FilenameCompleter,
}

impl ChatHelper {
    pub fn new() -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
        }
    }
}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with('/') && pos >= 1 && !line[..pos].contains(char::is_whitespace) {
            let command_part = &line[1..pos];
            let matches: Vec<Pair> = CommandKind::NAMES
                .iter()
                .filter(|name| name.starts_with(command_part))
                .map(|name| Pair {
                    display: format!("/{}", name),
                    replacement: name.to_string(),
                })
                .collect();
            if !matches.is_empty() {
                return Ok((1, matches));
            }
        }
        self.filename_completer.complete(line, pos, ctx)
    }
}

impl Hinter for ChatHelper {
    type Hint = String;
}

impl Highlighter for ChatHelper {}

impl Validator for ChatHelper {}

impl Helper for ChatHelper {}

fn history_path() -> PathBuf {
    persist::app_dir().join("input_history.txt")
}

/// Creates a configured rustyline editor
pub fn create_editor() -> Result<Editor<ChatHelper, FileHistory>, GchatError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor: Editor<ChatHelper, FileHistory> = Editor::with_config(config)
        .map_err(|e| GchatError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new()));
    let _ = editor.load_history(&history_path());

    Ok(editor)
}

/// Reads a line of input. `None` means the user closed the session with
/// Ctrl-C or Ctrl-D.
pub fn read_input(
    editor: &mut Editor<ChatHelper, FileHistory>,
) -> Result<Option<String>, GchatError> {
    let prompt = style("> ").bold().cyan().to_string();
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                if let Err(e) = editor.add_history_entry(&line) {
                    return Err(GchatError::Input(format!(
                        "Failed to add history entry: {}",
                        e
                    )));
                }
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(GchatError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history under the application directory.
pub fn save_history(editor: &mut Editor<ChatHelper, FileHistory>) -> Result<(), GchatError> {
    let path = history_path();
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GchatError::Input(format!("Failed to create history directory: {}", e)))?;
        }
    }
    editor
        .save_history(&path)
        .map_err(|e| GchatError::Input(format!("Failed to save history: {}", e)))
}
