pub mod dispatcher;
pub mod editor;
pub mod handler;

use regex::Regex;
use std::sync::OnceLock;

/// The closed set of built-in commands. `exit` and `reset` are aliases
/// resolved during recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Quit,
    Help,
    New,
    Safe,
    Save,
    Load,
    Params,
    Clear,
    Settings,
    Export,
    Import,
    Show,
    Api,
    Version,
}

impl CommandKind {
    /// Every name recognition accepts, aliases and `/pass` included. Used
    /// for completion and the help listing.
    pub const NAMES: [&'static str; 17] = [
        "quit", "exit", "help", "new", "reset", "safe", "save", "load", "params", "clear",
        "settings", "pass", "export", "import", "show", "api", "version",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quit" | "exit" => Some(CommandKind::Quit),
            "help" => Some(CommandKind::Help),
            "new" | "reset" => Some(CommandKind::New),
            "safe" => Some(CommandKind::Safe),
            "save" => Some(CommandKind::Save),
            "load" => Some(CommandKind::Load),
            "params" => Some(CommandKind::Params),
            "clear" => Some(CommandKind::Clear),
            "settings" => Some(CommandKind::Settings),
            "export" => Some(CommandKind::Export),
            "import" => Some(CommandKind::Import),
            "show" => Some(CommandKind::Show),
            "api" => Some(CommandKind::Api),
            "version" => Some(CommandKind::Version),
            _ => None,
        }
    }

    pub fn describe(name: &str) -> Option<&'static str> {
        match name {
            "quit" | "exit" => Some("Quit the program"),
            "help" => Some("Get command help"),
            "new" | "reset" => Some("Reset the conversation"),
            "safe" => Some("Adjust the safety parameters"),
            "save" => Some("Save the conversation"),
            "load" => Some("Load the conversation"),
            "params" => Some("Let you adjust the model parameters"),
            "clear" => Some("Clear the results area"),
            "settings" => Some("Allow you to change the program settings"),
            "pass" => Some("Pass the following text without interpretation"),
            "export" => Some("Exports the conversation as a text file"),
            "import" => Some("Imports the conversation from a text file"),
            "show" => Some("Show the conversation"),
            "api" => Some("Gets an api key"),
            "version" => Some("Shows the version of this program"),
            _ => None,
        }
    }

    pub fn parameter_hint(name: &str) -> Option<&'static str> {
        match name {
            "save" | "load" | "import" | "export" => Some("filename"),
            "api" => Some("api key"),
            _ => None,
        }
    }
}

/// Ephemeral parse result, discarded after dispatch. `name` is the folded
/// name as typed (for the running notice); `param` is verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    pub kind: CommandKind,
    pub name: String,
    pub param: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized {
    Command(PendingCommand),
    Message(String),
}

fn command_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // (?s) so a parameter may carry embedded newlines.
    RE.get_or_init(|| Regex::new(r"(?s)^/(\w+)(?:\s(.+))?$").expect("command regex"))
}

/// Decides whether `input` is a command invocation. Anything that does not
/// match the pattern, or names an unregistered command, is a plain message;
/// `/pass` strips itself and turns its parameter into the message.
pub fn recognize(input: &str) -> Recognized {
    if let Some(caps) = command_regex().captures(input) {
        let name = caps[1].to_lowercase();
        let param = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if name == "pass" {
            return Recognized::Message(param);
        }
        if let Some(kind) = CommandKind::from_name(&name) {
            return Recognized::Command(PendingCommand { kind, name, param });
        }
    }
    Recognized::Message(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        for input in ["hello world", "what is /save?", "  /save", "/", "/!bang"] {
            assert_eq!(recognize(input), Recognized::Message(input.to_string()));
        }
    }

    #[test]
    fn command_name_is_case_folded_and_param_verbatim() {
        match recognize("/Save report.txt") {
            Recognized::Command(cmd) => {
                assert_eq!(cmd.kind, CommandKind::Save);
                assert_eq!(cmd.name, "save");
                assert_eq!(cmd.param, "report.txt");
            }
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn parameter_keeps_case_whitespace_and_newlines() {
        match recognize("/api  MiXeD Case\nsecond line") {
            Recognized::Command(cmd) => {
                assert_eq!(cmd.kind, CommandKind::Api);
                assert_eq!(cmd.param, " MiXeD Case\nsecond line");
            }
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn pass_resolves_to_a_message() {
        assert_eq!(
            recognize("/pass anything/here"),
            Recognized::Message("anything/here".to_string())
        );
        assert_eq!(
            recognize("/pass /save"),
            Recognized::Message("/save".to_string())
        );
    }

    #[test]
    fn unregistered_command_is_forwarded_verbatim() {
        assert_eq!(
            recognize("/frobnicate now"),
            Recognized::Message("/frobnicate now".to_string())
        );
    }

    #[test]
    fn aliases_resolve_to_their_targets() {
        for (input, kind) in [("/exit", CommandKind::Quit), ("/reset", CommandKind::New)] {
            match recognize(input) {
                Recognized::Command(cmd) => assert_eq!(cmd.kind, kind),
                other => panic!("expected a command, got {:?}", other),
            }
        }
    }

    #[test]
    fn bare_command_has_empty_parameter() {
        match recognize("/show") {
            Recognized::Command(cmd) => {
                assert_eq!(cmd.kind, CommandKind::Show);
                assert!(cmd.param.is_empty());
            }
            other => panic!("expected a command, got {:?}", other),
        }
    }
}
