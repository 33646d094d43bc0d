use crate::core::error::GchatError;
use crate::format;
use crate::providers::Role;
use crate::session::{PresentationPrefs, SessionState, StyleSpec};
use console::{Color, Style, Term};
use std::io::{self, Write};

fn color_of(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        _ => Color::White,
    }
}

fn style_of(spec: &StyleSpec) -> Style {
    let mut style = Style::new().fg(color_of(&spec.color));
    // Heavy fonts from the original map to bold in a terminal.
    if spec.font.contains("Black") {
        style = style.bold();
    }
    style
}

/// Writes `text` in a single style, no segmentation.
pub fn emit(text: &str, spec: &StyleSpec) {
    print!("{}", style_of(spec).apply_to(text));
    let _ = io::stdout().flush();
}

/// Segments `text` and writes prose runs with `prose`, code runs with
/// `code`.
pub fn render(text: &str, prose: &StyleSpec, code: &StyleSpec) {
    let prose_style = style_of(prose);
    let code_style = style_of(code);
    for segment in format::format(text) {
        if segment.is_code {
            print!("{}", code_style.apply_to(&segment.text));
        } else {
            print!("{}", prose_style.apply_to(&segment.text));
        }
    }
    let _ = io::stdout().flush();
}

/// The accent style used for inline code in help output.
pub fn help_accent(prefs: &PresentationPrefs) -> StyleSpec {
    StyleSpec {
        font: prefs.help.font.clone(),
        color: prefs.help_accent.clone(),
    }
}

pub fn clear_screen() {
    let _ = Term::stdout().clear_screen();
}

/// Yes/no confirmation in the original's `prompt: Sure?` phrasing.
pub fn confirm(prompt: &str) -> Result<bool, GchatError> {
    let answer = prompt_line(&format!("{}: Sure? [y/N] ", prompt))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

pub fn prompt_line(prompt: &str) -> Result<String, GchatError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\n', '\r']).to_string())
}

/// Clears the output area and re-renders the whole history, each message
/// styled by its role.
pub fn show_history(state: &SessionState) {
    clear_screen();
    for message in &state.chat.history {
        let text = format!("\n{}", message.text);
        match message.role {
            Role::User => render(&text, &state.prefs.user, &state.prefs.code),
            Role::Model => render(&text, &state.prefs.reply, &state.prefs.code),
            Role::Other => render(&text, &state.prefs.debug, &state.prefs.code),
        }
    }
}
