use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// API key for the Gemini API (overrides environment lookup)
    #[arg(short, long)]
    pub api_key: Option<String>,

    /// Model to converse with
    #[arg(short, long, default_value = "gemini-pro")]
    pub model: String,

    /// Conversation file to restore instead of the last session
    #[arg(short, long)]
    pub session: Option<String>,
}
