use crate::core::error::GchatError;
use crate::providers::gemini::GeminiClient;
use crate::providers::{Message, Role, SendMessage};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Filename used to carry the session between program runs.
pub const SAVE_FILE: &str = "lastchat.conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    Harassment,
    SexuallyExplicit,
    DangerousContent,
    HateSpeech,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
        HarmCategory::HateSpeech,
    ];

    pub fn api_name(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "Harassment",
            HarmCategory::SexuallyExplicit => "Sexually Explicit",
            HarmCategory::DangerousContent => "Dangerous Content",
            HarmCategory::HateSpeech => "Hate Speech",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

impl BlockThreshold {
    pub fn api_name(&self) -> &'static str {
        match self {
            BlockThreshold::BlockNone => "BLOCK_NONE",
            BlockThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            BlockThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            BlockThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlockThreshold::BlockNone => "Block None",
            BlockThreshold::BlockOnlyHigh => "Block High",
            BlockThreshold::BlockMediumAndAbove => "Block Medium and Higher",
            BlockThreshold::BlockLowAndAbove => "Block Low and Higher",
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            BlockThreshold::BlockNone => 0,
            BlockThreshold::BlockOnlyHigh => 1,
            BlockThreshold::BlockMediumAndAbove => 2,
            BlockThreshold::BlockLowAndAbove => 3,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(BlockThreshold::BlockNone),
            1 => Some(BlockThreshold::BlockOnlyHigh),
            2 => Some(BlockThreshold::BlockMediumAndAbove),
            3 => Some(BlockThreshold::BlockLowAndAbove),
            _ => None,
        }
    }
}

/// One threshold per harm category, never partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySettings {
    pub harassment: BlockThreshold,
    pub sexually_explicit: BlockThreshold,
    pub dangerous_content: BlockThreshold,
    pub hate_speech: BlockThreshold,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            harassment: BlockThreshold::BlockMediumAndAbove,
            sexually_explicit: BlockThreshold::BlockMediumAndAbove,
            dangerous_content: BlockThreshold::BlockMediumAndAbove,
            hate_speech: BlockThreshold::BlockMediumAndAbove,
        }
    }
}

impl SafetySettings {
    pub fn get(&self, category: HarmCategory) -> BlockThreshold {
        match category {
            HarmCategory::Harassment => self.harassment,
            HarmCategory::SexuallyExplicit => self.sexually_explicit,
            HarmCategory::DangerousContent => self.dangerous_content,
            HarmCategory::HateSpeech => self.hate_speech,
        }
    }

    pub fn set(&mut self, category: HarmCategory, threshold: BlockThreshold) {
        match category {
            HarmCategory::Harassment => self.harassment = threshold,
            HarmCategory::SexuallyExplicit => self.sexually_explicit = threshold,
            HarmCategory::DangerousContent => self.dangerous_content = threshold,
            HarmCategory::HateSpeech => self.hate_speech = threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub candidate_count: u32,
    pub stop_sequences: Vec<String>,
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            candidate_count: 1,
            stop_sequences: Vec::new(),
            max_output_tokens: 256,
            temperature: 0.05,
            top_p: 0.9,
            top_k: 1,
        }
    }
}

/// Font and color identifiers for one output class. Fonts are opaque to the
/// core; colors are resolved to terminal colors at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSpec {
    pub font: String,
    pub color: String,
}

impl StyleSpec {
    fn new(font: &str, color: &str) -> Self {
        Self {
            font: font.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationPrefs {
    pub user: StyleSpec,
    pub reply: StyleSpec,
    pub help: StyleSpec,
    pub debug: StyleSpec,
    pub code: StyleSpec,
    pub help_accent: String,
    pub back_color: String,
    pub clear_first: bool,
}

impl Default for PresentationPrefs {
    fn default() -> Self {
        Self {
            user: StyleSpec::new("Arial Black", "cyan"),
            reply: StyleSpec::new("Arial", "white"),
            help: StyleSpec::new("Arial Black", "green"),
            debug: StyleSpec::new("Arial Black", "red"),
            code: StyleSpec::new("Cascadia Mono", "yellow"),
            help_accent: "yellow".to_string(),
            back_color: "black".to_string(),
            clear_first: false,
        }
    }
}

/// The live conversation with the remote model. Owns its own copy of the
/// history; `SessionState::build` keeps it in sync with the snapshot.
pub struct ChatHandle {
    pub history: Vec<Message>,
    transport: Box<dyn SendMessage>,
}

impl ChatHandle {
    pub fn new(transport: Box<dyn SendMessage>) -> Self {
        Self {
            history: Vec::new(),
            transport,
        }
    }

    /// Forwards `text` to the model. History is appended (user message, then
    /// reply) only after the send settles successfully.
    pub async fn send(&mut self, text: &str) -> Result<String, GchatError> {
        let reply = self.transport.send(&self.history, text).await?;
        self.history.push(Message::new(Role::User, text));
        self.history.push(Message::new(Role::Model, reply.clone()));
        Ok(reply)
    }
}

pub struct SessionState {
    pub history: Vec<Message>,
    pub params: GenerationParams,
    pub safety: SafetySettings,
    pub prefs: PresentationPrefs,
    pub api_key: Option<String>,
    pub model: String,
    pub chat: ChatHandle,
}

impl SessionState {
    pub fn new(model: &str) -> Self {
        let mut state = Self {
            history: Vec::new(),
            params: GenerationParams::default(),
            safety: SafetySettings::default(),
            prefs: PresentationPrefs::default(),
            api_key: None,
            model: model.to_string(),
            chat: ChatHandle::new(Box::new(GeminiClient::new(
                String::new(),
                model.to_string(),
                GenerationParams::default(),
                SafetySettings::default(),
            ))),
        };
        state.build(false);
        state
    }

    /// Copies the live history into the snapshot.
    pub fn snapshot(&mut self) {
        self.history = self.chat.history.clone();
    }

    /// Replaces the live handle. Parameters and safety settings can only be
    /// supplied at construction time, so any edit to them (or to the API
    /// key) must come through here; the history is replayed explicitly
    /// because a fresh handle starts empty.
    pub fn build(&mut self, use_prior_history: bool) {
        let transport = Box::new(GeminiClient::new(
            self.api_key.clone().unwrap_or_default(),
            self.model.clone(),
            self.params.clone(),
            self.safety.clone(),
        ));
        self.build_with(use_prior_history, transport);
    }

    pub fn build_with(&mut self, use_prior_history: bool, transport: Box<dyn SendMessage>) {
        if use_prior_history {
            self.snapshot();
        }
        self.chat = ChatHandle::new(transport);
        self.chat.history = self.history.clone();
    }

    /// Empties both the live history and the snapshot.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.chat.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubSend(&'static str);

    #[async_trait]
    impl SendMessage for StubSend {
        async fn send(&self, _history: &[Message], _text: &str) -> Result<String, GchatError> {
            Ok(self.0.to_string())
        }
    }

    struct FailSend;

    #[async_trait]
    impl SendMessage for FailSend {
        async fn send(&self, _history: &[Message], _text: &str) -> Result<String, GchatError> {
            Err(GchatError::Network("no route to host".to_string()))
        }
    }

    #[tokio::test]
    async fn send_appends_user_then_model_after_settling() {
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.build_with(false, Box::new(StubSend("Hi there")));

        let reply = state.chat.send("Hello").await.unwrap();
        assert_eq!(reply, "Hi there");
        assert_eq!(
            state.chat.history,
            vec![
                Message::new(Role::User, "Hello"),
                Message::new(Role::Model, "Hi there"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_send_leaves_history_untouched() {
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.build_with(false, Box::new(FailSend));

        assert!(state.chat.send("Hello").await.is_err());
        assert!(state.chat.history.is_empty());
    }

    #[tokio::test]
    async fn build_replays_history_into_fresh_handle() {
        let mut state = SessionState::new(DEFAULT_MODEL);
        state.build_with(false, Box::new(StubSend("one")));
        state.chat.send("first").await.unwrap();

        // Snapshot the in-flight conversation, then rebuild.
        state.build_with(true, Box::new(StubSend("two")));
        assert_eq!(state.chat.history, state.history);
        assert_eq!(state.chat.history.len(), 2);

        // Without the snapshot, rebuild restores from the stored history.
        state.chat.send("second").await.unwrap();
        state.build_with(false, Box::new(StubSend("three")));
        assert_eq!(state.chat.history, state.history);
        assert_eq!(state.chat.history.len(), 2);
    }

    #[test]
    fn safety_set_is_never_partial() {
        let mut safety = SafetySettings::default();
        safety.set(HarmCategory::HateSpeech, BlockThreshold::BlockNone);
        for category in HarmCategory::ALL {
            let expected = if category == HarmCategory::HateSpeech {
                BlockThreshold::BlockNone
            } else {
                BlockThreshold::BlockMediumAndAbove
            };
            assert_eq!(safety.get(category), expected);
        }
    }

    #[test]
    fn threshold_levels_round_trip() {
        for level in 0..=3 {
            let threshold = BlockThreshold::from_level(level).unwrap();
            assert_eq!(threshold.level(), level);
        }
        assert!(BlockThreshold::from_level(4).is_none());
    }
}
