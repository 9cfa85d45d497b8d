use serde::{ Serialize, Deserialize };

/// Conversation roles recognized by the facade. Anything else in a request
/// is a deserialization failure, not a default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Inbound payload of `POST /chat`. Message order is chronological turn
/// order and is forwarded to the pipeline unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Normalized result of a pipeline call. Upstream runtimes answer with
/// either a bare reply string or a message sequence; both collapse here so
/// callers never branch on which field was populated.
#[derive(Clone, Debug)]
pub struct AgentReply {
    messages: Vec<ChatMessage>,
}

impl AgentReply {
    /// Builds a reply from a bare assistant string.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, text)],
        }
    }

    /// Builds a reply from an upstream message sequence. The last message
    /// carries the assistant turn.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        Some(Self { messages })
    }

    /// The assistant's reply text. Invariant: non-empty message list, so
    /// this always has a final element.
    pub fn assistant_reply(&self) -> &str {
        &self.messages[self.messages.len() - 1].content
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
