//! Transcript messages exchanged during a diagnostic dialogue.
//!
//! Every turn of a session is recorded as a [`Message`] with a speaker role
//! and text content. The dialogue loop only ever produces `bot` and `user`
//! messages; `system` exists for callers that want to seed a transcript with
//! framing text before replaying it elsewhere.
//!
//! # Examples
//!
//! ```
//! use diagsmith::message::Message;
//!
//! let question = Message::bot("What type of sound do you hear?");
//! let answer = Message::user("A grinding noise when braking.");
//!
//! assert!(question.has_role(Message::BOT));
//! assert_eq!(answer.render(), "user: A grinding noise when braking.");
//! ```

use serde::{Deserialize, Serialize};

/// One entry of a session transcript: a speaker role plus text.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The speaker role. Use the constants on [`Message`] for standard values.
    pub role: String,
    /// The text content of the message.
    pub content: String,
}

impl Message {
    /// Question-asking side of the dialogue.
    pub const BOT: &'static str = "bot";
    /// Answer-giving side of the dialogue.
    pub const USER: &'static str = "user";
    /// Framing or instruction text, never produced by the dialogue loop.
    pub const SYSTEM: &'static str = "system";

    /// Creates a message with the given role and content.
    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    /// Creates a bot question message.
    #[must_use]
    pub fn bot(content: &str) -> Self {
        Self::new(Self::BOT, content)
    }

    /// Creates a user answer message.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates a system framing message.
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    /// Returns true if this message has the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Renders the message as a `role: content` line, the form the
    /// summarization prompt feeds to the generation collaborator.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}

/// Renders a transcript as newline-joined `role: content` lines.
///
/// An empty transcript renders as an empty string; summarizing a session
/// that never held a conversation is a degenerate case, not an error.
#[must_use]
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(Message::render)
        .collect::<Vec<_>>()
        .join("\n")
}
