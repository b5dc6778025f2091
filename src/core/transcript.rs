//! Append-only transcript of conversation turns.

use chat_backend::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One message in the transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    pub is_error: bool,
    pub attachments: Vec<Attachment>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            is_error: false,
            attachments: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            is_error: false,
            attachments,
        }
    }

    /// Assistant-side error turn. Rendered as escaped text, never as markup.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            is_error: true,
            attachments: Vec::new(),
        }
    }
}

/// Ordered turns in submission/arrival order.
///
/// Invariant: there is no API to edit or remove a turn once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn and returns its index.
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.turns.iter().filter(|turn| turn.is_error).count()
    }
}
