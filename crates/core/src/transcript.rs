use serde::{Deserialize, Serialize};

/// The speaker of a single turn, serialized the way chat completion APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation. Turns are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The ordered history of a conversation.
///
/// The first turn is always the system instruction the transcript was seeded
/// with. Everything after it is appended in chronological order and the
/// whole sequence is resent to the model on every reply request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    seed: Turn,
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates a transcript holding only the given system instruction.
    pub fn seeded(system_instruction: impl Into<String>) -> Self {
        let seed = Turn::system(system_instruction);
        Self {
            turns: vec![seed.clone()],
            seed,
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drops every turn and restores the original system instruction.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(self.seed.clone());
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: a transcript carries at least its system turn.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
