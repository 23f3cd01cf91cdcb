//! Role-play conversation client.
//!
//! A [`session::ConversationSession`] asks a chat-completion backend to play a
//! fixed character persona, has the same backend rate every user message
//! against that persona, and folds the ratings into a
//! [`score::ScoreAccumulator`].

pub mod error;
pub mod llm_client;
pub mod prompts;
pub mod score;
pub mod session;
pub mod transcript;

pub use error::{Result, SessionError};
pub use llm_client::{GenerationParams, LLMClient, OpenAICompatibleClient};
pub use score::{ScoreAccumulator, ScoreError};
pub use session::{CharacterResponse, ConversationSession, ScoreReading};
pub use transcript::{Role, Transcript, Turn};
