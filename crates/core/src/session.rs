//! Conversation Session
//!
//! A session owns one role-play conversation: the transcript resent to the
//! model on every turn, the persona and bio it was seeded with, and the
//! score accumulator fed by the model's rating of each user message.

use crate::error::Result;
use crate::llm_client::{DEFAULT_MODEL, GenerationParams, LLMClient, OpenAICompatibleClient};
use crate::prompts;
use crate::score::ScoreAccumulator;
use crate::transcript::{Transcript, Turn};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The character's reply to one user message and the running score after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterResponse {
    pub message: String,
    pub score: i64,
}

impl fmt::Display for CharacterResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message: {}\nScore: {}", self.message, self.score)
    }
}

/// The outcome of reading the model's rating text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreReading {
    /// The text was a plain integer.
    Rating(i64),
    /// The text could not be read as an integer; carries it verbatim.
    Unparseable(String),
}

impl ScoreReading {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(rating) => Self::Rating(rating),
            Err(_) => Self::Unparseable(raw.to_string()),
        }
    }
}

pub struct ConversationSession {
    client: Arc<dyn LLMClient>,
    persona: String,
    user_bio: String,
    transcript: Transcript,
    accumulator: ScoreAccumulator,
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("persona", &self.persona)
            .field("user_bio", &self.user_bio)
            .field("turns", &self.transcript.len())
            .field("score", &self.accumulator.total())
            .finish_non_exhaustive()
    }
}

impl ConversationSession {
    /// Creates a session backed by the public OpenAI endpoint and the default model.
    pub fn new(
        api_key: impl Into<String>,
        persona: impl Into<String>,
        user_bio: impl Into<String>,
    ) -> Self {
        let client = OpenAICompatibleClient::new(api_key, DEFAULT_MODEL);
        Self::with_client(Arc::new(client), persona, user_bio)
    }

    /// Creates a session that talks to the given backend.
    pub fn with_client(
        client: Arc<dyn LLMClient>,
        persona: impl Into<String>,
        user_bio: impl Into<String>,
    ) -> Self {
        let persona = persona.into();
        let user_bio = user_bio.into();
        let transcript = Transcript::seeded(prompts::character_instructions(&persona, &user_bio));
        Self {
            client,
            persona,
            user_bio,
            transcript,
            accumulator: ScoreAccumulator::new(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn user_bio(&self) -> &str {
        &self.user_bio
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn accumulator(&self) -> &ScoreAccumulator {
        &self.accumulator
    }

    /// Sends one user message and returns the character's reply with the running score.
    ///
    /// The reply is requested first, with the whole transcript as context,
    /// and only then is the exchange rated. A rating that is not an integer
    /// is logged and scores 0 for this turn without touching the total. A
    /// rating outside the delta table fails the call; the user and assistant
    /// turns stay in the transcript in that case.
    #[instrument(skip_all, fields(turn = self.transcript.len()))]
    pub async fn send_message(&mut self, user_statement: &str) -> Result<CharacterResponse> {
        self.transcript.push(Turn::user(user_statement));

        let reply = self.generate_reply().await?;
        self.transcript.push(Turn::assistant(reply.clone()));

        let score = match self.score_statement(user_statement, &reply).await? {
            ScoreReading::Rating(rating) => {
                self.accumulator.apply_positive(rating)?;
                info!(rating, total = self.accumulator.total(), "Score updated");
                self.accumulator.total() as i64
            }
            ScoreReading::Unparseable(raw) => {
                warn!(response = %raw, "Could not parse score, defaulting to 0");
                0
            }
        };

        Ok(CharacterResponse {
            message: reply,
            score,
        })
    }

    /// Clears the transcript back to its opening system instruction.
    ///
    /// The accumulated score carries over.
    pub fn reset_conversation(&mut self) {
        self.transcript.reset();
        info!("Conversation reset");
    }

    async fn generate_reply(&self) -> Result<String> {
        debug!(turns = self.transcript.len(), "Requesting character reply");
        self.client
            .complete(self.transcript.turns().to_vec(), GenerationParams::REPLY)
            .await
    }

    async fn score_statement(&self, user_statement: &str, reply: &str) -> Result<ScoreReading> {
        let rubric =
            prompts::scoring_rubric(&self.persona, &self.user_bio, user_statement, reply);
        debug!("Requesting statement score");
        let raw = self
            .client
            .complete(vec![Turn::user(rubric)], GenerationParams::SCORING)
            .await?;
        Ok(ScoreReading::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::llm_client::MockLLMClient;
    use crate::score::ScoreError;
    use crate::transcript::Role;
    use mockall::Sequence;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    const STAY_IN_CHARACTER: &str =
        "Stay in character at all times. Be engaging and respond naturally to what they say.";

    /// Counts WARN events so tests can assert the degraded scoring path.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Builds a mock that answers the reply request and then the scoring request.
    fn scripted_client(reply: &'static str, score_text: &'static str) -> MockLLMClient {
        let mut client = MockLLMClient::new();
        let mut seq = Sequence::new();
        client
            .expect_complete()
            .withf(|_, params| *params == GenerationParams::REPLY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(reply.to_string()));
        client
            .expect_complete()
            .withf(|_, params| *params == GenerationParams::SCORING)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(score_text.to_string()));
        client
    }

    fn session_with(client: MockLLMClient) -> ConversationSession {
        ConversationSession::with_client(Arc::new(client), "P", "B")
    }

    #[test]
    fn test_score_reading_parse() {
        assert_eq!(ScoreReading::parse("3"), ScoreReading::Rating(3));
        assert_eq!(ScoreReading::parse("  7\n"), ScoreReading::Rating(7));
        assert_eq!(ScoreReading::parse("-2"), ScoreReading::Rating(-2));
        assert_eq!(
            ScoreReading::parse("N/A"),
            ScoreReading::Unparseable("N/A".to_string())
        );
        assert_eq!(
            ScoreReading::parse("7/10"),
            ScoreReading::Unparseable("7/10".to_string())
        );
        assert_eq!(
            ScoreReading::parse(""),
            ScoreReading::Unparseable(String::new())
        );
    }

    #[test]
    fn test_character_response_display() {
        let response = CharacterResponse {
            message: "Hi there".to_string(),
            score: 5,
        };
        assert_eq!(response.to_string(), "Message: Hi there\nScore: 5");
    }

    #[test]
    fn test_new_session_seeds_system_turn() {
        let session = session_with(MockLLMClient::new());
        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role(), Role::System);
        assert!(turns[0].content().contains("P"));
        assert!(turns[0].content().contains("B"));
        assert!(turns[0].content().contains(STAY_IN_CHARACTER));
        assert_eq!(session.persona(), "P");
        assert_eq!(session.user_bio(), "B");
        assert_eq!(session.accumulator().total(), 0.0);
    }

    #[tokio::test]
    async fn test_send_message_scores_with_rating_index() {
        let mut session = session_with(scripted_client("Hi there", "3"));

        let response = session.send_message("Hello").await.unwrap();

        let mut expected = ScoreAccumulator::new();
        expected.apply_positive(3).unwrap();
        assert_eq!(
            response,
            CharacterResponse {
                message: "Hi there".to_string(),
                score: expected.total() as i64,
            }
        );
        assert_eq!(response.score, 5);

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1], Turn::user("Hello"));
        assert_eq!(turns[2], Turn::assistant("Hi there"));
    }

    #[tokio::test]
    async fn test_reply_request_carries_full_transcript() {
        let mut client = MockLLMClient::new();
        client
            .expect_complete()
            .withf(|messages, params| {
                *params == GenerationParams::REPLY
                    && messages.len() == 2
                    && messages[0].role() == Role::System
                    && messages[1] == Turn::user("Hello")
            })
            .times(1)
            .returning(|_, _| Ok("Hi there".to_string()));
        client
            .expect_complete()
            .withf(|messages, params| {
                *params == GenerationParams::SCORING
                    && messages.len() == 1
                    && messages[0].role() == Role::User
                    && messages[0].content().contains("User Said: \"Hello\"")
                    && messages[0].content().contains("Character Responded: \"Hi there\"")
                    && messages[0].content().contains("Character Personality: P")
                    && messages[0].content().contains("User Bio: B")
            })
            .times(1)
            .returning(|_, _| Ok("0".to_string()));

        let mut session = session_with(client);
        let response = session.send_message("Hello").await.unwrap();
        assert_eq!(response.score, 1);
    }

    #[tokio::test]
    async fn test_scores_accumulate_across_turns() {
        let mut client = MockLLMClient::new();
        let mut seq = Sequence::new();
        for (reply, score) in [("a", "5"), ("b", "4"), ("c", "1")] {
            client
                .expect_complete()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(reply.to_string()));
            client
                .expect_complete()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(score.to_string()));
        }

        let mut session = session_with(client);
        let mut scores = Vec::new();
        for statement in ["one", "two", "three"] {
            scores.push(session.send_message(statement).await.unwrap().score);
        }

        assert_eq!(scores, vec![8, 14, 17]);
        assert_eq!(session.transcript().len(), 7);
    }

    #[tokio::test]
    async fn test_unparseable_score_degrades_to_zero() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut session = session_with(scripted_client("Hi there", "N/A"));
        let response = session.send_message("Hello").await.unwrap();

        assert_eq!(response.message, "Hi there");
        assert_eq!(response.score, 0);
        assert_eq!(session.accumulator().total(), 0.0);
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rating_outside_delta_table_fails() {
        let mut session = session_with(scripted_client("Hi there", "8"));

        let err = session.send_message("Hello").await.unwrap_err();

        match err {
            SessionError::OutOfRange { index, source } => {
                assert_eq!(index, 8);
                assert_eq!(source, ScoreError::OutOfRange { index: 8, len: 6 });
            }
            other => panic!("Expected OutOfRange, got {:?}", other),
        }
        assert_eq!(session.accumulator().total(), 0.0);
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_upstream_error_on_reply_skips_scoring() {
        let mut client = MockLLMClient::new();
        client.expect_complete().times(1).returning(|_, _| {
            Err(SessionError::Upstream {
                status: 500,
                body: "rate limited".to_string(),
            })
        });

        let mut session = session_with(client);
        let err = session.send_message("Hello").await.unwrap_err();

        match err {
            SessionError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "rate limited");
            }
            other => panic!("Expected Upstream, got {:?}", other),
        }
        // The user turn was already recorded before the request failed.
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_keeps_score_and_restores_seed() {
        let mut session = session_with(scripted_client("Hi there", "2"));
        let seed = session.transcript().turns()[0].clone();

        session.send_message("Hello").await.unwrap();
        assert_eq!(session.accumulator().total(), 4.0);

        session.reset_conversation();

        assert_eq!(session.transcript().turns(), &[seed]);
        assert_eq!(session.accumulator().total(), 4.0);
    }

    #[test]
    fn test_reset_on_fresh_session_is_idempotent() {
        let mut session = session_with(MockLLMClient::new());
        let before = session.transcript().clone();
        session.reset_conversation();
        session.reset_conversation();
        assert_eq!(session.transcript(), &before);
    }

    #[test]
    fn test_debug_output_omits_client() {
        let session = ConversationSession::new("sk-very-secret", "P", "B");
        let debug = format!("{:?}", session);
        assert!(debug.contains("ConversationSession"));
        assert!(!debug.contains("sk-very-secret"));
    }
}
