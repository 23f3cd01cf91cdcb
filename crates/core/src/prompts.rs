//! Prompt templates sent to the text-generation backend.

/// Builds the system instruction that opens every conversation.
pub fn character_instructions(persona: &str, user_bio: &str) -> String {
    format!(
        "You are roleplaying as a character with this personality: {persona}\n\
         You are on a date with someone who has this bio: {user_bio}\n\
         Stay in character at all times. Be engaging and respond naturally to what they say."
    )
}

/// Builds the single-message rubric asking the model to rate one exchange.
pub fn scoring_rubric(persona: &str, user_bio: &str, statement: &str, reply: &str) -> String {
    format!(
        "You are evaluating a dating conversation. Rate the user's statement on a scale of 0-10 based on:\n\
         - How appropriate and engaging it is\n\
         - How well it matches the character's personality and interests\n\
         - Social skills and charm\n\
         - Romantic potential\n\n\
         Character Personality: {persona}\n\
         User Bio: {user_bio}\n\
         User Said: \"{statement}\"\n\
         Character Responded: \"{reply}\"\n\n\
         Respond with ONLY a single number from 0 to 10."
    )
}
