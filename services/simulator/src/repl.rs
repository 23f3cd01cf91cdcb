/// A line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Send the text to the character.
    Say(String),
    /// Start the conversation over, keeping the score.
    Reset,
    /// Print the running score and outcome.
    Score,
    /// Leave the simulator.
    Quit,
    /// Blank input.
    Empty,
    /// A slash command that is not recognised.
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        match line {
            "/reset" => Self::Reset,
            "/score" => Self::Score,
            "/quit" | "/exit" => Self::Quit,
            cmd if cmd.starts_with('/') => Self::Unknown(cmd.to_string()),
            text => Self::Say(text.to_string()),
        }
    }
}

/// The three opening lines played by `--scripted`.
pub const SCRIPTED_LINES: [&str; 3] = [
    "Hi! I've heard you're quite the warrior. What's your favorite battle strategy?",
    "That sounds amazing! I really admire your bravery and tactical thinking.",
    "Want to grab some elixir together sometime?",
];
