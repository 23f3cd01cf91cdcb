//! Main Entrypoint for the Role-Play Simulator
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Initializing logging.
//! 3. Building a conversation session against the configured backend.
//! 4. Playing either the scripted opening or an interactive conversation.

use anyhow::Context;
use charmsim_core::{ConversationSession, OpenAICompatibleClient};
use charmsim_simulator::{
    config::Config,
    repl::{ReplCommand, SCRIPTED_LINES},
};
use clap::Parser;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about = "Chat with a role-played character and get scored on every line")]
struct Args {
    /// Character persona, overrides CHARACTER_PERSONA.
    #[arg(long)]
    persona: Option<String>,

    /// Bio of the person on the date, overrides USER_BIO.
    #[arg(long)]
    bio: Option<String>,

    /// Play the three canned opening lines instead of reading stdin.
    #[arg(long)]
    scripted: bool,
}

fn print_outcome(session: &ConversationSession) {
    let score = session.accumulator();
    if score.is_good_outcome() {
        println!("*** The date is going great! (score {}) ***", score.total());
    } else if score.is_bad_outcome() {
        println!("*** The date is going badly... (score {}) ***", score.total());
    }
}

async fn say(session: &mut ConversationSession, text: &str) {
    match session.send_message(text).await {
        Ok(response) => {
            println!("Character: {}", response.message);
            println!("Your Score: {}\n", response.score);
            print_outcome(session);
        }
        Err(e) => {
            error!(error = %e, "Message failed");
            println!("(message failed: {})\n", e);
        }
    }
}

async fn run_scripted(session: &mut ConversationSession) {
    for line in SCRIPTED_LINES {
        println!("You: {}", line);
        say(session, line).await;
    }
}

async fn run_interactive(session: &mut ConversationSession) -> anyhow::Result<()> {
    println!("Type a message, /score, /reset or /quit.\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Say(text) => say(session, &text).await,
            ReplCommand::Reset => {
                session.reset_conversation();
                println!("(conversation reset, score kept)\n");
            }
            ReplCommand::Score => {
                println!("Score: {}\n", session.accumulator().total());
                print_outcome(session);
            }
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
            ReplCommand::Unknown(cmd) => println!("Unknown command: {}\n", cmd),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(persona) = args.persona {
        config.persona = persona;
    }
    if let Some(bio) = args.bio {
        config.user_bio = bio;
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // --- 3. Build the Session ---
    let client = OpenAICompatibleClient::with_api_base(
        config.openai_api_key.expose_secret(),
        config.chat_model.clone(),
        config.api_base.clone(),
    );
    let mut session = ConversationSession::with_client(
        Arc::new(client),
        config.persona.clone(),
        config.user_bio.clone(),
    );
    info!(
        model = %config.chat_model,
        api_base = %config.api_base,
        scripted = args.scripted,
        "Session configured. Starting conversation..."
    );

    // --- 4. Converse ---
    println!("=== ROLE-PLAY DATING SIMULATOR ===\n");
    if args.scripted {
        run_scripted(&mut session).await;
    } else {
        run_interactive(&mut session).await?;
    }

    info!(score = session.accumulator().total(), "Conversation finished.");
    Ok(())
}
