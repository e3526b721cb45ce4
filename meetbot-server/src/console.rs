// meetbot-server/src/console.rs
//
// Stdin/stdout transport: every line is one turn of a single conversation.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use uuid::Uuid;

use meetbot_common::models::{HeroCard, IncomingMessage, Reply};
use meetbot_core::{ConversationService, Error};

pub async fn run(service: &ConversationService, user_id: &str) -> Result<(), Error> {
    let conversation_id = Uuid::new_v4().to_string();
    debug!("console conversation {}", conversation_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"(type anything to start, 'logout' to sign out, Ctrl-D to quit)\n").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let msg = IncomingMessage::new(&conversation_id, user_id, line);
        for reply in service.handle_turn(msg).await? {
            stdout.write_all(render(&reply).as_bytes()).await?;
        }
        stdout.flush().await?;
    }
    Ok(())
}

fn render(reply: &Reply) -> String {
    match reply {
        Reply::Text(text) => format!("bot> {text}\n"),
        Reply::Carousel(cards) => cards.iter().map(render_card).collect(),
    }
}

fn render_card(card: &HeroCard) -> String {
    let mut out = format!("bot> [{}]\n", card.title);
    if let Some(sub) = &card.subtitle {
        out.push_str(&format!("     {sub}\n"));
    }
    if !card.text.is_empty() {
        out.push_str(&format!("     {}\n", card.text));
    }
    out
}
