use tracing::info;
use meetbot_common::models::Reply;
use crate::services::builtin_commands::CommandContext;
use crate::Error;

pub const SEND_SUBJECT: &str = "Message from a bot!";

/// `me`: who the user is and who they report to.
pub async fn handle_me(ctx: &CommandContext<'_>) -> Result<Reply, Error> {
    let me = ctx.directory.get_me(ctx.token).await?;
    let manager = ctx.directory.get_manager(ctx.token).await?;

    let text = match manager {
        Some(m) => format!("You are {} and you report to {}.", me.name(), m.name()),
        None => format!("You are {}.", me.name()),
    };
    Ok(Reply::Text(text))
}

/// `send <address>`: mails a fixed greeting from the user's own account.
pub async fn handle_send(ctx: &CommandContext<'_>, address: Option<&str>) -> Result<Reply, Error> {
    let Some(address) = address.filter(|a| !a.trim().is_empty()) else {
        return Ok(Reply::text("Please tell me who to write to, e.g. 'send alice@example.com'."));
    };

    let me = ctx.directory.get_me(ctx.token).await?;
    let body = format!(
        "Hi there! I had this message sent from a bot. - Your friend, {}",
        me.name()
    );
    ctx.directory.send_mail(ctx.token, address, SEND_SUBJECT, &body).await?;
    info!("Sent greeting mail to {} on behalf of {}", address, me.id);

    Ok(Reply::Text(format!("I sent a message to {address} from your account.")))
}
