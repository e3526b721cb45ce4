use meetbot_common::models::{HeroCard, MailMessage, Reply};
use crate::services::builtin_commands::CommandContext;
use crate::Error;

const OUTLOOK_LOGO: &str = "https://botframeworksamples.blob.core.windows.net/samples/OutlookLogo.jpg";

/// `recent`: the newest mail as a carousel of cards.
pub async fn handle_recent(ctx: &CommandContext<'_>) -> Result<Reply, Error> {
    let limit = ctx.config.recent_mail_limit;
    let messages = ctx.directory.get_recent_mail(ctx.token, limit).await?;
    if messages.is_empty() {
        return Ok(Reply::text("Unable to find any recent unread mail."));
    }

    let cards = messages.iter().take(limit).map(mail_card).collect();
    Ok(Reply::Carousel(cards))
}

fn mail_card(mail: &MailMessage) -> HeroCard {
    let subtitle = mail.from.as_ref().map(|from| {
        let addr = &from.email_address;
        format!(
            "{} <{}>",
            addr.name.as_deref().unwrap_or_default(),
            addr.address.as_deref().unwrap_or_default()
        )
    });

    HeroCard {
        title: mail.subject.clone().unwrap_or_default(),
        text: mail.body_preview.clone().unwrap_or_default(),
        subtitle,
        image_url: Some(OUTLOOK_LOGO.to_string()),
    }
}
