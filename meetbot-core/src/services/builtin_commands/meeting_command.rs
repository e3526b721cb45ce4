use tracing::{info, warn};
use meetbot_common::models::{MeetingDraft, Reply};
use crate::scheduling::BookingOutcome;
use crate::services::builtin_commands::CommandContext;
use crate::utils::time::today_in;
use crate::Error;

/// `meeting`: commit the collected form as today's event.
pub async fn handle_meeting(ctx: &CommandContext<'_>, form: &mut MeetingDraft) -> Result<Reply, Error> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
        return Ok(Reply::Text(format!("The meeting is missing: {}.", names.join(", "))));
    }

    let me = ctx.directory.get_me(ctx.token).await?;
    let organizer = me
        .primary_address()
        .ok_or_else(|| Error::Platform("signed-in user has no mail address".into()))?
        .to_string();
    form.organizer = organizer.clone();

    let date = today_in(ctx.config.time_zone);
    match ctx.orchestrator.book(ctx.token, form, &organizer, date).await? {
        BookingOutcome::Committed(event) => {
            info!("Booked '{}' ({})", form.subject, event.id);
            Ok(Reply::Text(format!(
                "Meeting '{}' has been booked (id: {}).",
                form.subject, event.id
            )))
        }
        BookingOutcome::Rejected(reason) => {
            warn!("Booking '{}' rejected: {}", form.subject, reason);
            Ok(Reply::Text(reason.to_string()))
        }
    }
}
