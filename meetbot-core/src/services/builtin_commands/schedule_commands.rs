use chrono::{Days, NaiveDateTime};
use chrono_tz::Tz;
use tracing::warn;
use meetbot_common::models::{
    CalendarEvent, DateTimeTimeZone, Reply, ScheduleItem, ScheduleStatus, ScheduleWindow,
};
use crate::services::builtin_commands::CommandContext;
use crate::utils::time::{format_local, now_in, to_local};
use crate::Error;

/// `schedule`: the user's own busy slots from now until midnight.
pub async fn handle_schedule(ctx: &CommandContext<'_>) -> Result<Reply, Error> {
    let me = ctx.directory.get_me(ctx.token).await?;
    let Some(address) = me.primary_address() else {
        return Err(Error::Platform("signed-in user has no mail address".into()));
    };

    let window = rest_of_day(now_in(ctx.config.time_zone), &ctx.config.graph_time_zone);
    let items = ctx.directory.get_schedule(ctx.token, address, &window).await?;
    let text = render_schedule(&items, ctx.config.time_zone)?;
    if text.is_empty() {
        return Ok(Reply::text("Nothing on your schedule for the rest of today."));
    }
    Ok(Reply::Text(text))
}

fn rest_of_day(now: NaiveDateTime, time_zone: &str) -> ScheduleWindow {
    let midnight = now
        .date()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now);
    ScheduleWindow { start: now, end: midnight, time_zone: time_zone.to_string() }
}

pub fn render_schedule(items: &[ScheduleItem], tz: Tz) -> Result<String, Error> {
    let mut out = String::new();
    for item in items.iter().filter(|i| i.status == ScheduleStatus::Busy) {
        out.push_str(&format!("Subject: {}\n", item.subject.as_deref().unwrap_or_default()));
        out.push_str(&format!("Location: {}\n", item.location.as_deref().unwrap_or_default()));
        out.push_str(&format!("StartTime: {}\n", format_local(to_local(&item.start, tz)?)));
        out.push_str(&format!("EndTime: {}\n", format_local(to_local(&item.end, tz)?)));
    }
    if out.is_empty() {
        return Ok(out);
    }
    Ok(format!("Schedule information:\n{out}"))
}

/// `event`: the user's calendar events.
pub async fn handle_events(ctx: &CommandContext<'_>) -> Result<Reply, Error> {
    let events = ctx.directory.get_events(ctx.token).await?;
    if events.is_empty() {
        return Ok(Reply::text("You have no upcoming events."));
    }
    let lines: Vec<String> = events.iter().map(|e| render_event(e, ctx.config.time_zone)).collect();
    Ok(Reply::Text(lines.join("\n\n")))
}

fn render_event(event: &CalendarEvent, tz: Tz) -> String {
    let organizer = event
        .organizer
        .as_ref()
        .and_then(|o| o.email_address.name.as_deref().or(o.email_address.address.as_deref()))
        .unwrap_or_default();
    let location = event
        .location
        .as_ref()
        .map(|l| l.display_name.as_str())
        .unwrap_or_default();

    format!(
        "Subject: {}\nOrganizer: {}\nStart: {}\nEnd: {}\nLocation: {}",
        event.subject.as_deref().unwrap_or_default(),
        organizer,
        show_time(event.start.as_ref(), tz),
        show_time(event.end.as_ref(), tz),
        location
    )
}

fn show_time(dt: Option<&DateTimeTimeZone>, tz: Tz) -> String {
    let Some(dt) = dt else { return String::new() };
    match to_local(dt, tz) {
        Ok(local) => format_local(local),
        Err(e) => {
            warn!("Unreadable event time '{}': {}", dt.date_time, e);
            dt.date_time.clone()
        }
    }
}
