// File: meetbot-core/src/services/builtin_commands/mod.rs
//! The commands the bot understands once the user is signed in. Each verb has
//! its handler in its own file; `handle_builtin_command` is the single entry
//! point the main dialog calls.

pub mod mail_commands;
pub mod meeting_command;
pub mod profile_commands;
pub mod rooms_command;
pub mod schedule_commands;

use meetbot_common::models::{AccessToken, MeetingDraft, Reply};
use crate::config::BotConfig;
use crate::platforms::DirectoryService;
use crate::scheduling::MeetingOrchestrator;
use crate::services::command_router::{RoutedCommand, Verb};
use crate::Error;

use mail_commands::handle_recent;
use meeting_command::handle_meeting;
use profile_commands::{handle_me, handle_send};
use rooms_command::handle_rooms;
use schedule_commands::{handle_events, handle_schedule};

/// What a command handler may use. The token is the one fetched for this turn.
pub struct CommandContext<'a> {
    pub directory: &'a dyn DirectoryService,
    pub orchestrator: &'a MeetingOrchestrator,
    pub config: &'a BotConfig,
    pub token: &'a AccessToken,
}

pub async fn handle_builtin_command(
    cmd: &RoutedCommand,
    ctx: &CommandContext<'_>,
    form: &mut MeetingDraft,
) -> Result<Vec<Reply>, Error> {
    let reply = match cmd.verb {
        Verb::Me => handle_me(ctx).await?,
        Verb::Send => handle_send(ctx, cmd.argument.as_deref()).await?,
        Verb::Recent => handle_recent(ctx).await?,
        Verb::Rooms => handle_rooms(ctx).await?,
        Verb::Schedule => handle_schedule(ctx).await?,
        Verb::Event => handle_events(ctx).await?,
        Verb::Meeting => handle_meeting(ctx, form).await?,
    };
    Ok(vec![reply])
}
